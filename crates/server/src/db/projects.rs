use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{types::Json, SqlitePool};

use super::models::{Inspector, Project};
use crate::error::Result;

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    description: Option<String>,
    location: Option<String>,
    client_name: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    manager_id: Option<String>,
    employees: Json<Vec<String>>,
    inspectors: Json<Vec<Inspector>>,
    reports: Json<Vec<String>>,
    last_working_day: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        let contract_day = Project::contract_day_on(row.start_date, Utc::now().date_naive());
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            location: row.location,
            client_name: row.client_name,
            start_date: row.start_date,
            end_date: row.end_date,
            manager_id: row.manager_id,
            employees: row.employees.0,
            inspectors: row.inspectors.0,
            reports: row.reports.0,
            last_working_day: row.last_working_day,
            contract_day,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn find_by_id(pool: &SqlitePool, project_id: &str) -> Result<Option<Project>> {
    let row = sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects WHERE id = ?")
        .bind(project_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Project::from))
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Project>> {
    let rows = sqlx::query_as::<_, ProjectRow>("SELECT * FROM projects ORDER BY updated_at DESC")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Project::from).collect())
}

pub async fn insert(pool: &SqlitePool, project: &Project) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO projects (id, name, description, location, client_name, start_date, end_date,
                              manager_id, employees, inspectors, reports, last_working_day,
                              created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&project.id)
    .bind(&project.name)
    .bind(&project.description)
    .bind(&project.location)
    .bind(&project.client_name)
    .bind(project.start_date)
    .bind(project.end_date)
    .bind(&project.manager_id)
    .bind(Json(&project.employees))
    .bind(Json(&project.inspectors))
    .bind(Json(&project.reports))
    .bind(project.last_working_day)
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Overwrites every mutable field, bumping `updated_at`.
pub async fn update(pool: &SqlitePool, project: &Project) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE projects SET
            name = ?, description = ?, location = ?, client_name = ?, start_date = ?,
            end_date = ?, manager_id = ?, employees = ?, inspectors = ?, reports = ?,
            last_working_day = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&project.name)
    .bind(&project.description)
    .bind(&project.location)
    .bind(&project.client_name)
    .bind(project.start_date)
    .bind(project.end_date)
    .bind(&project.manager_id)
    .bind(Json(&project.employees))
    .bind(Json(&project.inspectors))
    .bind(Json(&project.reports))
    .bind(project.last_working_day)
    .bind(Utc::now())
    .bind(&project.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, project_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
