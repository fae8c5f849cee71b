use chrono::{DateTime, Utc};
use sqlx::{types::Json, QueryBuilder, Sqlite, SqlitePool};

use super::models::{EquipmentRow, Extensions, LaborRow, Report, ReportStatus, Weather};
use crate::error::Result;

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: String,
    title: String,
    content: String,
    author: String,
    job_name: String,
    project_id: Option<String>,
    inspector_id: Option<String>,
    inspection_type: String,
    findings: String,
    recommendations: String,
    status: ReportStatus,
    labor: Json<Vec<LaborRow>>,
    equipment: Json<Vec<EquipmentRow>>,
    weather: Option<Json<Weather>>,
    extensions: Json<Extensions>,
    pdf_path: Option<String>,
    is_draft: bool,
    created_by: String,
    edited_by: Option<String>,
    edited_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReportRow> for Report {
    fn from(row: ReportRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            author: row.author,
            job_name: row.job_name,
            project_id: row.project_id,
            inspector_id: row.inspector_id,
            inspection_type: row.inspection_type,
            findings: row.findings,
            recommendations: row.recommendations,
            status: row.status,
            labor: row.labor.0,
            equipment: row.equipment.0,
            weather: row.weather.map(|w| w.0),
            extensions: row.extensions.0,
            pdf_path: row.pdf_path,
            is_draft: row.is_draft,
            created_by: row.created_by,
            edited_by: row.edited_by,
            edited_at: row.edited_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Default)]
pub struct ReportFilter {
    pub project_id: Option<String>,
    pub inspector_id: Option<String>,
    pub status: Option<ReportStatus>,
}

pub async fn insert(pool: &SqlitePool, report: &Report) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reports (id, title, content, author, job_name, project_id, inspector_id,
                             inspection_type, findings, recommendations, status, labor,
                             equipment, weather, extensions, pdf_path, is_draft, created_by,
                             edited_by, edited_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&report.id)
    .bind(&report.title)
    .bind(&report.content)
    .bind(&report.author)
    .bind(&report.job_name)
    .bind(&report.project_id)
    .bind(&report.inspector_id)
    .bind(&report.inspection_type)
    .bind(&report.findings)
    .bind(&report.recommendations)
    .bind(report.status)
    .bind(Json(&report.labor))
    .bind(Json(&report.equipment))
    .bind(report.weather.as_ref().map(Json))
    .bind(Json(&report.extensions))
    .bind(&report.pdf_path)
    .bind(report.is_draft)
    .bind(&report.created_by)
    .bind(&report.edited_by)
    .bind(report.edited_at)
    .bind(report.created_at)
    .bind(report.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, report_id: &str) -> Result<Option<Report>> {
    let row = sqlx::query_as::<_, ReportRow>("SELECT * FROM reports WHERE id = ?")
        .bind(report_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Report::from))
}

pub async fn list(pool: &SqlitePool, filter: &ReportFilter) -> Result<Vec<Report>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM reports WHERE 1 = 1");

    if let Some(project_id) = &filter.project_id {
        query.push(" AND project_id = ").push_bind(project_id);
    }
    if let Some(inspector_id) = &filter.inspector_id {
        query.push(" AND inspector_id = ").push_bind(inspector_id);
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }
    query.push(" ORDER BY created_at DESC, id DESC");

    let rows = query
        .build_query_as::<ReportRow>()
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(Report::from).collect())
}

pub async fn list_ids(pool: &SqlitePool) -> Result<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>("SELECT id FROM reports ORDER BY created_at ASC")
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Overwrites every mutable field of an existing report.
pub async fn update(pool: &SqlitePool, report: &Report) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE reports SET
            title = ?, content = ?, author = ?, job_name = ?, project_id = ?, inspector_id = ?,
            inspection_type = ?, findings = ?, recommendations = ?, status = ?, labor = ?,
            equipment = ?, weather = ?, extensions = ?, pdf_path = ?, is_draft = ?,
            edited_by = ?, edited_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&report.title)
    .bind(&report.content)
    .bind(&report.author)
    .bind(&report.job_name)
    .bind(&report.project_id)
    .bind(&report.inspector_id)
    .bind(&report.inspection_type)
    .bind(&report.findings)
    .bind(&report.recommendations)
    .bind(report.status)
    .bind(Json(&report.labor))
    .bind(Json(&report.equipment))
    .bind(report.weather.as_ref().map(Json))
    .bind(Json(&report.extensions))
    .bind(&report.pdf_path)
    .bind(report.is_draft)
    .bind(&report.edited_by)
    .bind(report.edited_at)
    .bind(report.updated_at)
    .bind(&report.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn set_pdf_path(
    pool: &SqlitePool,
    report_id: &str,
    pdf_path: Option<&str>,
    updated_at: DateTime<Utc>,
) -> Result<bool> {
    let result = sqlx::query("UPDATE reports SET pdf_path = ?, updated_at = ? WHERE id = ?")
        .bind(pdf_path)
        .bind(updated_at)
        .bind(report_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, report_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM reports WHERE id = ?")
        .bind(report_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Creation timestamps of the given reports, skipping ids that no longer exist.
pub async fn created_at_of(pool: &SqlitePool, report_ids: &[String]) -> Result<Vec<DateTime<Utc>>> {
    if report_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT created_at FROM reports WHERE id IN (");
    let mut separated = query.separated(", ");
    for report_id in report_ids {
        separated.push_bind(report_id);
    }
    separated.push_unseparated(")");

    let stamps = query
        .build_query_scalar::<DateTime<Utc>>()
        .fetch_all(pool)
        .await?;
    Ok(stamps)
}
