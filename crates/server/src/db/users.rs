use chrono::{DateTime, Utc};
use sqlx::{types::Json, SqlitePool};

use super::{
    id,
    models::{AuthProvider, Role, User},
};
use crate::error::Result;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    password_hash: Option<String>,
    job_name: Option<String>,
    role: Role,
    permissions: Json<Vec<String>>,
    auth_provider: AuthProvider,
    microsoft_access_token: Option<String>,
    microsoft_refresh_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            job_name: row.job_name,
            role: row.role,
            permissions: row.permissions.0,
            auth_provider: row.auth_provider,
            microsoft_access_token: row.microsoft_access_token,
            microsoft_refresh_token: row.microsoft_refresh_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: Option<&'a str>,
    pub job_name: Option<&'a str>,
    pub role: Role,
    pub auth_provider: AuthProvider,
}

pub async fn find_by_id(pool: &SqlitePool, user_id: &str) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(User::from))
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(row.map(User::from))
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY name ASC")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(User::from).collect())
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_with_role(pool: &SqlitePool, role: Role) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = ?")
        .bind(role)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn insert(pool: &SqlitePool, new: NewUser<'_>) -> Result<User> {
    let user_id = id::new_id();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO users (id, email, name, password_hash, job_name, role, permissions,
                           auth_provider, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, '[]', ?, ?, ?)
        "#,
    )
    .bind(&user_id)
    .bind(new.email.trim().to_lowercase())
    .bind(new.name)
    .bind(new.password_hash)
    .bind(new.job_name)
    .bind(new.role)
    .bind(new.auth_provider)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(User {
        id: user_id,
        email: new.email.trim().to_lowercase(),
        name: new.name.to_string(),
        password_hash: new.password_hash.map(str::to_string),
        job_name: new.job_name.map(str::to_string),
        role: new.role,
        permissions: Vec::new(),
        auth_provider: new.auth_provider,
        microsoft_access_token: None,
        microsoft_refresh_token: None,
        created_at: now,
        updated_at: now,
    })
}

pub async fn update_role(pool: &SqlitePool, user_id: &str, role: Role) -> Result<bool> {
    let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
        .bind(role)
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn update_permissions(
    pool: &SqlitePool,
    user_id: &str,
    permissions: &[String],
) -> Result<bool> {
    let result = sqlx::query("UPDATE users SET permissions = ?, updated_at = ? WHERE id = ?")
        .bind(Json(permissions))
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, user_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
