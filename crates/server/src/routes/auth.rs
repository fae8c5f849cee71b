use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::{
    db::{
        self,
        models::{AuthProvider, Role, User},
    },
    error::{AppError, Result},
    middleware::auth::AuthUser,
    routes::{ok, Body, Envelope},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default, rename = "jobname", alias = "jobName")]
    pub job_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub name: String,
    pub role: Role,
    pub exp: usize,
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AppError::Internal("Failed to hash password".to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn create_token(user: &User, secret: &str, ttl_days: i64) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(ttl_days))
        .ok_or_else(|| AppError::Internal("Token expiry out of range".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AppError::Internal("Failed to create token".to_string()))
}

async fn register(
    State(state): State<AppState>,
    Body(body): Body<RegisterRequest>,
) -> Result<Json<Envelope<AuthPayload>>> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if body.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if db::users::find_by_email(&state.db.pool, &email).await?.is_some() {
        return Err(AppError::Validation("Email already registered".to_string()));
    }

    let password_hash = hash_password(&body.password)?;

    // First account bootstraps the deployment
    let role = if db::users::count(&state.db.pool).await? == 0 {
        Role::Admin
    } else {
        Role::Employee
    };

    let user = db::users::insert(
        &state.db.pool,
        db::users::NewUser {
            email: &email,
            name: body.name.trim(),
            password_hash: Some(&password_hash),
            job_name: body.job_name.as_deref(),
            role,
            auth_provider: AuthProvider::Local,
        },
    )
    .await?;
    tracing::info!("Registered user {} as {}", user.id, user.role.as_str());

    let token = create_token(&user, &state.config.jwt_secret, state.config.token_ttl_days)?;

    Ok(ok("Registration successful", AuthPayload { token, user }))
}

async fn login(
    State(state): State<AppState>,
    Body(body): Body<LoginRequest>,
) -> Result<Json<Envelope<AuthPayload>>> {
    let user = db::users::find_by_email(&state.db.pool, body.email.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Accounts created through an external provider have no password
    let Some(password_hash) = user.password_hash.as_deref() else {
        return Err(AppError::Unauthorized);
    };
    if !verify_password(&body.password, password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = create_token(&user, &state.config.jwt_secret, state.config.token_ttl_days)?;

    Ok(ok("Login successful", AuthPayload { token, user }))
}

/// Mounted behind the auth middleware.
pub async fn me(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Envelope<UserPayload>>> {
    let user = db::users::find_by_id(&state.db.pool, &caller.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(ok("Current user", UserPayload { user }))
}
