use axum::{
    async_trait,
    extract::{FromRequestParts, Query, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::{
    db::{self, models::Role},
    error::AppError,
    routes::auth::Claims,
    services::policy::{self, Action},
    AppState,
};

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn can(&self, action: Action) -> bool {
        policy::is_allowed(self.role, &self.permissions, action)
    }

    pub fn require(&self, action: Action) -> crate::error::Result<()> {
        if self.can(action) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role '{}' is not permitted to {}",
                self.role.as_str(),
                action.as_str().replace('_', " ")
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Bearer header first, then `?token=` so download links work.
fn extract_token(request: &Request) -> Option<String> {
    if let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    Query::<TokenQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(q)| q.token)
        .filter(|t| !t.is_empty())
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token(&request).ok_or_else(|| AppError::Unauthorized.into_response())?;

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized.into_response())?;

    // Reload so role and permission changes apply to live tokens
    let user = db::users::find_by_id(&state.db.pool, &token_data.claims.sub)
        .await
        .map_err(IntoResponse::into_response)?
        .ok_or_else(|| AppError::Unauthorized.into_response())?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
        permissions: user.permissions,
    });

    Ok(next.run(request).await)
}

// Extractor for getting the authenticated user from request extensions
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
