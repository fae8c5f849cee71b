use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::{
        self,
        models::{Role, User},
    },
    error::{AppError, Result},
    middleware::auth::AuthUser,
    routes::{ok, Body, Envelope},
    services::policy::Action,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id/role", put(update_role))
        .route("/:id", delete(delete_user))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct UserListPayload {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedUserPayload {
    pub user_id: String,
}

async fn find_user(state: &AppState, id: &str) -> Result<User> {
    let id = db::id::validate(id, "user")?;
    db::users::find_by_id(&state.db.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Fails when `user` is the only admin left.
async fn guard_last_admin(state: &AppState, user: &User) -> Result<()> {
    if user.role != Role::Admin {
        return Ok(());
    }
    if db::users::count_with_role(&state.db.pool, Role::Admin).await? <= 1 {
        return Err(AppError::Forbidden(
            "Cannot remove the last admin account".to_string(),
        ));
    }
    Ok(())
}

async fn list_users(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Envelope<UserListPayload>>> {
    caller.require(Action::ManageUsers)?;
    let users = db::users::list(&state.db.pool).await?;

    Ok(ok("Users retrieved", UserListPayload { users }))
}

async fn update_role(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Body(body): Body<UpdateRoleRequest>,
) -> Result<Json<Envelope<UserPayload>>> {
    caller.require(Action::ManageUsers)?;
    let user = find_user(&state, &id).await?;

    if body.role != Role::Admin {
        guard_last_admin(&state, &user).await?;
    }

    db::users::update_role(&state.db.pool, &user.id, body.role).await?;
    tracing::info!(
        "User {} role changed to {} by {}",
        user.id,
        body.role.as_str(),
        caller.id
    );

    let user = find_user(&state, &id).await?;
    Ok(ok("User role updated", UserPayload { user }))
}

async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<DeletedUserPayload>>> {
    caller.require(Action::ManageUsers)?;
    let user = find_user(&state, &id).await?;
    guard_last_admin(&state, &user).await?;

    db::users::delete(&state.db.pool, &user.id).await?;
    tracing::info!("User {} deleted by {}", user.id, caller.id);

    Ok(ok("User deleted", DeletedUserPayload { user_id: user.id }))
}
