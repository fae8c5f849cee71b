use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db::{
        self,
        models::{Inspector, Project},
    },
    error::{AppError, Result},
    middleware::auth::AuthUser,
    routes::{ok, Body, Envelope},
    services::{policy::Action, projects},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/:id/employees", post(add_employee))
        .route("/:id/employees/:user_id", delete(remove_employee))
        .route("/:id/inspectors", post(add_inspector))
        .route(
            "/:id/inspectors/:inspector_id",
            put(update_inspector).delete(remove_inspector),
        )
        .route("/:id/reports", post(link_report))
        .route("/:id/reports/:report_id", delete(unlink_report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub client_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub client_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorRequest {
    pub name: String,
    pub company: Option<String>,
    pub specialization: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReportRequest {
    pub report_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EmployeePathParams {
    pub id: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct InspectorPathParams {
    pub id: String,
    pub inspector_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportPathParams {
    pub id: String,
    pub report_id: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectPayload {
    pub project: Project,
}

#[derive(Debug, Serialize)]
pub struct ProjectListPayload {
    pub count: usize,
    pub projects: Vec<Project>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedProjectPayload {
    pub project_id: String,
}

async fn find_project(state: &AppState, id: &str) -> Result<Project> {
    let id = db::id::validate(id, "project")?;
    db::projects::find_by_id(&state.db.pool, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
}

fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(AppError::Validation(
            "End date cannot be before start date".to_string(),
        )),
        _ => Ok(()),
    }
}

async fn list_projects(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> Result<Json<Envelope<ProjectListPayload>>> {
    let projects = db::projects::list(&state.db.pool).await?;

    Ok(ok(
        "Projects retrieved",
        ProjectListPayload {
            count: projects.len(),
            projects,
        },
    ))
}

async fn create_project(
    State(state): State<AppState>,
    caller: AuthUser,
    Body(body): Body<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Envelope<ProjectPayload>>)> {
    caller.require(Action::ManageProjects)?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Project name is required".to_string()));
    }
    check_dates(body.start_date, body.end_date)?;
    let manager_id = body
        .manager_id
        .as_deref()
        .map(|id| db::id::validate(id, "manager"))
        .transpose()?;

    let now = Utc::now();
    let mut project = Project {
        id: db::id::new_id(),
        name: body.name.trim().to_string(),
        description: body.description,
        location: body.location,
        client_name: body.client_name,
        start_date: body.start_date,
        end_date: body.end_date,
        manager_id: manager_id.or_else(|| Some(caller.id.clone())),
        employees: Vec::new(),
        inspectors: Vec::new(),
        reports: Vec::new(),
        last_working_day: None,
        contract_day: None,
        created_at: now,
        updated_at: now,
    };
    project.contract_day = Project::contract_day_on(project.start_date, now.date_naive());

    db::projects::insert(&state.db.pool, &project).await?;
    tracing::info!("Project {} created by {}", project.id, caller.id);

    Ok((
        StatusCode::CREATED,
        ok("Project created", ProjectPayload { project }),
    ))
}

async fn get_project(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<ProjectPayload>>> {
    let project = find_project(&state, &id).await?;
    Ok(ok("Project retrieved", ProjectPayload { project }))
}

async fn update_project(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Body(body): Body<UpdateProjectRequest>,
) -> Result<Json<Envelope<ProjectPayload>>> {
    caller.require(Action::ManageProjects)?;
    let mut project = find_project(&state, &id).await?;

    if let Some(name) = body.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Project name is required".to_string()));
        }
        project.name = name.trim().to_string();
    }
    let manager_id = body
        .manager_id
        .as_deref()
        .map(|id| db::id::validate(id, "manager"))
        .transpose()?;
    project.description = body.description.or(project.description);
    project.location = body.location.or(project.location);
    project.client_name = body.client_name.or(project.client_name);
    project.start_date = body.start_date.or(project.start_date);
    project.end_date = body.end_date.or(project.end_date);
    project.manager_id = manager_id.or(project.manager_id);
    check_dates(project.start_date, project.end_date)?;

    db::projects::update(&state.db.pool, &project).await?;
    let project = find_project(&state, &id).await?;

    Ok(ok("Project updated", ProjectPayload { project }))
}

/// Reports keep their `projectId`; only the project record goes.
async fn delete_project(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<DeletedProjectPayload>>> {
    caller.require(Action::ManageProjects)?;
    let project = find_project(&state, &id).await?;

    db::projects::delete(&state.db.pool, &project.id).await?;
    tracing::info!("Project {} deleted by {}", project.id, caller.id);

    Ok(ok(
        "Project deleted",
        DeletedProjectPayload {
            project_id: project.id,
        },
    ))
}

async fn add_employee(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Body(body): Body<EmployeeRequest>,
) -> Result<Json<Envelope<ProjectPayload>>> {
    caller.require(Action::ManageProjects)?;
    let mut project = find_project(&state, &id).await?;

    let user_id = db::id::validate(&body.user_id, "user")?;
    if db::users::find_by_id(&state.db.pool, &user_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    if !project.employees.contains(&user_id) {
        project.employees.push(user_id);
        db::projects::update(&state.db.pool, &project).await?;
    }

    Ok(ok("Employee added", ProjectPayload { project }))
}

async fn remove_employee(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(params): Path<EmployeePathParams>,
) -> Result<Json<Envelope<ProjectPayload>>> {
    caller.require(Action::ManageProjects)?;
    let mut project = find_project(&state, &params.id).await?;

    let before = project.employees.len();
    project.employees.retain(|e| !e.eq_ignore_ascii_case(&params.user_id));
    if project.employees.len() == before {
        return Err(AppError::NotFound(
            "Employee is not assigned to this project".to_string(),
        ));
    }
    db::projects::update(&state.db.pool, &project).await?;

    Ok(ok("Employee removed", ProjectPayload { project }))
}

async fn add_inspector(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Body(body): Body<InspectorRequest>,
) -> Result<(StatusCode, Json<Envelope<ProjectPayload>>)> {
    caller.require(Action::ManageProjects)?;
    let mut project = find_project(&state, &id).await?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Inspector name is required".to_string()));
    }

    project.inspectors.push(Inspector {
        id: db::id::new_id(),
        name: body.name.trim().to_string(),
        company: body.company,
        specialization: body.specialization,
        active: body.active,
    });
    db::projects::update(&state.db.pool, &project).await?;

    Ok((
        StatusCode::CREATED,
        ok("Inspector added", ProjectPayload { project }),
    ))
}

async fn update_inspector(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(params): Path<InspectorPathParams>,
    Body(body): Body<InspectorRequest>,
) -> Result<Json<Envelope<ProjectPayload>>> {
    caller.require(Action::ManageProjects)?;
    let mut project = find_project(&state, &params.id).await?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Inspector name is required".to_string()));
    }

    let inspector = project
        .inspectors
        .iter_mut()
        .find(|i| i.id.eq_ignore_ascii_case(&params.inspector_id))
        .ok_or_else(|| AppError::NotFound("Inspector not found".to_string()))?;
    inspector.name = body.name.trim().to_string();
    inspector.company = body.company;
    inspector.specialization = body.specialization;
    inspector.active = body.active;

    db::projects::update(&state.db.pool, &project).await?;

    Ok(ok("Inspector updated", ProjectPayload { project }))
}

async fn remove_inspector(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(params): Path<InspectorPathParams>,
) -> Result<Json<Envelope<ProjectPayload>>> {
    caller.require(Action::ManageProjects)?;
    let mut project = find_project(&state, &params.id).await?;

    let before = project.inspectors.len();
    project.inspectors.retain(|i| !i.id.eq_ignore_ascii_case(&params.inspector_id));
    if project.inspectors.len() == before {
        return Err(AppError::NotFound("Inspector not found".to_string()));
    }
    db::projects::update(&state.db.pool, &project).await?;

    Ok(ok("Inspector removed", ProjectPayload { project }))
}

async fn link_report(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Body(body): Body<LinkReportRequest>,
) -> Result<Json<Envelope<ProjectPayload>>> {
    caller.require(Action::ManageProjects)?;
    let id = db::id::validate(&id, "project")?;
    let report_id = db::id::validate(&body.report_id, "report")?;

    if db::reports::find_by_id(&state.db.pool, &report_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Report not found".to_string()));
    }

    let project = projects::link_report(&state.db.pool, &id, &report_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    Ok(ok("Report linked to project", ProjectPayload { project }))
}

async fn unlink_report(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(params): Path<ReportPathParams>,
) -> Result<Json<Envelope<ProjectPayload>>> {
    caller.require(Action::ManageProjects)?;
    let id = db::id::validate(&params.id, "project")?;
    let report_id = db::id::validate(&params.report_id, "report")?;

    let project = projects::unlink_report(&state.db.pool, &id, &report_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    Ok(ok("Report unlinked from project", ProjectPayload { project }))
}
