use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::{
        self,
        models::{Report, ReportStatus},
        reports::ReportFilter,
    },
    error::{AppError, Result},
    middleware::auth::AuthUser,
    routes::{ok, Body, Envelope},
    services::{
        lifecycle::{ArtifactDisposition, CreateOutcome, RenderOutcome, ReportInput, ReportPatch},
        policy::Action,
        storage::StorageService,
    },
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports).post(create_report))
        .route("/draft", post(save_draft))
        .route(
            "/:id",
            get(get_report).put(update_report).delete(delete_report),
        )
        .route("/:id/pdf", get(download_pdf))
        .route("/:id/regenerate-pdf", post(regenerate_pdf))
}

/// A report as returned to clients, with artifact availability resolved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    #[serde(flatten)]
    pub report: Report,
    pub pdf_available: bool,
}

impl ReportView {
    pub fn new(report: Report, storage: &StorageService) -> Self {
        let pdf_available = storage.is_available(report.pdf_path.as_deref());
        Self {
            report,
            pdf_available,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportPayload {
    pub report: ReportView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPayload {
    pub report: ReportView,
    pub pdf_generated: bool,
    pub pdf_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportListPayload {
    pub count: usize,
    pub reports: Vec<ReportView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPayload {
    pub report_id: String,
    pub pdf_moved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListQuery {
    pub project_id: Option<String>,
    pub inspector_id: Option<String>,
    pub status: Option<ReportStatus>,
}

fn rendered_payload(outcome: RenderOutcome, storage: &StorageService) -> (String, RenderedPayload) {
    let (message, report, pdf_error) = match outcome {
        RenderOutcome::Rendered(report) => ("Report updated and PDF generated", report, None),
        RenderOutcome::Draft(report) => ("Draft updated", report, None),
        RenderOutcome::RenderFailed { report, reason } => (
            "Report saved but PDF generation failed",
            report,
            Some(reason),
        ),
    };
    let pdf_path = report.pdf_path.clone();

    (
        message.to_string(),
        RenderedPayload {
            pdf_generated: pdf_path.is_some(),
            pdf_path,
            pdf_error,
            report: ReportView::new(report, storage),
        },
    )
}

async fn list_reports(
    State(state): State<AppState>,
    caller: AuthUser,
    query: std::result::Result<Query<ReportListQuery>, QueryRejection>,
) -> Result<Json<Envelope<ReportListPayload>>> {
    caller.require(Action::ViewReports)?;
    let Query(query) = query?;

    let id_filter = |value: Option<String>, what: &str| {
        value
            .filter(|v| !v.is_empty())
            .map(|v| db::id::validate(&v, what))
            .transpose()
    };
    let filter = ReportFilter {
        project_id: id_filter(query.project_id, "project")?,
        inspector_id: id_filter(query.inspector_id, "inspector")?,
        status: query.status,
    };

    let storage = state.lifecycle.storage();
    let reports: Vec<ReportView> = state
        .lifecycle
        .list(&filter)
        .await?
        .into_iter()
        .map(|r| ReportView::new(r, storage))
        .collect();

    Ok(ok(
        "Reports retrieved",
        ReportListPayload {
            count: reports.len(),
            reports,
        },
    ))
}

async fn create_report(
    State(state): State<AppState>,
    caller: AuthUser,
    Body(body): Body<ReportInput>,
) -> Result<(StatusCode, Json<Envelope<RenderedPayload>>)> {
    let outcome = state.lifecycle.create(body, &caller).await?;
    let storage = state.lifecycle.storage();

    let (message, report, pdf_error) = match outcome {
        CreateOutcome::Created(report) => ("Report created and PDF generated", report, None),
        CreateOutcome::CreatedArtifactFailed { report, reason } => (
            "Report created but PDF generation failed",
            report,
            Some(reason),
        ),
    };
    let pdf_path = report.pdf_path.clone();

    Ok((
        StatusCode::CREATED,
        ok(
            message,
            RenderedPayload {
                pdf_generated: pdf_path.is_some(),
                pdf_path,
                pdf_error,
                report: ReportView::new(report, storage),
            },
        ),
    ))
}

async fn save_draft(
    State(state): State<AppState>,
    caller: AuthUser,
    Body(body): Body<ReportInput>,
) -> Result<(StatusCode, Json<Envelope<ReportPayload>>)> {
    let report = state.lifecycle.save_draft(body, &caller).await?;
    let report = ReportView::new(report, state.lifecycle.storage());

    Ok((StatusCode::CREATED, ok("Draft saved", ReportPayload { report })))
}

async fn get_report(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<ReportPayload>>> {
    caller.require(Action::ViewReports)?;
    let report = state.lifecycle.get(&id).await?;
    let report = ReportView::new(report, state.lifecycle.storage());

    Ok(ok("Report retrieved", ReportPayload { report }))
}

async fn update_report(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    Body(body): Body<ReportPatch>,
) -> Result<Json<Envelope<RenderedPayload>>> {
    let outcome = state.lifecycle.edit(&id, body, &caller).await?;
    let (message, payload) = rendered_payload(outcome, state.lifecycle.storage());

    Ok(ok(message, payload))
}

async fn regenerate_pdf(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<RenderedPayload>>> {
    let outcome = state.lifecycle.regenerate(&id, &caller).await?;
    let (_, payload) = rendered_payload(outcome, state.lifecycle.storage());

    let message = if payload.pdf_generated {
        "PDF regenerated"
    } else {
        "PDF regeneration failed"
    };
    Ok(ok(message, payload))
}

async fn delete_report(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Envelope<DeletedPayload>>> {
    let outcome = state.lifecycle.delete(&id, &caller).await?;

    let (message, payload) = match outcome.artifact {
        ArtifactDisposition::Relocated(path) => (
            "Report deleted and PDF moved to backup",
            DeletedPayload {
                report_id: outcome.report_id,
                pdf_moved: true,
                backup_path: Some(path.to_string_lossy().into_owned()),
                pdf_error: None,
            },
        ),
        ArtifactDisposition::NoArtifact => (
            "Report deleted",
            DeletedPayload {
                report_id: outcome.report_id,
                pdf_moved: false,
                backup_path: None,
                pdf_error: None,
            },
        ),
        ArtifactDisposition::MoveFailed(reason) => (
            "Report deleted but PDF could not be moved to backup",
            DeletedPayload {
                report_id: outcome.report_id,
                pdf_moved: false,
                backup_path: None,
                pdf_error: Some(reason),
            },
        ),
    };

    Ok(ok(message, payload))
}

/// Reads the resolved artifact into an attachment response.
pub async fn pdf_response(report: &Report, storage: &StorageService) -> Result<Response> {
    let path = report
        .pdf_path
        .as_deref()
        .and_then(|p| storage.resolve(p))
        .ok_or_else(|| AppError::NotFound("PDF not found for this report".to_string()))?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::NotFound("PDF not found for this report".to_string()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().replace('"', ""))
        .unwrap_or_else(|| format!("{}.pdf", report.id));

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

async fn download_pdf(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    caller.require(Action::ViewReports)?;
    let report = state.lifecycle.get(&id).await?;
    pdf_response(&report, state.lifecycle.storage()).await
}
