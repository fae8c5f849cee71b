use axum::{
    extract::{Path, State},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db,
    error::{AppError, Result},
    middleware::auth::AuthUser,
    routes::{ok, reports::pdf_response, Body, Envelope},
    services::{lifecycle::BulkDeleteSummary, policy::Action},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/bulk", delete(bulk_delete))
        .route("/reports/all", delete(delete_all))
        .route("/reports/bulk-download", post(bulk_download))
        .route("/reports/:id/download", get(download))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportIdsRequest {
    #[serde(default)]
    pub report_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadEntry {
    pub report_id: String,
    pub title: String,
    pub file_name: String,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestPayload {
    pub requested: usize,
    pub available: Vec<DownloadEntry>,
    pub missing: Vec<String>,
}

async fn bulk_delete(
    State(state): State<AppState>,
    caller: AuthUser,
    Body(body): Body<ReportIdsRequest>,
) -> Result<Json<Envelope<BulkDeleteSummary>>> {
    let summary = state.lifecycle.bulk_delete(body.report_ids, &caller).await?;

    Ok(ok(
        format!("{} report(s) deleted", summary.deleted_reports),
        summary,
    ))
}

async fn delete_all(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Envelope<BulkDeleteSummary>>> {
    let summary = state.lifecycle.delete_all(&caller).await?;

    Ok(ok(
        format!("All reports deleted ({})", summary.deleted_reports),
        summary,
    ))
}

async fn download(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    caller.require(Action::DownloadAnyReport)?;
    let report = state.lifecycle.get(&id).await?;
    pdf_response(&report, state.lifecycle.storage()).await
}

/// Lists which of the requested reports have a downloadable artifact.
async fn bulk_download(
    State(state): State<AppState>,
    caller: AuthUser,
    Body(body): Body<ReportIdsRequest>,
) -> Result<Json<Envelope<ManifestPayload>>> {
    caller.require(Action::DownloadAnyReport)?;

    if body.report_ids.is_empty() {
        return Err(AppError::Validation("No report ids provided".to_string()));
    }
    let report_ids = db::id::validate_all("reportIds", &body.report_ids)?;

    let storage = state.lifecycle.storage();
    let mut available = Vec::new();
    let mut missing = Vec::new();

    for report_id in &report_ids {
        let report = db::reports::find_by_id(&state.db.pool, report_id).await?;
        let resolved = report.as_ref().and_then(|r| {
            r.pdf_path
                .as_deref()
                .and_then(|p| storage.resolve(p))
                .map(|path| (r, path))
        });

        match resolved {
            Some((report, path)) => available.push(DownloadEntry {
                report_id: report.id.clone(),
                title: report.title.clone(),
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                download_url: format!("/api/admin/reports/{}/download", report.id),
            }),
            None => missing.push(report_id.clone()),
        }
    }

    Ok(ok(
        format!("{} of {} PDF(s) available", available.len(), report_ids.len()),
        ManifestPayload {
            requested: body.report_ids.len(),
            available,
            missing,
        },
    ))
}
