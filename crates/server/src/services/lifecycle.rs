//! Report lifecycle: persist, resolve relations, render, patch the artifact
//! path back, and soft-delete.
//!
//! The record always commits before rendering starts and is never rolled
//! back. Failures after the commit come back as degraded outcomes
//! (`CreatedArtifactFailed`, `ArtifactDisposition::MoveFailed`) rather than
//! errors. Concurrent edits of one report are not serialized; the last
//! database write wins.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::{
    db::{
        self,
        models::{EquipmentRow, Extensions, LaborRow, Project, Report, ReportStatus, User, Weather},
        Database,
    },
    error::{AppError, FieldError, Result},
    middleware::auth::AuthUser,
    services::{
        naming,
        policy::Action,
        projects,
        renderer::{RenderError, RenderInput, ReportRenderer},
        storage::StorageService,
    },
};

fn double_option<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportInput {
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(rename = "jobname", alias = "jobName")]
    pub job_name: String,
    pub project_id: Option<String>,
    pub inspector_id: Option<String>,
    pub inspection_type: String,
    pub findings: String,
    pub recommendations: String,
    pub status: Option<ReportStatus>,
    pub labor: Vec<LaborRow>,
    pub equipment: Vec<EquipmentRow>,
    pub weather: Option<Weather>,
    pub extensions: Extensions,
}

/// Fields left out keep their stored value; `null` clears nullable ones.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "jobname", alias = "jobName")]
    pub job_name: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub project_id: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub inspector_id: Option<Option<String>>,
    pub inspection_type: Option<String>,
    pub findings: Option<String>,
    pub recommendations: Option<String>,
    pub status: Option<ReportStatus>,
    pub labor: Option<Vec<LaborRow>>,
    pub equipment: Option<Vec<EquipmentRow>>,
    #[serde(deserialize_with = "double_option")]
    pub weather: Option<Option<Weather>>,
    pub extensions: Option<Extensions>,
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(Report),
    CreatedArtifactFailed { report: Report, reason: String },
}

impl CreateOutcome {
    pub fn report(&self) -> &Report {
        match self {
            CreateOutcome::Created(report) => report,
            CreateOutcome::CreatedArtifactFailed { report, .. } => report,
        }
    }
}

#[derive(Debug)]
pub enum RenderOutcome {
    Rendered(Report),
    /// Drafts are stored without an artifact.
    Draft(Report),
    RenderFailed { report: Report, reason: String },
}

impl RenderOutcome {
    pub fn report(&self) -> &Report {
        match self {
            RenderOutcome::Rendered(report) | RenderOutcome::Draft(report) => report,
            RenderOutcome::RenderFailed { report, .. } => report,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactDisposition {
    Relocated(PathBuf),
    NoArtifact,
    MoveFailed(String),
}

#[derive(Debug)]
pub struct DeleteOutcome {
    pub report_id: String,
    pub artifact: ArtifactDisposition,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteSummary {
    pub requested: usize,
    pub deleted_reports: usize,
    pub not_found: usize,
    #[serde(rename = "movedPDFs")]
    pub moved_pdfs: usize,
    #[serde(rename = "failedPDFs")]
    pub failed_pdfs: usize,
}

#[derive(Clone)]
pub struct ReportLifecycle {
    db: Database,
    renderer: ReportRenderer,
    storage: StorageService,
}

fn normalize_id(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

fn check_id(field: &str, value: Option<&str>, errors: &mut Vec<FieldError>) {
    if let Some(v) = value {
        if !db::id::is_valid(v) {
            errors.push(FieldError::new(field, "must be a 24-character hex id"));
        }
    }
}

fn check_rows(labor: &[LaborRow], equipment: &[EquipmentRow], errors: &mut Vec<FieldError>) {
    let bad_number = |n: f64| !n.is_finite() || n < 0.0;

    for (i, row) in labor.iter().enumerate() {
        if row.position.trim().is_empty() {
            errors.push(FieldError::new(&format!("labor[{i}].position"), "is required"));
        }
        if bad_number(row.quantity) || bad_number(row.hours) {
            errors.push(FieldError::new(
                &format!("labor[{i}]"),
                "quantity and hours must be non-negative numbers",
            ));
        }
    }
    for (i, row) in equipment.iter().enumerate() {
        if row.equipment.trim().is_empty() {
            errors.push(FieldError::new(
                &format!("equipment[{i}].equipment"),
                "is required",
            ));
        }
        if bad_number(row.quantity) || bad_number(row.hours) {
            errors.push(FieldError::new(
                &format!("equipment[{i}]"),
                "quantity and hours must be non-negative numbers",
            ));
        }
    }
}

fn validate_input(input: &ReportInput, submission: bool) -> Result<()> {
    let mut errors = Vec::new();

    if submission {
        if input.title.trim().is_empty() {
            errors.push(FieldError::new("title", "is required"));
        }
        if input.job_name.trim().is_empty() {
            errors.push(FieldError::new("jobname", "is required"));
        }
    }
    check_id("projectId", input.project_id.as_deref(), &mut errors);
    check_id("inspectorId", input.inspector_id.as_deref(), &mut errors);
    check_rows(&input.labor, &input.equipment, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidFields(errors))
    }
}

fn validate_patch(patch: &ReportPatch) -> Result<()> {
    let mut errors = Vec::new();

    if matches!(&patch.title, Some(t) if t.trim().is_empty()) {
        errors.push(FieldError::new("title", "cannot be empty"));
    }
    if let Some(Some(project_id)) = &patch.project_id {
        check_id("projectId", Some(project_id.trim()).filter(|v| !v.is_empty()), &mut errors);
    }
    if let Some(Some(inspector_id)) = &patch.inspector_id {
        check_id("inspectorId", Some(inspector_id.trim()).filter(|v| !v.is_empty()), &mut errors);
    }
    check_rows(
        patch.labor.as_deref().unwrap_or_default(),
        patch.equipment.as_deref().unwrap_or_default(),
        &mut errors,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::InvalidFields(errors))
    }
}

fn build_report(input: ReportInput, caller: &AuthUser, status: ReportStatus) -> Report {
    let now = Utc::now();
    let title = match input.title.trim() {
        "" => "Untitled Draft".to_string(),
        t => t.to_string(),
    };

    Report {
        id: db::id::new_id(),
        title,
        content: input.content,
        author: input.author,
        job_name: input.job_name,
        project_id: normalize_id(input.project_id),
        inspector_id: normalize_id(input.inspector_id),
        inspection_type: input.inspection_type,
        findings: input.findings,
        recommendations: input.recommendations,
        status,
        labor: input.labor,
        equipment: input.equipment,
        weather: input.weather,
        extensions: input.extensions,
        pdf_path: None,
        is_draft: status == ReportStatus::Draft,
        created_by: caller.id.clone(),
        edited_by: None,
        edited_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn apply_patch(report: &mut Report, patch: ReportPatch) {
    if let Some(title) = patch.title {
        report.title = title.trim().to_string();
    }
    if let Some(content) = patch.content {
        report.content = content;
    }
    if let Some(author) = patch.author {
        report.author = author;
    }
    if let Some(job_name) = patch.job_name {
        report.job_name = job_name;
    }
    if let Some(project_id) = patch.project_id {
        report.project_id = normalize_id(project_id);
    }
    if let Some(inspector_id) = patch.inspector_id {
        report.inspector_id = normalize_id(inspector_id);
    }
    if let Some(inspection_type) = patch.inspection_type {
        report.inspection_type = inspection_type;
    }
    if let Some(findings) = patch.findings {
        report.findings = findings;
    }
    if let Some(recommendations) = patch.recommendations {
        report.recommendations = recommendations;
    }
    if let Some(status) = patch.status {
        report.status = status;
        report.is_draft = status == ReportStatus::Draft;
    }
    if let Some(labor) = patch.labor {
        report.labor = labor;
    }
    if let Some(equipment) = patch.equipment {
        report.equipment = equipment;
    }
    if let Some(weather) = patch.weather {
        report.weather = weather;
    }
    if let Some(extensions) = patch.extensions {
        report.extensions = extensions;
    }
}

impl ReportLifecycle {
    pub fn new(db: Database, renderer: ReportRenderer, storage: StorageService) -> Self {
        Self {
            db,
            renderer,
            storage,
        }
    }

    pub fn storage(&self) -> &StorageService {
        &self.storage
    }

    async fn find(&self, report_id: &str) -> Result<Report> {
        let report_id = db::id::validate(report_id, "report")?;
        db::reports::find_by_id(&self.db.pool, &report_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))
    }

    fn authorize_edit(report: &Report, caller: &AuthUser) -> Result<()> {
        if report.is_authored_by(&caller.id) || caller.can(Action::EditAnyReport) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only the report's inspector or a manager can modify this report".to_string(),
            ))
        }
    }

    /// Lookup failures degrade to `None` so rendering can still proceed.
    async fn relations(&self, report: &Report) -> (Option<Project>, Option<User>) {
        let pool = &self.db.pool;

        let project = async {
            match report.project_id.as_deref() {
                Some(id) => db::projects::find_by_id(pool, id).await,
                None => Ok(None),
            }
        };
        let inspector = async {
            match report.inspector_id.as_deref() {
                Some(id) => db::users::find_by_id(pool, id).await,
                None => Ok(None),
            }
        };

        let (project, inspector) = futures::future::join(project, inspector).await;

        let project = project.unwrap_or_else(|e| {
            warn!("Project lookup failed for report {}: {e}", report.id);
            None
        });
        let inspector = inspector.unwrap_or_else(|e| {
            warn!("Inspector lookup failed for report {}: {e}", report.id);
            None
        });
        (project, inspector)
    }

    async fn render_artifact(
        &self,
        report: &Report,
        project: Option<&Project>,
        inspector: Option<&User>,
        replacing: Option<&Path>,
    ) -> std::result::Result<String, RenderError> {
        let generated_at = Utc::now();
        let file_name = naming::report_file_name(
            generated_at.date_naive(),
            &report.job_name,
            &report.inspection_type,
            inspector.map(|u| u.name.as_str()),
            &report.author,
        );
        let target = self.storage.allocate(&file_name, replacing);

        let input = RenderInput {
            report,
            project,
            inspector,
            generated_at,
        };
        let path = self.renderer.render(&input, &target).await?;
        Ok(path.to_string_lossy().into_owned())
    }

    async fn sync_project_link(&self, old: Option<&str>, new: Option<&str>, report_id: &str) {
        if old == new {
            return;
        }
        if let Some(old) = old {
            if let Err(e) = projects::unlink_report(&self.db.pool, old, report_id).await {
                warn!("Failed to unlink report {report_id} from project {old}: {e}");
            }
        }
        if let Some(new) = new {
            if let Err(e) = projects::link_report(&self.db.pool, new, report_id).await {
                warn!("Failed to link report {report_id} to project {new}: {e}");
            }
        }
    }

    async fn discard_file(&self, report_id: &str, path: &Path) {
        if let Err(e) = self.storage.remove(path).await {
            warn!("Failed to remove PDF {} for report {report_id}: {e}", path.display());
        }
    }

    /// Best-effort removal of the artifact a stored path resolves to, unless
    /// it is the artifact now in use.
    async fn discard_artifact(&self, report: &Report, keep: Option<&str>) {
        let Some(existing) = report.pdf_path.as_deref().and_then(|p| self.storage.resolve(p))
        else {
            return;
        };
        if keep.is_some_and(|keep| Path::new(keep) == existing) {
            return;
        }
        self.discard_file(&report.id, &existing).await;
    }

    pub async fn create(&self, input: ReportInput, caller: &AuthUser) -> Result<CreateOutcome> {
        caller.require(Action::CreateReport)?;
        validate_input(&input, true)?;

        let status = match input.status {
            None | Some(ReportStatus::Draft) => ReportStatus::Submitted,
            Some(status) => status,
        };
        let mut report = build_report(input, caller, status);

        db::reports::insert(&self.db.pool, &report).await?;
        info!("Report {} created by {}", report.id, caller.id);

        self.sync_project_link(None, report.project_id.as_deref(), &report.id)
            .await;

        let (project, inspector) = self.relations(&report).await;
        let rendered = self
            .render_artifact(&report, project.as_ref(), inspector.as_ref(), None)
            .await;

        let path = match rendered {
            Ok(path) => path,
            Err(e) => {
                warn!("PDF generation failed for report {}: {e}", report.id);
                return Ok(CreateOutcome::CreatedArtifactFailed {
                    report,
                    reason: e.to_string(),
                });
            }
        };

        let now = Utc::now();
        if let Err(e) = db::reports::set_pdf_path(&self.db.pool, &report.id, Some(&path), now).await
        {
            warn!("Failed to record PDF path for report {}: {e}", report.id);
            self.discard_file(&report.id, Path::new(&path)).await;
            return Ok(CreateOutcome::CreatedArtifactFailed {
                report,
                reason: e.to_string(),
            });
        }

        info!("PDF generated for report {}: {path}", report.id);
        report.pdf_path = Some(path);
        report.updated_at = now;
        Ok(CreateOutcome::Created(report))
    }

    pub async fn save_draft(&self, input: ReportInput, caller: &AuthUser) -> Result<Report> {
        caller.require(Action::CreateReport)?;
        validate_input(&input, false)?;

        let report = build_report(input, caller, ReportStatus::Draft);
        db::reports::insert(&self.db.pool, &report).await?;
        info!("Draft report {} saved by {}", report.id, caller.id);

        self.sync_project_link(None, report.project_id.as_deref(), &report.id)
            .await;

        Ok(report)
    }

    pub async fn get(&self, report_id: &str) -> Result<Report> {
        self.find(report_id).await
    }

    pub async fn list(&self, filter: &db::reports::ReportFilter) -> Result<Vec<Report>> {
        db::reports::list(&self.db.pool, filter).await
    }

    pub async fn edit(
        &self,
        report_id: &str,
        patch: ReportPatch,
        caller: &AuthUser,
    ) -> Result<RenderOutcome> {
        let existing = self.find(report_id).await?;
        Self::authorize_edit(&existing, caller)?;
        validate_patch(&patch)?;

        let mut report = existing.clone();
        apply_patch(&mut report, patch);
        if report.title.is_empty() {
            report.title = existing.title.clone();
        }
        let now = Utc::now();
        report.edited_by = Some(caller.id.clone());
        report.edited_at = Some(now);
        report.updated_at = now;

        // the superseded artifact is only removed once the update commits
        report.pdf_path = None;
        let outcome = if report.is_draft {
            None
        } else {
            let (project, inspector) = self.relations(&report).await;
            Some(
                self.render_artifact(&report, project.as_ref(), inspector.as_ref(), None)
                    .await,
            )
        };

        if let Some(Ok(path)) = &outcome {
            report.pdf_path = Some(path.clone());
        }

        if let Err(e) = db::reports::update(&self.db.pool, &report).await {
            if let Some(path) = &report.pdf_path {
                self.discard_file(&report.id, Path::new(path)).await;
            }
            return Err(e);
        }
        self.discard_artifact(&existing, report.pdf_path.as_deref()).await;
        info!("Report {} edited by {}", report.id, caller.id);

        self.sync_project_link(
            existing.project_id.as_deref(),
            report.project_id.as_deref(),
            &report.id,
        )
        .await;

        Ok(match outcome {
            None => RenderOutcome::Draft(report),
            Some(Ok(_)) => RenderOutcome::Rendered(report),
            Some(Err(e)) => {
                warn!("PDF regeneration failed for edited report {}: {e}", report.id);
                RenderOutcome::RenderFailed {
                    report,
                    reason: e.to_string(),
                }
            }
        })
    }

    /// Re-renders from the stored fields. On failure the previous artifact,
    /// if any, stays in place.
    pub async fn regenerate(&self, report_id: &str, caller: &AuthUser) -> Result<RenderOutcome> {
        let mut report = self.find(report_id).await?;
        Self::authorize_edit(&report, caller)?;

        let previous = report
            .pdf_path
            .as_deref()
            .and_then(|p| self.storage.resolve(p));

        let (project, inspector) = self.relations(&report).await;
        let rendered = self
            .render_artifact(
                &report,
                project.as_ref(),
                inspector.as_ref(),
                previous.as_deref(),
            )
            .await;

        let path = match rendered {
            Ok(path) => path,
            Err(e) => {
                warn!("PDF regeneration failed for report {}: {e}", report.id);
                return Ok(RenderOutcome::RenderFailed {
                    report,
                    reason: e.to_string(),
                });
            }
        };

        if let Some(previous) = previous.filter(|p| p != Path::new(&path)) {
            if let Err(e) = self.storage.remove(&previous).await {
                warn!("Failed to remove superseded PDF for report {}: {e}", report.id);
            }
        }

        let now = Utc::now();
        db::reports::set_pdf_path(&self.db.pool, &report.id, Some(&path), now).await?;
        info!("PDF regenerated for report {}: {path}", report.id);

        report.pdf_path = Some(path);
        report.updated_at = now;
        Ok(RenderOutcome::Rendered(report))
    }

    /// Relocates the artifact (best effort) and then deletes the record.
    async fn remove_report(&self, report: &Report) -> Result<ArtifactDisposition> {
        let artifact = match report.pdf_path.as_deref().and_then(|p| self.storage.resolve(p)) {
            None => ArtifactDisposition::NoArtifact,
            Some(path) => match self.storage.relocate_to_backup(&path).await {
                Ok(moved) => {
                    info!("Moved PDF for report {} to {}", report.id, moved.display());
                    ArtifactDisposition::Relocated(moved)
                }
                Err(e) => {
                    warn!("Failed to move PDF for report {} to backup: {e}", report.id);
                    ArtifactDisposition::MoveFailed(e.to_string())
                }
            },
        };

        db::reports::delete(&self.db.pool, &report.id).await?;
        self.sync_project_link(report.project_id.as_deref(), None, &report.id)
            .await;

        Ok(artifact)
    }

    pub async fn delete(&self, report_id: &str, caller: &AuthUser) -> Result<DeleteOutcome> {
        caller.require(Action::DeleteReport)?;
        let report = self.find(report_id).await?;

        let artifact = self.remove_report(&report).await?;
        info!("Report {} deleted by {}", report.id, caller.id);

        Ok(DeleteOutcome {
            report_id: report.id,
            artifact,
        })
    }

    async fn delete_many(&self, report_ids: Vec<String>) -> Result<BulkDeleteSummary> {
        let mut summary = BulkDeleteSummary {
            requested: report_ids.len(),
            ..BulkDeleteSummary::default()
        };

        for report_id in report_ids {
            let Some(report) = db::reports::find_by_id(&self.db.pool, &report_id).await? else {
                summary.not_found += 1;
                continue;
            };

            match self.remove_report(&report).await? {
                ArtifactDisposition::Relocated(_) => summary.moved_pdfs += 1,
                ArtifactDisposition::MoveFailed(_) => summary.failed_pdfs += 1,
                ArtifactDisposition::NoArtifact => {}
            }
            summary.deleted_reports += 1;
        }

        Ok(summary)
    }

    pub async fn bulk_delete(
        &self,
        report_ids: Vec<String>,
        caller: &AuthUser,
    ) -> Result<BulkDeleteSummary> {
        caller.require(Action::BulkManageReports)?;

        if report_ids.is_empty() {
            return Err(AppError::Validation("No report ids provided".to_string()));
        }
        let report_ids = db::id::validate_all("reportIds", &report_ids)?;

        let mut seen = HashSet::new();
        let unique: Vec<String> = report_ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let summary = self.delete_many(unique).await?;
        info!(
            "Bulk delete by {}: {} deleted, {} PDFs moved, {} PDF moves failed",
            caller.id, summary.deleted_reports, summary.moved_pdfs, summary.failed_pdfs
        );
        Ok(summary)
    }

    pub async fn delete_all(&self, caller: &AuthUser) -> Result<BulkDeleteSummary> {
        caller.require(Action::BulkManageReports)?;

        let report_ids = db::reports::list_ids(&self.db.pool).await?;
        let summary = self.delete_many(report_ids).await?;
        warn!(
            "All reports deleted by {}: {} deleted, {} PDFs moved, {} PDF moves failed",
            caller.id, summary.deleted_reports, summary.moved_pdfs, summary.failed_pdfs
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let patch: ReportPatch = serde_json::from_value(serde_json::json!({
            "projectId": null,
            "status": "submitted",
        }))
        .unwrap();
        assert_eq!(patch.project_id, Some(None));
        assert_eq!(patch.inspector_id, None);
        assert_eq!(patch.weather, None);
        assert_eq!(patch.status, Some(ReportStatus::Submitted));
    }

    #[test]
    fn input_accepts_jobname_spelling() {
        let input: ReportInput = serde_json::from_value(serde_json::json!({
            "title": "Foundation Check",
            "jobname": "Site A",
            "inspectionType": "safety",
            "findings": "OK",
            "projectId": null,
            "inspectorId": null,
        }))
        .unwrap();
        assert_eq!(input.job_name, "Site A");
        assert!(validate_input(&input, true).is_ok());

        let camel: ReportInput =
            serde_json::from_value(serde_json::json!({ "jobName": "Site B" })).unwrap();
        assert_eq!(camel.job_name, "Site B");
    }

    #[test]
    fn submission_requires_title_and_job() {
        let err = validate_input(&ReportInput::default(), true).unwrap_err();
        match err {
            AppError::InvalidFields(fields) => {
                let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["title", "jobname"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(validate_input(&ReportInput::default(), false).is_ok());
    }

    #[test]
    fn rejects_malformed_relation_ids_and_rows() {
        let input = ReportInput {
            title: "t".into(),
            job_name: "j".into(),
            project_id: Some("not-an-id".into()),
            labor: vec![LaborRow {
                position: "".into(),
                quantity: -1.0,
                hours: 2.0,
            }],
            ..ReportInput::default()
        };
        match validate_input(&input, true).unwrap_err() {
            AppError::InvalidFields(fields) => assert_eq!(fields.len(), 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn patch_merges_over_existing_fields() {
        let now = Utc::now();
        let mut report = Report {
            id: db::id::new_id(),
            title: "Original".into(),
            content: "body".into(),
            author: "A".into(),
            job_name: "Job".into(),
            project_id: Some(db::id::new_id()),
            inspector_id: None,
            inspection_type: "safety".into(),
            findings: "f".into(),
            recommendations: "r".into(),
            status: ReportStatus::Draft,
            labor: Vec::new(),
            equipment: Vec::new(),
            weather: None,
            extensions: Extensions::new(),
            pdf_path: None,
            is_draft: true,
            created_by: db::id::new_id(),
            edited_by: None,
            edited_at: None,
            created_at: now,
            updated_at: now,
        };

        apply_patch(
            &mut report,
            ReportPatch {
                findings: Some("cracks at grid B".into()),
                project_id: Some(None),
                status: Some(ReportStatus::Submitted),
                ..ReportPatch::default()
            },
        );

        assert_eq!(report.title, "Original");
        assert_eq!(report.content, "body");
        assert_eq!(report.findings, "cracks at grid B");
        assert_eq!(report.project_id, None);
        assert_eq!(report.status, ReportStatus::Submitted);
        assert!(!report.is_draft);
    }
}
