// Keeps Project.reports and Project.lastWorkingDay consistent with reports

use sqlx::SqlitePool;

use crate::{
    db::{self, models::Project},
    error::Result,
};

async fn refresh_last_working_day(pool: &SqlitePool, project: &mut Project) -> Result<()> {
    let stamps = db::reports::created_at_of(pool, &project.reports).await?;
    project.last_working_day = stamps.into_iter().max();
    Ok(())
}

/// Adds the report to the project's back-reference list. Returns the updated
/// project, or `None` when the project does not exist.
pub async fn link_report(
    pool: &SqlitePool,
    project_id: &str,
    report_id: &str,
) -> Result<Option<Project>> {
    let Some(mut project) = db::projects::find_by_id(pool, project_id).await? else {
        return Ok(None);
    };

    if !project.reports.iter().any(|r| r == report_id) {
        project.reports.push(report_id.to_string());
    }
    refresh_last_working_day(pool, &mut project).await?;
    db::projects::update(pool, &project).await?;

    Ok(Some(project))
}

pub async fn unlink_report(
    pool: &SqlitePool,
    project_id: &str,
    report_id: &str,
) -> Result<Option<Project>> {
    let Some(mut project) = db::projects::find_by_id(pool, project_id).await? else {
        return Ok(None);
    };

    project.reports.retain(|r| r != report_id);
    refresh_last_working_day(pool, &mut project).await?;
    db::projects::update(pool, &project).await?;

    Ok(Some(project))
}
