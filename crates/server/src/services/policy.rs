//! Role/action policy table shared by routes and the report lifecycle.

use crate::db::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewReports,
    CreateReport,
    /// Edit or regenerate a report the caller did not author.
    EditAnyReport,
    DeleteReport,
    BulkManageReports,
    DownloadAnyReport,
    ManageProjects,
    ManageUsers,
}

impl Action {
    /// Name used in a user's explicit `permissions` list.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ViewReports => "view_reports",
            Action::CreateReport => "create_report",
            Action::EditAnyReport => "edit_any_report",
            Action::DeleteReport => "delete_report",
            Action::BulkManageReports => "bulk_manage_reports",
            Action::DownloadAnyReport => "download_any_report",
            Action::ManageProjects => "manage_projects",
            Action::ManageUsers => "manage_users",
        }
    }
}

pub fn is_manager_tier(role: Role) -> bool {
    matches!(role, Role::Admin | Role::ProjectManager)
}

/// Whether the role grants the action without any explicit permission.
pub fn role_allows(role: Role, action: Action) -> bool {
    match action {
        Action::ViewReports | Action::CreateReport => true,
        Action::EditAnyReport | Action::ManageProjects => is_manager_tier(role),
        Action::DeleteReport
        | Action::BulkManageReports
        | Action::DownloadAnyReport
        | Action::ManageUsers => role == Role::Admin,
    }
}

pub fn is_allowed(role: Role, permissions: &[String], action: Action) -> bool {
    role_allows(role, action) || permissions.iter().any(|p| p == action.as_str())
}
