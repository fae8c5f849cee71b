use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ProjectManager,
    Supervisor,
    Inspector,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ProjectManager => "project_manager",
            Role::Supervisor => "supervisor",
            Role::Inspector => "inspector",
            Role::Employee => "employee",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AuthProvider {
    Local,
    Microsoft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    Submitted,
    Pending,
    Approved,
    Rejected,
    Completed,
    Reviewed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::Submitted => "submitted",
            ReportStatus::Pending => "pending",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
            ReportStatus::Completed => "completed",
            ReportStatus::Reviewed => "reviewed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborRow {
    pub position: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRow {
    pub equipment: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub temperature: Option<f64>,
    pub conditions: Option<String>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub location: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Value of a caller-supplied optional report field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

pub type Extensions = BTreeMap<String, ExtensionValue>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(rename = "jobname")]
    pub job_name: String,
    pub project_id: Option<String>,
    pub inspector_id: Option<String>,
    pub inspection_type: String,
    pub findings: String,
    pub recommendations: String,
    pub status: ReportStatus,
    pub labor: Vec<LaborRow>,
    pub equipment: Vec<EquipmentRow>,
    pub weather: Option<Weather>,
    pub extensions: Extensions,
    pub pdf_path: Option<String>,
    pub is_draft: bool,
    pub created_by: String,
    pub edited_by: Option<String>,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// The caller who filed the report or is named as its inspector.
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.created_by == user_id || self.inspector_id.as_deref() == Some(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspector {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub specialization: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub client_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager_id: Option<String>,
    pub employees: Vec<String>,
    pub inspectors: Vec<Inspector>,
    pub reports: Vec<String>,
    pub last_working_day: Option<DateTime<Utc>>,
    pub contract_day: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Whole days elapsed since the start date; zero before the project starts.
    pub fn contract_day_on(start_date: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
        start_date.map(|start| (today - start).num_days().max(0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub job_name: Option<String>,
    pub role: Role,
    pub permissions: Vec<String>,
    pub auth_provider: AuthProvider,
    #[serde(skip_serializing)]
    pub microsoft_access_token: Option<String>,
    #[serde(skip_serializing)]
    pub microsoft_refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
