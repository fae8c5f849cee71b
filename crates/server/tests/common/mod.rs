#![allow(dead_code)]

use std::path::PathBuf;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use sitereport_server::{
    app, config::Config, db::Database, services::storage::StorageService, AppState,
};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub bytes: Vec<u8>,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            port: 0,
            database_url: format!("sqlite:{}?mode=rwc", dir.path().join("test.db").display()),
            jwt_secret: "test-secret".to_string(),
            token_ttl_days: 1,
            reports_dir: dir.path().join("generated-reports"),
            backup_dir: dir.path().join("deleted-reports"),
        };

        let db = Database::connect(&config.database_url).await.unwrap();
        db.run_migrations().await.unwrap();

        let storage = StorageService::new(&config.reports_dir, &config.backup_dir)
            .with_search_roots(vec![dir.path().to_path_buf()]);
        storage.init().await.unwrap();

        let state = AppState::with_storage(db, config, storage);
        Self {
            router: app(state.clone()),
            state,
            dir,
        }
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.state.config.reports_dir.clone()
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.state.config.backup_dir.clone()
    }

    /// Replaces the backup directory with a regular file so relocation fails.
    pub fn block_backup_dir(&self) {
        let backup = self.backup_dir();
        std::fs::remove_dir_all(&backup).unwrap();
        std::fs::write(&backup, b"not a directory").unwrap();
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        Reply {
            status,
            headers,
            bytes,
        }
    }

    /// Registers an account and returns `(token, user id)`.
    pub async fn register(&self, email: &str, name: &str) -> (String, String) {
        let reply = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "name": name, "password": "correct-horse" })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.json());
        let body = reply.json();
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_report(&self, token: &str, body: Value) -> Value {
        let reply = self
            .send(Method::POST, "/api/reports", Some(token), Some(body))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.json());
        reply.json()
    }
}

pub fn sample_report() -> Value {
    json!({
        "title": "Foundation Check",
        "jobname": "Site A",
        "inspectionType": "safety",
        "findings": "OK",
        "projectId": null,
        "inspectorId": null
    })
}

pub fn files_in(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
