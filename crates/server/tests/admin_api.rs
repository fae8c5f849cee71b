mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{files_in, sample_report, TestApp};

#[tokio::test]
async fn delete_all_on_empty_collection() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;

    let reply = app
        .send(Method::DELETE, "/api/admin/reports/all", Some(&admin), None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let summary = reply.json();
    assert_eq!(summary["deletedReports"], 0);
    assert_eq!(summary["movedPDFs"], 0);
    assert_eq!(summary["failedPDFs"], 0);
}

#[tokio::test]
async fn bulk_delete_counts_each_outcome() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;

    let first = app.create_report(&admin, sample_report()).await;
    let second = app.create_report(&admin, sample_report()).await;
    let draft = app
        .send(
            Method::POST,
            "/api/reports/draft",
            Some(&admin),
            Some(json!({ "title": "WIP" })),
        )
        .await
        .json();

    // same day, same job and type: the second artifact gets a suffix
    assert_ne!(first["pdfPath"], second["pdfPath"]);
    assert_eq!(files_in(&app.reports_dir()).len(), 2);

    let ids = json!([
        first["report"]["id"],
        second["report"]["id"],
        draft["report"]["id"],
        first["report"]["id"],
        "0123456789abcdef01234567",
    ]);
    let reply = app
        .send(
            Method::DELETE,
            "/api/admin/reports/bulk",
            Some(&admin),
            Some(json!({ "reportIds": ids })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.json());

    let summary = reply.json();
    assert_eq!(summary["requested"], 4);
    assert_eq!(summary["deletedReports"], 3);
    assert_eq!(summary["notFound"], 1);
    assert_eq!(summary["movedPDFs"], 2);
    assert_eq!(summary["failedPDFs"], 0);

    assert!(files_in(&app.reports_dir()).is_empty());
    assert_eq!(files_in(&app.backup_dir()).len(), 2);

    let list = app.send(Method::GET, "/api/reports", Some(&admin), None).await;
    assert_eq!(list.json()["count"], 0);
}

#[tokio::test]
async fn bulk_delete_rejects_malformed_batch() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;
    let created = app.create_report(&admin, sample_report()).await;

    let reply = app
        .send(
            Method::DELETE,
            "/api/admin/reports/bulk",
            Some(&admin),
            Some(json!({ "reportIds": [created["report"]["id"], "nope"] })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let list = app.send(Method::GET, "/api/reports", Some(&admin), None).await;
    assert_eq!(list.json()["count"], 1);

    let reply = app
        .send(
            Method::DELETE,
            "/api/admin/reports/bulk",
            Some(&admin),
            Some(json!({ "reportIds": [] })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unresolvable_artifact_is_not_a_failed_move() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;

    let created = app.create_report(&admin, sample_report()).await;
    std::fs::remove_file(created["pdfPath"].as_str().unwrap()).unwrap();

    let reply = app
        .send(Method::DELETE, "/api/admin/reports/all", Some(&admin), None)
        .await;
    let summary = reply.json();
    assert_eq!(summary["deletedReports"], 1);
    assert_eq!(summary["movedPDFs"], 0);
    assert_eq!(summary["failedPDFs"], 0);
}

#[tokio::test]
async fn bulk_endpoints_are_admin_only() {
    let app = TestApp::new().await;
    let (_admin, _) = app.register("admin@example.com", "Ada Admin").await;
    let (employee, _) = app.register("emp@example.com", "Eve Employee").await;

    let reply = app
        .send(Method::DELETE, "/api/admin/reports/all", Some(&employee), None)
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .send(
            Method::POST,
            "/api/admin/reports/bulk-download",
            Some(&employee),
            Some(json!({ "reportIds": ["0123456789abcdef01234567"] })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bulk_download_lists_available_artifacts() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;

    let created = app.create_report(&admin, sample_report()).await;
    let id = created["report"]["id"].as_str().unwrap();
    let missing = "0123456789abcdef01234567";

    let reply = app
        .send(
            Method::POST,
            "/api/admin/reports/bulk-download",
            Some(&admin),
            Some(json!({ "reportIds": [id, missing] })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["requested"], 2);
    assert_eq!(body["available"][0]["reportId"], id);
    assert_eq!(
        body["available"][0]["downloadUrl"],
        format!("/api/admin/reports/{id}/download").as_str()
    );
    assert_eq!(body["missing"], json!([missing]));

    let reply = app
        .send(
            Method::GET,
            &format!("/api/admin/reports/{id}/download"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn last_admin_cannot_be_removed() {
    let app = TestApp::new().await;
    let (admin, admin_id) = app.register("admin@example.com", "Ada Admin").await;
    let (_, employee_id) = app.register("emp@example.com", "Eve Employee").await;

    let reply = app
        .send(Method::DELETE, &format!("/api/users/{admin_id}"), Some(&admin), None)
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .send(
            Method::PUT,
            &format!("/api/users/{admin_id}/role"),
            Some(&admin),
            Some(json!({ "role": "employee" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    // promote a second admin, then the first may step down
    let reply = app
        .send(
            Method::PUT,
            &format!("/api/users/{employee_id}/role"),
            Some(&admin),
            Some(json!({ "role": "admin" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["user"]["role"], "admin");

    let reply = app
        .send(
            Method::PUT,
            &format!("/api/users/{admin_id}/role"),
            Some(&admin),
            Some(json!({ "role": "project_manager" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn role_changes_apply_to_live_tokens() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;
    let (employee, employee_id) = app.register("emp@example.com", "Eve Employee").await;

    let created = app.create_report(&admin, sample_report()).await;
    let id = created["report"]["id"].as_str().unwrap();
    let edit = json!({ "findings": "Reviewed on site" });

    let reply = app
        .send(Method::PUT, &format!("/api/reports/{id}"), Some(&employee), Some(edit.clone()))
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    app.send(
        Method::PUT,
        &format!("/api/users/{employee_id}/role"),
        Some(&admin),
        Some(json!({ "role": "project_manager" })),
    )
    .await;

    let reply = app
        .send(Method::PUT, &format!("/api/reports/{id}"), Some(&employee), Some(edit))
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let me = app.send(Method::GET, "/api/auth/me", Some(&employee), None).await;
    assert_eq!(me.json()["user"]["role"], "project_manager");
}

#[tokio::test]
async fn failed_backup_moves_are_counted() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;

    let created = app.create_report(&admin, sample_report()).await;
    let pdf_path = std::path::PathBuf::from(created["pdfPath"].as_str().unwrap());
    app.block_backup_dir();

    let reply = app
        .send(
            Method::DELETE,
            "/api/admin/reports/bulk",
            Some(&admin),
            Some(json!({ "reportIds": [created["report"]["id"]] })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let summary = reply.json();
    assert_eq!(summary["success"], true);
    assert_eq!(summary["deletedReports"], 1);
    assert_eq!(summary["movedPDFs"], 0);
    assert_eq!(summary["failedPDFs"], 1);

    assert!(pdf_path.exists());
    let list = app.send(Method::GET, "/api/reports", Some(&admin), None).await;
    assert_eq!(list.json()["count"], 0);
}

#[tokio::test]
async fn bulk_delete_folds_id_case() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;

    let created = app.create_report(&admin, sample_report()).await;
    let id = created["report"]["id"].as_str().unwrap();

    let reply = app
        .send(
            Method::DELETE,
            "/api/admin/reports/bulk",
            Some(&admin),
            Some(json!({ "reportIds": [id.to_ascii_uppercase(), id] })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    let summary = reply.json();
    assert_eq!(summary["requested"], 1);
    assert_eq!(summary["deletedReports"], 1);
    assert_eq!(summary["notFound"], 0);
    assert_eq!(summary["movedPDFs"], 1);
}
