mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use common::{sample_report, TestApp};

async fn create_project(app: &TestApp, token: &str, body: Value) -> Value {
    let reply = app
        .send(Method::POST, "/api/projects", Some(token), Some(body))
        .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.json());
    reply.json()["project"].clone()
}

#[tokio::test]
async fn contract_day_counts_from_start_date() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;

    let start = (Utc::now() - Duration::days(10)).date_naive();
    let project = create_project(
        &app,
        &admin,
        json!({ "name": "Harbor Tower", "startDate": start.to_string() }),
    )
    .await;
    assert_eq!(project["contractDay"], 10);

    let future = (Utc::now() + Duration::days(5)).date_naive();
    let project = create_project(
        &app,
        &admin,
        json!({ "name": "Next Phase", "startDate": future.to_string() }),
    )
    .await;
    assert_eq!(project["contractDay"], 0);

    let project = create_project(&app, &admin, json!({ "name": "Unscheduled" })).await;
    assert!(project["contractDay"].is_null());
}

#[tokio::test]
async fn report_lifecycle_keeps_back_references() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;

    let project = create_project(&app, &admin, json!({ "name": "Harbor Tower" })).await;
    let project_id = project["id"].as_str().unwrap();

    let mut body = sample_report();
    body["projectId"] = json!(project_id);
    let created = app.create_report(&admin, body).await;
    let report_id = created["report"]["id"].as_str().unwrap();

    let reply = app
        .send(Method::GET, &format!("/api/projects/{project_id}"), Some(&admin), None)
        .await;
    let project = &reply.json()["project"];
    assert_eq!(project["reports"], json!([report_id]));
    assert!(project["lastWorkingDay"].is_string());

    app.send(
        Method::DELETE,
        &format!("/api/reports/{report_id}"),
        Some(&admin),
        None,
    )
    .await;

    let reply = app
        .send(Method::GET, &format!("/api/projects/{project_id}"), Some(&admin), None)
        .await;
    let project = &reply.json()["project"];
    assert_eq!(project["reports"], json!([]));
    assert!(project["lastWorkingDay"].is_null());
}

#[tokio::test]
async fn project_name_appears_in_rendered_report_context() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;

    let project = create_project(&app, &admin, json!({ "name": "Harbor Tower" })).await;
    let project_id = project["id"].as_str().unwrap();

    // unknown but well-formed inspector id: rendering proceeds without it
    let mut body = sample_report();
    body["projectId"] = json!(project_id);
    body["inspectorId"] = json!("0123456789abcdef01234567");
    let created = app.create_report(&admin, body).await;
    assert_eq!(created["pdfGenerated"], true);
}

#[tokio::test]
async fn inspectors_get_their_own_ids() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;
    let project = create_project(&app, &admin, json!({ "name": "Harbor Tower" })).await;
    let project_id = project["id"].as_str().unwrap();

    let reply = app
        .send(
            Method::POST,
            &format!("/api/projects/{project_id}/inspectors"),
            Some(&admin),
            Some(json!({ "name": "Ian Inspector", "company": "Acme QA" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let inspector = reply.json()["project"]["inspectors"][0].clone();
    let inspector_id = inspector["id"].as_str().unwrap();
    assert_eq!(inspector_id.len(), 24);
    assert_eq!(inspector["active"], true);

    let reply = app
        .send(
            Method::PUT,
            &format!("/api/projects/{project_id}/inspectors/{inspector_id}"),
            Some(&admin),
            Some(json!({ "name": "Ian Inspector", "active": false })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["project"]["inspectors"][0]["active"], false);

    let reply = app
        .send(
            Method::DELETE,
            &format!("/api/projects/{project_id}/inspectors/{inspector_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["project"]["inspectors"], json!([]));
}

#[tokio::test]
async fn employees_can_read_but_not_manage_projects() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("admin@example.com", "Ada Admin").await;
    let (employee, employee_id) = app.register("emp@example.com", "Eve Employee").await;
    let project = create_project(&app, &admin, json!({ "name": "Harbor Tower" })).await;
    let project_id = project["id"].as_str().unwrap();

    let reply = app
        .send(
            Method::POST,
            "/api/projects",
            Some(&employee),
            Some(json!({ "name": "Rogue" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let reply = app
        .send(
            Method::POST,
            &format!("/api/projects/{project_id}/employees"),
            Some(&admin),
            Some(json!({ "userId": employee_id })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["project"]["employees"], json!([employee_id]));

    let reply = app.send(Method::GET, "/api/projects", Some(&employee), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["count"], 1);
}
