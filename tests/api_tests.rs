//! End-to-end tests driving the REST routes through the router
//!
//! Covers authentication, CRUD, user scoping, reference checks, includes,
//! CSV export and the dashboard endpoints.

mod common;

use axum::http::{StatusCode, header};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use common::{TestApp, base_config};
use serde_json::{Value, json};
use siteledger::config::PolicyOverrides;
use siteledger::entities::{Boq, BoqLineItem, BoqStatus};
use uuid::Uuid;

fn server(app: &TestApp) -> TestServer {
    TestServer::new(app.router.clone())
}

async fn create(server: &TestServer, token: &str, plural: &str, body: Value) -> Value {
    let response = server
        .post(&format!("/api/{}", plural))
        .authorization_bearer(token)
        .json(&body)
        .await;
    assert_eq!(
        response.status_code(),
        StatusCode::CREATED,
        "creating {}: {}",
        plural,
        response.text()
    );
    response.json::<Value>()
}

fn id_of(record: &Value) -> String {
    record["id"].as_str().expect("record has an id").to_string()
}

async fn create_project(server: &TestServer, token: &str, name: &str) -> Value {
    create(server, token, "projects", json!({ "name": name, "location": "Pune" })).await
}

async fn create_item(server: &TestServer, token: &str, name: &str, category: &str) -> Value {
    create(
        server,
        token,
        "inventory-items",
        json!({
            "itemName": name,
            "category": category,
            "quantity": 10,
            "unit": "bags"
        }),
    )
    .await
}

// =============================================================================
// Health & authentication
// =============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let server = server(&app);

    for path in ["/health", "/healthz"] {
        let response = server.get(path).await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "siteledger");
    }
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let app = TestApp::new().await;
    let server = server(&app);

    let response = server.get("/api/projects").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["code"], "UNAUTHORIZED");

    let response = server
        .get("/api/projects")
        .authorization_bearer("garbage")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let expired = app.expired_token_for(&app.engineer);
    let response = server
        .get("/api/projects")
        .authorization_bearer(expired)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_administration_requires_elevated_role() {
    let app = TestApp::new().await;
    let server = server(&app);

    let response = server
        .get("/api/users")
        .authorization_bearer(app.token_for(&app.engineer))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["code"], "FORBIDDEN");

    let response = server
        .get("/api/users")
        .authorization_bearer(app.token_for(&app.admin))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["pagination"]["total"], 3);

    // reading a single user only needs a session, but only their own
    let response = server
        .get(&format!("/api/users/{}", app.engineer.id))
        .authorization_bearer(app.token_for(&app.engineer))
        .await;
    response.assert_status_ok();

    let response = server
        .get(&format!("/api/users/{}", app.admin.id))
        .authorization_bearer(app.token_for(&app.engineer))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_project_lifecycle() {
    let app = TestApp::new().await;
    let server = server(&app);
    let engineer = app.token_for(&app.engineer);
    let admin = app.token_for(&app.admin);

    let project = create_project(&server, &engineer, "Tower A").await;
    assert_eq!(project["status"], "planning");
    assert_eq!(project["managers"], json!([app.engineer.id]));
    let id = id_of(&project);

    let response = server
        .get(&format!("/api/projects/{}", id))
        .authorization_bearer(&engineer)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["name"], "Tower A");

    let response = server
        .put(&format!("/api/projects/{}", id))
        .authorization_bearer(&engineer)
        .json(&json!({ "status": "on_hold" }))
        .await;
    response.assert_status_ok();
    let updated = response.json::<Value>();
    assert_eq!(updated["status"], "on_hold");
    assert_eq!(updated["name"], "Tower A");
    assert_eq!(updated["location"], "Pune");

    // deleting is elevated-only by default
    let response = server
        .delete(&format!("/api/projects/{}", id))
        .authorization_bearer(&engineer)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .delete(&format!("/api/projects/{}", id))
        .authorization_bearer(&admin)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server
        .get(&format!("/api/projects/{}", id))
        .authorization_bearer(&engineer)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "ENTITY_NOT_FOUND");
}

#[tokio::test]
async fn test_delete_unknown_id_is_not_found() {
    let app = TestApp::new().await;
    let server = server(&app);

    let response = server
        .delete(&format!("/api/boqs/{}", Uuid::new_v4()))
        .authorization_bearer(app.token_for(&app.admin))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let app = TestApp::new().await;
    let server = server(&app);

    let response = server
        .put(&format!("/api/inventory-items/{}", Uuid::new_v4()))
        .authorization_bearer(app.token_for(&app.engineer))
        .json(&json!({ "quantity": 3 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_path_id() {
    let app = TestApp::new().await;
    let server = server(&app);

    let response = server
        .get("/api/invoices/not-a-uuid")
        .authorization_bearer(app.token_for(&app.admin))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "INVALID_ENTITY_ID");
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_field_and_body_validation() {
    let app = TestApp::new().await;
    let server = server(&app);
    let token = app.token_for(&app.engineer);

    let response = server
        .post("/api/inventory-items")
        .authorization_bearer(&token)
        .json(&json!({ "itemName": "  ", "category": "Cement", "quantity": 5, "unit": "bags" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");

    let response = server
        .post("/api/inventory-items")
        .authorization_bearer(&token)
        .json(&json!({
            "itemName": "Sand",
            "category": "Aggregate",
            "quantity": -1,
            "unit": "cft"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/inventory-items")
        .authorization_bearer(&token)
        .content_type("application/json")
        .text("{not json")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");

    let response = server
        .post("/api/users")
        .authorization_bearer(app.token_for(&app.admin))
        .json(&json!({ "name": "New", "email": "not-an-email", "role": "employee" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unresolved_reference_names_the_field() {
    let app = TestApp::new().await;
    let server = server(&app);

    let response = server
        .post("/api/invoices")
        .authorization_bearer(app.token_for(&app.accountant))
        .json(&json!({
            "invoiceNumber": "INV-001",
            "projectId": Uuid::new_v4(),
            "client": "Acme Builders",
            "amount": 1200.0,
            "dueDate": "2026-03-31"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["field"], "projectId");

    let response = server
        .post("/api/material-requests")
        .authorization_bearer(app.token_for(&app.engineer))
        .json(&json!({
            "purpose": "Slab casting",
            "items": [{ "inventoryItemId": Uuid::new_v4(), "quantity": 4 }]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["details"]["field"],
        "items[0].inventoryItemId"
    );
}

// =============================================================================
// Scoping
// =============================================================================

#[tokio::test]
async fn test_list_scoping() {
    let app = TestApp::new().await;
    let server = server(&app);
    let engineer = app.token_for(&app.engineer);
    let accountant = app.token_for(&app.accountant);
    let admin = app.token_for(&app.admin);

    create_item(&server, &engineer, "Cement", "Binder").await;
    create_item(&server, &engineer, "Steel", "Rebar").await;
    create_item(&server, &accountant, "Paper", "Office").await;

    // non-elevated callers see their own records, whatever userId says
    let response = server
        .get("/api/inventory-items")
        .authorization_bearer(&engineer)
        .add_query_param("userId", app.accountant.id)
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["pagination"]["total"], 2);
    assert!(
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|r| r["createdBy"] == json!(app.engineer.id))
    );

    // even a malformed userId is ignored for them
    let response = server
        .get("/api/inventory-items")
        .authorization_bearer(&engineer)
        .add_query_param("userId", "nonsense")
        .await;
    response.assert_status_ok();

    // elevated: no selection → everything
    let response = server
        .get("/api/inventory-items")
        .authorization_bearer(&admin)
        .await;
    assert_eq!(response.json::<Value>()["pagination"]["total"], 3);

    // elevated: another user selected → that user's records
    let response = server
        .get("/api/inventory-items")
        .authorization_bearer(&admin)
        .add_query_param("userId", app.accountant.id)
        .await;
    assert_eq!(response.json::<Value>()["pagination"]["total"], 1);

    // elevated: self selected → own records only
    let response = server
        .get("/api/inventory-items")
        .authorization_bearer(&admin)
        .add_query_param("userId", app.admin.id)
        .await;
    assert_eq!(response.json::<Value>()["pagination"]["total"], 0);

    // elevated: malformed userId is an error
    let response = server
        .get("/api/inventory-items")
        .authorization_bearer(&admin)
        .add_query_param("userId", "nonsense")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "INVALID_QUERY");
}

#[tokio::test]
async fn test_records_of_other_users_read_as_missing() {
    let app = TestApp::new().await;
    let server = server(&app);
    let engineer = app.token_for(&app.engineer);

    let paper = create_item(&server, &app.token_for(&app.accountant), "Paper", "Office").await;
    let path = format!("/api/inventory-items/{}", id_of(&paper));

    let response = server.get(&path).authorization_bearer(&engineer).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server
        .put(&path)
        .authorization_bearer(&engineer)
        .json(&json!({ "quantity": 0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // untouched, and still visible to its owner and to elevated roles
    for token in [app.token_for(&app.accountant), app.token_for(&app.admin)] {
        let response = server.get(&path).authorization_bearer(token).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["quantity"], 10.0);
    }

    // elevated roles reach it by id
    let response = server
        .put(&path)
        .authorization_bearer(app.token_for(&app.admin))
        .json(&json!({ "quantity": 4 }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_self_selection_can_mean_all_records() {
    let mut config = base_config();
    config.auth.self_selection = siteledger::scope::SelfSelectionPolicy::AllRecords;
    let app = TestApp::with_config(config).await;
    let server = server(&app);

    create_item(&server, &app.token_for(&app.engineer), "Cement", "Binder").await;

    let response = server
        .get("/api/inventory-items")
        .authorization_bearer(app.token_for(&app.admin))
        .add_query_param("userId", app.admin.id)
        .await;
    assert_eq!(response.json::<Value>()["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_scope_endpoint() {
    let app = TestApp::new().await;
    let server = server(&app);

    let response = server
        .get("/api/scope")
        .authorization_bearer(app.token_for(&app.admin))
        .add_query_param("userId", app.engineer.id)
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["elevated"], true);
    assert_eq!(body["effectiveTarget"], json!(app.engineer.id));
    assert_eq!(body["scope"], json!({ "kind": "user", "userId": app.engineer.id }));
    assert_eq!(body["directory"]["mode"], "available");
    assert_eq!(body["directory"]["users"].as_array().unwrap().len(), 3);

    let response = server
        .get("/api/scope")
        .authorization_bearer(app.token_for(&app.engineer))
        .add_query_param("userId", app.admin.id)
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["elevated"], false);
    assert_eq!(body["effectiveTarget"], json!(app.engineer.id));
    assert_eq!(body["directory"]["mode"], "own_only");

    let response = server.get("/api/scope").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Query features
// =============================================================================

#[tokio::test]
async fn test_pagination_filter_and_sort() {
    let app = TestApp::new().await;
    let server = server(&app);
    let token = app.token_for(&app.engineer);

    create_item(&server, &token, "Cement", "Binder").await;
    create_item(&server, &token, "Bricks", "Masonry").await;
    create_item(&server, &token, "Aggregate", "Masonry").await;

    let response = server
        .get("/api/inventory-items")
        .authorization_bearer(&token)
        .add_query_param("page", 1)
        .add_query_param("limit", 2)
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);
    assert_eq!(body["pagination"]["has_next"], true);

    let response = server
        .get("/api/inventory-items")
        .authorization_bearer(&token)
        .add_query_param("page", u64::MAX)
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["has_next"], false);

    let response = server
        .get("/api/inventory-items")
        .authorization_bearer(&token)
        .add_query_param("filter", r#"{"category":"Masonry"}"#)
        .add_query_param("sort", "itemName:asc")
        .await;
    let body = response.json::<Value>();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["itemName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Aggregate", "Bricks"]);

    let response = server
        .get("/api/inventory-items")
        .authorization_bearer(&token)
        .add_query_param("filter", "[1,2]")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payments_filter_by_invoice_and_include() {
    let app = TestApp::new().await;
    let server = server(&app);
    let token = app.token_for(&app.accountant);

    let project = create_project(&server, &token, "Villa 7").await;
    let invoice = create(
        &server,
        &token,
        "invoices",
        json!({
            "invoiceNumber": "INV-2026/014",
            "projectId": project["id"],
            "client": "Kulkarni Family",
            "amount": 50000.0,
            "dueDate": "2026-02-15"
        }),
    )
    .await;
    assert_eq!(invoice["status"], "Pending");

    create(
        &server,
        &token,
        "payments",
        json!({ "paymentType": "bank_transfer", "amount": 20000.0, "invoiceId": invoice["id"] }),
    )
    .await;
    create(
        &server,
        &token,
        "payments",
        json!({ "paymentType": "cash", "amount": 500.0 }),
    )
    .await;

    let response = server
        .get("/api/payments")
        .authorization_bearer(&token)
        .add_query_param("invoiceId", invoice["id"].as_str().unwrap())
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["userId"], json!(app.accountant.id));

    let response = server
        .get(&format!("/api/invoices/{}", id_of(&invoice)))
        .authorization_bearer(&token)
        .add_query_param("include", "project")
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["project"]["name"], "Villa 7");

    let response = server
        .get(&format!("/api/projects/{}", id_of(&project)))
        .authorization_bearer(&token)
        .add_query_param("include", "managers")
        .await;
    let body = response.json::<Value>();
    let managers = body["managers"].as_array().unwrap();
    assert_eq!(managers.len(), 1);
    assert_eq!(managers[0]["id"], json!(app.accountant.id));
    assert_eq!(managers[0]["name"], "Meera Accounts");
}

// =============================================================================
// Dashboards & export
// =============================================================================

#[tokio::test]
async fn test_boq_stats() {
    let app = TestApp::new().await;
    let server = server(&app);
    let engineer = app.token_for(&app.engineer);

    let tower = create_project(&server, &engineer, "Tower A").await;
    let villa = create_project(&server, &engineer, "Villa 7").await;

    for (project, rate) in [(&tower, 100.0), (&tower, 50.0), (&villa, 10.0)] {
        create(
            &server,
            &engineer,
            "boqs",
            json!({
                "title": "Civil works",
                "projectId": project["id"],
                "items": [{ "description": "RCC", "quantity": 2, "unit": "cum", "rate": rate }]
            }),
        )
        .await;
    }

    let response = server
        .get("/api/boqs/stats")
        .authorization_bearer(&engineer)
        .await;
    response.assert_status_ok();
    let stats = response.json::<Value>();
    assert_eq!(stats["totalBOQs"], 3);
    assert_eq!(stats["monthlyGrowth"], 3);
    assert_eq!(stats["pendingBOQs"], 3);
    assert_eq!(stats["activeProjects"], 2);
    assert_eq!(stats["totalValue"], 320.0);

    // the accountant owns no BOQs
    let response = server
        .get("/api/boqs/stats")
        .authorization_bearer(app.token_for(&app.accountant))
        .await;
    let stats = response.json::<Value>();
    assert_eq!(stats["totalBOQs"], 0);
    assert_eq!(stats["averageValue"], 0.0);
}

#[tokio::test]
async fn test_boq_stats_windows_are_strict() {
    let app = TestApp::new().await;
    let server = server(&app);
    let now = Utc::now();
    let project_id = Uuid::new_v4();

    for age in [
        Duration::days(7) - Duration::hours(1),
        Duration::days(7),
        Duration::days(29),
        Duration::days(30),
    ] {
        let created_at = now - age;
        let boq = Boq {
            id: Uuid::new_v4(),
            title: "Finishing".to_string(),
            project_id,
            created_by: app.engineer.id,
            status: BoqStatus::Pending,
            items: vec![BoqLineItem {
                description: "Plaster".to_string(),
                quantity: 1.0,
                unit: "sqm".to_string(),
                rate: 25.0,
            }],
            created_at,
            updated_at: created_at,
        };
        app.services.boqs.create(boq).await.unwrap();
    }

    let response = server
        .get("/api/boqs/stats")
        .authorization_bearer(app.token_for(&app.engineer))
        .await;
    response.assert_status_ok();
    let stats = response.json::<Value>();
    assert_eq!(stats["totalBOQs"], 4);
    assert_eq!(stats["pendingBOQs"], 1);
    assert_eq!(stats["monthlyGrowth"], 3);
    assert_eq!(stats["activeProjects"], 1);
    assert_eq!(stats["totalValue"], 100.0);
}

#[tokio::test]
async fn test_invoice_summary() {
    let app = TestApp::new().await;
    let server = server(&app);
    let token = app.token_for(&app.accountant);
    let project = create_project(&server, &token, "Tower A").await;

    for (number, amount, status) in [
        ("INV-1", 100.0, "Paid"),
        ("INV-2", 250.0, "Pending"),
        ("INV-3", 50.0, "Disputed"),
    ] {
        create(
            &server,
            &token,
            "invoices",
            json!({
                "invoiceNumber": number,
                "projectId": project["id"],
                "client": "Acme",
                "amount": amount,
                "status": status,
                "dueDate": "2026-01-31"
            }),
        )
        .await;
    }

    let response = server
        .get("/api/invoices/summary")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let summary = response.json::<Value>();
    assert_eq!(summary["totalInvoices"], 3);
    assert_eq!(summary["paidAmount"], 100.0);
    assert_eq!(summary["outstandingAmount"], 300.0);
    assert_eq!(summary["byStatus"]["Disputed"], 1);
}

#[tokio::test]
async fn test_csv_export() {
    let app = TestApp::new().await;
    let server = server(&app);
    let token = app.token_for(&app.engineer);

    create_item(&server, &token, "Cement", "Binder").await;
    create(
        &server,
        &token,
        "inventory-items",
        json!({
            "itemName": "Steel, TMT 12mm",
            "category": "Rebar",
            "quantity": 1.5,
            "unit": "ton",
            "location": "Yard \"B\""
        }),
    )
    .await;

    let response = server
        .get("/api/inventory-items/export.csv")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();
    let content_type = response.header(header::CONTENT_TYPE);
    assert!(content_type.to_str().unwrap().starts_with("text/csv"));

    let csv = response.text();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Item Name,Category,Quantity,Unit,Location");
    assert_eq!(lines[1], "Cement,Binder,10,bags,");
    assert_eq!(lines[2], r#""Steel, TMT 12mm",Rebar,1.5,ton,"Yard ""B""""#);

    let response = server.get("/api/inventory-items/export.csv").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Policy configuration
// =============================================================================

#[tokio::test]
async fn test_policy_overrides() {
    let mut config = base_config();
    config.policies.insert(
        "inventory-items".to_string(),
        PolicyOverrides {
            delete: Some("role:engineer".to_string()),
            list: Some("public".to_string()),
            ..Default::default()
        },
    );
    let app = TestApp::with_config(config).await;
    let server = server(&app);
    let engineer = app.token_for(&app.engineer);

    let item = create_item(&server, &engineer, "Cement", "Binder").await;

    let response = server.get("/api/inventory-items").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["pagination"]["total"], 1);

    let response = server
        .delete(&format!("/api/inventory-items/{}", id_of(&item)))
        .authorization_bearer(app.token_for(&app.admin))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .delete(&format!("/api/inventory-items/{}", id_of(&item)))
        .authorization_bearer(&engineer)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
}
