//! HTTP API tests run against an in-process router and a temp database.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::TestApp;

async fn create_template(app: &TestApp, title: &str) -> i64 {
    app.create(
        "/api/templates",
        json!({"title": title, "content": format!("{title} body")}),
    )
    .await
    .as_i64()
    .expect("template id")
}

async fn create_named(app: &TestApp, uri: &str, name: &str) -> i64 {
    app.create(uri, json!({"name": name}))
        .await
        .as_i64()
        .expect("entity id")
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));

    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let (status, body) = app.get("/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database_connected"], true);
    assert_eq!(body["env"], "development");
}

#[tokio::test]
async fn test_db_status_reports_schema() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/debug/db-status").await;
    assert_eq!(status, StatusCode::OK);

    let tables: Vec<&str> = body["tables"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(tables.contains(&"templates"));
    assert!(tables.contains(&"connect_children_categories"));
    assert!(
        body["completion_type_columns"]
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c["name"] == "template_id")
    );
    assert_eq!(body["capabilities"]["completion_type_template_link"], true);
}

#[tokio::test]
async fn test_template_aggregate() {
    let app = TestApp::new();
    let department = create_named(&app, "/api/departments", "Support").await;
    let color = app
        .create("/api/colors", json!({"name": "Red", "hex_value": "ff0000"}))
        .await;
    let short = create_named(&app, "/api/completion-types", "Short").await;
    let long = create_named(&app, "/api/completion-types", "Long").await;

    let (status, created) = app
        .post(
            "/api/templates",
            json!({
                "title": "Greeting",
                "content": "Hello",
                "department_id": department,
                "color_id": color,
                "completion_type_ids": [short, long],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, template) = app.get(&format!("/api/templates/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(template["title"], "Greeting");
    assert_eq!(template["department"]["name"], "Support");
    assert_eq!(template["color"]["hex_value"], "#ff0000");

    let names: Vec<&str> = template["completion_types"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|ct| ct["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Short", "Long"]);
}

#[tokio::test]
async fn test_create_template_validation() {
    let app = TestApp::new();

    let (status, body) = app.post("/api/templates", json!({"content": "x"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Template title is required");

    let (status, body) = app.post("/api/templates", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data provided");

    let (status, _) = app
        .post(
            "/api/templates",
            json!({"title": "T", "content": "C", "department_id": 42}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_template() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/templates/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Template not found");

    let (status, body) = app.get("/api/templates/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid template ID: abc");
}

#[tokio::test]
async fn test_single_field_update_reconciles_department() {
    let app = TestApp::new();
    let template = create_template(&app, "Greeting").await;
    let department = create_named(&app, "/api/departments", "Support").await;
    let uri = format!("/api/templates/{template}");

    let (status, body) = app.put(&uri, json!({"department_id": department})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Department associated successfully");

    let (_, fetched) = app.get(&uri).await;
    assert_eq!(fetched["department_id"], department);
    assert_eq!(fetched["title"], "Greeting");

    let (status, body) = app.put(&uri, json!({"department_id": "null"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Department association removed successfully");

    let (_, fetched) = app.get(&uri).await;
    assert!(fetched["department_id"].is_null());
}

#[tokio::test]
async fn test_single_field_update_errors() {
    let app = TestApp::new();
    let template = create_template(&app, "Greeting").await;
    let uri = format!("/api/templates/{template}");

    let (status, body) = app.put(&uri, json!({"department_id": "abc"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid department ID: abc");

    let (status, body) = app.put(&uri, json!({"department_id": 999})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Department with ID 999 not found");

    let (status, body) = app
        .put("/api/templates/999", json!({"department_id": null}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Template with ID 999 not found");
}

#[tokio::test]
async fn test_full_update_leaves_absent_links_untouched() {
    let app = TestApp::new();
    let department = create_named(&app, "/api/departments", "Support").await;
    let (_, created) = app
        .post(
            "/api/templates",
            json!({"title": "T", "content": "C", "department_id": department}),
        )
        .await;
    let uri = format!("/api/templates/{}", created["id"]);

    let (status, updated) = app
        .put(&uri, json!({"title": "T2", "content": "C2"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "T2");
    assert_eq!(updated["department_id"], department);

    let (status, updated) = app
        .put(&uri, json!({"title": "T3", "content": "C3", "department_id": ""}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["department_id"].is_null());
    assert!(updated["department"].is_null());
}

#[tokio::test]
async fn test_department_template_association() {
    let app = TestApp::new();
    let template = create_template(&app, "Greeting").await;
    let department = create_named(&app, "/api/departments", "Support").await;

    let (status, body) = app
        .put(
            &format!("/api/departments/{department}"),
            json!({"template_id": template}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Template associated successfully");

    let (status, listed) = app
        .get(&format!("/api/templates/{template}/departments"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["id"], department);
    assert_eq!(listed[0]["template_title"], "Greeting");

    let (status, _) = app
        .put(
            &format!("/api/departments/{department}"),
            json!({"template_id": null}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = app
        .get(&format!("/api/templates/{template}/departments"))
        .await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_template_color_endpoints() {
    let app = TestApp::new();
    let template = create_template(&app, "Greeting").await;
    let color = app
        .create("/api/colors", json!({"name": "Blue", "hex_value": "#0000ff"}))
        .await;
    let uri = format!("/api/templates/{template}/color");

    let (status, body) = app.put(&uri, json!({"color_id": color})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Color associated successfully");

    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Color removed from template {template}"));

    let (_, fetched) = app.get(&format!("/api/templates/{template}")).await;
    assert!(fetched["color_id"].is_null());
}

#[tokio::test]
async fn test_template_color_null_clears_association() {
    let app = TestApp::new();
    let template = create_template(&app, "Greeting").await;
    let color = app
        .create("/api/colors", json!({"name": "Blue", "hex_value": "#0000ff"}))
        .await;
    let uri = format!("/api/templates/{template}/color");

    let (status, _) = app.put(&uri, json!({"color_id": color})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.put(&uri, json!({"color_id": null})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Color association removed successfully");

    let (_, fetched) = app.get(&format!("/api/templates/{template}")).await;
    assert!(fetched["color_id"].is_null());

    let (status, body) = app.put(&uri, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "color_id is required");
}

#[tokio::test]
async fn test_color_hex_normalized() {
    let app = TestApp::new();

    let (status, color) = app
        .post("/api/colors", json!({"name": "Red", "hex_value": "ff0000"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(color["hex_value"], "#ff0000");

    let (status, body) = app.post("/api/colors", json!({"name": "Red"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Color hex value is required");
}

#[tokio::test]
async fn test_deleting_color_clears_template_reference() {
    let app = TestApp::new();
    let color = app
        .create("/api/colors", json!({"name": "Red", "hex_value": "f00"}))
        .await;
    let (_, created) = app
        .post(
            "/api/templates",
            json!({"title": "T", "content": "C", "color_id": color}),
        )
        .await;

    let (status, body) = app.delete(&format!("/api/colors/{color}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Color deleted");

    let (_, fetched) = app.get(&format!("/api/templates/{}", created["id"])).await;
    assert!(fetched["color_id"].is_null());
}

#[tokio::test]
async fn test_completion_type_delete_blocked_by_template() {
    let app = TestApp::new();
    let completion_type = create_named(&app, "/api/completion-types", "Short").await;
    let (_, created) = app
        .post(
            "/api/templates",
            json!({"title": "Blocker", "content": "C", "completion_type_id": completion_type}),
        )
        .await;

    let uri = format!("/api/completion-types/{completion_type}");
    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["templates"][0]["id"], created["id"]);
    assert_eq!(body["details"]["templates"][0]["title"], "Blocker");

    let (status, _) = app.delete(&format!("/api/templates/{}", created["id"])).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Completion type deleted");
}

#[tokio::test]
async fn test_replace_completion_types() {
    let app = TestApp::new();
    let template = create_template(&app, "Greeting").await;
    let short = create_named(&app, "/api/completion-types", "Short").await;
    let long = create_named(&app, "/api/completion-types", "Long").await;
    let uri = format!("/api/templates/{template}/completion-types");

    let (status, updated) = app
        .put(&uri, json!({"completion_type_ids": [short, long]}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completion_types"].as_array().unwrap().len(), 2);

    let (status, updated) = app.put(&uri, json!({"completion_type_ids": []})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completion_types"], json!([]));

    let (_, listed) = app.get(&uri).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_associate_single_completion_type() {
    let app = TestApp::new();
    let template = create_template(&app, "Greeting").await;
    let short = create_named(&app, "/api/completion-types", "Short").await;
    let uri = format!("/api/templates/{template}/completion-types/{short}");

    let (status, body) = app.put(&uri, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        format!("Completion type {short} associated with template {template}")
    );

    let (_, listed) = app
        .get(&format!("/api/templates/{template}/completion-types"))
        .await;
    assert_eq!(listed[0]["id"], short);

    let (status, _) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Association not found");
}

#[tokio::test]
async fn test_delete_template_clears_dependents() {
    let app = TestApp::new();
    let template = create_template(&app, "Greeting").await;
    let department = app
        .create(
            "/api/departments",
            json!({"name": "Support", "template_id": template}),
        )
        .await;
    let category = app
        .create(
            "/api/categories",
            json!({"name": "Intro", "template_id": template}),
        )
        .await;

    let (status, body) = app.delete(&format!("/api/templates/{template}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Template deleted");

    let (_, fetched) = app.get(&format!("/api/departments/{department}")).await;
    assert!(fetched["template_id"].is_null());
    let (_, fetched) = app.get(&format!("/api/categories/{category}")).await;
    assert!(fetched["template_id"].is_null());

    let (status, _) = app.delete(&format!("/api/templates/{template}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_children_categories() {
    let app = TestApp::new();
    let completion_type = create_named(&app, "/api/completion-types", "Short").await;
    let department = create_named(&app, "/api/departments", "Support").await;

    let (status, child) = app
        .post(
            "/api/children-categories",
            json!({"name": "Sub", "completion_type_id": completion_type}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = child["id"].as_str().unwrap().to_string();
    assert_eq!(child["completion_type_name"], "Short");

    let (status, body) = app
        .put(
            &format!("/api/children-categories/{id}"),
            json!({"department_id": department}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Department associated successfully");

    let (_, listed) = app
        .get(&format!("/api/departments/{department}/children-categories"))
        .await;
    assert_eq!(listed[0]["id"], id.as_str());

    let (_, listed) = app
        .get(&format!(
            "/api/completion-types/{completion_type}/children-categories"
        ))
        .await;
    assert_eq!(listed[0]["department_name"], "Support");

    let (status, body) = app.get("/api/children-categories/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid children category ID: not-a-uuid");

    let (status, body) = app.delete(&format!("/api/children-categories/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Children category deleted successfully");
}

#[tokio::test]
async fn test_variables() {
    let app = TestApp::new();

    let (status, variable) = app
        .post("/api/text/variables", json!({"namn": "kund"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(variable["variabel_namn"], "$kund$");
    assert_eq!(variable["comments"], false);
    let uri = format!("/api/text/variables/{}", variable["id"]);

    let (status, body) = app
        .put(&format!("{uri}/comments"), json!({"comments": true}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comments status updated successfully");
    assert_eq!(body["variable"]["comments"], true);

    let (status, body) = app
        .put(&format!("{uri}/comments"), json!({"other": 1}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing comments field in request data");

    let (status, body) = app.post("/api/text/variables", json!({"beskrivning": "x"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Variable name (namn) is required");

    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_information_items() {
    let app = TestApp::new();
    let template = create_template(&app, "Greeting").await;

    let (status, item) = app
        .post(
            "/api/information",
            json!({"name": "Opening hours", "label": "Hours", "template_id": template}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["template_title"], "Greeting");
    let uri = format!("/api/information/{}", item["id"]);

    let (_, listed) = app
        .get(&format!("/api/templates/{template}/information"))
        .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, body) = app
        .put(&format!("{uri}/comments"), json!({"comments": true}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["information"]["comments"], true);

    let (status, body) = app.put(&uri, json!({"template_id": ""})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Template association removed successfully");

    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Information item deleted successfully");
}

#[tokio::test]
async fn test_completion_type_link_disabled() {
    let app = TestApp::with_completion_type_link(Some(false));
    let template = create_template(&app, "Greeting").await;
    let completion_type = create_named(&app, "/api/completion-types", "Short").await;

    let (status, _) = app
        .put(
            &format!("/api/completion-types/{completion_type}"),
            json!({"template_id": template}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, listed) = app
        .get(&format!("/api/templates/{template}/completion-types"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));

    let (_, body) = app.get("/api/debug/db-status").await;
    assert_eq!(body["capabilities"]["completion_type_template_link"], false);
}
