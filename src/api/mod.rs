mod assignments;
mod drivers;
pub mod error;
mod extract;
mod operators;
mod validation;
mod vans;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Assignments
        .route(
            "/assignments",
            get(assignments::list_assignments)
                .post(assignments::create_assignment)
                .put(assignments::update_assignment),
        )
        .route("/assignments/assignDriver", post(assignments::assign_driver))
        // Operators
        .route(
            "/operators",
            get(operators::list_operators)
                .post(operators::create_operator)
                .delete(operators::archive_operator),
        )
        .route("/operators/:id", get(operators::get_operator))
        // Drivers
        .route(
            "/drivers",
            get(drivers::list_drivers)
                .post(drivers::create_driver)
                .delete(drivers::archive_driver),
        )
        .route("/drivers/:id", get(drivers::get_driver))
        // Vans
        .route("/vans", get(vans::list_vans).post(vans::create_van));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db;

    async fn test_app() -> Router {
        let pool = db::init_in_memory().await.unwrap();
        create_router(Arc::new(AppState::new(Config::default(), pool)))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn operator_payload(firstname: &str) -> Value {
        json!({
            "firstname": firstname,
            "middlename": "Reyes",
            "lastname": "Dela Cruz",
            "contact": "09171234567",
            "region": "NCR",
            "city": "Quezon City",
            "brgy": "Batasan Hills",
            "street": "IBP Road",
            "type": "",
            "emergency_name": "Maria Dela Cruz",
            "emergency_address": "IBP Road, Quezon City",
            "emergency_contact": "09181234567"
        })
    }

    fn driver_payload(firstname: &str, license_no: &str) -> Value {
        let mut payload = operator_payload(firstname);
        let fields = payload.as_object_mut().unwrap();
        fields.insert("type".into(), json!("professional"));
        fields.insert("license_no".into(), json!(license_no));
        fields.insert("dl_codes".into(), json!("B, B1, B2"));
        fields.insert("conditions".into(), json!("None"));
        fields.insert("expiration_date".into(), json!("2028-05-31"));
        payload
    }

    /// Operator + van + assignment; returns the assignment id
    async fn seed_assignment(app: &Router, name: &str, plate: &str) -> i64 {
        let (_, operator) = send(app, Method::POST, "/api/operators", Some(operator_payload(name))).await;
        let (_, van) = send(app, Method::POST, "/api/vans", Some(json!({ "plate_number": plate }))).await;
        let (status, assignment) = send(
            app,
            Method::POST,
            "/api/assignments",
            Some(json!({ "operator_id": operator["id"], "van_id": van["id"] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assignment["id"].as_i64().unwrap()
    }

    async fn seed_driver(app: &Router, name: &str, license_no: &str) -> i64 {
        let (status, driver) =
            send(app, Method::POST, "/api/drivers", Some(driver_payload(name, license_no))).await;
        assert_eq!(status, StatusCode::CREATED);
        driver["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app().await;
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_and_list_operators() {
        let app = test_app().await;

        let (status, created) =
            send(&app, Method::POST, "/api/operators", Some(operator_payload("Juan"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["firstname"], "Juan");
        assert_eq!(created["archived"], false);
        assert!(created.get("license_no").is_none());

        let (status, list) = send(&app, Method::GET, "/api/operators", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let id = created["id"].as_i64().unwrap();
        let (status, fetched) = send(&app, Method::GET, &format!("/api/operators/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["emergency_name"], "Maria Dela Cruz");
    }

    #[tokio::test]
    async fn test_create_operator_missing_fields_returns_error_message() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/operators",
            Some(json!({ "firstname": "Juan" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
        assert!(body["error"].as_str().unwrap().starts_with("Validation failed"));
        assert!(body["details"]["lastname"].is_array());
    }

    #[tokio::test]
    async fn test_driver_requires_license_fields() {
        let app = test_app().await;
        let (status, body) =
            send(&app, Method::POST, "/api/drivers", Some(operator_payload("Pedro"))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let details = &body["details"];
        assert!(details["license_no"].is_array());
        assert!(details["expiration_date"].is_array());
        assert!(details["type"].is_array());
        assert!(details["firstname"].is_null());
    }

    #[tokio::test]
    async fn test_duplicate_license_number_conflicts() {
        let app = test_app().await;
        seed_driver(&app, "Pedro", "N01-11-111111").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/drivers",
            Some(driver_payload("Jose", "N01-11-111111")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "A driver with this license number already exists");
    }

    #[tokio::test]
    async fn test_archive_operator_hides_it_from_listing() {
        let app = test_app().await;
        let (_, created) =
            send(&app, Method::POST, "/api/operators", Some(operator_payload("Juan"))).await;
        let id = created["id"].clone();

        let (status, body) =
            send(&app, Method::DELETE, "/api/operators", Some(json!({ "id": id }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["archived"], true);

        let (_, list) = send(&app, Method::GET, "/api/operators", None).await;
        assert!(list.as_array().unwrap().is_empty());

        let (status, _) =
            send(&app, Method::DELETE, "/api/operators", Some(json!({ "id": id }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_archive_driver() {
        let app = test_app().await;
        let id = seed_driver(&app, "Pedro", "N02-22-222222").await;

        let (status, _) =
            send(&app, Method::DELETE, "/api/drivers", Some(json!({ "id": id }))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::GET, &format!("/api/drivers/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_van_plate_is_normalised_and_unique() {
        let app = test_app().await;
        let (status, van) =
            send(&app, Method::POST, "/api/vans", Some(json!({ "plate_number": "abc-1234" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(van["plate_number"], "ABC-1234");

        let (status, _) =
            send(&app, Method::POST, "/api/vans", Some(json!({ "plate_number": "ABC-1234" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) =
            send(&app, Method::POST, "/api/vans", Some(json!({ "plate_number": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assignment_listing_embeds_related_records() {
        let app = test_app().await;
        let assignment_id = seed_assignment(&app, "Juan", "ABC-1234").await;
        let driver_id = seed_driver(&app, "Pedro", "N03-33-333333").await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/assignments/assignDriver",
            Some(json!({ "assignment_id": assignment_id, "driver_id": driver_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, list) = send(&app, Method::GET, "/api/assignments", None).await;
        let first = &list.as_array().unwrap()[0];
        assert_eq!(first["Operator"]["firstname"], "Juan");
        assert_eq!(first["Van"]["plate_number"], "ABC-1234");
        assert_eq!(first["Driver"]["firstname"], "Pedro");
        assert_eq!(first["driver_id"], driver_id);
        assert_eq!(first["archived"], false);
    }

    #[tokio::test]
    async fn test_driver_cannot_hold_two_active_assignments() {
        let app = test_app().await;
        let first = seed_assignment(&app, "Juan", "ABC-1234").await;
        let second = seed_assignment(&app, "Jose", "XYZ-9876").await;
        let driver_id = seed_driver(&app, "Pedro", "N04-44-444444").await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/assignments/assignDriver",
            Some(json!({ "assignment_id": first, "driver_id": driver_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/assignments/assignDriver",
            Some(json!({ "assignment_id": second, "driver_id": driver_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Driver is already assigned to another van");

        // Re-assigning to the same assignment is fine
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/assignments/assignDriver",
            Some(json!({ "assignment_id": first, "driver_id": driver_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_archiving_assignment_releases_driver_on_server() {
        let app = test_app().await;
        let first = seed_assignment(&app, "Juan", "ABC-1234").await;
        let second = seed_assignment(&app, "Jose", "XYZ-9876").await;
        let driver_id = seed_driver(&app, "Pedro", "N05-55-555555").await;

        send(
            &app,
            Method::POST,
            "/api/assignments/assignDriver",
            Some(json!({ "assignment_id": first, "driver_id": driver_id })),
        )
        .await;

        let (status, archived) = send(
            &app,
            Method::PUT,
            "/api/assignments",
            Some(json!({ "id": first, "archived": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(archived["archived"], true);
        assert_eq!(archived["driver_id"], driver_id);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/assignments/assignDriver",
            Some(json!({ "assignment_id": second, "driver_id": driver_id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // The archived assignment cannot come back while the driver is elsewhere
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/assignments",
            Some(json!({ "id": first, "archived": false })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_archived_assignment_rejects_driver() {
        let app = test_app().await;
        let assignment_id = seed_assignment(&app, "Juan", "ABC-1234").await;
        let driver_id = seed_driver(&app, "Pedro", "N06-66-666666").await;

        send(
            &app,
            Method::PUT,
            "/api/assignments",
            Some(json!({ "id": assignment_id, "archived": true })),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/assignments/assignDriver",
            Some(json!({ "assignment_id": assignment_id, "driver_id": driver_id })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Cannot assign a driver to an archived assignment");
    }

    #[tokio::test]
    async fn test_assign_unknown_records() {
        let app = test_app().await;
        let assignment_id = seed_assignment(&app, "Juan", "ABC-1234").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/assignments/assignDriver",
            Some(json!({ "assignment_id": assignment_id, "driver_id": 999 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Driver not found");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/assignments/assignDriver",
            Some(json!({ "assignment_id": 0, "driver_id": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_van_cannot_be_in_two_active_assignments() {
        let app = test_app().await;
        seed_assignment(&app, "Juan", "ABC-1234").await;

        let (_, operator) =
            send(&app, Method::POST, "/api/operators", Some(operator_payload("Jose"))).await;
        let (_, vans) = send(&app, Method::GET, "/api/vans", None).await;
        let van_id = vans.as_array().unwrap()[0]["id"].clone();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/assignments",
            Some(json!({ "operator_id": operator["id"], "van_id": van_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Van already has an active assignment");
    }

    #[tokio::test]
    async fn test_get_operator_by_id() {
        let app = test_app().await;
        let (_, created) =
            send(&app, Method::POST, "/api/operators", Some(operator_payload("Juan"))).await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) =
            send(&app, Method::GET, &format!("/api/operators/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["firstname"], "Juan");
        assert_eq!(body["type"], "");

        let (status, body) = send(&app, Method::GET, "/api/operators/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_cannot_share_a_driver() {
        let dir = tempfile::tempdir().unwrap();
        let pool = db::init(dir.path()).await.unwrap();
        let app = create_router(Arc::new(AppState::new(Config::default(), pool)));
        let driver_id = seed_driver(&app, "Pedro", "N07-77-777777").await;

        for round in 0..10 {
            let mut bodies = Vec::new();
            for slot in 0..2 {
                let (_, operator) = send(
                    &app,
                    Method::POST,
                    "/api/operators",
                    Some(operator_payload(&format!("Op{}{}", round, slot))),
                )
                .await;
                let (_, van) = send(
                    &app,
                    Method::POST,
                    "/api/vans",
                    Some(json!({ "plate_number": format!("R{}-{}", round, slot) })),
                )
                .await;
                bodies.push(json!({
                    "operator_id": operator["id"],
                    "van_id": van["id"],
                    "driver_id": driver_id
                }));
            }

            let handles: Vec<_> = bodies
                .into_iter()
                .map(|body| {
                    let app = app.clone();
                    tokio::spawn(async move {
                        send(&app, Method::POST, "/api/assignments", Some(body)).await
                    })
                })
                .collect();

            let mut statuses = Vec::new();
            for handle in handles {
                let (status, body) = handle.await.unwrap();
                if status == StatusCode::CONFLICT {
                    assert_eq!(body["error"], "Driver is already assigned to another van");
                }
                statuses.push(status.as_u16());
            }
            statuses.sort();
            assert_eq!(statuses, vec![201, 409], "round {}", round);

            // Free the driver for the next round
            let (_, list) = send(&app, Method::GET, "/api/assignments", None).await;
            let active = list
                .as_array()
                .unwrap()
                .iter()
                .find(|a| a["driver_id"] == driver_id && a["archived"] == false)
                .unwrap()
                .clone();
            let (status, _) = send(
                &app,
                Method::PUT,
                "/api/assignments",
                Some(json!({ "id": active["id"], "archived": true })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_restore_refused_when_van_moved_on() {
        let app = test_app().await;
        let first = seed_assignment(&app, "Juan", "ABC-1234").await;

        let (_, list) = send(&app, Method::GET, "/api/assignments", None).await;
        let van_id = list.as_array().unwrap()[0]["van_id"].clone();

        send(
            &app,
            Method::PUT,
            "/api/assignments",
            Some(json!({ "id": first, "archived": true })),
        )
        .await;

        let (_, operator) =
            send(&app, Method::POST, "/api/operators", Some(operator_payload("Jose"))).await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/assignments",
            Some(json!({ "operator_id": operator["id"], "van_id": van_id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/assignments",
            Some(json!({ "id": first, "archived": false })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Van already has an active assignment");
    }

    #[tokio::test]
    async fn test_missing_body_fields_use_error_body() {
        let app = test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/assignments/assignDriver",
            Some(json!({ "assignment_id": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
        assert!(body["error"].as_str().unwrap().contains("driver_id"));

        let (status, body) = send(&app, Method::DELETE, "/api/operators", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");

        let (status, body) =
            send(&app, Method::PUT, "/api/assignments", Some(json!({ "id": 1 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("archived"));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/vans",
            Some(json!({ "plate_number": 42 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
    }

    #[tokio::test]
    async fn test_malformed_json_and_path_use_error_body() {
        let app = test_app().await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/operators")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Request body is not valid JSON");
        assert_eq!(body["code"], "bad_request");

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/vans")
            .body(Body::from(r#"{"plate_number":"ABC-1234"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::GET, "/api/drivers/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "bad_request");
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid path parameter"));
    }
}
