use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use doctor_cell::router::doctor_routes;
use shared_models::auth::Role;
use shared_utils::test_utils::{JwtTestUtils, TestClinic};

fn app(clinic: &TestClinic) -> Router {
    doctor_routes(clinic.state.clone())
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token));

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_list_is_public_and_hides_passwords() {
    let clinic = TestClinic::seeded().await;

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app(&clinic).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert!(body["doctors"][0].get("password_hash").is_none());
    assert_eq!(body["doctors"][0]["available_times"][0], "09:00-10:00");
}

#[tokio::test]
async fn test_filter_endpoint() {
    let clinic = TestClinic::seeded().await;

    let request = Request::builder().uri("/filter?time=PM").body(Body::empty()).unwrap();
    let body = body_json(app(&clinic).oneshot(request).await.unwrap()).await;

    assert_eq!(body["total"], 1);
    assert_eq!(body["doctors"][0]["name"], "Dr. Derek Shepherd");
}

#[tokio::test]
async fn test_availability_for_any_role() {
    let clinic = TestClinic::seeded().await;
    let uri = format!("/{}/availability/2030-06-10", clinic.doctor.id);

    for token in [clinic.patient_token(), clinic.doctor_token(), clinic.admin_token()] {
        let response = app(&clinic).oneshot(authed("GET", &uri, &token, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["available_times"], json!(["09:00-10:00", "10:00-11:00"]));
    }
}

#[tokio::test]
async fn test_availability_rejects_expired_token() {
    let clinic = TestClinic::seeded().await;
    let token = JwtTestUtils::create_expired_token(&clinic.state.signer, &clinic.patient.email, Role::Patient);
    let uri = format!("/{}/availability/2030-06-10", clinic.doctor.id);

    let response = app(&clinic).oneshot(authed("GET", &uri, &token, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_doctor_is_admin_only() {
    let clinic = TestClinic::seeded().await;
    let payload = json!({
        "name": "Dr. Cristina Yang",
        "specialty": "Cardiology",
        "email": "yang@clinic.test",
        "password": "heart",
        "phone": "5550000004",
        "available_times": ["10:00-11:00"]
    });

    let as_doctor = app(&clinic)
        .oneshot(authed("POST", "/", &clinic.doctor_token(), Some(payload.clone())))
        .await
        .unwrap();
    assert_eq!(as_doctor.status(), StatusCode::UNAUTHORIZED);

    let as_admin = app(&clinic)
        .oneshot(authed("POST", "/", &clinic.admin_token(), Some(payload.clone())))
        .await
        .unwrap();
    assert_eq!(as_admin.status(), StatusCode::CREATED);

    let again = app(&clinic)
        .oneshot(authed("POST", "/", &clinic.admin_token(), Some(payload)))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_unknown_doctor_is_not_found() {
    let clinic = TestClinic::seeded().await;

    let response = app(&clinic)
        .oneshot(authed("DELETE", "/999", &clinic.admin_token(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
