use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::router::appointment_routes;
use shared_utils::test_utils::TestClinic;

fn app(clinic: &TestClinic) -> Router {
    appointment_routes(clinic.state.clone())
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn book(clinic: &TestClinic, token: &str, clock: &str) -> axum::response::Response {
    app(clinic)
        .oneshot(json_request(
            "POST",
            "/",
            token,
            json!({ "doctor_id": clinic.doctor.id, "appointment_time": format!("2030-06-10T{}:00", clock) }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_book_appointment_created() {
    let clinic = TestClinic::seeded().await;

    let response = book(&clinic, &clinic.patient_token(), "09:00").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["appointment"]["patient_id"], clinic.patient.id);
    assert_eq!(body["appointment"]["status"], 0);
}

#[tokio::test]
async fn test_double_booking_conflicts() {
    let clinic = TestClinic::seeded().await;

    assert_eq!(book(&clinic, &clinic.patient_token(), "09:00").await.status(), StatusCode::CREATED);
    assert_eq!(book(&clinic, &clinic.other_patient_token(), "09:00").await.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_requires_patient_token() {
    let clinic = TestClinic::seeded().await;

    assert_eq!(book(&clinic, &clinic.doctor_token(), "09:00").await.status(), StatusCode::UNAUTHORIZED);

    let anonymous = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "doctor_id": clinic.doctor.id, "appointment_time": "2030-06-10T09:00:00" }).to_string()))
        .unwrap();
    assert_eq!(app(&clinic).oneshot(anonymous).await.unwrap().status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_doctor_is_bad_request() {
    let clinic = TestClinic::seeded().await;

    let response = app(&clinic)
        .oneshot(json_request(
            "POST",
            "/",
            &clinic.patient_token(),
            json!({ "doctor_id": 999, "appointment_time": "2030-06-10T09:00:00" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validate_endpoint_reports_verdict() {
    let clinic = TestClinic::seeded().await;
    let uri = format!("/validate?doctor_id={}&date=2030-06-10&time=09:00:00", clinic.doctor.id);

    let before = app(&clinic).oneshot(get_request(&uri, &clinic.patient_token())).await.unwrap();
    assert_eq!(body_json(before).await["verdict"], "accepted");

    book(&clinic, &clinic.patient_token(), "09:00").await;

    let after = app(&clinic).oneshot(get_request(&uri, &clinic.patient_token())).await.unwrap();
    assert_eq!(body_json(after).await["verdict"], "slot_unavailable");
}

#[tokio::test]
async fn test_other_patient_cannot_cancel() {
    let clinic = TestClinic::seeded().await;
    let booked = body_json(book(&clinic, &clinic.patient_token(), "09:00").await).await;
    let id = booked["appointment"]["id"].as_i64().unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/{}", id))
        .header("authorization", format!("Bearer {}", clinic.other_patient_token()))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app(&clinic).oneshot(request).await.unwrap().status(), StatusCode::FORBIDDEN);

    let own = Request::builder()
        .method("DELETE")
        .uri(format!("/{}", id))
        .header("authorization", format!("Bearer {}", clinic.patient_token()))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app(&clinic).oneshot(own).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn test_update_moves_appointment() {
    let clinic = TestClinic::seeded().await;
    let booked = body_json(book(&clinic, &clinic.patient_token(), "09:00").await).await;
    let id = booked["appointment"]["id"].as_i64().unwrap();

    let response = app(&clinic)
        .oneshot(json_request(
            "PUT",
            &format!("/{}", id),
            &clinic.patient_token(),
            json!({ "doctor_id": clinic.doctor.id, "appointment_time": "2030-06-10T10:00:00" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["appointment"]["appointment_time"], "2030-06-10T10:00:00");
}

#[tokio::test]
async fn test_filter_with_invalid_condition() {
    let clinic = TestClinic::seeded().await;

    let response = app(&clinic)
        .oneshot(get_request("/filter?condition=urgent", &clinic.patient_token()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_filter_lists_own_appointments() {
    let clinic = TestClinic::seeded().await;
    book(&clinic, &clinic.patient_token(), "09:00").await;
    book(&clinic, &clinic.other_patient_token(), "10:00").await;

    let response = app(&clinic)
        .oneshot(get_request("/filter?condition=upcoming&name=grey", &clinic.patient_token()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["appointments"][0]["doctor_name"], "Dr. Meredith Grey");
}

#[tokio::test]
async fn test_doctor_schedule_and_status_change() {
    let clinic = TestClinic::seeded().await;
    let booked = body_json(book(&clinic, &clinic.patient_token(), "09:00").await).await;
    let id = booked["appointment"]["id"].as_i64().unwrap();

    let schedule = app(&clinic)
        .oneshot(get_request("/schedule?date=2030-06-10", &clinic.doctor_token()))
        .await
        .unwrap();
    assert_eq!(schedule.status(), StatusCode::OK);
    assert_eq!(body_json(schedule).await["total"], 1);

    let status = app(&clinic)
        .oneshot(json_request("PATCH", &format!("/{}/status", id), &clinic.doctor_token(), json!({ "status": 1 })))
        .await
        .unwrap();
    assert_eq!(status.status(), StatusCode::OK);

    let as_patient = app(&clinic)
        .oneshot(json_request("PATCH", &format!("/{}/status", id), &clinic.patient_token(), json!({ "status": 0 })))
        .await
        .unwrap();
    assert_eq!(as_patient.status(), StatusCode::UNAUTHORIZED);
}
