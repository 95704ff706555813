use std::sync::Arc;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};
use chrono::Duration;
use uuid::Uuid;

use booking_cell::models::{Clinic, Order, Patient};
use booking_cell::router::booking_routes;
use booking_cell::services::{BookingService, FixedClock, InMemoryOrderStore, InMemoryPatientDirectory, OrderStore};
use shared_utils::test_utils::TestTimes;

struct TestApp {
    router: Router,
    orders: Arc<InMemoryOrderStore>,
}

fn create_test_app(orders: Vec<Order>) -> TestApp {
    let orders = Arc::new(InMemoryOrderStore::with_orders(orders));
    let patients = Arc::new(InMemoryPatientDirectory::with_patients(vec![Patient {
        id: 1,
        name: "Test Patient".to_string(),
        clinic: Clinic { id: 1, name: "Test Clinic".to_string(), surgery_type: 0 },
    }]));
    let service = BookingService::new(
        Arc::clone(&orders) as Arc<dyn OrderStore>,
        patients,
        Arc::new(FixedClock::new(TestTimes::now())),
    );

    TestApp {
        router: booking_routes(Arc::new(service)),
        orders,
    }
}

fn future_order(patient_id: i64) -> Order {
    let start = TestTimes::hours_from_now(3);
    Order {
        id: Uuid::new_v4(),
        patient_id,
        doctor_id: 9,
        start_time: start,
        end_time: start + Duration::minutes(45),
        is_cancelled: false,
        surgery_type: 0,
    }
}

fn booking_body(start_offset_hours: i64) -> Value {
    let start = TestTimes::hours_from_now(start_offset_hours);
    json!({
        "patientId": 1,
        "doctorId": 4,
        "startTime": start.to_rfc3339(),
        "endTime": (start + Duration::minutes(30)).to_rfc3339()
    })
}

fn assert_json_content_type(response: &axum::response::Response) {
    let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("application/json"), "unexpected content type {}", content_type);
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_add_booking_success() {
    let app = create_test_app(vec![]);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(booking_body(24).to_string()))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
    assert_eq!(app.orders.len().await, 1);
}

#[tokio::test]
async fn test_add_booking_in_past_returns_bad_request() {
    let app = create_test_app(vec![]);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(booking_body(-24).to_string()))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json_response = body_json(response).await;
    assert_eq!(json_response["error"], "Start Time must be set in the past");
    assert!(app.orders.is_empty().await);
}

#[tokio::test]
async fn test_add_booking_malformed_body_returns_json_error() {
    let app = create_test_app(vec![]);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "patientId": "not-a-number" }).to_string()))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json_response = body_json(response).await;
    assert!(json_response["error"].is_string());
}

#[tokio::test]
async fn test_add_booking_missing_field_returns_json_error() {
    let app = create_test_app(vec![]);
    let mut body = booking_body(24);
    body.as_object_mut().unwrap().remove("doctorId");

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_json_content_type(&response);
    let json_response = body_json(response).await;
    assert!(json_response["error"].as_str().unwrap().contains("doctorId"));
    assert!(app.orders.is_empty().await);
}

#[tokio::test]
async fn test_get_next_appointment_success() {
    let order = future_order(1);
    let app = create_test_app(vec![order.clone()]);

    let request = Request::builder()
        .uri("/patient/1/next")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json_response = body_json(response).await;
    assert_eq!(json_response["id"], order.id.to_string());
    assert_eq!(json_response["doctorId"], 9);
    assert!(json_response["startTime"].is_string());
    assert!(json_response["endTime"].is_string());
}

#[tokio::test]
async fn test_get_next_appointment_unknown_patient() {
    let app = create_test_app(vec![future_order(1)]);

    let request = Request::builder()
        .uri("/patient/42/next")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json_response = body_json(response).await;
    assert_eq!(json_response["error"], "Patient does not exist");
}

#[tokio::test]
async fn test_get_next_appointment_non_numeric_id_returns_json_error() {
    let app = create_test_app(vec![]);

    let request = Request::builder()
        .uri("/patient/abc/next")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_json_content_type(&response);
    let json_response = body_json(response).await;
    assert!(json_response["error"].is_string());
}

#[tokio::test]
async fn test_cancel_booking_success() {
    let order = future_order(1);
    let app = create_test_app(vec![order.clone()]);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/?bookingId={}", order.id))
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stored = app.orders.find_by_id(order.id).await.unwrap().unwrap();
    assert!(stored.is_cancelled);
}

#[tokio::test]
async fn test_cancel_unknown_booking() {
    let app = create_test_app(vec![]);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/?bookingId={}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json_response = body_json(response).await;
    assert_eq!(json_response["error"], "Order does not exist");
}

#[tokio::test]
async fn test_cancel_without_booking_id_returns_json_error() {
    let app = create_test_app(vec![]);

    let request = Request::builder()
        .method("DELETE")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_json_content_type(&response);
    let json_response = body_json(response).await;
    assert!(json_response["error"].is_string());
}

#[tokio::test]
async fn test_cancel_with_malformed_booking_id_returns_json_error() {
    let app = create_test_app(vec![]);

    let request = Request::builder()
        .method("DELETE")
        .uri("/?bookingId=not-a-uuid")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_json_content_type(&response);
    let json_response = body_json(response).await;
    assert!(json_response["error"].is_string());
}
