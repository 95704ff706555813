// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::services::booking::BookingService;

pub fn booking_routes(service: Arc<BookingService>) -> Router {
    Router::new()
        .route("/", post(handlers::add_booking).delete(handlers::cancel_booking))
        .route("/patient/{identification_number}/next", get(handlers::get_patient_next_appointment))
        .with_state(service)
}
