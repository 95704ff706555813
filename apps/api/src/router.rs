use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use booking_cell::router::booking_routes;
use booking_cell::services::BookingService;

pub fn create_router(booking: Arc<BookingService>) -> Router {
    Router::new()
        .route("/", get(|| async { "Patient Booking API is running!" }))
        .nest("/api/booking", booking_routes(booking))
}
