// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use shared_models::error::AppError;

use crate::models::{AddBookingRequest, BookingError, CancelBookingQuery, NextAppointmentResponse, PatientId};
use crate::services::booking::BookingService;

fn to_app_error(error: BookingError) -> AppError {
    match error {
        BookingError::Validation(msg) => AppError::ValidationError(msg),
        BookingError::DatabaseError(msg) => AppError::Database(msg),
        error if error.is_not_found() => AppError::NotFound(error.to_string()),
        error => AppError::Database(error.to_string()),
    }
}

#[axum::debug_handler]
pub async fn get_patient_next_appointment(
    State(service): State<Arc<BookingService>>,
    identification_number: Result<Path<PatientId>, PathRejection>,
) -> Result<Json<NextAppointmentResponse>, AppError> {
    let Path(identification_number) = identification_number?;
    let next = service.get_patient_next_appointment(identification_number).await
        .map_err(to_app_error)?;

    Ok(Json(next))
}

#[axum::debug_handler]
pub async fn add_booking(
    State(service): State<Arc<BookingService>>,
    request: Result<Json<AddBookingRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(request) = request?;
    service.add_order(request).await
        .map_err(to_app_error)?;

    Ok(StatusCode::OK)
}

#[axum::debug_handler]
pub async fn cancel_booking(
    State(service): State<Arc<BookingService>>,
    query: Result<Query<CancelBookingQuery>, QueryRejection>,
) -> Result<StatusCode, AppError> {
    let Query(query) = query?;
    service.cancel_order(query.booking_id).await
        .map_err(to_app_error)?;

    Ok(StatusCode::OK)
}
