use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::{AddBookingRequest, BookingError, ValidationResult};
use crate::services::clock::Clock;
use crate::services::store::OrderStore;

// Wording is inverted relative to the rule and kept verbatim.
pub const START_TIME_IN_PAST: &str = "Start Time must be set in the past";
pub const END_TIME_IN_PAST: &str = "End Time must be set in the past";
pub const DOCTOR_ALREADY_BOOKED: &str = "A doctor is currently booked in the date time range specified";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRequestValidator: Send + Sync {
    async fn validate_request(&self, request: &AddBookingRequest) -> Result<ValidationResult, BookingError>;
}

/// Checks a booking request against the booking rules without touching the store.
///
/// Rules run in order and the first one that fails decides the result:
/// 1. neither the start nor the end of the window may lie before now;
/// 2. the doctor must not already hold an active order overlapping the window.
pub struct BookingValidator {
    orders: Arc<dyn OrderStore>,
    clock: Arc<dyn Clock>,
}

impl BookingValidator {
    pub fn new(orders: Arc<dyn OrderStore>, clock: Arc<dyn Clock>) -> Self {
        Self { orders, clock }
    }

    fn check_booking_in_past(&self, request: &AddBookingRequest, result: &mut ValidationResult) -> bool {
        let now = self.clock.now();
        let mut errors = Vec::new();

        if request.start_time < now {
            errors.push(START_TIME_IN_PAST.to_string());
        }

        if request.end_time < now {
            errors.push(END_TIME_IN_PAST.to_string());
        }

        if errors.is_empty() {
            return false;
        }

        result.passed = false;
        result.errors.extend(errors);
        true
    }

    async fn check_doctor_is_not_booked(
        &self,
        request: &AddBookingRequest,
        result: &mut ValidationResult,
    ) -> Result<bool, BookingError> {
        let existing = self.orders.find_by_doctor(request.doctor_id).await?;

        let clash = existing.iter()
            .filter(|order| order.is_active())
            .find(|order| windows_overlap(request.start_time, request.end_time, order.start_time, order.end_time));

        match clash {
            Some(order) => {
                warn!("Doctor {} already booked by order {} ({} - {})",
                      request.doctor_id, order.id, order.start_time, order.end_time);
                result.passed = false;
                result.errors.push(DOCTOR_ALREADY_BOOKED.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl BookingRequestValidator for BookingValidator {
    async fn validate_request(&self, request: &AddBookingRequest) -> Result<ValidationResult, BookingError> {
        debug!("Validating booking for patient {} with doctor {} from {} to {}",
               request.patient_id, request.doctor_id, request.start_time, request.end_time);

        let mut result = ValidationResult::passed();

        if self.check_booking_in_past(request, &mut result) {
            return Ok(result);
        }

        if self.check_doctor_is_not_booked(request, &mut result).await? {
            return Ok(result);
        }

        Ok(result)
    }
}

/// Inclusive overlap test: true when either end of the requested window falls
/// inside the existing window. A request that strictly contains an existing
/// window is not reported.
pub fn windows_overlap(
    request_start: DateTime<Utc>,
    request_end: DateTime<Utc>,
    existing_start: DateTime<Utc>,
    existing_end: DateTime<Utc>,
) -> bool {
    let contains = |instant: DateTime<Utc>| existing_start <= instant && instant <= existing_end;
    contains(request_start) || contains(request_end)
}
