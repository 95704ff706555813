// libs/booking-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub type PatientId = i64;
pub type DoctorId = i64;

pub const PATIENT_NOT_FOUND: &str = "Patient does not exist";
pub const ORDER_NOT_FOUND: &str = "Order does not exist";
pub const NO_NEXT_APPOINTMENT: &str = "There are no next appointment";

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

/// A booked appointment. Stored as one row of the `orders` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub is_cancelled: bool,
    /// Copied from the patient's clinic when the order is created.
    pub surgery_type: i32,
}

impl Order {
    pub fn new(request: &AddBookingRequest, surgery_type: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            start_time: request.start_time,
            end_time: request.end_time,
            is_cancelled: false,
            surgery_type,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.is_cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clinic {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub surgery_type: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    #[serde(default)]
    pub name: String,
    pub clinic: Clinic,
}

impl Patient {
    pub fn surgery_type(&self) -> i32 {
        self.clinic.surgery_type
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBookingRequest {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAppointmentResponse {
    pub id: Uuid,
    pub doctor_id: DoctorId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<&Order> for NextAppointmentResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            doctor_id: order.doctor_id,
            start_time: order.start_time,
            end_time: order.end_time,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingQuery {
    pub booking_id: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn passed() -> Self {
        Self {
            passed: true,
            errors: Vec::new(),
        }
    }

    pub fn failed<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            passed: false,
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingPolicy {
    pub next_skips_cancelled: bool,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    #[error("{0}")]
    Validation(String),

    #[error("Patient does not exist")]
    PatientNotFound,

    #[error("Order does not exist")]
    OrderNotFound,

    #[error("There are no next appointment")]
    NoNextAppointment,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl BookingError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BookingError::PatientNotFound | BookingError::OrderNotFound | BookingError::NoNextAppointment
        )
    }
}
