// libs/booking-cell/src/services/booking.rs
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::{AppConfig, StoreBackend};
use shared_database::supabase::SupabaseClient;

use crate::models::{
    AddBookingRequest, BookingError, BookingPolicy, NextAppointmentResponse, Order, PatientId,
};
use crate::services::clock::{Clock, SystemClock};
use crate::services::store::{
    InMemoryOrderStore, InMemoryPatientDirectory, OrderStore, PatientDirectory,
};
use crate::services::supabase_store::{SupabaseOrderStore, SupabasePatientDirectory};
use crate::services::validation::{BookingRequestValidator, BookingValidator};

pub struct BookingService {
    orders: Arc<dyn OrderStore>,
    patients: Arc<dyn PatientDirectory>,
    validator: Arc<dyn BookingRequestValidator>,
    clock: Arc<dyn Clock>,
    policy: BookingPolicy,
    // Held across validate-then-insert so two requests in this process cannot
    // both pass the overlap check for the same slot.
    booking_lock: Mutex<()>,
}

impl BookingService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        patients: Arc<dyn PatientDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let validator = Arc::new(BookingValidator::new(Arc::clone(&orders), Arc::clone(&clock)));
        Self::with_validator(orders, patients, validator, clock)
    }

    pub fn with_validator(
        orders: Arc<dyn OrderStore>,
        patients: Arc<dyn PatientDirectory>,
        validator: Arc<dyn BookingRequestValidator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            patients,
            validator,
            clock,
            policy: BookingPolicy::default(),
            booking_lock: Mutex::new(()),
        }
    }

    pub fn with_policy(mut self, policy: BookingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the service on the backend selected in configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self, BookingError> {
        let policy = BookingPolicy {
            next_skips_cancelled: config.next_skips_cancelled,
        };

        let (orders, patients): (Arc<dyn OrderStore>, Arc<dyn PatientDirectory>) = match config.store_backend {
            StoreBackend::Memory => {
                let patients = match &config.patients_file {
                    Some(path) => InMemoryPatientDirectory::load_from_file(path).await?,
                    None => {
                        warn!("No patients file configured, in-memory patient directory is empty");
                        InMemoryPatientDirectory::new()
                    }
                };
                info!("Using in-memory order store");
                let orders: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());
                let patients: Arc<dyn PatientDirectory> = Arc::new(patients);
                (orders, patients)
            }
            StoreBackend::Supabase => {
                let supabase = Arc::new(SupabaseClient::new(config));
                info!("Using Supabase order store at {}", supabase.get_base_url());
                let orders: Arc<dyn OrderStore> = Arc::new(SupabaseOrderStore::new(Arc::clone(&supabase)));
                let patients: Arc<dyn PatientDirectory> = Arc::new(SupabasePatientDirectory::new(supabase));
                (orders, patients)
            }
        };

        Ok(Self::new(orders, patients, Arc::new(SystemClock)).with_policy(policy))
    }

    /// Validates and stores a new booking.
    ///
    /// A rejected request stores nothing and reports the first validation
    /// message. The surgery type is copied from the patient's clinic.
    pub async fn add_order(&self, request: AddBookingRequest) -> Result<Order, BookingError> {
        info!("Booking doctor {} for patient {} from {} to {}",
              request.doctor_id, request.patient_id, request.start_time, request.end_time);

        let _guard = self.booking_lock.lock().await;

        let validation = self.validator.validate_request(&request).await?;
        if !validation.passed {
            let message = validation.first_error()
                .unwrap_or("Booking request failed validation")
                .to_string();
            warn!("Booking rejected for patient {}: {}", request.patient_id, message);
            return Err(BookingError::Validation(message));
        }

        let patient = self.patients.find_patient(request.patient_id).await?
            .ok_or(BookingError::PatientNotFound)?;

        let order = Order::new(&request, patient.surgery_type());
        self.orders.add(order.clone()).await?;

        info!("Order {} booked with surgery type {}", order.id, order.surgery_type);
        Ok(order)
    }

    pub async fn cancel_order(&self, order_id: Uuid) -> Result<(), BookingError> {
        info!("Cancelling order {}", order_id);

        let mut order = self.orders.find_by_id(order_id).await?
            .ok_or(BookingError::OrderNotFound)?;

        if order.is_cancelled {
            debug!("Order {} already cancelled", order_id);
        }

        order.is_cancelled = true;
        self.orders.update(order).await?;

        Ok(())
    }

    /// Earliest order of the patient starting strictly after now.
    ///
    /// Cancelled orders still count unless the policy says otherwise.
    pub async fn get_patient_next_appointment(
        &self,
        patient_id: PatientId,
    ) -> Result<NextAppointmentResponse, BookingError> {
        debug!("Looking up next appointment for patient {}", patient_id);

        let patient_orders: Vec<Order> = self.orders.all().await?
            .into_iter()
            .filter(|order| order.patient_id == patient_id)
            .collect();

        if patient_orders.is_empty() {
            return Err(BookingError::PatientNotFound);
        }

        let now = self.clock.now();
        let next = patient_orders.iter()
            .filter(|order| order.start_time > now)
            .filter(|order| !(self.policy.next_skips_cancelled && order.is_cancelled))
            .min_by_key(|order| order.start_time)
            .ok_or(BookingError::NoNextAppointment)?;

        Ok(NextAppointmentResponse::from(next))
    }
}
