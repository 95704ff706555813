use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{BookingError, DoctorId, Order, Patient, PatientId};

/// Persistent collection of orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn add(&self, order: Order) -> Result<(), BookingError>;

    /// Replaces the stored order with the same id.
    async fn update(&self, order: Order) -> Result<(), BookingError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, BookingError>;

    /// Every order, ascending by start time.
    async fn all(&self) -> Result<Vec<Order>, BookingError>;

    /// The patient's orders, ascending by start time.
    async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<Order>, BookingError>;

    /// The doctor's orders, cancelled ones included, ascending by start time.
    async fn find_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Order>, BookingError>;
}

#[async_trait]
pub trait PatientDirectory: Send + Sync {
    async fn find_patient(&self, patient_id: PatientId) -> Result<Option<Patient>, BookingError>;
}

fn sorted_by_start(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
    orders
}

// ==============================================================================
// IN-MEMORY STORE
// ==============================================================================

#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let orders = orders.into_iter().map(|order| (order.id, order)).collect();
        Self {
            orders: RwLock::new(orders),
        }
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    async fn filtered<F>(&self, predicate: F) -> Vec<Order>
    where
        F: Fn(&Order) -> bool,
    {
        let orders = self.orders.read().await;
        sorted_by_start(orders.values().filter(|order| predicate(*order)).cloned().collect())
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn add(&self, order: Order) -> Result<(), BookingError> {
        let mut orders = self.orders.write().await;

        if orders.contains_key(&order.id) {
            return Err(BookingError::DatabaseError(format!("Order {} already exists", order.id)));
        }

        debug!("Storing order {} for doctor {}", order.id, order.doctor_id);
        orders.insert(order.id, order);
        Ok(())
    }

    async fn update(&self, order: Order) -> Result<(), BookingError> {
        let mut orders = self.orders.write().await;

        match orders.get_mut(&order.id) {
            Some(existing) => {
                *existing = order;
                Ok(())
            }
            None => Err(BookingError::OrderNotFound),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, BookingError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn all(&self) -> Result<Vec<Order>, BookingError> {
        Ok(self.filtered(|_| true).await)
    }

    async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<Order>, BookingError> {
        Ok(self.filtered(|order| order.patient_id == patient_id).await)
    }

    async fn find_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Order>, BookingError> {
        Ok(self.filtered(|order| order.doctor_id == doctor_id).await)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPatientDirectory {
    patients: RwLock<HashMap<PatientId, Patient>>,
}

impl InMemoryPatientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patients(patients: impl IntoIterator<Item = Patient>) -> Self {
        let patients = patients.into_iter().map(|patient| (patient.id, patient)).collect();
        Self {
            patients: RwLock::new(patients),
        }
    }

    /// Loads a JSON array of patients, each with its embedded clinic.
    pub async fn load_from_file(path: &Path) -> Result<Self, BookingError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            BookingError::DatabaseError(format!("Failed to read patients file {}: {}", path.display(), e))
        })?;

        let patients: Vec<Patient> = serde_json::from_str(&raw).map_err(|e| {
            BookingError::DatabaseError(format!("Failed to parse patients file {}: {}", path.display(), e))
        })?;

        info!("Loaded {} patients from {}", patients.len(), path.display());
        Ok(Self::with_patients(patients))
    }
}

#[async_trait]
impl PatientDirectory for InMemoryPatientDirectory {
    async fn find_patient(&self, patient_id: PatientId) -> Result<Option<Patient>, BookingError> {
        Ok(self.patients.read().await.get(&patient_id).cloned())
    }
}
