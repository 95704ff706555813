use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{BookingError, DoctorId, Order, Patient, PatientId};
use crate::services::store::{OrderStore, PatientDirectory};

const ORDERS_TABLE: &str = "orders";
const PATIENTS_TABLE: &str = "patients";
const PATIENT_SELECT: &str = "select=id,name,clinic:clinics(id,name,surgery_type)";

fn parse_rows<T: DeserializeOwned>(rows: Vec<Value>, what: &str) -> Result<Vec<T>, BookingError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| BookingError::DatabaseError(format!("Failed to parse {}: {}", what, e)))
}

/// Orders kept in the PostgREST `orders` table.
pub struct SupabaseOrderStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseOrderStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn select_orders(&self, query: &str) -> Result<Vec<Order>, BookingError> {
        let rows: Vec<Value> = self.supabase.select(ORDERS_TABLE, query).await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        parse_rows(rows, "orders")
    }
}

#[async_trait]
impl OrderStore for SupabaseOrderStore {
    async fn add(&self, order: Order) -> Result<(), BookingError> {
        debug!("Inserting order {} for patient {}", order.id, order.patient_id);

        let row = serde_json::to_value(&order)
            .map_err(|e| BookingError::DatabaseError(format!("Failed to serialize order: {}", e)))?;

        let inserted = self.supabase.insert(ORDERS_TABLE, row).await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        if inserted.is_empty() {
            warn!("Insert of order {} returned no rows", order.id);
            return Err(BookingError::DatabaseError(format!("Order {} was not stored", order.id)));
        }

        Ok(())
    }

    async fn update(&self, order: Order) -> Result<(), BookingError> {
        debug!("Updating order {}", order.id);

        let changes = json!({
            "patient_id": order.patient_id,
            "doctor_id": order.doctor_id,
            "start_time": order.start_time.to_rfc3339(),
            "end_time": order.end_time.to_rfc3339(),
            "is_cancelled": order.is_cancelled,
            "surgery_type": order.surgery_type,
        });

        let updated = self.supabase
            .update(ORDERS_TABLE, &format!("id=eq.{}", order.id), changes)
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        if updated.is_empty() {
            return Err(BookingError::OrderNotFound);
        }

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, BookingError> {
        let orders = self.select_orders(&format!("id=eq.{}&limit=1", id)).await?;
        Ok(orders.into_iter().next())
    }

    async fn all(&self) -> Result<Vec<Order>, BookingError> {
        self.select_orders("order=start_time.asc").await
    }

    async fn find_by_patient(&self, patient_id: PatientId) -> Result<Vec<Order>, BookingError> {
        self.select_orders(&format!("patient_id=eq.{}&order=start_time.asc", patient_id)).await
    }

    async fn find_by_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Order>, BookingError> {
        self.select_orders(&format!("doctor_id=eq.{}&order=start_time.asc", doctor_id)).await
    }
}

/// Patients read from the PostgREST `patients` table with the clinic embedded.
pub struct SupabasePatientDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabasePatientDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl PatientDirectory for SupabasePatientDirectory {
    async fn find_patient(&self, patient_id: PatientId) -> Result<Option<Patient>, BookingError> {
        let query = format!("id=eq.{}&{}&limit=1", patient_id, PATIENT_SELECT);

        let rows: Vec<Value> = self.supabase.select(PATIENTS_TABLE, &query).await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

        let patients: Vec<Patient> = parse_rows(rows, "patients")?;
        Ok(patients.into_iter().next())
    }
}
