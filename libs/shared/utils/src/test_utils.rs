use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, StoreBackend};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Config pointing the Supabase store at `url`, typically a wiremock server.
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            store_backend: StoreBackend::Supabase,
            ..AppConfig::default()
        }
    }
}

/// Fixed instants shared by booking tests.
pub struct TestTimes;

impl TestTimes {
    /// "Now" for tests that pin the clock.
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 3, 1, 9, 0, 0).unwrap()
    }

    /// A reference slot, 2022-03-23 00:00 to 01:00 UTC.
    pub fn reference_slot() -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.with_ymd_and_hms(2022, 3, 23, 0, 0, 0).unwrap();
        (start, start + Duration::hours(1))
    }

    pub fn hours_from_now(hours: i64) -> DateTime<Utc> {
        Self::now() + Duration::hours(hours)
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn order_response(
        id: Uuid,
        patient_id: i64,
        doctor_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        is_cancelled: bool,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "start_time": start_time.to_rfc3339(),
            "end_time": end_time.to_rfc3339(),
            "is_cancelled": is_cancelled,
            "surgery_type": 0
        })
    }

    pub fn patient_response(patient_id: i64, name: &str, surgery_type: i32) -> serde_json::Value {
        json!({
            "id": patient_id,
            "name": name,
            "clinic": {
                "id": 1,
                "name": "Test Clinic",
                "surgery_type": surgery_type
            }
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code,
            "details": null,
            "hint": null
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert_eq!(app_config.store_backend, StoreBackend::Supabase);
        assert!(app_config.is_configured());
    }

    #[test]
    fn test_reference_slot_is_after_now() {
        let (start, end) = TestTimes::reference_slot();
        assert!(start > TestTimes::now());
        assert_eq!(end - start, Duration::hours(1));
    }

    #[test]
    fn test_order_response_shape() {
        let (start, end) = TestTimes::reference_slot();
        let row = MockSupabaseResponses::order_response(Uuid::new_v4(), 1, 2, start, end, false);

        assert_eq!(row["doctor_id"], 2);
        assert_eq!(row["is_cancelled"], false);
    }
}
