pub mod booking;
pub mod clock;
pub mod store;
pub mod supabase_store;
pub mod validation;

pub use booking::BookingService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use store::{InMemoryOrderStore, InMemoryPatientDirectory, OrderStore, PatientDirectory};
pub use supabase_store::{SupabaseOrderStore, SupabasePatientDirectory};
pub use validation::{BookingRequestValidator, BookingValidator};
