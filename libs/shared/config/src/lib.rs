use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Supabase,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" | "in_memory" => Some(StoreBackend::Memory),
            "supabase" | "postgrest" => Some(StoreBackend::Supabase),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub store_backend: StoreBackend,
    pub patients_file: Option<PathBuf>,
    /// When set, cancelled orders are skipped by the next-appointment lookup.
    pub next_skips_cancelled: bool,
    pub server_host: IpAddr,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            store_backend: StoreBackend::Memory,
            patients_file: None,
            next_skips_cancelled: false,
            server_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            server_port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            store_backend: match env::var("BOOKING_STORE") {
                Ok(value) => StoreBackend::parse(&value).unwrap_or_else(|| {
                    warn!("BOOKING_STORE '{}' not recognised, using in-memory store", value);
                    StoreBackend::Memory
                }),
                Err(_) => defaults.store_backend,
            },
            patients_file: env::var("BOOKING_PATIENTS_FILE").ok().map(PathBuf::from),
            next_skips_cancelled: env::var("BOOKING_NEXT_SKIPS_CANCELLED")
                .map(|value| parse_flag(&value))
                .unwrap_or(defaults.next_skips_cancelled),
            server_host: env::var("SERVER_HOST")
                .ok()
                .and_then(|value| {
                    value.parse().map_err(|_| {
                        warn!("SERVER_HOST '{}' is not an IP address, using default", value);
                    }).ok()
                })
                .unwrap_or(defaults.server_host),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|value| {
                    value.parse().map_err(|_| {
                        warn!("SERVER_PORT '{}' is not a port number, using default", value);
                    }).ok()
                })
                .unwrap_or(defaults.server_port),
        };

        if config.store_backend == StoreBackend::Supabase && !config.is_supabase_configured() {
            warn!("Supabase store selected but SUPABASE_URL / SUPABASE_ANON_PUBLIC_KEY are missing");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        match self.store_backend {
            StoreBackend::Memory => true,
            StoreBackend::Supabase => self.is_supabase_configured(),
        }
    }

    pub fn is_supabase_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
