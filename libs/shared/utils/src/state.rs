use std::sync::Arc;

use tracing::info;

use shared_config::{AppConfig, StorageBackend};
use shared_database::supabase::{SupabaseAppointmentStore, SupabaseClient, SupabaseDirectory};
use shared_database::{AppointmentStore, Directory, InMemoryClinic, Registry};

use crate::jwt::TokenSigner;

/// Everything a request handler needs, built once at startup and shared
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub signer: TokenSigner,
    pub directory: Arc<dyn Directory>,
    pub registry: Arc<dyn Registry>,
    pub appointments: Arc<dyn AppointmentStore>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Self {
        match config.storage_backend {
            StorageBackend::Supabase => {
                info!("Using Supabase storage at {}", config.supabase_url);
                let client = Arc::new(SupabaseClient::new(&config));
                let directory = Arc::new(SupabaseDirectory::new(client.clone()));
                let appointments = Arc::new(SupabaseAppointmentStore::new(client));
                Self::with_stores(config, directory.clone(), directory, appointments)
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                let clinic = Arc::new(InMemoryClinic::new());
                Self::with_stores(config, clinic.clone(), clinic.clone(), clinic)
            }
        }
    }

    pub fn with_stores(
        config: AppConfig,
        directory: Arc<dyn Directory>,
        registry: Arc<dyn Registry>,
        appointments: Arc<dyn AppointmentStore>,
    ) -> Self {
        Self {
            signer: TokenSigner::new(&config),
            directory,
            registry,
            appointments,
        }
    }
}
