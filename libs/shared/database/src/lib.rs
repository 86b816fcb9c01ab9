pub mod appointments;
pub mod directory;
pub mod error;
pub mod memory;
pub mod supabase;

pub use appointments::AppointmentStore;
pub use directory::{Directory, Registry};
pub use error::StoreError;
pub use memory::InMemoryClinic;
