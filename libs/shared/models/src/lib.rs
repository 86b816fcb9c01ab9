pub mod appointment;
pub mod auth;
pub mod directory;
pub mod error;
