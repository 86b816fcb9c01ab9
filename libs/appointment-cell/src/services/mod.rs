pub mod availability;
pub mod booking;
pub mod query;

pub use availability::AvailabilityService;
pub use booking::AppointmentBookingService;
pub use query::AppointmentQueryService;
