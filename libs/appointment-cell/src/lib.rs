pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod router;
pub mod services;
pub mod specification;

// Re-export the public surface used by the API binary and tests
pub use error::{AppointmentError, ErrorKind, TransitionRejection};
pub use models::*;
pub use repository::{paginate_in_memory, AppointmentRepository, SupabaseAppointmentRepository};
pub use router::{appointment_routes, appointment_routes_with_services};
pub use services::*;
pub use specification::{day_window, AppointmentParams, AppointmentSpecification, LogicalOperator, Pagination};
