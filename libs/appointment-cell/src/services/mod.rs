pub mod availability;
pub mod booking_policy;
pub mod commands;
pub mod lifecycle;
pub mod validation;

pub use availability::{sessions_overlap, AvailabilityService};
pub use booking_policy::CustomerBookingPolicy;
pub use commands::*;
pub use lifecycle::{allowed_events, next_status, TransitionEvent};
pub use validation::BookingValidator;
