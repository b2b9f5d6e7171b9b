pub mod repository;

pub use repository::{CustomerRepository, SupabaseCustomerRepository};
