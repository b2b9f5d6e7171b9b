pub mod error;
pub mod pagination;
pub mod repository;

pub use error::AppError;
pub use pagination::Page;
pub use repository::RepositoryError;
