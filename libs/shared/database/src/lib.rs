pub mod supabase;

pub use supabase::{is_timeout, repository_error, QueryResult, SupabaseClient};
