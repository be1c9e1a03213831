pub mod supabase;

pub use supabase::{ApiError, SupabaseClient};
