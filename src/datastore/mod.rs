mod database;
mod error;
mod record;
mod thread_safe_db;

pub use database::{LoadSummary, RosterStore};
pub use error::{Result, RosterError};
pub use record::{Grade, StudentRecord};
pub use thread_safe_db::ThreadSafeRoster;
