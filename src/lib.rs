//! In-memory student roster with flat-file persistence.
//!
//! `RosterStore` owns the records and reads/writes the backing file,
//! `ThreadSafeRoster` puts it behind a single lock, and `menu` drives it from
//! an interactive terminal session.

mod datastore;
pub mod menu;

pub use datastore::{
    Grade, LoadSummary, Result, RosterError, RosterStore, StudentRecord, ThreadSafeRoster,
};
