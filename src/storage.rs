//! Persistence and export for checklist documents.
//!
//! The [`Store`] reads and writes the single JSON storage file, migrating
//! legacy shapes on load; [`export_csv`] flattens a document into CSV.

/// CSV export of a checklist document.
pub mod csv;
/// JSON persistence: load, legacy migration, self-heal, atomic save.
pub mod json;

pub use csv::export_csv;
pub use json::{LoadOutcome, LoadSource, Store};
