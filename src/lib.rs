//! Release Checklist Management
//!
//! A checklist document maps product names to per-OS buckets of named
//! checklist items, persisted as a single JSON file.

pub mod domain;
pub use domain::{
    Bucket, ChecklistDocument, Config, ItemEntry, Os, ValidationError, format_description,
};

/// JSON persistence and CSV export for checklist documents.
pub mod storage;
pub use storage::{LoadOutcome, LoadSource, Store, export_csv};
