//! Domain models for checklist management.
//!
//! This module contains the core domain types: the checklist document,
//! per-OS item buckets, and configuration.

/// Checklist document model and product/OS structure.
pub mod document;
pub use document::{ChecklistDocument, Os, ParseOsError, ProductChecklist};

/// Per-bucket item storage and CRUD operations.
pub mod bucket;
pub use bucket::{Bucket, ItemEntry, ValidationError};

mod config;
pub use config::Config;

/// Display formatting for item descriptions.
pub mod format;
pub use format::format_description;
