//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, page collaborators)
//! but are themselves concrete structs, not traits.

mod document;

pub use document::{parse_table, Document, DocumentService, SelectorEntry, ValidationSummary};
