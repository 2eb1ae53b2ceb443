//! Application layer: assembly drivers and document services
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod assembler;
pub mod error;
pub mod error_ext;
pub mod services;

pub use assembler::{ComponentContextSetter, ContentAssembler};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
