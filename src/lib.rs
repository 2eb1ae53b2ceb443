//! Component tree assembler
//!
//! Rebuilds component hierarchies from depth-marked documents (tree view or
//! table notation) and derives a positional context selector for every node.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
