//! Domain layer: node model, grammar, tree building and selector assembly
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod config_parser;
pub mod converter;
pub mod error;
pub mod grammar;
pub mod kind;
pub mod node;
pub mod render;
pub mod selector;
pub mod validator;

pub use arena::{ComponentTree, TreeNode};
pub use config_parser::parse_configuration;
pub use converter::{convert_tree_view, to_table_text};
pub use error::{DomainError, DomainResult};
pub use grammar::{
    is_identifier, NodeClassifier, Notation, RowComponent, TableEntry, TableRow,
};
pub use kind::{Catalog, Category, Kind, KindCatalog, NodeType, SelectorTemplate};
pub use node::{ComponentNode, ConfigurationNode, Node};
pub use render::TreeNodeConvert;
pub use selector::{assemble_selector, context_selector};
pub use validator::validate_structure;
