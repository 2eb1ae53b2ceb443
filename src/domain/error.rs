//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::kind::Category;

/// Domain errors represent malformed documents and structural violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unrecognized line: [{0}]")]
    UnrecognizedLine(String),

    #[error("configuration has no key-value delimiter, expected <key>:<value>: [{0}]")]
    MissingKeyValueDelimiter(String),

    #[error("configuration ends with an item delimiter: [{0}]")]
    TrailingDelimiter(String),

    #[error("unknown {category} kind: {identifier}")]
    UnknownNodeKind {
        category: Category,
        identifier: String,
    },

    #[error("inline configuration marker (>>) without configuration: [{0}]")]
    MissingInlineConfig(String),

    #[error(
        "line {line}: modifier must be at the same level as the previous paragraph or modifier\n\
         previous: [{previous}]\ncurrent: [{current}]"
    )]
    ModifierMustAttachAtSiblingLevel {
        line: usize,
        previous: String,
        current: String,
    },

    #[error(
        "line {line}: child defined more than one level deeper than its parent\n\
         previous: [{previous}]\ncurrent: [{current}]"
    )]
    ExcessiveDepthJump {
        line: usize,
        previous: String,
        current: String,
    },

    #[error("node level must be at least 1, got {0}")]
    InvalidLevel(usize),

    #[error("occurrence count under parent must be greater than 0, got {0}")]
    InvalidOccurrence(u64),

    #[error("configuration must not be blank")]
    InvalidConfiguration,

    #[error("no nodes to create a context selector from")]
    EmptyNodeSequence,

    #[error("document is empty")]
    EmptyDocument,

    #[error("no row of the table defines a component")]
    NoComponentDefinition,

    #[error("row {0}: document-root configuration is only allowed before the first component")]
    RootConfigurationNotFirst(usize),

    #[error("row {0}: document-root configuration is empty")]
    EmptyRootConfiguration(usize),

    #[error("node is not part of the component tree")]
    NodeNotInTree,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
