//! Node model: component nodes placed on a level, and configuration payloads.

use std::fmt;

use indexmap::IndexMap;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::kind::{Category, NodeType};

/// A paragraph or modifier placed at a nesting level.
///
/// Positional relations are pure functions of `level`: a lower level number is
/// higher up in the tree (ancestor direction).
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNode<K> {
    level: usize,
    kind: K,
    modifier: bool,
    occurrence: u64,
    inline_config: Option<ConfigurationNode>,
}

impl<K: NodeType> ComponentNode<K> {
    /// Create a node for `kind` at `level`; the modifier flag follows the
    /// kind's category.
    ///
    /// # Errors
    /// `InvalidLevel` when `level` is 0.
    pub fn new(level: usize, kind: K) -> DomainResult<Self> {
        if level < 1 {
            return Err(DomainError::InvalidLevel(level));
        }
        let modifier = kind.category() == Category::Modifier;
        Ok(Self {
            level,
            kind,
            modifier,
            occurrence: 1,
            inline_config: None,
        })
    }

    pub fn with_inline_config(mut self, configuration: ConfigurationNode) -> Self {
        self.inline_config = Some(configuration);
        self
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn is_modifier(&self) -> bool {
        self.modifier
    }

    pub fn occurrence_under_parent(&self) -> u64 {
        self.occurrence
    }

    /// # Errors
    /// `InvalidOccurrence` when `occurrence` is 0.
    pub fn set_occurrence_under_parent(&mut self, occurrence: u64) -> DomainResult<()> {
        if occurrence < 1 {
            return Err(DomainError::InvalidOccurrence(occurrence));
        }
        self.occurrence = occurrence;
        Ok(())
    }

    pub fn inline_config(&self) -> Option<&ConfigurationNode> {
        self.inline_config.as_ref()
    }

    pub fn is_one_level_deeper_than(&self, other: &Self) -> bool {
        self.level == other.level + 1
    }

    pub fn is_deeper_than(&self, other: &Self) -> bool {
        self.level > other.level
    }

    pub fn is_higher_than(&self, other: &Self) -> bool {
        self.level < other.level
    }

    pub fn is_at_same_level_as(&self, other: &Self) -> bool {
        self.level == other.level
    }

    pub fn is_at_root_level(&self) -> bool {
        self.level == 1
    }

    pub fn has_same_kind_as(&self, other: &Self) -> bool {
        self.kind == other.kind
    }

    /// Selector fragment of this node alone.
    pub fn context_selector(&self) -> String {
        self.kind.context_selector(self.occurrence)
    }
}

impl<K: NodeType> fmt::Display for ComponentNode<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifier {
            write!(f, "modifier ")?;
        }
        write!(
            f,
            "{} at level {} (occurrence {})",
            self.kind, self.level, self.occurrence
        )
    }
}

/// Immutable, order-preserving key/value configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationNode {
    entries: IndexMap<String, String>,
}

impl ConfigurationNode {
    pub fn new(entries: IndexMap<String, String>) -> Self {
        Self { entries }
    }

    /// The "no configuration" value.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ConfigurationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value:?}")?;
        }
        write!(f, "}}")
    }
}

/// A classified line or cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<K> {
    Component(ComponentNode<K>),
    Configuration(ConfigurationNode),
}

impl<K> Node<K> {
    pub fn as_component(&self) -> Option<&ComponentNode<K>> {
        match self {
            Node::Component(component) => Some(component),
            Node::Configuration(_) => None,
        }
    }
}
