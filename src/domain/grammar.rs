//! Line and cell grammar for the two document notations.
//!
//! Tree view (one node per line):
//! ```text
//! - CONTAINER >> bg:white
//! -- LAYOUT
//! --- IMAGE
//! ---* url:https://example.com/a.png, alt:"An image"
//! ---@ COLORS_MODIFIER
//! ```
//!
//! Table view (component cell, configuration cell):
//! ```text
//! | <            | title:Landing page |
//! | > CONTAINER  |                    |
//! | >> LAYOUT    |                    |
//! | >>> IMAGE    | url:https://x      |
//! |              | alt:An image       |
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{instrument, trace};

use crate::domain::config_parser::{parse_configuration, KEY_VALUE_DELIMITER};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::kind::{Category, KindCatalog};
use crate::domain::node::{ComponentNode, ConfigurationNode, Node};

pub const TREE_DEPTH_MARKER: char = '-';
pub const TABLE_DEPTH_MARKER: char = '>';
pub const MODIFIER_MARKER: char = '@';
pub const CONFIGURATION_MARKER: char = '*';
pub const INLINE_CONFIG_MARKER: &str = ">>";
pub const ROOT_CONFIGURATION_MARKER: &str = "<";
pub const CELL_SEPARATOR: char = '|';

/// Shape of a kind identifier in both notations.
pub const IDENTIFIER_PATTERN: &str = "[A-Z_]+";

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{IDENTIFIER_PATTERN}$")).unwrap());
pub(crate) static TREE_PARAGRAPH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(-+) ({IDENTIFIER_PATTERN})( >>( (.*))?)?$")).unwrap()
});
pub(crate) static TREE_MODIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^(-+)@ ({IDENTIFIER_PATTERN})$")).unwrap());
pub(crate) static TREE_CONFIGURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-*)\* (.*)$").unwrap());
static TABLE_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^(>+) ({IDENTIFIER_PATTERN})$")).unwrap());
static TABLE_MODIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^(>+)@ ({IDENTIFIER_PATTERN})$")).unwrap());
static TRAILING_DELIMITER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*, *$").unwrap());

/// Whether `name` can appear as a kind identifier in a document.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Surface syntax of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    TreeView,
    Table,
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notation::TreeView => write!(f, "tree view"),
            Notation::Table => write!(f, "table"),
        }
    }
}

/// Checks applied to raw configuration text before it is parsed.
///
/// # Errors
/// - `MissingKeyValueDelimiter` when the text has no `:` at all
/// - `TrailingDelimiter` when the text ends with `,` plus optional spaces
pub fn validate_configuration_text(text: &str) -> DomainResult<()> {
    if !text.contains(KEY_VALUE_DELIMITER) {
        return Err(DomainError::MissingKeyValueDelimiter(text.to_string()));
    }
    if TRAILING_DELIMITER.is_match(text) {
        return Err(DomainError::TrailingDelimiter(text.to_string()));
    }
    Ok(())
}

/// Classifies raw lines and cells into typed nodes, resolving identifiers
/// against a catalog.
pub struct NodeClassifier<'c, C> {
    catalog: &'c C,
}

impl<'c, C: KindCatalog> NodeClassifier<'c, C> {
    pub fn new(catalog: &'c C) -> Self {
        Self { catalog }
    }

    /// Classify one tree-view line. Shapes are tried in order: paragraph,
    /// modifier, configuration.
    #[instrument(level = "trace", skip(self))]
    pub fn classify_line(&self, line: &str) -> DomainResult<Node<C::Kind>> {
        if let Some(caps) = TREE_PARAGRAPH.captures(line) {
            let node = self.component(&caps, Category::Paragraph)?;
            if caps.get(3).is_none() {
                return Ok(Node::Component(node));
            }
            let inline = caps
                .get(5)
                .map(|m| m.as_str())
                .filter(|text| !text.trim().is_empty())
                .ok_or_else(|| DomainError::MissingInlineConfig(line.to_string()))?;
            let configuration = configuration_from_text(inline)?;
            return Ok(Node::Component(node.with_inline_config(configuration)));
        }

        if let Some(caps) = TREE_MODIFIER.captures(line) {
            return Ok(Node::Component(self.component(&caps, Category::Modifier)?));
        }

        if let Some(caps) = TREE_CONFIGURATION.captures(line) {
            validate_configuration_text(line)?;
            let text = caps.get(2).map_or("", |m| m.as_str());
            return Ok(Node::Configuration(parse_configuration(text)?));
        }

        Err(DomainError::UnrecognizedLine(line.to_string()))
    }

    /// Classify a table component cell (`> NAME` or `>@ NAME`).
    #[instrument(level = "trace", skip(self))]
    pub fn classify_component_cell(&self, cell: &str) -> DomainResult<ComponentNode<C::Kind>> {
        if let Some(caps) = TABLE_PARAGRAPH.captures(cell) {
            return self.component(&caps, Category::Paragraph);
        }
        if let Some(caps) = TABLE_MODIFIER.captures(cell) {
            return self.component(&caps, Category::Modifier);
        }
        Err(DomainError::UnrecognizedLine(cell.to_string()))
    }

    /// Classify a whole table row.
    #[instrument(level = "trace", skip(self))]
    pub fn classify_row(&self, row: &TableRow) -> DomainResult<TableEntry<C::Kind>> {
        let component = if row.is_root_configuration() {
            RowComponent::RootConfiguration
        } else if row.has_component_definition() {
            RowComponent::Component(self.classify_component_cell(row.component())?)
        } else if row.has_configuration() {
            RowComponent::Continuation
        } else {
            return Err(DomainError::UnrecognizedLine(row.to_line()));
        };
        let configuration = if row.has_configuration() {
            Some(configuration_from_text(row.configuration())?)
        } else {
            None
        };
        Ok(TableEntry {
            component,
            configuration,
        })
    }

    fn component(
        &self,
        caps: &Captures<'_>,
        category: Category,
    ) -> DomainResult<ComponentNode<C::Kind>> {
        let level = caps.get(1).map_or(0, |m| m.as_str().len());
        let identifier = caps.get(2).map_or("", |m| m.as_str());
        let kind = self
            .catalog
            .resolve(category, identifier)
            .ok_or_else(|| DomainError::UnknownNodeKind {
                category,
                identifier: identifier.to_string(),
            })?;
        trace!(level, identifier, %category, "classified component");
        ComponentNode::new(level, kind)
    }
}

/// Validate and parse configuration text from a cell or an inline suffix.
pub fn configuration_from_text(text: &str) -> DomainResult<ConfigurationNode> {
    validate_configuration_text(text)?;
    parse_configuration(text)
}

/// Raw component/configuration cell pair of a table document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    component: String,
    configuration: String,
}

impl TableRow {
    pub fn new(component: impl Into<String>, configuration: impl Into<String>) -> Self {
        Self {
            component: component.into().trim().to_string(),
            configuration: configuration.into().trim().to_string(),
        }
    }

    pub fn component_only(component: impl Into<String>) -> Self {
        Self::new(component, "")
    }

    /// Lex `| component | configuration |`. The configuration cell may contain
    /// further `|` characters; a missing second cell means no configuration.
    ///
    /// # Errors
    /// `UnrecognizedLine` when the line is not framed by `|`.
    pub fn parse_line(line: &str) -> DomainResult<Self> {
        let trimmed = line.trim();
        let inner = trimmed
            .strip_prefix(CELL_SEPARATOR)
            .ok_or_else(|| DomainError::UnrecognizedLine(line.to_string()))?;
        let inner = inner.strip_suffix(CELL_SEPARATOR).unwrap_or(inner);
        Ok(match inner.split_once(CELL_SEPARATOR) {
            Some((component, configuration)) => Self::new(component, configuration),
            None => Self::component_only(inner),
        })
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    pub fn is_root_configuration(&self) -> bool {
        self.component == ROOT_CONFIGURATION_MARKER
    }

    /// Any non-blank component cell, the root marker included.
    pub fn has_component_definition(&self) -> bool {
        !self.component.is_empty()
    }

    pub fn has_configuration(&self) -> bool {
        !self.configuration.is_empty()
    }

    /// `| Component | Configuration |` title row.
    pub fn is_header(&self) -> bool {
        self.component.eq_ignore_ascii_case("component")
            && self.configuration.eq_ignore_ascii_case("configuration")
    }

    pub fn to_line(&self) -> String {
        format!("| {} | {} |", self.component, self.configuration)
    }
}

/// What the component cell of a classified row stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum RowComponent<K> {
    Component(ComponentNode<K>),
    RootConfiguration,
    Continuation,
}

/// A classified table row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry<K> {
    pub component: RowComponent<K>,
    pub configuration: Option<ConfigurationNode>,
}

impl<K> TableEntry<K> {
    pub fn as_component(&self) -> Option<&ComponentNode<K>> {
        match &self.component {
            RowComponent::Component(node) => Some(node),
            _ => None,
        }
    }
}
