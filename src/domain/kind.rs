//! Component kinds and the catalog resolving identifiers to kinds.
//!
//! The tree, validator and selector assembler only rely on the [`NodeType`]
//! capability. Which kinds exist and which selector template each maps to is
//! injected through a [`KindCatalog`].

use std::collections::BTreeMap;
use std::fmt;

/// Placeholder replaced by the occurrence index in a [`SelectorTemplate`].
pub const OCCURRENCE_PLACEHOLDER: &str = "{n}";

/// The two disjoint categories of component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Paragraph,
    Modifier,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Paragraph => write!(f, "paragraph"),
            Category::Modifier => write!(f, "modifier"),
        }
    }
}

/// Capability every component kind must provide: a pure mapping from an
/// occurrence index to a context selector fragment.
pub trait NodeType: Clone + PartialEq + fmt::Debug + fmt::Display {
    /// Identifier as written in documents, e.g. `IMAGE`.
    fn name(&self) -> &str;

    fn category(&self) -> Category;

    /// Selector fragment addressing the `occurrence`-th instance of this kind.
    fn context_selector(&self, occurrence: u64) -> String;
}

/// Resolves document identifiers to kinds.
pub trait KindCatalog {
    type Kind: NodeType;

    fn resolve(&self, category: Category, identifier: &str) -> Option<Self::Kind>;
}

/// Selector template with an optional `{n}` occurrence placeholder.
///
/// Templates without a placeholder (e.g. `.layout`) ignore the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorTemplate(String);

impl SelectorTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn apply(&self, occurrence: u64) -> String {
        self.0
            .replace(OCCURRENCE_PLACEHOLDER, &occurrence.to_string())
    }

    pub fn uses_occurrence(&self) -> bool {
        self.0.contains(OCCURRENCE_PLACEHOLDER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Catalog-backed component kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kind {
    name: String,
    category: Category,
    template: SelectorTemplate,
}

impl Kind {
    pub fn new(name: impl Into<String>, category: Category, template: SelectorTemplate) -> Self {
        Self {
            name: name.into(),
            category,
            template,
        }
    }

    pub fn template(&self) -> &SelectorTemplate {
        &self.template
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl NodeType for Kind {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    fn context_selector(&self, occurrence: u64) -> String {
        self.template.apply(occurrence)
    }
}

/// Paragraph kinds known out of the box: identifier → selector template.
pub const DEFAULT_PARAGRAPHS: &[(&str, &str)] = &[
    ("CONTAINER", ".container:nth-child({n})"),
    // a container holds a single layout, so the index is not used
    ("LAYOUT", ".layout"),
    ("IMAGE", ".image-component:nth-child({n})"),
    ("CAROUSEL", ".carousel:nth-child({n})"),
    ("CAROUSEL_ITEM", ".carousel-item:nth-child({n})"),
    ("YOUTUBE_VIDEO", ".youtube-video:nth-child({n})"),
    ("RICH_TEXT", ".rich-text:nth-child({n})"),
];

/// Modifier kinds known out of the box: identifier → selector template.
pub const DEFAULT_MODIFIERS: &[(&str, &str)] = &[
    ("ABSOLUTE_HEIGHT_MODIFIER", ".absolute-height-modifier"),
    ("COLORS_MODIFIER", ".colors-modifier"),
    ("PADDING_MODIFIER", ".padding-modifier"),
];

/// Identifier → template tables for both categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    paragraphs: BTreeMap<String, SelectorTemplate>,
    modifiers: BTreeMap<String, SelectorTemplate>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::from_templates(
            DEFAULT_PARAGRAPHS
                .iter()
                .map(|(name, template)| (name.to_string(), template.to_string())),
            DEFAULT_MODIFIERS
                .iter()
                .map(|(name, template)| (name.to_string(), template.to_string())),
        )
    }
}

impl Catalog {
    pub fn from_templates<P, M>(paragraphs: P, modifiers: M) -> Self
    where
        P: IntoIterator<Item = (String, String)>,
        M: IntoIterator<Item = (String, String)>,
    {
        Self {
            paragraphs: paragraphs
                .into_iter()
                .map(|(name, template)| (name, SelectorTemplate::new(template)))
                .collect(),
            modifiers: modifiers
                .into_iter()
                .map(|(name, template)| (name, SelectorTemplate::new(template)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len() + self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.modifiers.is_empty()
    }

    fn table(&self, category: Category) -> &BTreeMap<String, SelectorTemplate> {
        match category {
            Category::Paragraph => &self.paragraphs,
            Category::Modifier => &self.modifiers,
        }
    }
}

impl KindCatalog for Catalog {
    type Kind = Kind;

    fn resolve(&self, category: Category, identifier: &str) -> Option<Kind> {
        self.table(category)
            .get(identifier)
            .map(|template| Kind::new(identifier, category, template.clone()))
    }
}
