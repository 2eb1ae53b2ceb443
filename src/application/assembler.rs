//! Assembly drivers for both document notations.
//!
//! A document is classified and structurally validated as a whole before the
//! first collaborator call, then replayed in a single forward pass.

use generational_arena::Index;
use tracing::{debug, info, instrument};

use crate::application::ApplicationResult;
use crate::domain::{
    context_selector, validate_structure, ComponentTree, ConfigurationNode, DomainError,
    DomainResult, KindCatalog, Node, NodeClassifier, NodeType, RowComponent, TableEntry, TableRow,
};
use crate::infrastructure::traits::{
    ComponentAdder, ComponentConfigurer, ContextMode, ContextTarget,
};

/// Computes the selector of a tree node and hands it to a [`ContextTarget`].
pub struct ComponentContextSetter<'a> {
    target: &'a dyn ContextTarget,
}

impl<'a> ComponentContextSetter<'a> {
    pub fn new(target: &'a dyn ContextTarget) -> Self {
        Self { target }
    }

    /// Returns the selector that was set.
    ///
    /// # Errors
    /// `NodeNotInTree` for a foreign index.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn set_context<K: NodeType>(
        &self,
        tree: &ComponentTree<K>,
        idx: Index,
        mode: ContextMode,
    ) -> DomainResult<String> {
        let selector = context_selector(tree, idx)?;
        debug!(%selector, %mode, "set context");
        self.target.use_context(&selector, mode);
        Ok(selector)
    }
}

/// Lines of a tree-view document; trailing line breaks are ignored.
pub fn tree_view_lines(document: &str) -> Vec<&str> {
    document.trim_end_matches(['\n', '\r']).lines().collect()
}

/// Classify every line of a tree-view document and validate its structure.
///
/// # Errors
/// - `EmptyDocument` for a blank document
/// - any grammar or structural error, for the first offending line
#[instrument(level = "debug", skip(classifier, document))]
pub fn classify_tree_view<C: KindCatalog>(
    classifier: &NodeClassifier<'_, C>,
    document: &str,
) -> DomainResult<Vec<Node<C::Kind>>> {
    if document.trim().is_empty() {
        return Err(DomainError::EmptyDocument);
    }
    let nodes = tree_view_lines(document)
        .into_iter()
        .map(|line| classifier.classify_line(line))
        .collect::<DomainResult<Vec<_>>>()?;
    validate_structure(
        nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.as_component().map(|c| (i + 1, c))),
    )?;
    Ok(nodes)
}

/// Classify every row of a table document and run the table pre-flight checks.
///
/// # Errors
/// - `EmptyDocument` without rows
/// - `NoComponentDefinition` when no component cell is filled
/// - `RootConfigurationNotFirst` for a `<` row after a component
/// - `EmptyRootConfiguration` for a `<` row without configuration
/// - any grammar or structural error, for the first offending row
#[instrument(level = "debug", skip(classifier, rows))]
pub fn classify_table<C: KindCatalog>(
    classifier: &NodeClassifier<'_, C>,
    rows: &[TableRow],
) -> DomainResult<Vec<TableEntry<C::Kind>>> {
    if rows.is_empty() {
        return Err(DomainError::EmptyDocument);
    }
    if !rows.iter().any(TableRow::has_component_definition) {
        return Err(DomainError::NoComponentDefinition);
    }
    let entries = rows
        .iter()
        .map(|row| classifier.classify_row(row))
        .collect::<DomainResult<Vec<_>>>()?;

    let mut component_seen = false;
    for (i, entry) in entries.iter().enumerate() {
        match entry.component {
            RowComponent::Component(_) => component_seen = true,
            RowComponent::RootConfiguration if component_seen => {
                return Err(DomainError::RootConfigurationNotFirst(i + 1));
            }
            RowComponent::RootConfiguration if entry.configuration.is_none() => {
                return Err(DomainError::EmptyRootConfiguration(i + 1));
            }
            RowComponent::RootConfiguration | RowComponent::Continuation => {}
        }
    }

    validate_structure(
        entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.as_component().map(|c| (i + 1, c))),
    )?;
    Ok(entries)
}

/// Drives the page collaborators through a document.
pub struct ContentAssembler<'a, C: KindCatalog> {
    classifier: NodeClassifier<'a, C>,
    adder: &'a dyn ComponentAdder<C::Kind>,
    configurer: &'a dyn ComponentConfigurer<C::Kind>,
    context: ComponentContextSetter<'a>,
}

impl<'a, C: KindCatalog> ContentAssembler<'a, C> {
    pub fn new(
        catalog: &'a C,
        adder: &'a dyn ComponentAdder<C::Kind>,
        configurer: &'a dyn ComponentConfigurer<C::Kind>,
        context: &'a dyn ContextTarget,
    ) -> Self {
        Self {
            classifier: NodeClassifier::new(catalog),
            adder,
            configurer,
            context: ComponentContextSetter::new(context),
        }
    }

    /// Assemble a tree-view document.
    ///
    /// A component gets its context set when more lines follow or when it
    /// carries inline configuration. Configuration lines refresh the context
    /// of the last component and configure it; before any component they
    /// configure the page itself.
    #[instrument(level = "debug", skip(self, document))]
    pub fn assemble_tree_view(&self, document: &str) -> ApplicationResult<ComponentTree<C::Kind>> {
        let nodes = classify_tree_view(&self.classifier, document)?;
        let last = nodes.len() - 1;
        let mut tree = ComponentTree::new();

        nodes
            .into_iter()
            .enumerate()
            .try_fold(
                None,
                |previous: Option<Index>, (i, node)| -> DomainResult<Option<Index>> {
                    match node {
                        Node::Component(component) => {
                            let has_inline = component.inline_config().is_some();
                            let idx = tree.add_node(component, previous)?;
                            self.accept(&tree, idx, i < last || has_inline)?;
                            let node = tree.component(idx)?;
                            if let Some(configuration) = node.inline_config() {
                                self.configurer.configure(Some(node.kind()), configuration);
                            }
                            Ok(Some(idx))
                        }
                        Node::Configuration(configuration) => {
                            self.configure_last(&tree, previous, &configuration)?;
                            Ok(previous)
                        }
                    }
                },
            )?;

        info!(components = tree.len(), "assembled tree view");
        Ok(tree)
    }

    /// Assemble a table document.
    ///
    /// A `<` row configures the page. A component row gets its context set
    /// when more rows follow or when it carries configuration, is added, then
    /// configured. A continuation row refreshes the context of the last
    /// component and configures it.
    #[instrument(level = "debug", skip(self, rows))]
    pub fn assemble_table(&self, rows: &[TableRow]) -> ApplicationResult<ComponentTree<C::Kind>> {
        let entries = classify_table(&self.classifier, rows)?;
        let last = entries.len() - 1;
        let mut tree = ComponentTree::new();

        entries
            .into_iter()
            .enumerate()
            .try_fold(None, |previous: Option<Index>, (i, entry)| -> DomainResult<Option<Index>> {
                let TableEntry {
                    component,
                    configuration,
                } = entry;
                match component {
                    RowComponent::RootConfiguration => {
                        if let Some(configuration) = &configuration {
                            self.configurer.configure(None, configuration);
                        }
                        Ok(previous)
                    }
                    RowComponent::Component(component) => {
                        let idx = tree.add_node(component, previous)?;
                        self.accept(&tree, idx, i < last || configuration.is_some())?;
                        if let Some(configuration) = &configuration {
                            let owner = tree.component(idx)?.kind();
                            self.configurer.configure(Some(owner), configuration);
                        }
                        Ok(Some(idx))
                    }
                    RowComponent::Continuation => {
                        if let Some(configuration) = &configuration {
                            self.configure_last(&tree, previous, configuration)?;
                        }
                        Ok(previous)
                    }
                }
            })?;

        info!(components = tree.len(), "assembled table");
        Ok(tree)
    }

    fn accept(
        &self,
        tree: &ComponentTree<C::Kind>,
        idx: Index,
        needs_context: bool,
    ) -> DomainResult<()> {
        if needs_context {
            self.context
                .set_context(tree, idx, ContextMode::EnterComponent)?;
        }
        self.adder
            .add_component(tree.parent_component(idx), tree.component(idx)?);
        Ok(())
    }

    fn configure_last(
        &self,
        tree: &ComponentTree<C::Kind>,
        previous: Option<Index>,
        configuration: &ConfigurationNode,
    ) -> DomainResult<()> {
        match previous {
            Some(idx) => {
                self.context
                    .set_context(tree, idx, ContextMode::RefreshForConfiguration)?;
                self.configurer
                    .configure(Some(tree.component(idx)?.kind()), configuration);
            }
            None => self.configurer.configure(None, configuration),
        }
        Ok(())
    }
}
