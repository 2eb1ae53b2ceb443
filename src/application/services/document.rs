//! Document service
//!
//! Loads component documents from disk and runs them through the assembler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::assembler::{classify_table, classify_tree_view, tree_view_lines};
use crate::application::{ApplicationError, ApplicationResult, ContentAssembler, IoResultExt};
use crate::config::DocumentFormat;
use crate::domain::{
    context_selector, convert_tree_view, to_table_text, Catalog, ComponentTree, DomainResult,
    Kind, NodeClassifier, Notation, TableRow, TreeNodeConvert,
};
use crate::infrastructure::traits::{ActionLog, FileSystem, PageAction};

/// A document read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub notation: Notation,
    pub source: String,
}

/// Selector of one component, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorEntry {
    /// Component with its kind, level and occurrence
    pub component: String,
    pub selector: String,
}

/// Counts of a structurally valid document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSummary {
    pub notation: Notation,
    pub components: usize,
    pub configurations: usize,
}

/// Parse `| component | configuration |` lines into rows.
///
/// Blank lines are skipped; a `| Component | Configuration |` header is dropped
/// when it is the first row.
pub fn parse_table(source: &str) -> DomainResult<Vec<TableRow>> {
    let mut rows = source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(TableRow::parse_line)
        .collect::<DomainResult<Vec<_>>>()?;
    if rows.first().is_some_and(TableRow::is_header) {
        rows.remove(0);
    }
    Ok(rows)
}

/// Service for assembling component documents.
pub struct DocumentService {
    fs: Arc<dyn FileSystem>,
    catalog: Catalog,
}

impl DocumentService {
    /// Create a new document service.
    pub fn new(fs: Arc<dyn FileSystem>, catalog: Catalog) -> Self {
        Self { fs, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Read a document and decide its notation.
    pub fn load(&self, path: &Path, format: DocumentFormat) -> ApplicationResult<Document> {
        let source = self
            .fs
            .read_to_string(path)
            .with_path_context("read document", path)?;
        let notation = format.resolve(&source);
        debug!("load: path={} notation={}", path.display(), notation);
        Ok(Document {
            path: path.to_path_buf(),
            notation,
            source,
        })
    }

    /// Assemble `document`, reporting every page operation to `log`.
    pub fn assemble(
        &self,
        document: &Document,
        log: &ActionLog,
    ) -> ApplicationResult<ComponentTree<Kind>> {
        let assembler = ContentAssembler::new(&self.catalog, log, log, log);
        match document.notation {
            Notation::TreeView => assembler.assemble_tree_view(&document.source),
            Notation::Table => assembler.assemble_table(&parse_table(&document.source)?),
        }
    }

    /// Page operations the document produces, in order.
    pub fn plan(&self, document: &Document) -> ApplicationResult<Vec<PageAction>> {
        let log = ActionLog::new();
        self.assemble(document, &log)?;
        Ok(log.into_actions())
    }

    pub fn build_tree(&self, document: &Document) -> ApplicationResult<ComponentTree<Kind>> {
        self.assemble(document, &ActionLog::new())
    }

    /// Selector of every component in document order.
    pub fn selectors(&self, document: &Document) -> ApplicationResult<Vec<SelectorEntry>> {
        let tree = self.build_tree(document)?;
        tree.in_insertion_order()
            .map(|(idx, node)| -> ApplicationResult<SelectorEntry> {
                Ok(SelectorEntry {
                    component: node.data.to_string(),
                    selector: context_selector(&tree, idx)?,
                })
            })
            .collect()
    }

    /// Classify and structurally validate without assembling.
    pub fn validate(&self, document: &Document) -> ApplicationResult<ValidationSummary> {
        let classifier = NodeClassifier::new(&self.catalog);
        let (components, configurations) = match document.notation {
            Notation::TreeView => {
                let nodes = classify_tree_view(&classifier, &document.source)?;
                let components = nodes.iter().filter_map(|n| n.as_component()).count();
                let inline = nodes
                    .iter()
                    .filter_map(|n| n.as_component())
                    .filter(|c| c.inline_config().is_some())
                    .count();
                (components, nodes.len() - components + inline)
            }
            Notation::Table => {
                let entries = classify_table(&classifier, &parse_table(&document.source)?)?;
                let components = entries.iter().filter_map(|e| e.as_component()).count();
                let configurations = entries
                    .iter()
                    .filter(|e| e.configuration.is_some())
                    .count();
                (components, configurations)
            }
        };
        Ok(ValidationSummary {
            notation: document.notation,
            components,
            configurations,
        })
    }

    /// Assembled forest as an indented tree.
    pub fn render_tree(&self, document: &Document) -> ApplicationResult<String> {
        Ok(self.build_tree(document)?.to_tree_string().to_string())
    }

    /// Tree-view document as table text.
    pub fn convert(&self, document: &Document) -> ApplicationResult<String> {
        if document.notation != Notation::TreeView {
            return Err(ApplicationError::UnsupportedNotation {
                operation: "convert",
                notation: document.notation,
            });
        }
        let rows = convert_tree_view(tree_view_lines(&document.source))?;
        Ok(to_table_text(&rows))
    }

    /// Write `content` to `path`, creating parent directories.
    pub fn write_output(&self, path: &Path, content: &str) -> ApplicationResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !self.fs.exists(parent) {
                self.fs
                    .create_dir_all(parent)
                    .with_path_context("create directory", parent)?;
            }
        }
        self.fs
            .write(path, &format!("{content}\n"))
            .with_path_context("write output", path)
    }
}
