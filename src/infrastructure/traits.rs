//! I/O boundary traits for testability
//!
//! These traits abstract the page being assembled and the filesystem,
//! allowing the assembler to be driven against recording implementations.

use std::cell::RefCell;
use std::fmt;
use std::io;
use std::path::Path;

use tracing::trace;

use crate::domain::{ComponentNode, ConfigurationNode, NodeType};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Why a context is being set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMode {
    /// A freshly added component is entered
    EnterComponent,
    /// The context of an existing component is restored before configuring it
    RefreshForConfiguration,
}

impl fmt::Display for ContextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextMode::EnterComponent => write!(f, "enter"),
            ContextMode::RefreshForConfiguration => write!(f, "refresh"),
        }
    }
}

/// Adds a component to the page under its resolved parent.
pub trait ComponentAdder<K: NodeType> {
    fn add_component(&self, parent: Option<&ComponentNode<K>>, node: &ComponentNode<K>);
}

/// Applies a configuration to the component of kind `owner`; `None` targets the document root.
pub trait ComponentConfigurer<K: NodeType> {
    fn configure(&self, owner: Option<&K>, configuration: &ConfigurationNode);
}

/// Receives the selector addressing the current component.
pub trait ContextTarget {
    fn use_context(&self, selector: &str, mode: ContextMode);
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// One recorded page operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    UseContext {
        selector: String,
        mode: ContextMode,
    },
    AddComponent {
        parent: Option<String>,
        component: String,
    },
    Configure {
        owner: Option<String>,
        configuration: ConfigurationNode,
    },
}

impl fmt::Display for PageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageAction::UseContext { selector, mode } => {
                write!(f, "context  [{mode}] {selector}")
            }
            PageAction::AddComponent { parent, component } => match parent {
                Some(parent) => write!(f, "add      {component} under {parent}"),
                None => write!(f, "add      {component} at page root"),
            },
            PageAction::Configure {
                owner,
                configuration,
            } => match owner {
                Some(owner) => write!(f, "config   {owner} {configuration}"),
                None => write!(f, "config   <page> {configuration}"),
            },
        }
    }
}

/// Records every page operation in call order.
#[derive(Debug, Default)]
pub struct ActionLog {
    actions: RefCell<Vec<PageAction>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<PageAction> {
        self.actions.borrow().clone()
    }

    pub fn into_actions(self) -> Vec<PageAction> {
        self.actions.into_inner()
    }

    fn record(&self, action: PageAction) {
        trace!(%action, "recorded");
        self.actions.borrow_mut().push(action);
    }
}

impl<K: NodeType> ComponentAdder<K> for ActionLog {
    fn add_component(&self, parent: Option<&ComponentNode<K>>, node: &ComponentNode<K>) {
        self.record(PageAction::AddComponent {
            parent: parent.map(|p| p.kind().name().to_string()),
            component: node.kind().name().to_string(),
        });
    }
}

impl<K: NodeType> ComponentConfigurer<K> for ActionLog {
    fn configure(&self, owner: Option<&K>, configuration: &ConfigurationNode) {
        self.record(PageAction::Configure {
            owner: owner.map(|k| k.name().to_string()),
            configuration: configuration.clone(),
        });
    }
}

impl ContextTarget for ActionLog {
    fn use_context(&self, selector: &str, mode: ContextMode) {
        self.record(PageAction::UseContext {
            selector: selector.to_string(),
            mode,
        });
    }
}
