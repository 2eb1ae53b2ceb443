//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::DocumentFormat;

/// Component tree assembler: rebuilds component hierarchies from depth-marked documents
#[derive(Parser, Debug)]
#[command(name = "comptree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Project directory holding .comptree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Document notation, overrides the configured format
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<DocumentFormat>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the page operations a document produces
    Plan {
        /// Document file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print the context selector of every component
    Selectors {
        /// Document file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show the assembled hierarchy as tree
    Tree {
        /// Document file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Check a document without assembling it
    Validate {
        /// Document file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Convert a tree-view document to table notation
    Convert {
        /// Tree-view document
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
