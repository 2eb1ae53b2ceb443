//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::{Document, DocumentService};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, DocumentFormat, Settings};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Run the parsed command line.
pub fn execute(cli: &Cli) -> CliResult<()> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("resolve cwd", e))?,
    };
    debug!("execute: project_dir={}", project_dir.display());

    match &cli.command {
        Some(Commands::Config { command }) => config_command(command, &project_dir),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(command) => {
            let container = ServiceContainer::new(Settings::load(Some(&project_dir))?);
            let format = cli.format.unwrap_or(container.settings.format);
            document_command(command, &container.document_service(), format)
        }
        None => Err(CliError::Usage(
            "no command given, run with --help for usage".to_string(),
        )),
    }
}

#[instrument(level = "debug", skip(service))]
fn document_command(
    command: &Commands,
    service: &DocumentService,
    format: DocumentFormat,
) -> CliResult<()> {
    match command {
        Commands::Plan { file } => {
            let document = service.load(file, format)?;
            let actions = service.plan(&document)?;
            output::header(&title(&document));
            for action in actions {
                output::info(&action);
            }
        }
        Commands::Selectors { file } => {
            let document = service.load(file, format)?;
            for entry in service.selectors(&document)? {
                output::action(&entry.component, &entry.selector);
            }
        }
        Commands::Tree { file } => {
            let document = service.load(file, format)?;
            output::info(service.render_tree(&document)?.trim_end());
        }
        Commands::Validate { file } => {
            let document = service.load(file, format)?;
            let summary = service.validate(&document)?;
            output::success(&format!(
                "{}: valid {} document",
                document.path.display(),
                summary.notation
            ));
            output::detail(&format!("components:     {}", summary.components));
            output::detail(&format!("configurations: {}", summary.configurations));
        }
        Commands::Convert { file, output: target } => {
            let document = service.load(file, format)?;
            let table = service.convert(&document)?;
            match target {
                Some(path) => {
                    service.write_output(path, &table)?;
                    output::success(&format!("wrote {}", path.display()));
                }
                None => output::info(&table),
            }
        }
        Commands::Config { .. } | Commands::Completion { .. } => {
            return Err(CliError::InvalidArgs(
                "not a document command".to_string(),
            ));
        }
    }
    Ok(())
}

fn title(document: &Document) -> String {
    format!("{} ({})", document.path.display(), document.notation)
}

fn config_command(command: &ConfigCommands, project_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Path => {
            let show = |label: &str, path: Option<PathBuf>| match path {
                Some(path) if path.exists() => output::action(label, &path.display()),
                Some(path) => output::action(label, &format!("{} (not found)", path.display())),
                None => output::action(label, "unavailable"),
            };
            show("global", global_config_path());
            show("local", Some(local_config_path(project_dir)));
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                local_config_path(project_dir)
            };
            if path.exists() {
                output::warning(&format!("config already exists: {}", path.display()));
                return Ok(());
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
        }
    }
    Ok(())
}
