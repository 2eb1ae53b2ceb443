//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/comptree/comptree.toml`
//! 3. Local config: `<project_dir>/.comptree.toml`
//! 4. Environment variables: `COMPTREE_*` prefix
//!
//! A `catalog_file` named by any layer is merged on top of the result.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::kind::{DEFAULT_MODIFIERS, DEFAULT_PARAGRAPHS};
use crate::domain::{is_identifier, Catalog, Notation};

/// Prefix marking an inherited catalog entry for removal.
pub const NEGATION_PREFIX: char = '!';

/// How documents are read.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Table documents are detected by a leading `|`
    #[default]
    Auto,
    Tree,
    Table,
}

impl DocumentFormat {
    /// Notation of `source` under this format.
    pub fn resolve(self, source: &str) -> Notation {
        match self {
            DocumentFormat::Tree => Notation::TreeView,
            DocumentFormat::Table => Notation::Table,
            DocumentFormat::Auto => {
                let first = source.lines().map(str::trim).find(|l| !l.is_empty());
                match first {
                    Some(line) if line.starts_with('|') => Notation::Table,
                    _ => Notation::TreeView,
                }
            }
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Auto => write!(f, "auto"),
            DocumentFormat::Tree => write!(f, "tree"),
            DocumentFormat::Table => write!(f, "table"),
        }
    }
}

/// Component kinds: identifier → selector template (`{n}` = occurrence).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    pub paragraphs: BTreeMap<String, String>,
    pub modifiers: BTreeMap<String, String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let table = |entries: &[(&str, &str)]| {
            entries
                .iter()
                .map(|(name, template)| (name.to_string(), template.to_string()))
                .collect()
        };
        Self {
            paragraphs: table(DEFAULT_PARAGRAPHS),
            modifiers: table(DEFAULT_MODIFIERS),
        }
    }
}

/// Raw catalog config for intermediate parsing (tables are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawCatalogConfig {
    pub paragraphs: Option<BTreeMap<String, String>>,
    pub modifiers: Option<BTreeMap<String, String>>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub format: Option<DocumentFormat>,
    pub catalog_file: Option<PathBuf>,
    #[serde(default)]
    pub catalog: RawCatalogConfig,
}

impl CatalogConfig {
    /// Merge overlay entries onto base.
    ///
    /// - Entries from overlay are inserted or replace the base template
    /// - Keys prefixed with `!` remove the corresponding identifier
    ///
    /// # Examples
    /// ```ignore
    /// merge_table({A: ".a"}, {B: ".b"})       // → {A: ".a", B: ".b"}
    /// merge_table({A: ".a", B: ".b"}, {"!A": ""}) // → {B: ".b"}
    /// ```
    pub fn merge_table(
        base: &BTreeMap<String, String>,
        overlay: &BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        let mut result = base.clone();
        for (key, template) in overlay {
            if let Some(negated) = key.strip_prefix(NEGATION_PREFIX) {
                result.remove(negated);
            } else {
                result.insert(key.clone(), template.clone());
            }
        }
        result
    }

    /// Merge overlay config onto self (base); unspecified tables are kept.
    pub fn merge(&self, overlay: &RawCatalogConfig) -> Self {
        Self {
            paragraphs: overlay
                .paragraphs
                .as_ref()
                .map(|o| Self::merge_table(&self.paragraphs, o))
                .unwrap_or_else(|| self.paragraphs.clone()),
            modifiers: overlay
                .modifiers
                .as_ref()
                .map(|o| Self::merge_table(&self.modifiers, o))
                .unwrap_or_else(|| self.modifiers.clone()),
        }
    }

    /// Apply global config onto defaults: specified tables REPLACE the base.
    pub fn apply_global(&self, global: &RawCatalogConfig) -> Self {
        let replace = |table: &BTreeMap<String, String>| Self::merge_table(&BTreeMap::new(), table);
        Self {
            paragraphs: global
                .paragraphs
                .as_ref()
                .map(replace)
                .unwrap_or_else(|| self.paragraphs.clone()),
            modifiers: global
                .modifiers
                .as_ref()
                .map(replace)
                .unwrap_or_else(|| self.modifiers.clone()),
        }
    }

    /// Reject identifiers no document line could ever name.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let tables = [("paragraphs", &self.paragraphs), ("modifiers", &self.modifiers)];
        for (table, entries) in tables {
            if let Some(name) = entries.keys().find(|name| !is_identifier(name)) {
                return Err(ApplicationError::Config {
                    message: format!(
                        "invalid identifier '{name}' in catalog.{table}: only A-Z and _ are allowed"
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn to_catalog(&self) -> Catalog {
        Catalog::from_templates(self.paragraphs.clone(), self.modifiers.clone())
    }
}

/// Unified configuration for comptree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Document notation (default: auto)
    pub format: DocumentFormat,
    /// Extra catalog file merged on top of the configured catalog
    pub catalog_file: Option<PathBuf>,
    /// Component kinds and their selector templates
    pub catalog: CatalogConfig,
}

/// Get the XDG config directory for comptree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "comptree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("comptree.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".comptree.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is returned unchanged.
fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

fn read_toml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Catalog used to resolve document identifiers.
    pub fn catalog(&self) -> Catalog {
        self.catalog.to_catalog()
    }

    fn expand_paths(&mut self) {
        if let Some(file) = &self.catalog_file {
            self.catalog_file = Some(PathBuf::from(expand_env_vars(
                file.to_string_lossy().as_ref(),
            )));
        }
    }

    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            format: overlay.format.unwrap_or(self.format),
            catalog_file: overlay
                .catalog_file
                .clone()
                .or_else(|| self.catalog_file.clone()),
            catalog: self.catalog.merge(&overlay.catalog),
        }
    }

    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            format: global.format.unwrap_or(self.format),
            catalog_file: global
                .catalog_file
                .clone()
                .or_else(|| self.catalog_file.clone()),
            catalog: self.catalog.apply_global(&global.catalog),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults (sample catalog)
    /// 2. Global config: `$XDG_CONFIG_HOME/comptree/comptree.toml` (catalog tables REPLACE defaults)
    /// 3. Local config: `<project_dir>/.comptree.toml` (catalog tables MERGE, `!KEY` removes)
    /// 4. Environment variables: `COMPTREE_*` prefix
    /// 5. `catalog_file`, if set by any layer (MERGE)
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw: RawSettings = read_toml(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(project) = project_dir {
            let local_path = local_config_path(project);
            if local_path.exists() {
                let raw: RawSettings = read_toml(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        if let Some(file) = current.catalog_file.clone() {
            let extra: RawCatalogConfig = read_toml(&file)?;
            current.catalog = current.catalog.merge(&extra);
        }

        current.catalog.validate()?;
        Ok(current)
    }

    /// Apply COMPTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("COMPTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        match config.get::<DocumentFormat>("format") {
            Ok(val) => settings.format = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }
        if let Ok(val) = config.get_string("catalog_file") {
            settings.catalog_file = Some(PathBuf::from(val));
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# comptree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/comptree/comptree.toml  (defines your baseline)
#   Local:  <project_dir>/.comptree.toml      (project-specific additions)
#   Env:    COMPTREE_FORMAT, COMPTREE_CATALOG_FILE
#
# Catalog Merge Semantics:
#   Global catalog tables REPLACE the compiled defaults.
#   Local tables and the catalog file MERGE onto the result.
#   Use "!IDENTIFIER" as key to REMOVE an inherited kind:
#     "!YOUTUBE_VIDEO" = ""

# Document notation: auto | tree | table
# format = "auto"

# Extra catalog file with [paragraphs] / [modifiers] tables
# catalog_file = "~/.config/comptree/kinds.toml"

# Selector templates, {n} is replaced by the occurrence under the parent
[catalog.paragraphs]
# CONTAINER = ".container:nth-child({n})"
# LAYOUT = ".layout"
# IMAGE = ".image-component:nth-child({n})"

[catalog.modifiers]
# PADDING_MODIFIER = ".padding-modifier"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, KindCatalog};
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn given_default_settings_then_sample_catalog_and_auto_format() {
        let settings = Settings::default();

        assert_eq!(settings.format, DocumentFormat::Auto);
        assert!(settings.catalog_file.is_none());
        assert_eq!(
            settings.catalog.paragraphs.get("CONTAINER").map(String::as_str),
            Some(".container:nth-child({n})")
        );
        assert!(settings.catalog.modifiers.contains_key("PADDING_MODIFIER"));
    }

    #[test]
    fn given_local_config_when_loading_then_merges_onto_catalog() {
        // Arrange
        let dir = TempDir::new().unwrap();
        fs::write(
            local_config_path(dir.path()),
            r#"
format = "table"

[catalog.paragraphs]
ACCORDION = ".accordion:nth-child({n})"
"!YOUTUBE_VIDEO" = ""
"#,
        )
        .unwrap();

        // Act
        let settings = Settings::load(Some(dir.path())).expect("load local config");

        // Assert
        assert_eq!(settings.format, DocumentFormat::Table);
        let catalog = settings.catalog();
        assert!(catalog.resolve(Category::Paragraph, "ACCORDION").is_some());
        assert!(catalog.resolve(Category::Paragraph, "YOUTUBE_VIDEO").is_none());
        assert!(catalog.resolve(Category::Paragraph, "IMAGE").is_some());
    }

    #[test]
    fn given_catalog_file_when_loading_then_file_entries_are_merged() {
        let dir = TempDir::new().unwrap();
        let kinds = dir.path().join("kinds.toml");
        fs::write(&kinds, "[modifiers]\nBORDER_MODIFIER = \".border\"\n").unwrap();
        fs::write(
            local_config_path(dir.path()),
            format!("catalog_file = {:?}\n", kinds.display().to_string()),
        )
        .unwrap();

        let settings = Settings::load(Some(dir.path())).expect("load with catalog file");

        assert_eq!(
            settings.catalog.modifiers.get("BORDER_MODIFIER").map(String::as_str),
            Some(".border")
        );
        assert!(settings.catalog.modifiers.contains_key("COLORS_MODIFIER"));
    }

    #[test]
    fn given_missing_catalog_file_when_loading_then_config_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            local_config_path(dir.path()),
            "catalog_file = \"/does/not/exist.toml\"\n",
        )
        .unwrap();

        let result = Settings::load(Some(dir.path()));

        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_tilde_in_catalog_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            catalog_file: Some(PathBuf::from("~/kinds.toml")),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let expanded = settings.catalog_file.unwrap();
        assert!(expanded.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn test_merge_table_insert_and_override() {
        let base = table(&[("A", ".a"), ("B", ".b")]);
        let overlay = table(&[("B", ".bee"), ("C", ".c")]);

        let result = CatalogConfig::merge_table(&base, &overlay);

        assert_eq!(result, table(&[("A", ".a"), ("B", ".bee"), ("C", ".c")]));
    }

    #[test]
    fn test_merge_table_negation() {
        let base = table(&[("A", ".a"), ("B", ".b")]);
        let overlay = table(&[("!A", ""), ("!X", "")]);

        let result = CatalogConfig::merge_table(&base, &overlay);

        assert_eq!(result, table(&[("B", ".b")]));
    }

    #[test]
    fn test_apply_global_replaces_tables() {
        let base = CatalogConfig::default();
        let global = RawCatalogConfig {
            paragraphs: Some(table(&[("SECTION", ".section:nth-child({n})")])),
            modifiers: None,
        };

        let result = base.apply_global(&global);

        assert_eq!(result.paragraphs, table(&[("SECTION", ".section:nth-child({n})")]));
        assert_eq!(result.modifiers, base.modifiers);
    }

    #[rstest]
    #[case("HERO2")]
    #[case("Hero")]
    #[case("!")]
    fn given_malformed_identifier_when_validating_then_config_error(#[case] name: &str) {
        let mut catalog = CatalogConfig::default();
        catalog.modifiers.insert(name.to_string(), ".x".to_string());

        let err = catalog.validate().unwrap_err();

        assert!(err.to_string().contains(&format!("'{name}' in catalog.modifiers")));
    }

    #[test]
    fn test_apply_global_drops_negations() {
        let global = RawCatalogConfig {
            paragraphs: Some(table(&[("SECTION", ".section"), ("!CONTAINER", "")])),
            modifiers: None,
        };

        let result = CatalogConfig::default().apply_global(&global);

        assert_eq!(result.paragraphs, table(&[("SECTION", ".section")]));
        assert!(result.validate().is_ok());
    }

    #[test]
    fn given_auto_format_then_table_is_detected_by_leading_pipe() {
        assert_eq!(
            DocumentFormat::Auto.resolve("\n  | > CONTAINER |  |"),
            Notation::Table
        );
        assert_eq!(DocumentFormat::Auto.resolve("- CONTAINER"), Notation::TreeView);
        assert_eq!(DocumentFormat::Tree.resolve("| x |"), Notation::TreeView);
    }

    #[test]
    fn given_settings_when_serialized_then_roundtrips_through_toml() {
        let settings = Settings::default();

        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();

        assert_eq!(parsed, settings);
    }
}
