//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Merge Semantics:
//! - Defaults → Global: REPLACE (global defines the real catalog)
//! - Global → Local: MERGE with `!KEY` removal
//! - Catalog file: MERGE last
//!
//! Note: These tests run without a global config (temp directories only),
//! so local config merges onto the compiled defaults.

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use comptree::application::ApplicationError;
use comptree::config::{local_config_path, DocumentFormat, Settings};
use comptree::domain::{Category, KindCatalog, NodeType};

#[test]
#[serial]
fn given_no_config_files_when_load_then_compiled_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.format, DocumentFormat::Auto);
    let catalog = settings.catalog();
    let container = catalog.resolve(Category::Paragraph, "CONTAINER").unwrap();
    assert_eq!(container.context_selector(3), ".container:nth-child(3)");
}

#[test]
#[serial]
fn given_local_catalog_override_when_load_then_template_is_replaced() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
[catalog.paragraphs]
LAYOUT = ".grid-layout"

[catalog.modifiers]
"!COLORS_MODIFIER" = ""
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    let catalog = settings.catalog();
    assert_eq!(
        catalog
            .resolve(Category::Paragraph, "LAYOUT")
            .map(|k| k.context_selector(1)),
        Some(".grid-layout".to_string())
    );
    assert!(catalog.resolve(Category::Modifier, "COLORS_MODIFIER").is_none());
    assert!(catalog.resolve(Category::Modifier, "PADDING_MODIFIER").is_some());
}

#[test]
#[serial]
fn given_malformed_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "format = [not toml").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().starts_with("config error"));
}

#[test]
#[serial]
fn given_template_as_local_config_when_load_then_defaults_are_unchanged() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), Settings::template()).unwrap();

    let settings = Settings::load(Some(dir.path())).expect("template is valid config");

    assert_eq!(settings, Settings::default());
}

#[test]
#[serial]
fn given_invalid_format_env_var_when_load_then_config_error() {
    // Arrange
    let dir = TempDir::new().unwrap();
    std::env::set_var("COMPTREE_FORMAT", "bogus");

    // Act
    let result = Settings::load(Some(dir.path()));
    std::env::remove_var("COMPTREE_FORMAT");

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
#[serial]
fn given_format_env_var_when_load_then_overrides_local_config() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "format = \"tree\"\n").unwrap();
    std::env::set_var("COMPTREE_FORMAT", "table");

    let result = Settings::load(Some(dir.path()));
    std::env::remove_var("COMPTREE_FORMAT");

    assert_eq!(result.expect("load settings").format, DocumentFormat::Table);
}

#[test]
#[serial]
fn given_kind_outside_identifier_grammar_when_load_then_config_error_names_it() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "[catalog.paragraphs]\nHERO2 = \".hero\"\n",
    )
    .unwrap();

    // Act
    let result = Settings::load(Some(dir.path()));

    // Assert
    match result {
        Err(ApplicationError::Config { message }) => assert!(message.contains("HERO2")),
        other => panic!("expected config error, got {other:?}"),
    }
}
