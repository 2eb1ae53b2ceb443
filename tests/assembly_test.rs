//! Tests for ContentAssembler over both notations

use rstest::rstest;

use comptree::application::{ApplicationError, ContentAssembler};
use comptree::domain::{
    context_selector, Catalog, ComponentTree, DomainError, Kind, NodeType, TableRow,
};
use comptree::infrastructure::traits::{ActionLog, ContextMode, PageAction};
use comptree::util::testing::init_test_setup;

fn assemble(document: &str) -> (ComponentTree<Kind>, Vec<PageAction>) {
    init_test_setup();
    let catalog = Catalog::default();
    let log = ActionLog::new();
    let tree = ContentAssembler::new(&catalog, &log, &log, &log)
        .assemble_tree_view(document)
        .expect("assemble tree view");
    (tree, log.into_actions())
}

fn assemble_err(document: &str) -> DomainError {
    let catalog = Catalog::default();
    let log = ActionLog::new();
    match ContentAssembler::new(&catalog, &log, &log, &log).assemble_tree_view(document) {
        Err(ApplicationError::Domain(e)) => e,
        other => panic!("expected domain error, got {other:?}"),
    }
}

fn selectors(tree: &ComponentTree<Kind>) -> Vec<String> {
    tree.in_insertion_order()
        .map(|(idx, _)| context_selector(tree, idx).unwrap())
        .collect()
}

// ============================================================
// Tree view scenarios
// ============================================================

#[test]
fn given_single_container_when_assembling_then_one_node_without_edges() {
    // Act
    let (tree, _) = assemble("- CONTAINER");

    // Assert
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.edge_count(), 0);
    assert_eq!(selectors(&tree), vec![".container:nth-child(1)"]);
}

#[test]
fn given_three_levels_when_assembling_then_image_selector_spans_branch() {
    let (tree, _) = assemble("- CONTAINER\n-- LAYOUT\n--- IMAGE\n");

    assert_eq!(
        selectors(&tree).last().map(String::as_str),
        Some(".container:nth-child(1) .layout .image-component:nth-child(1)")
    );
}

#[test]
fn given_sibling_images_when_assembling_then_second_counts_two() {
    let (tree, _) = assemble("- CONTAINER\n-- LAYOUT\n--- IMAGE\n--- IMAGE");

    let (_, second) = tree.in_insertion_order().last().unwrap();
    assert_eq!(second.data.occurrence_under_parent(), 2);
    assert!(selectors(&tree)
        .last()
        .unwrap()
        .ends_with(".image-component:nth-child(2)"));
}

#[test]
fn given_modifier_one_level_deeper_when_assembling_then_names_both_nodes() {
    let error = assemble_err("- CONTAINER\n-- LAYOUT\n---@ PADDING_MODIFIER");

    match error {
        DomainError::ModifierMustAttachAtSiblingLevel {
            line,
            previous,
            current,
        } => {
            assert_eq!(line, 3);
            assert!(previous.contains("LAYOUT"));
            assert!(current.contains("PADDING_MODIFIER"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
#[case("- CONTAINER\n--- LAYOUT", 2)]
#[case("-- CONTAINER", 1)]
fn given_depth_jump_when_assembling_then_excessive_depth_jump(
    #[case] document: &str,
    #[case] expected_line: usize,
) {
    assert!(matches!(
        assemble_err(document),
        DomainError::ExcessiveDepthJump { line, .. } if line == expected_line
    ));
}

#[rstest]
#[case("- CONTAINER\n-- UNKNOWN_THING")]
#[case("- CONTAINER\n-@ NOT_A_MODIFIER")]
fn given_unknown_identifier_when_assembling_then_unknown_node_kind(#[case] document: &str) {
    assert!(matches!(
        assemble_err(document),
        DomainError::UnknownNodeKind { .. }
    ));
}

#[rstest]
#[case("- CONTAINER >>", DomainError::MissingInlineConfig("- CONTAINER >>".to_string()))]
#[case("- CONTAINER\n-* a:b,", DomainError::TrailingDelimiter("-* a:b,".to_string()))]
#[case("- CONTAINER\n-* color", DomainError::MissingKeyValueDelimiter("-* color".to_string()))]
#[case("- CONTAINER\n\n-- LAYOUT", DomainError::UnrecognizedLine(String::new()))]
fn given_malformed_line_when_assembling_then_reports_it(
    #[case] document: &str,
    #[case] expected: DomainError,
) {
    assert_eq!(assemble_err(document), expected);
}

#[test]
fn given_nested_document_when_assembling_then_occurrence_counts_per_parent() {
    // Arrange
    let document = "\
- CONTAINER
-- LAYOUT
--- IMAGE
--- YOUTUBE_VIDEO
--- IMAGE
- CONTAINER
-- LAYOUT
--- IMAGE
";

    // Act
    let (tree, _) = assemble(document);

    // Assert
    assert_eq!(
        selectors(&tree),
        vec![
            ".container:nth-child(1)",
            ".container:nth-child(1) .layout",
            ".container:nth-child(1) .layout .image-component:nth-child(1)",
            ".container:nth-child(1) .layout .youtube-video:nth-child(1)",
            ".container:nth-child(1) .layout .image-component:nth-child(2)",
            ".container:nth-child(2)",
            ".container:nth-child(2) .layout",
            ".container:nth-child(2) .layout .image-component:nth-child(1)",
        ]
    );
}

#[test]
fn given_consecutive_deeper_node_when_assembling_then_single_parent_edge() {
    let (tree, _) = assemble("- CONTAINER\n-- LAYOUT\n--- IMAGE");

    let order: Vec<_> = tree.in_insertion_order().map(|(idx, _)| idx).collect();
    assert!(tree.has_edge(order[0], order[1]));
    assert!(tree.has_edge(order[1], order[2]));
    assert_eq!(tree.edge_count(), 2);
    assert_eq!(tree.parent_of(order[0]), None);
}

#[test]
fn given_deep_node_when_walking_branch_then_ancestors_are_nearest_first() {
    let (tree, _) = assemble("- CONTAINER\n-- LAYOUT\n--- CAROUSEL\n---- CAROUSEL_ITEM");
    let leaf = tree.in_insertion_order().last().map(|(idx, _)| idx).unwrap();

    let ancestors = tree.ancestors_of(leaf).unwrap();
    let chain = tree.full_chain_ending_at(leaf).unwrap();

    let levels: Vec<_> = ancestors
        .iter()
        .map(|&idx| tree.component(idx).unwrap().level())
        .collect();
    assert_eq!(levels, vec![3, 2, 1]);
    assert_eq!(chain.last(), Some(&leaf));
    assert_eq!(chain.len(), 4);
}

#[test]
fn given_modifier_at_sibling_level_when_assembling_then_attached_to_parent() {
    let (tree, actions) = assemble("- CONTAINER\n-- LAYOUT\n--@ COLORS_MODIFIER\n--* bg:#000");

    let (idx, modifier) = tree.in_insertion_order().last().unwrap();
    assert!(modifier.data.is_modifier());
    assert_eq!(
        tree.parent_component(idx).map(|p| p.kind().name()),
        Some("CONTAINER")
    );
    assert_eq!(
        context_selector(&tree, idx).unwrap(),
        ".container:nth-child(1) .colors-modifier"
    );
    assert!(actions.contains(&PageAction::UseContext {
        selector: ".container:nth-child(1) .colors-modifier".to_string(),
        mode: ContextMode::RefreshForConfiguration,
    }));
}

#[test]
fn given_leading_configuration_when_assembling_then_page_is_configured() {
    let (_, actions) = assemble("* title:\"Home\"\n- CONTAINER");

    match &actions[0] {
        PageAction::Configure {
            owner: None,
            configuration,
        } => assert_eq!(configuration.get("title"), Some("Home")),
        other => panic!("unexpected action {other:?}"),
    }
}

// ============================================================
// Table scenarios
// ============================================================

fn assemble_table(rows: &[TableRow]) -> Result<(ComponentTree<Kind>, Vec<PageAction>), ApplicationError> {
    let catalog = Catalog::default();
    let log = ActionLog::new();
    let tree = ContentAssembler::new(&catalog, &log, &log, &log).assemble_table(rows)?;
    Ok((tree, log.into_actions()))
}

#[test]
fn given_table_rows_when_assembling_then_same_tree_as_tree_view() {
    // Arrange
    let rows = [
        TableRow::component_only("> CONTAINER"),
        TableRow::component_only(">> LAYOUT"),
        TableRow::new(">>> IMAGE", "name:a.png"),
        TableRow::new("", "link:/some/path"),
        TableRow::component_only(">>> IMAGE"),
    ];

    // Act
    let (tree, actions) = assemble_table(&rows).unwrap();

    // Assert
    let (expected, _) = assemble("- CONTAINER\n-- LAYOUT\n--- IMAGE\n--- IMAGE");
    assert_eq!(selectors(&tree), selectors(&expected));
    let configured: Vec<_> = actions
        .iter()
        .filter_map(|a| match a {
            PageAction::Configure {
                owner: Some(owner),
                configuration,
            } => Some((owner.as_str(), configuration.len())),
            _ => None,
        })
        .collect();
    assert_eq!(configured, vec![("IMAGE", 1), ("IMAGE", 1)]);
}

#[rstest]
#[case(vec![], DomainError::EmptyDocument)]
#[case(vec![TableRow::new("", "a:b")], DomainError::NoComponentDefinition)]
#[case(
    vec![TableRow::component_only("<"), TableRow::component_only("> CONTAINER")],
    DomainError::EmptyRootConfiguration(1)
)]
#[case(
    vec![TableRow::component_only("> CONTAINER"), TableRow::new("<", "a:b")],
    DomainError::RootConfigurationNotFirst(2)
)]
#[case(
    vec![TableRow::component_only("> CONTAINER"), TableRow::component_only(">>@ COLORS_MODIFIER")],
    DomainError::ModifierMustAttachAtSiblingLevel {
        line: 2,
        previous: "CONTAINER at level 1 (occurrence 1)".to_string(),
        current: "modifier COLORS_MODIFIER at level 2 (occurrence 1)".to_string(),
    }
)]
fn given_invalid_table_when_assembling_then_fails(
    #[case] rows: Vec<TableRow>,
    #[case] expected: DomainError,
) {
    match assemble_table(&rows) {
        Err(ApplicationError::Domain(e)) => assert_eq!(e, expected),
        other => panic!("expected domain error, got {other:?}"),
    }
}

#[test]
fn given_last_table_row_with_configuration_when_assembling_then_context_is_set() {
    let rows = [
        TableRow::component_only("> CONTAINER"),
        TableRow::new(">> LAYOUT", "gap:small"),
    ];

    let (_, actions) = assemble_table(&rows).unwrap();

    assert_eq!(
        actions[2],
        PageAction::UseContext {
            selector: ".container:nth-child(1) .layout".to_string(),
            mode: ContextMode::EnterComponent,
        }
    );
    assert!(matches!(actions.last(), Some(PageAction::Configure { .. })));
}
