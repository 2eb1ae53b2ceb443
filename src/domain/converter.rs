//! Tree view → table view conversion.

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::grammar::{
    TableRow, MODIFIER_MARKER, ROOT_CONFIGURATION_MARKER, TABLE_DEPTH_MARKER, TREE_CONFIGURATION,
    TREE_DEPTH_MARKER, TREE_MODIFIER, TREE_PARAGRAPH,
};

#[derive(Debug, Default)]
struct PendingRow {
    component: String,
    configuration: String,
}

fn table_markers(tree_markers: &str) -> String {
    tree_markers.replace(TREE_DEPTH_MARKER, &TABLE_DEPTH_MARKER.to_string())
}

/// Convert tree-view lines into table rows.
///
/// - paragraphs and modifiers open a new row, an inline configuration lands in
///   the same row
/// - the first configuration line after a component without inline
///   configuration shares the component's row, later ones get their own row
/// - an unmarked configuration line opens a new row, marked `<` when it is the
///   first row of the table
///
/// Identifiers are copied as written; no catalog lookup happens here.
///
/// # Errors
/// `UnrecognizedLine` for a line of neither shape.
#[instrument(level = "debug", skip(lines))]
pub fn convert_tree_view<'a, I>(lines: I) -> DomainResult<Vec<TableRow>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut rows: Vec<PendingRow> = Vec::new();

    for line in lines {
        if let Some(caps) = TREE_PARAGRAPH.captures(line) {
            rows.push(PendingRow {
                component: format!("{} {}", table_markers(&caps[1]), &caps[2]),
                configuration: caps
                    .get(5)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
            });
        } else if let Some(caps) = TREE_CONFIGURATION.captures(line) {
            let configuration = caps[2].to_string();
            let is_root_level = caps[1].is_empty();
            let shares_row =
                !is_root_level && rows.last().is_some_and(|row| row.configuration.is_empty());
            if let Some(row) = rows.last_mut().filter(|_| shares_row) {
                row.configuration = configuration;
            } else {
                let component = if is_root_level && rows.is_empty() {
                    ROOT_CONFIGURATION_MARKER.to_string()
                } else {
                    String::new()
                };
                rows.push(PendingRow {
                    component,
                    configuration,
                });
            }
        } else if let Some(caps) = TREE_MODIFIER.captures(line) {
            rows.push(PendingRow {
                component: format!("{}{} {}", table_markers(&caps[1]), MODIFIER_MARKER, &caps[2]),
                configuration: String::new(),
            });
        } else {
            return Err(DomainError::UnrecognizedLine(line.to_string()));
        }
    }

    debug!(rows = rows.len(), "converted tree view");
    Ok(rows
        .into_iter()
        .map(|row| TableRow::new(row.component, row.configuration))
        .collect())
}

/// Render rows as `| component | configuration |` lines.
pub fn to_table_text(rows: &[TableRow]) -> String {
    rows.iter().map(TableRow::to_line).join("\n")
}
