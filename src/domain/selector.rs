//! Context selectors: one addressable string per node occurrence.

use generational_arena::Index;
use itertools::Itertools;
use tracing::instrument;

use crate::domain::arena::ComponentTree;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::kind::NodeType;
use crate::domain::node::ComponentNode;

/// Separator between the fragments of consecutive nodes (descendant combinator).
pub const SELECTOR_SEPARATOR: &str = " ";

/// Join the fragment of every node, root first, into one selector.
///
/// # Errors
/// `EmptyNodeSequence` when `nodes` is empty.
pub fn assemble_selector<K: NodeType>(nodes: &[&ComponentNode<K>]) -> DomainResult<String> {
    if nodes.is_empty() {
        return Err(DomainError::EmptyNodeSequence);
    }
    Ok(nodes
        .iter()
        .map(|node| node.context_selector())
        .join(SELECTOR_SEPARATOR))
}

/// Selector addressing `idx` through its full branch.
///
/// # Errors
/// `NodeNotInTree` for a foreign index.
#[instrument(level = "debug", skip(tree))]
pub fn context_selector<K: NodeType>(tree: &ComponentTree<K>, idx: Index) -> DomainResult<String> {
    assemble_selector(&tree.branch(idx)?)
}
