use std::collections::HashMap;

use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::ComponentTree;
use crate::domain::kind::NodeType;
use crate::domain::node::ComponentNode;

/// Label of the synthetic node holding every root of the forest.
pub const PAGE_LABEL: &str = "page";

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

fn label<K: NodeType>(node: &ComponentNode<K>) -> String {
    let marker = if node.is_modifier() { "@ " } else { "" };
    format!("{marker}{} #{}", node.kind(), node.occurrence_under_parent())
}

impl<K: NodeType> TreeNodeConvert for ComponentTree<K> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        // reversed pre-order visits every child before its parent
        let nodes: Vec<_> = self.iter().collect();
        let mut built: HashMap<Index, Tree<String>> = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.into_iter().rev() {
            let leaves: Vec<_> = node
                .children
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(idx, Tree::new(label(&node.data)).with_leaves(leaves));
        }

        let roots: Vec<_> = self
            .roots()
            .iter()
            .filter_map(|root| built.remove(root))
            .collect();
        Tree::new(PAGE_LABEL.to_string()).with_leaves(roots)
    }
}
