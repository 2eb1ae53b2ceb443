use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::kind::NodeType;
use crate::domain::node::ComponentNode;

/// Tree node in the arena-based component hierarchy.
#[derive(Debug)]
pub struct TreeNode<K> {
    /// Component placed at this position
    pub data: ComponentNode<K>,
    /// Index of parent node in the arena, None for root and unresolved nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in insertion order
    pub children: Vec<Index>,
}

/// Where `add_node` puts a component relative to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    First,
    Root,
    FirstChildOf(Index),
    UnderAncestor(Index),
    Unresolved,
    Detached,
}

/// Arena-based component forest built one node at a time.
///
/// Every node has at most one parent and edges only ever point at the node
/// being inserted, so the structure cannot contain cycles. Nodes without a
/// parent are kept in `roots` in insertion order.
#[derive(Debug)]
pub struct ComponentTree<K> {
    arena: Arena<TreeNode<K>>,
    roots: Vec<Index>,
    order: Vec<Index>,
}

impl<K: NodeType> Default for ComponentTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: NodeType> ComponentTree<K> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Attach `current` to the tree relative to the previously accepted
    /// component and fix its occurrence index.
    ///
    /// 1. no previous component: inserted without parent
    /// 2. root level: no parent, occurrence = same-kind level-1 nodes including this one
    /// 3. one level deeper than previous: child of previous, occurrence stays 1
    /// 4. same level or higher: child of the nearest ancestor of previous one level
    ///    above `current`, occurrence = same-kind children of that ancestor including
    ///    this one; without such an ancestor the node stays parentless and keeps its
    ///    occurrence
    ///
    /// # Errors
    /// `NodeNotInTree` when `previous` does not belong to this tree.
    #[instrument(level = "debug", skip(self, current), fields(node = %current))]
    pub fn add_node(
        &mut self,
        mut current: ComponentNode<K>,
        previous: Option<Index>,
    ) -> DomainResult<Index> {
        let placement = self.placement_of(&current, previous)?;

        let parent = match placement {
            Placement::First => {
                debug!("first node, inserted without parent");
                None
            }
            Placement::Root => {
                let occurrence = count_matching(self.arena.iter().map(|(_, n)| n), |n| {
                    n.data.is_at_root_level() && n.data.has_same_kind_as(&current)
                }) + 1;
                current.set_occurrence_under_parent(occurrence)?;
                debug!(occurrence, "root level node");
                None
            }
            Placement::FirstChildOf(parent) => {
                debug!("first child of previous node");
                Some(parent)
            }
            Placement::UnderAncestor(parent) => {
                let siblings = self.node(parent)?.children.iter().map(|&c| &self.arena[c]);
                let occurrence =
                    count_matching(siblings, |n| n.data.has_same_kind_as(&current)) + 1;
                current.set_occurrence_under_parent(occurrence)?;
                debug!(occurrence, "attached to ancestor of previous node");
                Some(parent)
            }
            Placement::Unresolved => {
                warn!("no ancestor one level above the node, inserted without parent");
                None
            }
            Placement::Detached => {
                warn!("node is more than one level deeper than the previous one, inserted without parent");
                None
            }
        };

        Ok(self.insert_node(current, parent))
    }

    fn placement_of(
        &self,
        current: &ComponentNode<K>,
        previous: Option<Index>,
    ) -> DomainResult<Placement> {
        let Some(previous) = previous else {
            return Ok(Placement::First);
        };
        let previous_node = &self.node(previous)?.data;

        if current.is_at_root_level() {
            return Ok(Placement::Root);
        }
        if current.is_one_level_deeper_than(previous_node) {
            return Ok(Placement::FirstChildOf(previous));
        }
        if current.is_higher_than(previous_node) || current.is_at_same_level_as(previous_node) {
            let ancestor = self
                .ancestors_of(previous)?
                .into_iter()
                .find(|&a| current.is_one_level_deeper_than(&self.arena[a].data));
            return Ok(ancestor.map_or(Placement::Unresolved, Placement::UnderAncestor));
        }
        Ok(Placement::Detached)
    }

    #[instrument(level = "trace", skip(self, data))]
    fn insert_node(&mut self, data: ComponentNode<K>, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.roots.push(node_idx);
        }
        self.order.push(node_idx);

        node_idx
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&TreeNode<K>> {
        self.arena.get(idx)
    }

    fn node(&self, idx: Index) -> DomainResult<&TreeNode<K>> {
        self.arena.get(idx).ok_or(DomainError::NodeNotInTree)
    }

    /// # Errors
    /// `NodeNotInTree` for a foreign index.
    pub fn component(&self, idx: Index) -> DomainResult<&ComponentNode<K>> {
        Ok(&self.node(idx)?.data)
    }

    pub fn parent_of(&self, idx: Index) -> Option<Index> {
        self.arena.get(idx).and_then(|n| n.parent)
    }

    /// Component of the parent node, as resolved while inserting `idx`.
    pub fn parent_component(&self, idx: Index) -> Option<&ComponentNode<K>> {
        self.parent_of(idx)
            .and_then(|p| self.arena.get(p))
            .map(|n| &n.data)
    }

    pub fn children_of(&self, idx: Index) -> &[Index] {
        self.arena
            .get(idx)
            .map_or(&[][..], |n| n.children.as_slice())
    }

    pub fn has_edge(&self, parent: Index, child: Index) -> bool {
        self.parent_of(child) == Some(parent)
    }

    /// Parentless nodes in insertion order.
    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.arena.iter().filter(|(_, n)| n.parent.is_some()).count()
    }

    /// Nodes in the order they were added.
    pub fn in_insertion_order(&self) -> impl Iterator<Item = (Index, &TreeNode<K>)> + '_ {
        self.order
            .iter()
            .filter_map(|&idx| self.arena.get(idx).map(|n| (idx, n)))
    }

    /// Pre-order traversal over all trees of the forest.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_, K> {
        TreeIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut stack: Vec<(Index, usize)> = self.roots.iter().map(|&root| (root, 1)).collect();
        let mut max_depth = 0;
        while let Some((idx, depth)) = stack.pop() {
            if let Some(node) = self.get_node(idx) {
                max_depth = max_depth.max(depth);
                stack.extend(node.children.iter().map(|&child| (child, depth + 1)));
            }
        }
        max_depth
    }

    /// Nodes without children, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<Index> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(idx, _)| idx)
            .collect()
    }

    // ---------------------------------------------------------------------
    // Branch traversal
    // ---------------------------------------------------------------------

    /// Ancestors of `idx`, nearest first, excluding the node itself.
    ///
    /// # Errors
    /// `NodeNotInTree` for a foreign index.
    #[instrument(level = "trace", skip(self))]
    pub fn ancestors_of(&self, idx: Index) -> DomainResult<Vec<Index>> {
        let mut ancestors = Vec::new();
        let mut cursor = self.node(idx)?.parent;
        while let Some(parent) = cursor {
            ancestors.push(parent);
            cursor = self.node(parent)?.parent;
        }
        trace!(count = ancestors.len(), "collected ancestors");
        Ok(ancestors)
    }

    /// Root-first chain of ancestors, ending with `idx` itself.
    ///
    /// # Errors
    /// `NodeNotInTree` for a foreign index.
    #[instrument(level = "trace", skip(self))]
    pub fn full_chain_ending_at(&self, idx: Index) -> DomainResult<Vec<Index>> {
        let mut chain = self.ancestors_of(idx)?;
        chain.reverse();
        chain.push(idx);
        Ok(chain)
    }

    /// Components along [`full_chain_ending_at`](Self::full_chain_ending_at).
    pub fn branch(&self, idx: Index) -> DomainResult<Vec<&ComponentNode<K>>> {
        self.full_chain_ending_at(idx)?
            .into_iter()
            .map(|i| self.component(i))
            .collect()
    }
}

fn count_matching<'a, K, I, F>(nodes: I, predicate: F) -> u64
where
    K: 'a,
    I: Iterator<Item = &'a TreeNode<K>>,
    F: Fn(&TreeNode<K>) -> bool,
{
    nodes.filter(|&n| predicate(n)).count() as u64
}

pub struct TreeIterator<'a, K> {
    tree: &'a ComponentTree<K>,
    stack: Vec<Index>,
}

impl<'a, K: NodeType> TreeIterator<'a, K> {
    fn new(tree: &'a ComponentTree<K>) -> Self {
        // reversed so the first root is visited first
        let stack = tree.roots.iter().rev().copied().collect();
        Self { tree, stack }
    }
}

impl<'a, K: NodeType> Iterator for TreeIterator<'a, K> {
    type Item = (Index, &'a TreeNode<K>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
