use crate::blossom::NodeId;
use crate::edge::{EdgeClass, EdgeId};
use crate::error::{violation, MatchingError};
use crate::instance::Instance;
use crate::solution::Weight;

/// Alternating tree grown from one originally unmatched vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlternatingTree {
    pub(crate) root: NodeId,
}

impl AlternatingTree {
    pub(crate) fn new(root: NodeId) -> Self {
        Self { root }
    }
}

impl<W: Weight> Instance<W> {
    /// Distance to the tree root along parent links
    pub(crate) fn depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = node;
        while let Some(parent) = self.nodes[current.0].parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    pub(crate) fn tree_root(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.nodes[current.0].parent {
            current = parent;
        }
        current
    }

    /// Lowest common ancestor of two members of one tree
    pub(crate) fn lowest_common_ancestor(&self, a: NodeId, b: NodeId) -> Result<NodeId, MatchingError> {
        let (mut deep, mut shallow) = (a, b);
        let (mut deep_depth, mut shallow_depth) = (self.depth(a), self.depth(b));
        if shallow_depth > deep_depth {
            std::mem::swap(&mut deep, &mut shallow);
            std::mem::swap(&mut deep_depth, &mut shallow_depth);
        }
        while deep_depth > shallow_depth {
            deep = self.parent_of(deep)?;
            deep_depth -= 1;
        }
        while deep != shallow {
            match (self.nodes[deep.0].parent, self.nodes[shallow.0].parent) {
                (Some(up_deep), Some(up_shallow)) => {
                    deep = up_deep;
                    shallow = up_shallow;
                }
                _ => {
                    return Err(violation(format!(
                        "nodes {} and {} have no common ancestor",
                        a.0, b.0
                    )))
                }
            }
        }
        Ok(deep)
    }

    /// Nodes from `node` up to, but excluding, its ancestor `ancestor`
    pub(crate) fn path_below(&self, node: NodeId, ancestor: NodeId) -> Result<Vec<NodeId>, MatchingError> {
        let mut path = Vec::new();
        let mut current = node;
        while current != ancestor {
            path.push(current);
            current = self.parent_of(current)?;
        }
        Ok(path)
    }

    fn parent_of(&self, node: NodeId) -> Result<NodeId, MatchingError> {
        self.nodes[node.0]
            .parent
            .ok_or_else(|| violation(format!("node {} has no parent", node.0)))
    }

    /// Puts `replacement` at the position of `old` among the children of `parent`
    pub(crate) fn replace_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        replacement: NodeId,
    ) -> Result<(), MatchingError> {
        let children = &mut self.nodes[parent.0].children;
        let slot = children.iter_mut().find(|child| **child == old).ok_or_else(|| {
            violation(format!("node {} is not a child of {}", old.0, parent.0))
        })?;
        *slot = replacement;
        Ok(())
    }

    /// Links `child` below `parent` through `edge`
    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId, edge: EdgeId) {
        self.nodes[parent.0].children.push(child);
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.parent_edge = Some(edge);
    }

    /// Breaks the subtree hanging from odd node `top` into matched pairs.
    ///
    /// Every odd node has exactly one child, its partner through the matching
    /// edge; the children of that partner are odd again. Tree edges above odd
    /// nodes go back to slack.
    pub(crate) fn decompose_subtree(&mut self, top: NodeId) -> Result<(), MatchingError> {
        let mut stack = vec![top];
        while let Some(odd) = stack.pop() {
            if let Some(edge) = self.nodes[odd.0].parent_edge {
                self.set_class(edge, EdgeClass::Slack);
            }
            let even = match self.nodes[odd.0].children.as_slice() {
                [only] => *only,
                children => {
                    return Err(violation(format!(
                        "odd node {} has {} children",
                        odd.0,
                        children.len()
                    )))
                }
            };
            let edge = self.nodes[even.0]
                .parent_edge
                .ok_or_else(|| violation(format!("node {} lost its parent edge", even.0)))?;
            stack.extend(self.nodes[even.0].children.iter().copied());
            self.push_pair(odd, even, edge)?;
        }
        Ok(())
    }
}
