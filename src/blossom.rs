use crate::edge::EdgeId;
use crate::error::{violation, MatchingError};
use crate::instance::Instance;
use crate::solution::Weight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// original vertex of the graph
    Leaf { vertex: usize },
    /// contracted odd cycle; `cycle[0]` holds the stem and `cycle_edges[j]`
    /// joins `cycle[j]` with `cycle[j + 1]` (wrapping around)
    Contraction {
        cycle: Vec<NodeId>,
        cycle_edges: Vec<EdgeId>,
    },
}

/// Leaf or contraction together with its position in a tree.
///
/// Tree links are only set on outer nodes, that is nodes without a container.
#[derive(Debug, Clone)]
pub struct BlossomNode<W: Weight> {
    pub(crate) dual: W,
    pub(crate) parent: Option<NodeId>,
    pub(crate) parent_edge: Option<EdgeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) container: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

impl<W: Weight> BlossomNode<W> {
    pub(crate) fn leaf(vertex: usize) -> Self {
        Self {
            dual: W::zero(),
            parent: None,
            parent_edge: None,
            children: Vec::new(),
            container: None,
            kind: NodeKind::Leaf { vertex },
        }
    }

    pub(crate) fn contraction(cycle: Vec<NodeId>, cycle_edges: Vec<EdgeId>) -> Self {
        debug_assert!(cycle.len() % 2 == 1 && cycle.len() == cycle_edges.len());
        Self {
            dual: W::zero(),
            parent: None,
            parent_edge: None,
            children: Vec::new(),
            container: None,
            kind: NodeKind::Contraction { cycle, cycle_edges },
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Drops tree links, keeps dual and nesting
    pub(crate) fn detach(&mut self) {
        self.parent = None;
        self.parent_edge = None;
        self.children.clear();
    }
}

impl<W: Weight> Instance<W> {
    /// Outermost container of `node`, or the node itself
    pub(crate) fn outer(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(container) = self.nodes[current.0].container {
            current = container;
        }
        current
    }

    /// Dual of the node plus the duals of every container around it
    pub(crate) fn total_dual(&self, node: NodeId) -> W {
        let mut total = W::zero();
        let mut current = Some(node);
        while let Some(id) = current {
            total += self.nodes[id.0].dual;
            current = self.nodes[id.0].container;
        }
        total
    }

    /// `node` followed by its containers, innermost first
    pub(crate) fn nesting_chain(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = vec![node];
        let mut current = node;
        while let Some(container) = self.nodes[current.0].container {
            chain.push(container);
            current = container;
        }
        chain
    }

    /// Returns true if `leaf` is `node` or is contracted somewhere inside it
    pub(crate) fn is_within(&self, leaf: NodeId, node: NodeId) -> bool {
        let mut current = Some(leaf);
        while let Some(id) = current {
            if id == node {
                return true;
            }
            current = self.nodes[id.0].container;
        }
        false
    }

    /// Leaf that anchors `node`: the node itself for a leaf, the stem of
    /// the first cycle child for a contraction
    pub(crate) fn stem(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let NodeKind::Contraction { cycle, .. } = &self.nodes[current.0].kind {
            current = cycle[0];
        }
        current
    }

    /// All leaves of `node` in cycle order
    pub(crate) fn leaves(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            match &self.nodes[id.0].kind {
                NodeKind::Leaf { .. } => result.push(id),
                NodeKind::Contraction { cycle, .. } => stack.extend(cycle.iter().rev()),
            }
        }
        result
    }

    /// Endpoint of `edge` lying inside `node`
    pub(crate) fn endpoint_in(&self, edge: EdgeId, node: NodeId) -> Result<NodeId, MatchingError> {
        let [u, v] = self.edges[edge.0].endpoints();
        if self.is_within(u, node) {
            Ok(u)
        } else if self.is_within(v, node) {
            Ok(v)
        } else {
            Err(violation(format!(
                "edge {} does not touch node {}",
                edge.0, node.0
            )))
        }
    }

    /// Index of the cycle child of `node` that holds `leaf`
    pub(crate) fn child_holding(&self, node: NodeId, leaf: NodeId) -> Result<usize, MatchingError> {
        match &self.nodes[node.0].kind {
            NodeKind::Contraction { cycle, .. } => cycle
                .iter()
                .position(|child| self.is_within(leaf, *child))
                .ok_or_else(|| {
                    violation(format!("leaf {} is not inside node {}", leaf.0, node.0))
                }),
            NodeKind::Leaf { .. } => Err(violation(format!("node {} is a leaf", node.0))),
        }
    }

    pub(crate) fn cycle_of(&self, node: NodeId) -> Option<(&[NodeId], &[EdgeId])> {
        match &self.nodes[node.0].kind {
            NodeKind::Contraction { cycle, cycle_edges } => {
                Some((cycle.as_slice(), cycle_edges.as_slice()))
            }
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Moves the stem of `node` to `leaf` after the matching inside it changed.
    ///
    /// The cycle is rotated so the child holding `leaf` comes first, then every
    /// child is re-stemmed at the endpoint of its cycle matching edge.
    pub(crate) fn restem(&mut self, node: NodeId, leaf: NodeId) -> Result<(), MatchingError> {
        if self.stem(node) == leaf {
            return Ok(());
        }
        let shift = self.child_holding(node, leaf)?;
        let (cycle, cycle_edges) = match &mut self.nodes[node.0].kind {
            NodeKind::Contraction { cycle, cycle_edges } => {
                cycle.rotate_left(shift);
                cycle_edges.rotate_left(shift);
                (cycle.clone(), cycle_edges.clone())
            }
            NodeKind::Leaf { .. } => return Ok(()),
        };

        self.restem(cycle[0], leaf)?;
        for j in 1..cycle.len() {
            let matching_edge = if j % 2 == 1 {
                cycle_edges[j]
            } else {
                cycle_edges[j - 1]
            };
            let child_stem = self.endpoint_in(matching_edge, cycle[j])?;
            self.restem(cycle[j], child_stem)?;
        }
        Ok(())
    }
}
