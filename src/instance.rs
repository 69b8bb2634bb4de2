use crate::blossom::{BlossomNode, NodeId, NodeKind};
use crate::edge::{Edge, EdgeClass, EdgeId};
use crate::error::{violation, MatchingError};
use crate::pair::MatchedPair;
use crate::solution::Weight;
use crate::tree::AlternatingTree;
use tracing::trace;

/// Where an outer node currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Standing {
    /// inner node, released slot, or an outer node lost by a transition
    Unplaced,
    /// member of the tree rooted at `root`
    Tree { root: NodeId, depth: usize },
    /// member of `pairs[pair]`
    Paired { pair: usize },
}

impl Standing {
    #[inline]
    pub(crate) fn is_even(self) -> bool {
        matches!(self, Standing::Tree { depth, .. } if depth % 2 == 0)
    }

    #[inline]
    pub(crate) fn is_odd(self) -> bool {
        matches!(self, Standing::Tree { depth, .. } if depth % 2 == 1)
    }

    #[inline]
    pub(crate) fn root(self) -> Option<NodeId> {
        match self {
            Standing::Tree { root, .. } => Some(root),
            _ => None,
        }
    }
}

/// Snapshot of the standing of every node, taken once per driver step
#[derive(Debug, Clone)]
pub(crate) struct Survey {
    standing: Vec<Standing>,
}

impl Survey {
    #[inline]
    pub(crate) fn of(&self, node: NodeId) -> Standing {
        self.standing[node.0]
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeId, Standing)> + '_ {
        self.standing
            .iter()
            .enumerate()
            .map(|(index, standing)| (NodeId(index), *standing))
    }
}

/// Complete mutable state of one matching run.
///
/// Leaves occupy the first `num_vertices` slots of `nodes` so a vertex index
/// is also its leaf id. Contractions are appended or reuse released slots.
#[derive(Debug, Clone)]
pub(crate) struct Instance<W: Weight> {
    pub(crate) num_vertices: usize,
    pub(crate) nodes: Vec<BlossomNode<W>>,
    released: Vec<NodeId>,
    pub(crate) edges: Vec<Edge<W>>,
    /// incident edges of every leaf
    pub(crate) incident: Vec<Vec<EdgeId>>,
    pub(crate) trees: Vec<AlternatingTree>,
    pub(crate) pairs: Vec<MatchedPair>,
}

impl<W: Weight> Instance<W> {
    /// Builds one trivial tree per vertex and one slack edge per
    /// `(i, j, weight, capacity)` record
    pub(crate) fn new<E>(num_vertices: usize, edges: E) -> Self
    where
        E: IntoIterator<Item = (usize, usize, W, W)>,
    {
        let nodes = (0..num_vertices).map(BlossomNode::leaf).collect();
        let trees = (0..num_vertices)
            .map(|vertex| AlternatingTree::new(NodeId(vertex)))
            .collect();
        let mut instance = Self {
            num_vertices,
            nodes,
            released: Vec::new(),
            edges: Vec::new(),
            incident: vec![Vec::new(); num_vertices],
            trees,
            pairs: Vec::new(),
        };
        for (i, j, weight, capacity) in edges {
            let id = EdgeId(instance.edges.len());
            instance
                .edges
                .push(Edge::new(NodeId(i), NodeId(j), weight, capacity));
            instance.incident[i].push(id);
            instance.incident[j].push(id);
        }
        instance
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &BlossomNode<W> {
        &self.nodes[id.0]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut BlossomNode<W> {
        &mut self.nodes[id.0]
    }

    #[inline]
    pub(crate) fn edge(&self, id: EdgeId) -> &Edge<W> {
        &self.edges[id.0]
    }

    pub(crate) fn set_class(&mut self, id: EdgeId, class: EdgeClass) {
        trace!("edge {} {:?} -> {:?}", id.0, self.edges[id.0].class, class);
        self.edges[id.0].class = class;
    }

    /// Creates a contraction over `cycle`, recycling a released slot if any
    pub(crate) fn contract(&mut self, cycle: Vec<NodeId>, cycle_edges: Vec<EdgeId>) -> NodeId {
        let members = cycle.clone();
        let blossom = BlossomNode::contraction(cycle, cycle_edges);
        let id = match self.released.pop() {
            Some(id) => {
                self.nodes[id.0] = blossom;
                id
            }
            None => {
                self.nodes.push(blossom);
                NodeId(self.nodes.len() - 1)
            }
        };
        for member in members {
            let node = &mut self.nodes[member.0];
            node.detach();
            node.container = Some(id);
        }
        id
    }

    /// Unpacks a contraction and releases its slot; returns its former cycle
    /// and cycle edges
    pub(crate) fn release(&mut self, id: NodeId) -> Result<(Vec<NodeId>, Vec<EdgeId>), MatchingError> {
        let kind = std::mem::replace(
            &mut self.nodes[id.0].kind,
            NodeKind::Contraction {
                cycle: Vec::new(),
                cycle_edges: Vec::new(),
            },
        );
        match kind {
            NodeKind::Contraction { cycle, cycle_edges } => {
                for member in cycle.iter() {
                    self.nodes[member.0].container = None;
                }
                let node = &mut self.nodes[id.0];
                node.detach();
                node.dual = W::zero();
                self.released.push(id);
                Ok((cycle, cycle_edges))
            }
            NodeKind::Leaf { vertex } => {
                self.nodes[id.0].kind = NodeKind::Leaf { vertex };
                Err(violation(format!("cannot release leaf {}", vertex)))
            }
        }
    }

    /// Dual sum over the nodes containing exactly one endpoint of `id`
    pub(crate) fn charge(&self, id: EdgeId) -> W {
        let edge = &self.edges[id.0];
        if self.outer(edge.u) != self.outer(edge.v) {
            return self.total_dual(edge.u) + self.total_dual(edge.v);
        }
        let chain_u = self.nesting_chain(edge.u);
        let chain_v = self.nesting_chain(edge.v);
        let crossing = |chain: &[NodeId], other: &[NodeId]| {
            chain
                .iter()
                .filter(|node| !other.contains(node))
                .fold(W::zero(), |acc, node| acc + self.nodes[node.0].dual)
        };
        crossing(&chain_u, &chain_v) + crossing(&chain_v, &chain_u)
    }

    #[inline]
    pub(crate) fn slack(&self, id: EdgeId) -> W {
        self.edges[id.0].capacity - self.charge(id)
    }

    /// Outer nodes of both endpoints of `id`
    #[inline]
    pub(crate) fn outer_endpoints(&self, id: EdgeId) -> (NodeId, NodeId) {
        let edge = &self.edges[id.0];
        (self.outer(edge.u), self.outer(edge.v))
    }

    /// Records the standing of every outer node that belongs to a tree or a pair
    pub(crate) fn survey(&self) -> Survey {
        let mut standing = vec![Standing::Unplaced; self.nodes.len()];
        for tree in self.trees.iter() {
            let mut stack = vec![(tree.root, 0)];
            while let Some((node, depth)) = stack.pop() {
                standing[node.0] = Standing::Tree {
                    root: tree.root,
                    depth,
                };
                stack.extend(
                    self.nodes[node.0]
                        .children
                        .iter()
                        .map(|child| (*child, depth + 1)),
                );
            }
        }
        for (index, pair) in self.pairs.iter().enumerate() {
            standing[pair.a.0] = Standing::Paired { pair: index };
            standing[pair.b.0] = Standing::Paired { pair: index };
        }
        Survey { standing }
    }

    /// Index of the live tree rooted at `root`
    pub(crate) fn tree_index(&self, root: NodeId) -> Result<usize, MatchingError> {
        self.trees
            .iter()
            .position(|tree| tree.root == root)
            .ok_or_else(|| violation(format!("node {} is not a tree root", root.0)))
    }

    pub(crate) fn remove_tree(&mut self, root: NodeId) -> Result<(), MatchingError> {
        let index = self.tree_index(root)?;
        self.trees.swap_remove(index);
        Ok(())
    }

    /// Binds two detached outer nodes with a matching edge
    pub(crate) fn push_pair(&mut self, a: NodeId, b: NodeId, edge: EdgeId) -> Result<(), MatchingError> {
        if self.edges[edge.0].class != EdgeClass::Matching {
            return Err(violation(format!(
                "pair ({}, {}) bound by non-matching edge {}",
                a.0, b.0, edge.0
            )));
        }
        self.nodes[a.0].detach();
        self.nodes[b.0].detach();
        self.pairs.push(MatchedPair::new(a, b, edge));
        Ok(())
    }

    /// Matching-class edges, each with both endpoint vertices
    pub(crate) fn matching(&self) -> impl Iterator<Item = (usize, usize, W)> + '_ {
        self.edges
            .iter()
            .filter(|edge| edge.class == EdgeClass::Matching)
            .map(|edge| (edge.u.0, edge.v.0, edge.weight))
    }

    /// Checks partition, parity and dual feasibility
    pub(crate) fn check_invariants(&self) -> Result<(), MatchingError> {
        let mut matched = vec![false; self.num_vertices];
        for (index, edge) in self.edges.iter().enumerate() {
            if self.slack(EdgeId(index)) < W::zero() {
                return Err(violation(format!("edge {} is overcharged", index)));
            }
            if edge.class == EdgeClass::Matching {
                for leaf in edge.endpoints().iter() {
                    if std::mem::replace(&mut matched[leaf.0], true) {
                        return Err(violation(format!(
                            "vertex {} touches two matching edges",
                            leaf.0
                        )));
                    }
                }
            }
        }
        let survey = self.survey();
        for (id, standing) in survey.iter() {
            if self.released.contains(&id) {
                continue;
            }
            if let Some((cycle, _)) = self.cycle_of(id) {
                if cycle.len() % 2 == 0 {
                    return Err(violation(format!("contraction {} has even cycle", id.0)));
                }
            }
            if let (Standing::Tree { depth, .. }, Some(parent)) = (standing, self.nodes[id.0].parent) {
                match survey.of(parent) {
                    Standing::Tree { depth: parent_depth, .. } if parent_depth + 1 == depth => {}
                    _ => {
                        return Err(violation(format!(
                            "node {} is not one level below its parent",
                            id.0
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    /// Checks a finished run: perfect matching, tight matching edges,
    /// non-negative contraction duals and equal primal and dual objectives
    pub(crate) fn check_optimality(&self) -> Result<(), MatchingError> {
        self.check_invariants()?;
        if !self.trees.is_empty() {
            return Err(violation(format!("{} trees left", self.trees.len())));
        }
        let mut primal = W::zero();
        let mut matched = 0;
        for (index, edge) in self.edges.iter().enumerate() {
            if edge.class != EdgeClass::Matching {
                continue;
            }
            if self.slack(EdgeId(index)) != W::zero() {
                return Err(violation(format!("matching edge {} is not tight", index)));
            }
            primal += edge.capacity;
            matched += 2;
        }
        if matched != self.num_vertices {
            return Err(violation(format!(
                "{} of {} vertices matched",
                matched, self.num_vertices
            )));
        }

        let mut dual = W::zero();
        for node in self.nodes.iter() {
            if !node.is_leaf() && node.dual < W::zero() {
                return Err(violation("negative contraction dual"));
            }
            dual += node.dual;
        }
        if primal != dual {
            return Err(violation(format!(
                "primal objective {} differs from dual objective {}",
                primal, dual
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
impl<W: Weight> Instance<W> {
    /// Instance whose weights equal the given capacities
    pub(crate) fn from_capacities(num_vertices: usize, edges: &[(usize, usize, W)]) -> Self {
        Self::new(
            num_vertices,
            edges.iter().map(|&(i, j, capacity)| (i, j, capacity, capacity)),
        )
    }

    pub(crate) fn edge_between(&self, i: usize, j: usize) -> EdgeId {
        let position = self
            .edges
            .iter()
            .position(|edge| {
                (edge.u.0, edge.v.0) == (i, j) || (edge.u.0, edge.v.0) == (j, i)
            })
            .expect("edge should exist");
        EdgeId(position)
    }

    /// Contracts the leaves `vertices` in this order, first edge a tree edge
    pub(crate) fn contract_cycle(&mut self, vertices: &[usize]) -> NodeId {
        let len = vertices.len();
        let cycle_edges: Vec<_> = (0..len)
            .map(|j| self.edge_between(vertices[j], vertices[(j + 1) % len]))
            .collect();
        for (j, edge) in cycle_edges.iter().enumerate() {
            self.edges[edge.0].class = if j % 2 == 0 {
                EdgeClass::Tree
            } else {
                EdgeClass::Matching
            };
        }
        let cycle = vertices.iter().map(|&vertex| NodeId(vertex)).collect();
        self.contract(cycle, cycle_edges)
    }
}
