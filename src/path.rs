use crate::blossom::NodeId;
use crate::edge::{EdgeClass, EdgeId};
use crate::error::{violation, MatchingError};
use crate::instance::Instance;
use crate::solution::Weight;
use std::iter;

/// Alternating path between two tree roots at the level of outer nodes.
///
/// `hops[k]` joins `nodes[k]` with `nodes[k + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OuterPath {
    pub(crate) nodes: Vec<NodeId>,
    pub(crate) hops: Vec<EdgeId>,
}

impl<W: Weight> Instance<W> {
    /// Edges of class `class` leaving `node` towards other outer nodes, each
    /// with the outer node it reaches
    fn leaving_edges(&self, node: NodeId, class: EdgeClass) -> Vec<(EdgeId, NodeId)> {
        let mut result = Vec::new();
        for leaf in self.leaves(node) {
            for &edge in self.incident[leaf.0].iter() {
                if self.edge(edge).class != class {
                    continue;
                }
                let next = self.outer(self.edge(edge).other(leaf));
                if next != node {
                    result.push((edge, next));
                }
            }
        }
        result
    }

    /// Depth-first search for an alternating path from root `from` to root
    /// `to`, starting and ending with a tree edge and staying inside the
    /// trees of `roots`
    pub(crate) fn find_alternating_path(
        &self,
        from: NodeId,
        to: NodeId,
        roots: &[NodeId],
    ) -> Result<OuterPath, MatchingError> {
        let mut path = OuterPath {
            nodes: vec![from],
            hops: Vec::new(),
        };
        if self.extend_path(to, true, roots, &mut path) {
            Ok(path)
        } else {
            Err(MatchingError::SearchExhausted {
                from: self.stem(from).0,
                to: self.stem(to).0,
            })
        }
    }

    fn extend_path(&self, target: NodeId, use_tree_edge: bool, roots: &[NodeId], path: &mut OuterPath) -> bool {
        let current = match path.nodes.last() {
            Some(&node) => node,
            None => return false,
        };
        if current == target {
            // arrived through a tree edge
            return !use_tree_edge;
        }
        let class = if use_tree_edge {
            EdgeClass::Tree
        } else {
            EdgeClass::Matching
        };
        let candidates = self.leaving_edges(current, class);
        if !use_tree_edge && candidates.len() > 1 {
            return false;
        }
        for (edge, next) in candidates {
            if path.nodes.contains(&next) || !roots.contains(&self.tree_root(next)) {
                continue;
            }
            path.nodes.push(next);
            path.hops.push(edge);
            if self.extend_path(target, !use_tree_edge, roots, path) {
                return true;
            }
            path.nodes.pop();
            path.hops.pop();
        }
        false
    }

    /// Alternating walk inside `node` from its stem to `leaf`.
    ///
    /// Goes the even way round the cycle so that it starts with a tree edge
    /// and ends with a matching edge; empty when `leaf` is the stem.
    pub(crate) fn blossom_walk(&self, node: NodeId, leaf: NodeId) -> Result<Vec<EdgeId>, MatchingError> {
        let (cycle, cycle_edges) = match self.cycle_of(node) {
            Some(cycle) => cycle,
            None if node == leaf => return Ok(Vec::new()),
            None => {
                return Err(violation(format!(
                    "leaf {} is not inside leaf {}",
                    leaf.0, node.0
                )))
            }
        };
        let target = self.child_holding(node, leaf)?;
        let len = cycle.len();
        // (child, edge leaving it) in walking order
        let route: Vec<(usize, EdgeId)> = if target % 2 == 0 {
            (0..target).map(|j| (j, cycle_edges[j])).collect()
        } else {
            iter::once((0, cycle_edges[len - 1]))
                .chain((target + 1..len).rev().map(|j| (j, cycle_edges[j - 1])))
                .collect()
        };

        let mut walk = Vec::new();
        let mut entry = self.stem(node);
        for (j, edge) in route {
            let exit = self.endpoint_in(edge, cycle[j])?;
            walk.extend(self.stem_segment(cycle[j], entry, exit)?);
            walk.push(edge);
            entry = self.edge(edge).other(exit);
        }
        walk.extend(self.stem_segment(cycle[target], entry, leaf)?);
        Ok(walk)
    }

    /// Walk through `node` between two leaves one of which is its stem
    fn stem_segment(&self, node: NodeId, entry: NodeId, exit: NodeId) -> Result<Vec<EdgeId>, MatchingError> {
        let stem = self.stem(node);
        if entry == stem {
            self.blossom_walk(node, exit)
        } else if exit == stem {
            let mut walk = self.blossom_walk(node, entry)?;
            walk.reverse();
            Ok(walk)
        } else {
            Err(violation(format!(
                "walk through node {} avoids its stem {}",
                node.0, stem.0
            )))
        }
    }

    /// Expands an outer path into the leaf-level edge path from the stem of
    /// the first root to the stem of the last one
    pub(crate) fn expand_path(&self, path: &OuterPath) -> Result<Vec<EdgeId>, MatchingError> {
        let last = path.nodes.len() - 1;
        let mut edges = Vec::new();
        let mut entry = self.stem(path.nodes[0]);
        for (k, &node) in path.nodes.iter().enumerate() {
            let exit = if k < last {
                self.endpoint_in(path.hops[k], node)?
            } else {
                self.stem(node)
            };
            edges.extend(self.stem_segment(node, entry, exit)?);
            if k < last {
                edges.push(path.hops[k]);
                entry = self.edge(path.hops[k]).other(exit);
            }
        }

        for (k, &edge) in edges.iter().enumerate() {
            let expected = if k % 2 == 0 {
                EdgeClass::Tree
            } else {
                EdgeClass::Matching
            };
            if self.edge(edge).class != expected {
                return Err(violation(format!(
                    "edge {} at position {} of augmenting path is {:?}",
                    edge.0,
                    k,
                    self.edge(edge).class
                )));
            }
        }
        if edges.len() % 2 == 0 {
            return Err(violation("augmenting path of even length"));
        }
        Ok(edges)
    }
}
