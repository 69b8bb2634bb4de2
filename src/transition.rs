use crate::blossom::NodeId;
use crate::edge::{EdgeClass, EdgeId};
use crate::error::{violation, MatchingError};
use crate::instance::{Instance, Standing, Survey};
use crate::solution::Weight;
use std::iter;
use tracing::trace;

/// Structural change fired once epsilon reaches zero.
///
/// Variants are declared in priority order, so the minimum over all
/// candidates is the one to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Transition {
    /// odd contraction whose dual dropped to zero
    Dissolve(NodeId),
    /// tight edge from even tree node `node` to `pairs[pair]`
    Graft {
        edge: EdgeId,
        node: NodeId,
        pair: usize,
    },
    /// tight edge between two even nodes of one tree
    Form(EdgeId),
    /// tight edge between even nodes of two trees
    Augment(EdgeId),
}

/// Number of transitions of each kind fired during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionCounts {
    pub dissolutions: u32,
    pub grafts: u32,
    pub formations: u32,
    pub augmentations: u32,
}

impl TransitionCounts {
    pub(crate) fn record(&mut self, transition: &Transition) {
        match transition {
            Transition::Dissolve(_) => self.dissolutions += 1,
            Transition::Graft { .. } => self.grafts += 1,
            Transition::Form(_) => self.formations += 1,
            Transition::Augment(_) => self.augmentations += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.dissolutions + self.grafts + self.formations + self.augmentations
    }
}

#[inline]
fn prefer(best: &mut Option<Transition>, candidate: Transition) {
    match best {
        Some(current) if *current <= candidate => {}
        _ => *best = Some(candidate),
    }
}

impl<W: Weight> Instance<W> {
    /// Highest priority transition enabled in the surveyed state
    pub(crate) fn find_transition(&self, survey: &Survey) -> Option<Transition> {
        let mut best = None;
        for (id, standing) in survey.iter() {
            let node = self.node(id);
            if standing.is_odd() && !node.is_leaf() && node.dual == W::zero() {
                return Some(Transition::Dissolve(id));
            }
        }

        for index in 0..self.edges.len() {
            let edge = EdgeId(index);
            if self.edge(edge).class != EdgeClass::Slack || self.slack(edge) != W::zero() {
                continue;
            }
            let (a, b) = self.outer_endpoints(edge);
            if a == b {
                continue;
            }
            let candidate = match (survey.of(a), survey.of(b)) {
                (x, Standing::Paired { pair }) if x.is_even() => Transition::Graft {
                    edge,
                    node: a,
                    pair,
                },
                (Standing::Paired { pair }, y) if y.is_even() => Transition::Graft {
                    edge,
                    node: b,
                    pair,
                },
                (x, y) if x.is_even() && y.is_even() => {
                    if x.root() == y.root() {
                        Transition::Form(edge)
                    } else {
                        Transition::Augment(edge)
                    }
                }
                _ => continue,
            };
            prefer(&mut best, candidate);
        }
        best
    }

    pub(crate) fn fire(&mut self, transition: Transition) -> Result<(), MatchingError> {
        trace!("fire {:?}", transition);
        match transition {
            Transition::Dissolve(node) => self.dissolve(node),
            Transition::Graft { edge, node, pair } => self.graft(edge, node, pair),
            Transition::Form(edge) => self.form_blossom(edge),
            Transition::Augment(edge) => self.augment(edge),
        }
    }

    /// Replaces an odd contraction by the even-length side of its cycle and
    /// pairs up the remaining children
    pub(crate) fn dissolve(&mut self, blossom: NodeId) -> Result<(), MatchingError> {
        let node = self.node(blossom);
        let (parent, parent_edge) = match (node.parent, node.parent_edge) {
            (Some(parent), Some(edge)) => (parent, edge),
            _ => return Err(violation(format!("dissolved node {} is a root", blossom.0))),
        };
        let child = match node.children.as_slice() {
            [only] => *only,
            children => {
                return Err(violation(format!(
                    "dissolved node {} has {} children",
                    blossom.0,
                    children.len()
                )))
            }
        };
        let child_edge = self
            .node(child)
            .parent_edge
            .ok_or_else(|| violation(format!("node {} lost its parent edge", child.0)))?;
        let entry = self.endpoint_in(parent_edge, blossom)?;
        let t = self.child_holding(blossom, entry)?;
        let (cycle, cycle_edges) = self.release(blossom)?;
        let len = cycle.len();

        // path from the child touching the parent edge down to cycle[0]
        let (path, links, pairs, loose): (Vec<usize>, Vec<EdgeId>, Vec<usize>, Vec<usize>) =
            if t % 2 == 0 {
                (
                    (0..=t).rev().collect(),
                    (0..t).rev().map(|j| cycle_edges[j]).collect(),
                    (t + 1..len).step_by(2).collect(),
                    (t..len).step_by(2).collect(),
                )
            } else {
                (
                    (t..len).chain(iter::once(0)).collect(),
                    (t..len).map(|j| cycle_edges[j]).collect(),
                    (1..t).step_by(2).collect(),
                    (0..t).step_by(2).collect(),
                )
            };
        trace!(
            "dissolve {} entered at child {}: path {:?}, pairs at {:?}",
            blossom.0,
            t,
            path,
            pairs
        );

        let top = cycle[path[0]];
        self.replace_child(parent, blossom, top)?;
        {
            let node = self.node_mut(top);
            node.parent = Some(parent);
            node.parent_edge = Some(parent_edge);
        }
        for (k, link) in links.into_iter().enumerate() {
            self.attach(cycle[path[k]], cycle[path[k + 1]], link);
        }
        self.attach(cycle[0], child, child_edge);

        for j in pairs {
            self.push_pair(cycle[j], cycle[j + 1], cycle_edges[j])?;
        }
        for j in loose {
            self.set_class(cycle_edges[j], EdgeClass::Slack);
        }
        Ok(())
    }

    /// Hangs `pairs[pair_index]` below even node `node` through `edge`
    pub(crate) fn graft(&mut self, edge: EdgeId, node: NodeId, pair_index: usize) -> Result<(), MatchingError> {
        if pair_index >= self.pairs.len() {
            return Err(violation(format!("no pair with index {}", pair_index)));
        }
        let pair = self.pairs.swap_remove(pair_index);
        let (a, b) = self.outer_endpoints(edge);
        let touching = if a == node { b } else { a };
        let (near, far) = pair.starting_from(touching).ok_or_else(|| {
            violation(format!(
                "edge {} does not reach the pair of {} and {}",
                edge.0, pair.a.0, pair.b.0
            ))
        })?;
        self.set_class(edge, EdgeClass::Tree);
        self.attach(node, near, edge);
        // pair edge keeps its matching class
        self.attach(near, far, pair.edge);
        Ok(())
    }

    /// Contracts the odd cycle closed by `edge` into a new outer node
    pub(crate) fn form_blossom(&mut self, edge: EdgeId) -> Result<(), MatchingError> {
        let (k, h) = self.outer_endpoints(edge);
        if self.depth(k) % 2 != 0 || self.depth(h) % 2 != 0 {
            return Err(violation(format!(
                "edge {} closes a cycle through an odd node",
                edge.0
            )));
        }
        let top = self.lowest_common_ancestor(k, h)?;
        let towards_h = self.path_below(h, top)?;
        let towards_k = self.path_below(k, top)?;

        let mut cycle = vec![top];
        let mut cycle_edges = Vec::with_capacity(towards_h.len() + towards_k.len() + 1);
        for &node in towards_h.iter().rev() {
            cycle.push(node);
            cycle_edges.push(self.parent_edge_of(node)?);
        }
        cycle_edges.push(edge);
        for &node in towards_k.iter() {
            cycle.push(node);
            cycle_edges.push(self.parent_edge_of(node)?);
        }

        let adopted: Vec<NodeId> = cycle
            .iter()
            .flat_map(|member| self.node(*member).children.iter().copied())
            .filter(|child| !cycle.contains(child))
            .collect();
        let (parent, parent_edge) = (self.node(top).parent, self.node(top).parent_edge);
        let root_index = match parent {
            None => Some(self.tree_index(top)?),
            Some(_) => None,
        };
        trace!(
            "form blossom over {:?}",
            cycle.iter().map(|node| node.0).collect::<Vec<_>>()
        );

        let blossom = self.contract(cycle, cycle_edges);
        self.set_class(edge, EdgeClass::Tree);
        match (parent, root_index) {
            (Some(parent), _) => {
                self.replace_child(parent, top, blossom)?;
                let node = self.node_mut(blossom);
                node.parent = Some(parent);
                node.parent_edge = parent_edge;
            }
            (None, Some(index)) => self.trees[index].root = blossom,
            (None, None) => {}
        }
        for child in adopted {
            self.node_mut(blossom).children.push(child);
            self.node_mut(child).parent = Some(blossom);
        }
        Ok(())
    }

    /// Flips the alternating path through `edge` between two tree roots and
    /// breaks both trees into matched pairs
    pub(crate) fn augment(&mut self, edge: EdgeId) -> Result<(), MatchingError> {
        let (a, b) = self.outer_endpoints(edge);
        if self.is_bare(a) && self.is_bare(b) {
            trace!("augment single vertices {} and {}", a.0, b.0);
            self.set_class(edge, EdgeClass::Matching);
            self.remove_tree(a)?;
            self.remove_tree(b)?;
            return self.push_pair(a, b, edge);
        }

        let roots = [self.tree_root(a), self.tree_root(b)];
        if roots[0] == roots[1] {
            return Err(violation(format!(
                "augmenting edge {} stays inside one tree",
                edge.0
            )));
        }
        self.set_class(edge, EdgeClass::Tree);
        let path = self.find_alternating_path(roots[0], roots[1], &roots)?;
        let flipped = self.expand_path(&path)?;
        trace!(
            "augment through {:?} along {} edges",
            path.nodes.iter().map(|node| node.0).collect::<Vec<_>>(),
            flipped.len()
        );

        let off_path: Vec<NodeId> = path
            .nodes
            .iter()
            .flat_map(|node| self.node(*node).children.iter().copied())
            .filter(|child| !path.nodes.contains(child))
            .collect();

        for &id in flipped.iter() {
            let class = match self.edge(id).class {
                EdgeClass::Tree => EdgeClass::Matching,
                EdgeClass::Matching => EdgeClass::Tree,
                EdgeClass::Slack => return Err(violation(format!("slack edge {} on path", id.0))),
            };
            self.set_class(id, class);
        }
        // hops between consecutive pairs leave the structure
        for &hop in path.hops.iter().skip(1).step_by(2) {
            self.set_class(hop, EdgeClass::Slack);
        }
        for (k, &node) in path.nodes.iter().enumerate() {
            let matched = path.hops[k - k % 2];
            let stem = self.endpoint_in(matched, node)?;
            self.restem(node, stem)?;
        }

        for top in off_path {
            self.decompose_subtree(top)?;
        }
        self.remove_tree(roots[0])?;
        self.remove_tree(roots[1])?;
        for (k, &hop) in path.hops.iter().enumerate().step_by(2) {
            self.push_pair(path.nodes[k], path.nodes[k + 1], hop)?;
        }
        Ok(())
    }

    /// Single leaf forming a tree on its own
    fn is_bare(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.is_leaf() && node.parent.is_none() && node.children.is_empty() && node.container.is_none()
    }

    fn parent_edge_of(&self, id: NodeId) -> Result<EdgeId, MatchingError> {
        self.node(id)
            .parent_edge
            .ok_or_else(|| violation(format!("node {} has no parent edge", id.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::{Transition, TransitionCounts};
    use crate::blossom::{NodeId, NodeKind};
    use crate::edge::EdgeClass;
    use crate::instance::Instance;
    use crate::tree::AlternatingTree;
    use rand::distributions::{Distribution, Uniform};
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn class_of(instance: &Instance<i64>, i: usize, j: usize) -> EdgeClass {
        instance.edges[instance.edge_between(i, j).0].class
    }

    #[test]
    fn test_priority_order() {
        let dissolve = Transition::Dissolve(NodeId(9));
        let graft = Transition::Graft {
            edge: crate::edge::EdgeId(0),
            node: NodeId(0),
            pair: 0,
        };
        let form = Transition::Form(crate::edge::EdgeId(0));
        let augment = Transition::Augment(crate::edge::EdgeId(0));
        assert!(dissolve < graft && graft < form && form < augment);
    }

    #[test]
    fn test_base_augmentation() {
        let mut instance = Instance::from_capacities(2, &[(0, 1, 0_i64)]);
        let survey = instance.survey();
        let transition = instance.find_transition(&survey).unwrap();
        assert_eq!(transition, Transition::Augment(instance.edge_between(0, 1)));
        instance.fire(transition).unwrap();
        assert!(instance.trees.is_empty());
        assert_eq!(instance.pairs.len(), 1);
        assert_eq!(class_of(&instance, 0, 1), EdgeClass::Matching);
    }

    #[test]
    fn test_graft_keeps_pair_edge_matched() {
        let mut instance = Instance::from_capacities(3, &[(0, 1, 0_i64), (1, 2, 0)]);
        let matched = instance.edge_between(1, 2);
        instance.edges[matched.0].class = EdgeClass::Matching;
        instance.trees.retain(|tree| tree.root == NodeId(0));
        instance.push_pair(NodeId(2), NodeId(1), matched).unwrap();

        let survey = instance.survey();
        let transition = instance.find_transition(&survey).unwrap();
        assert_eq!(
            transition,
            Transition::Graft {
                edge: instance.edge_between(0, 1),
                node: NodeId(0),
                pair: 0
            }
        );
        instance.fire(transition).unwrap();
        assert!(instance.pairs.is_empty());
        assert_eq!(instance.nodes[1].parent, Some(NodeId(0)));
        assert_eq!(instance.nodes[2].parent, Some(NodeId(1)));
        assert_eq!(class_of(&instance, 0, 1), EdgeClass::Tree);
        assert_eq!(class_of(&instance, 1, 2), EdgeClass::Matching);
        assert_eq!(instance.depth(NodeId(2)), 2);
    }

    #[test]
    fn test_form_blossom_at_root() {
        // 0 - 1 = 2 closed by (0, 2)
        let mut instance = Instance::from_capacities(3, &[(0, 1, 0_i64), (1, 2, 0), (0, 2, 0)]);
        let (down, matched) = (instance.edge_between(0, 1), instance.edge_between(1, 2));
        instance.edges[down.0].class = EdgeClass::Tree;
        instance.edges[matched.0].class = EdgeClass::Matching;
        instance.attach(NodeId(0), NodeId(1), down);
        instance.attach(NodeId(1), NodeId(2), matched);
        instance.trees.retain(|tree| tree.root == NodeId(0));

        let survey = instance.survey();
        let transition = instance.find_transition(&survey).unwrap();
        assert_eq!(transition, Transition::Form(instance.edge_between(0, 2)));
        instance.fire(transition).unwrap();

        let blossom = instance.trees[0].root;
        assert_eq!(instance.outer(NodeId(1)), blossom);
        assert_eq!(instance.stem(blossom), NodeId(0));
        let (cycle, _) = instance.cycle_of(blossom).unwrap();
        assert_eq!(cycle, &[NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(class_of(&instance, 0, 2), EdgeClass::Tree);
        assert!(instance.nodes[blossom.0].children.is_empty());
        assert!(instance.check_invariants().is_ok());
    }

    #[test]
    fn test_form_blossom_below_root_adopts_children() {
        // 5 - 6 = 0, then 0 - 1 = 2 and 0 - 3 = 4, closed by (2, 4)
        let mut instance = Instance::from_capacities(
            7,
            &[(5, 6, 0_i64), (6, 0, 0), (0, 1, 0), (1, 2, 0), (0, 3, 0), (3, 4, 0), (2, 4, 0)],
        );
        for &(parent, child, class) in [
            (5, 6, EdgeClass::Tree),
            (6, 0, EdgeClass::Matching),
            (0, 1, EdgeClass::Tree),
            (1, 2, EdgeClass::Matching),
            (0, 3, EdgeClass::Tree),
            (3, 4, EdgeClass::Matching),
        ]
        .iter()
        {
            let edge = instance.edge_between(parent, child);
            instance.edges[edge.0].class = class;
            instance.attach(NodeId(parent), NodeId(child), edge);
        }
        instance.trees.retain(|tree| tree.root == NodeId(5));
        let closing = instance.edge_between(2, 4);
        instance.form_blossom(closing).unwrap();

        let blossom = instance.outer(NodeId(0));
        assert_ne!(blossom, NodeId(0));
        assert_eq!(instance.nodes[blossom.0].parent, Some(NodeId(6)));
        assert_eq!(instance.nodes[6].children, vec![blossom]);
        assert_eq!(instance.leaves(blossom).len(), 5);
        assert_eq!(instance.depth(blossom), 2);
        assert!(instance.check_invariants().is_ok());
    }

    #[test]
    fn test_dissolve_entered_at_even_child() {
        // 5 - [0 1 2 3 4] = 6 entered at leaf 2
        let mut instance = Instance::from_capacities(
            7,
            &[(0, 1, 0_i64), (1, 2, 0), (2, 3, 0), (3, 4, 0), (4, 0, 0), (2, 5, 0), (0, 6, 0)],
        );
        let blossom = instance.contract_cycle(&[0, 1, 2, 3, 4]);
        let (up, down) = (instance.edge_between(2, 5), instance.edge_between(0, 6));
        instance.edges[up.0].class = EdgeClass::Tree;
        instance.edges[down.0].class = EdgeClass::Matching;
        instance.attach(NodeId(5), blossom, up);
        instance.attach(blossom, NodeId(6), down);
        instance.trees = vec![AlternatingTree::new(NodeId(5))];

        let survey = instance.survey();
        let transition = instance.find_transition(&survey).unwrap();
        assert_eq!(transition, Transition::Dissolve(blossom));
        instance.fire(transition).unwrap();

        assert_eq!(instance.nodes[5].children, vec![NodeId(2)]);
        assert_eq!(instance.nodes[2].parent, Some(NodeId(5)));
        assert_eq!(instance.nodes[1].parent, Some(NodeId(2)));
        assert_eq!(instance.nodes[0].parent, Some(NodeId(1)));
        assert_eq!(instance.nodes[6].parent, Some(NodeId(0)));
        assert_eq!(instance.depth(NodeId(6)), 4);
        assert_eq!(instance.pairs.len(), 1);
        assert_eq!(
            instance.pairs[0].starting_from(NodeId(3)),
            Some((NodeId(3), NodeId(4)))
        );
        assert_eq!(class_of(&instance, 2, 3), EdgeClass::Slack);
        assert_eq!(class_of(&instance, 4, 0), EdgeClass::Slack);
        assert!(instance.nodes[..7].iter().all(|node| node.container.is_none()));
        assert!(instance.check_invariants().is_ok());
    }

    #[test]
    fn test_dissolve_entered_at_odd_child() {
        // 3 - [0 1 2] = 4 entered at leaf 1
        let mut instance = Instance::from_capacities(
            5,
            &[(0, 1, 0_i64), (1, 2, 0), (2, 0, 0), (1, 3, 0), (0, 4, 0)],
        );
        let blossom = instance.contract_cycle(&[0, 1, 2]);
        let (up, down) = (instance.edge_between(1, 3), instance.edge_between(0, 4));
        instance.edges[up.0].class = EdgeClass::Tree;
        instance.edges[down.0].class = EdgeClass::Matching;
        instance.attach(NodeId(3), blossom, up);
        instance.attach(blossom, NodeId(4), down);
        instance.trees = vec![AlternatingTree::new(NodeId(3))];

        instance.dissolve(blossom).unwrap();
        assert_eq!(instance.nodes[1].parent, Some(NodeId(3)));
        assert_eq!(instance.nodes[2].parent, Some(NodeId(1)));
        assert_eq!(instance.nodes[0].parent, Some(NodeId(2)));
        assert_eq!(instance.nodes[4].parent, Some(NodeId(0)));
        assert!(instance.pairs.is_empty());
        assert_eq!(class_of(&instance, 0, 1), EdgeClass::Slack);
        assert_eq!(class_of(&instance, 2, 0), EdgeClass::Tree);
        assert!(instance.check_invariants().is_ok());
    }

    #[test]
    fn test_augment_through_blossom() {
        // [0 1 2 3 4] and 5 are roots, tight edge (3, 5)
        let mut instance = Instance::from_capacities(
            6,
            &[(0, 1, 0_i64), (1, 2, 0), (2, 3, 0), (3, 4, 0), (4, 0, 0), (3, 5, 0)],
        );
        let blossom = instance.contract_cycle(&[0, 1, 2, 3, 4]);
        instance.trees = vec![AlternatingTree::new(blossom), AlternatingTree::new(NodeId(5))];

        let survey = instance.survey();
        let transition = instance.find_transition(&survey).unwrap();
        assert_eq!(transition, Transition::Augment(instance.edge_between(3, 5)));
        instance.fire(transition).unwrap();

        assert!(instance.trees.is_empty());
        assert_eq!(instance.pairs.len(), 1);
        assert_eq!(instance.stem(blossom), NodeId(3));
        let mut matched: Vec<_> = instance.matching().map(|(u, v, _)| (u.min(v), u.max(v))).collect();
        matched.sort_unstable();
        assert_eq!(matched, vec![(0, 4), (1, 2), (3, 5)]);
        let (_, cycle_edges) = instance.cycle_of(blossom).unwrap();
        let classes: Vec<_> = cycle_edges
            .iter()
            .map(|edge| instance.edges[edge.0].class)
            .collect();
        assert_eq!(
            classes,
            vec![
                EdgeClass::Tree,
                EdgeClass::Matching,
                EdgeClass::Tree,
                EdgeClass::Matching,
                EdgeClass::Tree
            ]
        );
        assert!(instance.check_invariants().is_ok());
    }

    #[test]
    fn test_augment_breaks_off_path_subtrees() {
        // tree 0 - 1 = 2 with branch 0 - 3 = 4, single vertex 5, tight (2, 5)
        let mut instance = Instance::from_capacities(
            6,
            &[(0, 1, 0_i64), (1, 2, 0), (0, 3, 0), (3, 4, 0), (2, 5, 0)],
        );
        for &(parent, child, class) in [
            (0, 1, EdgeClass::Tree),
            (1, 2, EdgeClass::Matching),
            (0, 3, EdgeClass::Tree),
            (3, 4, EdgeClass::Matching),
        ]
        .iter()
        {
            let edge = instance.edge_between(parent, child);
            instance.edges[edge.0].class = class;
            instance.attach(NodeId(parent), NodeId(child), edge);
        }
        instance.trees.retain(|tree| tree.root == NodeId(0) || tree.root == NodeId(5));

        instance.augment(instance.edge_between(2, 5)).unwrap();
        assert!(instance.trees.is_empty());
        assert_eq!(instance.pairs.len(), 3);
        assert_eq!(class_of(&instance, 0, 1), EdgeClass::Matching);
        assert_eq!(class_of(&instance, 1, 2), EdgeClass::Slack);
        assert_eq!(class_of(&instance, 2, 5), EdgeClass::Matching);
        assert_eq!(class_of(&instance, 0, 3), EdgeClass::Slack);
        assert_eq!(class_of(&instance, 3, 4), EdgeClass::Matching);
        assert!(instance.nodes.iter().all(|node| node.parent.is_none()));
        assert!(instance.check_invariants().is_ok());
    }

    fn live_contractions(instance: &Instance<i64>) -> usize {
        instance
            .nodes
            .iter()
            .filter(|node| matches!(&node.kind, NodeKind::Contraction { cycle, .. } if !cycle.is_empty()))
            .count()
    }

    #[test]
    fn test_each_transition_keeps_invariants() {
        let capacities = Uniform::from(0..=15_i64);
        let sizes = Uniform::from(2..=7_usize);
        let mut counts = TransitionCounts::default();
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let num_vertices = 2 * sizes.sample(&mut rng);
            let mut order: Vec<usize> = (0..num_vertices).collect();
            order.shuffle(&mut rng);
            let mut edges = Vec::new();
            for i in 0..num_vertices {
                for j in i + 1..num_vertices {
                    let hidden = order
                        .chunks(2)
                        .any(|chunk| (chunk[0], chunk[1]) == (i, j) || (chunk[0], chunk[1]) == (j, i));
                    if hidden || rng.gen_bool(0.5) {
                        edges.push((i, j, 2 * capacities.sample(&mut rng)));
                    }
                }
            }
            let mut instance = Instance::from_capacities(num_vertices, &edges);

            let mut steps = 0;
            while !instance.trees.is_empty() {
                steps += 1;
                assert!(steps < 10_000, "seed {} does not terminate", seed);
                let survey = instance.survey();
                let epsilon = instance.next_epsilon(&survey).unwrap();
                if epsilon > 0 {
                    instance.apply_epsilon(&survey, epsilon);
                    instance.check_invariants().unwrap();
                    continue;
                }

                let transition = instance.find_transition(&survey).unwrap();
                let trees = instance.trees.len();
                let pairs = instance.pairs.len();
                let contractions = live_contractions(&instance);
                let dissolved_len = match transition {
                    Transition::Dissolve(node) => instance.cycle_of(node).unwrap().0.len(),
                    _ => 0,
                };
                instance.fire(transition).unwrap();
                instance.check_invariants().unwrap();
                counts.record(&transition);

                match transition {
                    Transition::Dissolve(_) => {
                        assert_eq!(instance.trees.len(), trees);
                        assert!(instance.pairs.len() >= pairs);
                        assert!(instance.pairs.len() - pairs <= (dissolved_len - 1) / 2);
                        assert_eq!(live_contractions(&instance), contractions - 1);
                    }
                    Transition::Graft { .. } => {
                        assert_eq!(instance.trees.len(), trees);
                        assert_eq!(instance.pairs.len(), pairs - 1);
                        assert_eq!(live_contractions(&instance), contractions);
                    }
                    Transition::Form(_) => {
                        assert_eq!(instance.trees.len(), trees);
                        assert_eq!(instance.pairs.len(), pairs);
                        assert_eq!(live_contractions(&instance), contractions + 1);
                    }
                    Transition::Augment(_) => {
                        assert_eq!(instance.trees.len(), trees - 2);
                        assert!(instance.pairs.len() > pairs);
                        assert_eq!(live_contractions(&instance), contractions);
                    }
                }
            }
            instance.check_optimality().unwrap();
        }
        assert!(counts.formations > 0 && counts.grafts > 0 && counts.augmentations > 0);
    }
}
