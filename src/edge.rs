use crate::blossom::NodeId;
use crate::solution::Weight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) usize);

/// Every edge is in exactly one class at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeClass {
    /// tree-structure edge that is not in the matching
    Tree,
    /// edge of the current matching
    Matching,
    /// edge not used by any structure
    Slack,
}

#[derive(Debug, Clone)]
pub struct Edge<W: Weight> {
    pub(crate) u: NodeId,
    pub(crate) v: NodeId,
    /// weight as given by the caller
    pub(crate) weight: W,
    /// right-hand side of the dual constraint, derived from the weight
    pub(crate) capacity: W,
    pub(crate) class: EdgeClass,
}

impl<W: Weight> Edge<W> {
    pub(crate) fn new(u: NodeId, v: NodeId, weight: W, capacity: W) -> Self {
        Self {
            u,
            v,
            weight,
            capacity,
            class: EdgeClass::Slack,
        }
    }

    /// Endpoint opposite to `leaf`
    #[inline]
    pub(crate) fn other(&self, leaf: NodeId) -> NodeId {
        if self.u == leaf {
            self.v
        } else {
            self.u
        }
    }

    #[inline]
    pub(crate) fn endpoints(&self) -> [NodeId; 2] {
        [self.u, self.v]
    }
}
