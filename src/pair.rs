use crate::blossom::NodeId;
use crate::edge::EdgeId;

/// Two outer nodes bound by a matching edge, outside of every tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedPair {
    pub(crate) a: NodeId,
    pub(crate) b: NodeId,
    pub(crate) edge: EdgeId,
}

impl MatchedPair {
    pub(crate) fn new(a: NodeId, b: NodeId, edge: EdgeId) -> Self {
        Self { a, b, edge }
    }

    /// Orders the members so that `first` comes first
    pub(crate) fn starting_from(&self, first: NodeId) -> Option<(NodeId, NodeId)> {
        if self.a == first {
            Some((self.a, self.b))
        } else if self.b == first {
            Some((self.b, self.a))
        } else {
            None
        }
    }
}
