use num_traits::{NumAssign, PrimInt, Signed};
use std::fmt::{Debug, Display};

/// Integer type of edge weights and dual charges.
///
/// Weights are kept integral so tightness is an exact comparison.
pub trait Weight: PrimInt + Signed + NumAssign + Display + Debug {}

impl<T> Weight for T where T: PrimInt + Signed + NumAssign + Display + Debug {}

/// Marks a vertex without a mate in [`MatchingSolution::mate`]
pub const UNMATCHED: usize = usize::MAX;

///
/// Solution of the perfect matching problem
///
#[derive(Debug, Clone)]
pub struct MatchingSolution<W>
where
    W: Weight,
{
    /// index i gives the vertex matched to vertex i
    ///
    /// Unmatched vertices are marked by [`UNMATCHED`]
    pub mate: Vec<usize>,
    /// matched edges as `(i, j)` pairs with `i < j`, sorted
    pub edges: Vec<(usize, usize)>,
    /// sum of the caller's weights over the matched edges
    pub total_weight: W,
    /// number of unmatched vertices, zero once a perfect matching is found
    pub num_unmatched: usize,
}

impl<W> MatchingSolution<W>
where
    W: Weight,
{
    pub fn new(vertex_capacity: usize) -> MatchingSolution<W> {
        MatchingSolution::<W> {
            mate: Vec::with_capacity(vertex_capacity),
            edges: Vec::with_capacity(vertex_capacity / 2),
            total_weight: W::zero(),
            num_unmatched: usize::MAX,
        }
    }

    pub(crate) fn reset(&mut self, num_vertices: usize) {
        self.mate.clear();
        self.mate.resize(num_vertices, UNMATCHED);
        self.edges.clear();
        self.total_weight = W::zero();
        self.num_unmatched = num_vertices;
    }

    /// Returns true if every vertex has a mate
    pub fn is_perfect(&self) -> bool {
        self.num_unmatched == 0
    }
}
