//! Optimum-weight perfect matching in general graphs.
//!
//! The solver follows the primal-dual blossom method: every vertex starts as
//! the root of its own alternating tree, dual charges of tree nodes are raised
//! uniformly until an edge or a contracted odd cycle becomes tight, and then
//! one structural transition fires (dissolving, grafting, forming a blossom or
//! augmenting). The run ends when every vertex is matched.
//!
//! ```
//! use blossom_matching::BlossomSolver;
//!
//! let (mut solver, mut solution) = BlossomSolver::<i32>::new(4, 4);
//! solver.init(4).unwrap();
//! solver.add_edge(0, 1, 3).unwrap();
//! solver.add_edge(1, 2, 1).unwrap();
//! solver.add_edge(2, 3, 3).unwrap();
//! solver.add_edge(3, 0, 1).unwrap();
//! solver.solve(&mut solution, true).unwrap();
//! assert_eq!(solution.edges, vec![(0, 1), (2, 3)]);
//! assert_eq!(solution.total_weight, 6);
//! ```

mod blossom;
mod edge;
mod epsilon;
pub mod error;
mod instance;
pub mod io;
mod pair;
mod path;
pub mod solution;
pub mod solver;
mod transition;
mod tree;

pub use crate::error::MatchingError;
pub use crate::solution::{MatchingSolution, Weight, UNMATCHED};
pub use crate::solver::BlossomSolver;
pub use crate::transition::TransitionCounts;
