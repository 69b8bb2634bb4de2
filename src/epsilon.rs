use crate::edge::{EdgeClass, EdgeId};
use crate::error::{violation, MatchingError};
use crate::instance::{Instance, Standing, Survey};
use crate::solution::Weight;
use tracing::trace;

#[inline]
fn tighten<W: Weight>(bound: &mut Option<W>, candidate: W) {
    match bound {
        Some(current) if *current <= candidate => {}
        _ => *bound = Some(candidate),
    }
}

impl<W: Weight> Instance<W> {
    /// Largest uniform change of tree potentials that keeps every constraint
    /// satisfied.
    ///
    /// Odd contractions may not fall below zero. Odd leaves are exempt since
    /// vertex potentials are free in the perfect-matching dual. A slack edge between an even
    /// node and a pair closes at full speed, one between two even nodes at
    /// double speed. Without any such constraint the dual is unbounded and the
    /// graph has no perfect matching.
    pub(crate) fn next_epsilon(&self, survey: &Survey) -> Result<W, MatchingError> {
        let two = W::one() + W::one();
        let mut bound = None;

        for (id, standing) in survey.iter() {
            if standing.is_odd() && !self.node(id).is_leaf() {
                tighten(&mut bound, self.node(id).dual);
            }
        }

        for (index, edge) in self.edges.iter().enumerate() {
            if edge.class != EdgeClass::Slack {
                continue;
            }
            let (a, b) = (self.outer(edge.u), self.outer(edge.v));
            if a == b {
                continue;
            }
            match (survey.of(a), survey.of(b)) {
                (x, y) if x.is_even() && y.is_even() => {
                    let slack = self.slack(EdgeId(index));
                    debug_assert!(
                        slack % two == W::zero(),
                        "odd slack {} between even nodes",
                        slack
                    );
                    tighten(&mut bound, slack / two);
                }
                (x, Standing::Paired { .. }) | (Standing::Paired { .. }, x) if x.is_even() => {
                    tighten(&mut bound, self.slack(EdgeId(index)));
                }
                _ => {}
            }
        }

        let epsilon = bound.ok_or(MatchingError::NoPerfectMatching)?;
        if epsilon < W::zero() {
            return Err(violation(format!("negative epsilon {}", epsilon)));
        }
        Ok(epsilon)
    }

    /// Raises even tree nodes and lowers odd ones by `epsilon`
    pub(crate) fn apply_epsilon(&mut self, survey: &Survey, epsilon: W) {
        trace!("apply epsilon {}", epsilon);
        for (id, standing) in survey.iter() {
            if standing.is_even() {
                self.node_mut(id).dual += epsilon;
            } else if standing.is_odd() {
                self.node_mut(id).dual -= epsilon;
            }
        }
    }
}
