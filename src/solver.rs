use crate::error::{violation, MatchingError};
use crate::instance::Instance;
use crate::solution::{MatchingSolution, Weight, UNMATCHED};
use crate::transition::TransitionCounts;
use anyhow::{anyhow as anyhow_error, ensure, Result};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Solver for the optimum-weight perfect matching problem.
///
/// Finds a perfect matching of a general graph given as an edge list whose
/// total weight is maximal (or minimal) by growing alternating trees and
/// raising dual charges until edges become tight.
#[derive(Clone)]
pub struct BlossomSolver<W: Weight> {
    num_vertices: usize,
    // edge list storage
    heads: Vec<usize>,
    tails: Vec<usize>,
    weights: Vec<W>,

    max_iterations: u32,

    pub nits: u32,
    pub counts: TransitionCounts,

    // state of the last run, kept for verification
    instance: Option<Instance<W>>,
}

impl<W: Weight> BlossomSolver<W> {
    pub const MAX_ITERATIONS: u32 = 100000;

    pub fn new(vertex_capacity: usize, edge_capacity: usize) -> (Self, MatchingSolution<W>) {
        (
            Self {
                num_vertices: 0,
                heads: Vec::with_capacity(edge_capacity),
                tails: Vec::with_capacity(edge_capacity),
                weights: Vec::with_capacity(edge_capacity),

                max_iterations: Self::MAX_ITERATIONS,

                nits: 0,
                counts: TransitionCounts::default(),

                instance: None,
            },
            MatchingSolution::<W>::new(vertex_capacity),
        )
    }

    /// Clears stored edges and prepares for a graph with `num_vertices`
    /// vertices
    pub fn init(&mut self, num_vertices: usize) -> Result<(), anyhow::Error> {
        ensure!(num_vertices > 0, "graph has no vertices");
        self.num_vertices = num_vertices;
        self.heads.clear();
        self.tails.clear();
        self.weights.clear();
        self.instance = None;
        Ok(())
    }

    #[inline]
    pub fn add_edge(&mut self, i: usize, j: usize, weight: W) -> Result<(), anyhow::Error> {
        ensure!(
            i < self.num_vertices && j < self.num_vertices,
            "edge ({}, {}) is out of range for {} vertices",
            i,
            j,
            self.num_vertices
        );
        ensure!(i != j, "self loop at vertex {}", i);
        self.heads.push(i);
        self.tails.push(j);
        self.weights.push(weight);
        Ok(())
    }

    /// Adds edges from vertex `i` to every vertex of `neighbours`
    #[inline]
    pub fn extend_from_edges(
        &mut self,
        i: usize,
        neighbours: &[usize],
        weights: &[W],
    ) -> Result<(), anyhow::Error> {
        ensure!(neighbours.len() == weights.len());
        for (&j, &weight) in neighbours.iter().zip(weights.iter()) {
            self.add_edge(i, j, weight)?;
        }
        Ok(())
    }

    #[inline]
    pub fn num_of_edges(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    #[inline]
    pub fn solve(&mut self, solution: &mut MatchingSolution<W>, maximize: bool) -> Result<(), anyhow::Error> {
        self.solve_with_params(solution, maximize, None)
    }

    pub fn solve_with_params(
        &mut self,
        solution: &mut MatchingSolution<W>,
        maximize: bool,
        max_iterations: Option<u32>,
    ) -> Result<(), anyhow::Error> {
        self.validate_input()?;
        self.init_solve(solution);
        self.max_iterations = max_iterations.unwrap_or(Self::MAX_ITERATIONS);

        let mut instance = self.build_instance(maximize)?;
        while !instance.trees.is_empty() {
            self.nits += 1;
            if self.nits > self.max_iterations {
                return Err(MatchingError::IterationLimit(self.max_iterations).into());
            }

            let survey = instance.survey();
            let epsilon = instance.next_epsilon(&survey)?;
            trace!(
                "step {}: {} trees, {} pairs, epsilon {}",
                self.nits,
                instance.trees.len(),
                instance.pairs.len(),
                epsilon
            );
            if epsilon > W::zero() {
                instance.apply_epsilon(&survey, epsilon);
                continue;
            }

            let transition = instance
                .find_transition(&survey)
                .ok_or_else(|| violation("tight state without an enabled transition"))?;
            instance.fire(transition)?;
            self.counts.record(&transition);
        }
        debug_assert!(instance.check_invariants().is_ok());

        self.fill_solution(&instance, solution)?;
        debug!(
            "matched {} vertices with total weight {} in {} steps: {:?}",
            self.num_vertices - solution.num_unmatched,
            solution.total_weight,
            self.nits,
            self.counts
        );
        self.instance = Some(instance);
        Ok(())
    }

    /// Returns the total weight of the matched edges
    pub fn get_objective(&self, solution: &MatchingSolution<W>) -> W {
        let weights: HashMap<(usize, usize), W> = self
            .heads
            .iter()
            .zip(self.tails.iter())
            .zip(self.weights.iter())
            .map(|((&u, &v), &weight)| ((u.min(v), u.max(v)), weight))
            .collect();
        solution
            .edges
            .iter()
            .filter_map(|&(i, j)| weights.get(&(i.min(j), i.max(j))))
            .fold(W::zero(), |acc, &weight| acc + weight)
    }

    /// Checks that the last run ended in an optimum: every vertex is matched,
    /// every dual constraint holds, matching edges are tight and the dual
    /// objective equals the matched capacity.
    pub fn verify_optimum(&self) -> Result<(), anyhow::Error> {
        let instance = self
            .instance
            .as_ref()
            .ok_or_else(|| anyhow_error!("no finished run to verify"))?;
        instance.check_optimality()?;
        Ok(())
    }

    fn validate_input(&self) -> Result<(), anyhow::Error> {
        ensure!(self.num_vertices > 0, "solver is not initialized");
        ensure!(
            self.heads.len() == self.tails.len() && self.tails.len() == self.weights.len()
        );
        let mut pairs: Vec<(usize, usize)> = self
            .heads
            .iter()
            .zip(self.tails.iter())
            .map(|(&u, &v)| (u.min(v), u.max(v)))
            .collect();
        pairs.sort_unstable();
        if let Some(window) = pairs.windows(2).find(|window| window[0] == window[1]) {
            return Err(MatchingError::InvalidInput(format!(
                "parallel edges between {} and {}",
                window[0].0, window[0].1
            ))
            .into());
        }
        Ok(())
    }

    fn init_solve(&mut self, solution: &mut MatchingSolution<W>) {
        self.nits = 0;
        self.counts = TransitionCounts::default();
        self.instance = None;
        solution.reset(self.num_vertices);
    }

    /// Derives non-negative even capacities so that the cheapest perfect
    /// matching by capacity is the optimum by weight
    fn build_instance(&self, maximize: bool) -> Result<Instance<W>, MatchingError> {
        let (min_weight, max_weight) = self
            .weights
            .iter()
            .fold((W::max_value(), W::min_value()), |(min, max), &weight| {
                (min.min(weight), max.max(weight))
            });

        let mut capacities = Vec::with_capacity(self.weights.len());
        for &weight in self.weights.iter() {
            let shifted = if maximize {
                max_weight.checked_sub(&weight)
            } else {
                weight.checked_sub(&min_weight)
            };
            let capacity = shifted
                .and_then(|shifted| shifted.checked_add(&shifted))
                .ok_or_else(|| {
                    MatchingError::InvalidInput(format!("weight {} overflows the capacity range", weight))
                })?;
            capacities.push(capacity);
        }
        trace!("capacities: {:?}", capacities);

        let edges = self
            .heads
            .iter()
            .zip(self.tails.iter())
            .zip(self.weights.iter().zip(capacities.into_iter()))
            .map(|((&u, &v), (&weight, capacity))| (u, v, weight, capacity));
        Ok(Instance::new(self.num_vertices, edges))
    }

    fn fill_solution(&self, instance: &Instance<W>, solution: &mut MatchingSolution<W>) -> Result<(), MatchingError> {
        for (u, v, weight) in instance.matching() {
            if solution.mate[u] != UNMATCHED || solution.mate[v] != UNMATCHED {
                return Err(violation(format!("vertex {} or {} matched twice", u, v)));
            }
            solution.mate[u] = v;
            solution.mate[v] = u;
            solution.edges.push((u.min(v), u.max(v)));
            solution.total_weight = solution
                .total_weight
                .checked_add(&weight)
                .ok_or_else(|| MatchingError::InvalidInput("total weight overflows".to_string()))?;
        }
        solution.edges.sort_unstable();
        solution.num_unmatched = solution.mate.iter().filter(|mate| **mate == UNMATCHED).count();
        Ok(())
    }
}
