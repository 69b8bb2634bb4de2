//! Plain text graph format.
//!
//! The first line holds the number of vertices `n`, every following line one
//! edge `i j weight` with 1-indexed vertices. Blank lines are skipped.

use crate::solution::{MatchingSolution, Weight};
use crate::solver::BlossomSolver;
use anyhow::{anyhow as anyhow_error, ensure, Context, Result};
use std::io::{BufRead, Write};
use tracing::trace;

/// Reads a graph into `solver`, replacing whatever it stored before
pub fn read_graph<W, R>(reader: R, solver: &mut BlossomSolver<W>) -> Result<(), anyhow::Error>
where
    W: Weight,
    R: BufRead,
{
    let mut lines = reader
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| line.as_ref().map_or(true, |line| !line.trim().is_empty()));

    let (_, header) = lines.next().context("missing vertex count")?;
    let header = header?;
    let num_vertices: usize = header
        .trim()
        .parse()
        .with_context(|| format!("invalid vertex count {:?}", header.trim()))?;
    solver.init(num_vertices)?;

    for (number, line) in lines {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        ensure!(
            fields.len() == 3,
            "line {}: expected `i j weight`, got {:?}",
            number,
            line
        );
        let i = parse_vertex(fields[0], num_vertices).with_context(|| format!("line {}", number))?;
        let j = parse_vertex(fields[1], num_vertices).with_context(|| format!("line {}", number))?;
        let weight = W::from_str_radix(fields[2], 10)
            .map_err(|_| anyhow_error!("line {}: invalid weight {:?}", number, fields[2]))?;
        solver
            .add_edge(i, j, weight)
            .with_context(|| format!("line {}", number))?;
    }
    trace!(
        "read {} vertices and {} edges",
        num_vertices,
        solver.num_of_edges()
    );
    Ok(())
}

fn parse_vertex(field: &str, num_vertices: usize) -> Result<usize, anyhow::Error> {
    let vertex: usize = field
        .parse()
        .with_context(|| format!("invalid vertex {:?}", field))?;
    ensure!(
        vertex >= 1 && vertex <= num_vertices,
        "vertex {} outside 1..={}",
        vertex,
        num_vertices
    );
    Ok(vertex - 1)
}

/// Writes one `i j` line per matched edge, 1-indexed, optionally followed by
/// the total weight
pub fn write_matching<W, Out>(
    out: &mut Out,
    solution: &MatchingSolution<W>,
    with_total: bool,
) -> Result<(), anyhow::Error>
where
    W: Weight,
    Out: Write,
{
    for &(i, j) in solution.edges.iter() {
        writeln!(out, "{} {}", i + 1, j + 1)?;
    }
    if with_total {
        writeln!(out, "{}", solution.total_weight)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{read_graph, write_matching};
    use crate::solver::BlossomSolver;

    #[test]
    fn test_read_solve_write() -> Result<(), Box<dyn std::error::Error>> {
        let input = "4\n1 2 3\n2 3 1\n\n3 4 3\n4 1 1\n";
        let (mut solver, mut solution) = BlossomSolver::<i64>::new(4, 4);
        read_graph(input.as_bytes(), &mut solver)?;
        assert_eq!(solver.num_vertices(), 4);
        assert_eq!(solver.num_of_edges(), 4);

        solver.solve(&mut solution, true)?;
        let mut out = Vec::new();
        write_matching(&mut out, &solution, true)?;
        assert_eq!(String::from_utf8(out)?, "1 2\n3 4\n6\n");

        let mut out = Vec::new();
        write_matching(&mut out, &solution, false)?;
        assert_eq!(String::from_utf8(out)?, "1 2\n3 4\n");
        Ok(())
    }

    #[test]
    fn test_negative_weights() -> Result<(), Box<dyn std::error::Error>> {
        let (mut solver, mut solution) = BlossomSolver::<i32>::new(2, 1);
        read_graph("2\n2 1 -7\n".as_bytes(), &mut solver)?;
        solver.solve(&mut solution, true)?;
        assert_eq!(solution.total_weight, -7);
        assert_eq!(solution.edges, vec![(0, 1)]);
        Ok(())
    }

    #[test]
    fn test_rejects_malformed_input() {
        let (mut solver, _) = BlossomSolver::<i32>::new(2, 1);
        assert!(read_graph("".as_bytes(), &mut solver).is_err());
        assert!(read_graph("two\n".as_bytes(), &mut solver).is_err());
        assert!(read_graph("2\n1 2\n".as_bytes(), &mut solver).is_err());
        assert!(read_graph("2\n1 3 4\n".as_bytes(), &mut solver).is_err());
        assert!(read_graph("2\n0 1 4\n".as_bytes(), &mut solver).is_err());
        assert!(read_graph("2\n1 2 x\n".as_bytes(), &mut solver).is_err());
        assert!(read_graph("2\n1 1 4\n".as_bytes(), &mut solver).is_err());
    }
}
