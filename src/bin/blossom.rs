use anyhow::{bail, Context, Result};
use blossom_matching::io::{read_graph, write_matching};
use blossom_matching::BlossomSolver;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use tracing::info;

const USAGE: &str = "usage: blossom <file> [--total] [--minimize]";

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let mut path = None;
    let mut with_total = false;
    let mut maximize = true;
    for arg in std::env::args().skip(1) {
        if arg == "--total" {
            with_total = true;
        } else if arg == "--minimize" {
            maximize = false;
        } else if arg.starts_with("--") {
            bail!("unknown flag {}\n{}", arg, USAGE);
        } else if path.is_none() {
            path = Some(arg);
        } else {
            bail!("unexpected argument {}\n{}", arg, USAGE);
        }
    }
    let path = path.context(USAGE)?;

    let file = File::open(&path).with_context(|| format!("cannot open {}", path))?;
    let (mut solver, mut solution) = BlossomSolver::<i64>::new(0, 0);
    read_graph(BufReader::new(file), &mut solver).with_context(|| format!("cannot parse {}", path))?;
    info!(
        "{}: {} vertices, {} edges",
        path,
        solver.num_vertices(),
        solver.num_of_edges()
    );

    solver.solve(&mut solution, maximize)?;
    info!(
        "solved in {} steps, {} transitions",
        solver.nits,
        solver.counts.total()
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_matching(&mut out, &solution, with_total)?;
    out.flush()?;
    Ok(())
}
