//! Job runner: ties together the cell, the lattice, the pore and the output.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use poregrid_geometry::cell::load_basis;
use poregrid_geometry::{
    run_scan, run_scan_parallel, CellGrid, LatticeProvider, PointWriter, PoreShape, RunStatistics,
};

use crate::config::JobConfig;

/// Run a full scan from a validated job configuration.
///
/// Outside points are written to `job.output`; the returned statistics
/// describe the whole lattice.
pub fn run_job(job: &JobConfig) -> Result<RunStatistics> {
    let basis = load_basis(&job.cell_file)
        .with_context(|| format!("Invalid systemCellFile '{}'", job.cell_file.display()))?;
    let grid = CellGrid::new(basis, job.grid_size).context("Cannot build the cell grid")?;
    let shape = PoreShape::from_dimensions(job.pore.length, job.pore.diameter, job.pore.angle)?;

    let [nx, ny, nz] = grid.counts();
    println!("Grid: {} x {} x {} = {} points", nx, ny, nz, grid.point_count());
    log::debug!(
        "Pore: half-length={}, half-diameter={}, slope={}",
        shape.half_length(),
        shape.half_diameter(),
        shape.slope()
    );
    if grid.cell_volume() <= f64::EPSILON {
        log::warn!(
            "Cell volume is {}; the basis vectors are (nearly) coplanar",
            grid.cell_volume()
        );
    }

    let file = File::create(&job.output)
        .with_context(|| format!("Cannot create output file {}", job.output.display()))?;
    let mut writer = PointWriter::new(BufWriter::new(file));

    println!("Scanning points.");
    let stats = if job.parallel {
        run_scan_parallel(&grid, &shape, &mut writer)
    } else {
        run_scan(&grid, &shape, &mut writer)
    }
    .with_context(|| format!("Scan failed while writing {}", job.output.display()))?;

    writer
        .into_inner()
        .with_context(|| format!("Failed to flush {}", job.output.display()))?;
    println!("Points written to: {}", job.output.display());

    Ok(stats)
}

/// Print the human-readable run summary.
pub fn print_summary(stats: &RunStatistics) {
    println!("Total points: {}", stats.total_points);
    println!("Outside points: {}", stats.outside_points);
    println!("Membrane points: {}", stats.membrane_points());
    println!("Outside fraction: {:.10}", stats.outside_fraction());
    println!("Total volume: {:.10}", stats.total_volume);
    println!("Outside volume: {:.10}", stats.outside_volume);
    println!("Membrane volume: {:.10}", stats.membrane_volume);
}

#[derive(Serialize)]
struct Summary<'a> {
    version: &'static str,
    job: &'a JobConfig,
    statistics: &'a RunStatistics,
    outside_fraction: f64,
}

/// Write the job and its statistics to a JSON file.
pub fn write_summary_json(job: &JobConfig, stats: &RunStatistics, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let summary = Summary {
        version: env!("CARGO_PKG_VERSION"),
        job,
        statistics: stats,
        outside_fraction: stats.outside_fraction(),
    };
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)
        .with_context(|| format!("Cannot write summary {}", path.display()))?;

    println!("Summary (JSON) written to: {}", path.display());
    Ok(())
}
