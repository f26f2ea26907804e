//! Lattice scan and volume estimation.
//!
//! Every lattice point is classified against the membrane; points outside
//! the solid material are streamed to a [`PointSink`] in lattice order and
//! counted. The fraction of outside points, scaled by the cell volume,
//! estimates the volume of the pore and the space beyond the membrane:
//!
//! $$ V_{\text{out}} = V_{\text{cell}} \frac{N_{\text{out}}}{N} $$

use std::io::{self, Write};

use nalgebra::Point3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lattice::LatticeProvider;
use crate::pore::{is_in_membrane_wall, PoreShape};

/// Indices classified per parallel block before results are written.
const PARALLEL_BLOCK: usize = 1 << 16;

/// Errors during a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Lattice contains no points; no volume estimate is possible")]
    DegenerateLattice,

    #[error("Failed to write point: {0}")]
    IoError(#[from] io::Error),
}

/// Receives the points found outside the membrane, in lattice order.
pub trait PointSink {
    fn accept(&mut self, point: &Point3<f64>) -> io::Result<()>;
}

impl PointSink for Vec<Point3<f64>> {
    fn accept(&mut self, point: &Point3<f64>) -> io::Result<()> {
        self.push(*point);
        Ok(())
    }
}

/// Writes one point per line as three whitespace-separated decimals.
pub struct PointWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> PointWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> PointSink for PointWriter<W> {
    fn accept(&mut self, point: &Point3<f64>) -> io::Result<()> {
        writeln!(self.inner, "{} {} {}", point.x, point.y, point.z)?;
        self.written += 1;
        Ok(())
    }
}

/// Running point counts of a scan.
///
/// A fresh tally has seen nothing; [`record`](Tally::record) accumulates
/// classifications; [`finish`](Tally::finish) consumes it into the final
/// [`RunStatistics`]. Tallies of disjoint partitions combine with
/// [`merge`](Tally::merge).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    total: usize,
    outside: usize,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, in_membrane: bool) {
        self.total += 1;
        if !in_membrane {
            self.outside += 1;
        }
    }

    pub fn merge(self, other: Tally) -> Tally {
        Tally {
            total: self.total + other.total,
            outside: self.outside + other.outside,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn outside(&self) -> usize {
        self.outside
    }

    /// Turn the counts into volume estimates for a cell of `cell_volume`.
    pub fn finish(self, cell_volume: f64) -> Result<RunStatistics, ScanError> {
        if self.total == 0 {
            return Err(ScanError::DegenerateLattice);
        }
        let outside_volume = cell_volume * self.outside as f64 / self.total as f64;
        Ok(RunStatistics {
            total_points: self.total,
            outside_points: self.outside,
            total_volume: cell_volume,
            outside_volume,
            membrane_volume: cell_volume - outside_volume,
        })
    }
}

/// Point counts and volume estimates of a completed scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Number of lattice points scanned.
    pub total_points: usize,
    /// Points outside the membrane material (pore and beyond the slab).
    pub outside_points: usize,
    /// Volume of the cell.
    pub total_volume: f64,
    /// Estimated volume outside the membrane material.
    pub outside_volume: f64,
    /// Estimated volume of the membrane material.
    pub membrane_volume: f64,
}

impl RunStatistics {
    pub fn membrane_points(&self) -> usize {
        self.total_points - self.outside_points
    }

    pub fn outside_fraction(&self) -> f64 {
        self.outside_points as f64 / self.total_points as f64
    }
}

/// Classify every lattice point in order, streaming outside points to `sink`.
///
/// Fails with [`ScanError::DegenerateLattice`] before touching the sink if
/// the lattice is empty.
pub fn run_scan<L, S>(
    lattice: &L,
    shape: &PoreShape,
    sink: &mut S,
) -> Result<RunStatistics, ScanError>
where
    L: LatticeProvider + ?Sized,
    S: PointSink + ?Sized,
{
    let n = lattice.point_count();
    if n == 0 {
        return Err(ScanError::DegenerateLattice);
    }
    log::info!("Scanning {} lattice points", n);

    let mut tally = Tally::new();
    for i in 0..n {
        let r = lattice.position_at(i);
        let in_membrane = is_in_membrane_wall(&r, shape);
        if !in_membrane {
            sink.accept(&r)?;
        }
        tally.record(in_membrane);
    }

    log::info!("Scan complete: {} of {} points outside the membrane", tally.outside(), n);
    tally.finish(lattice.cell_volume())
}

/// Parallel version of [`run_scan`] with identical output.
///
/// Indices are classified in blocks across the Rayon thread pool; each
/// block's outside points are collected in index order and written before
/// the next block starts.
pub fn run_scan_parallel<L, S>(
    lattice: &L,
    shape: &PoreShape,
    sink: &mut S,
) -> Result<RunStatistics, ScanError>
where
    L: LatticeProvider + Sync + ?Sized,
    S: PointSink + ?Sized,
{
    let n = lattice.point_count();
    if n == 0 {
        return Err(ScanError::DegenerateLattice);
    }
    log::info!(
        "Scanning {} lattice points on {} threads",
        n,
        rayon::current_num_threads()
    );

    let mut tally = Tally::new();
    let mut start = 0;
    while start < n {
        let end = (start + PARALLEL_BLOCK).min(n);

        let outside: Vec<Point3<f64>> = (start..end)
            .into_par_iter()
            .filter_map(|i| {
                let r = lattice.position_at(i);
                (!is_in_membrane_wall(&r, shape)).then_some(r)
            })
            .collect();

        for r in &outside {
            sink.accept(r)?;
        }
        tally = tally.merge(Tally {
            total: end - start,
            outside: outside.len(),
        });

        log::debug!("Scanned {}/{} points", end, n);
        start = end;
    }

    log::info!("Scan complete: {} of {} points outside the membrane", tally.outside(), n);
    tally.finish(lattice.cell_volume())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{CellGrid, PointCloud};
    use approx::assert_relative_eq;
    use nalgebra::Matrix3;

    /// The 27 points of {-1, 0, 1}^3, z fastest.
    fn unit_stencil() -> PointCloud {
        let mut points = Vec::new();
        for x in [-1.0, 0.0, 1.0] {
            for y in [-1.0, 0.0, 1.0] {
                for z in [-1.0, 0.0, 1.0] {
                    points.push(Point3::new(x, y, z));
                }
            }
        }
        PointCloud::new(points, 8.0)
    }

    #[test]
    fn test_zero_length_membrane_keeps_off_plane_points() {
        let shape = PoreShape::from_dimensions(0.0, 0.0, 0.0).unwrap();
        let mut out: Vec<Point3<f64>> = Vec::new();
        let stats = run_scan(&unit_stencil(), &shape, &mut out).unwrap();

        // Only the z = 0 plane is membrane; a zero-radius pore opens nothing.
        assert_eq!(stats.total_points, 27);
        assert_eq!(stats.outside_points, 18);
        assert_eq!(stats.membrane_points(), 9);
        assert!(out.iter().all(|p| p.z != 0.0));
        assert_relative_eq!(stats.outside_volume, 8.0 * 18.0 / 27.0, epsilon = 1e-12);
    }

    #[test]
    fn test_open_pore_adds_axis_point() {
        let shape = PoreShape::from_dimensions(0.0, 1.0, 0.0).unwrap();
        let mut out: Vec<Point3<f64>> = Vec::new();
        let stats = run_scan(&unit_stencil(), &shape, &mut out).unwrap();
        assert_eq!(stats.outside_points, 19);
        assert!(out.contains(&Point3::origin()));
    }

    #[test]
    fn test_output_follows_lattice_order() {
        let shape = PoreShape::from_dimensions(0.0, 0.0, 0.0).unwrap();
        let lattice = unit_stencil();
        let mut out: Vec<Point3<f64>> = Vec::new();
        run_scan(&lattice, &shape, &mut out).unwrap();

        let expected: Vec<_> = lattice.points().iter().copied().filter(|p| p.z != 0.0).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_lattice_is_degenerate() {
        let shape = PoreShape::from_dimensions(1.0, 1.0, 0.0).unwrap();
        let mut out: Vec<Point3<f64>> = Vec::new();
        let err = run_scan(&PointCloud::new(Vec::new(), 10.0), &shape, &mut out).unwrap_err();
        assert!(matches!(err, ScanError::DegenerateLattice));
        assert!(out.is_empty());
    }

    #[test]
    fn test_volumes_are_conserved() {
        let grid = CellGrid::new(Matrix3::identity() * 20.0, 0.9).unwrap();
        let shape = PoreShape::from_dimensions(10.0, 6.0, 15.0).unwrap();
        let stats = run_scan(&grid, &shape, &mut Vec::<Point3<f64>>::new()).unwrap();

        assert_eq!(stats.outside_points + stats.membrane_points(), grid.point_count());
        assert_relative_eq!(
            stats.outside_volume + stats.membrane_volume,
            stats.total_volume,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            stats.outside_fraction(),
            stats.outside_volume / 8000.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_parallel_scan_matches_sequential() {
        // Large enough to span several parallel blocks.
        let grid = CellGrid::new(Matrix3::identity() * 60.0, 1.0).unwrap();
        assert!(grid.point_count() > 2 * PARALLEL_BLOCK);
        let shape = PoreShape::from_dimensions(30.0, 12.0, 10.0).unwrap();

        let mut sequential: Vec<Point3<f64>> = Vec::new();
        let mut parallel: Vec<Point3<f64>> = Vec::new();
        let a = run_scan(&grid, &shape, &mut sequential).unwrap();
        let b = run_scan_parallel(&grid, &shape, &mut parallel).unwrap();

        assert_eq!(a, b);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_writer_formats_one_point_per_line() {
        let mut writer = PointWriter::new(Vec::new());
        writer.accept(&Point3::new(1.5, -2.0, 0.25)).unwrap();
        writer.accept(&Point3::new(0.0, 0.0, 3.0)).unwrap();
        assert_eq!(writer.written(), 2);

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, "1.5 -2 0.25\n0 0 3\n");
    }

    #[test]
    fn test_tally_merge_and_finish() {
        let mut left = Tally::new();
        left.record(true);
        left.record(false);
        let mut right = Tally::new();
        right.record(false);

        let merged = left.merge(right);
        assert_eq!(merged.total(), 3);
        assert_eq!(merged.outside(), 2);

        let stats = merged.finish(9.0).unwrap();
        assert_relative_eq!(stats.outside_volume, 6.0);
        assert_relative_eq!(stats.membrane_volume, 3.0);
        assert!(matches!(Tally::new().finish(1.0), Err(ScanError::DegenerateLattice)));
    }

    struct FailingSink;

    impl PointSink for FailingSink {
        fn accept(&mut self, _point: &Point3<f64>) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_sink_failure_aborts_scan() {
        let shape = PoreShape::from_dimensions(0.0, 0.0, 0.0).unwrap();
        let err = run_scan(&unit_stencil(), &shape, &mut FailingSink).unwrap_err();
        assert!(matches!(err, ScanError::IoError(_)));
    }
}
