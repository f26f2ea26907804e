//! Regular lattices filling a simulation cell.
//!
//! A cell is the parallelepiped spanned by three basis vectors
//! $\mathbf{a}, \mathbf{b}, \mathbf{c}$ (the columns of a 3x3 matrix). The
//! [`CellGrid`] divides each basis vector into $n_k = \lceil |\mathbf{a}_k| / d \rceil$
//! steps for a target spacing $d$, so the actual spacing along each edge
//! is at most $d$. The grid is centred on the origin, matching a membrane
//! whose mid-plane is $z = 0$.
//!
//! Consumers see lattices only through [`LatticeProvider`], so the scan can
//! be driven equally by a generated grid or by an explicit [`PointCloud`].

use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;

/// Errors when building a lattice.
#[derive(Debug, Error, PartialEq)]
pub enum LatticeError {
    #[error("Grid spacing must be a finite, positive number, got {0}")]
    InvalidSpacing(f64),

    #[error("Cell basis must be finite with a finite volume")]
    NonFiniteBasis,

    #[error("Grid of {nx} x {ny} x {nz} nodes is too large to index")]
    TooManyPoints { nx: usize, ny: usize, nz: usize },
}

/// A deterministic, indexable set of sample points inside a cell.
pub trait LatticeProvider {
    /// Number of points in the lattice.
    fn point_count(&self) -> usize;

    /// Position of the point with the given index, `index < point_count()`.
    fn position_at(&self, index: usize) -> Point3<f64>;

    /// Volume of the cell the points sample.
    fn cell_volume(&self) -> f64;
}

/// Uniform grid over the parallelepiped cell spanned by a basis.
#[derive(Debug, Clone)]
pub struct CellGrid {
    basis: Matrix3<f64>,
    /// Columns are the grid steps along each basis vector.
    step: Matrix3<f64>,
    origin: Point3<f64>,
    counts: [usize; 3],
    len: usize,
}

impl CellGrid {
    /// Build a grid over the cell whose edge vectors are the columns of
    /// `basis`, with nodes no further apart than `spacing` along each edge.
    ///
    /// A zero-length basis vector gives no nodes along that edge, and so an
    /// empty grid.
    pub fn new(basis: Matrix3<f64>, spacing: f64) -> Result<Self, LatticeError> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(LatticeError::InvalidSpacing(spacing));
        }
        if basis.iter().any(|v| !v.is_finite()) || !basis.determinant().is_finite() {
            return Err(LatticeError::NonFiniteBasis);
        }

        let mut counts = [0usize; 3];
        let mut step = Matrix3::zeros();
        for k in 0..3 {
            let edge = basis.column(k);
            let length = edge.norm();
            if !length.is_finite() {
                return Err(LatticeError::NonFiniteBasis);
            }
            let nodes = (length / spacing).ceil();
            if nodes >= usize::MAX as f64 {
                counts[k] = usize::MAX;
                let [nx, ny, nz] = counts;
                return Err(LatticeError::TooManyPoints { nx, ny, nz });
            }
            let n = nodes as usize;
            counts[k] = n;
            if n > 0 {
                step.set_column(k, &(edge / n as f64));
            }
        }

        let [nx, ny, nz] = counts;
        let len = nx
            .checked_mul(ny)
            .and_then(|v| v.checked_mul(nz))
            .ok_or(LatticeError::TooManyPoints { nx, ny, nz })?;

        let corner: Vector3<f64> =
            -0.5 * (basis.column(0) + basis.column(1) + basis.column(2));

        log::debug!(
            "Cell grid: {} x {} x {} = {} nodes (spacing {})",
            nx,
            ny,
            nz,
            len,
            spacing
        );

        Ok(Self {
            basis,
            step,
            origin: Point3::from(corner),
            counts,
            len,
        })
    }

    /// Number of nodes along each basis vector.
    pub fn counts(&self) -> [usize; 3] {
        self.counts
    }

    /// Position of the first node, the corner `-(a + b + c) / 2`.
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }
}

impl LatticeProvider for CellGrid {
    fn point_count(&self) -> usize {
        self.len
    }

    fn position_at(&self, index: usize) -> Point3<f64> {
        let [_, ny, nz] = self.counts;
        let iz = index % nz;
        let iy = (index / nz) % ny;
        let ix = index / (ny * nz);
        self.origin + self.step * Vector3::new(ix as f64, iy as f64, iz as f64)
    }

    fn cell_volume(&self) -> f64 {
        self.basis.determinant().abs()
    }
}

/// An explicit list of points standing in for a generated lattice.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    points: Vec<Point3<f64>>,
    volume: f64,
}

impl PointCloud {
    /// Wrap `points`, declaring that they sample a cell of `volume`.
    pub fn new(points: Vec<Point3<f64>>, volume: f64) -> Self {
        Self { points, volume }
    }

    /// The points, in lattice order.
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }
}

impl LatticeProvider for PointCloud {
    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn position_at(&self, index: usize) -> Point3<f64> {
        self.points[index]
    }

    fn cell_volume(&self) -> f64 {
        self.volume
    }
}
