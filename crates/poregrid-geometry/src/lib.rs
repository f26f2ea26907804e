//! # Poregrid Geometry
//!
//! Sampling of a membrane with a conical pore. This crate provides:
//!
//! - **Cell files** ([`cell`]): Load the three basis vectors of a
//!   simulation cell.
//! - **Lattices** ([`lattice`]): The [`LatticeProvider`] trait and a
//!   uniform grid over an arbitrary, possibly skewed, cell.
//! - **Pore classification** ([`pore`]): Decide whether a point lies in
//!   the solid membrane material.
//! - **Scanning** ([`scan`]): Stream the points outside the membrane and
//!   estimate the volume of each region.

pub mod cell;
pub mod lattice;
pub mod pore;
pub mod scan;

pub use lattice::{CellGrid, LatticeError, LatticeProvider, PointCloud};
pub use pore::{is_in_membrane_wall, PoreError, PoreShape};
pub use scan::{
    run_scan, run_scan_parallel, PointSink, PointWriter, RunStatistics, ScanError, Tally,
};
