//! Membrane with a conical pore.
//!
//! The membrane is a slab of solid material occupying $|z| \le l$, where
//! $l$ is half the pore length. A pore is cut through it along the z axis;
//! its radius at height $z$ is
//!
//! $$ r(z) = s_0 + m |z| $$
//!
//! with $s_0$ the radius at the mid-plane and $m = \tan\theta$ the wall
//! slope. $m = 0$ gives a straight cylinder; $m > 0$ widens the pore toward
//! both membrane faces.

use nalgebra::Point3;
use thiserror::Error;

/// Errors when building a [`PoreShape`].
#[derive(Debug, Error, PartialEq)]
pub enum PoreError {
    #[error("Pore {name} must be a finite, non-negative number, got {value}")]
    InvalidDimension { name: &'static str, value: f64 },

    #[error("Pore angle must be finite, got {0} degrees")]
    InvalidAngle(f64),
}

/// Shape parameters of the membrane and its pore.
///
/// Built once per run and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoreShape {
    /// Half the membrane thickness along z.
    half_length: f64,
    /// Pore radius at the mid-plane `z = 0`.
    half_diameter: f64,
    /// Growth of the pore radius per unit `|z|`.
    slope: f64,
}

impl PoreShape {
    /// Create a shape directly from its half-extents and wall slope.
    pub fn new(half_length: f64, half_diameter: f64, slope: f64) -> Result<Self, PoreError> {
        if !half_length.is_finite() || half_length < 0.0 {
            return Err(PoreError::InvalidDimension {
                name: "half-length",
                value: half_length,
            });
        }
        if !half_diameter.is_finite() || half_diameter < 0.0 {
            return Err(PoreError::InvalidDimension {
                name: "half-diameter",
                value: half_diameter,
            });
        }
        if !slope.is_finite() {
            return Err(PoreError::InvalidDimension {
                name: "slope",
                value: slope,
            });
        }
        Ok(Self {
            half_length,
            half_diameter,
            slope,
        })
    }

    /// Derive the shape from the full pore length, the mid-plane diameter
    /// and the wall taper angle in degrees.
    pub fn from_dimensions(length: f64, diameter: f64, angle_deg: f64) -> Result<Self, PoreError> {
        if !length.is_finite() || length < 0.0 {
            return Err(PoreError::InvalidDimension {
                name: "length",
                value: length,
            });
        }
        if !diameter.is_finite() || diameter < 0.0 {
            return Err(PoreError::InvalidDimension {
                name: "diameter",
                value: diameter,
            });
        }
        if !angle_deg.is_finite() {
            return Err(PoreError::InvalidAngle(angle_deg));
        }
        Self::new(0.5 * length, 0.5 * diameter, angle_deg.to_radians().tan())
    }

    pub fn half_length(&self) -> f64 {
        self.half_length
    }

    pub fn half_diameter(&self) -> f64 {
        self.half_diameter
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Pore radius at height `z`.
    pub fn radius_at(&self, z: f64) -> f64 {
        self.half_diameter + self.slope * z.abs()
    }

    /// Whether `point` lies in the solid membrane material.
    ///
    /// Same as [`is_in_membrane_wall`].
    pub fn contains_solid(&self, point: &Point3<f64>) -> bool {
        is_in_membrane_wall(point, self)
    }
}

/// Check whether a point lies in the solid material of the membrane.
///
/// Points beyond the slab and points strictly inside the pore are not
/// solid. A point exactly on the pore wall is solid.
pub fn is_in_membrane_wall(point: &Point3<f64>, shape: &PoreShape) -> bool {
    if point.z.abs() > shape.half_length {
        return false;
    }

    let s = (point.x * point.x + point.y * point.y).sqrt();
    if s < shape.radius_at(point.z) {
        return false;
    }

    true
}
