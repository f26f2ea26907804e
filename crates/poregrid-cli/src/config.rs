//! Job configuration, from command-line arguments or a TOML file.

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

/// Top-level job configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// File holding the three cell basis vectors.
    pub cell_file: PathBuf,
    /// Target lattice spacing.
    pub grid_size: f64,
    pub pore: PoreConfig,
    /// File receiving the points outside the membrane.
    pub output: PathBuf,
    /// Optional JSON copy of the run summary.
    #[serde(default)]
    pub summary_json: Option<PathBuf>,
    /// Classify points on all cores.
    #[serde(default)]
    pub parallel: bool,
}

/// Membrane and pore dimensions from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoreConfig {
    /// Membrane thickness, i.e. full pore length along z.
    pub length: f64,
    /// Pore diameter at the membrane mid-plane.
    pub diameter: f64,
    /// Wall taper angle in degrees (default: 0, a straight pore).
    #[serde(default)]
    pub angle: f64,
}

impl JobConfig {
    /// Check the numeric inputs before any work is done.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.grid_size.is_finite() && self.grid_size > 0.0,
            "gridSize must be a positive number, got {}",
            self.grid_size
        );
        ensure!(
            self.pore.length.is_finite() && self.pore.length >= 0.0,
            "poreLength must be a non-negative number, got {}",
            self.pore.length
        );
        ensure!(
            self.pore.diameter.is_finite() && self.pore.diameter >= 0.0,
            "poreDiameter must be a non-negative number, got {}",
            self.pore.diameter
        );
        ensure!(
            self.pore.angle.is_finite(),
            "poreAngle must be a finite number of degrees, got {}",
            self.pore.angle
        );
        Ok(())
    }
}

/// Load, parse and validate a TOML job file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {}", path.display()))?;
    let config: JobConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid job file {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
