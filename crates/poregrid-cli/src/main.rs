//! Poregrid command-line interface.
//!
//! Writes the grid points of a simulation cell that lie outside a membrane
//! with a conical pore, and estimates the volume of each region:
//! ```sh
//! poregrid cell.txt 1.0 40 10 15 outside.txt
//! poregrid --job job.toml --summary-json summary.json
//! ```
//!
//! Set `RUST_LOG=poregrid_geometry=debug` for grid and progress details.

mod config;
mod runner;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use crate::config::{JobConfig, PoreConfig};

#[derive(Parser)]
#[command(name = "poregrid")]
#[command(about = "Write the grid points outside a membrane pore and estimate region volumes")]
#[command(version)]
struct Cli {
    /// Text file with the cell basis vectors, one 'x y z' per line.
    #[arg(value_name = "systemCellFile")]
    cell_file: Option<PathBuf>,
    /// Target grid spacing.
    #[arg(value_name = "gridSize", allow_negative_numbers = true)]
    grid_size: Option<f64>,
    /// Membrane thickness (full pore length along z).
    #[arg(value_name = "poreLength", allow_negative_numbers = true)]
    pore_length: Option<f64>,
    /// Pore diameter at the membrane mid-plane.
    #[arg(value_name = "poreDiameter", allow_negative_numbers = true)]
    pore_diameter: Option<f64>,
    /// Pore wall taper angle in degrees.
    #[arg(value_name = "poreAngle", allow_negative_numbers = true)]
    pore_angle: Option<f64>,
    /// File receiving the points outside the membrane.
    #[arg(value_name = "outFile")]
    out_file: Option<PathBuf>,

    /// Read the whole job from a TOML file instead of the positional arguments.
    #[arg(
        long,
        conflicts_with_all = [
            "cell_file",
            "grid_size",
            "pore_length",
            "pore_diameter",
            "pore_angle",
            "out_file",
        ]
    )]
    job: Option<PathBuf>,
    /// Also write the run summary as JSON (overrides the job file setting).
    #[arg(long)]
    summary_json: Option<PathBuf>,
    /// Classify points on all cores.
    #[arg(long)]
    parallel: bool,
}

impl Cli {
    /// Build the job from the positional arguments, if all are present.
    fn positional_job(&self) -> Option<JobConfig> {
        Some(JobConfig {
            cell_file: self.cell_file.clone()?,
            grid_size: self.grid_size?,
            pore: PoreConfig {
                length: self.pore_length?,
                diameter: self.pore_diameter?,
                angle: self.pore_angle?,
            },
            output: self.out_file.clone()?,
            summary_json: None,
            parallel: false,
        })
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut job = match &cli.job {
        Some(path) => config::load_config(path)?,
        None => match cli.positional_job() {
            Some(job) => {
                job.validate()?;
                job
            }
            None => {
                println!("{}", Cli::command().render_usage());
                std::process::exit(2);
            }
        },
    };
    if cli.summary_json.is_some() {
        job.summary_json = cli.summary_json.clone();
    }
    job.parallel |= cli.parallel;

    println!("Poregrid");
    println!("========");
    let stats = runner::run_job(&job)?;
    runner::print_summary(&stats);

    if let Some(path) = &job.summary_json {
        runner::write_summary_json(&job, &stats, path)?;
    }
    Ok(())
}
