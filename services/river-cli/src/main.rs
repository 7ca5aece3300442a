//! `project-points`: project a pixel cloud file onto a centerline.
//!
//! Writes the projected records to stdout as a JSON array. On failure the
//! error goes to stderr, the exit status is non-zero and stdout stays empty.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use river_core::{project_points, LineGeometry, ProjectionParams};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "project-points")]
#[command(about = "Project SWOT pixel cloud points onto a river centerline")]
struct Args {
    /// Pixel cloud: PIXC NetCDF granule or columnar JSON
    pixel_cloud: PathBuf,

    /// Centerline GeoJSON file
    centerline: PathBuf,

    /// Corridor half-width in metres
    #[arg(allow_negative_numbers = true)]
    buffer_distance: f64,

    /// Station spacing in metres
    #[arg(allow_negative_numbers = true)]
    spacing: f64,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,

    /// Log filter directives; the flag takes precedence over RUST_LOG
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    log_level: String,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = EnvFilter::new(&args.log_level);
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(&args) {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout
                .write_all(output.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
            {
                error!(error = %e, "Failed to write output");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the projection and render the complete output.
fn run(args: &Args) -> Result<String> {
    let params = ProjectionParams::new(args.buffer_distance, args.spacing)?;

    let cloud = pixc_reader::read_point_cloud_file(&args.pixel_cloud)
        .with_context(|| format!("Failed to read pixel cloud {}", args.pixel_cloud.display()))?;
    let geojson = std::fs::read_to_string(&args.centerline)
        .with_context(|| format!("Failed to read centerline {}", args.centerline.display()))?;
    let centerline = LineGeometry::from_geojson_str(&geojson)
        .with_context(|| format!("Invalid centerline {}", args.centerline.display()))?;

    let outcome = project_points(&cloud, &centerline, &params)?;
    info!(
        crs = %outcome.crs,
        input = outcome.input_count,
        clipped = outcome.clipped_count,
        stations = outcome.station_count,
        "Projection completed"
    );

    let output = if args.pretty {
        serde_json::to_string_pretty(&outcome.records)?
    } else {
        serde_json::to_string(&outcome.records)?
    };
    Ok(output)
}
