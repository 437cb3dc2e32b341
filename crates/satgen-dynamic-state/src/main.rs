//! `gen_dynamic_state` CLI: parses the five on-disk input formats (spec §6),
//! drives the time axis, and writes `dynamic_state_<step>ms_for_<dur>s/`
//! (spec §6 output naming) under the requested output directory.

use anyhow::{Context, Result};
use clap::Parser;
use satgen_core::config::PropertiesConfig;
use satgen_core::io;
use satgen_dynamic_state::{run_sharded, DriverConfig};
use satgen_forwarding::Algorithm;
use std::path::PathBuf;
use tracing::info;

/// Generate per-time-step forwarding state and GSL bandwidth deltas.
#[derive(Parser, Debug)]
#[command(name = "gen_dynamic_state", about = "Dynamic forwarding-state generator")]
struct Args {
    /// Directory containing ground_stations.txt, tles.txt, isls.txt,
    /// gsl_interfaces_info.txt, description.txt.
    #[arg(long)]
    data_dir: PathBuf,

    /// Directory the dynamic_state_<step>ms_for_<dur>s output folder is
    /// created under.
    #[arg(long)]
    output_dir: PathBuf,

    /// One of: free_one_only_over_isls, free_gs_one_sat_many_only_over_isls,
    /// free_one_only_gs_relays, paired_many_only_over_isls.
    #[arg(long)]
    algorithm: String,

    /// Time step, milliseconds.
    #[arg(long, default_value_t = 1000)]
    step_ms: u64,

    /// Total simulation duration, seconds.
    #[arg(long, default_value_t = 200)]
    duration_s: u64,

    /// Start offset, milliseconds. Must be a multiple of `step_ms`.
    #[arg(long, default_value_t = 0)]
    offset_ms: u64,

    /// Number of time-axis shards to run in parallel.
    #[arg(long, default_value_t = 1)]
    threads: u32,

    /// Enable debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let (epoch, satellites) = io::read_tles(&args.data_dir.join("tles.txt"))
        .with_context(|| "reading tles.txt")?;
    let num_satellites = satellites.len() as u32;

    let ground_stations = io::read_ground_stations_extended(&args.data_dir.join("ground_stations.txt"))
        .with_context(|| "reading ground_stations.txt")?;
    let isls = io::read_isls(&args.data_dir.join("isls.txt"), num_satellites)
        .with_context(|| "reading isls.txt")?;
    let iface_meta = io::read_gsl_interfaces_info(
        &args.data_dir.join("gsl_interfaces_info.txt"),
        num_satellites,
        ground_stations.len() as u32,
    )
    .with_context(|| "reading gsl_interfaces_info.txt")?;
    let description = PropertiesConfig::read(&args.data_dir.join("description.txt"))
        .with_context(|| "reading description.txt")?;
    let max_gsl_length_m = description.parse_positive_float("max_gsl_length_m")?;
    let max_isl_length_m = description.parse_positive_float("max_isl_length_m")?;

    let algorithm = Algorithm::from_name(&args.algorithm)?;

    let step_ns = (args.step_ms as i64) * 1_000_000;
    let t_end_ns = (args.duration_s as i64) * 1_000_000_000;
    let offset_ns = (args.offset_ms as i64) * 1_000_000;

    let out_dir = args.output_dir.join(format!(
        "dynamic_state_{}ms_for_{}s",
        args.step_ms, args.duration_s
    ));

    let config = DriverConfig {
        epoch,
        t_end_ns,
        step_ns,
        offset_ns,
        satellites: &satellites,
        ground_stations: &ground_stations,
        isls: &isls,
        iface_meta: &iface_meta,
        max_gsl_length_m,
        max_isl_length_m,
        algorithm,
        out_dir: out_dir.clone(),
    };

    info!(?out_dir, threads = args.threads, algorithm = algorithm.name(), "starting dynamic-state generation");
    run_sharded(&config, args.threads)?;
    info!("dynamic-state generation complete");

    Ok(())
}
