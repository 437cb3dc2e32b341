//! `analyze_path` CLI (spec §6): accumulate the forwarding-state trace
//! emitted by `gen_dynamic_state` and reconstruct the path between every
//! ground-station pair at every time step.

use anyhow::{Context, Result};
use clap::Parser;
use satgen_core::ids::ground_node_id;
use satgen_core::io;
use satgen_post_analysis::{accumulate_fstate_up_to, get_path};
use satgen_time::time_steps;
use std::path::PathBuf;

/// Reconstruct ground-station-pair paths over a dynamic-state trace.
#[derive(Parser, Debug)]
#[command(name = "analyze_path")]
struct Args {
    /// Directory containing ground_stations.txt, tles.txt, isls.txt, etc.
    data_dir: PathBuf,
    /// `dynamic_state_<step>ms_for_<dur>s` directory written by `gen_dynamic_state`.
    state_dir: PathBuf,
    /// Time step, milliseconds (must match the trace's own step).
    step_ms: u64,
    /// Total simulation duration, seconds.
    duration_s: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().init();

    let (_epoch, satellites) =
        io::read_tles(&args.data_dir.join("tles.txt")).context("reading tles.txt")?;
    let num_satellites = satellites.len() as u32;
    let ground_stations = io::read_ground_stations_extended(&args.data_dir.join("ground_stations.txt"))
        .context("reading ground_stations.txt")?;
    let num_gs = ground_stations.len() as u32;

    let step_ns = (args.step_ms as i64) * 1_000_000;
    let t_end_ns = (args.duration_s as i64) * 1_000_000_000;

    for t in time_steps(0, t_end_ns, step_ns) {
        let fstate = accumulate_fstate_up_to(&args.state_dir, step_ns, t)
            .with_context(|| format!("accumulating fstate up to t={t}"))?;

        for a in 0..num_gs {
            for b in 0..num_gs {
                if a == b {
                    continue;
                }
                let src = ground_node_id(num_satellites, a);
                let dst = ground_node_id(num_satellites, b);
                match get_path(src, dst, &fstate) {
                    Some(path) => println!("t={t},gs{a}->gs{b},{path:?}"),
                    None => println!("t={t},gs{a}->gs{b},Unreachable"),
                }
            }
        }
    }

    Ok(())
}
