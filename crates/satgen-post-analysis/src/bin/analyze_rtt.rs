//! `analyze_rtt` CLI (spec §6): replay the forwarding-state trace against
//! live geometry, compute per-ground-station-pair RTT/hop-count series, and
//! emit ECDF files plus top-k reports (spec §4.5) under
//! `<state_dir>/analysis/`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use satgen_core::config::PropertiesConfig;
use satgen_core::ids::ground_node_id;
use satgen_core::io;
use satgen_geodesy::{geodesic_distance_m, straight_distance_from_geodesic_m, teme_to_ecef};
use satgen_post_analysis::{accumulate_fstate_up_to, get_path, rtt_ns, top_k_deduped, write_ecdf_file, IslSet, PairMetric, SPEED_OF_LIGHT_M_S};
use satgen_time::time_steps;
use std::collections::{HashMap, HashSet};
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Compute RTT/path-change ECDFs and top-k reports over a dynamic-state trace.
#[derive(Parser, Debug)]
#[command(name = "analyze_rtt")]
struct Args {
    /// Directory containing ground_stations.txt, tles.txt, isls.txt, description.txt.
    data_dir: PathBuf,
    /// `dynamic_state_<step>ms_for_<dur>s` directory written by `gen_dynamic_state`.
    state_dir: PathBuf,
    /// Time step, milliseconds (must match the trace's own step).
    step_ms: u64,
    /// Total simulation duration, seconds.
    duration_s: u64,
}

/// Every ground-station-pair≥500km threshold for slowdown ECDF inclusion
/// (spec §4.5).
const SLOWDOWN_GEODESIC_THRESHOLD_M: f64 = 500_000.0;

#[derive(Default)]
struct PairSeries {
    rtts_ns: Vec<f64>,
    hop_counts: Vec<usize>,
    distinct_paths: HashSet<Vec<u32>>,
    unreachable_count: u32,
    change_count: u32,
    last_path: Option<Vec<u32>>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().init();

    let (epoch, satellites) =
        io::read_tles(&args.data_dir.join("tles.txt")).context("reading tles.txt")?;
    let num_satellites = satellites.len() as u32;
    let ground_stations = io::read_ground_stations_extended(&args.data_dir.join("ground_stations.txt"))
        .context("reading ground_stations.txt")?;
    let isls = io::read_isls(&args.data_dir.join("isls.txt"), num_satellites).context("reading isls.txt")?;
    let description = PropertiesConfig::read(&args.data_dir.join("description.txt"))
        .context("reading description.txt")?;
    let max_gsl_length_m = description.parse_positive_float("max_gsl_length_m")?;
    let max_isl_length_m = description.parse_positive_float("max_isl_length_m")?;

    let isl_set = IslSet::new(num_satellites, &isls);
    let num_gs = ground_stations.len() as u32;
    let step_ns = (args.step_ms as i64) * 1_000_000;
    let t_end_ns = (args.duration_s as i64) * 1_000_000_000;

    let mut series: HashMap<(u32, u32), PairSeries> = HashMap::new();
    let mut path_changes_per_step = Vec::new();
    let mut fstate_updates_per_step = Vec::new();

    for t in time_steps(0, t_end_ns, step_ns) {
        let t_abs: DateTime<Utc> = epoch.plus_ns(t);

        let mut sat_positions_ecef = Vec::with_capacity(satellites.len());
        for sat in &satellites {
            let state = sat.position(t_abs).with_context(|| format!("propagating at t={t}"))?;
            sat_positions_ecef.push(teme_to_ecef(state.position_m, t_abs));
        }
        let gs_positions: Vec<[f64; 3]> = ground_stations.iter().map(|g| g.ecef_xyz_m).collect();

        let fstate = accumulate_fstate_up_to(&args.state_dir, step_ns, t)
            .with_context(|| format!("accumulating fstate up to t={t}"))?;

        let delta_path = args.state_dir.join(format!("fstate_{t}.txt"));
        let update_count = if delta_path.exists() {
            std::fs::read_to_string(&delta_path)?.lines().count()
        } else {
            0
        };
        fstate_updates_per_step.push(update_count as f64);

        let mut changes_this_step = 0u32;
        for a in 0..num_gs {
            for b in 0..num_gs {
                if a == b {
                    continue;
                }
                let src = ground_node_id(num_satellites, a);
                let dst = ground_node_id(num_satellites, b);
                let fwd = get_path(src, dst, &fstate);
                let bwd = get_path(dst, src, &fstate);
                let entry = series.entry((a, b)).or_default();

                match (&fwd, &bwd) {
                    (Some(fp), Some(bp)) => {
                        let rtt = rtt_ns(
                            &isl_set,
                            &sat_positions_ecef,
                            &gs_positions,
                            max_isl_length_m,
                            max_gsl_length_m,
                            fp,
                            bp,
                        )
                        .with_context(|| format!("computing RTT for gs{a}->gs{b} at t={t}"))?;
                        entry.rtts_ns.push(rtt);
                        entry.hop_counts.push(fp.len() - 1);
                        entry.distinct_paths.insert(fp.clone());
                    }
                    _ => entry.unreachable_count += 1,
                }

                if let Some(fp) = &fwd {
                    let changed = entry.last_path.as_ref() != Some(fp);
                    if changed {
                        entry.change_count += 1;
                        if a < b {
                            changes_this_step += 1;
                        }
                        entry.last_path = Some(fp.clone());
                    }
                }
            }
        }
        path_changes_per_step.push(changes_this_step as f64);
    }

    let out_dir = args.state_dir.join("analysis");
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {out_dir:?}"))?;

    write_aggregate_outputs(&out_dir, &ground_stations, &series)?;
    write_ecdf_file(&out_dir.join("ecdf_path_changes_per_step.txt"), &path_changes_per_step)?;
    write_ecdf_file(&out_dir.join("ecdf_fstate_updates_per_step.txt"), &fstate_updates_per_step)?;

    Ok(())
}

fn write_aggregate_outputs(
    out_dir: &Path,
    ground_stations: &[satgen_geodesy::GroundStation],
    series: &HashMap<(u32, u32), PairSeries>,
) -> Result<()> {
    let mut min_rtt = Vec::new();
    let mut max_rtt = Vec::new();
    let mut rtt_range = Vec::new();
    let mut rtt_ratio = Vec::new();
    let mut slowdown = Vec::new();
    let mut num_distinct_paths = Vec::new();
    let mut hop_range = Vec::new();
    let mut hop_ratio = Vec::new();

    let mut rtt_delta_metrics = Vec::new();
    let mut hop_delta_metrics = Vec::new();
    let mut unreachable_metrics = Vec::new();
    let mut path_change_metrics = Vec::new();

    for (&(a, b), s) in series {
        unreachable_metrics.push(PairMetric { a, b, value: s.unreachable_count as f64 });
        path_change_metrics.push(PairMetric { a, b, value: s.change_count as f64 });

        if s.rtts_ns.is_empty() {
            continue;
        }
        let lo = s.rtts_ns.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = s.rtts_ns.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        min_rtt.push(lo);
        max_rtt.push(hi);
        rtt_range.push(hi - lo);
        rtt_ratio.push(if lo > 0.0 { hi / lo } else { f64::INFINITY });
        rtt_delta_metrics.push(PairMetric { a, b, value: hi - lo });

        let geodesic_m = geodesic_distance_m(&ground_stations[a as usize], &ground_stations[b as usize]);
        if geodesic_m >= SLOWDOWN_GEODESIC_THRESHOLD_M {
            let geodesic_rtt_ns =
                2.0 * straight_distance_from_geodesic_m(geodesic_m) / SPEED_OF_LIGHT_M_S * 1e9;
            if geodesic_rtt_ns > 0.0 {
                slowdown.push(hi / geodesic_rtt_ns);
            }
        }

        num_distinct_paths.push(s.distinct_paths.len() as f64);
        let hop_lo = *s.hop_counts.iter().min().expect("non-empty rtt series has hop counts") as f64;
        let hop_hi = *s.hop_counts.iter().max().expect("non-empty rtt series has hop counts") as f64;
        hop_range.push(hop_hi - hop_lo);
        hop_ratio.push(if hop_lo > 0.0 { hop_hi / hop_lo } else { f64::INFINITY });
        hop_delta_metrics.push(PairMetric { a, b, value: hop_hi - hop_lo });
    }

    write_ecdf_file(&out_dir.join("ecdf_rtt_min.txt"), &min_rtt)?;
    write_ecdf_file(&out_dir.join("ecdf_rtt_max.txt"), &max_rtt)?;
    write_ecdf_file(&out_dir.join("ecdf_rtt_range.txt"), &rtt_range)?;
    write_ecdf_file(&out_dir.join("ecdf_rtt_ratio.txt"), &rtt_ratio)?;
    write_ecdf_file(&out_dir.join("ecdf_rtt_slowdown.txt"), &slowdown)?;
    write_ecdf_file(&out_dir.join("ecdf_num_distinct_paths.txt"), &num_distinct_paths)?;
    write_ecdf_file(&out_dir.join("ecdf_hop_count_range.txt"), &hop_range)?;
    write_ecdf_file(&out_dir.join("ecdf_hop_count_ratio.txt"), &hop_ratio)?;

    write_top_k_report(&out_dir.join("top10_largest_rtt_delta.txt"), rtt_delta_metrics)?;
    write_top_k_report(&out_dir.join("top10_largest_hop_count_delta.txt"), hop_delta_metrics)?;
    write_top_k_report(&out_dir.join("top10_most_unreachable.txt"), unreachable_metrics)?;
    write_top_k_report(&out_dir.join("top10_most_path_changes.txt"), path_change_metrics)?;

    Ok(())
}

fn write_top_k_report(path: &Path, metrics: Vec<PairMetric>) -> Result<()> {
    let top = top_k_deduped(metrics, 10);
    let mut f = std::fs::File::create(path)?;
    for m in top {
        writeln!(f, "{},{},{}", m.a, m.b, m.value)?;
    }
    Ok(())
}
