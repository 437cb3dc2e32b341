//! The per-shard step loop (spec §4.4): at each time step, propagate
//! satellites, rebuild this step's topology, run the chosen algorithm, and
//! write only the entries that changed since the previous step in this
//! shard (a full snapshot at the shard's first step, since `prev` starts
//! `None` there).

use crate::{DynamicStateError, Result};
use chrono::{DateTime, Utc};
use satgen_core::ids::ground_node_id;
use satgen_core::{io, CoreError, IfaceMeta};
use satgen_forwarding::{diff_step, Algorithm, StepContext, StepGeometry};
use satgen_geodesy::{teme_to_ecef, GroundStation};
use satgen_orbit::Satellite;
use satgen_time::{time_steps, Epoch, TimeNs};
use satgen_topology::{ground_station_in_range, IslLayout, IslWeights};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn core_err<E: Into<CoreError>>(e: E) -> DynamicStateError {
    DynamicStateError::Core(e.into())
}

/// Static configuration shared read-only across every shard (spec §5
/// "shared resources": inputs are read-only and may be shared by reference).
pub struct DriverConfig<'a> {
    pub epoch: Epoch,
    pub t_end_ns: TimeNs,
    pub step_ns: TimeNs,
    pub offset_ns: TimeNs,
    pub satellites: &'a [Satellite],
    pub ground_stations: &'a [GroundStation],
    pub isls: &'a [(u32, u32)],
    pub iface_meta: &'a [IfaceMeta],
    pub max_gsl_length_m: f64,
    pub max_isl_length_m: f64,
    pub algorithm: Algorithm,
    pub out_dir: PathBuf,
}

impl<'a> DriverConfig<'a> {
    fn num_satellites(&self) -> u32 {
        self.satellites.len() as u32
    }

    fn num_ground_stations(&self) -> u32 {
        self.ground_stations.len() as u32
    }
}

/// Runs the full time axis on the calling thread, i.e. `K=1` shard
/// (spec §4.4's loop, un-sharded).
pub fn run(config: &DriverConfig<'_>) -> Result<()> {
    run_range(config, config.offset_ns, config.t_end_ns, None)
}

/// Shards `[offset_ns, t_end_ns)` into `num_shards` contiguous, step-aligned
/// sub-ranges and runs each on its own OS thread (spec §4.4 "Parallelization",
/// spec §5 "Scheduling model"). Each shard starts with `prev_output = None`
/// and therefore emits a full snapshot at its own first step.
pub fn run_sharded(config: &DriverConfig<'_>, num_shards: u32) -> Result<()> {
    if num_shards <= 1 {
        return run(config);
    }

    let total_steps = ((config.t_end_ns - config.offset_ns) / config.step_ns).max(0) as u64;
    let shards = num_shards as u64;
    let steps_per_shard = total_steps.div_ceil(shards).max(1);

    let results: Vec<Result<()>> = std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(num_shards as usize);
        for shard in 0..shards {
            let start_step = shard * steps_per_shard;
            if start_step >= total_steps {
                break;
            }
            let end_step = (start_step + steps_per_shard).min(total_steps);
            let start_ns = config.offset_ns + (start_step as i64) * config.step_ns;
            let end_ns = config.offset_ns + (end_step as i64) * config.step_ns;
            handles.push(scope.spawn(move || run_range(config, start_ns, end_ns, Some(shard))));
        }
        handles.into_iter().map(|h| h.join().expect("shard thread panicked")).collect()
    });

    for r in results {
        r?;
    }
    Ok(())
}

/// Runs the half-open step range `[start_ns, end_ns)` on the calling thread,
/// writing delta files into `config.out_dir`. Begins with `prev = None`, so
/// the first step written by this call is always a full snapshot.
///
/// `shard` identifies the calling shard for logging only (`None` for the
/// un-sharded `K=1` case via `run`); it plays no part in the computation.
pub fn run_range(
    config: &DriverConfig<'_>,
    start_ns: TimeNs,
    end_ns: TimeNs,
    shard: Option<u64>,
) -> Result<()> {
    if config.offset_ns % config.step_ns != 0 {
        return Err(DynamicStateError::InvalidInput(format!(
            "offset_ns {} must be a multiple of step_ns {}",
            config.offset_ns, config.step_ns
        )));
    }

    let has_isls = !config.isls.is_empty();
    config
        .algorithm
        .validate_preconditions(
            config.num_satellites(),
            config.num_ground_stations(),
            has_isls,
            config.iface_meta,
        )
        .map_err(core_err)?;

    let isl_layout = IslLayout::build(config.num_satellites(), config.isls);

    std::fs::create_dir_all(&config.out_dir).map_err(|source| {
        core_err(CoreError::IoFailure {
            path: config.out_dir.clone(),
            source,
        })
    })?;

    let total_steps = ((end_ns - start_ns) / config.step_ns).max(0) as u64;
    const PROGRESS_EVERY: u64 = 100;

    let mut prev: Option<StepContext> = None;
    for (step_idx, t) in time_steps(start_ns, end_ns, config.step_ns).enumerate() {
        let current = compute_step(config, &isl_layout, t)?;
        let delta = diff_step(prev.as_ref(), &current);
        write_delta(&config.out_dir, t, config.num_satellites(), &delta)?;
        prev = Some(current);

        if step_idx as u64 % PROGRESS_EVERY == 0 {
            debug!(shard, step_idx, total_steps, t_ns = t, "shard progress");
        }
    }
    info!(shard, start_ns, end_ns, total_steps, "shard complete");
    Ok(())
}

fn compute_step(config: &DriverConfig<'_>, isl_layout: &IslLayout, t_ns: TimeNs) -> Result<StepContext> {
    let t_abs: DateTime<Utc> = config.epoch.plus_ns(t_ns);

    let mut positions_eci = Vec::with_capacity(config.satellites.len());
    for sat in config.satellites {
        let state = sat.position(t_abs).map_err(core_err)?;
        positions_eci.push(state.position_m);
    }

    let isl_weights = IslWeights::compute(config.isls, &positions_eci, config.max_isl_length_m)
        .map_err(core_err)?;

    let positions_ecef: Vec<[f64; 3]> = positions_eci
        .iter()
        .map(|&p| teme_to_ecef(p, t_abs))
        .collect();
    let in_range = ground_station_in_range(config.ground_stations, &positions_ecef, config.max_gsl_length_m);

    let geo = StepGeometry {
        num_satellites: config.num_satellites(),
        num_ground_stations: config.num_ground_stations(),
        isl_layout,
        isl_weights: &isl_weights,
        in_range: &in_range,
        iface_meta: config.iface_meta,
    };
    let (fstate, gsl_bw) = config.algorithm.run(&geo);
    Ok(StepContext { fstate, gsl_bw })
}

fn write_delta(
    out_dir: &Path,
    t_ns: TimeNs,
    num_satellites: u32,
    delta: &satgen_forwarding::StepDelta,
) -> Result<()> {
    if !delta.fstate_changes.is_empty() {
        let path = out_dir.join(format!("fstate_{t_ns}.txt"));
        let mut w = BufWriter::new(File::create(&path).map_err(|source| {
            core_err(CoreError::IoFailure { path: path.clone(), source })
        })?);
        for &(current, dst_gid, entry) in &delta.fstate_changes {
            let dst_node = ground_node_id(num_satellites, dst_gid);
            io::write_fstate_line(&mut w, current, dst_node, &entry)
                .map_err(|source| core_err(CoreError::IoFailure { path: path.clone(), source }))?;
        }
    }

    if !delta.gsl_bw_changes.is_empty() {
        let path = out_dir.join(format!("gsl_if_bandwidth_{t_ns}.txt"));
        let mut w = BufWriter::new(File::create(&path).map_err(|source| {
            core_err(CoreError::IoFailure { path: path.clone(), source })
        })?);
        for &(node, iface, bandwidth) in &delta.gsl_bw_changes {
            io::write_gsl_bandwidth_line(&mut w, node, iface, bandwidth)
                .map_err(|source| core_err(CoreError::IoFailure { path: path.clone(), source }))?;
        }
    }

    Ok(())
}
