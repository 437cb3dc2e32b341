//! Accumulating `fstate` across a dynamic-state output directory's delta
//! files (spec §4.5: "Accumulate deltas across time-step files to get the
//! full table at time t").

use crate::path::Fstate;
use satgen_core::io::read_fstate_delta_into;
use satgen_core::CoreError;
use satgen_time::TimeNs;
use std::path::Path;

/// Reads every `fstate_<t_ns>.txt` that exists for `t` in `0, step_ns,
/// 2*step_ns, …, t_ns`, merging deltas in increasing time order. A step
/// with no file contributed no change and is simply skipped — this is
/// exactly why invariant 5 holds regardless of which steps a sharded run
/// happened to emit a file for.
pub fn accumulate_fstate_up_to(
    state_dir: &Path,
    step_ns: TimeNs,
    t_ns: TimeNs,
) -> Result<Fstate, CoreError> {
    let mut fstate = Fstate::new();
    let mut t = 0;
    while t <= t_ns {
        let path = state_dir.join(format!("fstate_{t}.txt"));
        if path.exists() {
            read_fstate_delta_into(&path, &mut fstate)?;
        }
        t += step_ns;
    }
    Ok(fstate)
}
