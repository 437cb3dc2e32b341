//! RTT computation (spec §4.5): for a reconstructed path, query *live*
//! geometry — not the stored edge weight, which may be stale for a
//! ground-station endpoint — and re-validate the ISL/GSL bounds along the
//! way. A violation here means post-analysis is replaying against
//! inconsistent state, which is fatal (spec §7).

use crate::{PostAnalysisError, Result};
use satgen_core::NodeId;
use satgen_geodesy::euclidean_distance_m;
use std::collections::HashSet;

/// Speed of light, m/s (spec §4.5).
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// The declared ISL set, for the membership check a live sat-sat hop must
/// pass (spec §4.5 "sat-sat distances must satisfy the ISL membership and
/// length bound").
#[derive(Debug, Clone)]
pub struct IslSet {
    num_satellites: u32,
    pairs: HashSet<(u32, u32)>,
}

impl IslSet {
    pub fn new(num_satellites: u32, isls: &[(u32, u32)]) -> Self {
        Self {
            num_satellites,
            pairs: isls.iter().copied().collect(),
        }
    }

    fn contains(&self, a: u32, b: u32) -> bool {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.pairs.contains(&(lo, hi))
    }

    fn is_satellite(&self, node: NodeId) -> bool {
        node < self.num_satellites
    }
}

/// Live distance for one path hop `a -> b`, validating membership and
/// length bound by hop kind.
fn hop_distance_m(
    isls: &IslSet,
    sat_positions_m: &[[f64; 3]],
    gs_positions_m: &[[f64; 3]],
    max_isl_length_m: f64,
    max_gsl_length_m: f64,
    a: NodeId,
    b: NodeId,
) -> Result<f64> {
    let n_sat = isls.num_satellites;
    match (isls.is_satellite(a), isls.is_satellite(b)) {
        (true, true) => {
            if !isls.contains(a, b) {
                return Err(PostAnalysisError::GeometryViolation(format!(
                    "path hop ({a},{b}) is not a declared ISL"
                )));
            }
            let d = euclidean_distance_m(sat_positions_m[a as usize], sat_positions_m[b as usize]);
            if d > max_isl_length_m {
                return Err(PostAnalysisError::GeometryViolation(format!(
                    "ISL ({a},{b}) live length {d:.1}m exceeds max_isl_length_m {max_isl_length_m:.1}m"
                )));
            }
            Ok(d)
        }
        (true, false) | (false, true) => {
            let (sat, gs) = if isls.is_satellite(a) { (a, b) } else { (b, a) };
            let gid = (gs - n_sat) as usize;
            let d = euclidean_distance_m(sat_positions_m[sat as usize], gs_positions_m[gid]);
            if d > max_gsl_length_m {
                return Err(PostAnalysisError::GeometryViolation(format!(
                    "GSL ({sat},{gs}) live length {d:.1}m exceeds max_gsl_length_m {max_gsl_length_m:.1}m"
                )));
            }
            Ok(d)
        }
        (false, false) => Err(PostAnalysisError::InvalidInput(format!(
            "path hop {a}->{b} connects two ground stations directly"
        ))),
    }
}

/// Total live length of a path at one instant: sum of consecutive-hop
/// distances.
pub fn path_length_m(
    isls: &IslSet,
    sat_positions_m: &[[f64; 3]],
    gs_positions_m: &[[f64; 3]],
    max_isl_length_m: f64,
    max_gsl_length_m: f64,
    path: &[NodeId],
) -> Result<f64> {
    let mut total = 0.0;
    for hop in path.windows(2) {
        total += hop_distance_m(
            isls,
            sat_positions_m,
            gs_positions_m,
            max_isl_length_m,
            max_gsl_length_m,
            hop[0],
            hop[1],
        )?;
    }
    Ok(total)
}

/// RTT in nanoseconds for a bidirectional exchange: sum of the forward and
/// reverse path lengths, divided by the speed of light (spec §4.5).
pub fn rtt_ns(
    isls: &IslSet,
    sat_positions_m: &[[f64; 3]],
    gs_positions_m: &[[f64; 3]],
    max_isl_length_m: f64,
    max_gsl_length_m: f64,
    forward_path: &[NodeId],
    reverse_path: &[NodeId],
) -> Result<f64> {
    let fwd = path_length_m(isls, sat_positions_m, gs_positions_m, max_isl_length_m, max_gsl_length_m, forward_path)?;
    let bwd = path_length_m(isls, sat_positions_m, gs_positions_m, max_isl_length_m, max_gsl_length_m, reverse_path)?;
    Ok((fwd + bwd) / SPEED_OF_LIGHT_M_S * 1e9)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_sat_sat_hop_not_in_isl_list() {
        let isls = IslSet::new(2, &[]);
        let sats = vec![[0.0, 0.0, 0.0], [1_000.0, 0.0, 0.0]];
        let gs: Vec<[f64; 3]> = vec![];
        let err = path_length_m(&isls, &sats, &gs, 5_000_000.0, 1_000_000.0, &[0, 1]);
        assert!(matches!(err, Err(PostAnalysisError::GeometryViolation(_))));
    }

    #[test]
    fn rejects_isl_exceeding_live_length_bound() {
        let isls = IslSet::new(2, &[(0, 1)]);
        let sats = vec![[0.0, 0.0, 0.0], [10_000_000.0, 0.0, 0.0]];
        let gs: Vec<[f64; 3]> = vec![];
        let err = path_length_m(&isls, &sats, &gs, 5_000_000.0, 1_000_000.0, &[0, 1]);
        assert!(matches!(err, Err(PostAnalysisError::GeometryViolation(_))));
    }

    #[test]
    fn computes_rtt_for_a_one_hop_gsl_round_trip() {
        let isls = IslSet::new(1, &[]);
        let sats = vec![[0.0, 0.0, 0.0]];
        let gs = vec![[1_000_000.0, 0.0, 0.0]];
        let path = [0u32, 1u32];
        let rtt = rtt_ns(&isls, &sats, &gs, 5_000_000.0, 2_000_000.0, &path, &[1, 0]).unwrap();
        // 2 * 1,000,000m each way = 4,000,000m total / c * 1e9.
        let expected = 4_000_000.0 / SPEED_OF_LIGHT_M_S * 1e9;
        assert!((rtt - expected).abs() < 1e-6);
    }
}
