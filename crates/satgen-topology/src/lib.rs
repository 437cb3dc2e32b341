//! Per-time-step network assembly (spec §4.2): ISL edge weights with a
//! fatal length bound, per-ground-station visible-satellite lists, and the
//! combined ISL+GSL graph the ground-station-relaying algorithms run over.
//!
//! The stable part — which interface index a satellite uses for which ISL
//! neighbor — is computed once from the static ISL list and never revisited
//! per step (spec §3 interface layout invariant; spec §9 open question 1
//! rejects the legacy per-step re-derivation in favor of this).

use satgen_core::{GroundId, IfaceIdx, NodeId, SatId};
use satgen_geodesy::{euclidean_distance_m, GroundStation};
use std::collections::HashMap;
use thiserror::Error;

pub mod generate;
pub mod layout;

pub use layout::IslLayout;

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("ISL ({a},{b}) length {distance_m:.1}m exceeds max_isl_length_m {max_m:.1}m")]
    IslTooLong {
        a: SatId,
        b: SatId,
        distance_m: f64,
        max_m: f64,
    },
    #[error("invalid topology input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, TopologyError>;

impl From<TopologyError> for satgen_core::CoreError {
    fn from(e: TopologyError) -> Self {
        match e {
            TopologyError::IslTooLong { .. } => satgen_core::CoreError::GeometryViolation(e.to_string()),
            TopologyError::InvalidInput(msg) => satgen_core::CoreError::InvalidInput(msg),
        }
    }
}

fn normalize(a: SatId, b: SatId) -> (SatId, SatId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// The ISL-only graph at a single time step: static adjacency from
/// `IslLayout`, plus this step's edge weights. Panics-free: weights that
/// exceed `max_isl_length_m` are reported as an `Err` before the graph is
/// handed to a shortest-path computation (spec invariant 1).
#[derive(Debug, Clone)]
pub struct IslWeights {
    weights: HashMap<(SatId, SatId), f64>,
}

impl IslWeights {
    /// Recompute every declared ISL's length from current satellite
    /// positions (ECI is sufficient — sat-sat distance is frame-invariant
    /// under a shared rigid rotation). Fatal if any exceeds `max_isl_length_m`.
    pub fn compute(
        isls: &[(SatId, SatId)],
        positions_eci_m: &[[f64; 3]],
        max_isl_length_m: f64,
    ) -> Result<Self> {
        let mut weights = HashMap::with_capacity(isls.len());
        for &(a, b) in isls {
            let dist = euclidean_distance_m(positions_eci_m[a as usize], positions_eci_m[b as usize]);
            if dist > max_isl_length_m {
                return Err(TopologyError::IslTooLong {
                    a,
                    b,
                    distance_m: dist,
                    max_m: max_isl_length_m,
                });
            }
            weights.insert((a, b), dist);
        }
        Ok(Self { weights })
    }

    /// Current length of the declared ISL `(a,b)` (either order).
    pub fn weight(&self, a: SatId, b: SatId) -> f64 {
        self.weights[&normalize(a, b)]
    }
}

/// Satellites within `max_gsl_length_m` of ground station `g`, in ascending
/// `SatId` order (spec §4.2 step 2: "order unspecified prior to algorithm
/// consumption" — ascending id order is the deterministic choice that keeps
/// every tie-break reproducible).
pub fn in_range_satellites(
    gs: &GroundStation,
    satellite_positions_ecef_m: &[[f64; 3]],
    max_gsl_length_m: f64,
) -> Vec<(f64, SatId)> {
    let mut out = Vec::new();
    for (sid, pos) in satellite_positions_ecef_m.iter().enumerate() {
        let dist = euclidean_distance_m(gs.ecef_xyz_m, *pos);
        if dist <= max_gsl_length_m {
            out.push((dist, sid as SatId));
        }
    }
    out
}

/// `in_range_satellites` for every ground station, indexed by `GroundId`.
pub fn ground_station_in_range(
    ground_stations: &[GroundStation],
    satellite_positions_ecef_m: &[[f64; 3]],
    max_gsl_length_m: f64,
) -> Vec<Vec<(f64, SatId)>> {
    ground_stations
        .iter()
        .map(|gs| in_range_satellites(gs, satellite_positions_ecef_m, max_gsl_length_m))
        .collect()
}

/// The combined ISL+GSL graph over the unified `NodeId` space, for the
/// ground-station-relaying primitive (spec §4.3 Primitive B). Built fresh
/// each step from this step's `IslWeights` and in-range lists; carries no
/// structural state beyond adjacency, since the combined graph's shape can
/// legitimately vary step to step (unlike the ISL interface layout).
#[derive(Debug, Clone)]
pub struct CombinedGraph {
    num_satellites: u32,
    /// Adjacency per node: `(neighbor, weight)`.
    adjacency: Vec<Vec<(NodeId, f64)>>,
}

impl CombinedGraph {
    pub fn build(
        num_satellites: u32,
        num_ground_stations: u32,
        isl_layout: &IslLayout,
        isl_weights: &IslWeights,
        in_range: &[Vec<(f64, SatId)>],
    ) -> Self {
        let total = (num_satellites + num_ground_stations) as usize;
        let mut adjacency = vec![Vec::new(); total];

        for sat in 0..num_satellites {
            for &neighbor in isl_layout.neighbors(sat) {
                let w = isl_weights.weight(sat, neighbor);
                adjacency[sat as usize].push((neighbor, w));
            }
        }

        for (gid, entries) in in_range.iter().enumerate() {
            let gs_node = satgen_core::ids::ground_node_id(num_satellites, gid as GroundId);
            for &(dist, sid) in entries {
                adjacency[sid as usize].push((gs_node, dist));
                adjacency[gs_node as usize].push((sid, dist));
            }
        }

        Self {
            num_satellites,
            adjacency,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, f64)] {
        &self.adjacency[node as usize]
    }

    pub fn is_satellite(&self, node: NodeId) -> bool {
        node < self.num_satellites
    }
}
