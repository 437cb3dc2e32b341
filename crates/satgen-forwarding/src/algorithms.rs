//! The four closed-set forwarding algorithms (spec §4.2), each a thin
//! wrapper over [`primitive_a`]/[`primitive_b`] that supplies the GSL
//! interface mapping and bandwidth-assignment rule its precondition allows.

use crate::dense::{ForwardingTable, GslBandwidthTable};
use crate::floyd_warshall::floyd_warshall;
use crate::primitives::{primitive_a, primitive_b};
use crate::ForwardingError;
use satgen_core::{ids::ground_node_id, IfaceMeta, SatId};
use satgen_topology::{CombinedGraph, IslLayout, IslWeights};

/// Everything a single time step's forwarding computation needs, independent
/// of which algorithm is running.
pub struct StepGeometry<'a> {
    pub num_satellites: u32,
    pub num_ground_stations: u32,
    pub isl_layout: &'a IslLayout,
    pub isl_weights: &'a IslWeights,
    pub in_range: &'a [Vec<(f64, SatId)>],
    pub iface_meta: &'a [IfaceMeta],
}

/// One of the four named forwarding policies (spec §4.2). Each binds the
/// shared GSL capacity differently and restricts which satellite(s) a
/// ground station may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    FreeOneOnlyOverIsls,
    FreeGsOneSatManyOnlyOverIsls,
    FreeOneOnlyGsRelays,
    PairedManyOnlyOverIsls,
}

impl Algorithm {
    pub fn from_name(name: &str) -> Result<Self, ForwardingError> {
        match name {
            "free_one_only_over_isls" => Ok(Self::FreeOneOnlyOverIsls),
            "free_gs_one_sat_many_only_over_isls" => Ok(Self::FreeGsOneSatManyOnlyOverIsls),
            "free_one_only_gs_relays" => Ok(Self::FreeOneOnlyGsRelays),
            "paired_many_only_over_isls" => Ok(Self::PairedManyOnlyOverIsls),
            other => Err(ForwardingError::AlgorithmMismatch(format!("unknown algorithm \"{other}\""))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FreeOneOnlyOverIsls => "free_one_only_over_isls",
            Self::FreeGsOneSatManyOnlyOverIsls => "free_gs_one_sat_many_only_over_isls",
            Self::FreeOneOnlyGsRelays => "free_one_only_gs_relays",
            Self::PairedManyOnlyOverIsls => "paired_many_only_over_isls",
        }
    }

    /// Checks the interface-count/bandwidth shape every algorithm fixes as a
    /// precondition (spec §4.2), returning `AlgorithmMismatch` on the first
    /// violation found. `has_isls` is whether the constellation declares any
    /// ISL at all (not just whether `num_isls(sat) > 0` for this satellite).
    pub fn validate_preconditions(
        &self,
        num_satellites: u32,
        num_ground_stations: u32,
        has_isls: bool,
        iface_meta: &[IfaceMeta],
    ) -> Result<(), ForwardingError> {
        let gs_iface_count = |gid: u32| iface_meta[(num_satellites + gid) as usize].interface_count;
        let gs_bandwidth = |gid: u32| iface_meta[(num_satellites + gid) as usize].aggregate_max_bandwidth;
        let exactly = |got: f64, want: f64| (got - want).abs() <= f64::EPSILON;

        match self {
            Self::FreeOneOnlyOverIsls => {
                if !has_isls {
                    return Err(ForwardingError::AlgorithmMismatch(
                        "free_one_only_over_isls requires a non-empty ISL graph".into(),
                    ));
                }
                for sid in 0..num_satellites {
                    let got = iface_meta[sid as usize].interface_count;
                    if got != 1 {
                        return Err(ForwardingError::AlgorithmMismatch(format!(
                            "satellite {sid} must have exactly 1 GSL interface, got {got}"
                        )));
                    }
                }
                for gid in 0..num_ground_stations {
                    if gs_iface_count(gid) != 1 {
                        return Err(ForwardingError::AlgorithmMismatch(format!(
                            "ground station {gid} must have exactly 1 interface"
                        )));
                    }
                }
                Ok(())
            }
            Self::FreeGsOneSatManyOnlyOverIsls => {
                if !has_isls {
                    return Err(ForwardingError::AlgorithmMismatch(
                        "free_gs_one_sat_many_only_over_isls requires a non-empty ISL graph".into(),
                    ));
                }
                for sid in 0..num_satellites {
                    let meta = &iface_meta[sid as usize];
                    if meta.interface_count != num_ground_stations {
                        return Err(ForwardingError::AlgorithmMismatch(format!(
                            "satellite {sid} must have exactly {num_ground_stations} GSL interfaces (one per ground station), got {}",
                            meta.interface_count
                        )));
                    }
                    if !exactly(meta.aggregate_max_bandwidth, num_ground_stations as f64) {
                        return Err(ForwardingError::AlgorithmMismatch(format!(
                            "satellite {sid} aggregate bandwidth must be exactly {num_ground_stations}.0"
                        )));
                    }
                }
                for gid in 0..num_ground_stations {
                    if gs_iface_count(gid) != 1 {
                        return Err(ForwardingError::AlgorithmMismatch(format!(
                            "ground station {gid} must have exactly 1 interface"
                        )));
                    }
                    if !exactly(gs_bandwidth(gid), 1.0) {
                        return Err(ForwardingError::AlgorithmMismatch(format!(
                            "ground station {gid} aggregate bandwidth must be exactly 1.0"
                        )));
                    }
                }
                Ok(())
            }
            Self::FreeOneOnlyGsRelays => {
                if has_isls {
                    return Err(ForwardingError::AlgorithmMismatch(
                        "free_one_only_gs_relays forbids any satellite ISL".into(),
                    ));
                }
                for sid in 0..num_satellites {
                    if iface_meta[sid as usize].interface_count != 1 {
                        return Err(ForwardingError::AlgorithmMismatch(format!(
                            "satellite {sid} must have exactly 1 (GSL-only) interface"
                        )));
                    }
                }
                for gid in 0..num_ground_stations {
                    if gs_iface_count(gid) != 1 {
                        return Err(ForwardingError::AlgorithmMismatch(format!(
                            "ground station {gid} must have exactly 1 interface"
                        )));
                    }
                }
                Ok(())
            }
            Self::PairedManyOnlyOverIsls => {
                if !has_isls {
                    return Err(ForwardingError::AlgorithmMismatch(
                        "paired_many_only_over_isls requires a non-empty ISL graph".into(),
                    ));
                }
                for sid in 0..num_satellites {
                    let meta = &iface_meta[sid as usize];
                    if meta.interface_count != num_ground_stations {
                        return Err(ForwardingError::AlgorithmMismatch(format!(
                            "satellite {sid} must have exactly {num_ground_stations} GSL interfaces (one per ground station), got {}",
                            meta.interface_count
                        )));
                    }
                    if !exactly(meta.aggregate_max_bandwidth, 1.0) {
                        return Err(ForwardingError::AlgorithmMismatch(format!(
                            "satellite {sid} aggregate bandwidth must be exactly 1.0"
                        )));
                    }
                }
                for gid in 0..num_ground_stations {
                    if gs_iface_count(gid) != 1 {
                        return Err(ForwardingError::AlgorithmMismatch(format!(
                            "ground station {gid} must have exactly 1 interface"
                        )));
                    }
                    if !exactly(gs_bandwidth(gid), 1.0) {
                        return Err(ForwardingError::AlgorithmMismatch(format!(
                            "ground station {gid} aggregate bandwidth must be exactly 1.0"
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    /// Computes this step's forwarding table and GSL bandwidth assignment.
    /// Callers validate preconditions once up front (they don't change
    /// across steps) and call this every step with fresh geometry.
    pub fn run(&self, geo: &StepGeometry) -> (ForwardingTable, GslBandwidthTable) {
        match self {
            Self::FreeOneOnlyOverIsls => free_one_only_over_isls(geo),
            Self::FreeGsOneSatManyOnlyOverIsls => free_gs_one_sat_many_only_over_isls(geo),
            Self::FreeOneOnlyGsRelays => free_one_only_gs_relays(geo),
            Self::PairedManyOnlyOverIsls => paired_many_only_over_isls(geo),
        }
    }
}

fn isl_only_dist(geo: &StepGeometry) -> crate::floyd_warshall::DistMatrix {
    floyd_warshall(geo.num_satellites as usize, |u| {
        geo.isl_layout
            .neighbors(u)
            .iter()
            .map(|&v| (v, geo.isl_weights.weight(u, v)))
            .collect()
    })
}

/// Total interface count per node in the same global numbering forwarding
/// entries use: a satellite's ISL interfaces occupy `[0, num_isls)`, its GSL
/// interfaces start right after.
fn global_iface_counts(geo: &StepGeometry) -> Vec<u32> {
    (0..geo.num_satellites)
        .map(|sid| geo.isl_layout.num_isls(sid) + geo.iface_meta[sid as usize].interface_count)
        .chain((0..geo.num_ground_stations).map(|gid| {
            geo.iface_meta[ground_node_id(geo.num_satellites, gid) as usize].interface_count
        }))
        .collect()
}

/// Every node's entire aggregate bandwidth sits on its one GSL interface.
fn uniform_bandwidth(geo: &StepGeometry) -> GslBandwidthTable {
    let mut bw = GslBandwidthTable::new(&global_iface_counts(geo));
    for sid in 0..geo.num_satellites {
        let iface = geo.isl_layout.num_isls(sid);
        bw.set(sid, iface, geo.iface_meta[sid as usize].aggregate_max_bandwidth);
    }
    for gid in 0..geo.num_ground_stations {
        let node = ground_node_id(geo.num_satellites, gid);
        bw.set(node, 0, geo.iface_meta[node as usize].aggregate_max_bandwidth);
    }
    bw
}

fn free_one_only_over_isls(geo: &StepGeometry) -> (ForwardingTable, GslBandwidthTable) {
    let dist = isl_only_dist(geo);
    let gid_to_sat_gsl_if_idx = vec![0u32; geo.num_ground_stations as usize];
    let fstate = primitive_a(
        geo.num_satellites,
        geo.num_ground_stations,
        geo.isl_layout,
        geo.isl_weights,
        &dist,
        geo.in_range,
        &gid_to_sat_gsl_if_idx,
    );
    (fstate, uniform_bandwidth(geo))
}

fn free_gs_one_sat_many_only_over_isls(geo: &StepGeometry) -> (ForwardingTable, GslBandwidthTable) {
    let dist = isl_only_dist(geo);
    let gid_to_sat_gsl_if_idx: Vec<u32> = (0..geo.num_ground_stations).collect();
    let fstate = primitive_a(
        geo.num_satellites,
        geo.num_ground_stations,
        geo.isl_layout,
        geo.isl_weights,
        &dist,
        geo.in_range,
        &gid_to_sat_gsl_if_idx,
    );

    let mut bw = GslBandwidthTable::new(&global_iface_counts(geo));
    for sid in 0..geo.num_satellites {
        let meta = &geo.iface_meta[sid as usize];
        let per_iface = meta.aggregate_max_bandwidth / meta.interface_count as f64;
        let base = geo.isl_layout.num_isls(sid);
        for local in 0..meta.interface_count {
            bw.set(sid, base + local, per_iface);
        }
    }
    for gid in 0..geo.num_ground_stations {
        let node = ground_node_id(geo.num_satellites, gid);
        bw.set(node, 0, geo.iface_meta[node as usize].aggregate_max_bandwidth);
    }
    (fstate, bw)
}

fn free_one_only_gs_relays(geo: &StepGeometry) -> (ForwardingTable, GslBandwidthTable) {
    let combined = CombinedGraph::build(
        geo.num_satellites,
        geo.num_ground_stations,
        geo.isl_layout,
        geo.isl_weights,
        geo.in_range,
    );
    let dist = floyd_warshall((geo.num_satellites + geo.num_ground_stations) as usize, |u| {
        combined.neighbors(u).to_vec()
    });
    let gid_to_sat_gsl_if_idx = vec![0u32; geo.num_ground_stations as usize];
    let fstate = primitive_b(
        geo.num_satellites,
        geo.num_ground_stations,
        geo.isl_layout,
        &combined,
        &dist,
        &gid_to_sat_gsl_if_idx,
    );
    (fstate, uniform_bandwidth(geo))
}

/// Pairs each ground station with its single nearest in-range satellite
/// (strict `<` fold over ascending-`SatId` candidates, spec §4.2). Returns
/// the pairing per ground station and how many ground stations chose each
/// satellite.
fn pair_ground_stations(geo: &StepGeometry) -> (Vec<Option<(f64, SatId)>>, Vec<u32>) {
    let mut pairing = vec![None; geo.num_ground_stations as usize];
    let mut frequency = vec![0u32; geo.num_satellites as usize];
    for gid in 0..geo.num_ground_stations {
        let mut best: Option<(f64, SatId)> = None;
        for &(dist, sid) in &geo.in_range[gid as usize] {
            if best.map_or(true, |(b, _)| dist < b) {
                best = Some((dist, sid));
            }
        }
        if let Some((_, sid)) = best {
            pairing[gid as usize] = best;
            frequency[sid as usize] += 1;
        }
    }
    (pairing, frequency)
}

fn paired_many_only_over_isls(geo: &StepGeometry) -> (ForwardingTable, GslBandwidthTable) {
    let (pairing, frequency) = pair_ground_stations(geo);
    let restricted_in_range: Vec<Vec<(f64, SatId)>> = pairing
        .iter()
        .map(|p| p.map(|pair| vec![pair]).unwrap_or_default())
        .collect();
    let gid_to_sat_gsl_if_idx: Vec<u32> = (0..geo.num_ground_stations).collect();

    let dist = isl_only_dist(geo);
    let fstate = primitive_a(
        geo.num_satellites,
        geo.num_ground_stations,
        geo.isl_layout,
        geo.isl_weights,
        &dist,
        &restricted_in_range,
        &gid_to_sat_gsl_if_idx,
    );

    // Every interface drains at full capacity by default; a matched pairing
    // overrides both ends of the link with its fair share (spec §4.2).
    let mut bw = GslBandwidthTable::new(&global_iface_counts(geo));
    for sid in 0..geo.num_satellites {
        let meta = &geo.iface_meta[sid as usize];
        let base = geo.isl_layout.num_isls(sid);
        for local in 0..meta.interface_count {
            bw.set(sid, base + local, meta.aggregate_max_bandwidth);
        }
    }
    for gid in 0..geo.num_ground_stations {
        let node = ground_node_id(geo.num_satellites, gid);
        bw.set(node, 0, geo.iface_meta[node as usize].aggregate_max_bandwidth);
    }
    for (gid, pair) in pairing.iter().enumerate() {
        if let Some((_, sid)) = pair {
            let share = 1.0 / frequency[*sid as usize] as f64;
            let sat_iface = geo.isl_layout.num_isls(*sid) + gid as u32;
            bw.set(*sid, sat_iface, share);
            let gs_node = ground_node_id(geo.num_satellites, gid as u32);
            bw.set(gs_node, 0, share);
        }
    }

    (fstate, bw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use satgen_geodesy::GroundStation;
    use satgen_topology::{ground_station_in_range, IslWeights};

    fn triangle_geo() -> (IslLayout, IslWeights, Vec<GroundStation>, Vec<[f64; 3]>) {
        // 1 satellite at the north pole's zenith, 2 ground stations nearby,
        // no ISLs (used by the no-ISL relay scenarios).
        let gs_a = GroundStation::from_geodetic(0, 0.0, 0.0, 0.0).unwrap();
        let gs_b = GroundStation::from_geodetic(1, 0.0, 1.0, 0.0).unwrap();
        let sat_pos = [gs_a.ecef_xyz_m[0], gs_a.ecef_xyz_m[1], gs_a.ecef_xyz_m[2] + 600_000.0];
        let layout = IslLayout::build(1, &[]);
        let weights = IslWeights::compute(&[], &[sat_pos], 5_016_000.0).unwrap();
        (layout, weights, vec![gs_a, gs_b], vec![sat_pos])
    }

    #[test]
    fn free_one_only_gs_relays_routes_gs_to_gs_through_the_satellite() {
        let (layout, weights, gs, positions) = triangle_geo();
        let in_range = ground_station_in_range(&gs, &positions, 20_000_000.0);
        let iface_meta = vec![
            IfaceMeta { node_id: 0, interface_count: 1, aggregate_max_bandwidth: 1.0 },
            IfaceMeta { node_id: 1, interface_count: 1, aggregate_max_bandwidth: 1.0 },
            IfaceMeta { node_id: 2, interface_count: 1, aggregate_max_bandwidth: 1.0 },
        ];
        let geo = StepGeometry {
            num_satellites: 1,
            num_ground_stations: 2,
            isl_layout: &layout,
            isl_weights: &weights,
            in_range: &in_range,
            iface_meta: &iface_meta,
        };
        let algorithm = Algorithm::FreeOneOnlyGsRelays;
        assert!(algorithm.validate_preconditions(1, 2, false, &iface_meta).is_ok());

        let (fstate, bw) = algorithm.run(&geo);
        let entry = fstate.get(1, 0); // gs 1 -> gs 0, relayed via sat 0
        assert_eq!(entry.next_hop_node(), Some(0));
        assert_eq!(bw.get(0, 0), 1.0);
    }

    #[test]
    fn free_one_only_gs_relays_rejects_a_constellation_with_isls() {
        let iface_meta = vec![
            IfaceMeta { node_id: 0, interface_count: 2, aggregate_max_bandwidth: 1.0 },
            IfaceMeta { node_id: 1, interface_count: 2, aggregate_max_bandwidth: 1.0 },
        ];
        let algorithm = Algorithm::FreeOneOnlyGsRelays;
        let result = algorithm.validate_preconditions(2, 0, true, &iface_meta);
        assert!(matches!(result, Err(ForwardingError::AlgorithmMismatch(_))));
    }

    #[test]
    fn paired_many_splits_bandwidth_by_pairing_frequency() {
        // 2 satellites, 3 ground stations, all 3 in range of sat 0 only.
        let isls = vec![(0u32, 1u32)];
        let layout = IslLayout::build(2, &isls);
        let positions = vec![[0.0, 0.0, 0.0], [2_000_000.0, 0.0, 0.0]];
        let weights = IslWeights::compute(&isls, &positions, 5_016_000.0).unwrap();
        let in_range = vec![vec![(100.0, 0u32)], vec![(200.0, 0u32)], vec![(50.0, 0u32)]];
        let iface_meta: Vec<IfaceMeta> = (0..5)
            .map(|node_id| IfaceMeta {
                node_id,
                interface_count: if node_id < 2 { 3 } else { 1 },
                aggregate_max_bandwidth: 1.0,
            })
            .collect();
        let geo = StepGeometry {
            num_satellites: 2,
            num_ground_stations: 3,
            isl_layout: &layout,
            isl_weights: &weights,
            in_range: &in_range,
            iface_meta: &iface_meta,
        };
        let algorithm = Algorithm::PairedManyOnlyOverIsls;
        assert!(algorithm.validate_preconditions(2, 3, true, &iface_meta).is_ok());

        let (_, bw) = algorithm.run(&geo);
        // Satellite 0's single ISL interface occupies global index 0; its
        // 3 GSL interfaces (one per ground station) start at index 1.
        // All 3 ground stations paired to satellite 0: each gets a 1/3 share.
        assert!((bw.get(0, 1) - 1.0 / 3.0).abs() < 1e-9);
        assert!((bw.get(0, 2) - 1.0 / 3.0).abs() < 1e-9);
        assert!((bw.get(0, 3) - 1.0 / 3.0).abs() < 1e-9);
        // Satellite 1 has no pairing at all: every GSL interface drains at full capacity.
        assert_eq!(bw.get(1, 1), 1.0);
    }

    #[test]
    fn paired_many_matches_the_two_satellite_three_gs_scenario() {
        // GS-0 and GS-1 are both nearest satellite A (sid 0); GS-2 is
        // nearest satellite B (sid 1). Both satellites are in range of
        // every ground station, just not nearest to all of them.
        let isls = vec![(0u32, 1u32)];
        let layout = IslLayout::build(2, &isls);
        let positions = vec![[0.0, 0.0, 0.0], [2_000_000.0, 0.0, 0.0]];
        let weights = IslWeights::compute(&isls, &positions, 5_016_000.0).unwrap();
        let in_range = vec![
            vec![(100.0, 0u32), (900.0, 1u32)], // gs 0: A nearer
            vec![(150.0, 0u32), (950.0, 1u32)], // gs 1: A nearer
            vec![(800.0, 0u32), (50.0, 1u32)],  // gs 2: B nearer
        ];
        let iface_meta: Vec<IfaceMeta> = (0..5)
            .map(|node_id| IfaceMeta {
                node_id,
                interface_count: if node_id < 2 { 3 } else { 1 },
                aggregate_max_bandwidth: 1.0,
            })
            .collect();
        let geo = StepGeometry {
            num_satellites: 2,
            num_ground_stations: 3,
            isl_layout: &layout,
            isl_weights: &weights,
            in_range: &in_range,
            iface_meta: &iface_meta,
        };
        let algorithm = Algorithm::PairedManyOnlyOverIsls;
        assert!(algorithm.validate_preconditions(2, 3, true, &iface_meta).is_ok());

        let (_, bw) = algorithm.run(&geo);
        // Satellite A (sid 0): ifaces to gs 0 and gs 1 (global indices 1, 2)
        // split 0.5 each; iface to gs 2 (index 3) drains at 1.0.
        assert_eq!(bw.get(0, 1), 0.5);
        assert_eq!(bw.get(0, 2), 0.5);
        assert_eq!(bw.get(0, 3), 1.0);
        // Satellite B (sid 1): only paired to gs 2 (global index 3, since
        // sat 1's single ISL interface occupies index 0), so that iface
        // gets the full 1.0 share; gs 0/gs 1 ifaces drain at 1.0.
        assert_eq!(bw.get(1, 1), 1.0);
        assert_eq!(bw.get(1, 2), 1.0);
        assert_eq!(bw.get(1, 3), 1.0);
    }
}
