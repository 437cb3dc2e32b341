//! The two shared shortest-path primitives every algorithm is built from
//! (spec §4.3). Primitive A never lets a path enter a ground station except
//! as its final hop; Primitive B allows a path to cross through any ground
//! station acting as a relay. Both break ties the same way: among several
//! equally-close candidates, keep the first one found while scanning in
//! ascending id order (never replace on an exact tie), which reproduces the
//! result of sorting `(distance, id)` tuples without needing to sort.

use crate::dense::ForwardingTable;
use crate::floyd_warshall::DistMatrix;
use satgen_core::{ids::ground_node_id, ForwardingEntry, GroundId, IfaceIdx, NodeId, SatId};
use satgen_topology::{CombinedGraph, IslLayout, IslWeights};

/// Shortest paths restricted to ISL hops, with ground stations only ever a
/// final hop off a satellite (spec §4.3 Primitive A). `isl_dist` must be the
/// Floyd-Warshall result over the ISL-only graph; `in_range` is the
/// per-ground-station visible-satellite list, ascending by `SatId`.
/// `gid_to_sat_gsl_if_idx[g]` gives the GSL interface a satellite uses to
/// talk to ground station `g` — algorithms differ only in this mapping and
/// in how restrictive `in_range` is (spec §4.2's precondition table).
pub fn primitive_a(
    num_satellites: u32,
    num_ground_stations: u32,
    isl_layout: &IslLayout,
    isl_weights: &IslWeights,
    isl_dist: &DistMatrix,
    in_range: &[Vec<(f64, SatId)>],
    gid_to_sat_gsl_if_idx: &[IfaceIdx],
) -> ForwardingTable {
    let mut table = ForwardingTable::new(num_satellites, num_ground_stations);
    let mut dist_sat_to_gs = vec![f64::INFINITY; (num_satellites * num_ground_stations) as usize];
    let sg_index = |s: SatId, g: GroundId| (s * num_ground_stations + g) as usize;

    for curr in 0..num_satellites {
        for dst_gid in 0..num_ground_stations {
            let mut best: Option<(f64, SatId)> = None;
            for &(edge_m, candidate) in &in_range[dst_gid as usize] {
                let via = isl_dist.get(curr, candidate);
                if via.is_infinite() {
                    continue;
                }
                let total = via + edge_m;
                if best.map_or(true, |(b, _)| total < b) {
                    best = Some((total, candidate));
                }
            }
            dist_sat_to_gs[sg_index(curr, dst_gid)] = best.map_or(f64::INFINITY, |(d, _)| d);

            let entry = match best {
                None => ForwardingEntry::UNREACHABLE,
                Some((_, target)) if target == curr => ForwardingEntry::reachable(
                    ground_node_id(num_satellites, dst_gid),
                    isl_layout.num_isls(curr) + gid_to_sat_gsl_if_idx[dst_gid as usize],
                    0,
                ),
                Some((_, target)) => {
                    let mut best_hop: Option<(f64, SatId)> = None;
                    for &neighbor in isl_layout.neighbors(curr) {
                        let via = isl_weights.weight(curr, neighbor) + isl_dist.get(neighbor, target);
                        if best_hop.map_or(true, |(b, _)| via < b) {
                            best_hop = Some((via, neighbor));
                        }
                    }
                    match best_hop {
                        Some((_, neighbor)) => ForwardingEntry::reachable(
                            neighbor,
                            isl_layout.iface_for(curr, neighbor),
                            isl_layout.iface_for(neighbor, curr),
                        ),
                        None => ForwardingEntry::UNREACHABLE,
                    }
                }
            };
            table.set(curr, dst_gid, entry);
        }
    }

    for src_gid in 0..num_ground_stations {
        for dst_gid in 0..num_ground_stations {
            if src_gid == dst_gid {
                continue;
            }
            let mut best: Option<(f64, SatId)> = None;
            for &(edge_m, candidate) in &in_range[src_gid as usize] {
                let downstream = dist_sat_to_gs[sg_index(candidate, dst_gid)];
                if downstream.is_infinite() {
                    continue;
                }
                let total = edge_m + downstream;
                if best.map_or(true, |(b, _)| total < b) {
                    best = Some((total, candidate));
                }
            }
            let entry = match best {
                None => ForwardingEntry::UNREACHABLE,
                Some((_, sat)) => ForwardingEntry::reachable(
                    sat,
                    0,
                    isl_layout.num_isls(sat) + gid_to_sat_gsl_if_idx[src_gid as usize],
                ),
            };
            table.set(ground_node_id(num_satellites, src_gid), dst_gid, entry);
        }
    }

    table
}

/// Shortest paths over the combined ISL+GSL graph, where a ground station
/// may relay for another ground station (spec §4.3 Primitive B). A
/// ground-to-ground edge never exists in [`CombinedGraph`], so that case is
/// structurally unreachable rather than checked.
pub fn primitive_b(
    num_satellites: u32,
    num_ground_stations: u32,
    isl_layout: &IslLayout,
    combined: &CombinedGraph,
    combined_dist: &DistMatrix,
    gid_to_sat_gsl_if_idx: &[IfaceIdx],
) -> ForwardingTable {
    let mut table = ForwardingTable::new(num_satellites, num_ground_stations);
    let total_nodes = num_satellites + num_ground_stations;

    for current in 0..total_nodes {
        for dst_gid in 0..num_ground_stations {
            let dst_node = ground_node_id(num_satellites, dst_gid);
            if current == dst_node {
                continue;
            }
            let mut best: Option<(f64, NodeId)> = None;
            for &(neighbor, edge_m) in combined.neighbors(current) {
                let downstream = combined_dist.get(neighbor, dst_node);
                if downstream.is_infinite() {
                    continue;
                }
                let total = edge_m + downstream;
                if best.map_or(true, |(b, _)| total < b) {
                    best = Some((total, neighbor));
                }
            }
            let entry = match best {
                None => ForwardingEntry::UNREACHABLE,
                Some((_, neighbor)) => {
                    let (out_if, in_if) =
                        iface_pair(num_satellites, isl_layout, gid_to_sat_gsl_if_idx, current, neighbor);
                    ForwardingEntry::reachable(neighbor, out_if, in_if)
                }
            };
            table.set(current, dst_gid, entry);
        }
    }

    table
}

fn iface_pair(
    num_satellites: u32,
    isl_layout: &IslLayout,
    gid_to_sat_gsl_if_idx: &[IfaceIdx],
    current: NodeId,
    neighbor: NodeId,
) -> (IfaceIdx, IfaceIdx) {
    let current_is_sat = current < num_satellites;
    let neighbor_is_sat = neighbor < num_satellites;
    match (current_is_sat, neighbor_is_sat) {
        (true, true) => (
            isl_layout.iface_for(current, neighbor),
            isl_layout.iface_for(neighbor, current),
        ),
        (true, false) => {
            let gid = neighbor - num_satellites;
            (isl_layout.num_isls(current) + gid_to_sat_gsl_if_idx[gid as usize], 0)
        }
        (false, true) => {
            let gid = current - num_satellites;
            (0, isl_layout.num_isls(neighbor) + gid_to_sat_gsl_if_idx[gid as usize])
        }
        (false, false) => unreachable!("the combined graph never links two ground stations directly"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floyd_warshall::floyd_warshall;

    fn isl_dist(isl_layout: &IslLayout, isl_weights: &IslWeights, n: u32) -> DistMatrix {
        floyd_warshall(n as usize, |u| {
            isl_layout
                .neighbors(u)
                .iter()
                .map(|&v| (v, isl_weights.weight(u, v)))
                .collect()
        })
    }

    #[test]
    fn primitive_a_routes_sat_to_sat_before_reaching_ground_station() {
        // sat 0 -- sat 1, both in range of gs 0 (only 1 is closer).
        let isls = vec![(0u32, 1u32)];
        let layout = IslLayout::build(2, &isls);
        let weights = IslWeights::compute(&isls, &[[0.0, 0.0, 0.0], [1_000.0, 0.0, 0.0]], 10_000.0).unwrap();
        let dist = isl_dist(&layout, &weights, 2);
        let in_range = vec![vec![(500.0, 1u32)]];
        let gid_to_if = vec![0u32];

        let table = primitive_a(2, 1, &layout, &weights, &dist, &in_range, &gid_to_if);

        let from_0 = table.get(0, 0);
        assert!(!from_0.is_unreachable());
        assert_eq!(from_0.next_hop_node(), Some(1));

        let from_1 = table.get(1, 0);
        assert_eq!(from_1.next_hop_node(), Some(2)); // ground_node_id(2, 0) == 2
    }

    #[test]
    fn primitive_a_reports_unreachable_when_no_satellite_is_in_range() {
        let isls: Vec<(u32, u32)> = vec![];
        let layout = IslLayout::build(1, &isls);
        let weights = IslWeights::compute(&isls, &[[0.0, 0.0, 0.0]], 10_000.0).unwrap();
        let dist = isl_dist(&layout, &weights, 1);
        let in_range = vec![vec![]];
        let gid_to_if = vec![0u32];

        let table = primitive_a(1, 1, &layout, &weights, &dist, &in_range, &gid_to_if);
        assert!(table.get(0, 0).is_unreachable());
    }
}
