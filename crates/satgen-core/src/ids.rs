//! Dense identifier spaces (spec §3).
//!
//! `SatId` is dense in `[0, N_sat)`. Ground stations get
//! `NodeId = N_sat + GroundId`, so the whole node space `[0, N_sat + N_gs)`
//! is contiguous and satellites/ground stations never collide.

use serde::{Deserialize, Serialize};

pub type SatId = u32;
pub type GroundId = u32;
pub type NodeId = u32;
pub type IfaceIdx = u32;

/// Map a `GroundId` into the unified `NodeId` space.
#[inline]
pub fn ground_node_id(n_sat: u32, gid: GroundId) -> NodeId {
    n_sat + gid
}

/// True if `node` refers to a ground station rather than a satellite.
#[inline]
pub fn is_ground(n_sat: u32, node: NodeId) -> bool {
    node >= n_sat
}

/// Recover the `GroundId` from a `NodeId` known to be a ground station.
#[inline]
pub fn ground_id_of(n_sat: u32, node: NodeId) -> GroundId {
    debug_assert!(is_ground(n_sat, node));
    node - n_sat
}

/// `{ interface_count, aggregate_max_bandwidth }` for one node (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IfaceMeta {
    pub node_id: NodeId,
    pub interface_count: u32,
    pub aggregate_max_bandwidth: f64,
}

/// `(next_hop, out_iface, in_iface)`, with the sentinel `(-1, -1, -1)`
/// meaning "drop" / unreachable (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingEntry {
    pub next_hop: i64,
    pub out_iface: i32,
    pub in_iface: i32,
}

impl ForwardingEntry {
    pub const UNREACHABLE: Self = Self {
        next_hop: -1,
        out_iface: -1,
        in_iface: -1,
    };

    pub fn reachable(next_hop: NodeId, out_iface: IfaceIdx, in_iface: IfaceIdx) -> Self {
        Self {
            next_hop: next_hop as i64,
            out_iface: out_iface as i32,
            in_iface: in_iface as i32,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.next_hop < 0
    }

    pub fn next_hop_node(&self) -> Option<NodeId> {
        if self.is_unreachable() {
            None
        } else {
            Some(self.next_hop as NodeId)
        }
    }
}

impl Default for ForwardingEntry {
    fn default() -> Self {
        Self::UNREACHABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_node_ids_never_collide_with_satellite_ids() {
        let n_sat = 10;
        for g in 0..5 {
            let node = ground_node_id(n_sat, g);
            assert!(is_ground(n_sat, node));
            assert_eq!(ground_id_of(n_sat, node), g);
        }
        for s in 0..n_sat {
            assert!(!is_ground(n_sat, s));
        }
    }

    #[test]
    fn unreachable_sentinel_round_trips() {
        let e = ForwardingEntry::UNREACHABLE;
        assert!(e.is_unreachable());
        assert_eq!(e.next_hop_node(), None);

        let r = ForwardingEntry::reachable(7, 1, 0);
        assert!(!r.is_unreachable());
        assert_eq!(r.next_hop_node(), Some(7));
    }
}
