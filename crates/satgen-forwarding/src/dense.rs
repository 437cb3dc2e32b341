//! Dense forwarding/bandwidth tables (spec §3 "Data model"). Sized once from
//! the constellation's node counts, indexed by arithmetic rather than a map —
//! every `(current, dst_gid)` and `(node, iface)` pair is looked up every
//! step, so a flat `Vec` with an offset table beats a hash map here.

use satgen_core::{ForwardingEntry, GroundId, IfaceIdx, NodeId};

/// `fstate`: one [`ForwardingEntry`] per `(current_node, dst_ground_station)`.
#[derive(Debug, Clone)]
pub struct ForwardingTable {
    num_ground_stations: u32,
    entries: Vec<ForwardingEntry>,
}

impl ForwardingTable {
    pub fn new(num_satellites: u32, num_ground_stations: u32) -> Self {
        let total_nodes = (num_satellites + num_ground_stations) as usize;
        Self {
            num_ground_stations,
            entries: vec![ForwardingEntry::default(); total_nodes * num_ground_stations as usize],
        }
    }

    fn index(&self, current: NodeId, dst_gid: GroundId) -> usize {
        current as usize * self.num_ground_stations as usize + dst_gid as usize
    }

    pub fn get(&self, current: NodeId, dst_gid: GroundId) -> ForwardingEntry {
        self.entries[self.index(current, dst_gid)]
    }

    pub fn set(&mut self, current: NodeId, dst_gid: GroundId, entry: ForwardingEntry) {
        let i = self.index(current, dst_gid);
        self.entries[i] = entry;
    }

    /// Every `(current, dst_gid, entry)` triple, in `current`-major order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, GroundId, ForwardingEntry)> + '_ {
        let n_gs = self.num_ground_stations;
        self.entries.iter().enumerate().map(move |(i, &entry)| {
            let current = (i as u32) / n_gs;
            let dst_gid = (i as u32) % n_gs;
            (current, dst_gid, entry)
        })
    }
}

/// `gsl_if_bandwidth_state`: aggregate bandwidth per `(node, interface)`,
/// packed by a per-node offset. Indexed by the same global interface
/// numbering forwarding entries use (a satellite's GSL interfaces start
/// past its ISL ones), so `iface_counts[node]` must be the node's *total*
/// interface count — `num_isls(sat) + gsl_interface_count(sat)` for a
/// satellite, just `gsl_interface_count(gs)` for a ground station — even
/// though only the GSL sub-range ever holds a meaningful value.
#[derive(Debug, Clone)]
pub struct GslBandwidthTable {
    offsets: Vec<u32>,
    values: Vec<f64>,
}

impl GslBandwidthTable {
    pub fn new(iface_counts: &[u32]) -> Self {
        let mut offsets = Vec::with_capacity(iface_counts.len() + 1);
        let mut acc = 0u32;
        offsets.push(0);
        for &count in iface_counts {
            acc += count;
            offsets.push(acc);
        }
        Self {
            offsets,
            values: vec![0.0; acc as usize],
        }
    }

    fn index(&self, node: NodeId, iface: IfaceIdx) -> usize {
        (self.offsets[node as usize] + iface) as usize
    }

    pub fn get(&self, node: NodeId, iface: IfaceIdx) -> f64 {
        self.values[self.index(node, iface)]
    }

    pub fn set(&mut self, node: NodeId, iface: IfaceIdx, bandwidth: f64) {
        let i = self.index(node, iface);
        self.values[i] = bandwidth;
    }

    /// Every `(node, iface, bandwidth)` triple, in node-major order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, IfaceIdx, f64)> + '_ {
        let offsets = &self.offsets;
        let values = &self.values;
        (0..offsets.len() - 1).flat_map(move |node| {
            let start = offsets[node];
            let end = offsets[node + 1];
            (start..end).map(move |i| (node as u32, i - start, values[i as usize]))
        })
    }
}
