//! Delta framing between consecutive time steps (spec §4.4, §9 open
//! question 2: replace the coroutine-style "prev_output" threading with an
//! explicit value the caller holds and passes back in). A step's output is
//! compared against the previous step's; only changed entries are reported,
//! which is exactly a dynamic-state file's line count for every step after
//! the first. For the three algorithms whose bandwidth never varies with
//! geometry, that degenerates to "no bandwidth lines after step 0" on its
//! own, without a special case.

use crate::dense::{ForwardingTable, GslBandwidthTable};
use satgen_core::{ForwardingEntry, GroundId, IfaceIdx, NodeId};

/// The forwarding and bandwidth state computed for one time step.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub fstate: ForwardingTable,
    pub gsl_bw: GslBandwidthTable,
}

/// The lines a dynamic-state writer needs to emit for this step: every
/// entry whose value differs from the previous step (or every entry, if
/// there was no previous step).
#[derive(Debug, Clone, Default)]
pub struct StepDelta {
    pub fstate_changes: Vec<(NodeId, GroundId, ForwardingEntry)>,
    pub gsl_bw_changes: Vec<(NodeId, IfaceIdx, f64)>,
}

pub fn diff_step(prev: Option<&StepContext>, current: &StepContext) -> StepDelta {
    let fstate_changes = current
        .fstate
        .iter()
        .filter(|&(current_node, dst_gid, entry)| {
            prev.map_or(true, |p| p.fstate.get(current_node, dst_gid) != entry)
        })
        .collect();

    let gsl_bw_changes = current
        .gsl_bw
        .iter()
        .filter(|&(node, iface, bandwidth)| {
            prev.map_or(true, |p| p.gsl_bw.get(node, iface) != bandwidth)
        })
        .collect();

    StepDelta { fstate_changes, gsl_bw_changes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satgen_core::IfaceMeta;

    #[test]
    fn first_step_reports_every_entry() {
        let fstate = ForwardingTable::new(1, 1);
        let gsl_bw = GslBandwidthTable::new(&[1, 1]);
        let current = StepContext { fstate, gsl_bw };
        let delta = diff_step(None, &current);
        assert_eq!(delta.fstate_changes.len(), 1);
        assert_eq!(delta.gsl_bw_changes.len(), 2);
    }

    #[test]
    fn unchanged_step_reports_nothing() {
        let meta = [IfaceMeta { node_id: 0, interface_count: 1, aggregate_max_bandwidth: 5.0 }];
        let mut fstate_a = ForwardingTable::new(1, 1);
        fstate_a.set(0, 0, ForwardingEntry::reachable(1, 0, 0));
        let mut bw_a = GslBandwidthTable::new(&[meta[0].interface_count]);
        bw_a.set(0, 0, 5.0);

        let mut fstate_b = ForwardingTable::new(1, 1);
        fstate_b.set(0, 0, ForwardingEntry::reachable(1, 0, 0));
        let mut bw_b = GslBandwidthTable::new(&[meta[0].interface_count]);
        bw_b.set(0, 0, 5.0);

        let prev = StepContext { fstate: fstate_a, gsl_bw: bw_a };
        let current = StepContext { fstate: fstate_b, gsl_bw: bw_b };
        let delta = diff_step(Some(&prev), &current);
        assert!(delta.fstate_changes.is_empty());
        assert!(delta.gsl_bw_changes.is_empty());
    }

    #[test]
    fn changed_entry_is_reported_alone() {
        let mut fstate_a = ForwardingTable::new(1, 1);
        fstate_a.set(0, 0, ForwardingEntry::reachable(1, 0, 0));
        let mut fstate_b = ForwardingTable::new(1, 1);
        fstate_b.set(0, 0, ForwardingEntry::reachable(2, 0, 0));

        let prev = StepContext { fstate: fstate_a, gsl_bw: GslBandwidthTable::new(&[0]) };
        let current = StepContext { fstate: fstate_b, gsl_bw: GslBandwidthTable::new(&[0]) };
        let delta = diff_step(Some(&prev), &current);
        assert_eq!(delta.fstate_changes, vec![(0, 0, ForwardingEntry::reachable(2, 0, 0))]);
    }
}
