//! Path reconstruction (spec §4.5): walk `fstate`'s next-hop pointers from a
//! source to a destination, accumulated from delta files up to some time.

use satgen_core::{ForwardingEntry, NodeId};
use std::collections::HashMap;

pub type Fstate = HashMap<(NodeId, NodeId), ForwardingEntry>;

/// Walk next-hop pointers from `src` to `dst`. Returns `None` on the first
/// unreachable or missing entry (a missing entry should not occur once a
/// full snapshot has been accumulated, but is treated the same as
/// `Unreachable` rather than panicking on a malformed trace).
pub fn get_path(src: NodeId, dst: NodeId, fstate: &Fstate) -> Option<Vec<NodeId>> {
    let mut path = vec![src];
    let mut curr = src;
    while curr != dst {
        let entry = fstate.get(&(curr, dst))?;
        let next = entry.next_hop_node()?;
        path.push(next);
        curr = next;
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_next_hop_chain_to_destination() {
        let mut fstate = Fstate::new();
        fstate.insert((0, 2), ForwardingEntry::reachable(1, 0, 0));
        fstate.insert((1, 2), ForwardingEntry::reachable(2, 0, 0));
        assert_eq!(get_path(0, 2, &fstate), Some(vec![0, 1, 2]));
    }

    #[test]
    fn stops_at_first_unreachable_hop() {
        let mut fstate = Fstate::new();
        fstate.insert((0, 2), ForwardingEntry::UNREACHABLE);
        assert_eq!(get_path(0, 2, &fstate), None);
    }

    #[test]
    fn source_equal_to_destination_is_a_trivial_path() {
        let fstate = Fstate::new();
        assert_eq!(get_path(5, 5, &fstate), Some(vec![5]));
    }

    #[test]
    fn missing_entry_is_treated_as_unreachable() {
        let fstate = Fstate::new();
        assert_eq!(get_path(0, 2, &fstate), None);
    }
}
