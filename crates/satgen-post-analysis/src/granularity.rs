//! Granularity-robustness analysis (spec §4.5): given a list of alternative
//! step sizes (the smallest trace being the baseline), count how many path
//! changes a coarser trace misses relative to the baseline. A baseline
//! change is "missed" if the coarser trace records no corresponding
//! new-path event for the same pair within the coarser step window that
//! contains it.

use satgen_core::{GroundId, NodeId};
use satgen_time::TimeNs;

/// One path-change event: at `time_ns`, ground-station pair `pair`'s
/// forward path became `new_path`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathChangeEvent {
    pub pair: (GroundId, GroundId),
    pub time_ns: TimeNs,
    pub new_path: Vec<NodeId>,
}

/// Counts baseline events with no matching event in `alternative`: same
/// pair, same resulting path, sampled inside the coarser step window
/// `[window_start, window_start + alternative_step_ns)` that contains the
/// baseline event's time.
pub fn count_missed_changes(
    baseline: &[PathChangeEvent],
    alternative: &[PathChangeEvent],
    alternative_step_ns: TimeNs,
) -> usize {
    baseline
        .iter()
        .filter(|b| {
            let window_start = (b.time_ns / alternative_step_ns) * alternative_step_ns;
            let window_end = window_start + alternative_step_ns;
            !alternative.iter().any(|a| {
                a.pair == b.pair
                    && a.new_path == b.new_path
                    && a.time_ns >= window_start
                    && a.time_ns < window_end
            })
        })
        .count()
}

/// Runs [`count_missed_changes`] for every `(step_ns, events)` alternative
/// against one baseline trace (spec §4.5).
pub fn granularity_robustness(
    baseline: &[PathChangeEvent],
    alternatives: &[(TimeNs, Vec<PathChangeEvent>)],
) -> Vec<(TimeNs, usize)> {
    alternatives
        .iter()
        .map(|(step_ns, events)| (*step_ns, count_missed_changes(baseline, events, *step_ns)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_change_reproduced_in_the_same_coarser_window_is_not_missed() {
        let baseline = vec![PathChangeEvent { pair: (0, 1), time_ns: 1_500, new_path: vec![0, 5, 1] }];
        let alternative = vec![PathChangeEvent { pair: (0, 1), time_ns: 1_000, new_path: vec![0, 5, 1] }];
        assert_eq!(count_missed_changes(&baseline, &alternative, 2_000), 0);
    }

    #[test]
    fn a_change_with_no_matching_event_is_missed() {
        let baseline = vec![PathChangeEvent { pair: (0, 1), time_ns: 1_500, new_path: vec![0, 5, 1] }];
        let alternative: Vec<PathChangeEvent> = vec![];
        assert_eq!(count_missed_changes(&baseline, &alternative, 2_000), 1);
    }

    #[test]
    fn a_change_outside_the_window_is_missed() {
        let baseline = vec![PathChangeEvent { pair: (0, 1), time_ns: 1_500, new_path: vec![0, 5, 1] }];
        // alternative has the right pair/path but in a later window.
        let alternative = vec![PathChangeEvent { pair: (0, 1), time_ns: 2_100, new_path: vec![0, 5, 1] }];
        assert_eq!(count_missed_changes(&baseline, &alternative, 2_000), 1);
    }
}
