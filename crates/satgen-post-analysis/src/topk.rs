//! Top-k listings (spec §4.5): "largest RTT delta", "most unreachable",
//! "largest hop-count delta", "most path changes". Sort descending by
//! value; when picking the top-10, skip any entry that would reuse a
//! ground-station endpoint already chosen (deduplicates endpoint reuse).

use satgen_core::GroundId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairMetric {
    pub a: GroundId,
    pub b: GroundId,
    pub value: f64,
}

/// Sort descending by `value`, then greedily take up to `k` entries whose
/// endpoints don't overlap any entry already taken.
pub fn top_k_deduped(mut metrics: Vec<PairMetric>, k: usize) -> Vec<PairMetric> {
    metrics.sort_by(|x, y| y.value.partial_cmp(&x.value).expect("metric values must not be NaN"));
    let mut used = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(k.min(metrics.len()));
    for m in metrics {
        if used.contains(&m.a) || used.contains(&m.b) {
            continue;
        }
        used.insert(m.a);
        used.insert(m.b);
        out.push(m);
        if out.len() == k {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_largest_values_first() {
        let metrics = vec![
            PairMetric { a: 0, b: 1, value: 5.0 },
            PairMetric { a: 2, b: 3, value: 9.0 },
            PairMetric { a: 4, b: 5, value: 1.0 },
        ];
        let top = top_k_deduped(metrics, 2);
        assert_eq!(top[0].value, 9.0);
        assert_eq!(top[1].value, 5.0);
    }

    #[test]
    fn skips_entries_that_reuse_an_already_chosen_endpoint() {
        let metrics = vec![
            PairMetric { a: 0, b: 1, value: 9.0 },
            PairMetric { a: 1, b: 2, value: 8.0 }, // reuses gs 1, skipped
            PairMetric { a: 3, b: 4, value: 7.0 },
        ];
        let top = top_k_deduped(metrics, 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].value, 9.0);
        assert_eq!(top[1].value, 7.0);
    }
}
