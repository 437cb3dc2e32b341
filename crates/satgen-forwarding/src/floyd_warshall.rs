//! All-pairs shortest paths (spec §4.3). Dense `O(n^2)` distance matrix,
//! `O(n^3)` relaxation — the constellation sizes this runs over (hundreds of
//! nodes per step) make the dense form cheaper than repeated single-source
//! searches, and simpler to reason about for the fatal-on-disconnect and
//! tie-break requirements the algorithms build on top of it.

/// A dense `n x n` distance matrix. `f64::INFINITY` marks unreachable pairs.
#[derive(Debug, Clone)]
pub struct DistMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistMatrix {
    pub fn get(&self, i: u32, j: u32) -> f64 {
        self.data[i as usize * self.n + j as usize]
    }

    pub fn n(&self) -> usize {
        self.n
    }
}

/// Runs Floyd-Warshall over `n` nodes whose direct edges are given by
/// `neighbors(u) -> [(v, weight)]`. Self-distances are 0, non-edges start at
/// infinity and are relaxed through every intermediate node.
pub fn floyd_warshall<F>(n: usize, neighbors: F) -> DistMatrix
where
    F: Fn(u32) -> Vec<(u32, f64)>,
{
    let mut data = vec![f64::INFINITY; n * n];
    for i in 0..n {
        data[i * n + i] = 0.0;
    }
    for u in 0..n {
        for (v, w) in neighbors(u as u32) {
            let idx = u * n + v as usize;
            if w < data[idx] {
                data[idx] = w;
            }
        }
    }
    for k in 0..n {
        for i in 0..n {
            let dik = data[i * n + k];
            if dik.is_infinite() {
                continue;
            }
            for j in 0..n {
                let via = dik + data[k * n + j];
                if via < data[i * n + j] {
                    data[i * n + j] = via;
                }
            }
        }
    }
    DistMatrix { n, data }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_shortest_path_through_an_intermediate_node() {
        // 0 -- 1 -- 2, direct 0-2 link longer than via 1.
        let adj = |u: u32| -> Vec<(u32, f64)> {
            match u {
                0 => vec![(1, 1.0), (2, 10.0)],
                1 => vec![(0, 1.0), (2, 1.0)],
                2 => vec![(0, 10.0), (1, 1.0)],
                _ => unreachable!(),
            }
        };
        let dist = floyd_warshall(3, adj);
        assert_eq!(dist.get(0, 2), 2.0);
        assert_eq!(dist.get(0, 0), 0.0);
    }

    #[test]
    fn disconnected_nodes_stay_infinite() {
        let adj = |_: u32| -> Vec<(u32, f64)> { vec![] };
        let dist = floyd_warshall(2, adj);
        assert!(dist.get(0, 1).is_infinite());
    }
}
