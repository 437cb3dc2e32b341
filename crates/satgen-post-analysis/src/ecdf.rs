//! ECDF output (spec §4.5, §6): `x,y` pairs where `y` is the cumulative
//! fraction of samples `<= x`.

use std::io::Write;
use std::path::Path;

/// Build sorted `(x, y)` ECDF pairs from an unordered sample set. Tied
/// values are collapsed into a single point carrying the highest rank
/// among them, so `y` is always the fraction of samples `<= x`.
pub fn ecdf(samples: &[f64]) -> Vec<(f64, f64)> {
    if samples.is_empty() {
        return Vec::new();
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("ECDF samples must not be NaN"));
    let n = sorted.len() as f64;

    let mut out = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let x = sorted[i];
        let mut j = i;
        while j < sorted.len() && sorted[j] == x {
            j += 1;
        }
        out.push((x, j as f64 / n));
        i = j;
    }
    out
}

/// Writes an `ecdf_<metric>.txt` file: one `x,y` line per distinct sample
/// value, ascending.
pub fn write_ecdf_file(path: &Path, samples: &[f64]) -> std::io::Result<()> {
    let mut f = std::fs::File::create(path)?;
    for (x, y) in ecdf(samples) {
        writeln!(f, "{x},{y}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecdf_reaches_one_at_the_maximum() {
        let points = ecdf(&[3.0, 1.0, 2.0]);
        assert_eq!(points, vec![(1.0, 1.0 / 3.0), (2.0, 2.0 / 3.0), (3.0, 1.0)]);
    }

    #[test]
    fn ties_collapse_into_one_point_at_the_highest_rank() {
        let points = ecdf(&[5.0, 5.0, 10.0]);
        assert_eq!(points, vec![(5.0, 2.0 / 3.0), (10.0, 1.0)]);
    }

    #[test]
    fn empty_samples_produce_no_points() {
        assert!(ecdf(&[]).is_empty());
    }
}
