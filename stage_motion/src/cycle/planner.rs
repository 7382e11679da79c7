//! Position sequence expansion.

/// Every ordered pair of distinct positions, flattened.
///
/// For each `i` (outer, ascending) and `j` (inner, ascending) with `i != j`,
/// appends `positions[i]` then `positions[j]`. The result has
/// `N * (N - 1) * 2` entries, and is empty for `N <= 1`.
///
/// ```
/// use stage_motion::cycle::permutation_sequence;
///
/// assert_eq!(
///     permutation_sequence(&[10.0, 20.0, 30.0]),
///     vec![10.0, 20.0, 10.0, 30.0, 20.0, 10.0, 20.0, 30.0, 30.0, 10.0, 30.0, 20.0]
/// );
/// ```
pub fn permutation_sequence(positions: &[f64]) -> Vec<f64> {
    let n = positions.len();
    if n <= 1 {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(n * (n - 1) * 2);
    for (i, &from) in positions.iter().enumerate() {
        for (j, &to) in positions.iter().enumerate() {
            if i != j {
                out.push(from);
                out.push(to);
            }
        }
    }
    out
}

/// Sequence the worker visits: the input itself, or its pair expansion.
pub fn plan(positions: &[f64], permute: bool) -> Vec<f64> {
    if permute {
        permutation_sequence(positions)
    } else {
        positions.to_vec()
    }
}
