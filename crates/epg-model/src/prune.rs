//! Threshold pruning of negligible orders. Order 0 is never removed.

use crate::state::StateArrays;

fn negligible(magnitude_sqr: f64, threshold: f64) -> bool {
    if threshold > 0.0 {
        magnitude_sqr < threshold * threshold
    } else {
        magnitude_sqr == 0.0
    }
}

/// Shortens the active length while the top order is negligible, stopping at
/// the first significant one. A zero threshold trims exact zeros only.
/// Returns the number of removed orders.
pub fn trim_tail(arrays: &mut StateArrays, threshold: f64) -> usize {
    let before = arrays.len();
    let mut len = before;
    while len > 1 && negligible(arrays.magnitude_sqr(len - 1), threshold) {
        len -= 1;
    }
    arrays.truncate(len);
    before - len
}

/// Marks the orders that survive `threshold`; index 0 always survives.
pub fn significant(arrays: &StateArrays, threshold: f64) -> Vec<bool> {
    (0..arrays.len())
        .map(|index| index == 0 || !negligible(arrays.magnitude_sqr(index), threshold))
        .collect()
}

/// Compacts `arrays` to the orders flagged in `keep`, preserving their order.
pub fn compact(arrays: &mut StateArrays, keep: &[bool]) {
    let mut write = 0;
    for (read, _) in keep.iter().enumerate().filter(|(_, kept)| **kept) {
        arrays.f[write] = arrays.f[read];
        arrays.f_star[write] = arrays.f_star[read];
        arrays.z[write] = arrays.z[read];
        write += 1;
    }
    arrays.truncate(write);
}
