//! Load participation factors.

use std::collections::HashMap;

/// Each bus's load divided by the total load of its area, in input order.
///
/// Buses in an area with zero total load get `0.0`.
///
/// ```
/// use gridstore_core::participation_factors;
///
/// let factors = participation_factors(&[(1, 30.0), (1, 70.0)]);
/// assert_eq!(factors, vec![0.3, 0.7]);
/// ```
pub fn participation_factors(buses: &[(i64, f64)]) -> Vec<f64> {
    let mut totals: HashMap<i64, f64> = HashMap::new();
    for &(area, load) in buses {
        *totals.entry(area).or_insert(0.0) += load;
    }

    buses
        .iter()
        .map(|(area, load)| match totals.get(area) {
            Some(&total) if total != 0.0 => load / total,
            _ => 0.0,
        })
        .collect()
}
