//! Cross-region transfer capability.
//!
//! A branch whose endpoints sit in different regions contributes its
//! continuous rating to the interchange between those regions. Grouping is
//! by the ordered `(from_region, to_region)` pair, so a branch drawn A to B
//! and one drawn B to A land in different groups.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{EntityType, GridError, GridResult};

/// The part of a branch record the aggregation looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchRating {
    pub from_bus: i64,
    pub to_bus: i64,
    pub continuous_rating: f64,
}

/// Summed rating of all branches running from one region into another.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterchangeGroup {
    pub from_region: i64,
    pub to_region: i64,
    pub total_rating: f64,
    pub branch_count: usize,
}

impl InterchangeGroup {
    /// Interchange name, e.g. `1_2`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.from_region, self.to_region)
    }
}

/// Group cross-region branches by ordered region pair and sum their ratings.
///
/// Output is sorted by `(from_region, to_region)`. A bus missing from
/// `bus_region` is an error.
pub fn aggregate_interchanges(
    branches: &[BranchRating],
    bus_region: &HashMap<i64, i64>,
) -> GridResult<Vec<InterchangeGroup>> {
    let region_of = |bus: i64| {
        bus_region
            .get(&bus)
            .copied()
            .ok_or_else(|| GridError::unresolved(EntityType::BalancingTopologies.table_name(), bus))
    };

    let mut groups: BTreeMap<(i64, i64), (f64, usize)> = BTreeMap::new();
    for branch in branches {
        let from = region_of(branch.from_bus)?;
        let to = region_of(branch.to_bus)?;
        if from == to {
            continue;
        }
        let entry = groups.entry((from, to)).or_insert((0.0, 0));
        entry.0 += branch.continuous_rating;
        entry.1 += 1;
    }

    Ok(groups
        .into_iter()
        .map(|((from_region, to_region), (total_rating, branch_count))| InterchangeGroup {
            from_region,
            to_region,
            total_rating,
            branch_count,
        })
        .collect())
}
