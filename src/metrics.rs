//! Counters describing the work done by one sweep.

use std::cell::Cell;

use crate::num::Tier;

/// What a sweep did, and how hard the exact predicates had to work.
///
/// Every sweep starts with fresh counters and returns them when it finishes,
/// so there is no process-wide state to reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Metrics {
    /// Sweep stops that needed the full junction machinery.
    pub junctions: usize,
    /// Sweep stops where a single chain just moved on to its next vertex.
    pub advances: usize,
    /// Crossings found between neighboring chains.
    pub intersections: usize,
    /// Chains that were split because something happened in their middle.
    pub splits: usize,
    /// Edges that were shortened to match a collinear neighbor.
    pub cut_backs: usize,
    /// Vertices allocated, including the ones inserted at intersections.
    pub vertices: usize,
    /// Predicates decided by the double-precision tier.
    pub double_tier: usize,
    /// Predicates decided by the interval tier.
    pub interval_tier: usize,
    /// Predicates that needed exact arithmetic.
    pub exact_tier: usize,
}

/// The live counters, updated through shared references.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub junctions: Cell<usize>,
    pub advances: Cell<usize>,
    pub intersections: Cell<usize>,
    pub splits: Cell<usize>,
    pub cut_backs: Cell<usize>,
    pub vertices: Cell<usize>,
    tiers: [Cell<usize>; 3],
}

impl Counters {
    #[inline]
    pub fn bump(cell: &Cell<usize>) {
        cell.set(cell.get() + 1);
    }

    #[inline]
    pub fn decided_by(&self, tier: Tier) {
        Counters::bump(&self.tiers[tier as usize]);
    }

    pub fn snapshot(&self) -> Metrics {
        Metrics {
            junctions: self.junctions.get(),
            advances: self.advances.get(),
            intersections: self.intersections.get(),
            splits: self.splits.get(),
            cut_backs: self.cut_backs.get(),
            vertices: self.vertices.get(),
            double_tier: self.tiers[Tier::Double as usize].get(),
            interval_tier: self.tiers[Tier::Interval as usize].get(),
            exact_tier: self.tiers[Tier::Exact as usize].get(),
        }
    }
}
