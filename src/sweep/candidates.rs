//! A priority queue of active chains, keyed by the next vertex of each.

use std::cmp::Ordering;

use crate::chain::{ChainIdx, Pools};
use crate::typed_vec::SideTable;

/// An indexed binary min-heap of chains.
///
/// The key of a chain is the vertex after its cursor, compared in sweep
/// order (ties are broken by chain index, so the order is total). Keys live
/// in the chains themselves, so whenever a chain's next vertex changes the
/// heap must be told with [`CandidateList::update`].
#[derive(Debug, Default)]
pub(crate) struct CandidateList {
    heap: Vec<ChainIdx>,
    // Position of each chain in `heap`.
    slots: SideTable<usize>,
}

fn cmp_keys(pools: &Pools, a: ChainIdx, b: ChainIdx) -> Ordering {
    let next = |c: ChainIdx| pools.verts[pools.chains[c].cursor].next;
    match (next(a), next(b)) {
        (Some(va), Some(vb)) => pools.cmp_verts(va, vb),
        // Chains without a next vertex shouldn't be here at all; keep them
        // out of the way.
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
    .then(a.cmp(&b))
}

impl CandidateList {
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The chain with the earliest next vertex, without removing it.
    pub fn top(&self) -> Option<ChainIdx> {
        self.heap.first().copied()
    }

    pub fn contains(&self, c: ChainIdx) -> bool {
        self.slots.get(c.0).is_some()
    }

    pub fn insert(&mut self, pools: &Pools, c: ChainIdx) {
        debug_assert!(!self.contains(c));
        debug_assert!(pools.verts[pools.chains[c].cursor].next.is_some());
        self.heap.push(c);
        self.slots.insert(c.0, self.heap.len() - 1);
        self.sift_up(pools, self.heap.len() - 1);
    }

    pub fn pop(&mut self, pools: &Pools) -> Option<ChainIdx> {
        let top = self.top()?;
        self.remove(pools, top);
        Some(top)
    }

    /// Removes `c`, returning whether it was there.
    pub fn remove(&mut self, pools: &Pools, c: ChainIdx) -> bool {
        let Some(pos) = self.slots.remove(c.0) else {
            return false;
        };
        let last = self.heap.len() - 1;
        if pos != last {
            self.heap.swap(pos, last);
            self.heap.pop();
            self.slots.insert(self.heap[pos].0, pos);
            let pos = self.sift_up(pools, pos);
            self.sift_down(pools, pos);
        } else {
            self.heap.pop();
        }
        true
    }

    /// Restores the heap order after `c`'s next vertex changed. Does nothing
    /// if `c` isn't in the heap.
    pub fn update(&mut self, pools: &Pools, c: ChainIdx) {
        if let Some(&pos) = self.slots.get(c.0) {
            let pos = self.sift_up(pools, pos);
            self.sift_down(pools, pos);
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.slots.insert(self.heap[i].0, i);
        self.slots.insert(self.heap[j].0, j);
    }

    fn sift_up(&mut self, pools: &Pools, mut pos: usize) -> usize {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if cmp_keys(pools, self.heap[pos], self.heap[parent]) == Ordering::Less {
                self.swap(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
        pos
    }

    fn sift_down(&mut self, pools: &Pools, mut pos: usize) {
        loop {
            let mut smallest = pos;
            for child in [2 * pos + 1, 2 * pos + 2] {
                if child < self.heap.len()
                    && cmp_keys(pools, self.heap[child], self.heap[smallest]) == Ordering::Less
                {
                    smallest = child;
                }
            }
            if smallest == pos {
                break;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }

    #[cfg(any(test, feature = "slow-asserts"))]
    pub fn check_invariants(&self, pools: &Pools) {
        for (pos, &c) in self.heap.iter().enumerate() {
            assert_eq!(self.slots.get(c.0), Some(&pos));
            if pos > 0 {
                let parent = self.heap[(pos - 1) / 2];
                assert_eq!(cmp_keys(pools, parent, c), Ordering::Less);
            }
        }
    }
}
