//! The chains currently crossing the sweep line, from left to right.

use std::cmp::Ordering;

use crate::chain::{Chain, ChainIdx, ChainVec, Pools};
use crate::geom::Loc;
use crate::predicates::side_of;
use crate::Error;

/// Where a point falls relative to the active chains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Located {
    /// Strictly between two neighbors (either of which may be missing).
    Between(Option<ChainIdx>, Option<ChainIdx>),
    /// Exactly on the current edge of this chain.
    On(ChainIdx),
}

/// A doubly-linked list of chains, threaded through the chains' own
/// `left` and `right` fields.
#[derive(Debug, Default)]
pub(crate) struct ActiveList {
    leftmost: Option<ChainIdx>,
    len: usize,
}

impl ActiveList {
    pub fn leftmost(&self) -> Option<ChainIdx> {
        self.leftmost
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `c` just to the right of `left`, or at the far left if `left` is `None`.
    pub fn insert_after(&mut self, chains: &mut ChainVec<Chain>, left: Option<ChainIdx>, c: ChainIdx) {
        debug_assert!(!chains[c].active);
        let right = match left {
            Some(l) => chains[l].right,
            None => self.leftmost,
        };
        chains[c].left = left;
        chains[c].right = right;
        chains[c].active = true;
        match left {
            Some(l) => chains[l].right = Some(c),
            None => self.leftmost = Some(c),
        }
        if let Some(r) = right {
            chains[r].left = Some(c);
        }
        self.len += 1;
    }

    pub fn remove(&mut self, chains: &mut ChainVec<Chain>, c: ChainIdx) {
        debug_assert!(chains[c].active);
        let (left, right) = (chains[c].left, chains[c].right);
        match left {
            Some(l) => chains[l].right = right,
            None => self.leftmost = right,
        }
        if let Some(r) = right {
            chains[r].left = left;
        }
        let chain = &mut chains[c];
        chain.left = None;
        chain.right = None;
        chain.active = false;
        self.len -= 1;
    }

    /// Walks the list from the left, looking for the chains that bracket `p`.
    pub fn locate(&self, pools: &Pools, p: &Loc) -> Result<Located, Error> {
        let mut prev = None;
        let mut cur = self.leftmost;
        while let Some(c) = cur {
            let seg = &pools.segs[pools.current_seg(c)?];
            match side_of(p, seg, &pools.counters) {
                Ordering::Less => {}
                Ordering::Equal => return Ok(Located::On(c)),
                Ordering::Greater => return Ok(Located::Between(prev, Some(c))),
            }
            prev = Some(c);
            cur = pools.chains[c].right;
        }
        Ok(Located::Between(prev, None))
    }

    pub fn iter<'a>(&self, chains: &'a ChainVec<Chain>) -> impl Iterator<Item = ChainIdx> + 'a {
        let mut cur = self.leftmost;
        std::iter::from_fn(move || {
            let c = cur?;
            cur = chains[c].right;
            Some(c)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainBuilder, Operand};
    use crate::geom::Point;

    // Three vertical-ish chains, at x = 0, 10, and 20.
    fn setup() -> (Pools, Vec<ChainIdx>) {
        let mut pools = Pools::new(100);
        let mut builder = ChainBuilder::new(&mut pools, Operand::A);
        for x in [0.0, 10.0, 20.0] {
            builder.begin_figure(Point::new(x, 0.0)).unwrap();
            builder.line_to(Point::new(x, 10.0), None);
        }
        let chains = builder.finish().unwrap();
        // Each figure is a doubled-back segment, so every other chain is a duplicate.
        let chains = chains.into_iter().step_by(2).collect();
        (pools, chains)
    }

    #[test]
    fn insert_and_remove() {
        let (mut pools, cs) = setup();
        let mut list = ActiveList::default();
        list.insert_after(&mut pools.chains, None, cs[1]);
        list.insert_after(&mut pools.chains, None, cs[0]);
        list.insert_after(&mut pools.chains, Some(cs[1]), cs[2]);
        assert_eq!(list.iter(&pools.chains).collect::<Vec<_>>(), cs);
        assert_eq!(list.len(), 3);

        list.remove(&mut pools.chains, cs[1]);
        assert_eq!(list.iter(&pools.chains).collect::<Vec<_>>(), vec![cs[0], cs[2]]);
        assert_eq!(pools.chains[cs[2]].left, Some(cs[0]));
        list.remove(&mut pools.chains, cs[0]);
        assert_eq!(list.leftmost(), Some(cs[2]));
        list.remove(&mut pools.chains, cs[2]);
        assert!(list.is_empty());
    }

    #[test]
    fn locating() {
        let (mut pools, cs) = setup();
        let mut list = ActiveList::default();
        let mut prev = None;
        for &c in &cs {
            list.insert_after(&mut pools.chains, prev, c);
            prev = Some(c);
        }
        let at = |x: f64| Loc::Grid(Point::new(x, 5.0));
        assert_eq!(list.locate(&pools, &at(-3.0)).unwrap(), Located::Between(None, Some(cs[0])));
        assert_eq!(list.locate(&pools, &at(5.0)).unwrap(), Located::Between(Some(cs[0]), Some(cs[1])));
        assert_eq!(list.locate(&pools, &at(10.0)).unwrap(), Located::On(cs[1]));
        assert_eq!(list.locate(&pools, &at(25.0)).unwrap(), Located::Between(Some(cs[2]), None));
    }
}
