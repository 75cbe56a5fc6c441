//! Junctions: the sweep stops where chains begin, end, or meet.
//!
//! A junction goes through a fixed sequence of states. While *populating*,
//! it grabs every chain that starts here and every active chain that arrives
//! here (splitting any active chain whose edge merely passes through). While
//! *splitting*, it retires the arriving chains, turning any that continue past
//! this point into new heads, and it brings the heads into a consistent
//! left-to-right order. Then it *delegates* to the task, and finally it
//! *activates* the heads.

use std::cmp::Ordering;

use super::active::Located;
use super::{JunctionTask, Sweep};
use crate::chain::{ChainIdx, Pools, VertIdx, Winding};
use crate::geom::{Loc, Point, Seg};
use crate::metrics::Counters;
use crate::predicates::{cmp_direction, cmp_loc, intersect, side_of, Edge, Intersection, OnEdge};
use crate::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum JunctionState {
    #[default]
    Empty,
    Populating,
    Splitting,
    Delegating,
    Activating,
}

/// Everything that happens at one sweep stop.
#[derive(Debug)]
pub(crate) struct Junction {
    state: JunctionState,
    /// The exact location of this stop.
    pub at: Loc,
    /// `at`, rounded to the output resolution.
    pub point: Point,
    /// The active chain immediately to the left of everything here.
    pub left: Option<ChainIdx>,
    /// The active chain immediately to the right of everything here.
    pub right: Option<ChainIdx>,
    /// Chains ending here, from left to right.
    pub tails: Vec<ChainIdx>,
    /// Chains starting here, from left to right.
    pub heads: Vec<ChainIdx>,
    // Active chains whose next vertex is here, in no particular order.
    arriving: Vec<ChainIdx>,
}

impl Default for Junction {
    fn default() -> Self {
        Junction {
            state: JunctionState::Empty,
            at: Loc::Grid(Point::new(0.0, 0.0)),
            point: Point::new(0.0, 0.0),
            left: None,
            right: None,
            tails: Vec::new(),
            heads: Vec::new(),
            arriving: Vec::new(),
        }
    }
}

impl Junction {
    fn begin(&mut self, at: Loc) {
        debug_assert_eq!(self.state, JunctionState::Empty);
        self.at = at;
        self.point = at.approx();
        self.state = JunctionState::Populating;
    }

    fn clear(&mut self) {
        self.left = None;
        self.right = None;
        self.tails.clear();
        self.heads.clear();
        self.arriving.clear();
        self.state = JunctionState::Empty;
    }
}

impl Sweep {
    /// Handles the sweep reaching the head of the next inactive chain.
    pub(super) fn process_at_head<T: JunctionTask>(&mut self, task: &mut T) -> Result<(), Error> {
        let h = self.master[self.next_head];
        let at = self.pools.verts[self.pools.chains[h].head].loc;
        self.junction.begin(at);
        self.grab_heads();
        self.grab_arriving()?;
        self.flush(task)
    }

    /// Handles the sweep reaching the next vertex of the active chain `c`.
    pub(super) fn process_at_vertex<T: JunctionTask>(
        &mut self,
        c: ChainIdx,
        task: &mut T,
    ) -> Result<(), Error> {
        let v = self.pools.next_vertex(c)?;
        self.junction.begin(self.pools.verts[v].loc);
        self.grab_arriving()?;
        self.grab_heads();

        let j = &self.junction;
        if j.heads.is_empty() && j.arriving == [c] && v != self.pools.chains[c].tail {
            self.junction.clear();
            return self.advance(c, v, task);
        }
        self.flush(task)
    }

    // Moves a chain past one of its interior vertices, when nothing else is
    // going on there.
    fn advance<T: JunctionTask>(&mut self, c: ChainIdx, v: VertIdx, task: &mut T) -> Result<(), Error> {
        self.pools.chains[c].cursor = v;
        Counters::bump(&self.pools.counters.advances);
        task.advance(&self.pools, c, v)?;
        self.candidates.insert(&self.pools, c);
        let (left, right) = (self.pools.chains[c].left, self.pools.chains[c].right);
        if let Some(l) = left {
            self.check_crossing(l, c)?;
        }
        if let Some(r) = right {
            self.check_crossing(c, r)?;
        }
        Ok(())
    }

    fn grab_heads(&mut self) {
        while let Some(&h) = self.master.get(self.next_head) {
            let head = &self.pools.verts[self.pools.chains[h].head].loc;
            if cmp_loc(head, &self.junction.at, &self.pools.counters) != Ordering::Equal {
                break;
            }
            self.junction.heads.push(h);
            self.next_head += 1;
        }
    }

    fn grab_arriving(&mut self) -> Result<(), Error> {
        while let Some(c) = self.candidates.top() {
            let next = self.pools.next_vertex(c)?;
            let loc = &self.pools.verts[next].loc;
            if cmp_loc(loc, &self.junction.at, &self.pools.counters) != Ordering::Equal {
                break;
            }
            self.candidates.pop(&self.pools);
            self.junction.arriving.push(c);
        }
        Ok(())
    }

    // If the current edge of `c` passes exactly through the junction, puts a
    // vertex there so that `c` arrives here too.
    fn grab_passing(&mut self, c: ChainIdx) -> Result<bool, Error> {
        let seg = &self.pools.segs[self.pools.current_seg(c)?];
        if side_of(&self.junction.at, seg, &self.pools.counters) != Ordering::Equal {
            return Ok(false);
        }
        self.candidates.remove(&self.pools, c);
        let at = self.junction.at;
        let cursor = self.pools.chains[c].cursor;
        self.pools.split_edge(cursor, at, None)?;
        Ok(true)
    }

    fn flush<T: JunctionTask>(&mut self, task: &mut T) -> Result<(), Error> {
        debug_assert_eq!(self.junction.state, JunctionState::Populating);
        Counters::bump(&self.pools.counters.junctions);

        if self.junction.arriving.is_empty() {
            match self.active.locate(&self.pools, &self.junction.at)? {
                Located::Between(l, r) => {
                    self.junction.left = l;
                    self.junction.right = r;
                }
                Located::On(c) => {
                    if !self.grab_passing(c)? {
                        return Err(Error::Internal("located on a chain that misses the point"));
                    }
                    self.junction.arriving.push(c);
                }
            }
        }
        if !self.junction.arriving.is_empty() {
            self.gather_run()?;
        }

        self.junction.state = JunctionState::Splitting;
        self.retire_arriving()?;
        self.order_heads()?;
        self.assign_windings()?;
        let (left, right) = (self.junction.left, self.junction.right);
        let ends = (
            self.junction.heads.first().copied(),
            self.junction.heads.last().copied(),
        );
        match ends {
            (Some(first), Some(last)) => {
                if let Some(l) = left {
                    self.check_crossing(l, first)?;
                }
                if let Some(r) = right {
                    self.check_crossing(last, r)?;
                }
            }
            _ => {
                if let (Some(l), Some(r)) = (left, right) {
                    self.check_crossing(l, r)?;
                }
            }
        }

        self.junction.state = JunctionState::Delegating;
        tracing::trace!(
            at = ?self.junction.point,
            tails = self.junction.tails.len(),
            heads = self.junction.heads.len(),
            "junction"
        );
        task.process_junction(&mut self.pools, &self.junction)?;

        self.junction.state = JunctionState::Activating;
        let mut prev = left;
        for &h in &self.junction.heads {
            self.active.insert_after(&mut self.pools.chains, prev, h);
            self.candidates.insert(&self.pools, h);
            prev = Some(h);
        }
        self.junction.clear();
        Ok(())
    }

    // Turns the arriving chains into a contiguous left-to-right run of the
    // active list, pulling in any neighbors that pass through the junction.
    fn gather_run(&mut self) -> Result<(), Error> {
        for &c in &self.junction.arriving {
            self.pools.chains[c].marked = true;
        }
        let start = self.junction.arriving[0];
        let mut first = start;
        while let Some(l) = self.pools.chains[first].left {
            if !self.pools.chains[l].marked && !self.grab_passing(l)? {
                break;
            }
            first = l;
        }
        let mut last = start;
        while let Some(r) = self.pools.chains[last].right {
            if !self.pools.chains[r].marked && !self.grab_passing(r)? {
                break;
            }
            last = r;
        }

        let expected = self.junction.arriving.len();
        self.junction.arriving.clear();
        let mut marked = 0;
        let mut cur = first;
        loop {
            let chain = &mut self.pools.chains[cur];
            if chain.marked {
                chain.marked = false;
                marked += 1;
            }
            self.junction.arriving.push(cur);
            if cur == last {
                break;
            }
            cur = chain.right.ok_or(Error::Internal("broken active list"))?;
        }
        if marked != expected {
            return Err(Error::Internal("arriving chains aren't adjacent"));
        }
        self.junction.left = self.pools.chains[first].left;
        self.junction.right = self.pools.chains[last].right;
        Ok(())
    }

    // Deactivates the arriving chains. Those that go on past the junction are
    // split, and their continuations become heads.
    fn retire_arriving(&mut self) -> Result<(), Error> {
        for i in 0..self.junction.arriving.len() {
            let c = self.junction.arriving[i];
            self.active.remove(&mut self.pools.chains, c);
            let v = self.pools.next_vertex(c)?;
            self.pools.chains[c].cursor = v;
            if v != self.pools.chains[c].tail {
                let rest = self.pools.split_chain(c, v)?;
                self.junction.heads.push(rest);
            }
            self.junction.tails.push(c);
        }
        Ok(())
    }

    fn head_seg(&self, h: ChainIdx) -> Result<Seg, Error> {
        let seg = self.pools.verts[self.pools.chains[h].head]
            .seg
            .ok_or(Error::Internal("chain with a single vertex"))?;
        Ok(self.pools.segs[seg])
    }

    // Sorts the heads from left to right, and shortens the first edges of
    // collinear heads so that they all end at the same vertex.
    fn order_heads(&mut self) -> Result<(), Error> {
        let mut keyed = self
            .junction
            .heads
            .iter()
            .map(|&h| Ok((h, self.head_seg(h)?)))
            .collect::<Result<Vec<_>, Error>>()?;
        let counters = &self.pools.counters;
        keyed.sort_by(|(a, s), (b, t)| cmp_direction(s, t, counters).then(a.cmp(b)));

        self.junction.heads.clear();
        self.junction.heads.extend(keyed.iter().map(|(h, _)| *h));
        let mut i = 0;
        while i < keyed.len() {
            let mut j = i + 1;
            while j < keyed.len()
                && cmp_direction(&keyed[i].1, &keyed[j].1, &self.pools.counters) == Ordering::Equal
            {
                j += 1;
            }
            if j - i > 1 {
                self.cut_back(i..j)?;
            }
            i = j;
        }
        Ok(())
    }

    fn cut_back(&mut self, range: std::ops::Range<usize>) -> Result<(), Error> {
        let mut shortest = first_edge_end(&self.pools, self.junction.heads[range.start])?;
        for &h in &self.junction.heads[range.clone()] {
            let end = first_edge_end(&self.pools, h)?;
            if self.pools.cmp_verts(end, shortest) == Ordering::Less {
                shortest = end;
            }
        }

        let loc = self.pools.verts[shortest].loc;
        for i in range {
            let h = self.junction.heads[i];
            let end = first_edge_end(&self.pools, h)?;
            if self.pools.cmp_verts(end, shortest) != Ordering::Equal {
                let head = self.pools.chains[h].head;
                self.pools.split_edge(head, loc, None)?;
                Counters::bump(&self.pools.counters.cut_backs);
            }
        }
        Ok(())
    }

    fn assign_windings(&mut self) -> Result<(), Error> {
        let chains = &mut self.pools.chains;
        let mut w = self
            .junction
            .left
            .map(|l| chains[l].winding)
            .unwrap_or_default();
        for &h in &self.junction.heads {
            let chain = &mut chains[h];
            w.add(chain.operand, chain.delta());
            chain.winding = w;
        }

        // Every figure is closed, so going around the junction must get us
        // back where we started.
        let expected = match self.junction.right {
            Some(r) => {
                let mut w = chains[r].winding;
                w.add(chains[r].operand, -chains[r].delta());
                w
            }
            None => Winding::default(),
        };
        if w != expected {
            return Err(Error::Internal("winding numbers don't match across a junction"));
        }
        Ok(())
    }

    /// Checks whether the current edges of two neighboring chains cross, and
    /// if so, puts a vertex at the crossing in each of them.
    fn check_crossing(&mut self, l: ChainIdx, r: ChainIdx) -> Result<(), Error> {
        let pools = &self.pools;
        let (ls, rs) = (pools.current_seg(l)?, pools.current_seg(r)?);
        if ls == rs {
            return Ok(());
        }
        let pair = (ls.min(rs), ls.max(rs));
        let (lv, rv) = (pools.chains[l].cursor, pools.chains[r].cursor);
        // Two segments only cross once.
        if pools.verts[lv].cross == Some(pair) || pools.verts[rv].cross == Some(pair) {
            return Ok(());
        }
        let (l_end, r_end) = (pools.next_vertex(l)?, pools.next_vertex(r)?);
        let hit = intersect(
            Edge {
                seg: &pools.segs[ls],
                first: &pools.verts[lv].loc,
                last: &pools.verts[l_end].loc,
            },
            Edge {
                seg: &pools.segs[rs],
                first: &pools.verts[rv].loc,
                last: &pools.verts[r_end].loc,
            },
            &pools.counters,
        );
        let Intersection::Transverse {
            at,
            on_left,
            on_right,
        } = hit
        else {
            return Ok(());
        };
        if on_left != OnEdge::Interior && on_right != OnEdge::Interior {
            return Ok(());
        }

        // Reuse an existing vertex's location when there is one, so that the
        // new vertex is exactly the same point.
        let loc = if on_right == OnEdge::AtLast {
            pools.verts[r_end].loc
        } else if on_left == OnEdge::AtLast {
            pools.verts[l_end].loc
        } else {
            at
        };
        Counters::bump(&pools.counters.intersections);
        tracing::trace!(?l, ?r, at = ?loc, "crossing");

        if on_left == OnEdge::Interior {
            self.pools.split_edge(lv, loc, Some(pair))?;
            self.candidates.update(&self.pools, l);
        }
        if on_right == OnEdge::Interior {
            self.pools.split_edge(rv, loc, Some(pair))?;
            self.candidates.update(&self.pools, r);
        }
        Ok(())
    }
}

fn first_edge_end(pools: &Pools, h: ChainIdx) -> Result<VertIdx, Error> {
    pools.verts[pools.chains[h].head]
        .next
        .ok_or(Error::Internal("chain with a single vertex"))
}
