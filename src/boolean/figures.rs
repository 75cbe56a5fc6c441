//! Stitching boundary chains into closed figures.
//!
//! Every boundary chain is walked in the direction that keeps the inside of
//! the result on the walker's right: chains with the fill on their right
//! ([`Side::Left`]) are walked against the sweep, and the others along it.
//! Around each junction point, boundary ends alternate between ends where a
//! walk leaves the point and ends where a walk arrives, and each filled
//! sector between two of them links an arrival to a departure.
//!
//! Links are collected into pre-figures: sequences of chains that are
//! already known to be consecutive in some output figure. Only the two ends
//! of a pre-figure are still open, and both are the tails of chains that are
//! still active. When a link joins a pre-figure to itself, it is a complete
//! figure and gets sent to the sink right away.

use std::collections::VecDeque;

use kurbo::{Affine, ParamCurve};

use crate::chain::{ChainIdx, CurveFragment, CurveIdx, Pools, Side};
use crate::geom::Point;
use crate::sweep::Junction;
use crate::typed_vec::SideTable;
use crate::Error;

/// A consumer of closed figures.
///
/// Figures arrive one at a time: [`add_figure`](FigureSink::add_figure), then
/// [`start_at`](FigureSink::start_at), some number of segments, and finally
/// [`close`](FigureSink::close). The `smooth` flags say whether the join at
/// the start of a segment is in the middle of an original curve.
pub trait FigureSink {
    /// Announces a new figure.
    fn add_figure(&mut self) {}

    /// Sets the starting point of the current figure.
    fn start_at(&mut self, p: kurbo::Point);

    /// Adds a straight segment.
    fn line_to(&mut self, p: kurbo::Point, smooth: bool);

    /// Adds a cubic Bézier segment.
    fn bezier_to(&mut self, c1: kurbo::Point, c2: kurbo::Point, end: kurbo::Point, smooth: bool);

    /// Closes the current figure.
    fn close(&mut self);
}

impl FigureSink for kurbo::BezPath {
    fn start_at(&mut self, p: kurbo::Point) {
        self.move_to(p);
    }

    fn line_to(&mut self, p: kurbo::Point, _smooth: bool) {
        kurbo::BezPath::line_to(self, p);
    }

    fn bezier_to(&mut self, c1: kurbo::Point, c2: kurbo::Point, end: kurbo::Point, _smooth: bool) {
        self.curve_to(c1, c2, end);
    }

    fn close(&mut self) {
        self.close_path();
    }
}

/// One end of a boundary chain at a junction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum End {
    Tail(ChainIdx, Side),
    Head(ChainIdx, Side),
}

impl End {
    // Going around the junction (tails from left to right, then heads from
    // right to left), is the fill on the far side of this end?
    fn starts_fill(self) -> bool {
        matches!(self, End::Tail(_, Side::Left) | End::Head(_, Side::Right))
    }
}

// A chain, and whether it is walked along the sweep.
type Link = (ChainIdx, bool);

/// Builds output figures from boundary chains.
pub(crate) struct Assembler<'a, S> {
    sink: &'a mut S,
    /// Maps grid coordinates to output coordinates.
    transform: Affine,
    retrieve_curves: bool,
    prefigs: Vec<Option<VecDeque<Link>>>,
    // The pre-figure that each open chain end belongs to.
    owner: SideTable<usize>,
    ends: Vec<End>,
    points: Vec<(Point, Option<CurveFragment>)>,
    figures: usize,
}

impl<'a, S: FigureSink> Assembler<'a, S> {
    pub fn new(sink: &'a mut S, transform: Affine, retrieve_curves: bool) -> Self {
        Assembler {
            sink,
            transform,
            retrieve_curves,
            prefigs: Vec::new(),
            owner: SideTable::default(),
            ends: Vec::new(),
            points: Vec::new(),
            figures: 0,
        }
    }

    /// Links up the boundary ends at a junction.
    pub fn junction(&mut self, pools: &Pools, j: &Junction) -> Result<(), Error> {
        self.ends.clear();
        for &t in &j.tails {
            if let Some(side) = pools.chains[t].class.output() {
                self.ends.push(End::Tail(t, side));
            }
        }
        for &h in j.heads.iter().rev() {
            if let Some(side) = pools.chains[h].class.output() {
                self.ends.push(End::Head(h, side));
            }
        }
        let n = self.ends.len();
        if n == 0 {
            return Ok(());
        }
        if n % 2 != 0 {
            return Err(Error::Internal("odd number of boundary chains at a junction"));
        }

        let offset = if self.ends[0].starts_fill() { 0 } else { 1 };
        for k in 0..n / 2 {
            let from = self.ends[(offset + 2 * k) % n];
            let to = self.ends[(offset + 2 * k + 1) % n];
            if !from.starts_fill() || to.starts_fill() {
                return Err(Error::Internal("boundary chains don't alternate"));
            }
            self.link(pools, from, to)?;
        }
        Ok(())
    }

    fn owner_of(&self, c: ChainIdx) -> Result<usize, Error> {
        self.owner
            .get(c.0)
            .copied()
            .ok_or(Error::Internal("boundary chain isn't part of any figure"))
    }

    fn prefig(&mut self, id: usize) -> Result<&mut VecDeque<Link>, Error> {
        self.prefigs
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(Error::Internal("pre-figure was already closed"))
    }

    // `from` is where a walk leaves the junction, `to` is where one arrives.
    fn link(&mut self, pools: &Pools, from: End, to: End) -> Result<(), Error> {
        match (from, to) {
            (End::Tail(leave, _), End::Tail(arrive, _)) => self.join(pools, arrive, leave),
            (End::Tail(leave, _), End::Head(arrive, _)) => {
                let id = self.owner_of(leave)?;
                self.prefig(id)?.push_front((arrive, false));
                self.owner.insert(arrive.0, id);
                Ok(())
            }
            (End::Head(leave, _), End::Head(arrive, _)) => {
                let id = self.prefigs.len();
                self.prefigs
                    .push(Some(VecDeque::from([(arrive, false), (leave, true)])));
                self.owner.insert(arrive.0, id);
                self.owner.insert(leave.0, id);
                Ok(())
            }
            (End::Head(leave, _), End::Tail(arrive, _)) => {
                let id = self.owner_of(arrive)?;
                self.prefig(id)?.push_back((leave, true));
                self.owner.insert(leave.0, id);
                Ok(())
            }
        }
    }

    // Joins the pre-figure ending with `back` to the one starting with `front`.
    fn join(&mut self, pools: &Pools, back: ChainIdx, front: ChainIdx) -> Result<(), Error> {
        let p = self.owner_of(back)?;
        let q = self.owner_of(front)?;
        if p == q {
            let links = self.prefigs[p]
                .take()
                .ok_or(Error::Internal("pre-figure was already closed"))?;
            return self.emit(pools, &links);
        }

        let mut q_links = self.prefigs[q]
            .take()
            .ok_or(Error::Internal("pre-figure was already closed"))?;
        let p_links = self.prefig(p)?;
        // Move the shorter one into the longer one.
        if p_links.len() >= q_links.len() {
            p_links.append(&mut q_links);
            let new_back = p_links.back().map(|l| l.0);
            if let Some(c) = new_back {
                self.owner.insert(c.0, p);
            }
        } else {
            let mut p_links = self.prefigs[p]
                .take()
                .ok_or(Error::Internal("pre-figure was already closed"))?;
            while let Some(link) = p_links.pop_back() {
                q_links.push_front(link);
            }
            if let Some(&(c, _)) = q_links.front() {
                self.owner.insert(c.0, q);
            }
            self.prefigs[q] = Some(q_links);
        }
        Ok(())
    }

    fn emit(&mut self, pools: &Pools, links: &VecDeque<Link>) -> Result<(), Error> {
        self.points.clear();
        for &(c, forward) in links {
            let verts: Vec<_> = pools.chain_vertices(c).collect();
            if forward {
                for w in verts.windows(2) {
                    let v = &pools.verts[w[0]];
                    self.points.push((v.approx, v.fragment));
                }
            } else {
                for w in verts.windows(2).rev() {
                    let fragment = pools.verts[w[0]].fragment.map(CurveFragment::reversed);
                    self.points.push((pools.verts[w[1]].approx, fragment));
                }
            }
        }
        let n = self.points.len();
        if n < 2 {
            return Err(Error::Internal("degenerate output figure"));
        }

        let transform = self.transform;
        let map = move |p: Point| transform * p.to_kurbo();
        self.sink.add_figure();
        self.sink.start_at(map(self.points[0].0));
        let mut prev_curve: Option<CurveIdx> = None;
        let mut i = 0;
        while i < n {
            match self.points[i].1.filter(|_| self.retrieve_curves) {
                Some(f) => {
                    // Merge the edges that continue along the same curve.
                    let mut t1 = f.t1;
                    let mut j = i + 1;
                    while j < n {
                        match self.points[j].1 {
                            Some(g) if g.curve == f.curve && g.t0 == t1 => {
                                t1 = g.t1;
                                j += 1;
                            }
                            _ => break,
                        }
                    }
                    let piece = pools.curves[f.curve].subsegment(f.t0..t1);
                    let end = self.points[j % n].0;
                    self.sink.bezier_to(
                        transform * piece.p1,
                        transform * piece.p2,
                        map(end),
                        prev_curve == Some(f.curve),
                    );
                    prev_curve = Some(f.curve);
                    i = j;
                }
                None => {
                    // The last edge is implied by closing the figure.
                    if i + 1 < n {
                        self.sink.line_to(map(self.points[i + 1].0), false);
                    }
                    prev_curve = None;
                    i += 1;
                }
            }
        }
        self.sink.close();
        self.figures += 1;
        Ok(())
    }

    /// Checks that every pre-figure was closed, and returns the number of
    /// figures emitted.
    pub fn finish(self) -> Result<usize, Error> {
        if self.prefigs.iter().any(Option::is_some) {
            return Err(Error::Internal("unclosed figure after the sweep"));
        }
        Ok(self.figures)
    }
}
