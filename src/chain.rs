//! Vertices, chains, and the pools they live in.
//!
//! A chain is a maximal run of boundary vertices that is monotonic in sweep
//! order. The sweep only ever deals with chains: it activates a chain when it
//! reaches the chain's head, moves a cursor along it, and retires it at its
//! tail. When something happens in the middle of a chain (another chain
//! crosses it, or starts on it), the chain is split in two.
//!
//! Everything is stored in append-only arenas that are dropped together when
//! the sweep finishes, and all links are indices into those arenas.

use std::cmp::Ordering;

use crate::geom::{Loc, Point, Seg};
use crate::metrics::Counters;
use crate::predicates::cmp_loc;
use crate::Error;

typed_vec!(
    /// An index into the segment pool.
    pub(crate) SegVec,
    SegIdx,
    "s"
);
typed_vec!(
    /// An index into the vertex pool.
    pub(crate) VertVec,
    VertIdx,
    "v"
);
typed_vec!(
    /// An index into the chain pool.
    pub(crate) ChainVec,
    ChainIdx,
    "c"
);
typed_vec!(
    /// An index into the pool of original curves.
    pub(crate) CurveVec,
    CurveIdx,
    "b"
);

/// Which of the (at most) two input shapes something came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Operand {
    A,
    B,
}

impl Operand {
    pub fn other(self) -> Operand {
        match self {
            Operand::A => Operand::B,
            Operand::B => Operand::A,
        }
    }
}

/// The piece of an original curve that a flattened edge came from.
///
/// `t0` is the parameter at the edge's first vertex (in sweep order) and `t1`
/// the parameter at its last.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct CurveFragment {
    pub curve: CurveIdx,
    pub t0: f64,
    pub t1: f64,
}

impl CurveFragment {
    pub fn reversed(self) -> Self {
        CurveFragment {
            curve: self.curve,
            t0: self.t1,
            t1: self.t0,
        }
    }

    fn split(self, frac: f64) -> (Self, Self) {
        let t = self.t0 + (self.t1 - self.t0) * frac;
        (
            CurveFragment { t1: t, ..self },
            CurveFragment { t0: t, ..self },
        )
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Vertex {
    /// Input vertices and intersections that landed on the grid are
    /// `Loc::Grid`; other intersections are `Loc::Cross`.
    pub loc: Loc,
    /// The location, rounded to the output resolution.
    pub approx: Point,
    pub next: Option<VertIdx>,
    pub prev: Option<VertIdx>,
    /// The input segment supporting the edge from here to `next`.
    pub seg: Option<SegIdx>,
    /// For intersection vertices, the two segments that crossed here.
    pub cross: Option<(SegIdx, SegIdx)>,
    /// Where the edge from here to `next` came from, if it was a flattened curve.
    pub fragment: Option<CurveFragment>,
}

/// Winding numbers of both shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Winding {
    pub a: i32,
    pub b: i32,
}

impl Winding {
    pub fn get(&self, operand: Operand) -> i32 {
        match operand {
            Operand::A => self.a,
            Operand::B => self.b,
        }
    }

    pub fn add(&mut self, operand: Operand, delta: i32) {
        match operand {
            Operand::A => self.a += delta,
            Operand::B => self.b += delta,
        }
    }
}

/// What a chain contributes to the output boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Side {
    /// Nothing: the fill is the same on both sides.
    #[default]
    Redundant,
    /// The fill starts here: the inside is to the chain's right.
    Left,
    /// The fill ends here: the inside is to the chain's left.
    Right,
}

impl Side {
    pub fn flipped(self) -> Side {
        match self {
            Side::Redundant => Side::Redundant,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Class {
    /// The side according to the chain's own shape and fill rule.
    pub side: Side,
    /// The other shape makes this chain irrelevant.
    pub redundant: bool,
    /// The other shape turns this chain inside out.
    pub flipped: bool,
    /// Cancelled by a coincident chain.
    pub cancelled: bool,
}

impl Class {
    /// The side this chain has in the output, if it has one at all.
    pub fn output(&self) -> Option<Side> {
        if self.redundant || self.cancelled || self.side == Side::Redundant {
            None
        } else if self.flipped {
            Some(self.side.flipped())
        } else {
            Some(self.side)
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Chain {
    pub head: VertIdx,
    pub tail: VertIdx,
    /// The most recently processed vertex.
    pub cursor: VertIdx,
    pub operand: Operand,
    /// Does the sweep order run against the figure's own direction?
    pub reversed: bool,
    pub left: Option<ChainIdx>,
    pub right: Option<ChainIdx>,
    pub active: bool,
    /// Winding numbers of the region just to the right of this chain.
    pub winding: Winding,
    pub class: Class,
    /// Scratch space for junction processing.
    pub marked: bool,
}

impl Chain {
    fn new(head: VertIdx, tail: VertIdx, operand: Operand, reversed: bool) -> Chain {
        Chain {
            head,
            tail,
            cursor: head,
            operand,
            reversed,
            left: None,
            right: None,
            active: false,
            winding: Winding::default(),
            class: Class::default(),
            marked: false,
        }
    }

    /// How much this chain changes its own shape's winding number, going
    /// from its left to its right.
    pub fn delta(&self) -> i32 {
        if self.reversed {
            -1
        } else {
            1
        }
    }
}

/// All the storage of one sweep.
#[derive(Debug)]
pub(crate) struct Pools {
    pub segs: SegVec<Seg>,
    pub verts: VertVec<Vertex>,
    pub chains: ChainVec<Chain>,
    pub curves: CurveVec<kurbo::CubicBez>,
    pub counters: Counters,
    max_vertices: usize,
}

impl Pools {
    pub fn new(max_vertices: usize) -> Pools {
        Pools {
            segs: SegVec::default(),
            verts: VertVec::default(),
            chains: ChainVec::default(),
            curves: CurveVec::default(),
            counters: Counters::default(),
            max_vertices,
        }
    }

    pub fn push_vertex(&mut self, v: Vertex) -> Result<VertIdx, Error> {
        if self.verts.len() >= self.max_vertices {
            return Err(Error::TooComplex {
                limit: self.max_vertices,
            });
        }
        Counters::bump(&self.counters.vertices);
        Ok(self.verts.push(v))
    }

    pub fn cmp_verts(&self, a: VertIdx, b: VertIdx) -> Ordering {
        cmp_loc(&self.verts[a].loc, &self.verts[b].loc, &self.counters)
    }

    /// The vertex after the chain's cursor.
    pub fn next_vertex(&self, c: ChainIdx) -> Result<VertIdx, Error> {
        self.verts[self.chains[c].cursor]
            .next
            .ok_or(Error::Internal("active chain has no current edge"))
    }

    /// The supporting segment of the chain's current edge.
    pub fn current_seg(&self, c: ChainIdx) -> Result<SegIdx, Error> {
        self.verts[self.chains[c].cursor]
            .seg
            .ok_or(Error::Internal("active chain has no current edge"))
    }

    /// The vertices of a chain, from head to tail.
    pub fn chain_vertices(&self, c: ChainIdx) -> impl Iterator<Item = VertIdx> + '_ {
        let tail = self.chains[c].tail;
        let mut cur = Some(self.chains[c].head);
        std::iter::from_fn(move || {
            let v = cur?;
            cur = if v == tail { None } else { self.verts[v].next };
            Some(v)
        })
    }

    /// Inserts a new vertex at `loc`, in the middle of the edge starting at `v`.
    pub fn split_edge(
        &mut self,
        v: VertIdx,
        loc: Loc,
        cross: Option<(SegIdx, SegIdx)>,
    ) -> Result<VertIdx, Error> {
        let next = self.verts[v]
            .next
            .ok_or(Error::Internal("splitting a missing edge"))?;
        let approx = loc.approx();
        let (before, after) = match self.verts[v].fragment {
            Some(frag) => {
                let frac = edge_fraction(self.verts[v].approx, self.verts[next].approx, approx);
                let (b, a) = frag.split(frac);
                (Some(b), Some(a))
            }
            None => (None, None),
        };
        let new = self.push_vertex(Vertex {
            loc,
            approx,
            next: Some(next),
            prev: Some(v),
            seg: self.verts[v].seg,
            cross,
            fragment: after,
        })?;
        self.verts[v].next = Some(new);
        self.verts[v].fragment = before;
        self.verts[next].prev = Some(new);
        Ok(new)
    }

    /// Splits a chain at one of its interior vertices.
    ///
    /// The original chain keeps everything up to and including `v`; a new
    /// chain starting at a copy of `v` takes the rest.
    pub fn split_chain(&mut self, c: ChainIdx, v: VertIdx) -> Result<ChainIdx, Error> {
        let next = self.verts[v]
            .next
            .ok_or(Error::Internal("splitting a chain at its tail"))?;
        let copy = Vertex {
            next: Some(next),
            prev: None,
            ..self.verts[v].clone()
        };
        let copy = self.push_vertex(copy)?;
        self.verts[next].prev = Some(copy);
        let orig = &mut self.verts[v];
        orig.next = None;
        orig.seg = None;
        orig.fragment = None;

        let chain = &self.chains[c];
        let new = Chain::new(copy, chain.tail, chain.operand, chain.reversed);
        self.chains[c].tail = v;
        Counters::bump(&self.counters.splits);
        Ok(self.chains.push(new))
    }
}

// How far along the segment from `a` to `b` the point `p` is.
fn edge_fraction(a: Point, b: Point, p: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let frac = if dx.abs() > dy.abs() {
        (p.x - a.x) / dx
    } else if dy != 0.0 {
        (p.y - a.y) / dy
    } else {
        0.0
    };
    frac.clamp(0.0, 1.0)
}

/// A run of input points that is monotonic in sweep order.
#[derive(Debug)]
struct Run {
    points: Vec<Point>,
    /// One per edge, in the figure's direction.
    fragments: Vec<Option<CurveFragment>>,
    ascending: bool,
}

/// Turns figures into chains.
///
/// Points are fed in one figure at a time. Each new point either continues
/// the current run (if it keeps going in the same direction, in sweep order)
/// or starts a new one from a copy of the turning point. When the figure is
/// closed, the run ending at the start point is spliced onto the run leaving
/// it if they go the same way.
pub(crate) struct ChainBuilder<'a> {
    pools: &'a mut Pools,
    operand: Operand,
    start: Option<Point>,
    last: Option<Point>,
    runs: Vec<Run>,
    // A curve fragment whose edge got swallowed by rounding, to be merged
    // into the next edge.
    pending: Option<CurveFragment>,
    chains: Vec<ChainIdx>,
}

impl<'a> ChainBuilder<'a> {
    pub fn new(pools: &'a mut Pools, operand: Operand) -> Self {
        ChainBuilder {
            pools,
            operand,
            start: None,
            last: None,
            runs: Vec::new(),
            pending: None,
            chains: Vec::new(),
        }
    }

    pub fn pools(&mut self) -> &mut Pools {
        self.pools
    }

    pub fn begin_figure(&mut self, p: Point) -> Result<(), Error> {
        if self.start.is_some() {
            self.end_figure()?;
        }
        self.start = Some(p);
        self.last = Some(p);
        Ok(())
    }

    /// Adds an edge from the previous point to `p`.
    ///
    /// `fragment` describes where the edge came from, oriented along the figure.
    pub fn line_to(&mut self, p: Point, fragment: Option<CurveFragment>) {
        let Some(last) = self.last else {
            self.begin_figure_silently(p);
            return;
        };
        if p == last {
            // Zero-length edges don't affect the fill.
            if let Some(f) = fragment {
                self.pending = Some(self.merge_pending(f));
            }
            return;
        }
        let fragment = fragment.map(|f| self.merge_pending(f));
        self.pending = None;

        let ascending = last < p;
        match self.runs.last_mut() {
            Some(run) if run.ascending == ascending && run.points.last() == Some(&last) => {
                run.points.push(p);
                run.fragments.push(fragment);
            }
            _ => self.runs.push(Run {
                points: vec![last, p],
                fragments: vec![fragment],
                ascending,
            }),
        }
        self.last = Some(p);
    }

    fn begin_figure_silently(&mut self, p: Point) {
        self.start = Some(p);
        self.last = Some(p);
    }

    fn merge_pending(&self, f: CurveFragment) -> CurveFragment {
        match self.pending {
            Some(pending) if pending.curve == f.curve => CurveFragment {
                t0: pending.t0,
                ..f
            },
            _ => f,
        }
    }

    /// Closes the current figure (with a straight edge, if necessary) and
    /// turns its runs into chains.
    pub fn end_figure(&mut self) -> Result<(), Error> {
        let Some(start) = self.start.take() else {
            return Ok(());
        };
        self.line_to(start, None);
        self.last = None;
        self.pending = None;

        let mut runs = std::mem::take(&mut self.runs);
        // A closed figure that goes anywhere at all goes both up and down.
        if runs.len() < 2 {
            return Ok(());
        }
        if runs[0].ascending == runs[runs.len() - 1].ascending {
            if let Some(mut last) = runs.pop() {
                let first = &mut runs[0];
                last.points.extend_from_slice(&first.points[1..]);
                last.fragments.append(&mut first.fragments);
                *first = last;
            }
        }
        for run in runs {
            self.add_run(run)?;
        }
        Ok(())
    }

    fn add_run(&mut self, run: Run) -> Result<(), Error> {
        let Run {
            mut points,
            fragments,
            ascending,
        } = run;
        let mut fragments: Vec<_> = if ascending {
            fragments
        } else {
            points.reverse();
            fragments
                .into_iter()
                .rev()
                .map(|f| f.map(CurveFragment::reversed))
                .collect()
        };
        fragments.push(None);

        let mut head = None;
        let mut prev: Option<VertIdx> = None;
        for (i, (&p, fragment)) in points.iter().zip(fragments).enumerate() {
            let seg = match points.get(i + 1) {
                Some(&q) => Some(self.pools.segs.push(Seg::new(p, q))),
                None => None,
            };
            let v = self.pools.push_vertex(Vertex {
                loc: Loc::Grid(p),
                approx: p,
                next: None,
                prev,
                seg,
                cross: None,
                fragment,
            })?;
            if let Some(prev) = prev {
                self.pools.verts[prev].next = Some(v);
            }
            head.get_or_insert(v);
            prev = Some(v);
        }
        let (Some(head), Some(tail)) = (head, prev) else {
            return Err(Error::Internal("empty chain"));
        };
        let chain = Chain::new(head, tail, self.operand, !ascending);
        self.chains.push(self.pools.chains.push(chain));
        Ok(())
    }

    /// Finishes the last figure, returning all the chains that were built.
    pub fn finish(mut self) -> Result<Vec<ChainIdx>, Error> {
        self.end_figure()?;
        Ok(self.chains)
    }
}
