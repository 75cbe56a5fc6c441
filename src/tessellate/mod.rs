//! Triangulating the filled region.
//!
//! The filled region is divided into bands: each band is the part of the fill
//! between one boundary chain with the fill on its right and the next one with
//! the fill on its left. Each band keeps a ceiling, which is the lower
//! boundary of the part of the band that has already been triangulated. It
//! runs from the left chain's current vertex to the right chain's current
//! vertex, and is always reflex: every interior corner of it bends upwards.
//!
//! When a chain moves down, its new vertex is added to the matching end of the
//! ceiling, and every corner that stops being reflex gets cut off as a
//! triangle.

use std::cmp::Ordering;
use std::collections::VecDeque;

use kurbo::Affine;

use crate::boolean::Classifier;
use crate::chain::{ChainIdx, Pools, Side, VertIdx};
use crate::geom::Point;
use crate::metrics::Counters;
use crate::predicates::{sign, Orient};
use crate::sweep::{Junction, JunctionTask};
use crate::typed_vec::SideTable;
use crate::{Error, FillRule};

mod sink;

pub use sink::{GeometrySink, VertexBuffers, VertexId};

typed_vec!(BandVec, BandIdx, "band");

// An emitted vertex, along with its exact fixed-point coordinates.
type Corner = (VertexId, [f64; 2]);

#[derive(Debug)]
struct Band {
    left: ChainIdx,
    right: ChainIdx,
    ceiling: VecDeque<Corner>,
}

/// Sends vertices and triangles to the sink.
///
/// Vertices are emitted lazily, at most once per sweep stop. Each triangle is
/// held back until the next one arrives, so that two triangles forming a
/// parallelogram can be sent as one.
struct Emitter<'a, G> {
    sink: &'a mut G,
    transform: Affine,
    current: Option<(Point, Corner)>,
    pending: Option<[Corner; 3]>,
}

impl<G: GeometrySink> Emitter<'_, G> {
    fn vertex(&mut self, p: Point) -> Corner {
        if let Some((q, corner)) = self.current {
            if q == p {
                return corner;
            }
        }
        let id = self.sink.add_vertex(self.transform * p.to_kurbo());
        let corner = (id, p.fixed());
        self.current = Some((p, corner));
        corner
    }

    fn triangle(&mut self, t: [Corner; 3]) {
        if let Some(prev) = self.pending.take() {
            if let Some([a, b, c, d]) = parallelogram(&prev, &t) {
                self.sink.add_parallelogram(a, b, c, d);
                return;
            }
            self.sink.add_triangle(prev[0].0, prev[1].0, prev[2].0);
        }
        self.pending = Some(t);
    }

    fn flush(&mut self) {
        if let Some([a, b, c]) = self.pending.take() {
            self.sink.add_triangle(a.0, b.0, c.0);
        }
    }
}

// If two positively-oriented triangles share an edge and together make a
// parallelogram, returns its corners in positive order.
fn parallelogram(t: &[Corner; 3], u: &[Corner; 3]) -> Option<[VertexId; 4]> {
    for i in 0..3 {
        let (s1, s2, x) = (t[i], t[(i + 1) % 3], t[(i + 2) % 3]);
        for j in 0..3 {
            if u[j].0 != s2.0 || u[(j + 1) % 3].0 != s1.0 {
                continue;
            }
            let y = u[(j + 2) % 3];
            // Fixed-point coordinates are integers, so these sums are exact.
            let diagonals_bisect =
                (0..2).all(|k| x.1[k] + y.1[k] == s1.1[k] + s2.1[k]);
            if diagonals_bisect {
                return Some([x.0, s1.0, y.0, s2.0]);
            }
        }
    }
    None
}

// Adds a vertex to the left end of a ceiling, clipping off the corners that
// it makes convex.
fn push_front_and_clip<G: GeometrySink>(
    ceiling: &mut VecDeque<Corner>,
    v: Corner,
    out: &mut Emitter<'_, G>,
    counters: &Counters,
) {
    if ceiling.front().is_some_and(|c| c.0 == v.0) {
        return;
    }
    while ceiling.len() >= 2 {
        let (a, b) = (ceiling[0], ceiling[1]);
        if sign(&Orient { a: v.1, b: a.1, c: b.1 }, counters) != Ordering::Greater {
            break;
        }
        ceiling.pop_front();
        out.triangle([v, a, b]);
    }
    ceiling.push_front(v);
}

fn push_back_and_clip<G: GeometrySink>(
    ceiling: &mut VecDeque<Corner>,
    v: Corner,
    out: &mut Emitter<'_, G>,
    counters: &Counters,
) {
    if ceiling.back().is_some_and(|c| c.0 == v.0) {
        return;
    }
    while ceiling.len() >= 2 {
        let n = ceiling.len();
        let (a, b) = (ceiling[n - 1], ceiling[n - 2]);
        if sign(&Orient { a: v.1, b: a.1, c: b.1 }, counters) != Ordering::Less {
            break;
        }
        ceiling.pop_back();
        out.triangle([v, b, a]);
    }
    ceiling.push_back(v);
}

fn band_mut(bands: &mut BandVec<Option<Band>>, b: BandIdx) -> Result<&mut Band, Error> {
    bands[b]
        .as_mut()
        .ok_or(Error::Internal("band was already closed"))
}

/// The junction task for tessellation.
pub(crate) struct Tessellate<'a, G> {
    classifier: Classifier,
    bands: BandVec<Option<Band>>,
    band_of: SideTable<BandIdx>,
    open_bands: usize,
    emitter: Emitter<'a, G>,
    tails: Vec<(ChainIdx, Side)>,
    heads: Vec<(ChainIdx, Side)>,
}

impl<'a, G: GeometrySink> Tessellate<'a, G> {
    pub fn new(fill_rule: FillRule, sink: &'a mut G, transform: Affine) -> Self {
        Tessellate {
            classifier: Classifier::single(fill_rule),
            bands: BandVec::default(),
            band_of: SideTable::default(),
            open_bands: 0,
            emitter: Emitter {
                sink,
                transform,
                current: None,
                pending: None,
            },
            tails: Vec::new(),
            heads: Vec::new(),
        }
    }

    /// Flushes the last triangle, and checks that every band was closed.
    pub fn finish(mut self) -> Result<(), Error> {
        self.emitter.flush();
        if self.open_bands != 0 {
            return Err(Error::Internal("bands still open after the sweep"));
        }
        Ok(())
    }

    fn band_of(&self, c: ChainIdx) -> Result<BandIdx, Error> {
        self.band_of
            .get(c.0)
            .copied()
            .ok_or(Error::Internal("boundary chain has no band"))
    }

    fn open_band(&mut self, left: ChainIdx, right: ChainIdx, ceiling: VecDeque<Corner>) {
        let b = self.bands.push(Some(Band {
            left,
            right,
            ceiling,
        }));
        self.band_of.insert(left.0, b);
        self.band_of.insert(right.0, b);
        self.open_bands += 1;
    }

    // The band containing a point that isn't on any boundary chain, given
    // the active chain just to its left.
    fn enclosing_band(&self, pools: &Pools, mut left: Option<ChainIdx>) -> Result<BandIdx, Error> {
        while let Some(c) = left {
            match pools.chains[c].class.output() {
                Some(Side::Left) => return self.band_of(c),
                Some(Side::Right) => break,
                Some(Side::Redundant) | None => left = pools.chains[c].left,
            }
        }
        Err(Error::Internal("filled junction isn't inside any band"))
    }

    // A junction with no tails, inside a band, with new chains starting:
    // the band gets cut in two at the bottom-most vertex of its ceiling.
    fn split(
        &mut self,
        x: BandIdx,
        p: Corner,
        hr: ChainIdx,
        hl: ChainIdx,
        counters: &Counters,
    ) -> Result<(), Error> {
        let band = band_mut(&mut self.bands, x)?;
        // The ceiling is reflex, so the bottom-most vertex is visible from
        // anything below it.
        let m = (0..band.ceiling.len())
            .max_by(|&i, &j| {
                let (a, b) = (band.ceiling[i].1, band.ceiling[j].1);
                a[1].total_cmp(&b[1]).then(a[0].total_cmp(&b[0]))
            })
            .ok_or(Error::Internal("band with an empty ceiling"))?;
        let mut right_ceiling = band.ceiling.split_off(m);
        band.ceiling.push_back(right_ceiling[0]);
        let old_right = band.right;
        band.right = hr;
        push_back_and_clip(&mut band.ceiling, p, &mut self.emitter, counters);
        push_front_and_clip(&mut right_ceiling, p, &mut self.emitter, counters);
        self.band_of.insert(hr.0, x);
        self.open_band(hl, old_right, right_ceiling);
        Ok(())
    }

    // A junction with no heads, inside the fill on both sides: the band on
    // the right gets absorbed into the one on the left.
    fn merge(&mut self, x: BandIdx, y: BandIdx) -> Result<(), Error> {
        let absorbed = self.bands[y]
            .take()
            .ok_or(Error::Internal("band was already closed"))?;
        self.open_bands -= 1;
        let band = band_mut(&mut self.bands, x)?;
        // The shared junction vertex ends one ceiling and starts the other.
        band.ceiling.extend(absorbed.ceiling.into_iter().skip(1));
        band.right = absorbed.right;
        self.band_of.insert(absorbed.right.0, x);
        Ok(())
    }

    fn set_right(&mut self, b: BandIdx, c: ChainIdx) -> Result<(), Error> {
        band_mut(&mut self.bands, b)?.right = c;
        self.band_of.insert(c.0, b);
        Ok(())
    }

    fn set_left(&mut self, b: BandIdx, c: ChainIdx) -> Result<(), Error> {
        band_mut(&mut self.bands, b)?.left = c;
        self.band_of.insert(c.0, b);
        Ok(())
    }

    fn junction(&mut self, pools: &Pools, j: &Junction) -> Result<(), Error> {
        let boundary = |cs: &[ChainIdx], out: &mut Vec<(ChainIdx, Side)>| {
            out.clear();
            out.extend(
                cs.iter()
                    .filter_map(|&c| pools.chains[c].class.output().map(|s| (c, s))),
            );
        };
        let mut tails = std::mem::take(&mut self.tails);
        let mut heads = std::mem::take(&mut self.heads);
        boundary(&j.tails, &mut tails);
        boundary(&j.heads, &mut heads);

        let in_left = j
            .left
            .is_some_and(|l| self.classifier.result_fills(&pools.chains[l].winding));
        let in_right = in_left != (tails.len() % 2 == 1);
        if in_right != (in_left != (heads.len() % 2 == 1)) {
            return Err(Error::Internal("odd number of boundary chains at a junction"));
        }
        let result = if tails.is_empty() && heads.is_empty() {
            Ok(())
        } else {
            let p = self.emitter.vertex(j.point);
            self.close_and_reopen(pools, j, p, &tails, &heads, in_left, in_right)
        };
        self.tails = tails;
        self.heads = heads;
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn close_and_reopen(
        &mut self,
        pools: &Pools,
        j: &Junction,
        p: Corner,
        tails: &[(ChainIdx, Side)],
        heads: &[(ChainIdx, Side)],
        in_left: bool,
        in_right: bool,
    ) -> Result<(), Error> {
        let counters = &pools.counters;
        let alternation = Error::Internal("boundary chains don't alternate");

        // The bands touching the junction from the left and the right.
        let mut t = tails;
        let mut left_band = None;
        let mut right_band = None;
        if in_left {
            match t.split_first() {
                Some((&(c, Side::Right), rest)) => {
                    t = rest;
                    let b = self.band_of(c)?;
                    let band = band_mut(&mut self.bands, b)?;
                    push_back_and_clip(&mut band.ceiling, p, &mut self.emitter, counters);
                    left_band = Some(b);
                }
                Some(_) => return Err(alternation),
                None => left_band = Some(self.enclosing_band(pools, j.left)?),
            }
        }
        if in_right {
            match t.split_last() {
                Some((&(c, Side::Left), rest)) => {
                    t = rest;
                    let b = self.band_of(c)?;
                    let band = band_mut(&mut self.bands, b)?;
                    push_front_and_clip(&mut band.ceiling, p, &mut self.emitter, counters);
                    right_band = Some(b);
                }
                Some(_) => return Err(alternation),
                None => right_band = left_band,
            }
        }

        // Bands that end here.
        for pair in t.chunks(2) {
            let [(l, Side::Left), (r, Side::Right)] = pair else {
                return Err(alternation);
            };
            let b = self.band_of(*l)?;
            let band = band_mut(&mut self.bands, b)?;
            if band.left != *l || band.right != *r {
                return Err(Error::Internal("band closed by the wrong chains"));
            }
            push_back_and_clip(&mut band.ceiling, p, &mut self.emitter, counters);
            self.bands[b] = None;
            self.open_bands -= 1;
        }

        // The heads that continue the bands on either side.
        let mut h = heads;
        let mut new_right = None;
        let mut new_left = None;
        if in_left {
            match h.split_first() {
                Some((&(c, Side::Right), rest)) => {
                    h = rest;
                    new_right = Some(c);
                }
                Some(_) => return Err(alternation),
                None => {}
            }
        }
        if in_right {
            match h.split_last() {
                Some((&(c, Side::Left), rest)) => {
                    h = rest;
                    new_left = Some(c);
                }
                Some(_) => return Err(alternation),
                None => {}
            }
        }

        let mismatch = Error::Internal("bands don't match the chains at a junction");
        match (left_band, right_band) {
            (Some(x), Some(y)) if x == y => match (new_right, new_left) {
                (Some(hr), Some(hl)) => self.split(x, p, hr, hl, counters)?,
                _ => return Err(mismatch),
            },
            (Some(x), Some(y)) => match (new_right, new_left) {
                (None, None) => self.merge(x, y)?,
                (Some(hr), Some(hl)) => {
                    self.set_right(x, hr)?;
                    self.set_left(y, hl)?;
                }
                _ => return Err(mismatch),
            },
            (Some(x), None) => self.set_right(x, new_right.ok_or(mismatch)?)?,
            (None, Some(y)) => self.set_left(y, new_left.ok_or(mismatch)?)?,
            (None, None) => {}
        }

        // Bands that start here.
        for pair in h.chunks(2) {
            let [(l, Side::Left), (r, Side::Right)] = pair else {
                return Err(alternation);
            };
            self.open_band(*l, *r, VecDeque::from([p]));
        }
        Ok(())
    }
}

impl<G: GeometrySink> JunctionTask for Tessellate<'_, G> {
    fn advance(&mut self, pools: &Pools, chain: ChainIdx, vertex: VertIdx) -> Result<(), Error> {
        if pools.chains[chain].class.output().is_none() {
            return Ok(());
        }
        let b = self.band_of(chain)?;
        let v = self.emitter.vertex(pools.verts[vertex].approx);
        let band = band_mut(&mut self.bands, b)?;
        if band.left == chain {
            push_front_and_clip(&mut band.ceiling, v, &mut self.emitter, &pools.counters);
        } else if band.right == chain {
            push_back_and_clip(&mut band.ceiling, v, &mut self.emitter, &pools.counters);
        } else {
            return Err(Error::Internal("chain isn't a side of its band"));
        }
        Ok(())
    }

    fn process_junction(&mut self, pools: &mut Pools, junction: &Junction) -> Result<(), Error> {
        self.classifier.classify_heads(pools, &junction.heads)?;
        self.junction(pools, junction)
    }
}
