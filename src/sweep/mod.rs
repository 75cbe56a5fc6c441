//! The sweep-line driver.
//!
//! The sweep visits every vertex in sweep order (increasing `y`, then
//! increasing `x`). At each stop it either just moves one chain's cursor
//! forward, or, when chains begin, end, or meet there, builds a [`Junction`]
//! and hands it to a [`JunctionTask`]. Crossings are found on the fly by
//! testing chains when they become neighbors, and are inserted as new
//! vertices of both chains.

use std::cmp::Ordering;

use crate::chain::{ChainIdx, Pools, VertIdx};
use crate::metrics::Metrics;
use crate::Error;

mod active;
mod candidates;
mod junction;

use active::ActiveList;
use candidates::CandidateList;
pub(crate) use junction::Junction;

/// The part of the sweep that differs between the Boolean combiner and the
/// tessellator.
pub(crate) trait JunctionTask {
    /// Called when an active chain passes through one of its own vertices and
    /// nothing else happens there.
    fn advance(&mut self, pools: &Pools, chain: ChainIdx, vertex: VertIdx) -> Result<(), Error>;

    /// Called once per junction, after tails have been retired and heads
    /// have been ordered and given their winding numbers, but before the heads
    /// are activated. This is where heads get classified.
    fn process_junction(&mut self, pools: &mut Pools, junction: &Junction) -> Result<(), Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Event {
    /// An inactive chain's head.
    Head,
    /// An active chain's next vertex.
    Vertex(ChainIdx),
}

/// One sweep over a set of chains.
///
/// A sweep is single-use: it owns all of its storage and gives it up when it
/// finishes.
pub(crate) struct Sweep {
    pools: Pools,
    /// Inactive chains, sorted by head.
    master: Vec<ChainIdx>,
    next_head: usize,
    active: ActiveList,
    candidates: CandidateList,
    junction: Junction,
}

impl Sweep {
    pub fn new(pools: Pools, mut chains: Vec<ChainIdx>) -> Sweep {
        chains.sort_by(|&a, &b| {
            pools
                .cmp_verts(pools.chains[a].head, pools.chains[b].head)
                .then(a.cmp(&b))
        });
        Sweep {
            pools,
            master: chains,
            next_head: 0,
            active: ActiveList::default(),
            candidates: CandidateList::default(),
            junction: Junction::default(),
        }
    }

    /// Runs the sweep to completion.
    pub fn run<T: JunctionTask>(mut self, task: &mut T) -> Result<Metrics, Error> {
        tracing::debug!(
            chains = self.master.len(),
            vertices = self.pools.verts.len(),
            "starting sweep"
        );
        let result = self.run_inner(task);
        let metrics = self.pools.counters.snapshot();
        match result {
            Ok(()) => {
                tracing::debug!(?metrics, "finished sweep");
                Ok(metrics)
            }
            Err(e) => {
                tracing::debug!(error = %e, ?metrics, "sweep failed");
                debug_assert!(!matches!(e, Error::Internal(_)), "{e}");
                Err(e)
            }
        }
    }

    fn run_inner<T: JunctionTask>(&mut self, task: &mut T) -> Result<(), Error> {
        while let Some(event) = self.next_event()? {
            match event {
                Event::Head => self.process_at_head(task)?,
                Event::Vertex(c) => self.process_at_vertex(c, task)?,
            }
            self.check_invariants();
        }
        if !self.active.is_empty() || !self.candidates.is_empty() {
            return Err(Error::Internal("chains still active after the sweep"));
        }
        Ok(())
    }

    fn next_event(&self) -> Result<Option<Event>, Error> {
        let head = self.master.get(self.next_head).copied();
        let cand = self.candidates.top();
        Ok(match (head, cand) {
            (None, None) => None,
            (Some(_), None) => Some(Event::Head),
            (None, Some(c)) => Some(Event::Vertex(c)),
            (Some(h), Some(c)) => {
                let next = self.pools.next_vertex(c)?;
                match self.pools.cmp_verts(self.pools.chains[h].head, next) {
                    Ordering::Less => Some(Event::Head),
                    Ordering::Greater => Some(Event::Vertex(c)),
                    // Building a junction from a tail is cheaper, so let the
                    // terminating chain go first.
                    Ordering::Equal if next == self.pools.chains[c].tail => Some(Event::Vertex(c)),
                    Ordering::Equal => Some(Event::Head),
                }
            }
        })
    }

    #[cfg(feature = "slow-asserts")]
    fn check_invariants(&self) {
        use crate::predicates::side_of;

        let chains = &self.pools.chains;
        let mut count = 0;
        let mut prev: Option<ChainIdx> = None;
        for c in self.active.iter(chains) {
            count += 1;
            assert_eq!(chains[c].left, prev, "broken active list at {c:?}");
            assert!(chains[c].active);
            assert!(self.candidates.contains(c), "{c:?} is active but not a candidate");
            if let Some(p) = prev {
                // The right chain's current vertex must not be left of the left chain,
                // and vice versa.
                let seg_l = &self.pools.segs[self.pools.current_seg(p).unwrap()];
                let seg_r = &self.pools.segs[self.pools.current_seg(c).unwrap()];
                let cur_r = &self.pools.verts[chains[c].cursor].loc;
                let cur_l = &self.pools.verts[chains[p].cursor].loc;
                if self.pools.cmp_verts(chains[c].cursor, chains[p].cursor) != Ordering::Less {
                    assert_ne!(side_of(cur_r, seg_l, &self.pools.counters), Ordering::Greater);
                } else {
                    assert_ne!(side_of(cur_l, seg_r, &self.pools.counters), Ordering::Less);
                }
            }
            prev = Some(c);
        }
        assert_eq!(count, self.active.len());
        assert_eq!(count, self.candidates.len());
        self.candidates.check_invariants(&self.pools);
    }

    #[cfg(not(feature = "slow-asserts"))]
    fn check_invariants(&self) {}

    /// Draws every chain in the sweep, for debugging.
    #[cfg(feature = "debug-svg")]
    pub fn dump_svg(&self) -> svg::Document {
        use svg::node::element::{path::Data, Circle, Path};

        let pools = &self.pools;
        let mut document = svg::Document::new();
        let (mut min, mut max) = ((f64::INFINITY, f64::INFINITY), (f64::NEG_INFINITY, f64::NEG_INFINITY));
        for c in pools.chains.indices() {
            let mut data = Data::new();
            for (i, v) in pools.chain_vertices(c).enumerate() {
                let p = pools.verts[v].approx;
                min = (min.0.min(p.x), min.1.min(p.y));
                max = (max.0.max(p.x), max.1.max(p.y));
                data = if i == 0 {
                    data.move_to((p.x, p.y))
                } else {
                    data.line_to((p.x, p.y))
                };
            }
            let color = match pools.chains[c].operand {
                crate::chain::Operand::A => "red",
                crate::chain::Operand::B => "blue",
            };
            document = document.add(
                Path::new()
                    .set("d", data)
                    .set("stroke", color)
                    .set("fill", "none")
                    .set("vector-effect", "non-scaling-stroke"),
            );
            let head = pools.verts[pools.chains[c].head].approx;
            document = document.add(
                Circle::new()
                    .set("cx", head.x)
                    .set("cy", head.y)
                    .set("r", 0.5)
                    .set("fill", color),
            );
        }
        if min.0 <= max.0 {
            document = document.set(
                "viewBox",
                (min.0 - 1.0, min.1 - 1.0, max.0 - min.0 + 2.0, max.1 - min.1 + 2.0),
            );
        }
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainBuilder, Operand, Side, Winding};
    use crate::geom::Point;
    use assert_matches::assert_matches;

    // Records everything the sweep tells it.
    #[derive(Default)]
    struct Recorder {
        junctions: Vec<(Point, usize, usize)>,
        advances: Vec<Point>,
        head_windings: Vec<Winding>,
    }

    impl JunctionTask for Recorder {
        fn advance(&mut self, pools: &Pools, _chain: ChainIdx, v: VertIdx) -> Result<(), Error> {
            self.advances.push(pools.verts[v].approx);
            Ok(())
        }

        fn process_junction(&mut self, pools: &mut Pools, j: &Junction) -> Result<(), Error> {
            self.junctions
                .push((j.point, j.tails.len(), j.heads.len()));
            for &h in &j.heads {
                self.head_windings.push(pools.chains[h].winding);
                pools.chains[h].class.side = Side::Left;
            }
            Ok(())
        }
    }

    fn sweep(figures: &[&[(f64, f64)]]) -> (Recorder, Metrics) {
        let mut pools = Pools::new(10_000);
        let mut builder = ChainBuilder::new(&mut pools, Operand::A);
        for fig in figures {
            builder.begin_figure(fig[0].into()).unwrap();
            for &p in &fig[1..] {
                builder.line_to(p.into(), None);
            }
        }
        let chains = builder.finish().unwrap();
        let mut rec = Recorder::default();
        let metrics = Sweep::new(pools, chains).run(&mut rec).unwrap();
        (rec, metrics)
    }

    #[test]
    fn square() {
        let (rec, metrics) = sweep(&[&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]]);
        assert_eq!(
            rec.junctions,
            vec![(Point::new(0.0, 0.0), 0, 2), (Point::new(10.0, 10.0), 2, 0)]
        );
        // The corners in the middle of each chain are just passed through.
        assert_eq!(
            rec.advances,
            vec![Point::new(10.0, 0.0), Point::new(0.0, 10.0)]
        );
        assert_eq!(metrics.junctions, 2);
        assert_eq!(metrics.advances, 2);
        assert_eq!(metrics.intersections, 0);
    }

    #[test]
    fn crossing_squares() {
        let (rec, metrics) = sweep(&[
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            &[(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)],
        ]);
        assert_eq!(metrics.intersections, 2);
        let crossings: Vec<_> = rec
            .junctions
            .iter()
            .filter(|(_, tails, heads)| *tails == 2 && *heads == 2)
            .map(|(p, _, _)| *p)
            .collect();
        assert_eq!(crossings, vec![Point::new(10.0, 5.0), Point::new(5.0, 10.0)]);
    }

    #[test]
    fn windings_of_nested_squares() {
        let (rec, _) = sweep(&[
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            &[(2.0, 2.0), (8.0, 2.0), (8.0, 8.0), (2.0, 8.0)],
        ]);
        // The heads at the top of the inner square see the outer square's winding.
        let inner: Vec<_> = rec.head_windings[2..4].iter().map(|w| w.a.abs()).collect();
        assert_eq!(inner, vec![2, 1]);
    }

    #[test]
    fn pentagram() {
        // Every edge crosses two others.
        let pts = [
            (0.0, -100.0),
            (59.0, 81.0),
            (-95.0, -31.0),
            (95.0, -31.0),
            (-59.0, 81.0),
        ];
        let (_, metrics) = sweep(&[&pts]);
        assert_eq!(metrics.intersections, 5);
    }

    #[test]
    fn touching_squares() {
        // The second square's top-left corner lies on the first square's
        // right edge, and their edges overlap below it.
        let (rec, metrics) = sweep(&[
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            &[(10.0, 5.0), (20.0, 5.0), (20.0, 15.0), (10.0, 15.0)],
        ]);
        assert_eq!(metrics.intersections, 0);
        assert!(rec.junctions.contains(&(Point::new(10.0, 5.0), 1, 3)));
        // The two overlapping edges end at (10, 10) together.
        assert!(rec
            .junctions
            .iter()
            .any(|&(p, tails, _)| p == Point::new(10.0, 10.0) && tails >= 2));
    }

    #[test]
    fn too_many_vertices() {
        let mut pools = Pools::new(8);
        let mut builder = ChainBuilder::new(&mut pools, Operand::A);
        let fig = [(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)];
        builder.begin_figure(fig[0].into()).unwrap();
        for &p in &fig[1..] {
            builder.line_to(p.into(), None);
        }
        let chains = builder.finish().unwrap();
        // The bow tie needs an intersection vertex (and a split copy of it), which is too many.
        let result = Sweep::new(pools, chains).run(&mut Recorder::default());
        assert_matches!(result, Err(Error::TooComplex { limit: 8 }));
    }
}
