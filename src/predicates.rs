//! Exact geometric predicates.
//!
//! Each predicate is a small named expression (see [`Expr`]) whose sign is
//! computed by [`sign`], which walks up the numeric tiers in [`crate::num`]
//! until one of them is sure of the answer. The sweep never looks at
//! coordinates directly: every ordering decision it makes goes through here.

use std::cmp::Ordering;

use crate::geom::{Loc, Seg};
use crate::metrics::Counters;
use crate::num::{Approx, Interval, Ring, Tier, Wide};

/// An expression whose sign we want to know exactly.
pub(crate) trait Expr {
    /// The number of 32-bit words that the exact tier needs to hold every
    /// intermediate value of this expression.
    const EXACT_WORDS: usize;

    /// Evaluates the expression in some numeric tier.
    fn eval<R: Ring>(&self) -> R;

    /// The first, cheapest attempt at the sign.
    fn quick_sign(&self) -> Option<Ordering> {
        self.eval::<Approx>().sign()
    }
}

/// Computes the exact sign of `expr`, escalating precision only as needed.
pub(crate) fn sign<E: Expr>(expr: &E, counters: &Counters) -> Ordering {
    if let Some(s) = expr.quick_sign() {
        counters.decided_by(Tier::Double);
        return s;
    }
    if let Some(s) = expr.eval::<Interval>().sign() {
        counters.decided_by(Tier::Interval);
        return s;
    }
    counters.decided_by(Tier::Exact);
    let exact = match E::EXACT_WORDS {
        0..=2 => expr.eval::<Wide<2>>().sign(),
        3..=4 => expr.eval::<Wide<4>>().sign(),
        _ => {
            debug_assert!(E::EXACT_WORDS <= 6);
            expr.eval::<Wide<6>>().sign()
        }
    };
    // The exact tier always knows.
    exact.unwrap_or(Ordering::Equal)
}

/// The 2x2 determinant `a·d − b·c`, for integers of at most 31 bits.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Det2 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Expr for Det2 {
    const EXACT_WORDS: usize = 2;

    fn eval<R: Ring>(&self) -> R {
        let [a, b, c, d] = [self.a, self.b, self.c, self.d].map(R::from_int);
        a * d - b * c
    }

    // Rounding is monotonic, so if the rounded products differ then the exact
    // ones differ in the same direction. If they agree and are small enough
    // to be exact, they really are equal.
    fn quick_sign(&self) -> Option<Ordering> {
        let ad = self.a * self.d;
        let bc = self.b * self.c;
        if ad != bc {
            Some(crate::num::cmp_f64(ad, bc))
        } else if ad.abs() <= (1u64 << 53) as f64 {
            Some(Ordering::Equal)
        } else {
            None
        }
    }
}

/// Which coordinate of two locations to compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Axis {
    X,
    Y,
}

/// Compares one coordinate of two locations without dividing:
/// `A_a · W_b − A_b · W_a`.
pub(crate) struct CmpAxis<'a> {
    pub a: &'a Loc,
    pub b: &'a Loc,
    pub axis: Axis,
}

impl Expr for CmpAxis<'_> {
    const EXACT_WORDS: usize = 6;

    fn eval<R: Ring>(&self) -> R {
        let [ax, ay, aw] = self.a.homogeneous::<R>();
        let [bx, by, bw] = self.b.homogeneous::<R>();
        match self.axis {
            Axis::X => ax * bw - bx * aw,
            Axis::Y => ay * bw - by * aw,
        }
    }
}

/// The cross product `d × (p − lo)`, where `d` is the direction of a segment
/// and `lo` is its starting point. It is positive if `p` is to the left of the
/// segment.
pub(crate) struct SideOf<'a> {
    pub p: &'a Loc,
    pub seg: &'a Seg,
}

impl Expr for SideOf<'_> {
    const EXACT_WORDS: usize = 4;

    fn eval<R: Ring>(&self) -> R {
        let [x, y, w] = self.p.homogeneous::<R>();
        let [x0, y0, dx, dy] = [
            self.seg.lo.x,
            self.seg.lo.y,
            self.seg.dx(),
            self.seg.dy(),
        ]
        .map(R::from_int);
        dx * (y - y0 * w) - dy * (x - x0 * w)
    }
}

/// The orientation of three points with 53-bit integer coordinates: the cross
/// product `(b − a) × (c − a)`.
pub(crate) struct Orient {
    pub a: [f64; 2],
    pub b: [f64; 2],
    pub c: [f64; 2],
}

impl Expr for Orient {
    const EXACT_WORDS: usize = 4;

    fn eval<R: Ring>(&self) -> R {
        let [ax, ay, bx, by, cx, cy] = [
            self.a[0], self.a[1], self.b[0], self.b[1], self.c[0], self.c[1],
        ]
        .map(R::from_int);
        (bx - ax) * (cy - ay) - (by - ay) * (cx - ax)
    }
}

/// Compares two locations in sweep order: by `y`, and then by `x`.
pub(crate) fn cmp_loc(a: &Loc, b: &Loc, counters: &Counters) -> Ordering {
    if let (Loc::Grid(p), Loc::Grid(q)) = (a, b) {
        return p.cmp(q);
    }
    if a == b {
        return Ordering::Equal;
    }
    sign(&CmpAxis { a, b, axis: Axis::Y }, counters)
        .then_with(|| sign(&CmpAxis { a, b, axis: Axis::X }, counters))
}

/// Which side of (the line through) `seg` the location `p` is on.
///
/// Returns `Greater` if `p` is to the left, `Less` if it is to the right, and
/// `Equal` if it's on the line.
pub(crate) fn side_of(p: &Loc, seg: &Seg, counters: &Counters) -> Ordering {
    sign(&SideOf { p, seg }, counters)
}

/// Compares the directions of two segments, as seen from a common starting
/// point below the sweep line.
///
/// Returns `Less` if `s` points to the left of `t`. Directions are ordered from
/// straight-left-and-down to straight right; horizontal segments come last.
pub(crate) fn cmp_direction(s: &Seg, t: &Seg, counters: &Counters) -> Ordering {
    sign(
        &Det2 {
            a: s.dx(),
            b: s.dy(),
            c: t.dx(),
            d: t.dy(),
        },
        counters,
    )
}

/// Where a point falls on an edge, treated as the half-open interval
/// between its first and last points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OnEdge {
    Before,
    AtFirst,
    Interior,
    AtLast,
    After,
}

impl OnEdge {
    /// Is the point on the edge, not counting the edge's first point?
    pub fn is_hit(self) -> bool {
        matches!(self, OnEdge::Interior | OnEdge::AtLast)
    }
}

/// Locates `p` along the edge from `first` to `last`, assuming that `p` is on
/// the line through them.
pub(crate) fn locate_on_edge(p: &Loc, first: &Loc, last: &Loc, counters: &Counters) -> OnEdge {
    match cmp_loc(p, first, counters) {
        Ordering::Less => OnEdge::Before,
        Ordering::Equal => OnEdge::AtFirst,
        Ordering::Greater => match cmp_loc(p, last, counters) {
            Ordering::Less => OnEdge::Interior,
            Ordering::Equal => OnEdge::AtLast,
            Ordering::Greater => OnEdge::After,
        },
    }
}

/// One edge of a chain: a piece of an input segment, between two vertices.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Edge<'a> {
    pub seg: &'a Seg,
    pub first: &'a Loc,
    pub last: &'a Loc,
}

/// The result of intersecting two edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Intersection {
    /// The edges don't meet (not counting their first points).
    Empty,
    /// The edges lie on a common line.
    Collinear,
    /// The edges cross (or touch) at a single point.
    Transverse {
        at: Loc,
        on_left: OnEdge,
        on_right: OnEdge,
    },
}

/// Intersects two edges, `left` and `right`.
///
/// The returned location is exact: either a grid point, or the pair of
/// supporting segments (which lets later comparisons be escalated to
/// higher precision without recomputing anything here).
pub(crate) fn intersect(left: Edge<'_>, right: Edge<'_>, counters: &Counters) -> Intersection {
    let (s, t) = (left.seg, right.seg);
    let at = match cmp_direction(s, t, counters) {
        Ordering::Greater => Loc::cross(s, t),
        Ordering::Less => Loc::cross(t, s),
        Ordering::Equal => {
            return if side_of(&Loc::Grid(t.lo), s, counters) == Ordering::Equal {
                Intersection::Collinear
            } else {
                Intersection::Empty
            };
        }
    };
    let on_left = locate_on_edge(&at, left.first, left.last, counters);
    if !on_left.is_hit() {
        return Intersection::Empty;
    }
    let on_right = locate_on_edge(&at, right.first, right.last, counters);
    if !on_right.is_hit() {
        return Intersection::Empty;
    }
    Intersection::Transverse {
        at,
        on_left,
        on_right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::tests::Reasonable;
    use crate::geom::Point;
    use malachite::Rational;
    use proptest::prelude::*;

    fn exact_coords(loc: &Loc) -> (Rational, Rational) {
        match loc {
            Loc::Grid(p) => (
                Rational::try_from(p.x).unwrap(),
                Rational::try_from(p.y).unwrap(),
            ),
            Loc::Cross(s, t) => {
                let r = |x: f64| Rational::try_from(x).unwrap();
                let w = r(s.dx()) * r(t.dy()) - r(s.dy()) * r(t.dx());
                let num = (r(t.lo.x) - r(s.lo.x)) * r(t.dy()) - (r(t.lo.y) - r(s.lo.y)) * r(t.dx());
                let u = num / w;
                (
                    r(s.lo.x) + u.clone() * r(s.dx()),
                    r(s.lo.y) + u * r(s.dy()),
                )
            }
        }
    }

    fn exact_cmp(a: &Loc, b: &Loc) -> Ordering {
        let (ax, ay) = exact_coords(a);
        let (bx, by) = exact_coords(b);
        ay.cmp(&by).then(ax.cmp(&bx))
    }

    fn seg_pair() -> impl Strategy<Value = (Seg, Seg)> {
        (Seg::reasonable(), Seg::reasonable())
            .prop_filter("parallel", |(s, t)| {
                (s.dx() as i128) * (t.dy() as i128) != (s.dy() as i128) * (t.dx() as i128)
            })
            .prop_map(|(s, t)| {
                if (s.dx() as i128) * (t.dy() as i128) > (s.dy() as i128) * (t.dx() as i128) {
                    (s, t)
                } else {
                    (t, s)
                }
            })
    }

    fn loc() -> impl Strategy<Value = Loc> {
        prop_oneof![
            Point::reasonable().prop_map(Loc::Grid),
            seg_pair().prop_map(|(s, t)| Loc::cross(&s, &t)),
        ]
    }

    #[test]
    fn det2_ties() {
        let c = Counters::default();
        let big = (1u64 << 30) as f64;
        let d = Det2 {
            a: big - 1.0,
            b: big + 1.0,
            c: big - 3.0,
            d: big + 3.0,
        };
        // (2^30 - 1)(2^30 + 3) - (2^30 + 1)(2^30 - 3) = 2^32
        assert_eq!(sign(&d, &c), Ordering::Greater);
        let tie = Det2 {
            a: big + 1.0,
            b: big + 1.0,
            c: big + 1.0,
            d: big + 1.0,
        };
        assert_eq!(sign(&tie, &c), Ordering::Equal);
    }

    #[test]
    fn sides() {
        let c = Counters::default();
        let seg = Seg::new(Point::new(0.0, 0.0), Point::new(0.0, 10.0));
        let left = Loc::Grid(Point::new(-1.0, 5.0));
        let right = Loc::Grid(Point::new(1.0, 5.0));
        let on = Loc::Grid(Point::new(0.0, 20.0));
        assert_eq!(side_of(&left, &seg, &c), Ordering::Greater);
        assert_eq!(side_of(&right, &seg, &c), Ordering::Less);
        assert_eq!(side_of(&on, &seg, &c), Ordering::Equal);
    }

    #[test]
    fn directions() {
        let c = Counters::default();
        let o = Point::new(0.0, 0.0);
        let down_left = Seg::new(o, Point::new(-1.0, 1.0));
        let down = Seg::new(o, Point::new(0.0, 1.0));
        let right = Seg::new(o, Point::new(1.0, 0.0));
        assert_eq!(cmp_direction(&down_left, &down, &c), Ordering::Less);
        assert_eq!(cmp_direction(&down, &right, &c), Ordering::Less);
        assert_eq!(cmp_direction(&right, &down_left, &c), Ordering::Greater);
        assert_eq!(cmp_direction(&down, &down, &c), Ordering::Equal);
    }

    #[test]
    fn crossing_and_touching() {
        let c = Counters::default();
        let s = Seg::new(Point::new(0.0, 0.0), Point::new(4.0, 4.0));
        let t = Seg::new(Point::new(4.0, 0.0), Point::new(0.0, 4.0));
        let edge = |seg: &Seg| (Loc::Grid(seg.lo), Loc::Grid(seg.hi));
        let (s0, s1) = edge(&s);
        let (t0, t1) = edge(&t);
        let e_s = Edge {
            seg: &s,
            first: &s0,
            last: &s1,
        };
        let e_t = Edge {
            seg: &t,
            first: &t0,
            last: &t1,
        };
        assert_eq!(
            intersect(e_s, e_t, &c),
            Intersection::Transverse {
                at: Loc::Grid(Point::new(2.0, 2.0)),
                on_left: OnEdge::Interior,
                on_right: OnEdge::Interior,
            }
        );

        // Touching at the last point of one edge.
        let u = Seg::new(Point::new(4.0, 0.0), Point::new(2.0, 2.0));
        let (u0, u1) = edge(&u);
        let e_u = Edge {
            seg: &u,
            first: &u0,
            last: &u1,
        };
        assert_matches::assert_matches!(
            intersect(e_s, e_u, &c),
            Intersection::Transverse {
                on_left: OnEdge::Interior,
                on_right: OnEdge::AtLast,
                ..
            }
        );

        // Sharing a first point doesn't count.
        let v = Seg::new(Point::new(0.0, 0.0), Point::new(-3.0, 5.0));
        let (v0, v1) = edge(&v);
        let e_v = Edge {
            seg: &v,
            first: &v0,
            last: &v1,
        };
        assert_eq!(intersect(e_v, e_s, &c), Intersection::Empty);

        let w = Seg::new(Point::new(1.0, 1.0), Point::new(8.0, 8.0));
        let (w0, w1) = edge(&w);
        let e_w = Edge {
            seg: &w,
            first: &w0,
            last: &w1,
        };
        assert_eq!(intersect(e_s, e_w, &c), Intersection::Collinear);
    }

    proptest! {
        #[test]
        fn cmp_loc_is_exact(a in loc(), b in loc()) {
            let c = Counters::default();
            prop_assert_eq!(cmp_loc(&a, &b, &c), exact_cmp(&a, &b));
            prop_assert_eq!(cmp_loc(&b, &a, &c), exact_cmp(&b, &a));
        }

        #[test]
        fn cmp_loc_is_reflexive(a in loc()) {
            let c = Counters::default();
            prop_assert_eq!(cmp_loc(&a, &a, &c), Ordering::Equal);
        }

        #[test]
        fn cmp_loc_is_transitive(a in loc(), b in loc(), d in loc()) {
            let c = Counters::default();
            let mut locs = [a, b, d];
            locs.sort_by(|x, y| cmp_loc(x, y, &c));
            prop_assert_ne!(cmp_loc(&locs[0], &locs[1], &c), Ordering::Greater);
            prop_assert_ne!(cmp_loc(&locs[1], &locs[2], &c), Ordering::Greater);
            prop_assert_ne!(cmp_loc(&locs[0], &locs[2], &c), Ordering::Greater);
        }

        #[test]
        fn crossings_are_on_both_lines((s, t) in seg_pair()) {
            let c = Counters::default();
            let at = Loc::cross(&s, &t);
            prop_assert_eq!(side_of(&at, &s, &c), Ordering::Equal);
            prop_assert_eq!(side_of(&at, &t, &c), Ordering::Equal);
        }

        #[test]
        fn side_is_exact(p in loc(), s in Seg::reasonable()) {
            let c = Counters::default();
            let (x, y) = exact_coords(&p);
            let r = |v: f64| Rational::try_from(v).unwrap();
            let cross = r(s.dx()) * (y - r(s.lo.y)) - r(s.dy()) * (x - r(s.lo.x));
            prop_assert_eq!(side_of(&p, &s, &c), cross.cmp(&Rational::from(0)));
        }

        #[test]
        fn near_collinear_points(x in -1000i64..1000, k in 1i64..(1 << 20), nudge in -1i64..=1) {
            // A point that is (almost) on a long, steep segment.
            let c = Counters::default();
            let s = Seg::new(Point::new(0.0, 0.0), Point::new(k as f64, (1 << 26) as f64 - 1.0));
            let y = (x.abs() * 64) as f64;
            let p = Loc::Grid(Point::new((y * k as f64 / ((1 << 26) as f64 - 1.0)).round() + nudge as f64, y));
            let (px, py) = exact_coords(&p);
            let r = |v: f64| Rational::try_from(v).unwrap();
            let cross = r(s.dx()) * py - r(s.dy()) * px;
            prop_assert_eq!(side_of(&p, &s, &c), cross.cmp(&Rational::from(0)));
        }
    }
}
