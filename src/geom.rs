//! Points, input segments, and the exact locations of sweep vertices.

use std::cmp::Ordering;

use crate::num::{cmp_f64, Ring};

/// The number of bits available to input coordinates.
///
/// Every input coordinate must be an integer with absolute value at most
/// [`GRID_LIMIT`]. This bound is what lets the exact predicates get away with
/// fixed-width integers: the widest intermediate value (comparing the
/// heights of two intersection points) needs 139 bits of magnitude.
pub const GRID_BITS: u32 = 26;

/// The largest allowed magnitude of an input coordinate; see [`GRID_BITS`].
pub const GRID_LIMIT: f64 = (1u64 << GRID_BITS) as f64;

/// Approximate positions of intersection points are rounded to multiples of
/// `1 / FIXED_SCALE`. Rounded coordinates times `FIXED_SCALE` are integers of
/// at most 52 bits, so the tessellator can run exact predicates on them too.
pub(crate) const FIXED_SCALE: f64 = GRID_LIMIT;

/// A two-dimensional point.
///
/// Points are sorted by `y` and then by `x`, which is the order in which the
/// sweep line visits them (it moves in increasing `y`).
#[derive(Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// Vertical coordinate. Larger values are "down".
    pub y: f64,
    /// Horizontal coordinate. Larger values are "right".
    pub x: f64,
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_f64(self.y, other.y).then_with(|| cmp_f64(self.x, other.x))
    }
}

impl PartialOrd for Point {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Point {}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl Point {
    /// Create a new point.
    ///
    /// Note that the `x` coordinate comes first, even though points are
    /// sorted by `y` first.
    pub fn new(x: f64, y: f64) -> Self {
        debug_assert!(x.is_finite());
        debug_assert!(y.is_finite());
        // Adding zero turns -0.0 into 0.0, so that equal points compare equal bitwise.
        Point {
            x: x + 0.0,
            y: y + 0.0,
        }
    }

    /// Is this a valid input point, with integer coordinates inside the grid?
    pub fn is_on_grid(&self) -> bool {
        let ok = |c: f64| c.fract() == 0.0 && c.abs() <= GRID_LIMIT;
        ok(self.x) && ok(self.y)
    }

    /// Converts to a `kurbo` point.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x, self.y)
    }

    pub(crate) fn fixed(self) -> [f64; 2] {
        [self.x * FIXED_SCALE, self.y * FIXED_SCALE]
    }

    fn snap(c: f64) -> f64 {
        (c * FIXED_SCALE).round() / FIXED_SCALE + 0.0
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Point::new(p.x, p.y)
    }
}

/// A straight input segment, stored in sweep order (`lo < hi`).
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct Seg {
    pub lo: Point,
    pub hi: Point,
}

impl std::fmt::Debug for Seg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -- {:?}", self.lo, self.hi)
    }
}

impl Seg {
    pub fn new(lo: Point, hi: Point) -> Self {
        debug_assert!(lo < hi);
        Seg { lo, hi }
    }

    pub fn dx(&self) -> f64 {
        self.hi.x - self.lo.x
    }

    pub fn dy(&self) -> f64 {
        self.hi.y - self.lo.y
    }
}

/// The exact position of a sweep vertex.
///
/// Input points and intersections that happen to land on the integer grid
/// are stored as grid points. Other intersections are stored implicitly, as
/// the pair of segments that produced them; their coordinates are rational
/// and are only ever inspected through the exact predicates.
#[derive(Clone, Copy, PartialEq)]
pub(crate) enum Loc {
    Grid(Point),
    /// The intersection of two segments, ordered so that the cross product of
    /// their directions is positive.
    Cross(Seg, Seg),
}

impl std::fmt::Debug for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Loc::Grid(p) => write!(f, "{p:?}"),
            Loc::Cross(s, t) => write!(f, "~{:?} [{s:?} x {t:?}]", self.approx()),
        }
    }
}

// The homogeneous coordinates of the intersection of two segments, in exact
// integer arithmetic. Every value fits comfortably in an i128.
fn exact_cross(s: &Seg, t: &Seg) -> [i128; 3] {
    let [sx, sy, sdx, sdy] = [s.lo.x, s.lo.y, s.dx(), s.dy()].map(|c| c as i128);
    let [tx, ty, tdx, tdy] = [t.lo.x, t.lo.y, t.dx(), t.dy()].map(|c| c as i128);
    let w = sdx * tdy - sdy * tdx;
    let num = (tx - sx) * tdy - (ty - sy) * tdx;
    [sx * w + num * sdx, sy * w + num * sdy, w]
}

impl Loc {
    /// The intersection point of the lines through `s` and `t`.
    ///
    /// The caller must ensure that `s × t > 0` (so in particular, the segments
    /// aren't parallel). If the intersection happens to be a grid point, it is
    /// stored as one.
    pub fn cross(s: &Seg, t: &Seg) -> Loc {
        let [x, y, w] = exact_cross(s, t);
        debug_assert!(w > 0);
        if x % w == 0 && y % w == 0 {
            Loc::Grid(Point::new((x / w) as f64, (y / w) as f64))
        } else {
            Loc::Cross(*s, *t)
        }
    }

    pub fn grid(&self) -> Option<Point> {
        match self {
            Loc::Grid(p) => Some(*p),
            Loc::Cross(..) => None,
        }
    }

    /// Homogeneous coordinates `[X, Y, W]`, with `W > 0`.
    #[inline]
    pub fn homogeneous<R: Ring>(&self) -> [R; 3] {
        match self {
            Loc::Grid(p) => [R::from_int(p.x), R::from_int(p.y), R::from_int(1.0)],
            Loc::Cross(s, t) => {
                let [sx, sy, sdx, sdy] = [s.lo.x, s.lo.y, s.dx(), s.dy()].map(R::from_int);
                let [tx, ty, tdx, tdy] = [t.lo.x, t.lo.y, t.dx(), t.dy()].map(R::from_int);
                let w = sdx * tdy - sdy * tdx;
                let num = (tx - sx) * tdy - (ty - sy) * tdx;
                [sx * w + num * sdx, sy * w + num * sdy, w]
            }
        }
    }

    /// A nearby point, rounded to the output resolution.
    ///
    /// The rounded point is clamped to the bounding boxes of the segments
    /// that produced it.
    pub fn approx(&self) -> Point {
        match self {
            Loc::Grid(p) => *p,
            Loc::Cross(s, t) => {
                let [x, y, w] = exact_cross(s, t).map(|c| c as f64);
                let clamp = |c: f64, a0: f64, a1: f64, b0: f64, b1: f64| {
                    let lo = a0.min(a1).max(b0.min(b1));
                    let hi = a0.max(a1).min(b0.max(b1));
                    Point::snap(c).max(lo).min(hi)
                };
                Point::new(
                    clamp(x / w, s.lo.x, s.hi.x, t.lo.x, t.hi.x),
                    clamp(y / w, s.lo.y, s.hi.y, t.lo.y, t.hi.y),
                )
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Strategies for generating values that respect the grid bounds.
    pub trait Reasonable {
        type Strategy: Strategy<Value = Self>;
        fn reasonable() -> Self::Strategy;
    }

    impl Reasonable for Point {
        type Strategy = BoxedStrategy<Point>;

        fn reasonable() -> Self::Strategy {
            fn coord() -> impl Strategy<Value = i64> {
                let big = GRID_LIMIT as i64;
                prop_oneof![-big..=big, -16i64..=16]
            }
            (coord(), coord())
                .prop_map(|(x, y)| Point::new(x as f64, y as f64))
                .boxed()
        }
    }

    impl Reasonable for Seg {
        type Strategy = BoxedStrategy<Seg>;

        fn reasonable() -> Self::Strategy {
            (Point::reasonable(), Point::reasonable())
                .prop_filter("degenerate segment", |(p, q)| p != q)
                .prop_map(|(p, q)| Seg::new(p.min(q), p.max(q)))
                .boxed()
        }
    }

    #[test]
    fn sweep_order() {
        let a = Point::new(5.0, 0.0);
        let b = Point::new(0.0, 1.0);
        let c = Point::new(1.0, 1.0);
        assert!(a < b);
        assert!(b < c);
        assert_eq!(Point::new(-0.0, 0.0), Point::new(0.0, -0.0));
    }

    #[test]
    fn grid_intersections_are_exact() {
        let s = Seg::new(Point::new(0.0, 0.0), Point::new(4.0, 4.0));
        let t = Seg::new(Point::new(4.0, 0.0), Point::new(0.0, 4.0));
        // s × t = 4 * 4 - 4 * (-4) > 0.
        assert_eq!(Loc::cross(&s, &t), Loc::Grid(Point::new(2.0, 2.0)));

        let u = Seg::new(Point::new(3.0, 0.0), Point::new(0.0, 4.0));
        let loc = Loc::cross(&s, &u);
        assert!(matches!(loc, Loc::Cross(..)));
        let p = loc.approx();
        assert!((p.x - 12.0 / 7.0).abs() < 1e-6);
        assert!((p.y - 12.0 / 7.0).abs() < 1e-6);
    }

    #[test]
    fn homogeneous_matches_exact() {
        let s = Seg::new(Point::new(0.0, 0.0), Point::new(4.0, 4.0));
        let u = Seg::new(Point::new(3.0, 0.0), Point::new(0.0, 4.0));
        let [x, y, w] = Loc::Cross(s, u).homogeneous::<crate::num::Wide<6>>();
        let [ex, ey, ew] = exact_cross(&s, &u);
        let to = |v: crate::num::Wide<6>, e: i128| {
            let diff = v - crate::num::Wide::from_i64(e as i64);
            diff.sign() == Some(Ordering::Equal)
        };
        assert!(to(x, ex) && to(y, ey) && to(w, ew));
    }
}
