//! Getting shapes onto the integer grid and into the sweep.
//!
//! The sweep itself only accepts [`Figure`]s whose coordinates are integers
//! no bigger than [`GRID_LIMIT`]. [`GridTransform`] maps arbitrary paths onto
//! that grid (and the results back), and a [`Flattener`] turns curves into
//! the straight edges that the sweep works with.

use kurbo::{Affine, BezPath, CubicBez, ParamCurve, PathEl, QuadBez, Rect};

use crate::chain::{ChainBuilder, CurveFragment};
use crate::geom::{Point, GRID_LIMIT};
use crate::Error;

/// One segment of a [`Figure`]. Each segment starts where the previous one
/// ended.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum FigureSegment {
    /// A straight line to a point.
    Line(Point),
    /// A cubic Bézier curve, given by two control points and an end point.
    Cubic(Point, Point, Point),
}

impl FigureSegment {
    /// Where this segment ends.
    pub fn end(&self) -> Point {
        match *self {
            FigureSegment::Line(p) | FigureSegment::Cubic(_, _, p) => p,
        }
    }
}

/// A sequence of connected segments, in grid coordinates.
///
/// Figures are always filled as though they were closed: an open figure gets
/// an implicit straight edge from its last point back to its start.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Figure {
    /// The starting point.
    pub start: Point,
    /// The segments, in order.
    pub segments: Vec<FigureSegment>,
    /// Whether the figure was explicitly closed.
    pub closed: bool,
}

impl Figure {
    /// Starts a new, empty, open figure.
    pub fn new(start: Point) -> Self {
        Figure {
            start,
            segments: Vec::new(),
            closed: false,
        }
    }

    /// A closed polygon through the given points, or `None` if there are no
    /// points.
    pub fn polygon(points: impl IntoIterator<Item = impl Into<Point>>) -> Option<Self> {
        let mut points = points.into_iter().map(Into::into);
        let mut fig = Figure::new(points.next()?);
        for p in points {
            fig.line_to(p);
        }
        fig.close();
        Some(fig)
    }

    /// Adds a straight segment.
    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.segments.push(FigureSegment::Line(p));
        self
    }

    /// Adds a cubic segment.
    pub fn cubic_to(&mut self, c1: Point, c2: Point, end: Point) -> &mut Self {
        self.segments.push(FigureSegment::Cubic(c1, c2, end));
        self
    }

    /// Marks the figure as closed.
    pub fn close(&mut self) -> &mut Self {
        self.closed = true;
        self
    }

    /// Every point of the figure, including control points.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.start).chain(self.segments.iter().flat_map(|seg| match *seg {
            FigureSegment::Line(p) => vec![p],
            FigureSegment::Cubic(c1, c2, p) => vec![c1, c2, p],
        }))
    }

    /// Checks that every point is finite and on the integer grid.
    pub fn validate(&self) -> Result<(), Error> {
        for p in self.points() {
            check_grid(p.to_kurbo())?;
        }
        Ok(())
    }
}

// Checks that `p` is a grid point, returning the first bad coordinate.
fn check_grid(p: kurbo::Point) -> Result<Point, Error> {
    check_finite(p)?;
    let on_grid = |c: f64| c.fract() == 0.0 && c.abs() <= GRID_LIMIT;
    if !on_grid(p.x) {
        Err(Error::OutOfRange { value: p.x })
    } else if !on_grid(p.y) {
        Err(Error::OutOfRange { value: p.y })
    } else {
        Ok(Point::new(p.x, p.y))
    }
}

/// Turns cubic curves into polylines.
pub trait Flattener {
    /// Appends points approximating `curve` to `out`, along with their
    /// parameter values.
    ///
    /// The start of the curve should not be included. Parameters must be
    /// increasing, and the last one should be `1.0`. Points should be within
    /// `tolerance` of the curve.
    fn flatten(&mut self, curve: &CubicBez, tolerance: f64, out: &mut Vec<(kurbo::Point, f64)>);
}

/// A flattener that evaluates curves at uniformly-spaced parameters.
///
/// The number of steps comes from the usual bound on the distance between a
/// cubic and its chord in terms of its second differences.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformFlattener;

const MAX_FLATTEN_STEPS: f64 = (1 << 10) as f64;

impl Flattener for UniformFlattener {
    fn flatten(&mut self, c: &CubicBez, tolerance: f64, out: &mut Vec<(kurbo::Point, f64)>) {
        let dd0 = c.p0.to_vec2() - 2.0 * c.p1.to_vec2() + c.p2.to_vec2();
        let dd1 = c.p1.to_vec2() - 2.0 * c.p2.to_vec2() + c.p3.to_vec2();
        let dd = dd0.hypot().max(dd1.hypot());
        let steps = if tolerance > 0.0 {
            (0.75 * dd / tolerance).sqrt().ceil()
        } else {
            MAX_FLATTEN_STEPS
        };
        let n = steps.clamp(1.0, MAX_FLATTEN_STEPS) as usize;
        for i in 1..n {
            let t = i as f64 / n as f64;
            out.push((c.eval(t), t));
        }
        out.push((c.p3, 1.0));
    }
}

/// Feeds figures to a chain builder, flattening their curves.
///
/// Flattened points are rounded to the grid, and every edge of a flattened
/// curve remembers the part of the curve it came from.
pub(crate) fn add_figures<F: Flattener + ?Sized>(
    builder: &mut ChainBuilder<'_>,
    figures: &[Figure],
    flattener: &mut F,
    tolerance: f64,
) -> Result<(), Error> {
    let mut flat = Vec::new();
    for fig in figures {
        fig.validate()?;
        builder.begin_figure(fig.start)?;
        let mut last = fig.start;
        for seg in &fig.segments {
            match *seg {
                FigureSegment::Line(p) => builder.line_to(p, None),
                FigureSegment::Cubic(c1, c2, end) => {
                    let curve = CubicBez::new(
                        last.to_kurbo(),
                        c1.to_kurbo(),
                        c2.to_kurbo(),
                        end.to_kurbo(),
                    );
                    let idx = builder.pools().curves.push(curve);
                    flat.clear();
                    flattener.flatten(&curve, tolerance, &mut flat);
                    // Whatever the flattener did, the last edge ends exactly
                    // at the end of the curve.
                    if flat.last().map_or(true, |&(_, t)| t < 1.0) {
                        flat.push((curve.p3, 1.0));
                    }
                    let n = flat.len();
                    let mut t0 = 0.0;
                    for (i, &(p, t1)) in flat.iter().enumerate() {
                        let (p, t1) = if i + 1 == n {
                            (end, 1.0)
                        } else {
                            (check_grid(p.round())?, t1)
                        };
                        builder.line_to(p, Some(CurveFragment { curve: idx, t0, t1 }));
                        t0 = t1;
                    }
                }
            }
            last = seg.end();
        }
        builder.end_figure()?;
    }
    Ok(())
}

/// A map from user coordinates onto the integer grid.
///
/// The map is a translation followed by scaling with a power of two, chosen
/// so that the shapes it was fitted to fill as much of the grid as possible.
/// Its inverse maps results back to user coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridTransform {
    to_grid: Affine,
    from_grid: Affine,
}

fn check_finite(p: kurbo::Point) -> Result<(), Error> {
    if p.x.is_nan() || p.y.is_nan() {
        Err(Error::NaN)
    } else if p.x.is_infinite() || p.y.is_infinite() {
        Err(Error::Infinity)
    } else {
        Ok(())
    }
}

fn el_points(el: PathEl) -> impl Iterator<Item = kurbo::Point> {
    let (points, n) = match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => ([p; 3], 1),
        PathEl::QuadTo(a, b) => ([a, b, b], 2),
        PathEl::CurveTo(a, b, c) => ([a, b, c], 3),
        PathEl::ClosePath => ([kurbo::Point::ZERO; 3], 0),
    };
    points.into_iter().take(n)
}

impl GridTransform {
    /// Fits a transform to some paths.
    ///
    /// Fails if any of the paths has a non-finite coordinate.
    pub fn fit<'a>(paths: impl IntoIterator<Item = &'a BezPath>) -> Result<Self, Error> {
        let mut bbox: Option<Rect> = None;
        for path in paths {
            for &el in path.elements() {
                for p in el_points(el) {
                    check_finite(p)?;
                    bbox = Some(match bbox {
                        Some(r) => r.union_pt(p),
                        None => Rect::from_points(p, p),
                    });
                }
            }
        }

        let Some(bbox) = bbox else {
            return Ok(GridTransform {
                to_grid: Affine::IDENTITY,
                from_grid: Affine::IDENTITY,
            });
        };
        let center = bbox.center();
        let extent = (bbox.width().max(bbox.height()) / 2.0).max(f64::MIN_POSITIVE);
        let exp = (GRID_LIMIT / extent).log2().floor().clamp(-1000.0, 1000.0) as i32;
        let scale = 2.0f64.powi(exp);
        let to_grid = Affine::scale(scale) * Affine::translate(-center.to_vec2());
        let from_grid = Affine::translate(center.to_vec2()) * Affine::scale(scale.recip());
        Ok(GridTransform { to_grid, from_grid })
    }

    /// The map from user coordinates to the grid.
    pub fn to_grid(&self) -> Affine {
        self.to_grid
    }

    /// The map from the grid back to user coordinates.
    pub fn from_grid(&self) -> Affine {
        self.from_grid
    }

    /// Scales a user-space distance to the grid.
    pub fn scale_distance(&self, d: f64) -> f64 {
        d * self.to_grid.as_coeffs()[0]
    }

    fn snap(&self, p: kurbo::Point) -> Point {
        let q = self.to_grid * p;
        Point::new(q.x.round(), q.y.round())
    }

    /// Maps a path onto the grid, rounding every point.
    ///
    /// Quadratic segments are raised to cubics.
    pub fn figures(&self, path: &BezPath) -> Vec<Figure> {
        let mut figures = Vec::new();
        let mut current: Option<Figure> = None;
        let mut last = kurbo::Point::ZERO;
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    figures.extend(current.replace(Figure::new(self.snap(p))));
                    last = p;
                    continue;
                }
                PathEl::ClosePath => {
                    if let Some(fig) = current.as_mut() {
                        fig.close();
                    }
                    figures.extend(current.take());
                    continue;
                }
                _ => {}
            }
            let fig = current.get_or_insert_with(|| Figure::new(self.snap(last)));
            match *el {
                PathEl::LineTo(p) => {
                    fig.line_to(self.snap(p));
                    last = p;
                }
                PathEl::QuadTo(c, p) => {
                    let cubic = QuadBez::new(last, c, p).raise();
                    fig.cubic_to(self.snap(cubic.p1), self.snap(cubic.p2), self.snap(p));
                    last = p;
                }
                PathEl::CurveTo(c1, c2, p) => {
                    fig.cubic_to(self.snap(c1), self.snap(c2), self.snap(p));
                    last = p;
                }
                PathEl::MoveTo(_) | PathEl::ClosePath => {}
            }
        }
        figures.extend(current);
        figures
    }
}
