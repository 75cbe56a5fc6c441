//! Shapes for examples, benchmarks, and test cases.

use kurbo::BezPath;

fn polygon(path: &mut BezPath, points: &[(f64, f64)]) {
    let Some((&first, rest)) = points.split_first() else {
        return;
    };
    path.move_to(first);
    for &p in rest {
        path.line_to(p);
    }
    path.close_path();
}

/// A grid of `count` by `count` squares.
///
/// The top-left of the first square is at `(x0, y0)`. Each square has size
/// `size x size`, and the distance between squares (both horizontally and
/// vertically) is `offset`.
///
/// If `slant` is non-zero, generates parallelograms instead of squares: the
/// right-hand side of each square gets translated down by `slant`.
fn squares((x0, y0): (f64, f64), size: f64, offset: f64, slant: f64, count: usize) -> BezPath {
    let mut ret = BezPath::new();
    for i in 0..count {
        let x = x0 + i as f64 * offset;
        for j in 0..count {
            let y = y0 + j as f64 * offset;
            polygon(
                &mut ret,
                &[
                    (x, y),
                    (x, y + size),
                    (x + size, y + size + slant),
                    (x + size, y + slant),
                ],
            );
        }
    }
    ret
}

/// An `n` by `n` checkerboard-like pattern of overlapping squares.
///
/// The first shape is `n x n` non-overlapping squares, and the second is
/// `(n - 1) x (n - 1)` non-overlapping squares, each of which overlaps the
/// corners of four squares of the first.
pub fn checkerboard(n: usize) -> (BezPath, BezPath) {
    (
        squares((0.0, 0.0), 30.0, 40.0, 0.0, n),
        squares((20.0, 20.0), 30.0, 40.0, 0.0, n.saturating_sub(1)),
    )
}

/// Like [`checkerboard`], but with no exactly-horizontal lines.
///
/// Horizontal lines have special handling in the sweep, so their presence or
/// absence can affect performance.
pub fn slanted_checkerboard(n: usize) -> (BezPath, BezPath) {
    (
        squares((0.0, 0.0), 30.0, 40.0, 1.0, n),
        squares((20.0, 20.0), 30.0, 40.0, 1.0, n.saturating_sub(1)),
    )
}

/// The first shape is a bunch of long, skinny parallelograms going from
/// top-left to bottom-right. The second one's go from top-right to
/// bottom-left, so that every one of them crosses every one of the others.
pub fn slanties(n: usize) -> (BezPath, BezPath) {
    let h = 20.0 * n as f64;

    let mut even = BezPath::new();
    let mut odd = BezPath::new();
    for i in 0..n {
        let x_off = 20.0 * i as f64;
        polygon(
            &mut even,
            &[
                (x_off, 0.0),
                (x_off + h, h),
                (x_off + h + 10.0, h),
                (x_off + 10.0, 0.0),
            ],
        );
        polygon(
            &mut odd,
            &[
                (x_off + h, 0.0),
                (x_off, h),
                (x_off + 10.0, h),
                (x_off + h + 10.0, 0.0),
            ],
        );
    }

    (even, odd)
}

/// A self-intersecting star polygon with `points` spikes, drawn by
/// connecting every `step`-th vertex of a regular `points`-gon.
///
/// With `step = 2` and `points = 5`, this is a pentagram.
pub fn star(points: usize, step: usize, radius: f64) -> BezPath {
    let vertices: Vec<_> = (0..points)
        .map(|i| {
            let angle = std::f64::consts::TAU * ((i * step) % points) as f64 / points as f64;
            (radius * angle.sin(), -radius * angle.cos())
        })
        .collect();
    let mut ret = BezPath::new();
    polygon(&mut ret, &vertices);
    ret
}
