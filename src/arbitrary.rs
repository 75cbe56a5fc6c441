//! Utilities for fuzz and/or property testing using `arbitrary`.
//!
//! Random coordinates are mostly drawn from a small range, so that generated
//! shapes have plenty of shared vertices, overlapping edges, and
//! intersections that land exactly on the grid.

use arbitrary::Unstructured;

use crate::{BinaryOp, CombineOptions, Figure, FillRule, Point, GRID_LIMIT};

/// Generate an arbitrary grid coordinate.
///
/// Most coordinates are small, but some are at (or near) the edge of the grid.
pub fn coord(u: &mut Unstructured<'_>) -> Result<f64, arbitrary::Error> {
    let big: u8 = u.int_in_range(0..=7)?;
    Ok(if big == 0 {
        let limit = GRID_LIMIT as i64;
        u.int_in_range(-limit..=limit)? as f64
    } else {
        u.int_in_range(-16i32..=16)? as f64
    })
}

/// Generate an arbitrary grid point, with a chance of sharing a coordinate
/// (or being equal to) one of the `previous` points.
pub fn point(u: &mut Unstructured<'_>, previous: &[Point]) -> Result<Point, arbitrary::Error> {
    if previous.is_empty() {
        return Ok(Point::new(coord(u)?, coord(u)?));
    }
    let old = *u.choose(previous)?;
    Ok(match u.int_in_range(0u8..=5)? {
        0 => old,
        1 => Point::new(old.x, coord(u)?),
        2 => Point::new(coord(u)?, old.y),
        _ => Point::new(coord(u)?, coord(u)?),
    })
}

/// Generate an arbitrary closed polygon, possibly self-intersecting.
pub fn polygon(u: &mut Unstructured<'_>, previous: &mut Vec<Point>) -> Result<Figure, arbitrary::Error> {
    let len = u.int_in_range(1usize..=12)?;
    let mut points = Vec::with_capacity(len);
    for _ in 0..len {
        let p = point(u, previous)?;
        previous.push(p);
        points.push(p);
    }
    Figure::polygon(points).ok_or(arbitrary::Error::NotEnoughData)
}

/// Generate some arbitrary polygons.
pub fn polygons(u: &mut Unstructured<'_>, previous: &mut Vec<Point>) -> Result<Vec<Figure>, arbitrary::Error> {
    let count = u.int_in_range(0usize..=4)?;
    (0..count).map(|_| polygon(u, previous)).collect()
}

/// Generate arbitrary options for combining shapes.
pub fn combine_options(u: &mut Unstructured<'_>) -> Result<CombineOptions, arbitrary::Error> {
    let op = *u.choose(&[
        BinaryOp::Union,
        BinaryOp::Intersection,
        BinaryOp::Difference,
        BinaryOp::Xor,
    ])?;
    let rules = [FillRule::EvenOdd, FillRule::NonZero];
    Ok(CombineOptions::new(op).with_fill_rules(*u.choose(&rules)?, *u.choose(&rules)?))
}

/// Generate an arbitrary simple polygon that is monotone in `x`.
///
/// The top boundary stays strictly above the `x` axis and the bottom one
/// strictly below it, so the polygon never touches itself.
pub fn monotone_polygon(u: &mut Unstructured<'_>) -> Result<Figure, arbitrary::Error> {
    let n = u.int_in_range(2usize..=10)?;
    let mut xs = Vec::with_capacity(n);
    let mut x = u.int_in_range(-100i32..=100)?;
    for _ in 0..n {
        xs.push(x as f64);
        x += u.int_in_range(1i32..=20)?;
    }

    let mut points = Vec::with_capacity(2 * n);
    for &x in &xs {
        points.push(Point::new(x, -(u.int_in_range(1i32..=50)? as f64)));
    }
    for &x in xs.iter().rev() {
        points.push(Point::new(x, u.int_in_range(1i32..=50)? as f64));
    }
    Figure::polygon(points).ok_or(arbitrary::Error::NotEnoughData)
}

fn gcd(a: i32, b: i32) -> i32 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

/// Generate an arbitrary simple polygon that is star-shaped around the origin.
///
/// Unlike [`monotone_polygon`], these can have reflex vertices pointing in
/// every direction.
pub fn star_polygon(u: &mut Unstructured<'_>) -> Result<Figure, arbitrary::Error> {
    // The four axis points keep the origin strictly inside.
    let mut points = Vec::new();
    for (dx, dy) in [(1, 0), (0, 1), (-1, 0), (0, -1)] {
        let r = u.int_in_range(1i32..=50)?;
        points.push((dx * r, dy * r));
    }
    let extra = u.int_in_range(0usize..=16)?;
    for _ in 0..extra {
        let p = (u.int_in_range(-50i32..=50)?, u.int_in_range(-50i32..=50)?);
        if p != (0, 0) {
            points.push(p);
        }
    }

    // Keep one point per direction, so that the angles strictly increase.
    let mut seen = std::collections::HashSet::new();
    points.retain(|&(x, y)| {
        let g = gcd(x, y);
        seen.insert((x / g, y / g))
    });
    points.sort_by(|&(ax, ay), &(bx, by)| {
        let a = (ay as f64).atan2(ax as f64);
        let b = (by as f64).atan2(bx as f64);
        a.total_cmp(&b)
    });
    let points = points.into_iter().map(|(x, y)| Point::new(x as f64, y as f64));
    Figure::polygon(points).ok_or(arbitrary::Error::NotEnoughData)
}
