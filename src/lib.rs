#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod typed_vec;

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;
mod boolean;
mod chain;
mod geom;
mod input;
mod metrics;
mod num;
mod options;
mod predicates;
mod sweep;
mod tessellate;

#[cfg(feature = "generators")]
pub mod generators;

use kurbo::{Affine, BezPath};

pub use boolean::FigureSink;
pub use geom::{Point, GRID_BITS, GRID_LIMIT};
pub use input::{Figure, FigureSegment, Flattener, GridTransform, UniformFlattener};
pub use metrics::Metrics;
pub use options::{CombineOptions, TessellateOptions, DEFAULT_MAX_VERTICES, DEFAULT_TOLERANCE};
pub use tessellate::{GeometrySink, VertexBuffers, VertexId};

use boolean::{Assembler, Classifier, Combine};
use chain::{ChainBuilder, Operand, Pools};
use sweep::Sweep;
use tessellate::Tessellate;

/// A fill rule tells us how to decide whether a point is "inside" a shape.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(::arbitrary::Arbitrary))]
pub enum FillRule {
    /// The point is "inside" if its winding number is odd.
    EvenOdd,
    /// The point is "inside" if its winding number is non-zero.
    NonZero,
}

/// Binary operations between sets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "arbitrary", derive(::arbitrary::Arbitrary))]
pub enum BinaryOp {
    /// A point is in the union of two sets if it is in either one.
    Union,
    /// A point is in the intersection of two sets if it is in both.
    Intersection,
    /// A point is in the difference of two sets if it is in the first but not the second.
    Difference,
    /// A point is in the exclusive-or of two sets if it is in one or the other, but not both.
    Xor,
}

/// Everything that can go wrong.
///
/// When an operation fails, whatever it already sent to its sink is
/// incomplete and should be thrown away.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// At least one of the inputs was infinite.
    #[error("one of the inputs was infinite")]
    Infinity,
    /// At least one of the inputs was not a number.
    #[error("one of the inputs had a NaN")]
    NaN,
    /// A grid coordinate wasn't an integer, or was too big.
    #[error("coordinate {value} isn't an integer of magnitude at most 2^26")]
    OutOfRange {
        /// The offending coordinate.
        value: f64,
    },
    /// The sweep needed too many vertices.
    #[error("the sweep needed more than {limit} vertices")]
    TooComplex {
        /// The vertex cap that was exceeded.
        limit: usize,
    },
    /// A bug.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

fn build_sweep<F: Flattener + ?Sized>(
    shapes: &[(&[Figure], Operand)],
    max_vertices: usize,
    flattener: &mut F,
    tolerance: f64,
) -> Result<Sweep, Error> {
    let mut pools = Pools::new(max_vertices);
    let mut chains = Vec::new();
    for &(figures, operand) in shapes {
        let mut builder = ChainBuilder::new(&mut pools, operand);
        input::add_figures(&mut builder, figures, flattener, tolerance)?;
        chains.extend(builder.finish()?);
    }
    let sweep = Sweep::new(pools, chains);
    #[cfg(feature = "debug-svg")]
    tracing::trace!(svg = %sweep.dump_svg(), "sweep input");
    Ok(sweep)
}

#[allow(clippy::too_many_arguments)]
fn run_combine<S: FigureSink, F: Flattener + ?Sized>(
    set_a: &[Figure],
    set_b: &[Figure],
    options: &CombineOptions,
    flattener: &mut F,
    tolerance: f64,
    transform: Affine,
    sink: &mut S,
) -> Result<Metrics, Error> {
    let sweep = build_sweep(
        &[(set_a, Operand::A), (set_b, Operand::B)],
        options.max_vertices,
        flattener,
        tolerance,
    )?;
    let classifier = Classifier {
        fill_rules: [options.fill_rule_a, options.fill_rule_b],
        op: options.op,
    };
    let mut task = Combine::new(
        classifier,
        Assembler::new(sink, transform, options.retrieve_curves),
    );
    let metrics = sweep.run(&mut task)?;
    let figures = task.finish()?;
    tracing::debug!(figures, op = ?options.op, "combined shapes");
    Ok(metrics)
}

/// Combines two shapes that are already on the grid.
///
/// Every point of every figure must have integer coordinates no bigger than
/// [`GRID_LIMIT`]. The output is in grid coordinates too, and `tolerance` is
/// measured in grid units.
pub fn combine_figures<S: FigureSink, F: Flattener + ?Sized>(
    set_a: &[Figure],
    set_b: &[Figure],
    options: &CombineOptions,
    flattener: &mut F,
    sink: &mut S,
) -> Result<Metrics, Error> {
    run_combine(
        set_a,
        set_b,
        options,
        flattener,
        options.tolerance,
        Affine::IDENTITY,
        sink,
    )
}

/// Combines two shapes, sending the resulting figures to `sink`.
///
/// The paths are mapped onto the grid with a [`GridTransform`] fitted to
/// both of them, and the output is mapped back.
pub fn combine<S: FigureSink>(
    set_a: &BezPath,
    set_b: &BezPath,
    options: &CombineOptions,
    sink: &mut S,
) -> Result<Metrics, Error> {
    let transform = GridTransform::fit([set_a, set_b])?;
    run_combine(
        &transform.figures(set_a),
        &transform.figures(set_b),
        options,
        &mut UniformFlattener,
        transform.scale_distance(options.tolerance),
        transform.from_grid(),
        sink,
    )
}

/// Computes a boolean operation between two sets, each of which is described
/// as a collection of figures.
pub fn binary_op(
    set_a: &BezPath,
    set_b: &BezPath,
    fill_rule: FillRule,
    op: BinaryOp,
) -> Result<BezPath, Error> {
    let mut out = BezPath::new();
    combine(
        set_a,
        set_b,
        &CombineOptions::new(op).with_fill_rule(fill_rule),
        &mut out,
    )?;
    Ok(out)
}

/// Simplifies a shape: the result has the same fill, but its figures don't
/// cross each other or themselves.
pub fn outline(path: &BezPath, fill_rule: FillRule) -> Result<BezPath, Error> {
    binary_op(path, &BezPath::new(), fill_rule, BinaryOp::Union)
}

/// Tessellates a shape that is already on the grid.
///
/// See [`combine_figures`] for the requirements on the input.
pub fn tessellate_figures<G: GeometrySink, F: Flattener + ?Sized>(
    figures: &[Figure],
    options: &TessellateOptions,
    flattener: &mut F,
    sink: &mut G,
) -> Result<Metrics, Error> {
    run_tessellate(
        figures,
        options,
        flattener,
        options.tolerance,
        Affine::IDENTITY,
        sink,
    )
}

fn run_tessellate<G: GeometrySink, F: Flattener + ?Sized>(
    figures: &[Figure],
    options: &TessellateOptions,
    flattener: &mut F,
    tolerance: f64,
    transform: Affine,
    sink: &mut G,
) -> Result<Metrics, Error> {
    let sweep = build_sweep(
        &[(figures, Operand::A)],
        options.max_vertices,
        flattener,
        tolerance,
    )?;
    let mut task = Tessellate::new(options.fill_rule, sink, transform);
    let metrics = sweep.run(&mut task)?;
    task.finish()?;
    Ok(metrics)
}

/// Tessellates a shape, sending the triangles to `sink`.
pub fn tessellate_into<G: GeometrySink>(
    path: &BezPath,
    options: &TessellateOptions,
    sink: &mut G,
) -> Result<Metrics, Error> {
    let transform = GridTransform::fit([path])?;
    run_tessellate(
        &transform.figures(path),
        options,
        &mut UniformFlattener,
        transform.scale_distance(options.tolerance),
        transform.from_grid(),
        sink,
    )
}

/// Tessellates a shape into a triangle list.
pub fn tessellate(path: &BezPath, fill_rule: FillRule) -> Result<VertexBuffers, Error> {
    let mut out = VertexBuffers::default();
    tessellate_into(
        path,
        &TessellateOptions::default().with_fill_rule(fill_rule),
        &mut out,
    )?;
    Ok(out)
}
