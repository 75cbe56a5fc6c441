//! Knobs for the combiner and the tessellator.

use crate::{BinaryOp, FillRule};

/// The default flattening tolerance, in user units.
pub const DEFAULT_TOLERANCE: f64 = 0.25;

/// The default cap on the number of vertices in one sweep.
pub const DEFAULT_MAX_VERTICES: usize = 1 << 22;

/// Options for combining two shapes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CombineOptions {
    /// The fill rule of the first shape.
    ///
    /// Default value: `NonZero`.
    pub fill_rule_a: FillRule,

    /// The fill rule of the second shape.
    ///
    /// Default value: `NonZero`.
    pub fill_rule_b: FillRule,

    /// How to combine the shapes.
    ///
    /// Default value: `Union`.
    pub op: BinaryOp,

    /// Maximum allowed distance between a curve and the polyline that
    /// replaces it.
    ///
    /// Default value: [`DEFAULT_TOLERANCE`].
    pub tolerance: f64,

    /// Whether runs of output edges that came from one input curve should be
    /// turned back into a curve.
    ///
    /// Default value: `false`.
    pub retrieve_curves: bool,

    /// The sweep fails with [`Error::TooComplex`](crate::Error::TooComplex)
    /// if it needs more vertices than this, counting the ones it inserts at
    /// intersections.
    ///
    /// Default value: [`DEFAULT_MAX_VERTICES`].
    pub max_vertices: usize,
}

impl Default for CombineOptions {
    fn default() -> Self {
        CombineOptions {
            fill_rule_a: FillRule::NonZero,
            fill_rule_b: FillRule::NonZero,
            op: BinaryOp::Union,
            tolerance: DEFAULT_TOLERANCE,
            retrieve_curves: false,
            max_vertices: DEFAULT_MAX_VERTICES,
        }
    }
}

impl CombineOptions {
    /// The default options, with a different operator.
    pub fn new(op: BinaryOp) -> Self {
        CombineOptions {
            op,
            ..Default::default()
        }
    }

    /// Sets the fill rule of both shapes.
    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule_a = fill_rule;
        self.fill_rule_b = fill_rule;
        self
    }

    /// Sets the fill rules of the two shapes separately.
    pub fn with_fill_rules(mut self, a: FillRule, b: FillRule) -> Self {
        self.fill_rule_a = a;
        self.fill_rule_b = b;
        self
    }

    /// Sets the flattening tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Turns curve retrieval on or off.
    pub fn with_retrieve_curves(mut self, retrieve_curves: bool) -> Self {
        self.retrieve_curves = retrieve_curves;
        self
    }

    /// Sets the vertex cap.
    pub fn with_max_vertices(mut self, max_vertices: usize) -> Self {
        self.max_vertices = max_vertices;
        self
    }
}

/// Options for tessellating a shape.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TessellateOptions {
    /// Default value: `NonZero`.
    pub fill_rule: FillRule,

    /// Maximum allowed distance between a curve and the polyline that
    /// replaces it.
    ///
    /// Default value: [`DEFAULT_TOLERANCE`].
    pub tolerance: f64,

    /// See [`CombineOptions::max_vertices`].
    pub max_vertices: usize,
}

impl Default for TessellateOptions {
    fn default() -> Self {
        TessellateOptions {
            fill_rule: FillRule::NonZero,
            tolerance: DEFAULT_TOLERANCE,
            max_vertices: DEFAULT_MAX_VERTICES,
        }
    }
}

impl TessellateOptions {
    /// Sets the fill rule.
    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    /// Sets the flattening tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the vertex cap.
    pub fn with_max_vertices(mut self, max_vertices: usize) -> Self {
        self.max_vertices = max_vertices;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders() {
        let opts = CombineOptions::new(BinaryOp::Xor)
            .with_fill_rule(FillRule::EvenOdd)
            .with_retrieve_curves(true);
        assert_eq!(opts.op, BinaryOp::Xor);
        assert_eq!(opts.fill_rule_a, FillRule::EvenOdd);
        assert_eq!(opts.fill_rule_b, FillRule::EvenOdd);
        assert!(opts.retrieve_curves);
        assert_eq!(opts.tolerance, DEFAULT_TOLERANCE);

        let opts = TessellateOptions::default().with_max_vertices(10);
        assert_eq!(opts.max_vertices, 10);
        assert_eq!(opts.fill_rule, FillRule::NonZero);
    }
}
