//! Boolean combination of two shapes.
//!
//! The combiner decides, at every junction, which of the new chains are part
//! of the boundary of the result. It does this in two steps. First each chain
//! is classified on its own, by comparing the fill of its own shape on either
//! side of it and then applying the operator to the other shape's fill (which
//! is the same on both sides). Then chains that coincide exactly are treated
//! as a bundle, and at most one chain in a bundle survives.
//!
//! Surviving chains are stitched into closed figures by [`figures::Assembler`].

use crate::chain::{Chain, ChainIdx, Class, Operand, Pools, Side, VertIdx, Winding};
use crate::predicates::cmp_direction;
use crate::sweep::{Junction, JunctionTask};
use crate::{BinaryOp, Error, FillRule};

mod figures;

pub(crate) use figures::Assembler;
pub use figures::FigureSink;

impl FillRule {
    /// Is a point with winding number `winding` inside?
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillRule::EvenOdd => winding % 2 != 0,
            FillRule::NonZero => winding != 0,
        }
    }
}

impl BinaryOp {
    /// Combines membership in two sets.
    pub fn apply(self, in_a: bool, in_b: bool) -> bool {
        match self {
            BinaryOp::Union => in_a || in_b,
            BinaryOp::Intersection => in_a && in_b,
            BinaryOp::Difference => in_a && !in_b,
            BinaryOp::Xor => in_a != in_b,
        }
    }
}

/// Decides which chains are part of the boundary of a combined shape.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Classifier {
    pub fill_rules: [FillRule; 2],
    pub op: BinaryOp,
}

impl Classifier {
    /// A classifier for a single shape, which just removes the parts of its
    /// boundary that don't change the fill.
    pub fn single(fill_rule: FillRule) -> Classifier {
        Classifier {
            fill_rules: [fill_rule, FillRule::NonZero],
            op: BinaryOp::Union,
        }
    }

    fn fills(&self, w: &Winding, operand: Operand) -> bool {
        let rule = match operand {
            Operand::A => self.fill_rules[0],
            Operand::B => self.fill_rules[1],
        };
        rule.is_inside(w.get(operand))
    }

    /// Is the region with these winding numbers part of the result?
    pub fn result_fills(&self, w: &Winding) -> bool {
        self.op
            .apply(self.fills(w, Operand::A), self.fills(w, Operand::B))
    }

    fn classify(&self, chain: &Chain) -> Class {
        let own = chain.operand;
        let after = chain.winding;
        let mut before = after;
        before.add(own, -chain.delta());
        let side = match (self.fills(&before, own), self.fills(&after, own)) {
            (false, true) => Side::Left,
            (true, false) => Side::Right,
            _ => Side::Redundant,
        };

        let other = self.fills(&after, own.other());
        let (redundant, flipped) = match (self.op, own) {
            (BinaryOp::Union, _) => (other, false),
            (BinaryOp::Intersection, _) => (!other, false),
            (BinaryOp::Difference, Operand::A) => (other, false),
            (BinaryOp::Difference, Operand::B) => (!other, other),
            (BinaryOp::Xor, _) => (false, other),
        };
        Class {
            side,
            redundant,
            flipped,
            cancelled: false,
        }
    }

    /// Classifies the heads of a junction, which must already be sorted and
    /// have their winding numbers.
    pub fn classify_heads(&self, pools: &mut Pools, heads: &[ChainIdx]) -> Result<(), Error> {
        for &h in heads {
            pools.chains[h].class = self.classify(&pools.chains[h]);
        }

        let mut i = 0;
        while i < heads.len() {
            let mut j = i + 1;
            while j < heads.len() && same_direction(pools, heads[i], heads[j])? {
                j += 1;
            }
            if j - i > 1 {
                self.resolve_bundle(pools, &heads[i..j])?;
            }
            i = j;
        }
        Ok(())
    }

    // Coincident chains share one boundary edge between them: the one whose
    // own classification matches what the whole bundle does.
    fn resolve_bundle(&self, pools: &mut Pools, bundle: &[ChainIdx]) -> Result<(), Error> {
        let first = &pools.chains[bundle[0]];
        let mut before = first.winding;
        before.add(first.operand, -first.delta());
        let after = pools.chains[bundle[bundle.len() - 1]].winding;
        let want = match (self.result_fills(&before), self.result_fills(&after)) {
            (false, true) => Some(Side::Left),
            (true, false) => Some(Side::Right),
            _ => None,
        };

        let keep = match want {
            Some(side) => Some(
                bundle
                    .iter()
                    .copied()
                    .find(|&c| pools.chains[c].class.output() == Some(side))
                    .ok_or(Error::Internal("no chain in a bundle carries its boundary"))?,
            ),
            None => None,
        };
        for &c in bundle {
            if Some(c) != keep {
                pools.chains[c].class.cancelled = true;
            }
        }
        Ok(())
    }
}

fn same_direction(pools: &Pools, a: ChainIdx, b: ChainIdx) -> Result<bool, Error> {
    let seg = |c: ChainIdx| {
        pools.verts[pools.chains[c].head]
            .seg
            .map(|s| pools.segs[s])
            .ok_or(Error::Internal("chain with a single vertex"))
    };
    Ok(cmp_direction(&seg(a)?, &seg(b)?, &pools.counters).is_eq())
}

/// The junction task for Boolean operations.
pub(crate) struct Combine<'a, S> {
    classifier: Classifier,
    assembler: Assembler<'a, S>,
}

impl<'a, S: FigureSink> Combine<'a, S> {
    pub fn new(classifier: Classifier, assembler: Assembler<'a, S>) -> Self {
        Combine {
            classifier,
            assembler,
        }
    }

    /// Checks that every figure was closed, returning the number of figures.
    pub fn finish(self) -> Result<usize, Error> {
        self.assembler.finish()
    }
}

impl<S: FigureSink> JunctionTask for Combine<'_, S> {
    fn advance(&mut self, _pools: &Pools, _chain: ChainIdx, _vertex: VertIdx) -> Result<(), Error> {
        Ok(())
    }

    fn process_junction(&mut self, pools: &mut Pools, junction: &Junction) -> Result<(), Error> {
        self.classifier.classify_heads(pools, &junction.heads)?;
        self.assembler.junction(pools, junction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_with(operand: Operand, reversed: bool, winding: Winding) -> Chain {
        let mut pools = Pools::new(100);
        let mut builder = crate::chain::ChainBuilder::new(&mut pools, operand);
        builder
            .begin_figure(crate::geom::Point::new(0.0, 0.0))
            .unwrap();
        builder.line_to(crate::geom::Point::new(0.0, 1.0), None);
        let chains = builder.finish().unwrap();
        let c = chains
            .into_iter()
            .find(|&c| pools.chains[c].reversed == reversed)
            .unwrap();
        let mut chain = pools.chains[c].clone();
        chain.winding = winding;
        chain
    }

    #[test]
    fn operator_table() {
        let nonzero = [FillRule::NonZero, FillRule::NonZero];
        // A chain of A where fill starts, inside B.
        let a_in_b = chain_with(Operand::A, false, Winding { a: 1, b: 1 });
        // A chain of B where fill starts, outside A.
        let b_out_a = chain_with(Operand::B, false, Winding { a: 0, b: 1 });
        // A chain of B where fill starts, inside A.
        let b_in_a = chain_with(Operand::B, false, Winding { a: 1, b: 1 });

        let classify = |op, chain: &Chain| {
            Classifier {
                fill_rules: nonzero,
                op,
            }
            .classify(chain)
            .output()
        };
        assert_eq!(classify(BinaryOp::Union, &a_in_b), None);
        assert_eq!(classify(BinaryOp::Union, &b_out_a), Some(Side::Left));
        assert_eq!(classify(BinaryOp::Intersection, &a_in_b), Some(Side::Left));
        assert_eq!(classify(BinaryOp::Intersection, &b_out_a), None);
        assert_eq!(classify(BinaryOp::Difference, &a_in_b), None);
        assert_eq!(classify(BinaryOp::Difference, &b_out_a), None);
        assert_eq!(classify(BinaryOp::Difference, &b_in_a), Some(Side::Right));
        assert_eq!(classify(BinaryOp::Xor, &a_in_b), Some(Side::Right));
        assert_eq!(classify(BinaryOp::Xor, &b_out_a), Some(Side::Left));
    }

    #[test]
    fn self_redundant_chains() {
        let classifier = Classifier::single(FillRule::EvenOdd);
        // Going from winding 1 to 2 under even-odd ends the fill.
        let chain = chain_with(Operand::A, false, Winding { a: 2, b: 0 });
        assert_eq!(classifier.classify(&chain).output(), Some(Side::Right));

        let classifier = Classifier::single(FillRule::NonZero);
        assert_eq!(classifier.classify(&chain).output(), None);
        // Reversed chains decrease the winding number.
        let chain = chain_with(Operand::A, true, Winding { a: -1, b: 0 });
        assert_eq!(classifier.classify(&chain).output(), Some(Side::Left));
    }

    #[test]
    fn fill_rules() {
        assert!(FillRule::EvenOdd.is_inside(-3));
        assert!(!FillRule::EvenOdd.is_inside(2));
        assert!(FillRule::NonZero.is_inside(2));
        assert!(!FillRule::NonZero.is_inside(0));
    }
}
