use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

use super::Ring;

// Twice the unit roundoff: every rounded operation moves its result by at most
// `ROUNDING * |result|`.
const ROUNDING: f64 = f64::EPSILON;

// The error bounds are themselves computed in floating point, so we only trust
// a sign when the value clears its bound by a small relative margin.
const SLACK: f64 = 1.0 + 1.0 / (1u64 << 20) as f64;

/// A double, along with a bound on how far it may be from the exact value.
///
/// This is the cheapest tier: arithmetic is plain `f64` arithmetic, plus a
/// couple of extra multiply-adds to keep the error bound up to date.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Approx {
    pub val: f64,
    pub err: f64,
}

impl Add for Approx {
    type Output = Approx;

    #[inline]
    fn add(self, rhs: Approx) -> Approx {
        let val = self.val + rhs.val;
        Approx {
            val,
            err: self.err + rhs.err + val.abs() * ROUNDING,
        }
    }
}

impl Sub for Approx {
    type Output = Approx;

    #[inline]
    fn sub(self, rhs: Approx) -> Approx {
        let val = self.val - rhs.val;
        Approx {
            val,
            err: self.err + rhs.err + val.abs() * ROUNDING,
        }
    }
}

impl Mul for Approx {
    type Output = Approx;

    #[inline]
    fn mul(self, rhs: Approx) -> Approx {
        let val = self.val * rhs.val;
        let err = self.err * rhs.val.abs()
            + rhs.err * self.val.abs()
            + self.err * rhs.err
            + val.abs() * ROUNDING;
        Approx { val, err }
    }
}

impl Neg for Approx {
    type Output = Approx;

    #[inline]
    fn neg(self) -> Approx {
        Approx {
            val: -self.val,
            err: self.err,
        }
    }
}

impl Ring for Approx {
    #[inline]
    fn from_int(x: f64) -> Self {
        debug_assert!(x.fract() == 0.0);
        Approx { val: x, err: 0.0 }
    }

    fn sign(&self) -> Option<Ordering> {
        if self.err == 0.0 || self.val.abs() > self.err * SLACK {
            Some(super::cmp_f64(self.val, 0.0))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_inputs_are_decided() {
        let x = Approx::from_int(3.0);
        assert_eq!(x.sign(), Some(Ordering::Greater));
        assert_eq!((-x).sign(), Some(Ordering::Less));
        assert_eq!(Approx::from_int(0.0).sign(), Some(Ordering::Equal));
    }

    #[test]
    fn cancellation_is_not_trusted() {
        let big = Approx::from_int((1u64 << 52) as f64 + 1.0);
        // The exact square doesn't fit in a double, so the difference of two
        // nearly-equal squares must be left to a later tier.
        let diff = big * big - big * Approx::from_int((1u64 << 52) as f64);
        assert_eq!(diff.sign(), None);
    }
}
