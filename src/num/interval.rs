use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

use super::Ring;

/// A closed interval guaranteed to contain the exact value.
///
/// Instead of switching the FPU rounding mode, each operation computes its
/// round-to-nearest result together with the exact rounding error (the
/// classic two-sum and fma-based two-product transformations). The sign of
/// that error tells us which way the result was rounded, so we only need to
/// widen by one ulp when the rounding went the wrong way. In particular, an
/// operation that happened to be exact doesn't widen the interval at all,
/// which lets this tier decide exact zeros.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Interval {
    pub lo: f64,
    pub hi: f64,
}

fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        x
    } else if x == 0.0 {
        f64::from_bits(1)
    } else if x > 0.0 {
        f64::from_bits(x.to_bits() + 1)
    } else {
        f64::from_bits(x.to_bits() - 1)
    }
}

fn next_down(x: f64) -> f64 {
    -next_up(-x)
}

#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let b_virt = s - a;
    let a_virt = s - b_virt;
    (s, (a - a_virt) + (b - b_virt))
}

#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    (p, a.mul_add(b, -p))
}

// `approx + err` is the exact value; round it down.
#[inline]
fn down((approx, err): (f64, f64)) -> f64 {
    if err < 0.0 {
        next_down(approx)
    } else {
        approx
    }
}

#[inline]
fn up((approx, err): (f64, f64)) -> f64 {
    if err > 0.0 {
        next_up(approx)
    } else {
        approx
    }
}

impl Add for Interval {
    type Output = Interval;

    #[inline]
    fn add(self, rhs: Interval) -> Interval {
        Interval {
            lo: down(two_sum(self.lo, rhs.lo)),
            hi: up(two_sum(self.hi, rhs.hi)),
        }
    }
}

impl Sub for Interval {
    type Output = Interval;

    #[inline]
    fn sub(self, rhs: Interval) -> Interval {
        self + (-rhs)
    }
}

impl Neg for Interval {
    type Output = Interval;

    #[inline]
    fn neg(self) -> Interval {
        Interval {
            lo: -self.hi,
            hi: -self.lo,
        }
    }
}

impl Mul for Interval {
    type Output = Interval;

    fn mul(self, rhs: Interval) -> Interval {
        let corners = [
            two_prod(self.lo, rhs.lo),
            two_prod(self.lo, rhs.hi),
            two_prod(self.hi, rhs.lo),
            two_prod(self.hi, rhs.hi),
        ];
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for c in corners {
            lo = lo.min(down(c));
            hi = hi.max(up(c));
        }
        Interval { lo, hi }
    }
}

impl Ring for Interval {
    #[inline]
    fn from_int(x: f64) -> Self {
        debug_assert!(x.fract() == 0.0);
        Interval { lo: x, hi: x }
    }

    fn sign(&self) -> Option<Ordering> {
        if self.lo > 0.0 {
            Some(Ordering::Greater)
        } else if self.hi < 0.0 {
            Some(Ordering::Less)
        } else if self.lo == 0.0 && self.hi == 0.0 {
            Some(Ordering::Equal)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ulp_steps() {
        assert!(next_up(1.0) > 1.0);
        assert!(next_down(1.0) < 1.0);
        assert!(next_up(-1.0) > -1.0);
        assert!(next_up(0.0) > 0.0);
        assert!(next_down(0.0) < 0.0);
        assert_eq!(next_down(next_up(3.5)), 3.5);
    }

    #[test]
    fn rounding_is_outwards() {
        let big = Interval::from_int((1u64 << 53) as f64);
        let one = Interval::from_int(1.0);
        // 2^53 + 1 isn't representable, so the sum must straddle it.
        let sum = big + one;
        assert_eq!(sum.lo, (1u64 << 53) as f64);
        assert!(sum.hi > (1u64 << 53) as f64);

        let diff = sum - big;
        assert_eq!(diff.sign(), None);
        assert!(diff.lo <= 1.0 && 1.0 <= diff.hi);
    }
}
