//! The numeric tiers behind the exact predicates.
//!
//! Every predicate in this crate is written once, as an expression that is
//! generic over [`Ring`], and then evaluated at increasing precision until one
//! of the tiers can vouch for its sign:
//!
//! 1. [`Approx`]: a plain `f64` computation that carries a running bound on its
//!    own rounding error.
//! 2. [`Interval`]: lower and upper bounds, rounded outwards using error-free
//!    transformations.
//! 3. [`Wide`]: fixed-width sign-magnitude integers, which are exact as long
//!    as the expression's inputs respect the coordinate bounds in [`crate::geom`].
//!
//! A tier either returns the exact sign or declines; it never guesses.

use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

mod approx;
mod interval;
mod wide;

pub(crate) use approx::Approx;
pub(crate) use interval::Interval;
pub(crate) use wide::Wide;

/// The arithmetic needed to evaluate a predicate expression.
///
/// Inputs are always integer-valued doubles; see [`Ring::from_int`].
pub(crate) trait Ring:
    Copy
    + std::fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// Lifts an integer-valued double into this ring.
    ///
    /// The value must be an integer with absolute value at most `2^53`.
    fn from_int(x: f64) -> Self;

    /// The sign of this value, or `None` if this tier cannot be sure of it.
    fn sign(&self) -> Option<Ordering>;
}

/// Which tier ended up deciding a predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tier {
    Double = 0,
    Interval = 1,
    Exact = 2,
}

/// Compares two doubles that are known not to be NaN.
#[inline(always)]
pub(crate) fn cmp_f64(a: f64, b: f64) -> Ordering {
    if a < b {
        Ordering::Less
    } else if a > b {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use malachite::Rational;
    use proptest::prelude::*;

    // The largest magnitude any of the tiers is asked to multiply directly.
    const BOUND: i64 = 1 << 30;

    fn exact_det(a: i64, b: i64, c: i64, d: i64) -> Ordering {
        let det = Rational::from(a) * Rational::from(d) - Rational::from(b) * Rational::from(c);
        det.partial_cmp(&Rational::from(0)).unwrap()
    }

    fn det<R: Ring>(a: i64, b: i64, c: i64, d: i64) -> R {
        let [a, b, c, d] = [a, b, c, d].map(|x| R::from_int(x as f64));
        a * d - b * c
    }

    fn check_all_tiers(a: i64, b: i64, c: i64, d: i64) {
        let expected = exact_det(a, b, c, d);
        if let Some(s) = det::<Approx>(a, b, c, d).sign() {
            assert_eq!(s, expected, "double tier on {a} {b} {c} {d}");
        }
        if let Some(s) = det::<Interval>(a, b, c, d).sign() {
            assert_eq!(s, expected, "interval tier on {a} {b} {c} {d}");
        }
        assert_eq!(det::<Wide<2>>(a, b, c, d).sign(), Some(expected));
        assert_eq!(det::<Wide<4>>(a, b, c, d).sign(), Some(expected));
    }

    #[test]
    fn near_ties() {
        // Products that agree in their top 53 bits but not below.
        let a = (1 << 30) - 1;
        let d = (1 << 30) - 3;
        check_all_tiers(a, a - 1, d + 1, d);
        check_all_tiers(a, a, d, d);
        check_all_tiers(a, (1 << 30) - 2, (1 << 30) - 2, d);
        check_all_tiers(-a, 3, 5, d);
        check_all_tiers(0, 0, 0, 0);
    }

    #[test]
    fn interval_decides_exact_ties() {
        let x = (1 << 29) + 1;
        assert_eq!(det::<Interval>(x, x, x, x).sign(), Some(Ordering::Equal));
    }

    fn coord() -> impl Strategy<Value = i64> {
        prop_oneof![-BOUND..BOUND, -8i64..8, Just(BOUND - 1), Just(1 - BOUND)]
    }

    proptest! {
        #[test]
        fn tiers_agree_with_rationals(a in coord(), b in coord(), c in coord(), d in coord()) {
            check_all_tiers(a, b, c, d);
        }

        #[test]
        fn tiers_agree_on_collinear(a in -BOUND..BOUND, b in -BOUND..BOUND, k in -4i64..4) {
            // (a, b) and k * (a, b) are parallel, so the determinant is zero.
            let (c, d) = (a * k, b * k);
            if c.abs() < BOUND && d.abs() < BOUND {
                check_all_tiers(a, c, b, d);
            }
        }

        #[test]
        fn wide_matches_i128(a in any::<i32>(), b in any::<i32>(), c in any::<i32>(), d in any::<i32>()) {
            let expected = (a as i128 * d as i128 - b as i128 * c as i128).cmp(&0);
            let w = det::<Wide<2>>(a.into(), b.into(), c.into(), d.into());
            prop_assert_eq!(w.sign(), Some(expected));
        }
    }
}
