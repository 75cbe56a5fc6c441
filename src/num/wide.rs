use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

use super::Ring;

/// A signed integer with `32 * N` bits of magnitude.
///
/// This is the exact tier. It is only as exact as it is wide, so each
/// predicate declares how many words its largest intermediate value needs
/// (see `Expr::EXACT_WORDS`); overflowing that is a bug, and is caught by
/// debug assertions.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct Wide<const N: usize> {
    neg: bool,
    // Little-endian words.
    mag: [u32; N],
}

impl<const N: usize> std::fmt::Debug for Wide<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}0x", if self.neg { "-" } else { "" })?;
        for w in self.mag.iter().rev() {
            write!(f, "{w:08x}")?;
        }
        Ok(())
    }
}

impl<const N: usize> Wide<N> {
    const ZERO: Self = Wide {
        neg: false,
        mag: [0; N],
    };

    pub fn from_i64(x: i64) -> Self {
        let abs = x.unsigned_abs();
        let mut mag = [0; N];
        mag[0] = abs as u32;
        if N > 1 {
            mag[1] = (abs >> 32) as u32;
        } else {
            debug_assert!(abs >> 32 == 0);
        }
        Wide { neg: x < 0, mag }
    }

    fn is_zero(&self) -> bool {
        self.mag.iter().all(|&w| w == 0)
    }

    fn cmp_mag(a: &[u32; N], b: &[u32; N]) -> Ordering {
        a.iter().rev().cmp(b.iter().rev())
    }

    fn add_mag(a: &[u32; N], b: &[u32; N]) -> [u32; N] {
        let mut out = [0; N];
        let mut carry = 0u64;
        for i in 0..N {
            let t = a[i] as u64 + b[i] as u64 + carry;
            out[i] = t as u32;
            carry = t >> 32;
        }
        debug_assert_eq!(carry, 0, "exact tier overflow");
        out
    }

    // Requires `a >= b`.
    fn sub_mag(a: &[u32; N], b: &[u32; N]) -> [u32; N] {
        let mut out = [0; N];
        let mut borrow = 0i64;
        for i in 0..N {
            let mut t = a[i] as i64 - b[i] as i64 - borrow;
            if t < 0 {
                t += 1 << 32;
                borrow = 1;
            } else {
                borrow = 0;
            }
            out[i] = t as u32;
        }
        debug_assert_eq!(borrow, 0);
        out
    }

    fn with_sign(neg: bool, mag: [u32; N]) -> Self {
        let mut ret = Wide { neg, mag };
        if ret.is_zero() {
            ret.neg = false;
        }
        ret
    }
}

impl<const N: usize> Add for Wide<N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        if self.neg == rhs.neg {
            return Wide::with_sign(self.neg, Wide::add_mag(&self.mag, &rhs.mag));
        }
        match Wide::cmp_mag(&self.mag, &rhs.mag) {
            Ordering::Greater => Wide::with_sign(self.neg, Wide::sub_mag(&self.mag, &rhs.mag)),
            Ordering::Less => Wide::with_sign(rhs.neg, Wide::sub_mag(&rhs.mag, &self.mag)),
            Ordering::Equal => Wide::ZERO,
        }
    }
}

impl<const N: usize> Sub for Wide<N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl<const N: usize> Neg for Wide<N> {
    type Output = Self;

    fn neg(self) -> Self {
        Wide::with_sign(!self.neg, self.mag)
    }
}

impl<const N: usize> Mul for Wide<N> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = [0u32; N];
        for i in 0..N {
            if self.mag[i] == 0 {
                continue;
            }
            let mut carry = 0u64;
            for j in 0..N {
                if i + j >= N {
                    debug_assert!(rhs.mag[j] == 0, "exact tier overflow");
                    continue;
                }
                let t = out[i + j] as u64 + self.mag[i] as u64 * rhs.mag[j] as u64 + carry;
                out[i + j] = t as u32;
                carry = t >> 32;
            }
            debug_assert_eq!(carry, 0, "exact tier overflow");
        }
        Wide::with_sign(self.neg != rhs.neg, out)
    }
}

impl<const N: usize> Ring for Wide<N> {
    fn from_int(x: f64) -> Self {
        debug_assert!(x.fract() == 0.0 && x.abs() <= (1u64 << 53) as f64);
        Wide::from_i64(x as i64)
    }

    fn sign(&self) -> Option<Ordering> {
        Some(if self.is_zero() {
            Ordering::Equal
        } else if self.neg {
            Ordering::Less
        } else {
            Ordering::Greater
        })
    }
}
