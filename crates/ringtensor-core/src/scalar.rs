//! Algebraic capability traits for tensor elements.
//!
//! Every container in ringtensor is generic over one of three nested
//! structures:
//!
//! - [`Semiring`]: addition and multiplication with identities (`zero`, `one`)
//! - [`Ring`]: a semiring with additive inverses and a conjugate
//! - [`Field`]: a ring with multiplicative inverses
//!
//! Kernels only ever use the operations of the weakest structure they need,
//! so boolean matrices (the `(or, and)` semiring) can be multiplied with the
//! same code as `f64` or complex matrices.
//!
//! Integer implementations use wrapping arithmetic. Sequential and concurrent
//! kernels therefore produce identical results even when intermediate sums
//! overflow.
//!
//! # Examples
//!
//! ```
//! use ringtensor_core::{Field, Ring, Semiring};
//!
//! assert_eq!(Semiring::add(&true, &false), true);
//! assert_eq!(Semiring::mult(&true, &false), false);
//! assert_eq!(Ring::sub(&7_i64, &9), -2);
//! assert_eq!(Field::div(&1.0_f64, &4.0), 0.25);
//! ```

use scirs2_core::num_complex::Complex;
use std::fmt::Debug;

/// A set with associative addition and multiplication, both with identities.
pub trait Semiring: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Additive identity.
    fn zero() -> Self;

    /// Multiplicative identity.
    fn one() -> Self;

    fn add(&self, rhs: &Self) -> Self;

    fn mult(&self, rhs: &Self) -> Self;

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    fn is_one(&self) -> bool {
        *self == Self::one()
    }

    /// `self += rhs`
    #[inline]
    fn add_assign(&mut self, rhs: &Self) {
        *self = Semiring::add(self, rhs);
    }

    /// `self += a * b`, the inner step of every product kernel.
    #[inline]
    fn fma_assign(&mut self, a: &Self, b: &Self) {
        let prod = Semiring::mult(a, b);
        *self = Semiring::add(self, &prod);
    }
}

/// A semiring with additive inverses.
pub trait Ring: Semiring {
    fn sub(&self, rhs: &Self) -> Self;

    /// Additive inverse (`-self`).
    fn add_inv(&self) -> Self;

    /// Complex conjugate. Identity for real rings.
    fn conj(&self) -> Self {
        self.clone()
    }

    /// Absolute value or modulus, used for approximate comparisons.
    fn magnitude(&self) -> f64;
}

/// A ring where every non-zero element has a multiplicative inverse.
pub trait Field: Ring {
    fn div(&self, rhs: &Self) -> Self;

    fn mult_inv(&self) -> Self {
        Field::div(&Self::one(), self)
    }
}

impl Semiring for bool {
    fn zero() -> Self {
        false
    }

    fn one() -> Self {
        true
    }

    #[inline]
    fn add(&self, rhs: &Self) -> Self {
        *self || *rhs
    }

    #[inline]
    fn mult(&self, rhs: &Self) -> Self {
        *self && *rhs
    }
}

macro_rules! impl_unsigned_semiring {
    ($($t:ty),*) => {
        $(
            impl Semiring for $t {
                fn zero() -> Self {
                    0
                }

                fn one() -> Self {
                    1
                }

                #[inline]
                fn add(&self, rhs: &Self) -> Self {
                    self.wrapping_add(*rhs)
                }

                #[inline]
                fn mult(&self, rhs: &Self) -> Self {
                    self.wrapping_mul(*rhs)
                }
            }
        )*
    };
}

macro_rules! impl_signed_ring {
    ($($t:ty),*) => {
        $(
            impl_unsigned_semiring!($t);

            impl Ring for $t {
                #[inline]
                fn sub(&self, rhs: &Self) -> Self {
                    self.wrapping_sub(*rhs)
                }

                #[inline]
                fn add_inv(&self) -> Self {
                    self.wrapping_neg()
                }

                fn magnitude(&self) -> f64 {
                    (*self as f64).abs()
                }
            }
        )*
    };
}

macro_rules! impl_float_field {
    ($($t:ty),*) => {
        $(
            impl Semiring for $t {
                fn zero() -> Self {
                    0.0
                }

                fn one() -> Self {
                    1.0
                }

                #[inline]
                fn add(&self, rhs: &Self) -> Self {
                    self + rhs
                }

                #[inline]
                fn mult(&self, rhs: &Self) -> Self {
                    self * rhs
                }
            }

            impl Ring for $t {
                #[inline]
                fn sub(&self, rhs: &Self) -> Self {
                    self - rhs
                }

                #[inline]
                fn add_inv(&self) -> Self {
                    -self
                }

                fn magnitude(&self) -> f64 {
                    self.abs() as f64
                }
            }

            impl Field for $t {
                #[inline]
                fn div(&self, rhs: &Self) -> Self {
                    self / rhs
                }
            }

            impl Semiring for Complex<$t> {
                fn zero() -> Self {
                    Complex::new(0.0, 0.0)
                }

                fn one() -> Self {
                    Complex::new(1.0, 0.0)
                }

                #[inline]
                fn add(&self, rhs: &Self) -> Self {
                    self + rhs
                }

                #[inline]
                fn mult(&self, rhs: &Self) -> Self {
                    self * rhs
                }
            }

            impl Ring for Complex<$t> {
                #[inline]
                fn sub(&self, rhs: &Self) -> Self {
                    self - rhs
                }

                #[inline]
                fn add_inv(&self) -> Self {
                    -self
                }

                fn conj(&self) -> Self {
                    Complex::new(self.re, -self.im)
                }

                fn magnitude(&self) -> f64 {
                    (self.re as f64).hypot(self.im as f64)
                }
            }

            impl Field for Complex<$t> {
                #[inline]
                fn div(&self, rhs: &Self) -> Self {
                    self / rhs
                }
            }
        )*
    };
}

impl_unsigned_semiring!(u8, u16, u32, u64, u128, usize);
impl_signed_ring!(i8, i16, i32, i64, i128, isize);
impl_float_field!(f32, f64);
