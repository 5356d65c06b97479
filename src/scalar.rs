//! Exposes every format as a generic scalar for numeric consumers
//! (integrators, dense linear algebra).

use crate::bfloat16::BFloat16;
use crate::binary16::Half;
use crate::fixed::{Fixed, FixedStorage};
use crate::float32::Float32;
use crate::format::Format;
use crate::rounding::RoundingPolicy;
use num_traits::{Float, Num};
use rand::Rng;
use std::fmt::{Debug, Display};
use std::iter::{Product, Sum};
use std::ops::{AddAssign, DivAssign, MulAssign, Neg, SubAssign};

pub trait Scalar:
    Copy
    + Debug
    + Display
    + Default
    + PartialOrd
    + Num
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Sum
    + Product
    + Send
    + Sync
    + 'static
{
    /// Precision arithmetic is carried out in.
    type Reference: Float + Debug + Display;
    type Real: Scalar;
    type NonInteger: Scalar;

    /// Relative cost hints for expression optimisers.
    const READ_COST: usize;
    const ADD_COST: usize;
    const MUL_COST: usize;

    const FORMAT: Format;

    fn encode_with<R: Rng + ?Sized>(value: Self::Reference, rng: &mut R) -> Self;
    fn encode(value: Self::Reference) -> Self;
    fn decode(self) -> Self::Reference;

    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;

    /// Promote-compute-round with a double factor.
    fn mul_f64(self, factor: f64) -> Self {
        Self::from_f64(self.to_f64() * factor)
    }
}

macro_rules! scalar_impl {
    ($ty : ty, $reference : ty, [$($generics : tt)*]) => {
        impl<$($generics)*> Scalar for $ty {
            type Reference = $reference;
            type Real = Self;
            type NonInteger = Self;

            const READ_COST: usize = 1;
            const ADD_COST: usize = 4;
            const MUL_COST: usize = 4;

            const FORMAT: Format = <$ty>::FORMAT;

            fn encode_with<R: Rng + ?Sized>(value: $reference, rng: &mut R) -> Self {
                <$ty>::encode_with(value, rng)
            }

            fn encode(value: $reference) -> Self {
                <$ty>::encode(value)
            }

            fn decode(self) -> $reference {
                <$ty>::decode(self)
            }

            fn from_f64(value: f64) -> Self {
                <$ty>::encode(value as $reference)
            }

            fn to_f64(self) -> f64 {
                <$ty>::to_f64(self)
            }
        }

        impl<$($generics)*> num_traits::Zero for $ty {
            fn zero() -> Self {
                <$ty>::encode(0.0)
            }

            fn is_zero(&self) -> bool {
                <$ty>::decode(*self) == 0.0
            }
        }

        impl<$($generics)*> num_traits::One for $ty {
            fn one() -> Self {
                <$ty>::encode(1.0)
            }
        }

        impl<$($generics)*> num_traits::Num for $ty {
            type FromStrRadixErr = num_traits::ParseFloatError;

            fn from_str_radix(s: &str, radix: u32) -> Result<Self, Self::FromStrRadixErr> {
                <$reference as num_traits::Num>::from_str_radix(s, radix).map(<$ty>::encode)
            }
        }

        impl<$($generics)*> num_traits::Bounded for $ty {
            fn min_value() -> Self {
                <$ty>::MIN
            }

            fn max_value() -> Self {
                <$ty>::MAX
            }
        }

        // integer conversions truncate toward zero, `None` when out of range
        impl<$($generics)*> num_traits::ToPrimitive for $ty {
            fn to_i64(&self) -> Option<i64> {
                num_traits::ToPrimitive::to_i64(&<$ty>::to_f64(*self))
            }

            fn to_u64(&self) -> Option<u64> {
                num_traits::ToPrimitive::to_u64(&<$ty>::to_f64(*self))
            }

            fn to_f64(&self) -> Option<f64> {
                Some(<$ty>::to_f64(*self))
            }
        }
    };
}

scalar_impl!(Fixed<T, FRAC, P>, f64, [T: FixedStorage, const FRAC: u32, P: RoundingPolicy]);
scalar_impl!(Float32<P>, f64, [P: RoundingPolicy]);
scalar_impl!(BFloat16<P>, f32, [P: RoundingPolicy]);
scalar_impl!(Half<P>, f32, [P: RoundingPolicy]);

macro_rules! native_scalar_impl {
    ($t : ty, $format : expr) => {
        impl Scalar for $t {
            type Reference = $t;
            type Real = $t;
            type NonInteger = $t;

            const READ_COST: usize = 1;
            const ADD_COST: usize = 1;
            const MUL_COST: usize = 1;

            const FORMAT: Format = $format;

            fn encode_with<R: Rng + ?Sized>(value: $t, _rng: &mut R) -> Self {
                value
            }

            fn encode(value: $t) -> Self {
                value
            }

            fn decode(self) -> $t {
                self
            }

            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

native_scalar_impl!(f64, Format::floating(11, 52, 64, 0));
native_scalar_impl!(f32, Format::floating(8, 23, 32, 0));
