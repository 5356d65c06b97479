use crate::arith::arithmetic_impl;
use crate::context::with_thread_context;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::rounding::RoundingPolicy;
use rand::Rng;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

/// Signed integer usable as fixed-point storage.
pub trait FixedStorage: Copy + Debug + Default + PartialEq + Eq + Hash + Send + Sync + 'static {
    const BITS: u32;
    const MIN: Self;
    const MAX: Self;

    fn to_f64(self) -> f64;

    /// Float-to-integer conversion clamping to `MIN..=MAX`; NaN maps to zero.
    fn saturating_from_f64(value: f64) -> Self;

    /// Whether an integral `value` fits without saturation.
    fn fits(value: f64) -> bool {
        // MIN is -2^(BITS-1) and exact in f64, so -MIN is the exclusive upper bound
        let bound = -Self::MIN.to_f64();
        value >= -bound && value < bound
    }
}

macro_rules! fixed_storage_impl {
    ($t : ty, $test_name : ident) => {
        impl FixedStorage for $t {
            const BITS: u32 = <$t>::BITS;
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn saturating_from_f64(value: f64) -> Self {
                // `as` saturates at the bounds and sends NaN to zero
                value as $t
            }
        }

        #[cfg(test)]
        mod $test_name {
            use super::FixedStorage;

            #[test]
            fn saturation() {
                assert_eq!(<$t>::saturating_from_f64(1e300), <$t>::MAX);
                assert_eq!(<$t>::saturating_from_f64(-1e300), <$t>::MIN);
                assert_eq!(<$t>::saturating_from_f64(f64::NAN), 0);
                assert_eq!(<$t>::saturating_from_f64(-3.0), -3);
            }

            #[test]
            fn fits_bounds() {
                assert!(<$t>::fits(<$t>::MIN.to_f64()));
                assert!(<$t>::fits(0.0));
                // `MIN - 1.0` rounds back onto MIN for i64, so step to the
                // next double below instead
                let below = f64::from_bits(<$t>::MIN.to_f64().to_bits() + 1);
                assert!(below < <$t>::MIN.to_f64());
                assert!(!<$t>::fits(below));
                assert!(!<$t>::fits(<$t>::MIN.to_f64() * 2.0));
                assert!(!<$t>::fits(-<$t>::MIN.to_f64()));
                assert!(!<$t>::fits(f64::NAN));
            }
        }
    };
}

fixed_storage_impl!(i8, test_i8);
fixed_storage_impl!(i16, test_i16);
fixed_storage_impl!(i32, test_i32);
fixed_storage_impl!(i64, test_i64);

/// Signed fixed-point number storing `value * 2^FRAC` in `T`.
///
/// Values beyond the storage range saturate at [`Fixed::MAX`]/[`Fixed::MIN`].
#[derive(Debug, Default, Clone, Copy)]
#[repr(transparent)]
pub struct Fixed<T, const FRAC: u32, P> {
    raw: T,
    policy: PhantomData<P>,
}

impl<T: FixedStorage, const FRAC: u32, P: RoundingPolicy> Fixed<T, FRAC, P> {
    const VALID_FRACTION: () = assert!(FRAC < T::BITS, "fraction bits must leave room for the sign");

    pub const FORMAT: Format = Format::fixed_point(T::BITS, FRAC);
    pub const MAX: Self = Self::from_bits(T::MAX);
    pub const MIN: Self = Self::from_bits(T::MIN);

    pub const fn from_bits(raw: T) -> Self {
        Self {
            raw,
            policy: PhantomData,
        }
    }

    pub fn to_bits(self) -> T {
        self.raw
    }

    fn scale() -> f64 {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_FRACTION;
        (1u64 << FRAC) as f64
    }

    /// Scales `value`, rounds the fraction under `P` and reports whether the
    /// result had to saturate.
    fn round_scaled<R: Rng + ?Sized>(value: f64, rng: &mut R) -> (Self, bool) {
        let scaled = value * Self::scale();
        let whole = scaled.trunc();
        let fraction = (scaled - whole).abs();

        let rounded = if P::round_up_fraction(fraction, rng) {
            whole + scaled.signum()
        } else {
            whole
        };

        let saturated = !rounded.is_nan() && !T::fits(rounded);
        if saturated {
            tracing::trace!(value, format = %Self::FORMAT, policy = P::NAME, "fixed-point encode saturated");
        }

        (Self::from_bits(T::saturating_from_f64(rounded)), saturated)
    }

    /// Encodes with an explicitly supplied random source.
    pub fn encode_with<R: Rng + ?Sized>(value: f64, rng: &mut R) -> Self {
        Self::round_scaled(value, rng).0
    }

    /// Encodes using the calling thread's rounding context.
    pub fn encode(value: f64) -> Self {
        with_thread_context(|rng| Self::encode_with(value, rng))
    }

    /// Like [`Fixed::encode_with`] but reports NaN and out-of-range input
    /// instead of saturating.
    pub fn try_encode_with<R: Rng + ?Sized>(value: f64, rng: &mut R) -> Result<Self> {
        if value.is_nan() {
            return Err(Error::NotANumber {
                format: Self::FORMAT,
            });
        }

        match Self::round_scaled(value, rng) {
            (_, true) => Err(Error::Overflow {
                value,
                format: Self::FORMAT,
            }),
            (fixed, false) => Ok(fixed),
        }
    }

    pub fn try_encode(value: f64) -> Result<Self> {
        with_thread_context(|rng| Self::try_encode_with(value, rng))
    }

    pub fn decode(self) -> f64 {
        self.raw.to_f64() / Self::scale()
    }

    pub fn to_f64(self) -> f64 {
        self.decode()
    }
}

arithmetic_impl!(Fixed<T, FRAC, P>, f64, [T: FixedStorage, const FRAC: u32, P: RoundingPolicy]);
