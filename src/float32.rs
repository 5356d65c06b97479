use crate::arith::arithmetic_impl;
use crate::context::with_thread_context;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::numeric::FloatParts;
use crate::rounding::{round_pattern, RoundingPolicy};
use rand::Rng;
use std::marker::PhantomData;

/// f64 mantissa bits that do not fit into an f32 mantissa.
pub const CUT: u32 = 29;

/// 32-bit float produced by cutting the low mantissa bits of an f64.
///
/// Rounding happens on the f64 pattern; carries propagate into the exponent.
/// Results beyond the f32 range saturate at `±f32::MAX`. Inputs inside the
/// f32 subnormal range are converted by the hardware (round to nearest).
#[derive(Debug, Default, Clone, Copy)]
#[repr(transparent)]
pub struct Float32<P> {
    value: f32,
    policy: PhantomData<P>,
}

impl<P: RoundingPolicy> Float32<P> {
    pub const FORMAT: Format = Format::floating(8, 23, 64, CUT);
    pub const MAX: Self = Self::from_f32(f32::MAX);
    pub const MIN: Self = Self::from_f32(f32::MIN);

    /// Wraps an f32 without rounding; every f32 is representable.
    pub const fn from_f32(value: f32) -> Self {
        Self {
            value,
            policy: PhantomData,
        }
    }

    pub fn from_bits(bits: u32) -> Self {
        Self::from_f32(f32::from_bits(bits))
    }

    pub fn to_bits(self) -> u32 {
        self.value.to_bits()
    }

    fn round_wide<R: Rng + ?Sized>(value: f64, rng: &mut R) -> (Self, bool) {
        if value.is_nan() {
            return (Self::from_f32(f32::NAN), false);
        }

        let rounded = f64::from_pattern(round_pattern::<P, _>(value.to_pattern(), CUT, rng));

        if rounded > f32::MAX as f64 {
            tracing::trace!(value, policy = P::NAME, "float32 encode saturated at max");
            (Self::MAX, true)
        } else if rounded < f32::MIN as f64 {
            tracing::trace!(value, policy = P::NAME, "float32 encode saturated at min");
            (Self::MIN, true)
        } else {
            (Self::from_f32(rounded as f32), false)
        }
    }

    pub fn encode_with<R: Rng + ?Sized>(value: f64, rng: &mut R) -> Self {
        Self::round_wide(value, rng).0
    }

    pub fn encode(value: f64) -> Self {
        with_thread_context(|rng| Self::encode_with(value, rng))
    }

    pub fn try_encode_with<R: Rng + ?Sized>(value: f64, rng: &mut R) -> Result<Self> {
        if value.is_nan() {
            return Err(Error::NotANumber {
                format: Self::FORMAT,
            });
        }

        match Self::round_wide(value, rng) {
            (_, true) => Err(Error::Overflow {
                value,
                format: Self::FORMAT,
            }),
            (float, false) => Ok(float),
        }
    }

    pub fn try_encode(value: f64) -> Result<Self> {
        with_thread_context(|rng| Self::try_encode_with(value, rng))
    }

    pub fn decode(self) -> f64 {
        self.value as f64
    }

    pub fn to_f64(self) -> f64 {
        self.decode()
    }

    pub fn to_f32(self) -> f32 {
        self.value
    }
}

arithmetic_impl!(Float32<P>, f64, [P: RoundingPolicy]);
