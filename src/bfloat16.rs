use crate::arith::arithmetic_impl;
use crate::context::with_thread_context;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::numeric::FloatParts;
use crate::rounding::{round_pattern, RoundingPolicy};
use half::bf16;
use rand::Rng;
use std::marker::PhantomData;

/// Low f32 mantissa bits dropped by bfloat16.
pub const CUT: u32 = 16;

const EXPONENT_MASK: u16 = 0x7f80;
const MAGNITUDE_MASK: u16 = 0x7fff;
const SIGN_MASK: u16 = 0x8000;
const QUIET_NAN: u16 = 0x7fc0;

/// Upper half of an f32: sign, 8-bit exponent, 7-bit mantissa.
#[derive(Debug, Default, Clone, Copy)]
#[repr(transparent)]
pub struct BFloat16<P> {
    bits: u16,
    policy: PhantomData<P>,
}

impl<P: RoundingPolicy> BFloat16<P> {
    pub const FORMAT: Format = Format::floating(8, 7, 32, CUT);
    pub const MAX: Self = Self::from_bits(bf16::MAX.to_bits());
    pub const MIN: Self = Self::from_bits(bf16::MIN.to_bits());

    pub const fn from_bits(bits: u16) -> Self {
        Self {
            bits,
            policy: PhantomData,
        }
    }

    pub fn to_bits(self) -> u16 {
        self.bits
    }

    fn round_single<R: Rng + ?Sized>(value: f32, rng: &mut R) -> (Self, bool) {
        let pattern = value.to_pattern();
        let sign = (pattern >> CUT) as u16 & SIGN_MASK;

        if value.is_nan() {
            return (Self::from_bits(sign | QUIET_NAN), false);
        }

        let bits = (round_pattern::<P, _>(pattern, CUT, rng) >> CUT) as u16;

        // an all-ones exponent here is an overflow (or infinite input), never NaN
        if bits & EXPONENT_MASK == EXPONENT_MASK {
            tracing::trace!(value, policy = P::NAME, "bfloat16 encode saturated");
            let max = Self::MAX.bits & MAGNITUDE_MASK;
            return (Self::from_bits(sign | max), true);
        }

        (Self::from_bits(bits), false)
    }

    pub fn encode_with<R: Rng + ?Sized>(value: f32, rng: &mut R) -> Self {
        Self::round_single(value, rng).0
    }

    pub fn encode(value: f32) -> Self {
        with_thread_context(|rng| Self::encode_with(value, rng))
    }

    pub fn try_encode_with<R: Rng + ?Sized>(value: f32, rng: &mut R) -> Result<Self> {
        if value.is_nan() {
            return Err(Error::NotANumber {
                format: Self::FORMAT,
            });
        }

        match Self::round_single(value, rng) {
            (_, true) => Err(Error::Overflow {
                value: value as f64,
                format: Self::FORMAT,
            }),
            (bf, false) => Ok(bf),
        }
    }

    pub fn try_encode(value: f32) -> Result<Self> {
        with_thread_context(|rng| Self::try_encode_with(value, rng))
    }

    pub fn decode(self) -> f32 {
        bf16::from_bits(self.bits).to_f32()
    }

    pub fn to_f64(self) -> f64 {
        self.decode() as f64
    }
}

arithmetic_impl!(BFloat16<P>, f32, [P: RoundingPolicy]);

#[cfg(test)]
mod test {
    use super::*;
    use crate::{BFloat16RN, BFloat16SR};
    use assert_float_eq::*;
    use pcg_rand::Pcg64;
    use rand::SeedableRng;

    #[test]
    fn storage_size() {
        assert_eq!(std::mem::size_of::<BFloat16RN>(), 2);
        assert_eq!(std::mem::size_of::<BFloat16SR>(), 2);
        assert_eq!(BFloat16SR::FORMAT.storage_bytes(), 2);
    }

    #[test]
    fn representable_values_are_exact() {
        let mut rng = Pcg64::seed_from_u64(0x1234);
        for v in [0.0f32, 1.0, -1.0, 0.5, 0.25, 3.0, -96.0, 1.5e-30] {
            let v = bf16::from_f32(v).to_f32();
            for _ in 0..1000 {
                assert_eq!(BFloat16SR::encode_with(v, &mut rng).decode(), v);
            }
            assert_eq!(BFloat16RN::encode(v).decode(), v);
            assert_eq!((-BFloat16RN::encode(v)).decode(), -v);
        }
    }

    #[test]
    fn nearest_matches_half_crate_away_from_ties() {
        let mut rng = Pcg64::seed_from_u64(0x1235);
        for _ in 0..10_000 {
            let v = f32::from_bits(rng.gen::<u32>() & 0xbfff_ffff);
            if v.is_nan() || v.to_bits() & 0xffff == 0x8000 {
                continue;
            }
            assert_eq!(
                BFloat16RN::encode(v).to_bits(),
                bf16::from_f32(v).to_bits(),
                "value {}",
                v
            );
        }
    }

    #[test]
    fn nearest_is_idempotent() {
        let mut rng = Pcg64::seed_from_u64(0x1236);
        for _ in 0..10_000 {
            let once = BFloat16RN::encode(rng.gen_range(-1e4..1e4));
            assert_eq!(BFloat16RN::encode(once.decode()).to_bits(), once.to_bits());
        }
    }

    #[test]
    fn stochastic_rounds_both_ways() {
        let mut rng = Pcg64::seed_from_u64(0x1237);
        let expected = 1.0f64 / 3.0;
        let (mut up, mut down) = (0, 0);
        for _ in 0..10_000 {
            if BFloat16SR::encode_with(expected as f32, &mut rng) < expected {
                down += 1;
            } else {
                up += 1;
            }
        }
        assert!(up > 0 && down > 0);
    }

    #[test]
    fn stochastic_probability_matches_residual() {
        let mut rng = Pcg64::seed_from_u64(0x1239);
        let trials = 10_000_000u64;
        let value = 1.0f32 / 3.0;

        let residual = value.to_bits() & 0xffff;
        let analytic = residual as f64 / 65536.0;
        let truncated = f32::from_bits(value.to_bits() & 0xffff_0000);

        let ups = (0..trials)
            .filter(|_| BFloat16SR::encode_with(value, &mut rng).decode() != truncated)
            .count();

        assert_float_absolute_eq!(ups as f64 / trials as f64, analytic, 0.001);
    }

    #[test]
    fn ordering_is_trichotomous() {
        let mut rng = Pcg64::seed_from_u64(0x123a);
        for _ in 0..10_000 {
            let a = BFloat16SR::encode_with(rng.gen_range(-4.0..4.0), &mut rng);
            let b = BFloat16SR::encode_with(rng.gen_range(-4.0..4.0), &mut rng);

            assert_eq!([a < b, a == b, a > b].iter().filter(|&&r| r).count(), 1);
            assert_eq!(a < b, a.decode() < b.decode());
            assert_eq!(a == b, a.decode() == b.decode());
        }

        // nearby values often collapse onto the same pattern
        let a = BFloat16SR::encode(1.0);
        let b = BFloat16SR::encode(1.0);
        assert!(a == b && !(a < b) && !(a > b));
    }

    #[test]
    fn saturates() {
        let mut rng = Pcg64::seed_from_u64(0x1238);
        assert_eq!(BFloat16RN::encode(f32::MAX), BFloat16RN::MAX);
        assert_eq!(BFloat16RN::encode(f32::MIN), BFloat16RN::MIN);
        assert_eq!(BFloat16RN::encode(f32::INFINITY), BFloat16RN::MAX);
        for _ in 0..100 {
            let v = BFloat16SR::encode_with(f32::MAX, &mut rng);
            assert!(v.decode().is_finite());
        }

        assert!(BFloat16RN::try_encode(f32::MAX).is_err());
        assert!(BFloat16RN::try_encode(f32::NAN).is_err());
        assert!(BFloat16RN::encode(f32::NAN).decode().is_nan());
        assert_eq!(BFloat16RN::MAX.decode(), bf16::MAX.to_f32());
    }

    #[test]
    fn wide_arithmetic_rounds_once() {
        // 1 + 2^-8 needs one more mantissa bit than bfloat16 has: a tie
        let one = BFloat16RN::encode(1.0);
        assert_eq!((one + 2f32.powi(-8)).decode(), 1.0 + 2f32.powi(-7));
        assert_eq!((one + 2f32.powi(-9)).decode(), 1.0);
    }
}
