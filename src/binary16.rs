use crate::arith::arithmetic_impl;
use crate::context::with_thread_context;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::numeric::FloatParts;
use crate::residual::MAX_CUT;
use crate::rounding::{round_pattern, RoundingPolicy};
use half::f16;
use rand::Rng;
use std::marker::PhantomData;

/// f32 mantissa bits dropped for normal half values.
pub const CUT: u32 = 13;

const HALF_EXPONENT_BIAS: i32 = 15;
const HALF_EXPONENT_MAX: i32 = 31;
const INFINITY_BITS: u64 = 0x7c00;
const QUIET_NAN: u16 = 0x7e00;

/// IEEE-754 binary16: sign, 5-bit exponent, 10-bit mantissa.
///
/// In the subnormal range the cut widens so that the residual is measured
/// against the smallest subnormal, 2^-24.
#[derive(Debug, Default, Clone, Copy)]
#[repr(transparent)]
pub struct Half<P> {
    bits: u16,
    policy: PhantomData<P>,
}

impl<P: RoundingPolicy> Half<P> {
    pub const FORMAT: Format = Format::floating(5, 10, 32, CUT);
    pub const MAX: Self = Self::from_bits(f16::MAX.to_bits());
    pub const MIN: Self = Self::from_bits(f16::MIN.to_bits());

    pub const fn from_bits(bits: u16) -> Self {
        Self {
            bits,
            policy: PhantomData,
        }
    }

    pub fn to_bits(self) -> u16 {
        self.bits
    }

    /// Magnitude bits of the rounded half, possibly `>= INFINITY_BITS` on overflow.
    fn round_magnitude<R: Rng + ?Sized>(value: f32, rng: &mut R) -> u64 {
        let biased = value.biased_exponent() as i32;
        let exponent = biased - f32::EXPONENT_BIAS + HALF_EXPONENT_BIAS;

        if exponent >= HALF_EXPONENT_MAX {
            return INFINITY_BITS;
        }

        if exponent >= 1 {
            // normal: rebias the exponent in place and cut the mantissa
            let pattern = ((exponent as u64) << f32::BITS_MANTISSA) | value.mantissa();
            return round_pattern::<P, _>(pattern, CUT, rng) >> CUT;
        }

        // subnormal half: count in units of 2^-24; a carry out of the
        // mantissa lands exactly on the smallest normal pattern
        let (significand, biased) = if biased == 0 {
            (value.mantissa(), 1)
        } else {
            (value.mantissa() | (1 << f32::BITS_MANTISSA), biased)
        };
        let cut = (126 - biased) as u32;
        if cut > MAX_CUT {
            return 0;
        }

        round_pattern::<P, _>(significand, cut, rng) >> cut
    }

    fn round_single<R: Rng + ?Sized>(value: f32, rng: &mut R) -> (Self, bool) {
        let sign = (value.is_sign_set() as u16) << 15;

        if value.is_nan() {
            return (Self::from_bits(sign | QUIET_NAN), false);
        }

        let magnitude = Self::round_magnitude(value, rng);
        if magnitude >= INFINITY_BITS {
            tracing::trace!(value, policy = P::NAME, "half encode saturated");
            return (Self::from_bits(sign | Self::MAX.bits), true);
        }

        (Self::from_bits(sign | magnitude as u16), false)
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
            (half, false) => Ok(half),
        }
    }

    pub fn try_encode(value: f32) -> Result<Self> {
        with_thread_context(|rng| Self::try_encode_with(value, rng))
    }

    pub fn decode(self) -> f32 {
        f16::from_bits(self.bits).to_f32()
    }

    pub fn to_f64(self) -> f64 {
        self.decode() as f64
    }
}

arithmetic_impl!(Half<P>, f32, [P: RoundingPolicy]);

#[cfg(test)]
mod test {
    use super::*;
    use crate::{HalfRN, HalfSR};
    use assert_float_eq::*;
    use pcg_rand::Pcg64;
    use rand::SeedableRng;

    #[test]
    fn storage_size() {
        assert_eq!(std::mem::size_of::<HalfRN>(), 2);
        assert_eq!(std::mem::size_of::<HalfSR>(), 2);
        assert_eq!(HalfSR::FORMAT.storage_bytes(), 2);
    }

    #[test]
    fn representable_values_are_exact() {
        let mut rng = Pcg64::seed_from_u64(0x1234);
        let smallest = 2f32.powi(-24);
        for v in [0.0f32, 1.0, -1.0, 0.5, 0.25, 65504.0, -2.5, smallest, 3.0 * smallest] {
            for _ in 0..1000 {
                assert_eq!(HalfSR::encode_with(v, &mut rng).decode(), v);
            }
            assert_eq!(HalfRN::encode(v).decode(), v);
        }

        for _ in 0..1000 {
            assert_eq!(HalfSR::from(1i32), 1.0);
        }
    }

    #[test]
    fn nearest_matches_half_crate_away_from_ties() {
        let mut rng = Pcg64::seed_from_u64(0x1235);
        for _ in 0..10_000 {
            let v: f32 = rng.gen_range(-60000.0..60000.0) * 2f32.powi(rng.gen_range(-20..0));

            // normal range only; ties differ by design (away from zero vs. to even)
            if v.abs() < f16::MIN_POSITIVE.to_f32() || v.to_bits() & 0x1fff == 0x1000 {
                continue;
            }

            assert_eq!(
                HalfRN::encode(v).to_bits(),
                f16::from_f32(v).to_bits(),
                "value {}",
                v
            );
        }
    }

    #[test]
    fn subnormal_range_rounds_on_smallest_unit() {
        let unit = 2f32.powi(-24);
        assert_eq!(HalfRN::encode(1.4 * unit).to_bits(), 1);
        assert_eq!(HalfRN::encode(1.6 * unit).to_bits(), 2);
        assert_eq!(HalfRN::encode(-0.6 * unit).to_bits(), 0x8001);
        assert_eq!(HalfRN::encode(0.4 * unit).to_bits(), 0);
        assert_eq!(HalfRN::encode(1e-30).to_bits(), 0);

        // below 2^-64 the cut exceeds the splitter width: signed zero
        for _ in 0..1000 {
            assert_eq!(HalfSR::encode(2f32.powi(-65)).to_bits(), 0);
            assert_eq!(HalfSR::encode(-(2f32.powi(-65))).to_bits(), 0x8000);
        }

        // carry out of the subnormal mantissa lands on the smallest normal
        let below_normal = 2f32.powi(-14) - 0.25 * unit;
        assert_eq!(HalfRN::encode(below_normal).to_bits(), 0x0400);
    }

    #[test]
    fn stochastic_is_unbiased_in_subnormal_range() {
        let mut rng = Pcg64::seed_from_u64(0x1236);
        let unit = 2f32.powi(-24);
        let value = 0.3 * unit;
        let trials = 1_000_000;

        let ups = (0..trials)
            .filter(|_| HalfSR::encode_with(value, &mut rng).to_bits() == 1)
            .count();
        assert_float_absolute_eq!(ups as f64 / trials as f64, 0.3, 0.005);
    }

    #[test]
    fn stochastic_rounds_both_ways() {
        let mut rng = Pcg64::seed_from_u64(0x1237);
        let expected = 1.0f64 / 3.0;
        let (mut up, mut down) = (0, 0);
        for _ in 0..10_000 {
            if expected > HalfSR::encode_with(expected as f32, &mut rng) {
                down += 1;
            } else {
                up += 1;
            }
        }
        assert!(up > 0 && down > 0);
    }

    #[test]
    fn stochastic_probability_matches_residual() {
        let mut rng = Pcg64::seed_from_u64(0x123a);
        let trials = 10_000_000u64;
        let value = 1.0f32 / 3.0;

        let residual = value.to_bits() & 0x1fff;
        let analytic = residual as f64 / 8192.0;
        let truncated = f32::from_bits(value.to_bits() & !0x1fff);

        let ups = (0..trials)
            .filter(|_| HalfSR::encode_with(value, &mut rng).decode() != truncated)
            .count();

        assert_float_absolute_eq!(ups as f64 / trials as f64, analytic, 0.001);
    }

    #[test]
    fn ordering_is_trichotomous() {
        let mut rng = Pcg64::seed_from_u64(0x123b);
        for _ in 0..10_000 {
            let a = HalfSR::encode_with(rng.gen_range(-4.0..4.0), &mut rng);
            let b = HalfSR::encode_with(rng.gen_range(-4.0..4.0), &mut rng);

            assert_eq!([a < b, a == b, a > b].iter().filter(|&&r| r).count(), 1);
            assert_eq!(a < b, a.decode() < b.decode());
            assert_eq!(a == b, a.decode() == b.decode());
        }

        let a = HalfSR::encode(0.5);
        let b = HalfSR::encode(0.5);
        assert!(a == b && !(a < b) && !(a > b));
    }

    #[test]
    fn saturates() {
        let mut rng = Pcg64::seed_from_u64(0x1238);
        assert_eq!(HalfRN::encode(1e6).decode(), 65504.0);
        assert_eq!(HalfRN::encode(-1e6).decode(), -65504.0);
        assert_eq!(HalfRN::encode(65535.0).decode(), 65504.0);
        assert_eq!(HalfRN::encode(f32::NEG_INFINITY), HalfRN::MIN);
        for _ in 0..1000 {
            assert_eq!(HalfSR::encode_with(65520.0, &mut rng).decode(), 65504.0);
        }

        assert!(HalfRN::try_encode(1e6).is_err());
        assert!(HalfRN::try_encode(65504.0).is_ok());
        assert!(HalfRN::encode(f32::NAN).decode().is_nan());
    }

    #[test]
    fn nearest_is_idempotent() {
        let mut rng = Pcg64::seed_from_u64(0x1239);
        for _ in 0..10_000 {
            let once = HalfRN::encode(rng.gen_range(-70000.0..70000.0));
            assert_eq!(HalfRN::encode(once.decode()).to_bits(), once.to_bits());
        }
    }
}
