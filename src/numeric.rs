//! Explicit bit casts between native floats and their IEEE-754 patterns.
//!
//! Every reinterpretation in this crate goes through `to_bits`/`from_bits`, so
//! the patterns are independent of the platform's byte order.

pub trait FloatParts: Copy {
    const BITS_MANTISSA: u32;
    const BITS_EXPONENT: u32;
    const EXPONENT_BIAS: i32;

    /// Raw pattern widened to 64 bits.
    fn to_pattern(self) -> u64;

    /// Inverse of [`FloatParts::to_pattern`]; high bits beyond the width are ignored.
    fn from_pattern(pattern: u64) -> Self;

    fn mantissa(self) -> u64 {
        self.to_pattern() & ((1 << Self::BITS_MANTISSA) - 1)
    }

    fn biased_exponent(self) -> u32 {
        ((self.to_pattern() >> Self::BITS_MANTISSA) & ((1 << Self::BITS_EXPONENT) - 1)) as u32
    }

    fn is_sign_set(self) -> bool {
        (self.to_pattern() >> (Self::BITS_EXPONENT + Self::BITS_MANTISSA)) & 1 == 1
    }
}

macro_rules! float_parts_impl {
    ($t : ty, $bits : ty, $mantissa : expr, $exponent : expr, $test_name : ident) => {
        impl FloatParts for $t {
            const BITS_MANTISSA: u32 = $mantissa;
            const BITS_EXPONENT: u32 = $exponent;
            const EXPONENT_BIAS: i32 = (1 << ($exponent - 1)) - 1;

            fn to_pattern(self) -> u64 {
                self.to_bits() as u64
            }

            fn from_pattern(pattern: u64) -> Self {
                <$t>::from_bits(pattern as $bits)
            }
        }

        #[cfg(test)]
        mod $test_name {
            use super::FloatParts;
            use pcg_rand::Pcg64;
            use rand::{Rng, SeedableRng};

            #[test]
            fn parts_partition_pattern() {
                let mut rng = Pcg64::seed_from_u64(0x1234);
                for _ in 0..1000 {
                    let num = <$t>::from_bits(rng.gen::<$bits>());
                    if num.is_nan() {
                        continue;
                    }

                    let sign_shift = <$t>::BITS_EXPONENT + <$t>::BITS_MANTISSA;
                    let back = num.mantissa()
                        | ((num.biased_exponent() as u64) << <$t>::BITS_MANTISSA)
                        | ((num.is_sign_set() as u64) << sign_shift);
                    assert_eq!(back, num.to_pattern());
                    assert_eq!(<$t>::from_pattern(back).to_bits(), num.to_bits());
                }
            }

            #[test]
            fn one_has_bias_exponent() {
                let one: $t = 1.0;
                assert_eq!(one.biased_exponent() as i32, <$t>::EXPONENT_BIAS);
                assert_eq!(one.mantissa(), 0);
                assert!(!one.is_sign_set());
                assert!((-one).is_sign_set());
            }

            #[test]
            fn infinity_has_full_exponent() {
                assert_eq!(
                    <$t>::INFINITY.biased_exponent(),
                    (1 << <$t>::BITS_EXPONENT) - 1
                );
                assert_eq!(<$t>::INFINITY.mantissa(), 0);
            }
        }
    };
}

float_parts_impl!(f32, u32, 23, 8, test_f32);
float_parts_impl!(f64, u64, 52, 11, test_f64);
