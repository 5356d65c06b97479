//! Rounding policies.
//!
//! A policy only decides *whether* the kept prefix is incremented; the formats
//! own the layout. Both policies work on magnitudes: "round up" means one
//! unit further away from zero.

use crate::residual::{mask, Split};
use rand::Rng;
use std::fmt::Debug;
use std::hash::Hash;

pub trait RoundingPolicy:
    Copy + Clone + Debug + Default + PartialEq + Eq + Hash + Send + Sync + 'static
{
    const NAME: &'static str;

    /// Decision for a bit pattern split at its cut position.
    fn round_up_bits<R: Rng + ?Sized>(split: &Split, rng: &mut R) -> bool;

    /// Decision for the magnitude of a fractional remainder in `[0, 1)`.
    fn round_up_fraction<R: Rng + ?Sized>(fraction: f64, rng: &mut R) -> bool;
}

/// Round to nearest, ties away from zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nearest;

/// Unbiased stochastic rounding: rounds up with probability equal to the
/// discarded fraction of one ulp.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stochastic;

impl RoundingPolicy for Nearest {
    const NAME: &'static str = "nearest";

    fn round_up_bits<R: Rng + ?Sized>(split: &Split, _rng: &mut R) -> bool {
        !split.is_exact() && split.residual >= split.midpoint()
    }

    fn round_up_fraction<R: Rng + ?Sized>(fraction: f64, _rng: &mut R) -> bool {
        fraction >= 0.5
    }
}

impl RoundingPolicy for Stochastic {
    const NAME: &'static str = "stochastic";

    fn round_up_bits<R: Rng + ?Sized>(split: &Split, rng: &mut R) -> bool {
        if split.is_exact() {
            return false;
        }

        // p ~ U[0, 2^cut); masking a full draw is exactly uniform for powers of two
        let p = rng.gen::<u64>() & mask(split.cut);
        p < split.residual
    }

    fn round_up_fraction<R: Rng + ?Sized>(fraction: f64, rng: &mut R) -> bool {
        fraction > 0.0 && rng.gen::<f64>() < fraction
    }
}

/// Rounds `pattern` by discarding its `cut` low bits under policy `P`.
/// The result still has the low bits cleared; shift by `cut` to store it.
pub fn round_pattern<P: RoundingPolicy, R: Rng + ?Sized>(pattern: u64, cut: u32, rng: &mut R) -> u64 {
    let split = Split::new(pattern, cut);
    if P::round_up_bits(&split, rng) {
        split.rounded_up()
    } else {
        split.prefix
    }
}
