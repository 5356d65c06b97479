/// Largest cut width the splitter supports; one unit in the last kept place
/// must still fit into a `u64`.
pub const MAX_CUT: u32 = 63;

/// A bit pattern split at a cut position into the kept prefix (low bits
/// cleared) and the discarded residual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Split {
    pub prefix: u64,
    pub residual: u64,
    pub cut: u32,
}

/// Mask covering the `cut` low bits.
pub const fn mask(cut: u32) -> u64 {
    if cut == 0 {
        0
    } else {
        u64::MAX >> (64 - cut)
    }
}

impl Split {
    /// Splits `pattern` by discarding its `cut` lowest bits.
    pub fn new(pattern: u64, cut: u32) -> Self {
        debug_assert!(cut <= MAX_CUT);
        let mask = mask(cut);
        Self {
            prefix: pattern & !mask,
            residual: pattern & mask,
            cut,
        }
    }

    /// One unit in the last kept place.
    pub fn ulp(&self) -> u64 {
        1 << self.cut
    }

    /// Residual of a value exactly halfway between two kept patterns.
    pub fn midpoint(&self) -> u64 {
        self.ulp() >> 1
    }

    pub fn is_exact(&self) -> bool {
        self.residual == 0
    }

    /// Kept prefix incremented by one ulp. Carries ripple into whatever fields
    /// sit above the cut, so callers interpret the result as a whole pattern.
    pub fn rounded_up(&self) -> u64 {
        self.prefix.wrapping_add(self.ulp())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pcg_rand::Pcg64;
    use rand::{Rng, SeedableRng};

    #[test]
    fn zero_cut_is_identity() {
        let split = Split::new(0xdead_beef, 0);
        assert_eq!(split.prefix, 0xdead_beef);
        assert_eq!(split.residual, 0);
        assert!(split.is_exact());
    }

    #[test]
    fn mask_widths() {
        assert_eq!(mask(0), 0);
        assert_eq!(mask(1), 1);
        assert_eq!(mask(13), 0x1fff);
        assert_eq!(mask(16), 0xffff);
        assert_eq!(mask(29), 0x1fff_ffff);
        assert_eq!(mask(63), u64::MAX >> 1);
    }

    #[test]
    fn prefix_and_residual_partition_pattern() {
        let mut rng = Pcg64::seed_from_u64(0x1234);
        for _ in 0..1000 {
            let pattern: u64 = rng.gen();
            let cut = rng.gen_range(0..=MAX_CUT);
            let split = Split::new(pattern, cut);

            assert_eq!(split.prefix | split.residual, pattern);
            assert_eq!(split.prefix & split.residual, 0);
            assert!(split.residual < split.ulp());
            assert_eq!(split.prefix & mask(cut), 0);
        }
    }

    #[test]
    fn round_up_carries_into_upper_fields() {
        // all kept mantissa bits set; the increment must move into the exponent
        let split = Split::new(0x3fff_ffff, 16);
        assert_eq!(split.prefix, 0x3fff_0000);
        assert_eq!(split.rounded_up(), 0x4000_0000);
    }

    #[test]
    fn midpoint_is_half_ulp() {
        let split = Split::new(0, 13);
        assert_eq!(split.midpoint(), 0x1000);
        assert_eq!(split.midpoint() * 2, split.ulp());
    }
}
