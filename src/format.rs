use std::fmt;

/// How a storage pattern maps to a real number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// `value = raw / 2^fraction_bits`
    FixedPoint { fraction_bits: u32 },
    /// Sign, exponent and mantissa; `cut` low bits of the `source_bits` wide
    /// reference pattern are discarded on encode.
    Floating {
        exponent_bits: u32,
        mantissa_bits: u32,
        source_bits: u32,
        cut: u32,
    },
}

/// Immutable description of a representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Format {
    pub storage_bits: u32,
    pub kept_bits: u32,
    pub layout: Layout,
}

impl Format {
    pub const fn fixed_point(storage_bits: u32, fraction_bits: u32) -> Self {
        Self {
            storage_bits,
            kept_bits: storage_bits,
            layout: Layout::FixedPoint { fraction_bits },
        }
    }

    pub const fn floating(exponent_bits: u32, mantissa_bits: u32, source_bits: u32, cut: u32) -> Self {
        Self {
            storage_bits: 1 + exponent_bits + mantissa_bits,
            kept_bits: source_bits - cut,
            layout: Layout::Floating {
                exponent_bits,
                mantissa_bits,
                source_bits,
                cut,
            },
        }
    }

    pub const fn storage_bytes(&self) -> usize {
        (self.storage_bits as usize + 7) / 8
    }

    pub const fn is_floating(&self) -> bool {
        matches!(self.layout, Layout::Floating { .. })
    }

    /// Bits discarded from the reference pattern; `None` for fixed point,
    /// which rounds the scaled fraction instead.
    pub const fn cut(&self) -> Option<u32> {
        match self.layout {
            Layout::Floating { cut, .. } => Some(cut),
            Layout::FixedPoint { .. } => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.layout {
            Layout::FixedPoint { fraction_bits } => write!(
                f,
                "fixed<{}.{}>",
                self.storage_bits - fraction_bits - 1,
                fraction_bits
            ),
            Layout::Floating {
                exponent_bits,
                mantissa_bits,
                ..
            } => write!(f, "float<e{}m{}>", exponent_bits, mantissa_bits),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Format::fixed_point(16, 8).to_string(), "fixed<7.8>");
        assert_eq!(Format::fixed_point(32, 16).to_string(), "fixed<15.16>");
        assert_eq!(Format::floating(8, 7, 32, 16).to_string(), "float<e8m7>");
    }

    #[test]
    fn widths() {
        let bf16 = Format::floating(8, 7, 32, 16);
        assert_eq!(bf16.storage_bits, 16);
        assert_eq!(bf16.kept_bits, 16);
        assert_eq!(bf16.storage_bytes(), 2);
        assert_eq!(bf16.cut(), Some(16));
        assert!(bf16.is_floating());

        let fixed = Format::fixed_point(32, 16);
        assert_eq!(fixed.storage_bytes(), 4);
        assert_eq!(fixed.cut(), None);
        assert!(!fixed.is_floating());
    }
}
