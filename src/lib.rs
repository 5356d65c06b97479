//! Reduced-precision number formats with selectable rounding.
//!
//! Every format computes by promoting its operands to a wider reference
//! float and rounding the result back with either round-to-nearest
//! ([`Nearest`]) or unbiased stochastic rounding ([`Stochastic`]).

mod arith;
pub mod bfloat16;
pub mod binary16;
pub mod context;
pub mod error;
pub mod fixed;
pub mod float32;
pub mod format;
pub mod integrator;
pub mod numeric;
pub mod residual;
pub mod rounding;
pub mod scalar;

pub use crate::bfloat16::BFloat16;
pub use crate::binary16::Half;
pub use crate::context::{reseed_thread_context, with_thread_context, RoundingContext};
pub use crate::error::{Error, Result};
pub use crate::fixed::{Fixed, FixedStorage};
pub use crate::float32::Float32;
pub use crate::format::{Format, Layout};
pub use crate::integrator::{Equation, Integrator, Method};
pub use crate::rounding::{Nearest, RoundingPolicy, Stochastic};
pub use crate::scalar::Scalar;

/// Fixed point with 7 integer and 8 fraction bits.
pub type Fixed16 = Fixed<i16, 8, Nearest>;
pub type Fixed16SR = Fixed<i16, 8, Stochastic>;
/// Fixed point with 15 integer and 16 fraction bits.
pub type Fixed32 = Fixed<i32, 16, Nearest>;
pub type Fixed32SR = Fixed<i32, 16, Stochastic>;
pub type FixedSR<T, const FRAC: u32> = Fixed<T, FRAC, Stochastic>;

pub type Float32RN = Float32<Nearest>;
pub type Float32SR = Float32<Stochastic>;
pub type BFloat16RN = BFloat16<Nearest>;
pub type BFloat16SR = BFloat16<Stochastic>;
pub type HalfRN = Half<Nearest>;
pub type HalfSR = Half<Stochastic>;
