//! Random source for stochastic rounding.
//!
//! Formats take any `Rng` through `encode_with`. Operators and `From` impls
//! have no place to pass one, so they draw from a context owned by the
//! current thread; threads never share generator state.

use pcg_rand::Pcg64;
use rand::{Error, RngCore, SeedableRng};
use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Environment variable holding a base seed for per-thread contexts.
pub const SEED_ENV_VAR: &str = "REDUCED_PRECISION_SEED";

const THREAD_SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

static THREAD_ORDINAL: AtomicU64 = AtomicU64::new(0);

pub struct RoundingContext {
    rng: Pcg64,
}

impl RoundingContext {
    pub fn from_entropy() -> Self {
        Self {
            rng: Pcg64::from_entropy(),
        }
    }

    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    fn for_new_thread() -> Self {
        let ordinal = THREAD_ORDINAL.fetch_add(1, Ordering::Relaxed);

        match std::env::var(SEED_ENV_VAR) {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(base) => {
                    let seed = base.wrapping_add(ordinal.wrapping_mul(THREAD_SEED_STRIDE));
                    tracing::debug!(base, ordinal, "seeding rounding context from environment");
                    Self::seed_from_u64(seed)
                }
                Err(err) => {
                    tracing::warn!(value = %raw, %err, "ignoring unparsable {}", SEED_ENV_VAR);
                    Self::from_entropy()
                }
            },
            Err(_) => {
                tracing::debug!(ordinal, "seeding rounding context from entropy");
                Self::from_entropy()
            }
        }
    }
}

impl fmt::Debug for RoundingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundingContext").finish_non_exhaustive()
    }
}

impl RngCore for RoundingContext {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.rng.try_fill_bytes(dest)
    }
}

thread_local! {
    static THREAD_CONTEXT: RefCell<RoundingContext> = RefCell::new(RoundingContext::for_new_thread());
}

/// Runs `f` with the calling thread's rounding context.
///
/// `f` must not re-enter this function.
pub fn with_thread_context<T>(f: impl FnOnce(&mut RoundingContext) -> T) -> T {
    THREAD_CONTEXT.with(|ctx| f(&mut ctx.borrow_mut()))
}

/// Replaces the calling thread's context with one seeded from `seed`.
pub fn reseed_thread_context(seed: u64) {
    THREAD_CONTEXT.with(|ctx| *ctx.borrow_mut() = RoundingContext::seed_from_u64(seed));
}
