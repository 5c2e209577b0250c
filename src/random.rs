//! Random draws for problem generation.
//!
//! The engine only ever sees `&mut dyn RandomSource`, so callers decide where
//! randomness comes from:
//!   - `SystemRandom`: a ChaCha-based `StdRng` seeded from the OS CSPRNG. If the OS
//!     source fails we log a warning and seed from the wall clock instead.
//!   - `SeededRandom`: deterministic ChaCha8 stream for reproducible worksheets and tests.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::warn;

use crate::domain::{Expression, Operation, Settings};
use crate::validation::MAX_OPERANDS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RandomError {
    #[error("cannot draw from empty range [{min}, {max}]")]
    EmptyRange { min: i64, max: i64 },
    #[error("random source unavailable: {0}")]
    Unavailable(String),
}

/// Uniform integer draws over a closed range.
pub trait RandomSource {
    fn random_int(&mut self, min: i64, max: i64) -> Result<i64, RandomError>;
}

fn draw<R: Rng>(rng: &mut R, min: i64, max: i64) -> Result<i64, RandomError> {
    if min > max {
        return Err(RandomError::EmptyRange { min, max });
    }
    Ok(rng.gen_range(min..=max))
}

pub struct SystemRandom {
    rng: StdRng,
}

impl SystemRandom {
    pub fn new() -> Self {
        match StdRng::from_rng(OsRng) {
            Ok(rng) => Self { rng },
            Err(e) => {
                warn!(target: "generation", error = %e, "OS entropy unavailable; seeding from clock");
                Self { rng: StdRng::seed_from_u64(clock_seed()) }
            }
        }
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn random_int(&mut self, min: i64, max: i64) -> Result<i64, RandomError> {
        draw(&mut self.rng, min, max)
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
        ^ u64::from(std::process::id())
}

pub struct SeededRandom(ChaCha8Rng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn random_int(&mut self, min: i64, max: i64) -> Result<i64, RandomError> {
        draw(&mut self.0, min, max)
    }
}

/// Draw `num_operands` operands from `settings.num_range` and the operators
/// between them from `settings.operations`.
///
/// `Ok(None)` means no structurally valid expression could be drawn
/// (no operands or more than `MAX_OPERANDS` requested, no operations enabled,
/// or an out-of-range index from the source).
pub fn build_expression(
    num_operands: usize,
    settings: &Settings,
    rng: &mut dyn RandomSource,
) -> Result<Option<Expression>, RandomError> {
    let too_long = i64::try_from(num_operands).map_or(true, |n| n > MAX_OPERANDS);
    if num_operands == 0 || too_long || settings.operations.is_empty() {
        return Ok(None);
    }
    let ops: Vec<Operation> = settings.operations.iter().copied().collect();

    let mut operands = Vec::with_capacity(num_operands);
    for _ in 0..num_operands {
        operands.push(rng.random_int(settings.num_range.min(), settings.num_range.max())?);
    }

    let mut operators = Vec::with_capacity(num_operands - 1);
    for _ in 1..num_operands {
        let idx = rng.random_int(0, ops.len() as i64 - 1)?;
        let Some(op) = usize::try_from(idx).ok().and_then(|i| ops.get(i)) else {
            return Ok(None);
        };
        operators.push(*op);
    }

    Ok(Some(Expression { operands, operators }))
}
