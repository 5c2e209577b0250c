//! Problem generation by bounded rejection sampling.
//!
//! Flow per problem:
//! 1) Draw the operand count.
//! 2) Give up early when the configuration provably cannot succeed
//!    (fewer than two or more than `MAX_OPERANDS` operands, or addition-only sums
//!    that can never land in the result range).
//! 3) Draw expressions until one evaluates into the result range with an allowed sign,
//!    or `MAX_ATTEMPTS` is spent.
//!
//! Running out of attempts is a normal outcome for tight settings, not an error.
//! Only faults of the random source surface as `Err`.

use tracing::{debug, instrument};

use crate::domain::{Expression, IntRange, Problem, Settings};
use crate::eval::evaluate;
use crate::random::{build_expression, RandomError, RandomSource};
use crate::validation::MAX_OPERANDS;

/// Sampling budget for a single problem.
pub const MAX_ATTEMPTS: u32 = 10_000;

/// Counters collected while sampling; logged per batch and asserted on in tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub attempts: u64,
    pub short_circuits: u64,
    pub exhausted: u64,
    pub rejected_invalid: u64,
    pub rejected_out_of_range: u64,
    pub rejected_negative: u64,
}

/// Generate one problem text, or `Ok(None)` if none was found within budget.
pub fn generate_one(
    settings: &Settings,
    rng: &mut dyn RandomSource,
    stats: &mut GenerationStats,
) -> Result<Option<String>, RandomError> {
    let range = settings.num_operands_range;
    let num_operands = rng.random_int(range.min(), range.max())?;

    if !(2..=MAX_OPERANDS).contains(&num_operands) || !addition_feasible(settings, num_operands) {
        stats.short_circuits += 1;
        return Ok(None);
    }
    let num_operands = num_operands as usize;

    for _ in 0..MAX_ATTEMPTS {
        stats.attempts += 1;

        let Some(expr) = build_expression(num_operands, settings, rng)? else {
            stats.rejected_invalid += 1;
            continue;
        };
        let Some(result) = evaluate(&expr.operands, &expr.operators) else {
            stats.rejected_invalid += 1;
            continue;
        };
        if !settings.result_range.contains(result) {
            stats.rejected_out_of_range += 1;
            continue;
        }
        if !settings.allow_negative && result < 0 {
            stats.rejected_negative += 1;
            continue;
        }
        return Ok(Some(format_problem(&expr, result, settings.show_answers)));
    }

    stats.exhausted += 1;
    Ok(None)
}

/// For addition-only settings the reachable results are exactly
/// `[min * n, max * n]`; anything else is left to the sampler.
fn addition_feasible(settings: &Settings, num_operands: i64) -> bool {
    if !settings.addition_only() {
        return true;
    }
    let sums = IntRange(
        settings.num_range.min().saturating_mul(num_operands),
        settings.num_range.max().saturating_mul(num_operands),
    );
    sums.intersects(settings.result_range)
}

fn format_problem(expr: &Expression, result: i64, show_answer: bool) -> String {
    if show_answer {
        format!("{} = {}", expr.display_text(), result)
    } else {
        format!("{} = ", expr.display_text())
    }
}

/// A filtered batch with its requested size.
#[derive(Clone, Debug)]
pub struct Batch {
    pub problems: Vec<Problem>,
    pub target: i64,
    pub stats: GenerationStats,
}

/// Run the single-problem generator once per requested problem and keep the successes.
/// Ids follow post-filter order and are only meaningful within this batch.
#[instrument(level = "debug", skip_all, fields(target = settings.target_count()))]
pub fn generate_batch(settings: &Settings, rng: &mut dyn RandomSource) -> Result<Batch, RandomError> {
    let target = settings.target_count();
    let mut stats = GenerationStats::default();
    let mut texts = Vec::new();

    for _ in 0..target.max(0) {
        if let Some(text) = generate_one(settings, rng, &mut stats)? {
            texts.push(text);
        }
    }

    let problems: Vec<Problem> = texts
        .into_iter()
        .enumerate()
        .map(|(id, text)| Problem { id, text })
        .collect();

    debug!(
        target: "generation",
        target,
        generated = problems.len(),
        attempts = stats.attempts,
        short_circuits = stats.short_circuits,
        exhausted = stats.exhausted,
        rejected_invalid = stats.rejected_invalid,
        rejected_out_of_range = stats.rejected_out_of_range,
        rejected_negative = stats.rejected_negative,
        "Batch sampled"
    );

    Ok(Batch { problems, target, stats })
}
