//! Strict left-to-right evaluation of a drawn expression (no precedence).

use crate::domain::Operation;

/// Fold `operands` left-to-right through `operators`.
///
/// Returns `None` when a division has a zero divisor or leaves a remainder,
/// when an intermediate value overflows `i64`, or when the operator count is
/// not exactly one less than the operand count.
pub fn evaluate(operands: &[i64], operators: &[Operation]) -> Option<i64> {
    let (first, rest) = operands.split_first()?;
    if rest.len() != operators.len() {
        return None;
    }
    rest
        .iter()
        .zip(operators)
        .try_fold(*first, |acc, (&rhs, &op)| apply(acc, op, rhs))
}

/// Like [`evaluate`], with operators given as raw symbols; any unrecognized symbol yields `None`.
pub fn evaluate_symbols<S: AsRef<str>>(operands: &[i64], operators: &[S]) -> Option<i64> {
    let ops = operators
        .iter()
        .map(|s| Operation::from_symbol(s.as_ref()))
        .collect::<Option<Vec<_>>>()?;
    evaluate(operands, &ops)
}

fn apply(lhs: i64, op: Operation, rhs: i64) -> Option<i64> {
    match op {
        Operation::Add => lhs.checked_add(rhs),
        Operation::Sub => lhs.checked_sub(rhs),
        Operation::Mul => lhs.checked_mul(rhs),
        // checked_rem is None for a zero divisor and for MIN / -1
        Operation::Div => match lhs.checked_rem(rhs) {
            Some(0) => lhs.checked_div(rhs),
            _ => None,
        },
    }
}
