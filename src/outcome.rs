//! Turns "how many did we get vs. how many were asked for" into translation-keyed feedback.

use serde::Serialize;

use crate::domain::Problem;
use crate::messages::{Message, MessageKey};
use crate::validation::LARGE_TARGET;

/// Feedback slots for one generation call.
/// The count comparison fills at most one of them; the large-batch notice
/// only takes the warning slot when neither error nor warning is set.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub error: Option<Message>,
    pub warning: Option<Message>,
    pub success: Option<Message>,
}

impl GenerationOutcome {
    pub fn failed(announce: bool) -> Self {
        Self {
            error: announce.then(|| Message::new(MessageKey::GenerationFailed)),
            ..Self::default()
        }
    }
}

pub fn classify(generated: &[Problem], target: i64, announce: bool) -> GenerationOutcome {
    let mut outcome = GenerationOutcome::default();
    if !announce {
        return outcome;
    }

    let count = generated.len() as i64;
    if count == 0 {
        outcome.error = Some(Message::new(MessageKey::NoProblemsGenerated));
    } else if count < target {
        outcome.warning = Some(
            Message::new(MessageKey::PartialGeneration)
                .with_param("generated", count)
                .with_param("requested", target),
        );
    } else {
        debug_assert!(count == target, "batch of {count} exceeds its target of {target}");
        outcome.success = Some(Message::new(MessageKey::ProblemsGenerated).with_param("count", count));
    }

    if target > LARGE_TARGET && outcome.error.is_none() && outcome.warning.is_none() {
        outcome.warning = Some(Message::new(MessageKey::LargeNumberOfProblems).with_param("count", target));
    }
    outcome
}
