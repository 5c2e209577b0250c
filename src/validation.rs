//! Settings validation gate, field sensitivity and the restrictive-settings heuristic.
//!
//! Everything here is a pure function of its input.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{Settings, SettingsField};
use crate::messages::{Message, MessageKey};

/// Flat-mode problem count ceiling.
pub const MAX_FLAT_PROBLEMS: i64 = 100;

/// Grouped-mode ceiling on `problemsPerGroup × totalGroups`.
pub const MAX_GROUPED_PROBLEMS: i64 = 1_000;

/// Longest operand chain a worksheet may ask for.
pub const MAX_OPERANDS: i64 = 10;

/// Targets above this size are flagged (large batch / restrictive settings).
pub const LARGE_TARGET: i64 = 50;

const RESTRICTIVE_RESULT_SPAN: i64 = 10;
const RESTRICTIVE_NUM_SPAN: i64 = 5;

/// First failing validation rule. Serialized as its bare code, e.g. `"noOperations"`.
#[derive(Clone, Copy, Debug, Error, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SettingsError {
    #[error("at least one operation must be selected")]
    NoOperations,
    #[error("problem count must be between 1 and 100, or at most 1000 when grouped")]
    InvalidProblemCount,
    #[error("number range minimum exceeds maximum")]
    InvalidNumberRange,
    #[error("result range minimum exceeds maximum")]
    InvalidResultRange,
    #[error("operand count range must be ordered and lie within 2..=10")]
    InvalidOperandsRange,
}

impl SettingsError {
    pub fn message_key(self) -> MessageKey {
        match self {
            SettingsError::NoOperations => MessageKey::NoOperations,
            SettingsError::InvalidProblemCount => MessageKey::InvalidProblemCount,
            SettingsError::InvalidNumberRange => MessageKey::InvalidNumberRange,
            SettingsError::InvalidResultRange => MessageKey::InvalidResultRange,
            SettingsError::InvalidOperandsRange => MessageKey::InvalidOperandsRange,
        }
    }

    pub fn to_message(self) -> Message {
        Message::new(self.message_key())
    }
}

/// Check `settings` rule by rule and report the first failure.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if settings.operations.is_empty() {
        return Err(SettingsError::NoOperations);
    }
    let target = settings.target_count();
    let count_ok = if settings.enable_grouping {
        target <= MAX_GROUPED_PROBLEMS
    } else {
        target > 0 && target <= MAX_FLAT_PROBLEMS
    };
    if !count_ok {
        return Err(SettingsError::InvalidProblemCount);
    }
    if settings.num_range.min() > settings.num_range.max() {
        return Err(SettingsError::InvalidNumberRange);
    }
    if settings.result_range.min() > settings.result_range.max() {
        return Err(SettingsError::InvalidResultRange);
    }
    let operands = settings.num_operands_range;
    if operands.min() > operands.max() || operands.min() < 2 || operands.max() > MAX_OPERANDS {
        return Err(SettingsError::InvalidOperandsRange);
    }
    Ok(())
}

/// Whether an edit to the field named `field` should re-run validation.
/// Unknown names (display-only fields such as font size) are never sensitive.
pub fn is_validation_sensitive_field(field: &str) -> bool {
    field
        .parse::<SettingsField>()
        .map(SettingsField::is_validation_sensitive)
        .unwrap_or(false)
}

/// Early warning that the sampler is likely to starve: narrow ranges with a large target.
pub fn is_restrictive(settings: &Settings) -> bool {
    let narrow = settings.result_range.span() < RESTRICTIVE_RESULT_SPAN
        || settings.num_range.span() < RESTRICTIVE_NUM_SPAN;
    narrow && settings.target_count() > LARGE_TARGET
}

/// Soft feedback shown while the user edits settings.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct SettingsFeedback {
    pub error: Option<Message>,
    pub warning: Option<Message>,
}

pub fn settings_feedback(settings: &Settings) -> SettingsFeedback {
    let error = validate_settings(settings).err().map(SettingsError::to_message);
    let warning = is_restrictive(settings).then(|| {
        Message::new(MessageKey::RestrictiveSettings).with_param("count", settings.target_count())
    });
    debug!(target: "settings", error = ?error.as_ref().map(|m| m.key.as_str()), restrictive = warning.is_some(), "Settings feedback computed");
    SettingsFeedback { error, warning }
}
