//! Translation-keyed messages. The backend never produces user-facing prose for
//! generation feedback; the frontend renders `key` with `params` in the user's locale.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
pub enum MessageKey {
    #[serde(rename = "errors.noOperations")]
    NoOperations,
    #[serde(rename = "errors.invalidProblemCount")]
    InvalidProblemCount,
    #[serde(rename = "errors.invalidNumberRange")]
    InvalidNumberRange,
    #[serde(rename = "errors.invalidResultRange")]
    InvalidResultRange,
    #[serde(rename = "errors.invalidOperandsRange")]
    InvalidOperandsRange,
    #[serde(rename = "errors.noProblemsGenerated")]
    NoProblemsGenerated,
    #[serde(rename = "errors.partialGeneration")]
    PartialGeneration,
    #[serde(rename = "errors.generationFailed")]
    GenerationFailed,
    #[serde(rename = "warnings.largeNumberOfProblems")]
    LargeNumberOfProblems,
    #[serde(rename = "warnings.restrictiveSettings")]
    RestrictiveSettings,
    #[serde(rename = "messages.success.problemsGenerated")]
    ProblemsGenerated,
}

impl MessageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKey::NoOperations => "errors.noOperations",
            MessageKey::InvalidProblemCount => "errors.invalidProblemCount",
            MessageKey::InvalidNumberRange => "errors.invalidNumberRange",
            MessageKey::InvalidResultRange => "errors.invalidResultRange",
            MessageKey::InvalidOperandsRange => "errors.invalidOperandsRange",
            MessageKey::NoProblemsGenerated => "errors.noProblemsGenerated",
            MessageKey::PartialGeneration => "errors.partialGeneration",
            MessageKey::GenerationFailed => "errors.generationFailed",
            MessageKey::LargeNumberOfProblems => "warnings.largeNumberOfProblems",
            MessageKey::RestrictiveSettings => "warnings.restrictiveSettings",
            MessageKey::ProblemsGenerated => "messages.success.problemsGenerated",
        }
    }
}

/// A translation key plus its interpolation parameters.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Message {
    pub key: MessageKey,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<&'static str, i64>,
}

impl Message {
    pub fn new(key: MessageKey) -> Self {
        Self { key, params: BTreeMap::new() }
    }

    pub fn with_param(mut self, name: &'static str, value: i64) -> Self {
        self.params.insert(name, value);
        self
    }
}
