//! Domain models: operations, integer ranges, generation settings, expressions and problems.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four arithmetic operations a worksheet may use.
/// Serialized as its ASCII symbol so settings files stay readable.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    #[serde(rename = "+")] Add,
    #[serde(rename = "-")] Sub,
    #[serde(rename = "*")] Mul,
    #[serde(rename = "/")] Div,
}

impl Operation {
    pub const ALL: [Operation; 4] = [Operation::Add, Operation::Sub, Operation::Mul, Operation::Div];

    /// ASCII symbol, as used on the wire.
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Sub => "-",
            Operation::Mul => "*",
            Operation::Div => "/",
        }
    }

    /// Symbol rendered into problem text.
    pub fn display_symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Sub => "-",
            Operation::Mul => "✖",
            Operation::Div => "➗",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        Operation::ALL.into_iter().find(|op| op.symbol() == s)
    }
}

/// Closed integer interval `[min, max]`, serialized as a two-element array.
/// Nothing forces `min <= max`; the validator reports reversed ranges.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntRange(pub i64, pub i64);

impl IntRange {
    pub fn min(self) -> i64 { self.0 }
    pub fn max(self) -> i64 { self.1 }

    pub fn span(self) -> i64 { self.1.saturating_sub(self.0) }

    pub fn contains(self, value: i64) -> bool {
        self.0 <= value && value <= self.1
    }

    pub fn intersects(self, other: IntRange) -> bool {
        self.0 <= other.1 && other.0 <= self.1
    }
}

/// Everything that constrains a generation run.
///
/// Settings is a value: editing produces a new instance (see [`Settings::with_field`]),
/// and every generation call receives the instance it should honor.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub operations: BTreeSet<Operation>,
    /// Bounds for every operand.
    pub num_range: IntRange,
    /// Bounds for the final result.
    pub result_range: IntRange,
    /// Bounds for how many operands are chained.
    pub num_operands_range: IntRange,
    pub allow_negative: bool,
    pub show_answers: bool,
    /// Flat-mode target.
    pub num_problems: i64,
    pub enable_grouping: bool,
    pub problems_per_group: i64,
    pub total_groups: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            operations: BTreeSet::from([Operation::Add, Operation::Sub]),
            num_range: IntRange(1, 10),
            result_range: IntRange(0, 20),
            num_operands_range: IntRange(2, 2),
            allow_negative: false,
            show_answers: false,
            num_problems: 20,
            enable_grouping: false,
            problems_per_group: 5,
            total_groups: 4,
        }
    }
}

impl Settings {
    /// Number of problems a batch should contain.
    pub fn target_count(&self) -> i64 {
        if self.enable_grouping {
            self.problems_per_group.saturating_mul(self.total_groups)
        } else {
            self.num_problems
        }
    }

    pub fn addition_only(&self) -> bool {
        !self.operations.is_empty() && self.operations.iter().all(|op| *op == Operation::Add)
    }

    /// Return a copy of these settings with `field` replaced by `value`.
    pub fn with_field(&self, field: SettingsField, value: serde_json::Value) -> Result<Settings, FieldError> {
        let mut next = self.clone();
        match field {
            SettingsField::Operations => next.operations = parse_field(field, value)?,
            SettingsField::NumRange => next.num_range = parse_field(field, value)?,
            SettingsField::ResultRange => next.result_range = parse_field(field, value)?,
            SettingsField::NumOperandsRange => next.num_operands_range = parse_field(field, value)?,
            SettingsField::AllowNegative => next.allow_negative = parse_field(field, value)?,
            SettingsField::ShowAnswers => next.show_answers = parse_field(field, value)?,
            SettingsField::NumProblems => next.num_problems = parse_field(field, value)?,
            SettingsField::EnableGrouping => next.enable_grouping = parse_field(field, value)?,
            SettingsField::ProblemsPerGroup => next.problems_per_group = parse_field(field, value)?,
            SettingsField::TotalGroups => next.total_groups = parse_field(field, value)?,
        }
        Ok(next)
    }
}

fn parse_field<T: DeserializeOwned>(field: SettingsField, value: serde_json::Value) -> Result<T, FieldError> {
    serde_json::from_value(value).map_err(|source| FieldError::InvalidValue { field: field.as_str(), source })
}

/// Editable settings fields, by their wire names.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SettingsField {
    Operations,
    NumRange,
    ResultRange,
    NumOperandsRange,
    AllowNegative,
    ShowAnswers,
    NumProblems,
    EnableGrouping,
    ProblemsPerGroup,
    TotalGroups,
}

impl SettingsField {
    pub const ALL: [SettingsField; 10] = [
        SettingsField::Operations,
        SettingsField::NumRange,
        SettingsField::ResultRange,
        SettingsField::NumOperandsRange,
        SettingsField::AllowNegative,
        SettingsField::ShowAnswers,
        SettingsField::NumProblems,
        SettingsField::EnableGrouping,
        SettingsField::ProblemsPerGroup,
        SettingsField::TotalGroups,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingsField::Operations => "operations",
            SettingsField::NumRange => "numRange",
            SettingsField::ResultRange => "resultRange",
            SettingsField::NumOperandsRange => "numOperandsRange",
            SettingsField::AllowNegative => "allowNegative",
            SettingsField::ShowAnswers => "showAnswers",
            SettingsField::NumProblems => "numProblems",
            SettingsField::EnableGrouping => "enableGrouping",
            SettingsField::ProblemsPerGroup => "problemsPerGroup",
            SettingsField::TotalGroups => "totalGroups",
        }
    }

    /// Edits to these fields can change whether the settings validate
    /// or how many problems are requested.
    pub fn is_validation_sensitive(self) -> bool {
        !matches!(self, SettingsField::AllowNegative | SettingsField::ShowAnswers)
    }
}

impl FromStr for SettingsField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingsField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| FieldError::Unknown(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("unknown settings field: {0}")]
    Unknown(String),
    #[error("invalid value for {field}: {source}")]
    InvalidValue {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A drawn candidate: `operators.len() == operands.len() - 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expression {
    pub operands: Vec<i64>,
    pub operators: Vec<Operation>,
}

impl Expression {
    /// Render as `a + b ✖ c` (no result suffix).
    pub fn display_text(&self) -> String {
        let mut out = String::new();
        for (i, operand) in self.operands.iter().enumerate() {
            if i > 0 {
                if let Some(op) = self.operators.get(i - 1) {
                    out.push(' ');
                    out.push_str(op.display_symbol());
                    out.push(' ');
                }
            }
            out.push_str(&operand.to_string());
        }
        out
    }
}

/// One generated worksheet line. `id` is only meaningful inside its batch.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Problem {
    pub id: usize,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn settings_round_trip_uses_camel_case_and_symbols() {
        let s = Settings::default();
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["numRange"], json!([1, 10]));
        assert_eq!(v["operations"], json!(["+", "-"]));
        assert_eq!(v["numOperandsRange"], json!([2, 2]));
        let back: Settings = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn partial_settings_fill_from_defaults() {
        let s: Settings = serde_json::from_value(json!({ "operations": ["*"], "numProblems": 7 })).unwrap();
        assert_eq!(s.operations, BTreeSet::from([Operation::Mul]));
        assert_eq!(s.num_problems, 7);
        assert_eq!(s.num_range, IntRange(1, 10));
    }

    #[test]
    fn target_count_follows_grouping_mode() {
        let mut s = Settings { num_problems: 12, problems_per_group: 3, total_groups: 5, ..Settings::default() };
        assert_eq!(s.target_count(), 12);
        s.enable_grouping = true;
        assert_eq!(s.target_count(), 15);
    }

    #[test]
    fn with_field_returns_new_value_and_leaves_original() {
        let s = Settings::default();
        let next = s.with_field(SettingsField::ResultRange, json!([5, 9])).unwrap();
        assert_eq!(next.result_range, IntRange(5, 9));
        assert_eq!(s.result_range, IntRange(0, 20));
    }

    #[test]
    fn with_field_rejects_wrong_type() {
        let err = Settings::default()
            .with_field(SettingsField::NumProblems, json!("many"))
            .unwrap_err();
        assert!(matches!(err, FieldError::InvalidValue { field: "numProblems", .. }));
    }

    #[test]
    fn field_names_parse() {
        assert_eq!("numOperandsRange".parse::<SettingsField>().unwrap(), SettingsField::NumOperandsRange);
        assert!(matches!("fontSize".parse::<SettingsField>(), Err(FieldError::Unknown(_))));
    }

    #[test]
    fn expression_renders_visual_symbols() {
        let e = Expression {
            operands: vec![12, 4, 3],
            operators: vec![Operation::Div, Operation::Mul],
        };
        assert_eq!(e.display_text(), "12 ➗ 4 ✖ 3");
    }

    #[test]
    fn ranges_intersect_inclusively() {
        assert!(IntRange(1, 5).intersects(IntRange(5, 9)));
        assert!(!IntRange(1, 4).intersects(IntRange(5, 9)));
        assert_eq!(IntRange(3, 10).span(), 7);
    }
}
