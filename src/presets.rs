//! Built-in worksheet presets, so the app is useful without any config file.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{IntRange, Operation, Settings};

/// A named, ready-to-apply settings value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub settings: Settings,
}

pub fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset {
            id: "add-within-10".into(),
            name: "Addition within 10".into(),
            settings: Settings {
                operations: BTreeSet::from([Operation::Add]),
                num_range: IntRange(0, 10),
                result_range: IntRange(0, 10),
                num_operands_range: IntRange(2, 2),
                num_problems: 20,
                ..Settings::default()
            },
        },
        Preset {
            id: "add-sub-within-20".into(),
            name: "Addition and subtraction within 20".into(),
            settings: Settings {
                operations: BTreeSet::from([Operation::Add, Operation::Sub]),
                num_range: IntRange(0, 20),
                result_range: IntRange(0, 20),
                num_operands_range: IntRange(2, 2),
                num_problems: 30,
                ..Settings::default()
            },
        },
        Preset {
            id: "times-tables".into(),
            name: "Times tables".into(),
            settings: Settings {
                operations: BTreeSet::from([Operation::Mul]),
                num_range: IntRange(1, 10),
                result_range: IntRange(1, 100),
                num_operands_range: IntRange(2, 2),
                enable_grouping: true,
                problems_per_group: 10,
                total_groups: 3,
                ..Settings::default()
            },
        },
        Preset {
            id: "exact-division".into(),
            name: "Exact division".into(),
            settings: Settings {
                operations: BTreeSet::from([Operation::Div]),
                num_range: IntRange(1, 100),
                result_range: IntRange(1, 10),
                num_operands_range: IntRange(2, 2),
                num_problems: 20,
                ..Settings::default()
            },
        },
        Preset {
            id: "mixed-chains".into(),
            name: "Mixed chains".into(),
            settings: Settings {
                operations: Operation::ALL.into_iter().collect(),
                num_range: IntRange(1, 12),
                result_range: IntRange(0, 50),
                num_operands_range: IntRange(3, 4),
                num_problems: 25,
                ..Settings::default()
            },
        },
    ]
}
