//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::Settings;
use crate::logic::{FieldEditOut, GenerationResult, SettingsOut};
use crate::presets::Preset;
use crate::validation::SettingsFeedback;

fn default_announce() -> bool {
    true
}

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Generate {
        #[serde(default = "default_announce")]
        announce: bool,
    },
    UpdateSettings {
        settings: Settings,
    },
    UpdateField {
        field: String,
        value: serde_json::Value,
    },
    Validate,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Problems {
        #[serde(flatten)]
        result: GenerationResult,
    },
    Settings {
        #[serde(flatten)]
        out: SettingsOut,
    },
    FieldUpdated {
        #[serde(flatten)]
        out: FieldEditOut,
    },
    Feedback {
        #[serde(flatten)]
        feedback: SettingsFeedback,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct GenerateIn {
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default = "default_announce")]
    pub announce: bool,
}

#[derive(Debug, Deserialize)]
pub struct ValidateIn {
    pub settings: Settings,
}

#[derive(Debug, Deserialize)]
pub struct FieldEditIn {
    pub field: String,
    pub value: serde_json::Value,
}

/// Operators arrive as raw symbols so unknown ones can be reported as "no result".
#[derive(Debug, Deserialize)]
pub struct EvaluateIn {
    pub operands: Vec<i64>,
    pub operators: Vec<String>,
}
#[derive(Debug, Serialize)]
pub struct EvaluateOut {
    pub result: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PresetIn {
    pub id: String,
}
#[derive(Serialize)]
pub struct PresetsOut {
    pub presets: Vec<Preset>,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_client_messages() {
        let m: ClientWsMessage = serde_json::from_str(r#"{"type":"generate"}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::Generate { announce: true }));

        let m: ClientWsMessage =
            serde_json::from_str(r#"{"type":"update_field","field":"numRange","value":[1,5]}"#).unwrap();
        match m {
            ClientWsMessage::UpdateField { field, value } => {
                assert_eq!(field, "numRange");
                assert_eq!(value, json!([1, 5]));
            }
            other => panic!("unexpected {other:?}"),
        }

        let m: ClientWsMessage =
            serde_json::from_str(r#"{"type":"update_settings","settings":{"numProblems":5}}"#).unwrap();
        assert!(matches!(m, ClientWsMessage::UpdateSettings { settings } if settings.num_problems == 5));
    }

    #[test]
    fn feedback_reply_is_tagged_and_flat() {
        let v = serde_json::to_value(ServerWsMessage::Feedback { feedback: SettingsFeedback::default() }).unwrap();
        assert_eq!(v, json!({ "type": "feedback", "error": null, "warning": null }));
    }

    #[test]
    fn generate_body_defaults() {
        let g: GenerateIn = serde_json::from_str("{}").unwrap();
        assert!(g.settings.is_none());
        assert!(g.announce);
    }
}
