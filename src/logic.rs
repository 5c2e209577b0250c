//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - The generation facade: validation gate -> batch -> classification
//!   - Replacing settings and editing single fields (with silent preview regeneration)
//!   - Applying presets

use serde::Serialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::domain::{FieldError, Problem, Settings, SettingsField};
use crate::generator::generate_batch;
use crate::outcome::{classify, GenerationOutcome};
use crate::random::RandomSource;
use crate::state::AppState;
use crate::validation::{settings_feedback, validate_settings, SettingsFeedback};

/// Problems plus the feedback slots for one generation call.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// Scopes the batch-local problem ids.
    pub batch_id: Uuid,
    pub problems: Vec<Problem>,
    #[serde(flatten)]
    pub outcome: GenerationOutcome,
}

impl GenerationResult {
    fn empty(outcome: GenerationOutcome) -> Self {
        Self { batch_id: Uuid::new_v4(), problems: Vec::new(), outcome }
    }
}

/// Validate, generate and classify.
///
/// Invalid settings never reach the generator; the validation error is returned
/// in the error slot. Random-source faults are caught here: logged in debug builds,
/// reported as `errors.generationFailed` when announcing, swallowed otherwise.
#[instrument(level = "info", skip(settings, rng), fields(target = settings.target_count()))]
pub fn generate_problems(settings: &Settings, announce: bool, rng: &mut dyn RandomSource) -> GenerationResult {
    if let Err(code) = validate_settings(settings) {
        info!(target: "generation", error = %code, "Settings rejected; generation skipped");
        return GenerationResult::empty(GenerationOutcome {
            error: Some(code.to_message()),
            ..GenerationOutcome::default()
        });
    }

    match generate_batch(settings, rng) {
        Ok(batch) => {
            let outcome = classify(&batch.problems, batch.target, announce);
            info!(target: "generation", generated = batch.problems.len(), requested = batch.target, attempts = batch.stats.attempts, "Generation finished");
            GenerationResult { batch_id: Uuid::new_v4(), problems: batch.problems, outcome }
        }
        Err(e) => {
            if cfg!(debug_assertions) {
                error!(target: "generation", error = %e, "Random source failed during generation");
            }
            GenerationResult::empty(GenerationOutcome::failed(announce))
        }
    }
}

/// Generate with the given settings, or the current ones when none are given.
pub async fn generate_for(state: &AppState, settings: Option<Settings>, announce: bool) -> GenerationResult {
    let settings = match settings {
        Some(s) => s,
        None => state.current_settings().await,
    };
    generate_off_runtime(settings, announce, state.random_source()).await
}

/// Sampling can spend `target × MAX_ATTEMPTS` evaluations, so it runs on the blocking pool
/// rather than on an async worker.
async fn generate_off_runtime(
    settings: Settings,
    announce: bool,
    mut rng: Box<dyn RandomSource + Send>,
) -> GenerationResult {
    match tokio::task::spawn_blocking(move || generate_problems(&settings, announce, &mut *rng)).await {
        Ok(result) => result,
        Err(e) => {
            error!(target: "generation", error = %e, "Generation task failed");
            GenerationResult::empty(GenerationOutcome::failed(announce))
        }
    }
}

/// Settings plus the soft feedback computed for them.
#[derive(Clone, Debug, Serialize)]
pub struct SettingsOut {
    pub settings: Settings,
    pub feedback: SettingsFeedback,
}

pub async fn current_settings_out(state: &AppState) -> SettingsOut {
    let settings = state.current_settings().await;
    let feedback = settings_feedback(&settings);
    SettingsOut { settings, feedback }
}

#[instrument(level = "info", skip_all)]
pub async fn replace_settings(state: &AppState, settings: Settings) -> SettingsOut {
    let feedback = settings_feedback(&settings);
    state.replace_settings(settings.clone()).await;
    info!(target: "settings", valid = feedback.error.is_none(), restrictive = feedback.warning.is_some(), "Settings replaced");
    SettingsOut { settings, feedback }
}

/// Result of editing one field.
#[derive(Clone, Debug, Serialize)]
pub struct FieldEditOut {
    pub settings: Settings,
    /// Present only for validation-sensitive fields.
    pub feedback: Option<SettingsFeedback>,
    /// Silent regeneration, present when a sensitive edit left the settings valid.
    pub preview: Option<GenerationResult>,
}

/// Apply a single-field edit, persist it, and react like the editor does:
/// sensitive fields are re-validated and, if still valid, trigger a silent preview.
#[instrument(level = "info", skip_all, fields(%field))]
pub async fn edit_field(state: &AppState, field: &str, value: serde_json::Value) -> Result<FieldEditOut, FieldError> {
    let parsed: SettingsField = field.parse()?;
    let next = state.update_settings(move |current| current.with_field(parsed, value)).await?;

    if !parsed.is_validation_sensitive() {
        debug!(target: "settings", field = parsed.as_str(), "Display-only field edited");
        return Ok(FieldEditOut { settings: next, feedback: None, preview: None });
    }

    let feedback = settings_feedback(&next);
    let preview = if feedback.error.is_none() {
        Some(generate_off_runtime(next.clone(), false, state.random_source()).await)
    } else {
        None
    };
    Ok(FieldEditOut { settings: next, feedback: Some(feedback), preview })
}

/// Replace the current settings with a preset's. `None` for an unknown id.
pub async fn apply_preset(state: &AppState, id: &str) -> Option<SettingsOut> {
    let preset = state.preset(id)?.clone();
    info!(target: "settings", id = %preset.id, "Applying preset");
    Some(replace_settings(state, preset.settings).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::domain::{IntRange, Operation};
    use crate::messages::{Message, MessageKey};
    use crate::random::testing::FailingRandom;
    use crate::random::SeededRandom;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::from_parts(AppConfig::default(), Arc::new(MemoryStore::default()), Some(21))
    }

    #[test]
    fn feasible_generation_announces_success() {
        let settings = Settings { num_problems: 2, ..Settings::default() };
        let out = generate_problems(&settings, true, &mut SeededRandom::new(1));
        assert_eq!(out.problems.len(), 2);
        assert_eq!(out.outcome.success, Some(Message::new(MessageKey::ProblemsGenerated).with_param("count", 2)));
    }

    #[test]
    fn infeasible_generation_announces_error() {
        let settings = Settings {
            operations: BTreeSet::from([Operation::Add]),
            num_range: IntRange(1, 5),
            result_range: IntRange(100, 200),
            num_problems: 3,
            ..Settings::default()
        };
        let out = generate_problems(&settings, true, &mut SeededRandom::new(1));
        assert!(out.problems.is_empty());
        assert_eq!(out.outcome.error, Some(Message::new(MessageKey::NoProblemsGenerated)));
    }

    #[test]
    fn large_grouped_batch_warns() {
        let settings = Settings {
            enable_grouping: true,
            problems_per_group: 12,
            total_groups: 5,
            num_range: IntRange(1, 20),
            result_range: IntRange(0, 40),
            ..Settings::default()
        };
        let out = generate_problems(&settings, true, &mut SeededRandom::new(8));
        assert_eq!(out.problems.len(), 60);
        assert_eq!(
            out.outcome.warning,
            Some(Message::new(MessageKey::LargeNumberOfProblems).with_param("count", 60))
        );
    }

    #[test]
    fn invalid_settings_short_circuit_with_code() {
        let settings = Settings { operations: BTreeSet::new(), ..Settings::default() };
        for announce in [true, false] {
            let out = generate_problems(&settings, announce, &mut FailingRandom);
            assert!(out.problems.is_empty());
            assert_eq!(out.outcome.error.map(|m| m.key), Some(MessageKey::NoOperations));
        }
    }

    #[test]
    fn random_faults_become_generation_failed_only_when_announced() {
        let out = generate_problems(&Settings::default(), true, &mut FailingRandom);
        assert!(out.problems.is_empty());
        assert_eq!(out.outcome.error.map(|m| m.key), Some(MessageKey::GenerationFailed));

        let out = generate_problems(&Settings::default(), false, &mut FailingRandom);
        assert!(out.problems.is_empty());
        assert_eq!(out.outcome, GenerationOutcome::default());
    }

    #[test]
    fn result_serializes_flat() {
        let out = generate_problems(&Settings { num_problems: 1, ..Settings::default() }, true, &mut SeededRandom::new(2));
        let v = serde_json::to_value(&out).unwrap();
        assert!(v["batchId"].is_string());
        assert_eq!(v["problems"][0]["id"], json!(0));
        assert_eq!(v["success"]["key"], json!("messages.success.problemsGenerated"));
        assert_eq!(v["error"], json!(null));
    }

    #[tokio::test]
    async fn sensitive_edit_validates_and_previews_silently() {
        let state = state();
        let out = edit_field(&state, "numProblems", json!(4)).await.unwrap();
        assert_eq!(out.settings.num_problems, 4);
        assert_eq!(out.feedback, Some(SettingsFeedback::default()));
        let preview = out.preview.unwrap();
        assert_eq!(preview.problems.len(), 4);
        assert_eq!(preview.outcome, GenerationOutcome::default());
        assert_eq!(state.current_settings().await.num_problems, 4);
    }

    #[tokio::test]
    async fn invalid_sensitive_edit_skips_preview() {
        let state = state();
        let out = edit_field(&state, "numOperandsRange", json!([1, 3])).await.unwrap();
        assert_eq!(
            out.feedback.and_then(|f| f.error).map(|m| m.key),
            Some(MessageKey::InvalidOperandsRange)
        );
        assert!(out.preview.is_none());
    }

    #[tokio::test]
    async fn display_field_edit_has_no_feedback() {
        let state = state();
        let out = edit_field(&state, "showAnswers", json!(true)).await.unwrap();
        assert!(out.settings.show_answers);
        assert!(out.feedback.is_none());
        assert!(out.preview.is_none());
    }

    #[tokio::test]
    async fn unknown_field_is_rejected_without_change() {
        let state = state();
        let before = state.current_settings().await;
        assert!(matches!(edit_field(&state, "fontSize", json!(12)).await, Err(FieldError::Unknown(_))));
        assert_eq!(state.current_settings().await, before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_edits_to_different_fields_both_survive() {
        for _ in 0..20 {
            let state = state();
            let a = tokio::spawn({
                let state = state.clone();
                async move { edit_field(&state, "numProblems", json!(7)).await }
            });
            let b = tokio::spawn({
                let state = state.clone();
                async move { edit_field(&state, "resultRange", json!([0, 30])).await }
            });
            a.await.unwrap().unwrap();
            b.await.unwrap().unwrap();

            let current = state.current_settings().await;
            assert_eq!(current.num_problems, 7);
            assert_eq!(current.result_range, IntRange(0, 30));
        }
    }

    #[tokio::test]
    async fn oversized_requests_are_rejected_before_sampling() {
        let state = state();
        let huge_chain = Settings { num_operands_range: IntRange(2, 1_000_000_000_000), ..Settings::default() };
        let out = generate_for(&state, Some(huge_chain), true).await;
        assert!(out.problems.is_empty());
        assert_eq!(out.outcome.error.map(|m| m.key), Some(MessageKey::InvalidOperandsRange));

        let huge_groups = Settings {
            enable_grouping: true,
            problems_per_group: 1_000_000_000,
            total_groups: 1_000_000_000,
            ..Settings::default()
        };
        let out = generate_for(&state, Some(huge_groups), true).await;
        assert!(out.problems.is_empty());
        assert_eq!(out.outcome.error.map(|m| m.key), Some(MessageKey::InvalidProblemCount));
    }

    #[tokio::test]
    async fn presets_apply_by_id() {
        let state = state();
        let out = apply_preset(&state, "times-tables").await.unwrap();
        assert_eq!(out.settings.operations, BTreeSet::from([Operation::Mul]));
        assert!(state.current_settings().await.enable_grouping);
        assert!(apply_preset(&state, "nope").await.is_none());
    }

    #[tokio::test]
    async fn generate_for_defaults_to_current_settings() {
        let state = state();
        state.replace_settings(Settings { num_problems: 3, ..Settings::default() }).await;
        let out = generate_for(&state, None, true).await;
        assert_eq!(out.problems.len(), 3);
    }
}
