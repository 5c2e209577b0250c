//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, instrument, warn};

use crate::eval::evaluate_symbols;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;
use crate::validation::settings_feedback;

type HttpError = (StatusCode, Json<ErrorOut>);

fn http_error(status: StatusCode, message: impl Into<String>) -> HttpError {
    (status, Json(ErrorOut { message: message.into() }))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(current_settings_out(&state).await)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_put_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<crate::domain::Settings>,
) -> impl IntoResponse {
    Json(replace_settings(&state, body).await)
}

#[instrument(level = "info", skip(state, body), fields(field = %body.field))]
pub async fn http_patch_field(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FieldEditIn>,
) -> Result<Json<FieldEditOut>, HttpError> {
    match edit_field(&state, &body.field, body.value).await {
        Ok(out) => Ok(Json(out)),
        Err(e) => {
            warn!(target: "settings", field = %body.field, error = %e, "HTTP field edit rejected");
            Err(http_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

#[instrument(level = "info", skip(body))]
pub async fn http_post_validate(Json(body): Json<ValidateIn>) -> impl IntoResponse {
    Json(settings_feedback(&body.settings))
}

#[instrument(level = "info", skip(state, body), fields(announce = body.announce, explicit = body.settings.is_some()))]
pub async fn http_post_problems(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateIn>,
) -> impl IntoResponse {
    let result = generate_for(&state, body.settings, body.announce).await;
    info!(target: "generation", batch = %result.batch_id, generated = result.problems.len(), "HTTP problems served");
    Json(result)
}

#[instrument(level = "info", skip(body), fields(operands = body.operands.len()))]
pub async fn http_post_evaluate(Json(body): Json<EvaluateIn>) -> impl IntoResponse {
    Json(EvaluateOut { result: evaluate_symbols(&body.operands, &body.operators) })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_presets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(PresetsOut { presets: state.presets.as_ref().clone() })
}

#[instrument(level = "info", skip(state, body), fields(id = %body.id))]
pub async fn http_post_apply_preset(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PresetIn>,
) -> Result<Json<SettingsOut>, HttpError> {
    apply_preset(&state, &body.id)
        .await
        .map(Json)
        .ok_or_else(|| http_error(StatusCode::NOT_FOUND, format!("Unknown preset: {}", body.id)))
}
