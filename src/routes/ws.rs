//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::validation::settings_feedback;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!(target: "mathdrill_backend", "WebSocket upgrade requested");
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Socket I/O used by the message loop.
trait WsTransport {
    async fn recv_frame(&mut self) -> Option<Result<Message, axum::Error>>;
    async fn send_frame(&mut self, msg: Message) -> Result<(), axum::Error>;
}

impl WsTransport for WebSocket {
    async fn recv_frame(&mut self) -> Option<Result<Message, axum::Error>> {
        self.recv().await
    }

    async fn send_frame(&mut self, msg: Message) -> Result<(), axum::Error> {
        self.send(msg).await
    }
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    info!(target: "mathdrill_backend", "WebSocket connected");
    run_ws_loop(&mut socket, &state).await;
    info!(target: "mathdrill_backend", "WebSocket disconnected");
}

/// Serve frames until the peer closes, errors, or a reply can't be sent.
async fn run_ws_loop<T: WsTransport>(socket: &mut T, state: &AppState) {
    while let Some(Ok(msg)) = socket.recv_frame().await {
        match msg {
            Message::Text(txt) => {
                // Parse, dispatch, serialize response.
                let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
                    Ok(incoming) => {
                        debug!(target: "mathdrill_backend", "WS received: {:?}", &incoming);
                        handle_client_ws(incoming, state).await
                    }
                    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
                };

                let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
                    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
                });

                if let Err(e) = socket.send_frame(Message::Text(out)).await {
                    error!(target: "mathdrill_backend", error = %e, "WS send error");
                    break;
                }
            }
            Message::Ping(payload) => {
                if let Err(e) = socket.send_frame(Message::Pong(payload)).await {
                    error!(target: "mathdrill_backend", error = %e, "WS pong send error");
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
    match msg {
        ClientWsMessage::Ping => ServerWsMessage::Pong,

        ClientWsMessage::Generate { announce } => {
            let result = generate_for(state, None, announce).await;
            info!(target: "generation", batch = %result.batch_id, generated = result.problems.len(), announce, "WS problems served");
            ServerWsMessage::Problems { result }
        }

        ClientWsMessage::UpdateSettings { settings } => {
            let out = replace_settings(state, settings).await;
            ServerWsMessage::Settings { out }
        }

        ClientWsMessage::UpdateField { field, value } => match edit_field(state, &field, value).await {
            Ok(out) => ServerWsMessage::FieldUpdated { out },
            Err(e) => ServerWsMessage::Error { message: e.to_string() },
        },

        ClientWsMessage::Validate => {
            let settings = state.current_settings().await;
            ServerWsMessage::Feedback { feedback: settings_feedback(&settings) }
        }
    }
}
