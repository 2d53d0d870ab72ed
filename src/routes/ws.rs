//! WebSocket upgrade + session loop.
//!
//! Each connection owns one `Session`. Client messages become session events; effects
//! run in background tasks and their completions return through a channel, so the
//! session is only ever mutated from this loop. A snapshot is sent after every applied
//! event, an error message after every refused one.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::logic::spawn_effect;
use crate::protocol::{to_snapshot, ClientWsMessage, ServerWsMessage};
use crate::session::{Event, Session};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "ws", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state), fields(conn = %Uuid::new_v4()))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "ws", "WebSocket connected");
  let (events_tx, mut events_rx) = mpsc::unbounded_channel::<Event>();
  let mut session = Session::new(state.generation_enabled());

  let hello = ServerWsMessage::Session { session: to_snapshot(&session) };
  if send(&mut socket, &hello).await.is_err() { return; }

  loop {
    let reply = tokio::select! {
      incoming = socket.recv() => match incoming {
        Some(Ok(Message::Text(txt))) => match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(ClientWsMessage::Ping) => ServerWsMessage::Pong,
          Ok(msg) => {
            debug!(target: "ws", "WS received: {:?}", &msg);
            match msg.into_event() {
              Some(event) => apply(&mut session, event, &state, &events_tx),
              None => ServerWsMessage::Session { session: to_snapshot(&session) },
            }
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        },
        Some(Ok(Message::Ping(payload))) => {
          let _ = socket.send(Message::Pong(payload)).await;
          continue;
        }
        Some(Ok(Message::Close(_))) | None => break,
        Some(Ok(_)) => continue,
        Some(Err(e)) => {
          warn!(target: "ws", error = %e, "WS receive error");
          break;
        }
      },
      Some(event) = events_rx.recv() => apply(&mut session, event, &state, &events_tx),
    };

    if send(&mut socket, &reply).await.is_err() { break; }
  }
  info!(target: "ws", "WebSocket disconnected");
}

/// Feed one event to the session, start any resulting effect, and build the reply.
fn apply(session: &mut Session, event: Event, state: &AppState, events: &UnboundedSender<Event>) -> ServerWsMessage {
  match session.handle(event) {
    Ok(effect) => {
      if let Some(effect) = effect {
        spawn_effect(state, effect, events.clone());
      }
      ServerWsMessage::Session { session: to_snapshot(session) }
    }
    Err(e) => {
      debug!(target: "ws", error = %e, phase = session.phase().name(), "Session event refused");
      ServerWsMessage::Error { message: e.to_string() }
    }
  }
}

async fn send(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await.map_err(|e| {
    error!(target: "ws", error = %e, "WS send error");
    e
  })
}
