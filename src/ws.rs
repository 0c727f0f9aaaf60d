use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::AppState;
use crate::session::{RoomEvent, SessionCommand};
use crate::types::{ClientMsg, ServerMsg, SessionId};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let session_id = SessionId::new();
    tracing::info!("WebSocket connected: {}", session_id);

    // Written straight to the socket: a client that misses it can never find its own seat.
    let welcome = welcome_frame(&session_id);
    if sender.send(Message::Text(welcome.into())).await.is_err() {
        return;
    }

    // Subscribe before announcing the session so the first snapshot is not missed.
    let mut event_rx = state.room.event_tx.subscribe();
    if state
        .room
        .cmd_tx
        .send(SessionCommand::Connect {
            session_id: session_id.clone(),
        })
        .await
        .is_err()
    {
        return;
    }

    let own_id = session_id.clone();
    let event_task = tokio::spawn(async move {
        loop {
            let msg = match event_rx.recv().await {
                Ok(RoomEvent::Broadcast { msg }) => msg,
                Ok(RoomEvent::SendTo { session_id, msg }) if session_id == own_id => msg,
                Ok(RoomEvent::SendTo { .. }) => continue,
                // Room events are full snapshots or name lists; the next one supersedes any skipped.
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("Session {} lagged by {} events", own_id, n);
                    continue;
                }
                Err(RecvError::Closed) => return,
            };

            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        return;
                    }
                }
                Err(e) => tracing::error!("Failed to encode message: {}", e),
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let client_msg: ClientMsg = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Invalid message: {}", e);
                continue;
            }
        };

        let cmd = SessionCommand::Client {
            session_id: session_id.clone(),
            msg: client_msg,
        };
        if state.room.cmd_tx.send(cmd).await.is_err() {
            break;
        }
    }

    tracing::info!("WebSocket disconnected: {}", session_id);
    event_task.abort();

    let _ = state
        .room
        .cmd_tx
        .send(SessionCommand::Disconnect { session_id })
        .await;
}

fn welcome_frame(session_id: &SessionId) -> String {
    let msg = ServerMsg::Welcome {
        session_id: session_id.clone(),
    };
    serde_json::to_string(&msg).unwrap_or_default()
}
