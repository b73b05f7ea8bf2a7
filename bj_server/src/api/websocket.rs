//! WebSocket handler for gameplay.
//!
//! Each accepted socket is one player: a fresh connection-scoped id is
//! minted on upgrade and used as the player's identity for the life of
//! the socket. Inbound frames are parsed into
//! [`ClientEvent`]s and forwarded to the engine task; outbound events
//! arrive on a per-connection channel and are written back as JSON.
//! Closing the socket (or any read error) is a disconnect: the engine
//! unseats the player and tears the room down if it emptied.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc;
use uuid::Uuid;

use blackjack::net::{ClientEvent, ServerEvent};

use super::AppState;
use crate::runtime::EngineMessage;

/// Upgrade the HTTP connection to a gameplay WebSocket.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();

    info!("WebSocket connected: conn={conn}");

    // Outbound path: engine task -> channel -> socket.
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let parse_error_tx = outbound_tx.clone();

    if state
        .engine
        .send(EngineMessage::Connect {
            conn,
            sender: outbound_tx,
        })
        .await
        .is_err()
    {
        return;
    }

    let send_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    warn!("conn {conn}: failed to serialize event: {e}");
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound path: socket -> engine task.
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => {
                    if state
                        .engine
                        .send(EngineMessage::Inbound { conn, event })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    debug!("conn {conn}: unparseable message: {e}");
                    let _ = parse_error_tx.send(ServerEvent::Error {
                        message: "invalid message format".to_string(),
                    });
                }
            },
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: conn={conn}");
                break;
            }
            Err(e) => {
                warn!("WebSocket error: conn={conn}: {e}");
                break;
            }
            _ => {}
        }
    }

    // Cleanup: unseat the player; the engine pauses or tears down the
    // room as needed.
    send_task.abort();
    let _ = state.engine.send(EngineMessage::Disconnect { conn }).await;

    info!("WebSocket disconnected: conn={conn}");
}
