//! The engine task and its message plumbing.
//!
//! All room state lives on one task that owns the [`Engine`] and
//! handles one message to completion before the next, so no locking is
//! needed anywhere. Turn timers are detached sleep tasks that post a
//! `TurnTimeout` back into the same inbox; the engine drops firings
//! whose turn sequence number has already moved on.

use blackjack::{Dispatch, Engine, PlayerId};
use blackjack::net::{ClientEvent, ServerEvent};
use log::{debug, warn};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

/// Messages the engine task consumes.
pub enum EngineMessage {
    /// A WebSocket connection opened; outbound events for `conn` go to
    /// `sender`.
    Connect {
        conn: PlayerId,
        sender: mpsc::UnboundedSender<ServerEvent>,
    },
    /// A parsed client event.
    Inbound { conn: PlayerId, event: ClientEvent },
    /// The connection dropped.
    Disconnect { conn: PlayerId },
    /// A scheduled turn timer fired.
    TurnTimeout {
        room_id: String,
        player: PlayerId,
        seq: u64,
    },
}

/// Cloneable handle for sending messages to the engine task.
#[derive(Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineMessage>,
}

impl EngineHandle {
    pub async fn send(&self, message: EngineMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "engine is closed".to_string())
    }
}

/// Spawn the engine task and return its handle.
pub fn spawn_engine() -> EngineHandle {
    let (sender, inbox) = mpsc::channel(256);
    let task = EngineTask {
        engine: Engine::new(),
        inbox,
        connections: HashMap::new(),
        timer_tx: sender.clone(),
    };
    tokio::spawn(task.run());
    EngineHandle { sender }
}

struct EngineTask {
    engine: Engine,
    inbox: mpsc::Receiver<EngineMessage>,
    /// Outbound channel per live connection.
    connections: HashMap<PlayerId, mpsc::UnboundedSender<ServerEvent>>,
    /// Loops timer firings back into our own inbox.
    timer_tx: mpsc::Sender<EngineMessage>,
}

impl EngineTask {
    async fn run(mut self) {
        while let Some(message) = self.inbox.recv().await {
            match message {
                EngineMessage::Connect { conn, sender } => {
                    debug!("conn {conn}: registered");
                    self.connections.insert(conn, sender);
                }
                EngineMessage::Inbound { conn, event } => {
                    let dispatch = self.engine.handle(conn, event);
                    self.deliver(dispatch);
                }
                EngineMessage::Disconnect { conn } => {
                    self.connections.remove(&conn);
                    let dispatch = self.engine.disconnect(conn);
                    self.deliver(dispatch);
                }
                EngineMessage::TurnTimeout {
                    room_id,
                    player,
                    seq,
                } => {
                    let dispatch = self.engine.turn_timeout(&room_id, player, seq);
                    self.deliver(dispatch);
                }
            }
        }
    }

    /// Push outbound messages to their sockets, in order, and schedule
    /// any timers.
    fn deliver(&mut self, dispatch: Dispatch) {
        for (conn, event) in dispatch.messages {
            let gone = match self.connections.get(&conn) {
                Some(sender) => sender.send(event).is_err(),
                None => false,
            };
            if gone {
                warn!("conn {conn}: outbound channel closed, dropping");
                self.connections.remove(&conn);
            }
        }

        for timer in dispatch.timers {
            let tx = self.timer_tx.clone();
            tokio::spawn(async move {
                sleep(Duration::from_secs(timer.secs)).await;
                let _ = tx
                    .send(EngineMessage::TurnTimeout {
                        room_id: timer.room_id,
                        player: timer.player,
                        seq: timer.seq,
                    })
                    .await;
            });
        }
    }
}
