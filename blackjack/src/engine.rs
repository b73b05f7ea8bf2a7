//! Transport-free dispatch layer.
//!
//! [`Engine`] owns the room registry and the connection-to-room index,
//! and maps each inbound [`ClientEvent`] to exactly one state-machine
//! operation. The result is a [`Dispatch`]: the per-connection outbound
//! messages in delivery order, plus any turn timers to schedule. The
//! caller (a WebSocket server, a test, a local single-process driver)
//! is responsible only for moving bytes and sleeping; every rule lives
//! below this line.
//!
//! Validation failures are returned solely to the originating
//! connection as an `error` event and have no side effects. An
//! `EmptyDeck` error — a logic bug, never expected — voids only the
//! affected room's round.

use log::error;
use std::collections::HashMap;

use crate::game::entities::PlayerId;
use crate::game::state_machine::{Effect, GameError, Room};
use crate::net::messages::{ClientEvent, ServerEvent};
use crate::room::{RoomRegistry, RoomSettings};

/// An auto-stand to schedule: after `secs`, feed
/// [`Engine::turn_timeout`] with these coordinates.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TurnTimer {
    pub room_id: String,
    pub player: PlayerId,
    pub seq: u64,
    pub secs: u64,
}

/// Everything the transport must do after one inbound event.
#[derive(Debug, Default)]
pub struct Dispatch {
    /// Outbound messages in delivery order.
    pub messages: Vec<(PlayerId, ServerEvent)>,
    /// Turn timers to schedule.
    pub timers: Vec<TurnTimer>,
}

impl Dispatch {
    fn none() -> Self {
        Self::default()
    }

    fn error(to: PlayerId, err: &GameError) -> Self {
        Self {
            messages: vec![(
                to,
                ServerEvent::Error {
                    message: err.to_string(),
                },
            )],
            timers: Vec::new(),
        }
    }
}

/// Expand room effects into concrete per-connection messages, using the
/// room's membership at the moment the operation finished.
fn expand(room: &Room, room_id: &str, effects: Vec<Effect>) -> Dispatch {
    let mut dispatch = Dispatch::none();
    for effect in effects {
        match effect {
            Effect::Broadcast(event) => {
                for player in &room.players {
                    dispatch.messages.push((player.id, event.clone()));
                }
            }
            Effect::ArmTurnTimer { player, seq, secs } => {
                dispatch.timers.push(TurnTimer {
                    room_id: room_id.to_string(),
                    player,
                    seq,
                    secs,
                });
            }
        }
    }
    dispatch
}

/// The authoritative game server, minus the network.
#[derive(Debug, Default)]
pub struct Engine {
    registry: RoomRegistry,
    /// Which room each live connection is seated in.
    memberships: HashMap<PlayerId, String>,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Process one inbound event to completion.
    pub fn handle(&mut self, conn: PlayerId, event: ClientEvent) -> Dispatch {
        let result = match event {
            ClientEvent::CreateRoom {
                player_name,
                player_count,
                rounds,
                timeout,
            } => self.create_room(conn, player_name, player_count, rounds, timeout),
            ClientEvent::JoinRoom {
                room_id,
                player_name,
            } => self.join_room(conn, &room_id, player_name),
            ClientEvent::StartGame { room_id } => {
                self.room_op(conn, &room_id, |room, conn| room.start(conn))
            }
            ClientEvent::PlaceBet { room_id, bet } => {
                self.room_op(conn, &room_id, |room, conn| room.place_bet(conn, bet))
            }
            ClientEvent::GameAction { room_id, action } => {
                self.room_op(conn, &room_id, |room, conn| room.play(conn, action))
            }
        };
        result.unwrap_or_else(|err| Dispatch::error(conn, &err))
    }

    /// A connection dropped: cancel its seat everywhere and tear the
    /// room down if it emptied. Always makes forward progress — the
    /// room either reopens betting, ends the game, or is destroyed.
    pub fn disconnect(&mut self, conn: PlayerId) -> Dispatch {
        let Some(room_id) = self.memberships.remove(&conn) else {
            return Dispatch::none();
        };
        let Ok(room) = self.registry.get_mut(&room_id) else {
            return Dispatch::none();
        };

        let effects = room.remove_player(conn);
        let dispatch = expand(room, &room_id, effects);
        if room.is_empty() {
            self.registry.remove(&room_id);
        }
        dispatch
    }

    /// A scheduled turn timer fired. Stale or orphaned firings (the
    /// player acted, the round moved on, the room is gone) are no-ops.
    pub fn turn_timeout(&mut self, room_id: &str, player: PlayerId, seq: u64) -> Dispatch {
        let Ok(room) = self.registry.get_mut(room_id) else {
            return Dispatch::none();
        };
        match room.turn_timeout(player, seq) {
            Ok(effects) => expand(room, room_id, effects),
            Err(err) => Self::contain(room, room_id, &err),
        }
    }

    fn create_room(
        &mut self,
        conn: PlayerId,
        player_name: String,
        player_count: usize,
        rounds: u32,
        timeout: u64,
    ) -> Result<Dispatch, GameError> {
        if self.memberships.contains_key(&conn) {
            return Err(GameError::InvalidAction(
                "already seated in a room".to_string(),
            ));
        }
        let settings = RoomSettings {
            seats: player_count,
            rounds,
            turn_timeout_secs: timeout,
        };
        let room_id = self.registry.create(settings, conn, player_name)?;
        self.memberships.insert(conn, room_id.clone());

        let room = self.registry.get_mut(&room_id)?;
        Ok(Dispatch {
            messages: vec![(
                conn,
                ServerEvent::RoomCreated {
                    room_id,
                    players: room.player_views(),
                },
            )],
            timers: Vec::new(),
        })
    }

    fn join_room(
        &mut self,
        conn: PlayerId,
        room_id: &str,
        player_name: String,
    ) -> Result<Dispatch, GameError> {
        if self.memberships.contains_key(&conn) {
            return Err(GameError::InvalidAction(
                "already seated in a room".to_string(),
            ));
        }
        let room = self.registry.get_mut(room_id)?;
        let effects = room.join(conn, player_name)?;
        self.memberships.insert(conn, room_id.to_string());
        let room = self.registry.get_mut(room_id)?;
        Ok(expand(room, room_id, effects))
    }

    /// Run one state-machine operation against a room, containing a
    /// defensive `EmptyDeck` to that room.
    fn room_op<F>(&mut self, conn: PlayerId, room_id: &str, op: F) -> Result<Dispatch, GameError>
    where
        F: FnOnce(&mut Room, PlayerId) -> Result<Vec<Effect>, GameError>,
    {
        let room = self.registry.get_mut(room_id)?;
        match op(room, conn) {
            Ok(effects) => Ok(expand(room, room_id, effects)),
            Err(err @ GameError::EmptyDeck(_)) => Ok(Self::contain(room, room_id, &err)),
            Err(err) => Err(err),
        }
    }

    /// Abort the affected room's round without touching the process or
    /// any other room.
    fn contain(room: &mut Room, room_id: &str, err: &GameError) -> Dispatch {
        error!("room {room_id}: {err}, voiding the round");
        let mut effects = vec![Effect::Broadcast(ServerEvent::Error {
            message: "internal error: the round was voided".to_string(),
        })];
        effects.extend(room.abort_round());
        expand(room, room_id, effects)
    }
}
