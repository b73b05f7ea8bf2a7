//! Wire vocabulary exchanged with clients.
//!
//! Every message is a JSON object tagged by a camelCase `type` field,
//! e.g. `{"type":"placeBet","roomId":"AB12CD","bet":20}`. The engine
//! consumes [`ClientEvent`]s and produces [`ServerEvent`]s; nothing in
//! here knows about sockets.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::entities::{
    Card, Credits, DealerView, Outcome, PlayerId, PlayerView,
};
use crate::room::config::RoomSettings;

/// A turn action a seated player can take.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerAction {
    Hit,
    Stand,
    Double,
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Hit => "hit",
            Self::Stand => "stand",
            Self::Double => "double",
        };
        write!(f, "{repr}")
    }
}

/// A message from a client to the server.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Create a room and take its first (host) seat.
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        player_name: String,
        player_count: usize,
        rounds: u32,
        timeout: u64,
    },
    /// Take a seat in an existing room.
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String, player_name: String },
    /// Host-only: start before the table fills.
    #[serde(rename_all = "camelCase")]
    StartGame { room_id: String },
    /// Commit a bet for the current round.
    #[serde(rename_all = "camelCase")]
    PlaceBet { room_id: String, bet: Credits },
    /// Hit, stand, or double on the caller's turn.
    #[serde(rename_all = "camelCase")]
    GameAction {
        room_id: String,
        action: PlayerAction,
    },
}

/// Per-player line of a settled round.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    pub value: u32,
    pub result: Outcome,
    pub bet: Credits,
    pub winnings: Credits,
    pub credits: Credits,
}

/// Final scoreboard line at game end.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalStanding {
    pub id: PlayerId,
    pub name: String,
    pub credits: Credits,
    pub rounds_won: u32,
}

/// A message from the server to one or more clients.
///
/// Within a room, these are delivered in exactly the order the
/// transitions occurred.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        room_id: String,
        players: Vec<PlayerView>,
    },
    #[serde(rename_all = "camelCase")]
    PlayerJoined { players: Vec<PlayerView> },
    #[serde(rename_all = "camelCase")]
    BettingPhase {
        players: Vec<PlayerView>,
        current_round: u32,
        total_rounds: u32,
    },
    #[serde(rename_all = "camelCase")]
    BetPlaced {
        player_id: PlayerId,
        player_name: String,
        bet: Credits,
    },
    #[serde(rename_all = "camelCase")]
    GameStarted {
        settings: RoomSettings,
        players: Vec<PlayerView>,
        dealer: DealerView,
        current_player_index: usize,
        current_round: u32,
        total_rounds: u32,
        room_id: String,
    },
    /// Echo of a validated turn action.
    #[serde(rename_all = "camelCase")]
    GameAction {
        player_id: PlayerId,
        action: PlayerAction,
    },
    #[serde(rename_all = "camelCase")]
    CardDrawn { player_id: PlayerId, card: Card },
    #[serde(rename_all = "camelCase")]
    NextPlayer { current_player_index: usize },
    #[serde(rename_all = "camelCase")]
    RevealDealerCard { card: Card },
    #[serde(rename_all = "camelCase")]
    DealerCardDrawn { card: Card },
    #[serde(rename_all = "camelCase")]
    RoundEnd {
        dealer: DealerView,
        players: Vec<RoundSummary>,
        current_round: u32,
        total_rounds: u32,
    },
    #[serde(rename_all = "camelCase")]
    GameEnd { players: Vec<FinalStanding> },
    #[serde(rename_all = "camelCase")]
    PlayerLeft {
        player_id: PlayerId,
        players: Vec<PlayerView>,
    },
    #[serde(rename_all = "camelCase")]
    GamePaused { message: String },
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{Rank, Suit};

    #[test]
    fn test_client_event_create_room_from_json() {
        let json = r#"{"type":"createRoom","playerName":"alice","playerCount":2,"rounds":3,"timeout":30}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::CreateRoom {
                player_name: "alice".into(),
                player_count: 2,
                rounds: 3,
                timeout: 30,
            }
        );
    }

    #[test]
    fn test_client_event_game_action_from_json() {
        let json = r#"{"type":"gameAction","roomId":"AB12CD","action":"hit"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::GameAction {
                room_id: "AB12CD".into(),
                action: PlayerAction::Hit,
            }
        );
    }

    #[test]
    fn test_client_event_rejects_unknown_action() {
        let json = r#"{"type":"gameAction","roomId":"AB12CD","action":"split"}"#;
        assert!(serde_json::from_str::<ClientEvent>(json).is_err());
    }

    #[test]
    fn test_server_event_is_type_tagged() {
        let event = ServerEvent::NextPlayer {
            current_player_index: 1,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"nextPlayer","currentPlayerIndex":1}"#);
    }

    #[test]
    fn test_card_drawn_serializes_card_compactly() {
        let event = ServerEvent::RevealDealerCard {
            card: Card(Rank::Ace, Suit::Spade),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"revealDealerCard","card":["A","♠"]}"#);
    }

    #[test]
    fn test_error_event_round_trips() {
        let event = ServerEvent::Error {
            message: "not your turn".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: ServerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
