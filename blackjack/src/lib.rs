//! # Blackjack
//!
//! An authoritative multiplayer blackjack engine with room-based play.
//!
//! The engine is transport-free: inbound [`net::ClientEvent`]s go into
//! [`engine::Engine::handle`], and out come the ordered
//! [`net::ServerEvent`]s to deliver plus any turn timers to schedule.
//! A WebSocket server, a test, or a local single-process game drive it
//! the same way.
//!
//! ## Architecture
//!
//! A room moves through six phases:
//!
//! - **Waiting**: seats filling up
//! - **Betting**: every player commits one bet
//! - **Playing**: players hit/stand/double in seat order, one turn each
//! - **DealerTurn**: hole card revealed, dealer draws to 17
//! - **RoundEnd**: bets settle (win 2x, push 1x, lose/bust 0)
//! - **GameEnd**: final standings after the configured round count
//!
//! ## Core Modules
//!
//! - [`game`]: cards, hand valuation, participants, and the room state
//!   machine
//! - [`room`]: room settings and the registry of active rooms
//! - [`net`]: the JSON wire vocabulary
//! - [`engine`]: event dispatch over the registry
//!
//! ## Example
//!
//! ```
//! use blackjack::{Engine, net::ClientEvent};
//! use uuid::Uuid;
//!
//! let mut engine = Engine::new();
//! let conn = Uuid::new_v4();
//! let dispatch = engine.handle(
//!     conn,
//!     ClientEvent::CreateRoom {
//!         player_name: "alice".into(),
//!         player_count: 2,
//!         rounds: 3,
//!         timeout: 30,
//!     },
//! );
//! assert_eq!(dispatch.messages.len(), 1);
//! ```

/// Core game logic, entities, and the room state machine.
pub mod game;
pub use game::{
    GameError, Phase,
    constants::{self, BET_STEP, STARTING_CREDITS},
    entities::{self, Card, Credits, PlayerId, Rank, Suit, hand_value},
};

/// Room configuration and registry.
pub mod room;
pub use room::{RoomRegistry, RoomSettings};

/// Wire protocol types.
pub mod net;

/// Event dispatch over the room registry.
pub mod engine;
pub use engine::{Dispatch, Engine, TurnTimer};
