//! Blackjack game engine core: cards, participants, and the room state
//! machine.

pub mod constants;
pub mod entities;
pub mod state_machine;

pub use state_machine::{Effect, GameError, Phase, Room, settle};
