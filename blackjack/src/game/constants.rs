//! Table limits and game constants.

use super::entities::Credits;

/// Credits every player sits down with.
pub const STARTING_CREDITS: Credits = 100;

/// Bets must be positive multiples of this.
pub const BET_STEP: Credits = 10;

/// The hand value ceiling; anything above is a bust.
pub const BLACKJACK: u32 = 21;

/// The dealer draws until reaching at least this value (hard-17 rule).
pub const DEALER_STAND: u32 = 17;

pub const MIN_SEATS: usize = 2;
pub const MAX_SEATS: usize = 6;

/// Floor for the per-turn timeout a room can be created with.
pub const MIN_TURN_TIMEOUT_SECS: u64 = 5;

pub const DECK_SIZE: usize = 52;

/// Length of generated room codes.
pub const ROOM_CODE_LEN: usize = 6;
