//! Wire protocol shared between the engine and any transport.

pub mod messages;

pub use messages::{ClientEvent, PlayerAction, ServerEvent};
