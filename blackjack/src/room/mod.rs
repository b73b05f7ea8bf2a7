//! Room configuration and the registry of active rooms.

pub mod config;
pub mod registry;

pub use config::RoomSettings;
pub use registry::RoomRegistry;
