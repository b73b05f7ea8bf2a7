//! In-memory registry of active rooms.
//!
//! The registry is the only process-wide mutable state: a map of room
//! code to [`Room`], mutated solely by creation and teardown. It is
//! owned by the composition root and passed by reference to whatever
//! drives it; there is no ambient/static table.

use log::info;
use rand::Rng;
use std::collections::HashMap;

use crate::game::constants;
use crate::game::entities::PlayerId;
use crate::game::state_machine::{GameError, Room};
use super::config::RoomSettings;

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Map of room code to room.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
}

impl RoomRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room with a freshly generated unique code and seat the
    /// host in it. Returns the new room's code.
    pub fn create(
        &mut self,
        settings: RoomSettings,
        host_id: PlayerId,
        host_name: impl Into<String>,
    ) -> Result<String, GameError> {
        settings.validate().map_err(GameError::InvalidAction)?;

        let code = self.generate_code();
        let room = Room::new(code.clone(), settings, host_id, host_name);
        self.rooms.insert(code.clone(), room);
        info!("registry: {} active room(s)", self.rooms.len());
        Ok(code)
    }

    pub fn get_mut(&mut self, code: &str) -> Result<&mut Room, GameError> {
        self.rooms.get_mut(code).ok_or(GameError::RoomNotFound)
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn remove(&mut self, code: &str) -> Option<Room> {
        let room = self.rooms.remove(code);
        if room.is_some() {
            info!("registry: room {code} destroyed, {} left", self.rooms.len());
        }
        room
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Short uppercase alphanumeric token, retried until unique among
    /// active rooms.
    fn generate_code(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let code: String = (0..constants::ROOM_CODE_LEN)
                .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
                .collect();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}
