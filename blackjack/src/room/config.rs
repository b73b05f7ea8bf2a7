//! Room configuration.

use serde::{Deserialize, Serialize};

use crate::game::constants;

/// Settings a room is created with. Fixed for the room's lifetime.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    /// Seats at the table; the game auto-starts when all are taken.
    pub seats: usize,

    /// Rounds played before the game ends.
    pub rounds: u32,

    /// Seconds a player has to act before being stood automatically.
    pub turn_timeout_secs: u64,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            seats: 2,
            rounds: 3,
            turn_timeout_secs: 30,
        }
    }
}

impl RoomSettings {
    /// Validate settings at room creation.
    pub fn validate(&self) -> Result<(), String> {
        if self.seats < constants::MIN_SEATS || self.seats > constants::MAX_SEATS {
            return Err(format!(
                "seat count must be between {} and {}",
                constants::MIN_SEATS,
                constants::MAX_SEATS
            ));
        }

        if self.rounds == 0 {
            return Err("round count must be at least 1".to_string());
        }

        if self.turn_timeout_secs < constants::MIN_TURN_TIMEOUT_SECS {
            return Err(format!(
                "turn timeout must be at least {} seconds",
                constants::MIN_TURN_TIMEOUT_SECS
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(RoomSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_single_seat() {
        let settings = RoomSettings {
            seats: 1,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_table() {
        let settings = RoomSettings {
            seats: 7,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_rounds() {
        let settings = RoomSettings {
            rounds: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_hair_trigger_timeout() {
        let settings = RoomSettings {
            turn_timeout_secs: 1,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
