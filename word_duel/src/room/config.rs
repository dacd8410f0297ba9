//! Room configuration models.

use crate::game::engine::GameRules;
use std::time::Duration;

/// Room configuration: game rules plus actor lifecycle knobs.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Game rule knobs (pressure limit, hand size, option count).
    pub rules: GameRules,

    /// How long a room may sit with no inbound events before it shuts down.
    pub idle_timeout: Duration,

    /// How long a finished room lingers before it shuts down, giving clients
    /// time to receive the terminal broadcast.
    pub finished_linger: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            rules: GameRules::default(),
            idle_timeout: Duration::from_secs(600),
            finished_linger: Duration::from_secs(30),
        }
    }
}

impl RoomConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.rules.validate()?;

        if self.idle_timeout.is_zero() {
            return Err("Idle timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
