//! Game entity models.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

/// Stable player identity.
///
/// Assigned when a player enters a room and independent of the transport
/// connection, so a connection can be re-bound to the same player later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Mint a fresh player identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 4-digit numeric room code pairing exactly one host and one guest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomCode(String);

impl RoomCode {
    /// Build a code from a number in the 4-digit space.
    pub fn from_number(n: u16) -> Self {
        Self(format!("{n:04}"))
    }

    /// Parse a client-supplied code. Returns `None` unless the input is
    /// exactly four ASCII digits.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One term/definition pair from the uploaded word list.
///
/// Immutable once a room's word list is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub term: String,
    pub definition: String,
}

impl WordEntry {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// One player's in-game state.
///
/// `pressure` is FIFO; the front element is the player's active question.
/// `hand` holds the attack cards and is refilled 1-for-1 after each attack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerState {
    pub pressure: VecDeque<WordEntry>,
    pub hand: Vec<WordEntry>,
}

/// Room lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// Host present, guest optional, word list may still be empty.
    Waiting,
    /// Both seats filled, game in progress.
    Playing,
    /// Terminal; some player's pressure queue reached the limit.
    Finished { winner: PlayerId },
}

impl RoomStatus {
    pub fn is_playing(&self) -> bool {
        matches!(self, RoomStatus::Playing)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, RoomStatus::Finished { .. })
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomStatus::Waiting => write!(f, "waiting"),
            RoomStatus::Playing => write!(f, "playing"),
            RoomStatus::Finished { .. } => write!(f, "finished"),
        }
    }
}

/// A pressure-queue entry augmented with a freshly generated option set.
///
/// Options are regenerated on every broadcast and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureCard {
    pub term: String,
    pub definition: String,
    pub options: Vec<String>,
}

/// Per-recipient game view delivered after every mutating transition that
/// keeps the room in play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdate {
    pub my_pressure: Vec<PressureCard>,
    pub my_hand: Vec<WordEntry>,
    pub opponent_pressure_count: usize,
    pub pressure_limit: usize,
}
