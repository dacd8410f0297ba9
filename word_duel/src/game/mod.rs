//! Word duel game engine - entities, state machine, and errors.
//!
//! This module provides the synchronous game core:
//! - Entities: word entries, player state, room codes, and statuses
//! - [`engine::RoomState`]: the per-room state machine applying all
//!   transitions (join, word list, start, answer, attack)
//! - Per-player view shaping with fresh multiple-choice option sets

pub mod engine;
pub mod entities;
pub mod errors;

pub use engine::{AnswerOutcome, AttackOutcome, GameRules, RoomState};
pub use entities::{
    GameUpdate, PlayerId, PlayerState, PressureCard, RoomCode, RoomStatus, WordEntry,
};
pub use errors::{GameError, StartRejection};
