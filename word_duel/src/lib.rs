//! # Word Duel
//!
//! A real-time two-player matching-card duel. Players share a 4-digit room
//! code, answer vocabulary questions drawn from an uploaded word list, and
//! attack each other with cards from a replenishing hand, racing to overload
//! the opponent's pressure queue.
//!
//! ## Architecture
//!
//! The game core is a pure, synchronous state machine ([`RoomState`]) wrapped
//! in an async actor ([`room::RoomActor`]) so that all mutating transitions
//! for a room are serialized through one inbox. Rooms are spawned and looked
//! up through [`room::RoomManager`], which owns the code → room mapping.
//!
//! A room moves through three states:
//!
//! - **Waiting**: host only, or host plus guest; the word list may be empty
//! - **Playing**: both seats filled, each player holding a pressure queue and
//!   a hand of attack cards
//! - **Finished**: some player's pressure queue reached the limit; terminal
//!
//! ## Core Modules
//!
//! - [`game`]: entities, the session engine, and the error taxonomy
//! - [`room`]: per-room actor, room manager, and message protocol

/// Core game logic: entities, session engine, and errors.
pub mod game;
pub use game::{
    engine::{AnswerOutcome, AttackOutcome, GameRules, RoomState},
    entities::{GameUpdate, PlayerId, PlayerState, PressureCard, RoomCode, RoomStatus, WordEntry},
    errors::{GameError, StartRejection},
};

/// Room actor, manager, and message protocol.
pub mod room;
pub use room::{
    actor::{RoomActor, RoomHandle},
    config::RoomConfig,
    manager::RoomManager,
    messages::{RoomEvent, RoomMessage, RoomResponse, RoomStatusResponse},
};
