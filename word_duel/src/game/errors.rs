//! Game error taxonomy.
//!
//! Every variant is a non-fatal rejection surfaced to the triggering caller;
//! none of them crash a room or the registry, and no rejected transition is
//! partially applied.

use thiserror::Error;

/// Errors raised by room and game transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("room not found")]
    RoomNotFound,

    #[error("room is full")]
    RoomFull,

    #[error("game already started")]
    AlreadyPlaying,

    #[error("cannot start game: {0}")]
    InvalidStart(StartRejection),

    #[error("word list cannot be replaced once the game has started")]
    GameInProgress,

    #[error("word list needs at least {needed} distinct definitions, found {found}")]
    InsufficientWordList { needed: usize, found: usize },

    #[error("room code space exhausted")]
    CodeSpaceExhausted,

    #[error("player is not part of this room")]
    NotInRoom,
}

/// Reasons a `start_game` request is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartRejection {
    #[error("only the host can start the game")]
    NotHost,

    #[error("waiting for a second player to join")]
    MissingGuest,

    #[error("word list is empty")]
    EmptyWordList,
}
