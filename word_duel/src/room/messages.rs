//! Room actor message types.

use crate::game::entities::{GameUpdate, PlayerId, RoomCode, WordEntry};
use crate::game::errors::GameError;
use tokio::sync::{mpsc, oneshot};

/// Messages that can be sent to a `RoomActor`.
#[derive(Debug)]
pub enum RoomMessage {
    /// Seat a guest in the room.
    Join {
        player: PlayerId,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Replace the room's word list.
    SetWordList {
        entries: Vec<WordEntry>,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Start the game. Only the host may do this.
    StartGame {
        player: PlayerId,
        response: oneshot::Sender<RoomResponse>,
    },

    /// Answer the active question. Failures are silent per the protocol, so
    /// there is no response channel; results arrive as subscription events.
    Answer {
        player: PlayerId,
        term: String,
        claimed_correct: bool,
    },

    /// Attack the opponent with a hand card. Silent on failure, like Answer.
    Attack {
        player: PlayerId,
        card_term: String,
    },

    /// Subscribe a player's event channel. A later subscription for the same
    /// player replaces the sender, re-binding the connection.
    Subscribe {
        player: PlayerId,
        sender: mpsc::Sender<RoomEvent>,
    },

    /// Unsubscribe a player's event channel.
    Unsubscribe { player: PlayerId },

    /// Get a snapshot of the room's status.
    GetStatus {
        response: oneshot::Sender<RoomStatusResponse>,
    },

    /// Shut the room down.
    Close {
        response: oneshot::Sender<RoomResponse>,
    },
}

/// Events fanned out to subscribed players.
///
/// `AnswerResult` and `GameUpdate` are per-recipient; the rest are room-wide.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// A guest joined the room.
    PlayerJoined { message: String },

    /// A word list was accepted for the room.
    WordListUploaded { count: usize },

    /// The game started.
    GameStarted { word_list_size: usize },

    /// Echo of an answer submission, sent only to the answering player.
    AnswerResult { correct: bool },

    /// Fresh per-recipient view after a state-mutating transition.
    GameUpdate(GameUpdate),

    /// Terminal event naming the winner.
    GameOver { winner: PlayerId },
}

/// Response from room operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomResponse {
    /// Operation succeeded.
    Success,

    /// Operation rejected without state change.
    Rejected(GameError),
}

impl RoomResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, RoomResponse::Success)
    }

    /// Unpack into a `Result` for callers that propagate errors.
    pub fn into_result(self) -> Result<(), GameError> {
        match self {
            RoomResponse::Success => Ok(()),
            RoomResponse::Rejected(e) => Err(e),
        }
    }
}

/// Room status snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomStatusResponse {
    pub code: RoomCode,

    /// Lifecycle status rendered as "waiting", "playing", or "finished".
    pub status: String,

    /// Players seated in the room (1 or 2).
    pub seat_count: usize,

    pub word_list_size: usize,

    /// Winner, once the room is finished.
    pub winner: Option<PlayerId>,
}
