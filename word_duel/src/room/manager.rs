//! Room manager for spawning rooms and mapping codes to handles.

use super::{
    actor::{RoomActor, RoomHandle},
    config::RoomConfig,
    messages::{RoomEvent, RoomMessage, RoomResponse, RoomStatusResponse},
};
use crate::game::{
    entities::{PlayerId, RoomCode, WordEntry},
    errors::GameError,
};
use rand::Rng;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{RwLock, oneshot};

/// Attempts at finding a free code before declaring the space exhausted.
/// Covers the 4-digit space with plenty of slack.
const CODE_ATTEMPTS: usize = 20_000;

/// Registry of live rooms.
///
/// Injected at process start rather than living as an ambient singleton, so
/// lifecycle (create, expire, close) stays explicit. The map itself is safe
/// for concurrent insert/lookup; per-room serialization is the actor's job.
pub struct RoomManager {
    /// Configuration applied to every spawned room.
    config: RoomConfig,

    /// Live room handles.
    rooms: Arc<RwLock<HashMap<RoomCode, RoomHandle>>>,
}

impl RoomManager {
    /// Create a new room manager.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            rooms: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create and spawn a new room with the caller as host.
    ///
    /// The code is drawn from the 4-digit space and collision-checked against
    /// live rooms; generation is bounded and fails with `CodeSpaceExhausted`
    /// rather than spinning when the space is full.
    pub async fn create_room(&self, host: PlayerId) -> Result<RoomCode, GameError> {
        let mut rooms = self.rooms.write().await;

        let code = generate_code(&rooms)?;
        let (actor, handle) = RoomActor::new(code.clone(), host, self.config.clone());
        rooms.insert(code.clone(), handle);
        drop(rooms);

        tokio::spawn(actor.run());

        log::info!("Created room {} hosted by {}", code, host);

        Ok(code)
    }

    /// Get a room handle.
    pub async fn get_room(&self, code: &RoomCode) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.get(code).cloned()
    }

    /// Seat a guest in a room.
    pub async fn join_room(&self, code: &RoomCode, player: PlayerId) -> Result<(), GameError> {
        let (tx, rx) = oneshot::channel();
        self.request(code, RoomMessage::Join {
            player,
            response: tx,
        })
        .await?;

        let response: RoomResponse = rx.await.map_err(|_| GameError::RoomNotFound)?;
        response.into_result()
    }

    /// Replace a room's word list, returning the accepted entry count.
    pub async fn set_word_list(
        &self,
        code: &RoomCode,
        entries: Vec<WordEntry>,
    ) -> Result<usize, GameError> {
        let count = entries.len();

        let (tx, rx) = oneshot::channel();
        self.request(code, RoomMessage::SetWordList {
            entries,
            response: tx,
        })
        .await?;

        let response: RoomResponse = rx.await.map_err(|_| GameError::RoomNotFound)?;
        response.into_result()?;
        Ok(count)
    }

    /// Start the game in a room.
    pub async fn start_game(&self, code: &RoomCode, player: PlayerId) -> Result<(), GameError> {
        let (tx, rx) = oneshot::channel();
        self.request(code, RoomMessage::StartGame {
            player,
            response: tx,
        })
        .await?;

        let response: RoomResponse = rx.await.map_err(|_| GameError::RoomNotFound)?;
        response.into_result()
    }

    /// Forward an answer. Events referencing an unknown room are no-ops.
    pub async fn answer(
        &self,
        code: &RoomCode,
        player: PlayerId,
        term: String,
        claimed_correct: bool,
    ) {
        if let Some(handle) = self.get_room(code).await {
            let _ = handle
                .send(RoomMessage::Answer {
                    player,
                    term,
                    claimed_correct,
                })
                .await;
        }
    }

    /// Forward an attack. Events referencing an unknown room are no-ops.
    pub async fn attack(&self, code: &RoomCode, player: PlayerId, card_term: String) {
        if let Some(handle) = self.get_room(code).await {
            let _ = handle.send(RoomMessage::Attack { player, card_term }).await;
        }
    }

    /// Subscribe a player's event channel to a room.
    pub async fn subscribe(
        &self,
        code: &RoomCode,
        player: PlayerId,
        sender: tokio::sync::mpsc::Sender<RoomEvent>,
    ) -> Result<(), GameError> {
        self.request(code, RoomMessage::Subscribe { player, sender })
            .await
    }

    /// Unsubscribe a player's event channel from a room.
    pub async fn unsubscribe(&self, code: &RoomCode, player: PlayerId) {
        if let Some(handle) = self.get_room(code).await {
            let _ = handle.send(RoomMessage::Unsubscribe { player }).await;
        }
    }

    /// Get a room's status snapshot.
    pub async fn room_status(&self, code: &RoomCode) -> Result<RoomStatusResponse, GameError> {
        let (tx, rx) = oneshot::channel();
        self.request(code, RoomMessage::GetStatus { response: tx })
            .await?;

        rx.await.map_err(|_| GameError::RoomNotFound)
    }

    /// Close a room and remove it from the registry.
    pub async fn close_room(&self, code: &RoomCode) -> Result<(), GameError> {
        let handle = self.get_room(code).await.ok_or(GameError::RoomNotFound)?;

        let (tx, rx) = oneshot::channel();
        if handle
            .send(RoomMessage::Close { response: tx })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }

        self.remove_room(code).await;
        log::info!("Closed room {}", code);
        Ok(())
    }

    /// Get the number of live rooms.
    pub async fn active_room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }

    /// Send a message to a room, pruning the entry if its actor has stopped.
    async fn request(&self, code: &RoomCode, message: RoomMessage) -> Result<(), GameError> {
        let handle = self.get_room(code).await.ok_or(GameError::RoomNotFound)?;

        if handle.send(message).await.is_err() {
            // The actor expired between lookup and send.
            self.remove_room(code).await;
            return Err(GameError::RoomNotFound);
        }

        Ok(())
    }

    async fn remove_room(&self, code: &RoomCode) {
        let mut rooms = self.rooms.write().await;
        rooms.remove(code);
    }
}

/// Draw a collision-free code from the 4-digit space.
fn generate_code(live: &HashMap<RoomCode, RoomHandle>) -> Result<RoomCode, GameError> {
    let mut rng = rand::rng();

    for _ in 0..CODE_ATTEMPTS {
        let code = RoomCode::from_number(rng.random_range(1000..10_000));
        if !live.contains_key(&code) {
            return Ok(code);
        }
    }

    Err(GameError::CodeSpaceExhausted)
}
