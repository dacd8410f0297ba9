//! Room actor implementation with async message handling.

use super::{
    config::RoomConfig,
    messages::{RoomEvent, RoomMessage, RoomResponse, RoomStatusResponse},
};
use crate::game::{
    engine::{AnswerOutcome, AttackOutcome, RoomState},
    entities::{PlayerId, RoomCode, RoomStatus},
    errors::GameError,
};
use rand::{SeedableRng, rngs::StdRng};
use std::collections::HashMap;
use tokio::{
    sync::mpsc,
    time::{Duration, Instant, interval},
};

/// Room actor handle for sending messages.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    code: RoomCode,
}

impl RoomHandle {
    /// Create a new room handle.
    pub fn new(sender: mpsc::Sender<RoomMessage>, code: RoomCode) -> Self {
        Self { sender, code }
    }

    /// Get the room code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Send a message to the room. A closed room is indistinguishable from an
    /// absent one, so send failures surface as `RoomNotFound`.
    pub async fn send(&self, message: RoomMessage) -> Result<(), GameError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| GameError::RoomNotFound)
    }
}

/// Room actor managing a single duel room.
///
/// All mutating transitions for the room are serialized through the inbox:
/// one event is processed to completion - broadcast included - before the
/// next is accepted. Broadcast delivery is fire-and-forget and never rolls
/// back a committed transition.
pub struct RoomActor {
    /// Room state machine.
    state: RoomState,

    /// Lifecycle configuration.
    config: RoomConfig,

    /// Message inbox.
    inbox: mpsc::Receiver<RoomMessage>,

    /// Subscribers for event fan-out, keyed by player identity.
    subscribers: HashMap<PlayerId, mpsc::Sender<RoomEvent>>,

    /// RNG for draws and option shuffling.
    rng: StdRng,

    /// Last inbound activity, for idle expiry.
    last_activity: Instant,

    /// Set once the room should shut down.
    is_closed: bool,
}

impl RoomActor {
    /// Create a new room actor with the caller as host.
    ///
    /// Returns the actor and a handle for sending messages; the caller is
    /// responsible for spawning `run`.
    pub fn new(code: RoomCode, host: PlayerId, config: RoomConfig) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(64);

        let actor = Self {
            state: RoomState::new(code.clone(), host, config.rules),
            config,
            inbox,
            subscribers: HashMap::new(),
            rng: StdRng::from_os_rng(),
            last_activity: Instant::now(),
            is_closed: false,
        };

        let handle = RoomHandle::new(sender, code);

        (actor, handle)
    }

    /// Run the room actor event loop.
    pub async fn run(mut self) {
        log::info!("Room {} opened", self.state.code());

        let mut sweep = interval(Duration::from_secs(5));

        loop {
            tokio::select! {
                Some(message) = self.inbox.recv() => {
                    self.last_activity = Instant::now();
                    self.handle_message(message);

                    if self.is_closed {
                        break;
                    }
                }

                _ = sweep.tick() => {
                    if self.expired() {
                        break;
                    }
                }
            }
        }

        log::info!("Room {} closed", self.state.code());
    }

    /// Whether the room has outlived its idle timeout or finished linger.
    fn expired(&self) -> bool {
        let idle = self.last_activity.elapsed();

        if self.state.status().is_finished() {
            return idle >= self.config.finished_linger;
        }

        idle >= self.config.idle_timeout
    }

    fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Join { player, response } => {
                let result = self.state.join(player);
                if result.is_ok() {
                    log::info!("Player {} joined room {}", player, self.state.code());
                    self.broadcast(RoomEvent::PlayerJoined {
                        message: "Guest joined!".to_string(),
                    });
                }
                let _ = response.send(to_response(result));
            }

            RoomMessage::SetWordList { entries, response } => {
                let result = self.state.set_word_list(entries);
                match result {
                    Ok(count) => {
                        log::info!(
                            "Room {} accepted a word list of {} entries",
                            self.state.code(),
                            count
                        );
                        self.broadcast(RoomEvent::WordListUploaded { count });
                        let _ = response.send(RoomResponse::Success);
                    }
                    Err(e) => {
                        let _ = response.send(RoomResponse::Rejected(e));
                    }
                }
            }

            RoomMessage::StartGame { player, response } => {
                let result = self.state.start(player, &mut self.rng);
                if result.is_ok() {
                    log::info!("Game started in room {}", self.state.code());
                    self.broadcast(RoomEvent::GameStarted {
                        word_list_size: self.state.word_list_len(),
                    });
                    self.push_views();
                }
                let _ = response.send(to_response(result));
            }

            RoomMessage::Answer {
                player,
                term,
                claimed_correct,
            } => match self.state.answer(player, &term, claimed_correct) {
                AnswerOutcome::Applied { correct } => {
                    self.send_to(player, RoomEvent::AnswerResult { correct });
                    self.push_views();
                }
                AnswerOutcome::Ignored => {
                    log::debug!(
                        "Dropped answer from {} in room {}",
                        player,
                        self.state.code()
                    );
                }
            },

            RoomMessage::Attack { player, card_term } => {
                match self.state.attack(player, &card_term, &mut self.rng) {
                    AttackOutcome::Applied => {
                        self.push_views();
                    }
                    AttackOutcome::Won { winner } => {
                        log::info!("Room {} won by {}", self.state.code(), winner);
                        self.broadcast(RoomEvent::GameOver { winner });
                    }
                    AttackOutcome::Ignored => {
                        log::debug!(
                            "Dropped attack from {} in room {}",
                            player,
                            self.state.code()
                        );
                    }
                }
            }

            RoomMessage::Subscribe { player, sender } => {
                self.subscribers.insert(player, sender);
                log::debug!(
                    "Player {} subscribed to room {} events",
                    player,
                    self.state.code()
                );
            }

            RoomMessage::Unsubscribe { player } => {
                self.subscribers.remove(&player);
                log::debug!(
                    "Player {} unsubscribed from room {} events",
                    player,
                    self.state.code()
                );
            }

            RoomMessage::GetStatus { response } => {
                let status = self.state.status();
                let winner = match status {
                    RoomStatus::Finished { winner } => Some(winner),
                    _ => None,
                };
                let _ = response.send(RoomStatusResponse {
                    code: self.state.code().clone(),
                    status: status.to_string(),
                    seat_count: self.state.seat_count(),
                    word_list_size: self.state.word_list_len(),
                    winner,
                });
            }

            RoomMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(RoomResponse::Success);
            }
        }
    }

    /// Deliver fresh per-recipient views to every participant.
    fn push_views(&mut self) {
        for player in self.state.participants() {
            match self.state.player_view(player, &mut self.rng) {
                Ok(view) => self.send_to(player, RoomEvent::GameUpdate(view)),
                Err(e) => {
                    log::warn!(
                        "Failed to build view for {} in room {}: {}",
                        player,
                        self.state.code(),
                        e
                    );
                }
            }
        }
    }

    /// Fan an event out to all subscribers, pruning disconnected ones.
    fn broadcast(&mut self, event: RoomEvent) {
        self.subscribers.retain(|player, sender| {
            match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    // Keep the subscriber but drop this event.
                    log::warn!("Subscriber {} channel full, dropping event", player);
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", player);
                    false
                }
            }
        });
    }

    /// Deliver an event to one subscriber, pruning it if disconnected.
    fn send_to(&mut self, player: PlayerId, event: RoomEvent) {
        if let Some(sender) = self.subscribers.get(&player)
            && matches!(
                sender.try_send(event),
                Err(mpsc::error::TrySendError::Closed(_))
            )
        {
            self.subscribers.remove(&player);
        }
    }
}

fn to_response(result: Result<(), GameError>) -> RoomResponse {
    match result {
        Ok(()) => RoomResponse::Success,
        Err(e) => RoomResponse::Rejected(e),
    }
}
