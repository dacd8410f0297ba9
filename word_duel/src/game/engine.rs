//! Room state machine and view shaping.
//!
//! [`RoomState`] is the transactional unit of the game: it owns both players'
//! state and the word list, and every mutating transition goes through it.
//! The engine is pure and synchronous; callers supply the RNG, which keeps
//! transitions deterministic under test and free of I/O.

use super::{
    entities::{GameUpdate, PlayerId, PlayerState, PressureCard, RoomCode, RoomStatus, WordEntry},
    errors::{GameError, StartRejection},
};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::{HashMap, HashSet};

/// Game rule knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    /// Pressure queue length that loses the game.
    pub pressure_limit: usize,

    /// Hand size at game start, maintained 1-for-1 after each attack.
    pub hand_size: usize,

    /// Pressure entries seeded per player at game start.
    pub initial_pressure: usize,

    /// Distinct definitions per option set (correct one included).
    pub option_count: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            pressure_limit: 10,
            hand_size: 3,
            initial_pressure: 1,
            option_count: 4,
        }
    }
}

impl GameRules {
    /// Validate rule configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.pressure_limit == 0 {
            return Err("Pressure limit must be greater than 0".to_string());
        }

        if self.hand_size == 0 {
            return Err("Hand size must be greater than 0".to_string());
        }

        if self.initial_pressure > self.pressure_limit {
            return Err("Initial pressure cannot exceed the pressure limit".to_string());
        }

        if self.option_count < 2 {
            return Err("Option count must be at least 2".to_string());
        }

        Ok(())
    }
}

/// Result of an answer transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Answer accepted; `correct` echoes the caller's claim.
    Applied { correct: bool },
    /// Event referenced a non-playing room or an unknown player; dropped.
    Ignored,
}

/// Result of an attack transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// Card moved to the opponent's pressure queue, hand refilled.
    Applied,
    /// The attack pushed the opponent past the pressure limit.
    Won { winner: PlayerId },
    /// No matching card, non-playing room, or unknown player; dropped.
    Ignored,
}

/// Aggregate state of one room: both players, the word list, and the status.
#[derive(Debug, Clone)]
pub struct RoomState {
    code: RoomCode,
    rules: GameRules,
    host: PlayerId,
    guest: Option<PlayerId>,
    word_list: Vec<WordEntry>,
    players: HashMap<PlayerId, PlayerState>,
    status: RoomStatus,
}

impl RoomState {
    /// Create a fresh room in the waiting state with the caller as host.
    pub fn new(code: RoomCode, host: PlayerId, rules: GameRules) -> Self {
        Self {
            code,
            rules,
            host,
            guest: None,
            word_list: Vec::new(),
            players: HashMap::new(),
            status: RoomStatus::Waiting,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn host(&self) -> PlayerId {
        self.host
    }

    pub fn guest(&self) -> Option<PlayerId> {
        self.guest
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn word_list_len(&self) -> usize {
        self.word_list.len()
    }

    /// Players that currently hold game state.
    pub fn participants(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    /// Number of players seated in the room (host plus optional guest).
    pub fn seat_count(&self) -> usize {
        1 + usize::from(self.guest.is_some())
    }

    fn opponent_of(&self, id: PlayerId) -> Option<PlayerId> {
        if id == self.host {
            self.guest
        } else if Some(id) == self.guest {
            Some(self.host)
        } else {
            None
        }
    }

    /// Seat a guest. Only valid while waiting with the guest seat empty.
    pub fn join(&mut self, player: PlayerId) -> Result<(), GameError> {
        if self.status != RoomStatus::Waiting {
            return Err(GameError::AlreadyPlaying);
        }

        // The host cannot take the guest seat.
        if self.guest.is_some() || player == self.host {
            return Err(GameError::RoomFull);
        }

        self.guest = Some(player);
        Ok(())
    }

    /// Replace the room's word list.
    ///
    /// A list arriving once the game has started is rejected rather than
    /// silently swapped under an in-flight game.
    pub fn set_word_list(&mut self, entries: Vec<WordEntry>) -> Result<usize, GameError> {
        if self.status != RoomStatus::Waiting {
            return Err(GameError::GameInProgress);
        }

        let count = entries.len();
        self.word_list = entries;
        Ok(count)
    }

    /// Start the game: seed both players with the initial pressure entry and
    /// a full hand, all drawn uniformly from the word list.
    pub fn start(&mut self, caller: PlayerId, rng: &mut impl Rng) -> Result<(), GameError> {
        if self.status != RoomStatus::Waiting {
            return Err(GameError::AlreadyPlaying);
        }

        if caller != self.host {
            return Err(GameError::InvalidStart(StartRejection::NotHost));
        }

        let Some(guest) = self.guest else {
            return Err(GameError::InvalidStart(StartRejection::MissingGuest));
        };

        if self.word_list.is_empty() {
            return Err(GameError::InvalidStart(StartRejection::EmptyWordList));
        }

        for id in [self.host, guest] {
            let mut state = PlayerState::default();
            for _ in 0..self.rules.initial_pressure {
                state.pressure.push_back(self.draw(rng));
            }
            for _ in 0..self.rules.hand_size {
                state.hand.push(self.draw(rng));
            }
            self.players.insert(id, state);
        }

        self.status = RoomStatus::Playing;
        Ok(())
    }

    /// Apply an answer.
    ///
    /// Correctness is caller-asserted: if the claim is correct, the first
    /// pressure entry whose term matches is removed (no match is a no-op);
    /// a wrong claim leaves the queue untouched.
    pub fn answer(&mut self, caller: PlayerId, term: &str, claimed_correct: bool) -> AnswerOutcome {
        if self.status != RoomStatus::Playing {
            return AnswerOutcome::Ignored;
        }

        let Some(state) = self.players.get_mut(&caller) else {
            return AnswerOutcome::Ignored;
        };

        if claimed_correct
            && let Some(idx) = state.pressure.iter().position(|e| e.term == term)
        {
            state.pressure.remove(idx);
        }

        AnswerOutcome::Applied {
            correct: claimed_correct,
        }
    }

    /// Apply an attack: move the named card from the caller's hand to the
    /// back of the opponent's pressure queue and draw a replacement.
    pub fn attack(
        &mut self,
        caller: PlayerId,
        card_term: &str,
        rng: &mut impl Rng,
    ) -> AttackOutcome {
        if self.status != RoomStatus::Playing {
            return AttackOutcome::Ignored;
        }

        let Some(opponent) = self.opponent_of(caller) else {
            return AttackOutcome::Ignored;
        };

        if !self.players.contains_key(&caller) || !self.players.contains_key(&opponent) {
            return AttackOutcome::Ignored;
        }

        let card = {
            let Some(state) = self.players.get_mut(&caller) else {
                return AttackOutcome::Ignored;
            };

            let Some(idx) = state.hand.iter().position(|c| c.term == card_term) else {
                return AttackOutcome::Ignored;
            };

            state.hand.remove(idx)
        };

        let refill = self.draw(rng);
        let pressure_limit = self.rules.pressure_limit;

        let opponent_pressure = {
            // Both lookups verified above; fall back to an untouched queue
            // rather than panicking if an invariant ever breaks.
            let Some(opponent_state) = self.players.get_mut(&opponent) else {
                return AttackOutcome::Ignored;
            };
            opponent_state.pressure.push_back(card);
            opponent_state.pressure.len()
        };

        if let Some(state) = self.players.get_mut(&caller) {
            state.hand.push(refill);
        }

        if opponent_pressure >= pressure_limit {
            self.status = RoomStatus::Finished { winner: caller };
            AttackOutcome::Won { winner: caller }
        } else {
            AttackOutcome::Applied
        }
    }

    /// Build the per-recipient view with freshly generated option sets.
    pub fn player_view(
        &self,
        player: PlayerId,
        rng: &mut impl Rng,
    ) -> Result<GameUpdate, GameError> {
        let state = self.players.get(&player).ok_or(GameError::NotInRoom)?;

        let opponent_pressure_count = self
            .opponent_of(player)
            .and_then(|id| self.players.get(&id))
            .map(|s| s.pressure.len())
            .unwrap_or(0);

        let my_pressure = state
            .pressure
            .iter()
            .map(|entry| {
                Ok(PressureCard {
                    term: entry.term.clone(),
                    definition: entry.definition.clone(),
                    options: self.options_for(entry, rng)?,
                })
            })
            .collect::<Result<Vec<_>, GameError>>()?;

        Ok(GameUpdate {
            my_pressure,
            my_hand: state.hand.clone(),
            opponent_pressure_count,
            pressure_limit: self.rules.pressure_limit,
        })
    }

    /// Generate a randomly ordered option set for one pressure entry: its
    /// correct definition plus `option_count - 1` distinct decoys.
    ///
    /// Distinct definitions are collected up front so the sampling is bounded;
    /// a word list without enough of them fails fast instead of spinning.
    pub fn options_for(
        &self,
        entry: &WordEntry,
        rng: &mut impl Rng,
    ) -> Result<Vec<String>, GameError> {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(entry.definition.as_str());

        let mut decoys: Vec<&str> = Vec::new();
        for e in &self.word_list {
            if seen.insert(e.definition.as_str()) {
                decoys.push(e.definition.as_str());
            }
        }

        let needed = self.rules.option_count;
        if decoys.len() + 1 < needed {
            return Err(GameError::InsufficientWordList {
                needed,
                found: decoys.len() + 1,
            });
        }

        let mut options: Vec<String> = decoys
            .choose_multiple(rng, needed - 1)
            .map(|d| (*d).to_string())
            .collect();
        options.push(entry.definition.clone());
        options.shuffle(rng);

        Ok(options)
    }

    /// Uniform draw from the word list.
    ///
    /// Only called while the word list is non-empty: `start` checks it, and
    /// the list cannot be replaced once the game is playing.
    fn draw(&self, rng: &mut impl Rng) -> WordEntry {
        let idx = rng.random_range(0..self.word_list.len());
        self.word_list[idx].clone()
    }
}
