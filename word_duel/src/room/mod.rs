//! Room module providing the per-room actor and the room registry.
//!
//! This module implements:
//! - `RoomActor`: async actor owning one room's state machine
//! - `RoomManager`: registry spawning actors and mapping codes to handles
//! - Message-based communication with tokio channels
//! - Room configuration and lifecycle management
//!
//! ## Architecture
//!
//! Each room runs in a separate tokio task with an mpsc message inbox, so
//! every mutating transition for a room - including its broadcast - completes
//! before the next one is accepted. Transitions for different rooms proceed
//! fully in parallel. The `RoomManager` generates collision-checked 4-digit
//! codes, spawns actors, and prunes rooms whose actors have stopped.

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{RoomActor, RoomHandle};
pub use config::RoomConfig;
pub use manager::RoomManager;
pub use messages::{RoomEvent, RoomMessage, RoomResponse, RoomStatusResponse};
