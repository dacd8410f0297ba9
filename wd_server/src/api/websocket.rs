//! WebSocket handler for the duel protocol.
//!
//! Each connection is assigned a fresh player identity on upgrade. Commands
//! name the room they act on; room lookups and all state mutation happen in
//! the room actors, with this module translating between the JSON protocol
//! and the actor messages.
//!
//! # Client Messages
//!
//! ```json
//! {"type": "create_room"}
//! {"type": "join_room", "roomCode": "1234"}
//! {"type": "start_game", "roomCode": "1234"}
//! {"type": "answer_question", "roomCode": "1234", "word": "apple", "isCorrect": true}
//! {"type": "attack", "roomCode": "1234", "cardWord": "apple"}
//! ```
//!
//! # Server Messages
//!
//! Direct responses (`room_created`, `error`) answer the triggering command;
//! everything else (`player_joined`, `game_started`, `game_update`,
//! `answer_result`, `game_over`, `word_list_uploaded`) arrives through the
//! room subscription after a committed transition.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use word_duel::{GameUpdate, PlayerId, RoomCode, RoomEvent};

use super::AppState;

/// Client messages received via WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
enum ClientMessage {
    /// Create a room; the caller becomes its host.
    CreateRoom,
    /// Join an existing room as the guest.
    JoinRoom { room_code: String },
    /// Start the game (host only).
    StartGame { room_code: String },
    /// Answer the active question. Correctness is caller-asserted.
    AnswerQuestion {
        room_code: String,
        word: String,
        is_correct: bool,
    },
    /// Attack the opponent with a hand card.
    Attack { room_code: String, card_word: String },
}

/// Messages sent to the client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
enum ServerMessage {
    RoomCreated { room_code: String },
    PlayerJoined { message: String },
    WordListUploaded { count: usize },
    GameStarted { word_list_size: usize },
    AnswerResult { correct: bool },
    GameUpdate(GameUpdate),
    GameOver { winner: PlayerId },
    Error { message: String },
}

impl From<RoomEvent> for ServerMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::PlayerJoined { message } => ServerMessage::PlayerJoined { message },
            RoomEvent::WordListUploaded { count } => ServerMessage::WordListUploaded { count },
            RoomEvent::GameStarted { word_list_size } => {
                ServerMessage::GameStarted { word_list_size }
            }
            RoomEvent::AnswerResult { correct } => ServerMessage::AnswerResult { correct },
            RoomEvent::GameUpdate(update) => ServerMessage::GameUpdate(update),
            RoomEvent::GameOver { winner } => ServerMessage::GameOver { winner },
        }
    }
}

/// Upgrade the HTTP connection to a WebSocket for duel communication.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
///
/// Spawns a send task draining room events and direct responses into the
/// socket, then processes inbound commands until disconnect. On disconnect
/// the player's room subscriptions are dropped; room state itself is left to
/// the room's idle expiry.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let player = PlayerId::new();
    let (mut sender, mut receiver) = socket.split();

    info!("WebSocket connected: player={}", player);

    // Room events fan in here from subscribed room actors.
    let (event_tx, mut event_rx) = mpsc::channel::<RoomEvent>(64);

    // Direct responses from the command handler.
    let (response_tx, mut response_rx) = mpsc::channel::<ServerMessage>(32);

    let send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                Some(event) = event_rx.recv() => ServerMessage::from(event),
                Some(response) = response_rx.recv() => response,
                else => break,
            };

            let json = match serde_json::to_string(&message) {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize server message: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Rooms this connection subscribed to, for cleanup on disconnect.
    let mut subscribed: Vec<RoomCode> = Vec::new();

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        handle_client_message(client_msg, player, &event_tx, &mut subscribed, &state)
                            .await
                    }
                    Err(e) => {
                        warn!("Failed to parse client message: {}", e);
                        Some(ServerMessage::Error {
                            message: "Invalid message format".to_string(),
                        })
                    }
                };

                if let Some(response) = response
                    && response_tx.send(response).await.is_err()
                {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: player={}", player);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();

    for code in subscribed {
        state.room_manager.unsubscribe(&code, player).await;
    }

    info!("WebSocket disconnected: player={}", player);
}

/// Process one client command.
///
/// Returns a direct response where the protocol defines one; `None` when the
/// outcome is delivered through room events, or when the command is dropped
/// silently (answer/attack against an unknown room or without membership).
async fn handle_client_message(
    msg: ClientMessage,
    player: PlayerId,
    event_tx: &mpsc::Sender<RoomEvent>,
    subscribed: &mut Vec<RoomCode>,
    state: &AppState,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::CreateRoom => match state.room_manager.create_room(player).await {
            Ok(code) => {
                if let Err(e) = state
                    .room_manager
                    .subscribe(&code, player, event_tx.clone())
                    .await
                {
                    return Some(ServerMessage::Error {
                        message: e.to_string(),
                    });
                }
                subscribed.push(code.clone());
                Some(ServerMessage::RoomCreated {
                    room_code: code.to_string(),
                })
            }
            Err(e) => Some(ServerMessage::Error {
                message: e.to_string(),
            }),
        },

        ClientMessage::JoinRoom { room_code } => {
            let Some(code) = RoomCode::parse(&room_code) else {
                return Some(ServerMessage::Error {
                    message: "Room not found or full".to_string(),
                });
            };

            let was_subscribed = subscribed.contains(&code);

            // Subscribe before joining so the join broadcast is not missed.
            if let Err(e) = state
                .room_manager
                .subscribe(&code, player, event_tx.clone())
                .await
            {
                return Some(ServerMessage::Error {
                    message: e.to_string(),
                });
            }

            match state.room_manager.join_room(&code, player).await {
                Ok(()) => {
                    if !was_subscribed {
                        subscribed.push(code);
                    }
                    None
                }
                Err(e) => {
                    // Roll back only a subscription this command created; a
                    // rejected re-join must not sever an existing stream.
                    if !was_subscribed {
                        state.room_manager.unsubscribe(&code, player).await;
                    }
                    Some(ServerMessage::Error {
                        message: e.to_string(),
                    })
                }
            }
        }

        ClientMessage::StartGame { room_code } => {
            let Some(code) = RoomCode::parse(&room_code) else {
                return Some(ServerMessage::Error {
                    message: "Room not found".to_string(),
                });
            };

            match state.room_manager.start_game(&code, player).await {
                Ok(()) => None,
                Err(e) => Some(ServerMessage::Error {
                    message: e.to_string(),
                }),
            }
        }

        ClientMessage::AnswerQuestion {
            room_code,
            word,
            is_correct,
        } => {
            // Malformed or spoofed events fail closed without feedback.
            if let Some(code) = RoomCode::parse(&room_code) {
                state.room_manager.answer(&code, player, word, is_correct).await;
            }
            None
        }

        ClientMessage::Attack {
            room_code,
            card_word,
        } => {
            if let Some(code) = RoomCode::parse(&room_code) {
                state.room_manager.attack(&code, player, card_word).await;
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use word_duel::{RoomConfig, RoomManager, WordEntry};

    async fn next_event(rx: &mut mpsc::Receiver<RoomEvent>) -> RoomEvent {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for room event")
            .expect("event channel closed")
    }

    #[tokio::test]
    async fn rejected_rejoin_keeps_the_event_stream() {
        let state = AppState {
            room_manager: Arc::new(RoomManager::new(RoomConfig::default())),
        };
        let host = PlayerId::new();
        let guest = PlayerId::new();
        let code = state.room_manager.create_room(host).await.unwrap();

        let (event_tx, mut event_rx) = mpsc::channel(8);
        let mut subscribed = Vec::new();

        let join = ClientMessage::JoinRoom {
            room_code: code.to_string(),
        };
        let response = handle_client_message(join, guest, &event_tx, &mut subscribed, &state).await;
        assert!(response.is_none());
        assert!(matches!(
            next_event(&mut event_rx).await,
            RoomEvent::PlayerJoined { .. }
        ));

        // A duplicate join bounces off the full room but must not sever the
        // subscription the first join created.
        let rejoin = ClientMessage::JoinRoom {
            room_code: code.to_string(),
        };
        let response =
            handle_client_message(rejoin, guest, &event_tx, &mut subscribed, &state).await;
        assert!(matches!(response, Some(ServerMessage::Error { .. })));
        assert_eq!(subscribed.len(), 1);

        state
            .room_manager
            .set_word_list(&code, vec![WordEntry::new("apple", "a fruit")])
            .await
            .unwrap();
        assert_eq!(
            next_event(&mut event_rx).await,
            RoomEvent::WordListUploaded { count: 1 }
        );
    }

    #[test]
    fn client_messages_deserialize_from_protocol_json() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"create_room"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::CreateRoom));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"join_room","roomCode":"1234"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::JoinRoom { room_code } if room_code == "1234"));

        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"answer_question","roomCode":"1234","word":"apple","isCorrect":true}"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            ClientMessage::AnswerQuestion { is_correct: true, .. }
        ));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"attack","roomCode":"1234","cardWord":"apple"}"#)
                .unwrap();
        assert!(matches!(msg, ClientMessage::Attack { card_word, .. } if card_word == "apple"));
    }

    #[test]
    fn server_messages_serialize_with_protocol_tags() {
        let json = serde_json::to_value(ServerMessage::RoomCreated {
            room_code: "1234".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "room_created");
        assert_eq!(json["roomCode"], "1234");

        let json = serde_json::to_value(ServerMessage::GameStarted { word_list_size: 12 }).unwrap();
        assert_eq!(json["type"], "game_started");
        assert_eq!(json["wordListSize"], 12);

        let json = serde_json::to_value(ServerMessage::GameUpdate(GameUpdate {
            my_pressure: vec![],
            my_hand: vec![],
            opponent_pressure_count: 3,
            pressure_limit: 10,
        }))
        .unwrap();
        assert_eq!(json["type"], "game_update");
        assert_eq!(json["opponentPressureCount"], 3);
        assert_eq!(json["pressureLimit"], 10);

        let winner = PlayerId::new();
        let json = serde_json::to_value(ServerMessage::GameOver { winner }).unwrap();
        assert_eq!(json["type"], "game_over");
        assert_eq!(json["winner"], serde_json::to_value(winner).unwrap());
    }
}
