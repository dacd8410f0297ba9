//! End-to-end duel flow through the room manager and actor subscriptions.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use word_duel::{
    GameUpdate, PlayerId, RoomConfig, RoomEvent, RoomManager, WordEntry,
};

async fn next_event(rx: &mut mpsc::Receiver<RoomEvent>) -> RoomEvent {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for room event")
        .expect("event channel closed")
}

/// Skip intermediate events until the next per-recipient view arrives.
async fn next_game_update(rx: &mut mpsc::Receiver<RoomEvent>) -> GameUpdate {
    loop {
        if let RoomEvent::GameUpdate(update) = next_event(rx).await {
            return update;
        }
    }
}

fn sample_word_list() -> Vec<WordEntry> {
    vec![
        WordEntry::new("A", "1"),
        WordEntry::new("B", "2"),
        WordEntry::new("C", "3"),
        WordEntry::new("D", "4"),
    ]
}

#[tokio::test]
async fn full_duel_runs_to_game_over() {
    let manager = RoomManager::new(RoomConfig::default());
    let host = PlayerId::new();
    let guest = PlayerId::new();

    let (host_tx, mut host_rx) = mpsc::channel(64);
    let (guest_tx, mut guest_rx) = mpsc::channel(64);

    // Host creates the room and subscribes; guest subscribes before joining
    // so the join broadcast is not missed.
    let code = manager.create_room(host).await.unwrap();
    manager.subscribe(&code, host, host_tx).await.unwrap();
    manager.subscribe(&code, guest, guest_tx).await.unwrap();
    manager.join_room(&code, guest).await.unwrap();

    assert!(matches!(
        next_event(&mut host_rx).await,
        RoomEvent::PlayerJoined { .. }
    ));
    assert!(matches!(
        next_event(&mut guest_rx).await,
        RoomEvent::PlayerJoined { .. }
    ));

    // Host uploads the word list; the room announces the accepted count.
    let count = manager
        .set_word_list(&code, sample_word_list())
        .await
        .unwrap();
    assert_eq!(count, 4);
    assert_eq!(
        next_event(&mut host_rx).await,
        RoomEvent::WordListUploaded { count: 4 }
    );
    assert_eq!(
        next_event(&mut guest_rx).await,
        RoomEvent::WordListUploaded { count: 4 }
    );

    // Host starts the game.
    manager.start_game(&code, host).await.unwrap();
    assert_eq!(
        next_event(&mut host_rx).await,
        RoomEvent::GameStarted { word_list_size: 4 }
    );
    assert_eq!(
        next_event(&mut guest_rx).await,
        RoomEvent::GameStarted { word_list_size: 4 }
    );

    let host_view = next_game_update(&mut host_rx).await;
    let guest_view = next_game_update(&mut guest_rx).await;

    for view in [&host_view, &guest_view] {
        assert_eq!(view.my_pressure.len(), 1);
        assert_eq!(view.my_hand.len(), 3);
        assert_eq!(view.pressure_limit, 10);

        let card = &view.my_pressure[0];
        assert_eq!(card.options.len(), 4);
        assert!(card.options.contains(&card.definition));
    }

    // Guest clears its seeded question.
    let term = guest_view.my_pressure[0].term.clone();
    manager.answer(&code, guest, term, true).await;

    assert_eq!(
        next_event(&mut guest_rx).await,
        RoomEvent::AnswerResult { correct: true }
    );
    let guest_view = next_game_update(&mut guest_rx).await;
    assert_eq!(guest_view.my_pressure.len(), 0);

    let host_view = next_game_update(&mut host_rx).await;
    assert_eq!(host_view.opponent_pressure_count, 0);

    // Spoofed events from a player with no state in the room are dropped.
    manager
        .answer(&code, PlayerId::new(), "A".to_string(), true)
        .await;

    // Host attacks ten times; the tenth overloads the guest's queue.
    let mut current = host_view;
    for round in 0..10 {
        let card = current.my_hand[0].term.clone();
        manager.attack(&code, host, card).await;

        if round < 9 {
            current = next_game_update(&mut host_rx).await;
            assert_eq!(current.my_hand.len(), 3);
            assert_eq!(current.opponent_pressure_count, round + 1);
        }
    }

    assert_eq!(
        next_event(&mut host_rx).await,
        RoomEvent::GameOver { winner: host }
    );
    // Guest sees intermediate views, then the same terminal event.
    loop {
        match next_event(&mut guest_rx).await {
            RoomEvent::GameOver { winner } => {
                assert_eq!(winner, host);
                break;
            }
            RoomEvent::GameUpdate(_) => {}
            other => panic!("unexpected event before game over: {other:?}"),
        }
    }

    // The room is terminal: further attacks mutate nothing.
    manager
        .attack(&code, host, current.my_hand[0].term.clone())
        .await;

    let status = manager.room_status(&code).await.unwrap();
    assert_eq!(status.status, "finished");
    assert_eq!(status.winner, Some(host));
}

#[tokio::test]
async fn late_word_list_is_rejected() {
    let manager = RoomManager::new(RoomConfig::default());
    let host = PlayerId::new();
    let guest = PlayerId::new();

    let code = manager.create_room(host).await.unwrap();
    manager.join_room(&code, guest).await.unwrap();
    manager
        .set_word_list(&code, sample_word_list())
        .await
        .unwrap();
    manager.start_game(&code, host).await.unwrap();

    let err = manager
        .set_word_list(&code, sample_word_list())
        .await
        .unwrap_err();
    assert_eq!(err, word_duel::GameError::GameInProgress);
}

#[tokio::test]
async fn resubscribing_rebinds_the_event_channel() {
    let manager = RoomManager::new(RoomConfig::default());
    let host = PlayerId::new();
    let guest = PlayerId::new();

    let code = manager.create_room(host).await.unwrap();

    // First channel is dropped, simulating a lost connection; a fresh
    // subscription for the same player takes over.
    let (stale_tx, stale_rx) = mpsc::channel(8);
    manager.subscribe(&code, host, stale_tx).await.unwrap();
    drop(stale_rx);

    let (host_tx, mut host_rx) = mpsc::channel(8);
    manager.subscribe(&code, host, host_tx).await.unwrap();

    manager.join_room(&code, guest).await.unwrap();
    assert!(matches!(
        next_event(&mut host_rx).await,
        RoomEvent::PlayerJoined { .. }
    ));
}
