use std::time::Duration;

use serde_json::json;
use tokio::sync::broadcast;

use geoquiz::{
    catalog::Catalog,
    playable::PlayableSet,
    runtime::{
        events::QuizEvent,
        handle::{spawn_session, spawn_session_loading, GuessFeedback, SessionConfig, SessionStatus},
    },
    types::{Feedback, Phase, QuizMode},
    world::{geometry::ConcatUnion, regions::RegionCollection, topology::WorldTopology},
};

fn playable(ids: &[u32]) -> PlayableSet {
    let geometries: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| json!({ "type": "Polygon", "id": id.to_string(), "arcs": [[0]] }))
        .collect();
    let topo = WorldTopology::from_value(json!({
        "objects": { "countries": { "geometries": geometries } }
    }));
    let regions = RegionCollection::from_topology(&topo, &ConcatUnion);
    PlayableSet::build(&regions, &Catalog::bundled().expect("bundled catalog"))
}

fn fast_config(mode: QuizMode) -> SessionConfig {
    SessionConfig {
        mode,
        advance_delay_ms: 10,
        retry_delay_ms: 10,
        reveal_delay_ms: 20,
        ..SessionConfig::default()
    }
}

async fn wait_for(
    sub: &mut broadcast::Receiver<QuizEvent>,
    mut pred: impl FnMut(&QuizEvent) -> bool,
) -> QuizEvent {
    for _ in 0..32 {
        let event = tokio::time::timeout(Duration::from_secs(5), sub.recv())
            .await
            .expect("event timeout")
            .expect("recv");
        if pred(&event) {
            return event;
        }
    }
    panic!("expected event not observed");
}

#[tokio::test]
async fn wrong_then_correct_guess_emits_ordered_events() {
    let handle = spawn_session(playable(&[410, 392, 156]), fast_config(QuizMode::FlagSelect));
    let mut sub = handle.subscribe();

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.status, SessionStatus::Ready);
    assert_eq!(snapshot.total, 3);
    let target = snapshot.target.expect("target").id;

    let feedback = handle.guess(999).await.expect("guess");
    assert_eq!(feedback, GuessFeedback::Wrong { attempts_left: 2 });
    wait_for(&mut sub, |e| matches!(e, QuizEvent::GuessWrong { id: 999, .. })).await;
    wait_for(&mut sub, |e| matches!(e, QuizEvent::FeedbackCleared)).await;

    let feedback = handle.guess(target).await.expect("guess");
    assert_eq!(feedback, GuessFeedback::Correct);
    wait_for(&mut sub, |e| matches!(e, QuizEvent::GuessCorrect { id } if *id == target)).await;
    wait_for(
        &mut sub,
        |e| matches!(e, QuizEvent::TargetChanged { id } if *id != target),
    )
    .await;

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.solved, 1);
    assert_eq!(snapshot.feedback, Feedback::Idle);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn reset_racing_a_pending_feedback_timer_leaves_state_consistent() {
    let mut cfg = fast_config(QuizMode::FlagSelect);
    cfg.retry_delay_ms = 60;
    let handle = spawn_session(playable(&[410, 392]), cfg);

    let feedback = handle.guess(999).await.expect("guess");
    assert!(matches!(feedback, GuessFeedback::Wrong { .. }));

    // Reset before the feedback-clear timer fires.
    handle.reset().await.expect("reset");
    tokio::time::sleep(Duration::from_millis(120)).await;

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.feedback, Feedback::Idle);
    assert_eq!(snapshot.attempts, 0);
    assert!(snapshot.guessed.is_empty());
    assert_eq!(snapshot.phase, Phase::InProgress);
    assert!(snapshot.target.is_some());

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn exhausting_attempts_ends_the_game_and_reset_revives_it() {
    let handle = spawn_session(playable(&[410, 392]), fast_config(QuizMode::FlagSelect));
    let mut sub = handle.subscribe();

    for _ in 0..2 {
        let feedback = handle.guess(999).await.expect("guess");
        assert!(matches!(feedback, GuessFeedback::Wrong { .. }));
        wait_for(&mut sub, |e| matches!(e, QuizEvent::FeedbackCleared)).await;
    }

    let feedback = handle.guess(999).await.expect("guess");
    assert_eq!(feedback, GuessFeedback::Failed);

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.feedback, Feedback::Failed);
    assert!(snapshot.target.is_some(), "answer stays revealable");

    wait_for(&mut sub, |e| matches!(e, QuizEvent::GameOver { solved: 0, total: 2 })).await;
    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.phase, Phase::Over);

    // Terminal until reset.
    let target = snapshot.target.expect("target").id;
    assert_eq!(handle.guess(target).await.expect("guess"), GuessFeedback::Ignored);

    handle.reset().await.expect("reset");
    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.phase, Phase::InProgress);
    assert!(snapshot.guessed.is_empty());

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn solving_everything_completes_without_game_over() {
    let handle = spawn_session(playable(&[410]), fast_config(QuizMode::FlagSelect));
    let mut sub = handle.subscribe();

    assert_eq!(handle.guess(410).await.expect("guess"), GuessFeedback::Correct);
    wait_for(&mut sub, |e| matches!(e, QuizEvent::Completed { total: 1 })).await;

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.phase, Phase::Complete);
    assert_eq!(snapshot.solved, 1);
    assert_eq!(snapshot.target, None);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn map_click_sessions_center_the_view_on_new_targets() {
    let handle = spawn_session(playable(&[410, 392]), fast_config(QuizMode::MapClick));

    let snapshot = handle.snapshot().await.expect("snapshot");
    let viewport = snapshot.viewport;
    assert!(viewport.zoom >= 2.0, "focus raises zoom to the floor");
    assert_ne!(viewport.center, [0.0, 0.0]);

    // Zoom intents clamp and never fight the focus floor downward.
    let zoomed = handle.zoom_in().await.expect("zoom in");
    assert!(zoomed.zoom > viewport.zoom);
    let reset = handle.reset_view().await.expect("reset view");
    assert_eq!(reset.zoom, 1.0);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn query_filter_narrows_snapshot_entities() {
    let handle = spawn_session(playable(&[410, 392, 156]), fast_config(QuizMode::FlagSelect));

    handle.set_query("일본").await.expect("set query");
    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.entities.len(), 1);
    assert_eq!(snapshot.entities[0].id, 392);
    assert_eq!(snapshot.query, "일본");

    // Reset clears the filter.
    handle.reset().await.expect("reset");
    let snapshot = handle.snapshot().await.expect("snapshot");
    assert!(snapshot.query.is_empty());
    assert_eq!(snapshot.entities.len(), 3);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn failed_dataset_fetch_is_terminal_for_the_session() {
    // Nothing listens on the discard port; the connection fails fast.
    let handle = spawn_session_loading(
        Catalog::bundled().expect("bundled catalog"),
        "http://127.0.0.1:9/world.json",
        fast_config(QuizMode::FlagSelect),
    );
    let mut sub = handle.subscribe();

    wait_for(&mut sub, |e| matches!(e, QuizEvent::LoadFailed { .. })).await;

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert!(matches!(snapshot.status, SessionStatus::Failed { .. }));
    assert_eq!(snapshot.total, 0);
    assert_eq!(handle.guess(410).await.expect("guess"), GuessFeedback::Ignored);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn dropping_the_last_handle_stops_the_session_loop() {
    let handle = spawn_session(playable(&[410, 392]), fast_config(QuizMode::FlagSelect));
    let mut sub = handle.subscribe();
    drop(handle);

    // The loop exits once the command channel closes and drops its event
    // sender; the stream ends after buffered events drain.
    loop {
        match tokio::time::timeout(Duration::from_secs(5), sub.recv())
            .await
            .expect("session loop did not stop")
        {
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[tokio::test]
async fn explore_sessions_inspect_without_scoring() {
    let handle = spawn_session(playable(&[410, 392]), fast_config(QuizMode::Explore));
    let mut sub = handle.subscribe();

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.target, None);

    assert_eq!(handle.guess(410).await.expect("guess"), GuessFeedback::Inspected);
    wait_for(&mut sub, |e| matches!(e, QuizEvent::CenteredOn { .. })).await;

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.selected, Some(410));
    assert_eq!(snapshot.solved, 0);
    assert!(snapshot.viewport.zoom >= 2.0);

    handle.shutdown().await.expect("shutdown");
}
