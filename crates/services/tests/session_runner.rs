use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{Feedback, FeedbackKind, GameOutcome, LevelDraft, LevelId};
use quiz_core::time::fixed_clock;
use services::{
    ChannelSink, PremiumGate, RecordingSink, SessionConfig, SessionEvent, SessionHandle,
    SessionLoopService, SessionStatus,
};
use storage::LevelCatalog;

fn catalog() -> LevelCatalog {
    let mut levels = LevelCatalog::builtin().levels().to_vec();

    let mut sprint = LevelDraft::new("five-second-sprint", "Five Second Sprint");
    sprint.time_limit_secs = Some(5);
    levels.push(sprint.validate().unwrap());

    let mut hurry = LevelDraft::new("hurry-up", "Hurry Up");
    hurry.time_per_question_secs = Some(2);
    levels.push(hurry.validate().unwrap());

    LevelCatalog::from_levels(levels).unwrap()
}

fn loop_svc() -> SessionLoopService {
    SessionLoopService::new(
        fixed_clock(),
        Arc::new(catalog()),
        Arc::new(PremiumGate::in_memory()),
    )
}

fn level(id: &str) -> LevelId {
    LevelId::new(id).unwrap()
}

/// Works out the answer from a rendered question such as `"12 ÷ 4 = ?"`.
fn solve(question: &str) -> i64 {
    let parts: Vec<&str> = question.split_whitespace().collect();
    let lhs: i64 = parts[0].parse().unwrap();
    let rhs: i64 = parts[2].parse().unwrap();
    match parts[1] {
        "+" => lhs + rhs,
        "-" => lhs - rhs,
        "×" => lhs * rhs,
        "÷" => lhs / rhs,
        other => panic!("unexpected operator {other}"),
    }
}

async fn wait_for_position(handle: &SessionHandle, position: usize) {
    let mut rx = handle.subscribe();
    rx.wait_for(|s| s.progress.position >= position || s.is_game_over())
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn correct_answers_win_through_runner() {
    let (sink, mut events) = ChannelSink::channel();
    let handle = loop_svc()
        .spawn_session(&level("easy-addition"), Arc::new(sink))
        .await
        .unwrap();

    for position in 1..=10 {
        let question = handle.snapshot().question_text.unwrap();
        handle.submit(solve(&question).to_string()).unwrap();
        wait_for_position(&handle, position + 1).await;
    }

    let snapshot = handle.game_over().await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::GameOver(GameOutcome::Win));
    assert_eq!(snapshot.score, 10);

    let result = handle.finished().await.unwrap().unwrap();
    assert!(result.is_win);
    assert_eq!(result.problems_attempted, 10);

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    let corrects = received
        .iter()
        .filter(|e| matches!(e, SessionEvent::Feedback(f) if f.message == Feedback::correct().message))
        .count();
    assert_eq!(corrects, 10);
    assert_eq!(received.last(), Some(&SessionEvent::Finished(result)));
}

#[tokio::test(start_paused = true)]
async fn submit_returns_before_the_session_advances() {
    let handle = loop_svc()
        .spawn_session(&level("easy-addition"), Arc::new(RecordingSink::new()))
        .await
        .unwrap();

    let question = handle.snapshot().question_text.unwrap();
    handle.submit(solve(&question).to_string()).unwrap();

    let mut rx = handle.subscribe();
    let shown = rx
        .wait_for(|s| s.feedback.is_some())
        .await
        .unwrap()
        .clone();
    assert_eq!(shown.status, SessionStatus::AwaitingNext);
    assert_eq!(shown.progress.position, 1);

    tokio::time::sleep(SessionConfig::DEFAULT_FEEDBACK_DELAY + Duration::from_millis(10)).await;
    let moved = handle.snapshot();
    assert_eq!(moved.progress.position, 2);
    assert!(moved.feedback.is_none());
}

#[tokio::test(start_paused = true)]
async fn five_second_level_times_out() {
    let sink = RecordingSink::new();
    let handle = loop_svc()
        .spawn_session(&level("five-second-sprint"), Arc::new(sink.clone()))
        .await
        .unwrap();

    let snapshot = handle.game_over().await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::GameOver(GameOutcome::TimeUp));
    assert_eq!(snapshot.time_left, Some(0));
    assert_eq!(snapshot.feedback, Some(Feedback::time_up()));

    let result = handle.finished().await.unwrap().unwrap();
    assert_eq!(result.problems_attempted, 0);
    assert!(!result.is_win);
    assert_eq!(
        sink.events(),
        vec![
            SessionEvent::Feedback(Feedback::time_up()),
            SessionEvent::Finished(result),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn question_timer_costs_a_life_and_moves_on() {
    let sink = RecordingSink::new();
    let handle = loop_svc()
        .spawn_session(&level("hurry-up"), Arc::new(sink.clone()))
        .await
        .unwrap();

    wait_for_position(&handle, 2).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.lives, 2);
    assert_eq!(snapshot.question_time_left, Some(2));

    let events = sink.events();
    let SessionEvent::Feedback(first) = &events[0] else {
        panic!("expected feedback");
    };
    assert_eq!(first.kind, FeedbackKind::Incorrect);
    assert!(first.message.starts_with("Time's up! The answer was"));
    handle.shutdown();
}

#[tokio::test(start_paused = true)]
async fn teardown_drops_pending_advance() {
    let sink = RecordingSink::new();
    let handle = loop_svc()
        .spawn_session(&level("easy-addition"), Arc::new(sink.clone()))
        .await
        .unwrap();

    let question = handle.snapshot().question_text.unwrap();
    handle.submit(solve(&question).to_string()).unwrap();
    handle.shutdown();

    let mut rx = handle.subscribe();
    assert!(handle.finished().await.unwrap().is_none());
    tokio::time::sleep(Duration::from_secs(5)).await;

    let last = rx.borrow_and_update().clone();
    assert_eq!(last.progress.position, 1);
    assert!(
        sink.events()
            .iter()
            .all(|e| !matches!(e, SessionEvent::Finished(_)))
    );
}

#[tokio::test(start_paused = true)]
async fn invalid_input_does_not_cost_a_life() {
    let handle = loop_svc()
        .spawn_session(&level("easy-addition"), Arc::new(RecordingSink::new()))
        .await
        .unwrap();

    handle.submit("abc").unwrap();
    let mut rx = handle.subscribe();
    let shown = rx
        .wait_for(|s| s.feedback.is_some())
        .await
        .unwrap()
        .clone();
    assert_eq!(shown.feedback, Some(Feedback::not_a_number()));
    assert_eq!(shown.lives, 3);
    assert_eq!(shown.status, SessionStatus::Active);

    let question = shown.question_text.unwrap();
    handle.submit(solve(&question).to_string()).unwrap();
    wait_for_position(&handle, 2).await;
    assert_eq!(handle.snapshot().score, 1);
    handle.shutdown();
}
