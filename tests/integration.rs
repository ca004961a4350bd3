use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use axum::{Json, Router};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use tokio::sync::Mutex;

use quizdrill::error::{ServiceError, SessionError};
use quizdrill::item::{self, Outcome, QuizItem, Statistics};
use quizdrill::mastery::{self, MasteryTier};
use quizdrill::scheduler::Mode;
use quizdrill::service::{DeckFileService, HttpQuizService, QuizService};
use quizdrill::session::Session;

// -- In-process stand-in for the quiz REST service --

type Items = Arc<Mutex<Vec<QuizItem>>>;

#[derive(Deserialize)]
struct AnswerBody {
    correct: bool,
}

async fn list_questions(State(items): State<Items>) -> Json<Vec<QuizItem>> {
    Json(items.lock().await.clone())
}

async fn answer_question(
    State(items): State<Items>,
    Path(id): Path<i64>,
    Json(body): Json<AnswerBody>,
) -> StatusCode {
    let mut items = items.lock().await;
    let Some(item) = items.iter_mut().find(|i| i.id == id) else {
        return StatusCode::NOT_FOUND;
    };
    let outcome = if body.correct {
        Outcome::Correct
    } else {
        Outcome::Wrong
    };
    item.stats = item.stats.record(outcome);
    StatusCode::NO_CONTENT
}

async fn spawn_service(pool: Vec<QuizItem>) -> (String, Items) {
    let items: Items = Arc::new(Mutex::new(pool));
    let app = Router::new()
        .route("/question", get(list_questions))
        .route("/question/{id}/answer", post(answer_question))
        .with_state(items.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), items)
}

fn pool() -> Vec<QuizItem> {
    vec![
        QuizItem::new(1, "2+2", "4"),
        QuizItem::new(2, "capital of France", "Paris").with_stats(Statistics::new(3, 3, 0)),
        QuizItem::new(3, "largest planet", "Jupiter").with_stats(Statistics::new(10, 1, 1)),
        QuizItem::new(4, "H2O", "water").with_stats(Statistics::new(10, 9, 6)),
    ]
}

#[tokio::test]
async fn http_fetch_and_report() {
    let (url, items) = spawn_service(pool()).await;
    let mut service = HttpQuizService::new(&format!("{url}/"));

    let fetched = service.fetch_pool().await.unwrap();
    assert_eq!(fetched, pool());

    service.report_outcome(4, Outcome::Wrong).await.unwrap();
    service.report_outcome(1, Outcome::Correct).await.unwrap();

    let items = items.lock().await;
    assert_eq!(items[3].stats, Statistics::new(11, 9, 0));
    assert_eq!(items[0].stats, Statistics::new(1, 1, 1));
}

#[tokio::test]
async fn http_report_for_unknown_item_fails() {
    let (url, _) = spawn_service(pool()).await;
    let mut service = HttpQuizService::new(&url);
    let err = service.report_outcome(99, Outcome::Correct).await.unwrap_err();
    assert!(matches!(err, ServiceError::Http(_)));
}

#[tokio::test]
async fn unreachable_service_fails_to_start() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let service = HttpQuizService::new(&format!("http://{addr}"));
    let result = Session::start(service, Mode::Weighted, StdRng::seed_from_u64(1), true).await;
    assert!(matches!(result, Err(SessionError::Service(_))));
}

#[tokio::test]
async fn weighted_session_over_http_resyncs_between_passes() {
    let (url, items) = spawn_service(pool()).await;
    let mut session = Session::start(
        HttpQuizService::new(&url),
        Mode::Weighted,
        StdRng::seed_from_u64(21),
        true,
    )
    .await
    .unwrap();

    let mut first_pass = HashSet::new();
    for _ in 0..4 {
        let id = session.next_item().await.unwrap().id;
        assert!(first_pass.insert(id));
        session.answer(Outcome::Wrong).await.unwrap();
    }
    assert_eq!(first_pass, HashSet::from([1, 2, 3, 4]));

    // the service now holds a fresh streak reset for every item
    {
        let items = items.lock().await;
        assert!(items.iter().all(|i| i.stats.current_streak == 0));
        assert!(
            items
                .iter()
                .all(|i| mastery::classify(i) == MasteryTier::Weak)
        );
    }

    session.next_item().await.unwrap();
    assert!(
        session
            .pool()
            .iter()
            .all(|i| mastery::classify(i) == MasteryTier::Weak)
    );
}

#[tokio::test]
async fn uniform_session_over_http() {
    let (url, items) = spawn_service(pool()).await;
    let mut session = Session::start(
        HttpQuizService::new(&url),
        Mode::Uniform,
        StdRng::seed_from_u64(8),
        true,
    )
    .await
    .unwrap();

    for _ in 0..20 {
        session.next_item().await.unwrap();
        session.answer(Outcome::Correct).await.unwrap();
    }

    let solved: u32 = items
        .lock()
        .await
        .iter()
        .map(|i| i.stats.times_solved)
        .sum();
    let before: u32 = pool().iter().map(|i| i.stats.times_solved).sum();
    assert_eq!(solved - before, 20);
    assert_eq!(session.summary().correct, 20);
}

#[tokio::test]
async fn deck_session_writes_outcomes_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capitals.csv");
    {
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "id,question,answer,times_solved,times_correct,current_streak"
        )
        .unwrap();
        writeln!(f, "1,France,Paris,0,0,0").unwrap();
        writeln!(f, "2,Japan,Tokyo,4,4,4").unwrap();
        writeln!(f, ",Peru,Lima,,,").unwrap();
    }

    let service = DeckFileService::open(&[dir.path().to_path_buf()]).unwrap();
    let mut session = Session::start(service, Mode::Weighted, StdRng::seed_from_u64(3), true)
        .await
        .unwrap();

    let mut seen = HashSet::new();
    for _ in 0..3 {
        let id = session.next_item().await.unwrap().id;
        seen.insert(id);
        session.answer(Outcome::Correct).await.unwrap();
    }
    assert_eq!(seen, HashSet::from([1, 2, 3]));

    let saved = item::load_csv(&path).unwrap();
    let stats = |id: i64| saved.iter().find(|i| i.id == id).unwrap().stats;
    assert_eq!(stats(1), Statistics::new(1, 1, 1));
    assert_eq!(stats(2), Statistics::new(5, 5, 5));
    assert_eq!(stats(3), Statistics::new(1, 1, 1));
    assert_eq!(mastery::classify(&saved[1]), MasteryTier::Strong);
}
