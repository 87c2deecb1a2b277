use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use services::{
    AppServices, Clock, OverviewSort, QuestionOutcome, QuizRequest, QuizSession, SessionError,
    SignalKind, SignalOutcome, SignalScheduler, SortOrder,
};
use storage::repository::{
    CollectionRepository, InMemoryRepository, QuestionRepository, StatsRepository, Storage,
    StorageError,
};
use trivia_core::QuizSettings;
use trivia_core::model::{
    AnswerMark, CategoryStats, CategoryStatsDelta, CollectionEntry, CumulativeStats, Difficulty,
    DifficultyMode, Question, QuestionId, StatsDelta, SubcategoryFilter, UserId,
};
use trivia_core::time::fixed_now;

fn question(id: &str, subcategory: &str, difficulty: Difficulty) -> Question {
    Question::new(
        QuestionId::new(id),
        format!("Question {id}?"),
        vec!["right".into(), "wrong".into(), "other".into()],
        "right",
        "International",
        vec![subcategory.into()],
        difficulty,
    )
    .unwrap()
}

async fn seed(repo: &InMemoryRepository, subcategory: &str, easy: usize, hard: usize) {
    for i in 0..easy {
        let q = question(&format!("{subcategory}-e{i}"), subcategory, Difficulty::Easy);
        repo.upsert_question(&q).await.unwrap();
    }
    for i in 0..hard {
        let q = question(&format!("{subcategory}-h{i}"), subcategory, Difficulty::Hard);
        repo.upsert_question(&q).await.unwrap();
    }
}

fn services_over(storage: &Storage) -> AppServices {
    AppServices::from_storage(storage, Clock::fixed(fixed_now()), QuizSettings::default())
}

fn uefa(mode: DifficultyMode) -> QuizRequest {
    QuizRequest::new("International", SubcategoryFilter::Tag("UEFA".into()), mode)
}

async fn start(services: &AppServices, user: &UserId, request: QuizRequest) -> QuizSession {
    let mut rng = StdRng::seed_from_u64(99);
    services
        .quiz_loop()
        .start_session_with_rng(user.clone(), request, &mut rng)
        .await
        .unwrap()
}

#[tokio::test]
async fn uefa_default_mode_picks_ten_unique_questions() {
    let repo = InMemoryRepository::new();
    seed(&repo, "UEFA", 5, 5).await;
    let services = services_over(&Storage::from_repository(repo));

    let session = start(&services, &UserId::new("u1"), uefa(DifficultyMode::Default)).await;

    let texts: HashSet<_> = session.quiz().questions().iter().map(Question::text).collect();
    assert_eq!(session.quiz().len(), 10);
    assert_eq!(texts.len(), 10);
}

#[tokio::test]
async fn empty_pool_reports_no_questions() {
    let services = services_over(&Storage::in_memory());
    let err = services
        .quiz_loop()
        .start_session(UserId::new("u1"), uefa(DifficultyMode::Hard))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Empty));
}

#[tokio::test]
async fn small_subcategory_falls_back_to_default_mode() {
    let repo = InMemoryRepository::new();
    seed(&repo, "CAF", 2, 3).await;
    let services = services_over(&Storage::from_repository(repo));

    let request = QuizRequest::new(
        "International",
        SubcategoryFilter::Tag("CAF".into()),
        DifficultyMode::Easy,
    );
    let session = start(&services, &UserId::new("u1"), request).await;

    assert_eq!(session.quiz().mode(), DifficultyMode::Default);
    assert_eq!(session.quiz().len(), 5);
}

#[tokio::test]
async fn perfect_session_merges_stats_and_collection_once() {
    let repo = InMemoryRepository::new();
    seed(&repo, "UEFA", 5, 5).await;
    let storage = Storage::from_repository(repo.clone());
    let services = services_over(&storage);
    let quiz_loop = services.quiz_loop();
    let user = UserId::new("u1");

    let mut session = start(&services, &user, uefa(DifficultyMode::Default)).await;
    while !session.is_complete() {
        let answered = quiz_loop.answer_current(&mut session, "right").await.unwrap();
        assert!(matches!(
            answered.result.outcome,
            QuestionOutcome::Correct { points: 1000 }
        ));
        quiz_loop.next_question(&mut session).await.unwrap();
    }
    assert!(!quiz_loop.finalize_if_complete(&mut session).await);

    let profile = services.stats().profile(&user).await.unwrap();
    assert_eq!(profile.overall.total_quizzes, 1);
    assert_eq!(profile.overall.total_perfect_quizzes, 1);
    assert_eq!(profile.overall.correct_answers, 10);
    assert_eq!(profile.distribution[10], (10, 1));
    assert_eq!(profile.categories.len(), 1);
    assert_eq!(profile.categories[0].subcategory, "UEFA");

    let entries = repo.list_entries(&user, Some("UEFA")).await.unwrap();
    assert_eq!(entries.len(), 10);
    assert!(entries.iter().all(|e| e.correct_count == 1));
}

#[tokio::test]
async fn wildcard_session_sightings_count_toward_their_subcategory() {
    let repo = InMemoryRepository::new();
    seed(&repo, "UEFA", 5, 5).await;
    let services = services_over(&Storage::from_repository(repo.clone()));
    let quiz_loop = services.quiz_loop();
    let user = UserId::new("u1");

    let request =
        QuizRequest::new("International", SubcategoryFilter::All, DifficultyMode::Default);
    let mut session = start(&services, &user, request).await;
    while !session.is_complete() {
        quiz_loop.answer_current(&mut session, "right").await.unwrap();
        quiz_loop.next_question(&mut session).await.unwrap();
    }

    let entries = repo.list_entries(&user, None).await.unwrap();
    assert_eq!(entries.len(), 10);
    assert!(entries.iter().all(|e| e.subcategory == "UEFA"));

    let groups = services
        .collection()
        .overview(&user, OverviewSort::default(), SortOrder::default())
        .await
        .unwrap();
    let seen: u32 = groups
        .iter()
        .flat_map(|g| g.subcategories.iter())
        .map(|s| s.seen)
        .sum();
    assert_eq!(seen, 10);

    let profile = services.stats().profile(&user).await.unwrap();
    assert_eq!(profile.categories[0].subcategory, "International");
}

#[tokio::test(start_paused = true)]
async fn six_wrong_answers_end_the_session_on_the_whistle() {
    let repo = InMemoryRepository::new();
    seed(&repo, "UEFA", 5, 5).await;
    let services = services_over(&Storage::from_repository(repo));
    let quiz_loop = services.quiz_loop();
    let user = UserId::new("u1");

    let mut session = start(&services, &user, uefa(DifficultyMode::Default)).await;
    let (scheduler, mut signals) = SignalScheduler::new(session.id());

    for i in 0..6 {
        let answered = quiz_loop.answer_current(&mut session, "wrong").await.unwrap();
        scheduler.schedule_card_follow_ups(&answered.result.cards, quiz_loop.settings());
        if i < 5 {
            quiz_loop.next_question(&mut session).await.unwrap();
        }
    }
    assert_eq!(session.current_index(), 5);
    assert!(session.discipline().is_sent_off());
    assert!(!session.is_complete());
    assert!(matches!(
        quiz_loop.answer_current(&mut session, "right").await,
        Err(SessionError::SentOff)
    ));

    let mut ended = false;
    while let Some(signal) = signals.recv().await {
        if quiz_loop.on_signal(&mut session, &signal).await == SignalOutcome::Ended {
            ended = true;
            break;
        }
    }
    assert!(ended);
    assert!(session.is_complete());
    assert!(!quiz_loop.end_after_red_card(&mut session).await);

    let profile = services.stats().profile(&user).await.unwrap();
    assert_eq!(profile.overall.total_quizzes, 1);
    assert_eq!(profile.overall.red_cards, 1);
    assert_eq!(profile.overall.yellow_cards, 1);
    assert_eq!(profile.overall.incorrect_answers, 6);
    assert_eq!(profile.overall.longest_streak_wrong, 6);
}

#[tokio::test(start_paused = true)]
async fn ticker_times_out_and_records_incorrect_sighting() {
    let repo = InMemoryRepository::new();
    seed(&repo, "UEFA", 5, 5).await;
    let services = services_over(&Storage::from_repository(repo.clone()));
    let quiz_loop = services.quiz_loop();
    let user = UserId::new("u1");

    let mut session = start(&services, &user, uefa(DifficultyMode::Default)).await;
    let (scheduler, mut signals) = SignalScheduler::new(session.id());
    scheduler.start_ticker(quiz_loop.settings().tick_interval());

    let mut ticks = 0;
    let timed_out = loop {
        let signal = signals.recv().await.unwrap();
        match quiz_loop.on_signal(&mut session, &signal).await {
            SignalOutcome::TimedOut(result) => break result,
            SignalOutcome::Ticked => ticks += 1,
            other => panic!("unexpected outcome {other:?}"),
        }
    };
    scheduler.cancel();

    assert_eq!(ticks, 149);
    assert_eq!(timed_out.outcome, QuestionOutcome::TimedOut);
    assert_eq!(session.incorrect_answers(), 1);
    assert_eq!(session.streak(), 0);
    assert!(session.view().timed_out);

    let entries = repo.list_entries(&user, Some("UEFA")).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].question_id, timed_out.question_id);
    assert_eq!(entries[0].incorrect_count, 1);
}

#[tokio::test(start_paused = true)]
async fn signals_from_an_abandoned_session_are_ignored() {
    let repo = InMemoryRepository::new();
    seed(&repo, "UEFA", 5, 5).await;
    let services = services_over(&Storage::from_repository(repo));
    let quiz_loop = services.quiz_loop();
    let user = UserId::new("u1");

    let old = start(&services, &user, uefa(DifficultyMode::Default)).await;
    let (old_scheduler, mut old_signals) = SignalScheduler::new(old.id());
    old_scheduler.schedule(Duration::from_millis(10), SignalKind::RedCardWhistle);
    tokio::time::sleep(Duration::from_millis(20)).await;
    let stale = old_signals.recv().await.unwrap();
    drop(old_scheduler);

    let mut fresh = start(&services, &user, uefa(DifficultyMode::Default)).await;
    assert_eq!(
        quiz_loop.on_signal(&mut fresh, &stale).await,
        SignalOutcome::Ignored
    );
    assert!(!fresh.is_complete());
}

//
// ─── FAILING BACKEND ───────────────────────────────────────────────────────────
//

#[derive(Clone, Default)]
struct BrokenStore;

fn down() -> StorageError {
    StorageError::Connection("store unavailable".into())
}

#[async_trait]
impl QuestionRepository for BrokenStore {
    async fn upsert_question(&self, _question: &Question) -> Result<(), StorageError> {
        Err(down())
    }

    async fn fetch_questions(
        &self,
        _category: &str,
        _filter: &SubcategoryFilter,
    ) -> Result<Vec<Question>, StorageError> {
        Err(down())
    }

    async fn get_question(&self, _id: &QuestionId) -> Result<Option<Question>, StorageError> {
        Err(down())
    }
}

#[async_trait]
impl StatsRepository for BrokenStore {
    async fn get_stats(&self, _user: &UserId) -> Result<Option<CumulativeStats>, StorageError> {
        Err(down())
    }

    async fn merge_stats(
        &self,
        _user: &UserId,
        _delta: &StatsDelta,
    ) -> Result<CumulativeStats, StorageError> {
        Err(down())
    }

    async fn merge_category_stats(
        &self,
        _user: &UserId,
        _subcategory: &str,
        _delta: CategoryStatsDelta,
    ) -> Result<CategoryStats, StorageError> {
        Err(down())
    }

    async fn list_category_stats(&self, _user: &UserId) -> Result<Vec<CategoryStats>, StorageError> {
        Err(down())
    }
}

#[async_trait]
impl CollectionRepository for BrokenStore {
    async fn upsert_entry(
        &self,
        _user: &UserId,
        _question: &QuestionId,
        _subcategory: &str,
        _mark: AnswerMark,
        _seen_at: DateTime<Utc>,
    ) -> Result<CollectionEntry, StorageError> {
        Err(down())
    }

    async fn list_entries(
        &self,
        _user: &UserId,
        _subcategory: Option<&str>,
    ) -> Result<Vec<CollectionEntry>, StorageError> {
        Err(down())
    }
}

#[tokio::test]
async fn failed_fetch_surfaces_as_empty() {
    let services = services_over(&Storage::from_repository(BrokenStore));
    let err = services
        .quiz_loop()
        .start_session(UserId::new("u1"), uefa(DifficultyMode::Default))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Empty));
}

#[tokio::test]
async fn persistence_failures_never_block_play() {
    let repo = InMemoryRepository::new();
    seed(&repo, "UEFA", 5, 5).await;
    let storage = Storage {
        questions: Arc::new(repo),
        stats: Arc::new(BrokenStore),
        collection: Arc::new(BrokenStore),
    };
    let services = services_over(&storage);
    let quiz_loop = services.quiz_loop();

    let mut session = start(&services, &UserId::new("u1"), uefa(DifficultyMode::Default)).await;
    while !session.is_complete() {
        quiz_loop.answer_current(&mut session, "right").await.unwrap();
        quiz_loop.next_question(&mut session).await.unwrap();
    }

    assert_eq!(session.score(), 10_000);
    assert!(session.stats_recorded());
    assert!(services.stats().profile(&UserId::new("u1")).await.is_err());
}
