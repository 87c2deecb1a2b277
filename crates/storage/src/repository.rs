use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use trivia_core::model::{
    AnswerMark, CategoryStats, CategoryStatsDelta, CollectionEntry, CumulativeStats, Question,
    QuestionId, StatsDelta, SubcategoryFilter, UserId,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read access to the trivia question store.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert or replace a question, including its subcategory tags.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// Questions for a quiz: category equality for `All`, tag membership otherwise.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures. An empty pool is `Ok(vec![])`.
    async fn fetch_questions(
        &self,
        category: &str,
        filter: &SubcategoryFilter,
    ) -> Result<Vec<Question>, StorageError>;

    /// Fetch one question by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>, StorageError>;
}

/// Additive, merge-semantics writes for per-user statistics.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Fetch the overall record, if the user has finished a quiz before.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_stats(&self, user: &UserId) -> Result<Option<CumulativeStats>, StorageError>;

    /// Fold one session into the overall record and return the merged result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read-modify-write fails.
    async fn merge_stats(
        &self,
        user: &UserId,
        delta: &StatsDelta,
    ) -> Result<CumulativeStats, StorageError>;

    /// Fold one session into the record for `subcategory`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read-modify-write fails.
    async fn merge_category_stats(
        &self,
        user: &UserId,
        subcategory: &str,
        delta: CategoryStatsDelta,
    ) -> Result<CategoryStats, StorageError>;

    /// All per-subcategory records for a user, ordered by subcategory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_category_stats(&self, user: &UserId) -> Result<Vec<CategoryStats>, StorageError>;
}

/// Per-question exposure records ("collection book").
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Count one more sighting of `question`, creating the entry on first sight.
    /// The entry is refiled under `subcategory` on every sighting.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the upsert fails.
    async fn upsert_entry(
        &self,
        user: &UserId,
        question: &QuestionId,
        subcategory: &str,
        mark: AnswerMark,
        seen_at: DateTime<Utc>,
    ) -> Result<CollectionEntry, StorageError>;

    /// Entries for a user, optionally restricted to one subcategory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_entries(
        &self,
        user: &UserId,
        subcategory: Option<&str>,
    ) -> Result<Vec<CollectionEntry>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<BTreeMap<QuestionId, Question>>>,
    stats: Arc<Mutex<HashMap<UserId, CumulativeStats>>>,
    category_stats: Arc<Mutex<BTreeMap<(UserId, String), CategoryStats>>>,
    collection: Arc<Mutex<BTreeMap<(UserId, QuestionId), CollectionEntry>>>,
}

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    m.lock().map_err(|e| StorageError::Connection(e.to_string()))
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = lock(&self.questions)?;
        guard.insert(question.id().clone(), question.clone());
        Ok(())
    }

    async fn fetch_questions(
        &self,
        category: &str,
        filter: &SubcategoryFilter,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = lock(&self.questions)?;
        let found = guard
            .values()
            .filter(|q| match filter {
                SubcategoryFilter::All => q.category() == category,
                SubcategoryFilter::Tag(tag) => q.has_subcategory(tag),
            })
            .cloned()
            .collect();
        Ok(found)
    }

    async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>, StorageError> {
        let guard = lock(&self.questions)?;
        Ok(guard.get(id).cloned())
    }
}

#[async_trait]
impl StatsRepository for InMemoryRepository {
    async fn get_stats(&self, user: &UserId) -> Result<Option<CumulativeStats>, StorageError> {
        let guard = lock(&self.stats)?;
        Ok(guard.get(user).cloned())
    }

    async fn merge_stats(
        &self,
        user: &UserId,
        delta: &StatsDelta,
    ) -> Result<CumulativeStats, StorageError> {
        let mut guard = lock(&self.stats)?;
        let stats = guard.entry(user.clone()).or_default();
        stats.apply(delta);
        Ok(stats.clone())
    }

    async fn merge_category_stats(
        &self,
        user: &UserId,
        subcategory: &str,
        delta: CategoryStatsDelta,
    ) -> Result<CategoryStats, StorageError> {
        let mut guard = lock(&self.category_stats)?;
        let stats = guard
            .entry((user.clone(), subcategory.to_owned()))
            .or_insert_with(|| CategoryStats::empty(subcategory));
        stats.apply(delta);
        Ok(stats.clone())
    }

    async fn list_category_stats(&self, user: &UserId) -> Result<Vec<CategoryStats>, StorageError> {
        let guard = lock(&self.category_stats)?;
        Ok(guard
            .iter()
            .filter(|((owner, _), _)| owner == user)
            .map(|(_, stats)| stats.clone())
            .collect())
    }
}

#[async_trait]
impl CollectionRepository for InMemoryRepository {
    async fn upsert_entry(
        &self,
        user: &UserId,
        question: &QuestionId,
        subcategory: &str,
        mark: AnswerMark,
        seen_at: DateTime<Utc>,
    ) -> Result<CollectionEntry, StorageError> {
        let mut guard = lock(&self.collection)?;
        let entry = guard
            .entry((user.clone(), question.clone()))
            .and_modify(|e| {
                e.subcategory = subcategory.to_owned();
                e.record(mark, seen_at);
            })
            .or_insert_with(|| {
                CollectionEntry::first_sighting(question.clone(), subcategory, mark, seen_at)
            });
        Ok(entry.clone())
    }

    async fn list_entries(
        &self,
        user: &UserId,
        subcategory: Option<&str>,
    ) -> Result<Vec<CollectionEntry>, StorageError> {
        let guard = lock(&self.collection)?;
        Ok(guard
            .iter()
            .filter(|((owner, _), entry)| {
                owner == user && subcategory.is_none_or(|s| entry.subcategory == s)
            })
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}

/// Aggregates the store's collections behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub stats: Arc<dyn StatsRepository>,
    pub collection: Arc<dyn CollectionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Share one repository value across every collection.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: QuestionRepository + StatsRepository + CollectionRepository + Clone + 'static,
    {
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let stats: Arc<dyn StatsRepository> = Arc::new(repo.clone());
        let collection: Arc<dyn CollectionRepository> = Arc::new(repo);
        Self {
            questions,
            stats,
            collection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::model::Difficulty;
    use trivia_core::time::fixed_now;

    fn question(id: &str, category: &str, tags: &[&str]) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id}"),
            vec!["A".into(), "B".into()],
            "A",
            category,
            tags.iter().map(|t| (*t).to_string()).collect(),
            Difficulty::Default,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn fetch_matches_category_or_tag() {
        let repo = InMemoryRepository::new();
        repo.upsert_question(&question("1", "International", &["UEFA"]))
            .await
            .unwrap();
        repo.upsert_question(&question("2", "International", &["CAF"]))
            .await
            .unwrap();
        repo.upsert_question(&question("3", "Cup Competitions", &["UEFA"]))
            .await
            .unwrap();

        let all = repo
            .fetch_questions("International", &SubcategoryFilter::All)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let uefa = repo
            .fetch_questions("International", &SubcategoryFilter::Tag("UEFA".into()))
            .await
            .unwrap();
        let ids: Vec<_> = uefa.iter().map(|q| q.id().as_str().to_owned()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn collection_upsert_increments() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1");
        let qid = QuestionId::new("q1");
        repo.upsert_entry(&user, &qid, "UEFA", AnswerMark::Correct, fixed_now())
            .await
            .unwrap();
        let entry = repo
            .upsert_entry(&user, &qid, "UEFA", AnswerMark::Incorrect, fixed_now())
            .await
            .unwrap();
        assert_eq!(entry.correct_count, 1);
        assert_eq!(entry.incorrect_count, 1);

        let listed = repo.list_entries(&user, Some("CAF")).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn collection_upsert_refiles_under_latest_subcategory() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1");
        let qid = QuestionId::new("q1");
        repo.upsert_entry(&user, &qid, "International", AnswerMark::Correct, fixed_now())
            .await
            .unwrap();
        let entry = repo
            .upsert_entry(&user, &qid, "UEFA", AnswerMark::Correct, fixed_now())
            .await
            .unwrap();
        assert_eq!(entry.subcategory, "UEFA");
        assert_eq!(entry.correct_count, 2);

        assert!(repo.list_entries(&user, Some("International")).await.unwrap().is_empty());
        assert_eq!(repo.list_entries(&user, Some("UEFA")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn merges_are_additive_per_user() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("u1");
        let delta = StatsDelta {
            correct_answers: 4,
            incorrect_answers: 6,
            perfect: false,
            longest_streak_correct: 2,
            longest_streak_wrong: 3,
            yellow_cards: 1,
            red_card: false,
        };
        repo.merge_stats(&user, &delta).await.unwrap();
        let merged = repo.merge_stats(&user, &delta).await.unwrap();
        assert_eq!(merged.total_quizzes, 2);
        assert_eq!(merged.yellow_cards, 2);

        assert!(repo.get_stats(&UserId::new("other")).await.unwrap().is_none());
    }
}
