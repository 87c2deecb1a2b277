use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use storage::repository::{CollectionRepository, QuestionRepository};
use trivia_core::model::catalog::{COLLECTION_GROUPS, pool_size};
use trivia_core::model::{AnswerMark, CollectionEntry, QuestionId, UserId};

use crate::error::CollectionServiceError;

//
// ─── SORTING ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverviewSort {
    #[default]
    Alphabetical,
    Progress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailSort {
    #[default]
    LastSeen,
    CorrectPercent,
    Total,
}

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

/// Share of one subcategory's pool the user has seen.
#[derive(Debug, Clone, PartialEq)]
pub struct SubcategoryProgress {
    pub subcategory: String,
    pub seen: u32,
    pub total: u32,
    /// `seen / total` as a whole percentage.
    pub percent: u32,
}

impl SubcategoryProgress {
    fn new(subcategory: impl Into<String>, seen: u32) -> Self {
        let subcategory = subcategory.into();
        let total = pool_size(&subcategory);
        Self {
            percent: round_percent(seen, total),
            subcategory,
            seen,
            total,
        }
    }

    fn ratio(&self) -> f64 {
        f64::from(self.seen) / f64::from(self.total.max(1))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionGroup {
    pub name: String,
    pub subcategories: Vec<SubcategoryProgress>,
}

/// One seen question inside a subcategory page.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRow {
    pub question_id: QuestionId,
    pub question: String,
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    /// Rounded to one decimal.
    pub correct_percent: f64,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDetail {
    pub progress: SubcategoryProgress,
    pub rows: Vec<CollectionRow>,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_percent(seen: u32, total: u32) -> u32 {
    let total = total.max(1);
    (f64::from(seen) / f64::from(total) * 100.0).round() as u32
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Reads and writes the per-user "collection book" of seen questions.
#[derive(Clone)]
pub struct CollectionService {
    questions: Arc<dyn QuestionRepository>,
    collection: Arc<dyn CollectionRepository>,
}

impl CollectionService {
    #[must_use]
    pub fn new(
        questions: Arc<dyn QuestionRepository>,
        collection: Arc<dyn CollectionRepository>,
    ) -> Self {
        Self {
            questions,
            collection,
        }
    }

    /// Count one sighting of `question` under `subcategory`.
    ///
    /// # Errors
    ///
    /// Returns `CollectionServiceError::Storage` if the upsert fails.
    pub async fn record_answer(
        &self,
        user: &UserId,
        question: &QuestionId,
        subcategory: &str,
        mark: AnswerMark,
        now: DateTime<Utc>,
    ) -> Result<CollectionEntry, CollectionServiceError> {
        let entry = self
            .collection
            .upsert_entry(user, question, subcategory, mark, now)
            .await?;
        debug!(
            user_id = %user,
            question_id = %question,
            subcategory,
            seen = entry.total(),
            "collection entry updated"
        );
        Ok(entry)
    }

    /// Progress for every subcategory in every collection group.
    ///
    /// # Errors
    ///
    /// Returns `CollectionServiceError::Storage` if repository access fails.
    pub async fn overview(
        &self,
        user: &UserId,
        sort: OverviewSort,
        order: SortOrder,
    ) -> Result<Vec<CollectionGroup>, CollectionServiceError> {
        let entries = self.collection.list_entries(user, None).await?;
        let mut seen: HashMap<&str, u32> = HashMap::new();
        for entry in &entries {
            *seen.entry(entry.subcategory.as_str()).or_insert(0) += 1;
        }

        let groups = COLLECTION_GROUPS
            .iter()
            .map(|(name, subs)| {
                let mut subcategories: Vec<SubcategoryProgress> = subs
                    .iter()
                    .map(|(sub, _)| {
                        SubcategoryProgress::new(*sub, seen.get(sub).copied().unwrap_or(0))
                    })
                    .collect();
                subcategories.sort_by(|a, b| {
                    let ordering = match sort {
                        OverviewSort::Alphabetical => a.subcategory.cmp(&b.subcategory),
                        OverviewSort::Progress => a.ratio().total_cmp(&b.ratio()),
                    };
                    order.apply(ordering)
                });
                CollectionGroup {
                    name: (*name).to_owned(),
                    subcategories,
                }
            })
            .collect();
        Ok(groups)
    }

    /// Per-question rows for one subcategory. Entries whose question has been
    /// removed from the store are skipped.
    ///
    /// # Errors
    ///
    /// Returns `CollectionServiceError::Storage` if repository access fails.
    pub async fn detail(
        &self,
        user: &UserId,
        subcategory: &str,
        sort: DetailSort,
        order: SortOrder,
    ) -> Result<CollectionDetail, CollectionServiceError> {
        let entries = self.collection.list_entries(user, Some(subcategory)).await?;

        let mut rows = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(question) = self.questions.get_question(&entry.question_id).await? else {
                debug!(question_id = %entry.question_id, "skipping entry for missing question");
                continue;
            };
            rows.push(CollectionRow {
                question: question.text().to_owned(),
                correct: entry.correct_count,
                incorrect: entry.incorrect_count,
                total: entry.total(),
                correct_percent: one_decimal(entry.correct_percent()),
                last_seen: entry.last_seen,
                question_id: entry.question_id,
            });
        }

        rows.sort_by(|a, b| {
            let ordering = match sort {
                DetailSort::LastSeen => a.last_seen.cmp(&b.last_seen),
                DetailSort::CorrectPercent => a.correct_percent.total_cmp(&b.correct_percent),
                DetailSort::Total => a.total.cmp(&b.total),
            };
            order.apply(ordering)
        });

        let seen = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        Ok(CollectionDetail {
            progress: SubcategoryProgress::new(subcategory, seen),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use storage::repository::InMemoryRepository;
    use trivia_core::model::{Difficulty, Question};
    use trivia_core::time::fixed_now;

    async fn seeded() -> (CollectionService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        for id in ["q1", "q2", "q3"] {
            let question = Question::new(
                QuestionId::new(id),
                format!("Who won {id}?"),
                vec!["A".into(), "B".into()],
                "A",
                "International",
                vec!["UEFA".into()],
                Difficulty::Default,
            )
            .unwrap();
            repo.upsert_question(&question).await.unwrap();
        }
        let service = CollectionService::new(Arc::new(repo.clone()), Arc::new(repo.clone()));
        (service, repo)
    }

    #[test]
    fn percent_rounds_to_whole_numbers() {
        assert_eq!(round_percent(1, 3), 33);
        assert_eq!(round_percent(2, 3), 67);
        assert_eq!(round_percent(0, 0), 0);
        assert!((one_decimal(66.666) - 66.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn detail_sorts_and_skips_missing_questions() {
        let (service, _repo) = seeded().await;
        let user = UserId::new("u1");
        let t0 = fixed_now();

        service
            .record_answer(&user, &QuestionId::new("q1"), "UEFA", AnswerMark::Correct, t0)
            .await
            .unwrap();
        service
            .record_answer(
                &user,
                &QuestionId::new("q2"),
                "UEFA",
                AnswerMark::Incorrect,
                t0 + Duration::seconds(5),
            )
            .await
            .unwrap();
        service
            .record_answer(
                &user,
                &QuestionId::new("q1"),
                "UEFA",
                AnswerMark::Incorrect,
                t0 + Duration::seconds(10),
            )
            .await
            .unwrap();
        service
            .record_answer(&user, &QuestionId::new("gone"), "UEFA", AnswerMark::Correct, t0)
            .await
            .unwrap();

        let detail = service
            .detail(&user, "UEFA", DetailSort::LastSeen, SortOrder::Descending)
            .await
            .unwrap();
        let ids: Vec<_> = detail.rows.iter().map(|r| r.question_id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
        assert_eq!(detail.rows[0].total, 2);
        assert!((detail.rows[0].correct_percent - 50.0).abs() < f64::EPSILON);
        assert_eq!(detail.progress.seen, 2);

        let by_total = service
            .detail(&user, "UEFA", DetailSort::Total, SortOrder::Ascending)
            .await
            .unwrap();
        assert_eq!(by_total.rows[0].question_id.as_str(), "q2");
    }

    #[tokio::test]
    async fn overview_counts_seen_per_subcategory() {
        let (service, _repo) = seeded().await;
        let user = UserId::new("u1");
        for id in ["q1", "q2", "q3"] {
            service
                .record_answer(&user, &QuestionId::new(id), "UEFA", AnswerMark::Correct, fixed_now())
                .await
                .unwrap();
        }

        let groups = service
            .overview(&user, OverviewSort::Progress, SortOrder::Descending)
            .await
            .unwrap();
        let international = groups.iter().find(|g| g.name == "International").unwrap();
        let top = &international.subcategories[0];
        assert_eq!(top.subcategory, "UEFA");
        assert_eq!(top.seen, 3);
        assert_eq!(top.total, pool_size("UEFA"));
        assert_eq!(top.percent, round_percent(3, pool_size("UEFA")));

        let alphabetical = service
            .overview(&user, OverviewSort::Alphabetical, SortOrder::Ascending)
            .await
            .unwrap();
        let names: Vec<_> = alphabetical[0]
            .subcategories
            .iter()
            .map(|s| s.subcategory.clone())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
