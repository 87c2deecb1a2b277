use chrono::{DateTime, Utc};
use trivia_core::model::{AnswerMark, CollectionEntry, QuestionId, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_entry_row};
use crate::repository::{CollectionRepository, StorageError};

const SELECT_ENTRY: &str = r"
    SELECT question_id, subcategory, correct_count, incorrect_count, first_seen, last_seen
    FROM collection_entries
";

#[async_trait::async_trait]
impl CollectionRepository for SqliteRepository {
    async fn upsert_entry(
        &self,
        user: &UserId,
        question: &QuestionId,
        subcategory: &str,
        mark: AnswerMark,
        seen_at: DateTime<Utc>,
    ) -> Result<CollectionEntry, StorageError> {
        let (correct, incorrect) = match mark {
            AnswerMark::Correct => (1_i64, 0_i64),
            AnswerMark::Incorrect => (0_i64, 1_i64),
        };

        let mut tx = self.pool.begin().await.map_err(conn)?;

        // first_seen is only written on insert.
        sqlx::query(
            r"
                INSERT INTO collection_entries (
                    user_id, question_id, subcategory, correct_count, incorrect_count,
                    first_seen, last_seen
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                ON CONFLICT(user_id, question_id) DO UPDATE SET
                    subcategory = excluded.subcategory,
                    correct_count = correct_count + excluded.correct_count,
                    incorrect_count = incorrect_count + excluded.incorrect_count,
                    last_seen = excluded.last_seen
            ",
        )
        .bind(user.as_str())
        .bind(question.as_str())
        .bind(subcategory)
        .bind(correct)
        .bind(incorrect)
        .bind(seen_at)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        let sql = format!("{SELECT_ENTRY} WHERE user_id = ?1 AND question_id = ?2");
        let row = sqlx::query(&sql)
            .bind(user.as_str())
            .bind(question.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        map_entry_row(&row)
    }

    async fn list_entries(
        &self,
        user: &UserId,
        subcategory: Option<&str>,
    ) -> Result<Vec<CollectionEntry>, StorageError> {
        let rows = match subcategory {
            Some(sub) => {
                let sql = format!(
                    "{SELECT_ENTRY} WHERE user_id = ?1 AND subcategory = ?2 ORDER BY question_id"
                );
                sqlx::query(&sql)
                    .bind(user.as_str())
                    .bind(sub)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("{SELECT_ENTRY} WHERE user_id = ?1 ORDER BY question_id");
                sqlx::query(&sql)
                    .bind(user.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_entry_row(&row)?);
        }
        Ok(out)
    }
}
