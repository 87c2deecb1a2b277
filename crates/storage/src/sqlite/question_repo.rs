use trivia_core::model::{Question, QuestionId, SubcategoryFilter};

use super::SqliteRepository;
use super::mapping::{conn, map_question_row, ser};
use crate::repository::{QuestionRepository, StorageError};

const SELECT_QUESTION: &str = r"
    SELECT
        q.id, q.text, q.options, q.answer, q.category, q.difficulty,
        (
            SELECT json_group_array(subcategory)
            FROM (
                SELECT s.subcategory
                FROM question_subcategories s
                WHERE s.question_id = q.id
                ORDER BY s.position
            )
        ) AS subcategories
    FROM questions q
";

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let options = serde_json::to_string(question.options()).map_err(ser)?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
                INSERT INTO questions (id, text, options, answer, category, difficulty)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    text = excluded.text,
                    options = excluded.options,
                    answer = excluded.answer,
                    category = excluded.category,
                    difficulty = excluded.difficulty
            ",
        )
        .bind(question.id().as_str())
        .bind(question.text())
        .bind(options)
        .bind(question.answer())
        .bind(question.category())
        .bind(question.difficulty().as_tag())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        sqlx::query("DELETE FROM question_subcategories WHERE question_id = ?1")
            .bind(question.id().as_str())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (position, tag) in question.subcategories().iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("position overflow".into()))?;
            sqlx::query(
                r"
                    INSERT INTO question_subcategories (question_id, subcategory, position)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(question_id, subcategory) DO NOTHING
                ",
            )
            .bind(question.id().as_str())
            .bind(tag)
            .bind(position)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn fetch_questions(
        &self,
        category: &str,
        filter: &SubcategoryFilter,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = match filter {
            SubcategoryFilter::All => {
                let sql = format!("{SELECT_QUESTION} WHERE q.category = ?1 ORDER BY q.id");
                sqlx::query(&sql)
                    .bind(category)
                    .fetch_all(&self.pool)
                    .await
            }
            SubcategoryFilter::Tag(tag) => {
                let sql = format!(
                    "{SELECT_QUESTION} WHERE q.id IN (
                        SELECT question_id FROM question_subcategories WHERE subcategory = ?1
                    ) ORDER BY q.id"
                );
                sqlx::query(&sql).bind(tag).fetch_all(&self.pool).await
            }
        }
        .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_question_row(&row)?);
        }
        Ok(out)
    }

    async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>, StorageError> {
        let sql = format!("{SELECT_QUESTION} WHERE q.id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_question_row).transpose()
    }
}
