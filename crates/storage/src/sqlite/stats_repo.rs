use trivia_core::model::{
    CategoryStats, CategoryStatsDelta, CumulativeStats, StatsDelta, UserId,
};

use super::SqliteRepository;
use super::mapping::{conn, i64_from_u64, map_category_stats_row, map_stats_row, ser};
use crate::repository::{StatsRepository, StorageError};

const SELECT_STATS: &str = r"
    SELECT
        total_quizzes, correct_answers, incorrect_answers, total_perfect_quizzes,
        longest_streak_correct, longest_streak_wrong, yellow_cards, red_cards,
        score_distribution, correct_percentage, perfect_quiz_percentage,
        yellow_card_rate, red_card_rate
    FROM user_stats
    WHERE user_id = ?1
";

const SELECT_CATEGORY_STATS: &str = r"
    SELECT subcategory, quizzes_played, correct_answers, incorrect_answers, correct_percentage
    FROM category_stats
";

#[async_trait::async_trait]
impl StatsRepository for SqliteRepository {
    async fn get_stats(&self, user: &UserId) -> Result<Option<CumulativeStats>, StorageError> {
        let row = sqlx::query(SELECT_STATS)
            .bind(user.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        row.as_ref().map(map_stats_row).transpose()
    }

    async fn merge_stats(
        &self,
        user: &UserId,
        delta: &StatsDelta,
    ) -> Result<CumulativeStats, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let row = sqlx::query(SELECT_STATS)
            .bind(user.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;
        let mut stats = row.as_ref().map(map_stats_row).transpose()?.unwrap_or_default();
        stats.apply(delta);

        let distribution = serde_json::to_string(&stats.score_distribution).map_err(ser)?;
        sqlx::query(
            r"
                INSERT INTO user_stats (
                    user_id, total_quizzes, correct_answers, incorrect_answers,
                    total_perfect_quizzes, longest_streak_correct, longest_streak_wrong,
                    yellow_cards, red_cards, score_distribution, correct_percentage,
                    perfect_quiz_percentage, yellow_card_rate, red_card_rate
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                ON CONFLICT(user_id) DO UPDATE SET
                    total_quizzes = excluded.total_quizzes,
                    correct_answers = excluded.correct_answers,
                    incorrect_answers = excluded.incorrect_answers,
                    total_perfect_quizzes = excluded.total_perfect_quizzes,
                    longest_streak_correct = excluded.longest_streak_correct,
                    longest_streak_wrong = excluded.longest_streak_wrong,
                    yellow_cards = excluded.yellow_cards,
                    red_cards = excluded.red_cards,
                    score_distribution = excluded.score_distribution,
                    correct_percentage = excluded.correct_percentage,
                    perfect_quiz_percentage = excluded.perfect_quiz_percentage,
                    yellow_card_rate = excluded.yellow_card_rate,
                    red_card_rate = excluded.red_card_rate
            ",
        )
        .bind(user.as_str())
        .bind(i64_from_u64("total_quizzes", stats.total_quizzes)?)
        .bind(i64_from_u64("correct_answers", stats.correct_answers)?)
        .bind(i64_from_u64("incorrect_answers", stats.incorrect_answers)?)
        .bind(i64_from_u64("total_perfect_quizzes", stats.total_perfect_quizzes)?)
        .bind(i64::from(stats.longest_streak_correct))
        .bind(i64::from(stats.longest_streak_wrong))
        .bind(i64_from_u64("yellow_cards", stats.yellow_cards)?)
        .bind(i64_from_u64("red_cards", stats.red_cards)?)
        .bind(distribution)
        .bind(stats.correct_percentage)
        .bind(stats.perfect_quiz_percentage)
        .bind(stats.yellow_card_rate)
        .bind(stats.red_card_rate)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(stats)
    }

    async fn merge_category_stats(
        &self,
        user: &UserId,
        subcategory: &str,
        delta: CategoryStatsDelta,
    ) -> Result<CategoryStats, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let sql = format!("{SELECT_CATEGORY_STATS} WHERE user_id = ?1 AND subcategory = ?2");
        let row = sqlx::query(&sql)
            .bind(user.as_str())
            .bind(subcategory)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;
        let mut stats = row
            .as_ref()
            .map(map_category_stats_row)
            .transpose()?
            .unwrap_or_else(|| CategoryStats::empty(subcategory));
        stats.apply(delta);

        sqlx::query(
            r"
                INSERT INTO category_stats (
                    user_id, subcategory, quizzes_played, correct_answers,
                    incorrect_answers, correct_percentage
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(user_id, subcategory) DO UPDATE SET
                    quizzes_played = excluded.quizzes_played,
                    correct_answers = excluded.correct_answers,
                    incorrect_answers = excluded.incorrect_answers,
                    correct_percentage = excluded.correct_percentage
            ",
        )
        .bind(user.as_str())
        .bind(subcategory)
        .bind(i64_from_u64("quizzes_played", stats.quizzes_played)?)
        .bind(i64_from_u64("correct_answers", stats.correct_answers)?)
        .bind(i64_from_u64("incorrect_answers", stats.incorrect_answers)?)
        .bind(stats.correct_percentage)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(stats)
    }

    async fn list_category_stats(&self, user: &UserId) -> Result<Vec<CategoryStats>, StorageError> {
        let sql = format!("{SELECT_CATEGORY_STATS} WHERE user_id = ?1 ORDER BY subcategory");
        let rows = sqlx::query(&sql)
            .bind(user.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_category_stats_row(&row)?);
        }
        Ok(out)
    }
}
