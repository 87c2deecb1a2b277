use sqlx::Row;
use trivia_core::model::{
    CategoryStats, CollectionEntry, CumulativeStats, Difficulty, Question, QuestionId,
    ScoreDistribution,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn i64_from_u64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn get_u64(row: &sqlx::sqlite::SqliteRow, field: &'static str) -> Result<u64, StorageError> {
    u64_from_i64(field, row.try_get::<i64, _>(field).map_err(ser)?)
}

fn get_u32(row: &sqlx::sqlite::SqliteRow, field: &'static str) -> Result<u32, StorageError> {
    u32_from_i64(field, row.try_get::<i64, _>(field).map_err(ser)?)
}

/// Stored difficulty tags are lenient: anything but `easy`/`hard` reads back as default.
pub(crate) fn parse_difficulty(s: &str) -> Difficulty {
    Difficulty::from_tag(Some(s))
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let options: Vec<String> =
        serde_json::from_str(&row.try_get::<String, _>("options").map_err(ser)?).map_err(ser)?;
    let subcategories: Vec<String> = serde_json::from_str(
        &row.try_get::<Option<String>, _>("subcategories")
            .map_err(ser)?
            .unwrap_or_else(|| "[]".to_owned()),
    )
    .map_err(ser)?;
    let difficulty: String = row.try_get("difficulty").map_err(ser)?;

    Question::new(
        QuestionId::new(row.try_get::<String, _>("id").map_err(ser)?),
        row.try_get::<String, _>("text").map_err(ser)?,
        options,
        row.try_get::<String, _>("answer").map_err(ser)?,
        row.try_get::<String, _>("category").map_err(ser)?,
        subcategories,
        parse_difficulty(&difficulty),
    )
    .map_err(ser)
}

pub(crate) fn map_stats_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<CumulativeStats, StorageError> {
    let score_distribution: ScoreDistribution =
        serde_json::from_str(&row.try_get::<String, _>("score_distribution").map_err(ser)?)
            .map_err(ser)?;

    Ok(CumulativeStats {
        total_quizzes: get_u64(row, "total_quizzes")?,
        correct_answers: get_u64(row, "correct_answers")?,
        incorrect_answers: get_u64(row, "incorrect_answers")?,
        total_perfect_quizzes: get_u64(row, "total_perfect_quizzes")?,
        longest_streak_correct: get_u32(row, "longest_streak_correct")?,
        longest_streak_wrong: get_u32(row, "longest_streak_wrong")?,
        yellow_cards: get_u64(row, "yellow_cards")?,
        red_cards: get_u64(row, "red_cards")?,
        score_distribution,
        correct_percentage: row.try_get("correct_percentage").map_err(ser)?,
        perfect_quiz_percentage: row.try_get("perfect_quiz_percentage").map_err(ser)?,
        yellow_card_rate: row.try_get("yellow_card_rate").map_err(ser)?,
        red_card_rate: row.try_get("red_card_rate").map_err(ser)?,
    })
}

pub(crate) fn map_category_stats_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<CategoryStats, StorageError> {
    Ok(CategoryStats {
        subcategory: row.try_get("subcategory").map_err(ser)?,
        quizzes_played: get_u64(row, "quizzes_played")?,
        correct_answers: get_u64(row, "correct_answers")?,
        incorrect_answers: get_u64(row, "incorrect_answers")?,
        correct_percentage: row.try_get("correct_percentage").map_err(ser)?,
    })
}

pub(crate) fn map_entry_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<CollectionEntry, StorageError> {
    Ok(CollectionEntry {
        question_id: QuestionId::new(row.try_get::<String, _>("question_id").map_err(ser)?),
        subcategory: row.try_get("subcategory").map_err(ser)?,
        correct_count: get_u32(row, "correct_count")?,
        incorrect_count: get_u32(row, "incorrect_count")?,
        first_seen: row.try_get("first_seen").map_err(ser)?,
        last_seen: row.try_get("last_seen").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_difficulty_reads_as_default() {
        assert_eq!(parse_difficulty("hard"), Difficulty::Hard);
        assert_eq!(parse_difficulty("legendary"), Difficulty::Default);
    }

    #[test]
    fn negative_counters_are_rejected() {
        assert!(u64_from_i64("total_quizzes", -1).is_err());
        assert_eq!(u32_from_i64("streak", 7).unwrap(), 7);
    }
}
