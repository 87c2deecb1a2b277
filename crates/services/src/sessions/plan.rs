use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

use trivia_core::QuizSettings;
use trivia_core::model::catalog::supports_difficulty_modes;
use trivia_core::model::{
    Difficulty, DifficultyMode, Question, SubcategoryFilter, effective_subcategory,
};

//
// ─── REQUEST ───────────────────────────────────────────────────────────────────
//

/// What the player asked to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    pub category: String,
    pub subcategory: SubcategoryFilter,
    pub mode: DifficultyMode,
}

impl QuizRequest {
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        subcategory: SubcategoryFilter,
        mode: DifficultyMode,
    ) -> Self {
        Self {
            category: category.into(),
            subcategory,
            mode,
        }
    }

    /// Subcategory that stats and collection entries are filed under.
    #[must_use]
    pub fn effective_subcategory(&self) -> &str {
        effective_subcategory(&self.category, &self.subcategory)
    }

    /// Requested mode, downgraded to `Default` for pools too small to split.
    #[must_use]
    pub fn effective_mode(&self) -> DifficultyMode {
        match self.subcategory.tag() {
            Some(tag) if !supports_difficulty_modes(tag) => DifficultyMode::Default,
            _ => self.mode,
        }
    }
}

//
// ─── QUIZ SET ──────────────────────────────────────────────────────────────────
//

/// Ordered questions chosen for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSet {
    questions: Vec<Question>,
    mode: DifficultyMode,
}

impl QuizSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Mode the set was actually built with.
    #[must_use]
    pub fn mode(&self) -> DifficultyMode {
        self.mode
    }
}

//
// ─── BUILDER ───────────────────────────────────────────────────────────────────
//

/// Picks a quiz set from a fetched pool according to difficulty mode.
pub struct QuizSetBuilder<'a> {
    settings: &'a QuizSettings,
    mode: DifficultyMode,
}

impl<'a> QuizSetBuilder<'a> {
    #[must_use]
    pub fn new(settings: &'a QuizSettings, mode: DifficultyMode) -> Self {
        Self { settings, mode }
    }

    /// Build a quiz set from `pool` using `rng` for every shuffle.
    ///
    /// - `Default` mode draws up to `picks_per_half` from easy+default and up
    ///   to `picks_per_half` from hard+default, sharing one dedupe set, then
    ///   shuffles the union.
    /// - `Easy`/`Hard` keep matching or untagged questions and take up to
    ///   `questions_per_quiz`.
    ///
    /// Questions are unique by text within a set. A short pool yields a short
    /// set; an empty pool yields an empty set.
    pub fn build<R: Rng + ?Sized>(self, pool: Vec<Question>, rng: &mut R) -> QuizSet {
        let questions = match self.mode {
            DifficultyMode::Default => self.build_mixed(&pool, rng),
            DifficultyMode::Easy | DifficultyMode::Hard => self.build_single(&pool, rng),
        };

        QuizSet {
            questions,
            mode: self.mode,
        }
    }

    fn build_mixed<R: Rng + ?Sized>(&self, pool: &[Question], rng: &mut R) -> Vec<Question> {
        let per_half = self.settings.picks_per_half();

        let mut easy_side: Vec<&Question> = pool
            .iter()
            .filter(|q| matches!(q.difficulty(), Difficulty::Easy | Difficulty::Default))
            .collect();
        let mut hard_side: Vec<&Question> = pool
            .iter()
            .filter(|q| matches!(q.difficulty(), Difficulty::Hard | Difficulty::Default))
            .collect();
        easy_side.shuffle(rng);
        hard_side.shuffle(rng);

        let mut seen_texts = HashSet::new();
        let mut picked = take_unique(&easy_side, &mut seen_texts, per_half);
        picked.extend(take_unique(&hard_side, &mut seen_texts, per_half));
        picked.shuffle(rng);

        picked.into_iter().cloned().collect()
    }

    fn build_single<R: Rng + ?Sized>(&self, pool: &[Question], rng: &mut R) -> Vec<Question> {
        let mut candidates: Vec<&Question> = pool
            .iter()
            .filter(|q| self.mode.admits(q.difficulty()))
            .collect();
        candidates.shuffle(rng);

        let mut seen_texts = HashSet::new();
        take_unique(&candidates, &mut seen_texts, self.settings.questions_per_quiz())
            .into_iter()
            .cloned()
            .collect()
    }
}

/// Walk `candidates` in order, keeping questions whose text has not been seen,
/// until `limit` are kept.
fn take_unique<'q>(
    candidates: &[&'q Question],
    seen_texts: &mut HashSet<&'q str>,
    limit: usize,
) -> Vec<&'q Question> {
    let mut kept = Vec::new();
    for question in candidates {
        if kept.len() == limit {
            break;
        }
        if seen_texts.insert(question.text()) {
            kept.push(*question);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use trivia_core::model::QuestionId;

    fn question(id: &str, text: &str, difficulty: Difficulty) -> Question {
        Question::new(
            QuestionId::new(id),
            text,
            vec!["A".into(), "B".into(), "C".into(), "D".into()],
            "A",
            "International",
            vec!["UEFA".into()],
            difficulty,
        )
        .unwrap()
    }

    fn pool(easy: usize, hard: usize, default: usize) -> Vec<Question> {
        let mut out = Vec::new();
        for i in 0..easy {
            out.push(question(&format!("e{i}"), &format!("easy {i}"), Difficulty::Easy));
        }
        for i in 0..hard {
            out.push(question(&format!("h{i}"), &format!("hard {i}"), Difficulty::Hard));
        }
        for i in 0..default {
            out.push(question(&format!("d{i}"), &format!("plain {i}"), Difficulty::Default));
        }
        out
    }

    fn unique_texts(set: &QuizSet) -> usize {
        set.questions()
            .iter()
            .map(Question::text)
            .collect::<HashSet<_>>()
            .len()
    }

    #[test]
    fn default_mode_takes_five_and_five() {
        let settings = QuizSettings::default();
        let mut rng = StdRng::seed_from_u64(7);
        let set = QuizSetBuilder::new(&settings, DifficultyMode::Default)
            .build(pool(5, 5, 0), &mut rng);

        assert_eq!(set.len(), 10);
        assert_eq!(unique_texts(&set), 10);
        let easy = set
            .questions()
            .iter()
            .filter(|q| q.difficulty() == Difficulty::Easy)
            .count();
        assert_eq!(easy, 5);
    }

    #[test]
    fn default_mode_interleaves_halves() {
        let settings = QuizSettings::default();
        let easy_first = (0..20u64)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                QuizSetBuilder::new(&settings, DifficultyMode::Default)
                    .build(pool(5, 5, 0), &mut rng)
            })
            .filter(|set| {
                set.questions()[..5]
                    .iter()
                    .all(|q| q.difficulty() == Difficulty::Easy)
            })
            .count();
        assert!(easy_first < 20);
    }

    #[test]
    fn default_mode_shares_dedupe_across_halves() {
        let settings = QuizSettings::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut questions = pool(0, 0, 6);
        questions.push(question("dup", "plain 0", Difficulty::Easy));
        let set = QuizSetBuilder::new(&settings, DifficultyMode::Default)
            .build(questions, &mut rng);

        assert_eq!(set.len(), 6);
        assert_eq!(unique_texts(&set), 6);
    }

    #[test]
    fn easy_mode_excludes_hard_questions() {
        let settings = QuizSettings::default();
        let mut rng = StdRng::seed_from_u64(11);
        let set = QuizSetBuilder::new(&settings, DifficultyMode::Easy)
            .build(pool(4, 20, 3), &mut rng);

        assert_eq!(set.len(), 7);
        assert!(set
            .questions()
            .iter()
            .all(|q| q.difficulty() != Difficulty::Hard));
        assert_eq!(set.mode(), DifficultyMode::Easy);
    }

    #[test]
    fn hard_mode_caps_at_quiz_length() {
        let settings = QuizSettings::default();
        let mut rng = StdRng::seed_from_u64(5);
        let set = QuizSetBuilder::new(&settings, DifficultyMode::Hard)
            .build(pool(0, 30, 0), &mut rng);

        assert_eq!(set.len(), settings.questions_per_quiz());
        assert_eq!(unique_texts(&set), set.len());
    }

    #[test]
    fn empty_pool_builds_empty_set() {
        let settings = QuizSettings::default();
        let mut rng = StdRng::seed_from_u64(1);
        let set = QuizSetBuilder::new(&settings, DifficultyMode::Default)
            .build(Vec::new(), &mut rng);
        assert!(set.is_empty());
    }

    #[test]
    fn small_pools_fall_back_to_default_mode() {
        let request = QuizRequest::new(
            "International",
            SubcategoryFilter::Tag("CAF".into()),
            DifficultyMode::Hard,
        );
        assert_eq!(request.effective_mode(), DifficultyMode::Default);
        assert_eq!(request.effective_subcategory(), "CAF");

        let uefa = QuizRequest::new(
            "International",
            SubcategoryFilter::Tag("UEFA".into()),
            DifficultyMode::Hard,
        );
        assert_eq!(uefa.effective_mode(), DifficultyMode::Hard);

        let all = QuizRequest::new("Transfers", SubcategoryFilter::All, DifficultyMode::Easy);
        assert_eq!(all.effective_mode(), DifficultyMode::Easy);
        assert_eq!(all.effective_subcategory(), "Transfers");
    }
}
