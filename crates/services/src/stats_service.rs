use std::sync::Arc;

use tracing::{debug, info};

use storage::repository::StatsRepository;
use trivia_core::model::{
    CategoryStats, CategoryStatsDelta, CumulativeStats, SessionSummary, StatsDelta,
    SubcategoryFilter, UserId, effective_subcategory,
};

use crate::error::StatsServiceError;

/// Highest bucket shown in the score histogram.
pub const DISTRIBUTION_BUCKETS: u32 = 10;

/// Coarse rating used to color percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceBand {
    Strong,
    Fair,
    Weak,
}

impl PerformanceBand {
    /// 80 and above is strong, 50 and above is fair.
    #[must_use]
    pub fn for_percentage(percent: f64) -> Self {
        if percent >= 80.0 {
            Self::Strong
        } else if percent >= 50.0 {
            Self::Fair
        } else {
            Self::Weak
        }
    }

    /// Card rates read the other way round: fewer bookings is better.
    #[must_use]
    pub fn for_card_rate(rate: f64) -> Self {
        Self::for_percentage(100.0 - rate)
    }
}

/// Everything the profile screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub overall: CumulativeStats,
    /// `(correct answers, quizzes)` for every bucket in `0..=10`.
    pub distribution: Vec<(u32, u64)>,
    pub categories: Vec<CategoryStats>,
}

/// Folds finished sessions into cumulative records and reads them back.
#[derive(Clone)]
pub struct StatsService {
    stats: Arc<dyn StatsRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(stats: Arc<dyn StatsRepository>) -> Self {
        Self { stats }
    }

    /// Merge one completed session into the overall and per-subcategory
    /// records.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` if either merge fails. The overall
    /// merge is attempted first; a failing category merge does not undo it.
    pub async fn record_session(
        &self,
        user: &UserId,
        category: &str,
        filter: &SubcategoryFilter,
        summary: &SessionSummary,
    ) -> Result<(CumulativeStats, CategoryStats), StatsServiceError> {
        let subcategory = effective_subcategory(category, filter);

        let overall = self
            .stats
            .merge_stats(user, &StatsDelta::from_summary(summary))
            .await?;
        let category_stats = self
            .stats
            .merge_category_stats(user, subcategory, CategoryStatsDelta::from_summary(summary))
            .await?;

        info!(
            user_id = %user,
            subcategory,
            score = summary.score(),
            total_quizzes = overall.total_quizzes,
            "session stats merged"
        );
        Ok((overall, category_stats))
    }

    /// Load the profile for `user`; a user with no history gets zeros.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` if repository access fails.
    pub async fn profile(&self, user: &UserId) -> Result<Profile, StatsServiceError> {
        let overall = self.stats.get_stats(user).await?.unwrap_or_default();
        let categories = self.stats.list_category_stats(user).await?;
        debug!(user_id = %user, categories = categories.len(), "profile loaded");

        Ok(Profile {
            distribution: overall.score_distribution.buckets(DISTRIBUTION_BUCKETS),
            overall,
            categories,
        })
    }
}
