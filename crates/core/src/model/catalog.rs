//! Static category tables shared by the pickers and the collection book.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subcategory wildcard meaning "every question in the category".
pub const ALL_SUBCATEGORIES: &str = "All";

/// Category → subcategories offered to the player (each list starts with `All`).
pub const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "International",
        &["All", "World Cup", "UEFA", "CONMEBOL", "CONCACAF", "CAF", "AFC", "OFC"],
    ),
    (
        "Domestic Leagues",
        &[
            "All",
            "Premier League",
            "La Liga",
            "Serie A",
            "Bundesliga",
            "Ligue 1",
            "MLS",
            "Rest of World",
        ],
    ),
    (
        "Transfers",
        &["All", "Transfer Fees", "Market Value", "Career Paths"],
    ),
    (
        "Time Periods",
        &["All", "2020s", "2010s", "2000s", "1990s", "1980s", "1970s or Earlier"],
    ),
    (
        "Cup Competitions",
        &[
            "All",
            "FIFA Club World Cup",
            "UEFA Champions League",
            "UEFA Europa League",
            "UEFA Conference League",
            "Domestic Cups",
            "Continental Rest of World",
        ],
    ),
];

/// Subcategories whose pools are too small for easy/hard splits.
pub const DEFAULT_MODE_ONLY: &[&str] = &[
    "CONCACAF",
    "CAF",
    "AFC",
    "OFC",
    "MLS",
    "Rest of World",
    "2000s",
    "1990s",
    "1980s",
    "1970s or Earlier",
];

/// Collection-book grouping and nominal pool size per subcategory.
pub const COLLECTION_GROUPS: &[(&str, &[(&str, u32)])] = &[
    (
        "International",
        &[
            ("World Cup", 300),
            ("UEFA", 200),
            ("CONMEBOL", 150),
            ("CONCACAF", 120),
            ("CAF", 100),
            ("AFC", 100),
            ("OFC", 80),
        ],
    ),
    (
        "Leagues",
        &[
            ("Premier League", 300),
            ("La Liga", 280),
            ("Serie A", 250),
            ("Bundesliga", 240),
            ("Ligue 1", 220),
            ("MLS", 180),
            ("Rest of World", 150),
        ],
    ),
    (
        "Club Competitions",
        &[
            ("UEFA Champions League", 400),
            ("UEFA Europa League", 250),
            ("UEFA Conference League", 150),
            ("Domestic Cups", 200),
            ("Club World Cup", 90),
        ],
    ),
    (
        "Transfers",
        &[
            ("Transfer Fees", 200),
            ("Transfer Facts", 180),
            ("Market Value", 160),
            ("Career Paths", 140),
        ],
    ),
    (
        "Time Periods",
        &[
            ("2020s", 300),
            ("2010s", 280),
            ("2000s", 250),
            ("1990s", 200),
            ("1980s", 150),
            ("1970s or Earlier", 100),
        ],
    ),
];

/// How a session narrows the question pool inside a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubcategoryFilter {
    /// Every question whose category matches.
    All,
    /// Questions tagged with this subcategory, regardless of category.
    Tag(String),
}

impl SubcategoryFilter {
    /// Parse a route-style value; `All` maps to the wildcard.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == ALL_SUBCATEGORIES {
            Self::All
        } else {
            Self::Tag(trimmed.to_owned())
        }
    }

    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Tag(tag) => Some(tag),
        }
    }
}

impl fmt::Display for SubcategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_SUBCATEGORIES),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

/// The subcategory per-category stats are filed under.
///
/// The wildcard files under the category name itself.
#[must_use]
pub fn effective_subcategory<'a>(category: &'a str, filter: &'a SubcategoryFilter) -> &'a str {
    filter.tag().unwrap_or(category)
}

/// Whether `name` has a page in the collection book.
#[must_use]
pub fn is_collection_subcategory(name: &str) -> bool {
    COLLECTION_GROUPS
        .iter()
        .flat_map(|(_, subs)| subs.iter())
        .any(|(sub, _)| *sub == name)
}

/// The collection-book page a sighting of a question with `tags` is filed
/// under.
///
/// The requested tag wins when the question carries it, then the first tag
/// with a collection page, then the first tag. Untagged questions fall back
/// to [`effective_subcategory`].
#[must_use]
pub fn collection_subcategory<'a>(
    tags: &'a [String],
    category: &'a str,
    filter: &'a SubcategoryFilter,
) -> &'a str {
    if let Some(tag) = filter.tag().filter(|t| tags.iter().any(|s| s.as_str() == *t)) {
        return tag;
    }
    tags.iter()
        .find(|t| is_collection_subcategory(t))
        .or_else(|| tags.first())
        .map_or_else(|| effective_subcategory(category, filter), String::as_str)
}

/// Subcategories offered for `category`, or an empty slice for unknown names.
#[must_use]
pub fn subcategories_of(category: &str) -> &'static [&'static str] {
    CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map_or(&[], |(_, subs)| *subs)
}

#[must_use]
pub fn supports_difficulty_modes(subcategory: &str) -> bool {
    !DEFAULT_MODE_ONLY.contains(&subcategory)
}

/// Nominal pool size used as the "seen" denominator; unknown names count as 1.
#[must_use]
pub fn pool_size(subcategory: &str) -> u32 {
    COLLECTION_GROUPS
        .iter()
        .flat_map(|(_, subs)| subs.iter())
        .find(|(name, _)| *name == subcategory)
        .map_or(1, |(_, size)| *size)
}
