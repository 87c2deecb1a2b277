use services::{CollectionDetail, CollectionGroup, PerformanceBand, Profile};
use trivia_core::model::UserId;

const BAR_WIDTH: u64 = 30;

fn band_label(band: PerformanceBand) -> &'static str {
    match band {
        PerformanceBand::Strong => "good",
        PerformanceBand::Fair => "fair",
        PerformanceBand::Weak => "poor",
    }
}

pub fn print_profile(user: &UserId, profile: &Profile) {
    let stats = &profile.overall;
    println!("Profile: {user}");
    println!("  Quizzes played:    {}", stats.total_quizzes);
    println!("  Correct answers:   {}", stats.correct_answers);
    println!("  Incorrect answers: {}", stats.incorrect_answers);
    println!(
        "  Correct:           {:.1}% ({})",
        stats.correct_percentage,
        band_label(PerformanceBand::for_percentage(stats.correct_percentage))
    );
    println!("  Perfect quizzes:   {}", stats.total_perfect_quizzes);
    println!(
        "  Perfect:           {:.1}% ({})",
        stats.perfect_quiz_percentage,
        band_label(PerformanceBand::for_percentage(stats.perfect_quiz_percentage))
    );
    println!("  Longest streak:    {}", stats.longest_streak_correct);
    println!("  Longest wrong run: {}", stats.longest_streak_wrong);
    println!("  Yellow cards:      {}", stats.yellow_cards);
    println!("  Red cards:         {}", stats.red_cards);
    println!(
        "  Yellow card rate:  {:.1}% ({})",
        stats.yellow_card_rate,
        band_label(PerformanceBand::for_card_rate(stats.yellow_card_rate))
    );
    println!(
        "  Red card rate:     {:.1}% ({})",
        stats.red_card_rate,
        band_label(PerformanceBand::for_card_rate(stats.red_card_rate))
    );

    println!();
    println!("Score distribution (correct answers per quiz):");
    let peak = profile
        .distribution
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0)
        .max(1);
    for (bucket, count) in &profile.distribution {
        let width = usize::try_from(count * BAR_WIDTH / peak).unwrap_or(0);
        println!("  {bucket:>2} | {:<30} {count}", "#".repeat(width));
    }

    if profile.categories.is_empty() {
        return;
    }
    println!();
    println!("By subcategory:");
    for category in &profile.categories {
        println!(
            "  {:<28} played {:>3}  correct {:>4}  wrong {:>4}  {:>5.1}%",
            category.subcategory,
            category.quizzes_played,
            category.correct_answers,
            category.incorrect_answers,
            category.correct_percentage
        );
    }
}

pub fn print_collection_overview(groups: &[CollectionGroup]) {
    println!("Collection book");
    for group in groups {
        println!();
        println!("{}", group.name);
        for sub in &group.subcategories {
            println!(
                "  {:<28} {:>4} / {:<4} ({}%)",
                sub.subcategory, sub.seen, sub.total, sub.percent
            );
        }
    }
}

pub fn print_collection_detail(detail: &CollectionDetail) {
    let progress = &detail.progress;
    println!(
        "{}: {} / {} questions seen ({}%)",
        progress.subcategory, progress.seen, progress.total, progress.percent
    );
    if detail.rows.is_empty() {
        println!("  Nothing seen yet.");
        return;
    }
    for row in &detail.rows {
        println!();
        println!("  {}", row.question);
        println!(
            "    correct {}  wrong {}  seen {}x  {:.1}% correct  last seen {}",
            row.correct,
            row.incorrect,
            row.total,
            row.correct_percent,
            row.last_seen.format("%Y-%m-%d %H:%M")
        );
    }
}
