//! Points for a correct answer as a function of how long the player took.

use crate::settings::ScoringRules;

/// Points awarded for a correct answer submitted after `elapsed_ticks`.
///
/// Non-increasing in `elapsed_ticks` and never below `rules.floor`. Timeouts
/// and wrong answers never reach this function; they score 0.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn award(elapsed_ticks: u32, rules: &ScoringRules) -> u32 {
    let elapsed = f64::from(elapsed_ticks);
    let raw = f64::from(rules.max_points)
        - (elapsed / f64::from(rules.decay_ticks)) * f64::from(rules.decay_points);
    let rounded = raw.round();
    if rounded <= f64::from(rules.floor) {
        rules.floor
    } else {
        rounded as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ScoringRules {
        ScoringRules::default()
    }

    #[test]
    fn instant_answer_scores_maximum() {
        assert_eq!(award(0, &rules()), 1000);
    }

    #[test]
    fn full_budget_hits_floor() {
        assert_eq!(award(150, &rules()), 300);
    }

    #[test]
    fn floor_holds_past_budget() {
        assert_eq!(award(300, &rules()), 300);
        assert_eq!(award(u32::MAX, &rules()), 300);
    }

    #[test]
    fn rounds_to_nearest_point() {
        // 1000 - 1/150 * 700 = 995.33
        assert_eq!(award(1, &rules()), 995);
        // 1000 - 75/150 * 700 = 650
        assert_eq!(award(75, &rules()), 650);
    }

    #[test]
    fn non_increasing_over_time() {
        let r = rules();
        let mut previous = award(0, &r);
        for ticks in 1..=400 {
            let current = award(ticks, &r);
            assert!(current <= previous, "award rose at tick {ticks}");
            previous = current;
        }
    }
}
