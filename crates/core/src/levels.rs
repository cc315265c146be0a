//! Level reference table and level arithmetic.
//!
//! Levels are immutable reference data, not user state: a named tier
//! unlocked at a fixed experience threshold. Thresholds are strictly
//! increasing and level 1 requires 0 XP, so every experience value maps to
//! exactly one level.

use serde::Serialize;

/// A named experience tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Level {
    pub level: u32,
    pub name: &'static str,
    pub icon: &'static str,
    pub experience_required: u64,
}

/// The static level ladder, ordered by `level`.
pub const LEVELS: &[Level] = &[
    Level { level: 1, name: "תלמיד", icon: "🌱", experience_required: 0 },
    Level { level: 2, name: "שוקד", icon: "📗", experience_required: 500 },
    Level { level: 3, name: "חרוץ", icon: "📘", experience_required: 1500 },
    Level { level: 4, name: "מבין", icon: "📙", experience_required: 3500 },
    Level { level: 5, name: "משכיל", icon: "🔮", experience_required: 7000 },
    Level { level: 6, name: "יודע", icon: "🏛️", experience_required: 12000 },
    Level { level: 7, name: "מעמיק", icon: "🔭", experience_required: 20000 },
    Level { level: 8, name: "חכם", icon: "👑", experience_required: 32000 },
    Level { level: 9, name: "נבון", icon: "💎", experience_required: 50000 },
    Level { level: 10, name: "תלמיד חכם", icon: "🌟", experience_required: 75000 },
];

/// The highest level whose threshold is at or below `experience`.
///
/// The boundary is inclusive: reaching exactly a level's threshold counts
/// as that level.
pub fn level_for_experience(experience: u64) -> &'static Level {
    let mut current = &LEVELS[0];
    for level in LEVELS {
        if experience >= level.experience_required {
            current = level;
        } else {
            break;
        }
    }
    current
}

/// Percentage of the way from the current level's threshold to the next,
/// rounded to the nearest integer. Returns 0 at the final level.
pub fn level_progress(experience: u64) -> u8 {
    let current = level_for_experience(experience);
    let next = match LEVELS.iter().find(|l| l.level == current.level + 1) {
        Some(next) => next,
        None => return 0,
    };
    let range = next.experience_required - current.experience_required;
    let into = experience - current.experience_required;
    ((into as f64 / range as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_strictly_increase_and_start_at_zero() {
        assert_eq!(LEVELS[0].experience_required, 0);
        for pair in LEVELS.windows(2) {
            assert!(pair[0].experience_required < pair[1].experience_required);
            assert_eq!(pair[0].level + 1, pair[1].level);
        }
    }

    #[test]
    fn zero_experience_is_level_one() {
        assert_eq!(level_for_experience(0).level, 1);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        for level in LEVELS {
            assert_eq!(
                level_for_experience(level.experience_required).level,
                level.level
            );
        }
    }

    #[test]
    fn just_below_threshold_is_previous_level() {
        assert_eq!(level_for_experience(499).level, 1);
        assert_eq!(level_for_experience(1499).level, 2);
    }

    #[test]
    fn level_is_monotone_in_experience() {
        let mut previous = 0;
        for xp in (0..80_000).step_by(250) {
            let level = level_for_experience(xp).level;
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn beyond_final_threshold_stays_at_final_level() {
        assert_eq!(level_for_experience(1_000_000).level, 10);
    }

    #[test]
    fn progress_at_level_start_is_zero() {
        assert_eq!(level_progress(0), 0);
        assert_eq!(level_progress(500), 0);
    }

    #[test]
    fn progress_midway_rounds_to_nearest() {
        // Level 1 spans 0..500; 250 XP is exactly half.
        assert_eq!(level_progress(250), 50);
        // 333/500 = 66.6% -> 67.
        assert_eq!(level_progress(333), 67);
    }

    #[test]
    fn progress_at_final_level_is_zero() {
        assert_eq!(level_progress(75_000), 0);
        assert_eq!(level_progress(200_000), 0);
    }
}
