//! Progress & rewards engine: the sole mutator of a user's gamification
//! state.
//!
//! One engine instance per user session, owned by the caller (no global
//! store). Each [`RewardsEngine::complete_lesson`] call is a single atomic
//! state transition: experience, torah points, wisdom coins, streak, daily
//! activity, lesson progress, badges, and the transient level-up / new-badge
//! signals are all updated together. The engine is pure and synchronous;
//! the caller supplies its local wall-clock time.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::badges;
use crate::levels::{self, Level};

// ---------------------------------------------------------------------------
// Reward constants
// ---------------------------------------------------------------------------

/// Base experience for completing a lesson.
pub const LESSON_XP: u64 = 100;
/// Extra experience for the first completion of a calendar day.
pub const FIRST_OF_DAY_XP: u64 = 25;
/// Torah points per completion. Flat, never multiplied.
pub const TORAH_POINTS_PER_LESSON: u64 = 10;
/// Completions in one day required for the marathon badge.
pub const MARATHON_LESSONS_PER_DAY: u32 = 5;
/// Most recent daily-activity records retained (FIFO by insertion).
pub const MAX_DAILY_ACTIVITY_RECORDS: usize = 365;

/// One-time streak milestones: `(streak, bonus_xp, bonus_wisdom_coins)`.
///
/// These trigger on exact equality only. A user whose streak jumps past a
/// milestone (broken streak, backfill) gets nothing retroactively.
pub const STREAK_MILESTONES: &[(u32, u64, u64)] = &[(3, 30, 1), (7, 100, 5), (30, 500, 25)];

/// Experience multiplier for the current streak length, applied to the
/// whole gain of a completion (base + milestone bonus).
pub fn streak_multiplier(streak: u32) -> f64 {
    if streak >= 100 {
        3.0
    } else if streak >= 60 {
        2.5
    } else if streak >= 30 {
        2.0
    } else if streak >= 14 {
        1.5
    } else if streak >= 7 {
        1.25
    } else if streak >= 3 {
        1.1
    } else {
        1.0
    }
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

/// Per-lesson progress for one user.
///
/// `completed` is monotonic (false -> true, never reset) and `completed_at`
/// is set once; later watch-progress updates must not touch either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub lesson_id: String,
    pub completed: bool,
    /// 0..=100; only meaningful while not completed.
    pub watched_percent: u8,
    pub completed_at: Option<NaiveDateTime>,
}

/// One record per calendar day with at least one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub lessons_completed: u32,
}

/// A user's full gamification state.
///
/// `experience`, `torah_points`, and `wisdom_coins` are monotonically
/// non-decreasing; `earned_badges` only grows and preserves insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardsState {
    pub experience: u64,
    pub torah_points: u64,
    pub wisdom_coins: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub daily_activities: Vec<DailyActivity>,
    pub earned_badges: Vec<String>,
    pub lesson_progress: IndexMap<String, LessonProgress>,
    /// New level number if a level-up just occurred; cleared by dismiss.
    #[serde(default)]
    pub pending_level_up: Option<u32>,
    /// First badge earned by the most recent completion; cleared by dismiss.
    #[serde(default)]
    pub pending_new_badge: Option<String>,
}

/// Compact reward summary exchanged with the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardsSnapshot {
    pub experience: u64,
    pub torah_points: u64,
    pub wisdom_coins: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub earned_badges: Vec<String>,
}

/// What a single completion call changed, for toasts and API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    /// The lesson was already completed; nothing changed.
    pub already_completed: bool,
    pub xp_gained: u64,
    pub torah_points_gained: u64,
    pub wisdom_coins_gained: u64,
    pub current_streak: u32,
    /// All badges earned by this call, in rule-evaluation order.
    pub newly_earned_badges: Vec<String>,
    /// New level number if this completion crossed a level threshold.
    pub leveled_up_to: Option<u32>,
}

impl CompletionOutcome {
    fn noop(streak: u32) -> Self {
        Self {
            already_completed: true,
            xp_gained: 0,
            torah_points_gained: 0,
            wisdom_coins_gained: 0,
            current_streak: streak,
            newly_earned_badges: Vec::new(),
            leveled_up_to: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns and mutates one user's [`RewardsState`].
///
/// Not internally synchronized: callers must serialize completion calls per
/// user (the transition is a read-modify-write over the whole state).
#[derive(Debug, Default)]
pub struct RewardsEngine {
    state: RewardsState,
}

impl RewardsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from previously persisted state.
    pub fn from_state(state: RewardsState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &RewardsState {
        &self.state
    }

    /// Wholesale state overwrite, used when the caller imports remote state.
    ///
    /// Reconciliation policy (e.g. "adopt remote only if remote experience
    /// exceeds local") is the caller's decision; the engine just accepts.
    pub fn replace_state(&mut self, state: RewardsState) {
        self.state = state;
    }

    /// Compact summary for the persistence collaborator.
    pub fn snapshot(&self) -> RewardsSnapshot {
        RewardsSnapshot {
            experience: self.state.experience,
            torah_points: self.state.torah_points,
            wisdom_coins: self.state.wisdom_coins,
            current_streak: self.state.current_streak,
            longest_streak: self.state.longest_streak,
            last_activity_date: self.state.last_activity_date,
            earned_badges: self.state.earned_badges.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // State transitions
    // -----------------------------------------------------------------------

    /// Process a lesson completion at the caller's local wall-clock `now`.
    ///
    /// Idempotent: completing an already-completed lesson changes nothing.
    /// Otherwise applies, in one atomic transition: base + first-of-day
    /// experience, the streak state machine, exact-equality streak
    /// milestones, the streak multiplier, torah points, lesson progress,
    /// the FIFO-bounded daily-activity log, badge rules, and level-up
    /// detection.
    pub fn complete_lesson(&mut self, lesson_id: &str, now: NaiveDateTime) -> CompletionOutcome {
        let state = &mut self.state;
        if state
            .lesson_progress
            .get(lesson_id)
            .is_some_and(|p| p.completed)
        {
            return CompletionOutcome::noop(state.current_streak);
        }

        let today = now.date();
        let previous_level = levels::level_for_experience(state.experience).level;

        // Base gain, plus the first-of-day bonus.
        let is_first_completion_today = !state.daily_activities.iter().any(|a| a.date == today);
        let mut xp_gain = LESSON_XP;
        if is_first_completion_today {
            xp_gain += FIRST_OF_DAY_XP;
        }

        // Streak state machine, evaluated against the pre-call state so a
        // second completion on the same day cannot double-increment.
        let new_streak = match state.last_activity_date {
            Some(last) if last == today => state.current_streak,
            Some(last) if last.succ_opt() == Some(today) => state.current_streak + 1,
            _ => 1,
        };

        // One-time milestone bonuses, exact equality only.
        let mut coins_gained = 0;
        for &(milestone, bonus_xp, bonus_coins) in STREAK_MILESTONES {
            if new_streak == milestone {
                xp_gain += bonus_xp;
                coins_gained += bonus_coins;
            }
        }

        // Multiplier applies to the whole gain so far, rounded to nearest.
        xp_gain = (xp_gain as f64 * streak_multiplier(new_streak)).round() as u64;

        state.experience += xp_gain;
        state.torah_points += TORAH_POINTS_PER_LESSON;
        state.wisdom_coins += coins_gained;

        state.lesson_progress.insert(
            lesson_id.to_string(),
            LessonProgress {
                lesson_id: lesson_id.to_string(),
                completed: true,
                watched_percent: 100,
                completed_at: Some(now),
            },
        );

        // Daily activity upsert with FIFO eviction by insertion order.
        let completed_today = match state.daily_activities.iter_mut().find(|a| a.date == today) {
            Some(activity) => {
                activity.lessons_completed += 1;
                activity.lessons_completed
            }
            None => {
                state.daily_activities.push(DailyActivity {
                    date: today,
                    lessons_completed: 1,
                });
                if state.daily_activities.len() > MAX_DAILY_ACTIVITY_RECORDS {
                    state.daily_activities.remove(0);
                }
                1
            }
        };

        // Badge rules against post-update counts, in fixed order; the first
        // newly earned badge becomes the pending UI signal.
        let completed_count = state
            .lesson_progress
            .values()
            .filter(|p| p.completed)
            .count();
        let hour = now.hour();

        let mut newly_earned = Vec::new();
        let mut grant = |earned: &mut Vec<String>, id: &str| {
            if !earned.iter().any(|b| b == id) {
                earned.push(id.to_string());
                newly_earned.push(id.to_string());
            }
        };
        let earned = &mut state.earned_badges;
        if completed_count == 1 {
            grant(earned, badges::FIRST_LESSON);
        }
        if completed_count >= 10 {
            grant(earned, badges::TEN_LESSONS);
        }
        if completed_count >= 50 {
            grant(earned, badges::FIFTY_LESSONS);
        }
        if completed_count >= 100 {
            grant(earned, badges::HUNDRED_LESSONS);
        }
        if new_streak >= 7 {
            grant(earned, badges::STREAK_7);
        }
        if new_streak >= 30 {
            grant(earned, badges::STREAK_30);
        }
        if new_streak >= 100 {
            grant(earned, badges::STREAK_100);
        }
        if new_streak >= 28 {
            grant(earned, badges::CONSISTENT);
        }
        if hour >= 22 || hour < 4 {
            grant(earned, badges::NIGHT_OWL);
        }
        if (4..6).contains(&hour) {
            grant(earned, badges::EARLY_BIRD);
        }
        if completed_today >= MARATHON_LESSONS_PER_DAY {
            grant(earned, badges::MARATHON);
        }

        let new_level = levels::level_for_experience(state.experience).level;
        let leveled_up_to = (new_level > previous_level).then_some(new_level);
        state.pending_level_up = leveled_up_to;
        state.pending_new_badge = newly_earned.first().cloned();

        state.current_streak = new_streak;
        state.longest_streak = state.longest_streak.max(new_streak);
        state.last_activity_date = Some(today);

        CompletionOutcome {
            already_completed: false,
            xp_gained: xp_gain,
            torah_points_gained: TORAH_POINTS_PER_LESSON,
            wisdom_coins_gained: coins_gained,
            current_streak: new_streak,
            newly_earned_badges: newly_earned,
            leveled_up_to,
        }
    }

    /// Record partial watch progress for a not-yet-completed lesson.
    ///
    /// Monotonic: the stored percentage never decreases. No-op once the
    /// lesson is completed. No experience, streak, or badge effects.
    pub fn update_watch_progress(&mut self, lesson_id: &str, percent: u8) {
        let percent = percent.min(100);
        match self.state.lesson_progress.get_mut(lesson_id) {
            Some(progress) if progress.completed => {}
            Some(progress) => {
                progress.watched_percent = progress.watched_percent.max(percent);
            }
            None => {
                self.state.lesson_progress.insert(
                    lesson_id.to_string(),
                    LessonProgress {
                        lesson_id: lesson_id.to_string(),
                        completed: false,
                        watched_percent: percent,
                        completed_at: None,
                    },
                );
            }
        }
    }

    /// Clear the pending level-up signal after the UI has shown it.
    pub fn dismiss_level_up(&mut self) {
        self.state.pending_level_up = None;
    }

    /// Clear the pending new-badge signal after the UI has shown it.
    pub fn dismiss_new_badge(&mut self) {
        self.state.pending_new_badge = None;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The user's current level.
    pub fn level(&self) -> &'static Level {
        levels::level_for_experience(self.state.experience)
    }

    /// Progress toward the next level, 0..=100 (0 at the final level).
    pub fn level_progress(&self) -> u8 {
        levels::level_progress(self.state.experience)
    }

    /// Count of completed lessons.
    pub fn completed_count(&self) -> usize {
        self.state
            .lesson_progress
            .values()
            .filter(|p| p.completed)
            .count()
    }

    /// Percentage of the given lessons completed, rounded to the nearest
    /// integer. 0 for an empty id list.
    pub fn module_progress(&self, lesson_ids: &[String]) -> u8 {
        if lesson_ids.is_empty() {
            return 0;
        }
        let completed = lesson_ids
            .iter()
            .filter(|id| self.is_completed(id))
            .count();
        ((completed as f64 / lesson_ids.len() as f64) * 100.0).round() as u8
    }

    /// Whether the given lesson has been completed.
    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.state
            .lesson_progress
            .get(lesson_id)
            .is_some_and(|p| p.completed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges;

    /// Noon on the given day: a neutral hour that triggers no time badges.
    fn noon(date: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn at_hour(date: &str, hour: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    // -- first completion --

    #[test]
    fn first_lesson_scenario() {
        let mut engine = RewardsEngine::new();
        let outcome = engine.complete_lesson("L1", noon("2024-03-01"));

        // 100 base + 25 first-of-day; streak 1 means no milestone and x1.
        assert_eq!(outcome.xp_gained, 125);
        assert_eq!(engine.state().experience, 125);
        assert_eq!(engine.state().torah_points, 10);
        assert_eq!(engine.state().wisdom_coins, 0);
        assert_eq!(engine.state().current_streak, 1);
        assert_eq!(engine.state().longest_streak, 1);
        assert_eq!(engine.state().earned_badges, [badges::FIRST_LESSON]);
        assert_eq!(
            engine.state().pending_new_badge.as_deref(),
            Some(badges::FIRST_LESSON)
        );
        assert_eq!(engine.state().pending_level_up, None);
        assert!(engine.is_completed("L1"));
    }

    // -- idempotency --

    #[test]
    fn duplicate_completion_is_a_no_op() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", noon("2024-03-01"));
        let before = engine.state().clone();

        let outcome = engine.complete_lesson("L1", noon("2024-03-02"));
        assert!(outcome.already_completed);
        assert_eq!(outcome.xp_gained, 0);
        assert_eq!(engine.state(), &before);
        assert!(engine.is_completed("L1"));
    }

    // -- streak state machine --

    #[test]
    fn same_day_completions_do_not_increment_streak() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", noon("2024-03-01"));
        engine.complete_lesson("L2", noon("2024-03-01"));
        assert_eq!(engine.state().current_streak, 1);
    }

    #[test]
    fn consecutive_days_build_streak() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", noon("2024-03-01"));
        engine.complete_lesson("L2", noon("2024-03-02"));
        engine.complete_lesson("L3", noon("2024-03-03"));
        assert_eq!(engine.state().current_streak, 3);
    }

    #[test]
    fn skipping_a_day_resets_streak() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", noon("2024-03-01"));
        engine.complete_lesson("L2", noon("2024-03-03"));
        assert_eq!(engine.state().current_streak, 1);
        // Longest streak remembers the best run.
        assert_eq!(engine.state().longest_streak, 1);
    }

    #[test]
    fn streak_crosses_month_boundary() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", noon("2024-02-29"));
        engine.complete_lesson("L2", noon("2024-03-01"));
        assert_eq!(engine.state().current_streak, 2);
    }

    #[test]
    fn longest_streak_survives_a_reset() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", noon("2024-03-01"));
        engine.complete_lesson("L2", noon("2024-03-02"));
        engine.complete_lesson("L3", noon("2024-03-02"));
        engine.complete_lesson("L4", noon("2024-03-10"));
        assert_eq!(engine.state().current_streak, 1);
        assert_eq!(engine.state().longest_streak, 2);
    }

    // -- milestones and multiplier --

    #[test]
    fn three_day_streak_scenario() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", noon("2024-03-01"));
        engine.complete_lesson("L2", noon("2024-03-02"));
        let outcome = engine.complete_lesson("L3", noon("2024-03-03"));

        // (100 base + 25 first-of-day + 30 milestone) x 1.1 = 170.5 -> 171.
        assert_eq!(outcome.xp_gained, 171);
        assert_eq!(outcome.wisdom_coins_gained, 1);
        assert_eq!(engine.state().current_streak, 3);
        assert_eq!(engine.state().experience, 125 + 125 + 171);
        assert_eq!(engine.state().wisdom_coins, 1);
    }

    #[test]
    fn seven_day_milestone_on_day_seven() {
        let mut engine = RewardsEngine::new();
        for day in 1..=6 {
            engine.complete_lesson(&format!("L{day}"), noon(&format!("2024-03-{day:02}")));
        }
        let outcome = engine.complete_lesson("L7", noon("2024-03-07"));

        // Day 7: (125 + 100) x 1.25 = 281.25 -> 281, +5 coins.
        assert_eq!(outcome.xp_gained, 281);
        assert_eq!(outcome.wisdom_coins_gained, 5);
        assert_eq!(engine.state().current_streak, 7);
        assert_eq!(engine.state().wisdom_coins, 1 + 5);
    }

    #[test]
    fn milestone_re_applies_while_streak_sits_at_the_threshold() {
        // Exact-equality quirk, preserved deliberately: a second completion
        // on the milestone day leaves the streak at exactly 7, so the
        // equality check fires again.
        let mut engine = RewardsEngine::new();
        for day in 1..=7 {
            engine.complete_lesson(&format!("L{day}"), noon(&format!("2024-03-{day:02}")));
        }
        let outcome = engine.complete_lesson("L8", noon("2024-03-07"));
        // (100 + 100) x 1.25 = 250, and the coin bonus repeats too.
        assert_eq!(outcome.xp_gained, 250);
        assert_eq!(outcome.wisdom_coins_gained, 5);
    }

    #[test]
    fn no_retroactive_milestone_after_a_reset() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("A", noon("2024-03-01"));
        let outcome = engine.complete_lesson("B", noon("2024-03-20"));
        assert_eq!(engine.state().current_streak, 1);
        assert_eq!(outcome.wisdom_coins_gained, 0);
        assert_eq!(outcome.xp_gained, 125);
    }

    #[test]
    fn multiplier_tiers() {
        assert_eq!(streak_multiplier(0), 1.0);
        assert_eq!(streak_multiplier(2), 1.0);
        assert_eq!(streak_multiplier(3), 1.1);
        assert_eq!(streak_multiplier(6), 1.1);
        assert_eq!(streak_multiplier(7), 1.25);
        assert_eq!(streak_multiplier(13), 1.25);
        assert_eq!(streak_multiplier(14), 1.5);
        assert_eq!(streak_multiplier(29), 1.5);
        assert_eq!(streak_multiplier(30), 2.0);
        assert_eq!(streak_multiplier(59), 2.0);
        assert_eq!(streak_multiplier(60), 2.5);
        assert_eq!(streak_multiplier(99), 2.5);
        assert_eq!(streak_multiplier(100), 3.0);
    }

    // -- monotonicity --

    #[test]
    fn currencies_never_decrease() {
        let mut engine = RewardsEngine::new();
        let mut last = (0, 0, 0);
        for day in 1..=28 {
            engine.complete_lesson(&format!("L{day}"), noon(&format!("2024-03-{day:02}")));
            let s = engine.state();
            assert!(s.experience >= last.0);
            assert!(s.torah_points >= last.1);
            assert!(s.wisdom_coins >= last.2);
            last = (s.experience, s.torah_points, s.wisdom_coins);
        }
    }

    #[test]
    fn badges_grow_without_duplicates() {
        let mut engine = RewardsEngine::new();
        for day in 1..=10 {
            engine.complete_lesson(&format!("L{day}"), noon(&format!("2024-03-{day:02}")));
            let earned = &engine.state().earned_badges;
            let unique: std::collections::HashSet<&String> = earned.iter().collect();
            assert_eq!(unique.len(), earned.len());
        }
        assert!(engine
            .state()
            .earned_badges
            .iter()
            .any(|b| b == badges::STREAK_7));
        assert!(engine
            .state()
            .earned_badges
            .iter()
            .any(|b| b == badges::TEN_LESSONS));
    }

    // -- badge rules --

    #[test]
    fn ten_lessons_badge_on_tenth_completion() {
        let mut engine = RewardsEngine::new();
        for n in 1..=9 {
            engine.complete_lesson(&format!("L{n}"), noon("2024-03-01"));
        }
        assert!(!engine
            .state()
            .earned_badges
            .iter()
            .any(|b| b == badges::TEN_LESSONS));

        let outcome = engine.complete_lesson("L10", noon("2024-03-01"));
        assert!(outcome
            .newly_earned_badges
            .iter()
            .any(|b| b == badges::TEN_LESSONS));
    }

    #[test]
    fn marathon_badge_on_fifth_completion_of_the_day() {
        let mut engine = RewardsEngine::new();
        for n in 1..=4 {
            engine.complete_lesson(&format!("L{n}"), noon("2024-03-01"));
        }
        let outcome = engine.complete_lesson("L5", noon("2024-03-01"));
        assert_eq!(outcome.newly_earned_badges, [badges::MARATHON.to_string()]);
    }

    #[test]
    fn marathon_counts_reset_across_days() {
        let mut engine = RewardsEngine::new();
        for n in 1..=4 {
            engine.complete_lesson(&format!("A{n}"), noon("2024-03-01"));
        }
        // Fifth completion lands on the next day: no marathon.
        let outcome = engine.complete_lesson("B1", noon("2024-03-02"));
        assert!(outcome.newly_earned_badges.is_empty());
    }

    #[test]
    fn night_owl_badge_by_wall_clock_hour() {
        for hour in [22, 23, 0, 3] {
            let mut engine = RewardsEngine::new();
            engine.complete_lesson("L1", at_hour("2024-03-01", hour));
            assert!(
                engine
                    .state()
                    .earned_badges
                    .iter()
                    .any(|b| b == badges::NIGHT_OWL),
                "hour {hour} should grant night owl"
            );
        }
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", at_hour("2024-03-01", 21));
        assert!(!engine
            .state()
            .earned_badges
            .iter()
            .any(|b| b == badges::NIGHT_OWL));
    }

    #[test]
    fn early_bird_badge_between_four_and_six() {
        for (hour, expected) in [(3, false), (4, true), (5, true), (6, false)] {
            let mut engine = RewardsEngine::new();
            engine.complete_lesson("L1", at_hour("2024-03-01", hour));
            assert_eq!(
                engine
                    .state()
                    .earned_badges
                    .iter()
                    .any(|b| b == badges::EARLY_BIRD),
                expected,
                "hour {hour}"
            );
        }
    }

    #[test]
    fn consistent_badge_at_twenty_eight_days() {
        let mut engine = RewardsEngine::new();
        for day in 1..=28 {
            engine.complete_lesson(&format!("L{day}"), noon(&format!("2024-03-{day:02}")));
        }
        let earned = &engine.state().earned_badges;
        assert!(earned.iter().any(|b| b == badges::CONSISTENT));
        // The 30-day streak badge has its own distinct threshold.
        assert!(!earned.iter().any(|b| b == badges::STREAK_30));
    }

    #[test]
    fn first_new_badge_follows_rule_order() {
        // Tenth completion on a day that also grants night-owl: the count
        // rule is evaluated first, so it wins the pending slot.
        let mut engine = RewardsEngine::new();
        for n in 1..=9 {
            engine.complete_lesson(&format!("L{n}"), noon("2024-03-01"));
        }
        let outcome = engine.complete_lesson("L10", at_hour("2024-03-01", 23));
        assert_eq!(outcome.newly_earned_badges[0], badges::TEN_LESSONS);
        assert_eq!(
            engine.state().pending_new_badge.as_deref(),
            Some(badges::TEN_LESSONS)
        );
    }

    #[test]
    fn completion_without_new_badges_clears_pending() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", noon("2024-03-01"));
        assert!(engine.state().pending_new_badge.is_some());
        engine.complete_lesson("L2", noon("2024-03-01"));
        assert_eq!(engine.state().pending_new_badge, None);
    }

    // -- level transitions --

    #[test]
    fn level_up_sets_pending_signal() {
        let mut engine = RewardsEngine::new();
        // Four first-of-day completions: 125 x 4 = 500 XP = level 2 exactly.
        for day in [1, 3, 5, 7] {
            engine.complete_lesson(&format!("L{day}"), noon(&format!("2024-03-{day:02}")));
        }
        assert_eq!(engine.state().experience, 500);
        assert_eq!(engine.level().level, 2);
        assert_eq!(engine.state().pending_level_up, Some(2));
    }

    #[test]
    fn dismissals_clear_only_their_signal() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", noon("2024-03-01"));
        assert!(engine.state().pending_new_badge.is_some());

        engine.dismiss_new_badge();
        assert_eq!(engine.state().pending_new_badge, None);

        engine.dismiss_level_up();
        assert_eq!(engine.state().pending_level_up, None);
        // No other state was touched.
        assert_eq!(engine.state().experience, 125);
    }

    // -- watch progress --

    #[test]
    fn watch_progress_is_monotonic() {
        let mut engine = RewardsEngine::new();
        engine.update_watch_progress("L1", 40);
        engine.update_watch_progress("L1", 20);
        assert_eq!(engine.state().lesson_progress["L1"].watched_percent, 40);
        assert!(!engine.state().lesson_progress["L1"].completed);

        engine.update_watch_progress("L1", 90);
        assert_eq!(engine.state().lesson_progress["L1"].watched_percent, 90);
    }

    #[test]
    fn watch_progress_ignored_after_completion() {
        let mut engine = RewardsEngine::new();
        let when = noon("2024-03-01");
        engine.complete_lesson("L1", when);
        engine.update_watch_progress("L1", 10);

        let progress = &engine.state().lesson_progress["L1"];
        assert!(progress.completed);
        assert_eq!(progress.watched_percent, 100);
        assert_eq!(progress.completed_at, Some(when));
    }

    #[test]
    fn watch_progress_has_no_reward_effects() {
        let mut engine = RewardsEngine::new();
        engine.update_watch_progress("L1", 99);
        let s = engine.state();
        assert_eq!(s.experience, 0);
        assert_eq!(s.current_streak, 0);
        assert!(s.earned_badges.is_empty());
    }

    #[test]
    fn watch_percent_clamped_to_hundred() {
        let mut engine = RewardsEngine::new();
        engine.update_watch_progress("L1", 250);
        assert_eq!(engine.state().lesson_progress["L1"].watched_percent, 100);
    }

    // -- daily activity bounds --

    #[test]
    fn daily_activities_capped_with_fifo_eviction() {
        let mut engine = RewardsEngine::new();
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        for n in 0..(MAX_DAILY_ACTIVITY_RECORDS as u64 + 10) {
            let day = start + chrono::Days::new(n);
            engine.complete_lesson(&format!("L{n}"), day.and_hms_opt(12, 0, 0).unwrap());
        }
        let activities = &engine.state().daily_activities;
        assert_eq!(activities.len(), MAX_DAILY_ACTIVITY_RECORDS);
        // The oldest-inserted records were evicted.
        assert_eq!(activities[0].date, start + chrono::Days::new(10));
    }

    // -- module progress --

    #[test]
    fn module_progress_scenario() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("a", noon("2024-03-01"));
        engine.complete_lesson("b", noon("2024-03-01"));

        let ids: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(engine.module_progress(&ids), 50);
        assert_eq!(engine.module_progress(&[]), 0);
    }

    #[test]
    fn module_progress_rounds() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("a", noon("2024-03-01"));
        let ids: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        // 1/3 -> 33.3 -> 33.
        assert_eq!(engine.module_progress(&ids), 33);
    }

    #[test]
    fn completed_count_ignores_partial_watches() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("a", noon("2024-03-01"));
        engine.update_watch_progress("b", 80);
        assert_eq!(engine.completed_count(), 1);
    }

    // -- snapshot / import --

    #[test]
    fn snapshot_reflects_state() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", noon("2024-03-01"));
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.experience, 125);
        assert_eq!(snapshot.current_streak, 1);
        assert_eq!(snapshot.earned_badges, [badges::FIRST_LESSON]);
        assert_eq!(
            snapshot.last_activity_date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }

    #[test]
    fn resume_from_state_round_trips() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", noon("2024-03-01"));
        engine.complete_lesson("L2", noon("2024-03-02"));
        let saved = engine.state().clone();

        let resumed = RewardsEngine::from_state(saved.clone());
        assert_eq!(resumed.state(), &saved);
        assert_eq!(resumed.completed_count(), 2);

        // The resumed engine continues the streak where it left off.
        let mut resumed = resumed;
        resumed.complete_lesson("L3", noon("2024-03-03"));
        assert_eq!(resumed.state().current_streak, 3);
    }

    #[test]
    fn replace_state_overwrites_wholesale() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", noon("2024-03-01"));

        let remote = RewardsState {
            experience: 9000,
            current_streak: 12,
            ..RewardsState::default()
        };
        engine.replace_state(remote.clone());
        assert_eq!(engine.state(), &remote);
        assert!(!engine.is_completed("L1"));
    }

    #[test]
    fn state_serde_round_trip() {
        let mut engine = RewardsEngine::new();
        engine.complete_lesson("L1", at_hour("2024-03-01", 23));
        engine.update_watch_progress("L2", 55);

        let json = serde_json::to_string(engine.state()).unwrap();
        let back: RewardsState = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, engine.state());
    }
}
