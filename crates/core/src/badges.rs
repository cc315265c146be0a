//! Badge reference catalog.
//!
//! Badges are one-time, non-revocable achievement flags. This module holds
//! the static display catalog and the badge id constants; the unlock rules
//! themselves live in [`crate::rewards`], evaluated on each completion.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Badge ids awarded by the rewards engine
// ---------------------------------------------------------------------------

pub const FIRST_LESSON: &str = "first-lesson";
pub const TEN_LESSONS: &str = "ten-lessons";
pub const FIFTY_LESSONS: &str = "fifty-lessons";
pub const HUNDRED_LESSONS: &str = "hundred-lessons";
pub const STREAK_7: &str = "streak-7";
pub const STREAK_30: &str = "streak-30";
pub const STREAK_100: &str = "streak-100";
pub const CONSISTENT: &str = "consistent";
pub const NIGHT_OWL: &str = "night-owl";
pub const EARLY_BIRD: &str = "early-bird";
pub const MARATHON: &str = "marathon";

// ---------------------------------------------------------------------------
// Display catalog
// ---------------------------------------------------------------------------

/// Display grouping for the achievements page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Parsha,
    Behavior,
    Social,
    Hidden,
}

/// A badge definition: immutable reference data, not user state.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Badge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: BadgeCategory,
}

/// The full badge catalog.
///
/// Parsha-graduation and hidden badges are display entries; only the
/// behavior badges are granted by the engine's completion rules.
pub const BADGES: &[Badge] = &[
    // Parsha graduation
    Badge { id: "grad-bereshit", title: "בוגר בראשית", description: "השלמת כל פרשיות ספר בראשית", icon: "🌍", category: BadgeCategory::Parsha },
    Badge { id: "grad-shmot", title: "בוגר שמות", description: "השלמת כל פרשיות ספר שמות", icon: "🔥", category: BadgeCategory::Parsha },
    Badge { id: "grad-vayikra", title: "בוגר ויקרא", description: "השלמת כל פרשיות ספר ויקרא", icon: "⛺", category: BadgeCategory::Parsha },
    Badge { id: "grad-bamidbar", title: "בוגר במדבר", description: "השלמת כל פרשיות ספר במדבר", icon: "🏜️", category: BadgeCategory::Parsha },
    Badge { id: "grad-dvarim", title: "בוגר דברים", description: "השלמת כל פרשיות ספר דברים", icon: "📜", category: BadgeCategory::Parsha },
    Badge { id: "grad-torah", title: "בוגר התורה", description: "השלמת כל חמשת חומשי תורה", icon: "🏆", category: BadgeCategory::Parsha },
    // Behavior
    Badge { id: FIRST_LESSON, title: "ראשון", description: "השלמת השיעור הראשון", icon: "🎯", category: BadgeCategory::Behavior },
    Badge { id: STREAK_7, title: "שבוע של למידה", description: "7 ימי למידה ברצף", icon: "🔥", category: BadgeCategory::Behavior },
    Badge { id: STREAK_30, title: "חודש של למידה", description: "30 ימי למידה ברצף", icon: "💪", category: BadgeCategory::Behavior },
    Badge { id: STREAK_100, title: "מאה ימים", description: "100 ימי למידה ברצף", icon: "🏅", category: BadgeCategory::Behavior },
    Badge { id: MARATHON, title: "מרתון", description: "5 שיעורים ביום אחד", icon: "🏃", category: BadgeCategory::Behavior },
    Badge { id: NIGHT_OWL, title: "ינשוף לילה", description: "למידה אחרי 22:00", icon: "🌙", category: BadgeCategory::Behavior },
    Badge { id: EARLY_BIRD, title: "משכים קום", description: "למידה לפני 06:00", icon: "🌅", category: BadgeCategory::Behavior },
    Badge { id: CONSISTENT, title: "מתמיד", description: "למידה 4 שבועות ברציפות", icon: "📚", category: BadgeCategory::Behavior },
    Badge { id: TEN_LESSONS, title: "עשר ומעלה", description: "השלמת 10 שיעורים", icon: "🔟", category: BadgeCategory::Behavior },
    Badge { id: FIFTY_LESSONS, title: "חמישים", description: "השלמת 50 שיעורים", icon: "5️⃣", category: BadgeCategory::Behavior },
    Badge { id: HUNDRED_LESSONS, title: "מאה שיעורים", description: "השלמת 100 שיעורים", icon: "💯", category: BadgeCategory::Behavior },
    // Hidden
    Badge { id: "comeback", title: "חוזר בתשובה", description: "חזרה למערכת אחרי 30 יום", icon: "🔄", category: BadgeCategory::Hidden },
];

/// Look up a badge definition by id.
pub fn find_badge(id: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|b| b.id == id)
}
