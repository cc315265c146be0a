//! Domain logic for the Shiurim learning portal.
//!
//! Two cooperating components: the [`catalog::CatalogIndex`], which organizes
//! a flat lesson catalog into navigable groupings, and the
//! [`rewards::RewardsEngine`], which converts lesson completions into
//! experience, streaks, levels, and badges for a single user.
//!
//! Everything in this crate is pure and synchronous; persistence and HTTP
//! live in `shiurim-db` and `shiurim-api`.

pub mod badges;
pub mod catalog;
pub mod error;
pub mod lesson;
pub mod levels;
pub mod rewards;
