pub mod catalog;
pub mod health;
pub mod reference;
pub mod rewards;
