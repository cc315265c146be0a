pub mod rewards_repo;

pub use rewards_repo::RewardsRepo;
