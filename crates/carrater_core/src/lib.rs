//! Core domain logic for the car rating service.
//! This crate is the single source of truth for vote tally invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::car::{
    Car, CarId, CarValidationError, CarView, ParseVoteTypeError, Tally, VoteResult, VoteType,
};
pub use repo::car_repo::{CarRepository, RepoError, RepoResult, SqliteCarRepository};
pub use repo::memory_repo::MemoryCarRepository;
pub use service::rating_service::{RatingError, RatingResult, RatingService};
pub use service::seed::{sample_catalog, seed_catalog, SeedOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
