//! Rating use-case service.
//!
//! # Responsibility
//! - Pick the next car to show and project it without tallies.
//! - Validate and record vote events, returning the derived aggregate.
//!
//! # Invariants
//! - Service holds no vote state; every aggregate is computed from the
//!   snapshot the store returned for this request.
//! - Vote type is validated before the store is touched.
//! - Repeated identical votes are distinct events; nothing is deduplicated.

use crate::model::car::{CarId, CarView, ParseVoteTypeError, VoteResult, VoteType};
use crate::repo::car_repo::{CarRepository, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RatingResult<T> = Result<T, RatingError>;

/// Service error for rating use-cases.
#[derive(Debug)]
pub enum RatingError {
    /// No cars exist to rate.
    CatalogEmpty,
    /// Vote or lookup references an unknown car.
    NotFound(CarId),
    /// Vote payload carries something other than `hot` or `not`.
    InvalidVoteType(String),
    /// Transient storage contention; safe to retry with backoff.
    StorageUnavailable(String),
    /// Non-retryable persistence failure.
    Storage(RepoError),
}

impl RatingError {
    /// Only `StorageUnavailable` is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    /// Stable machine-readable code for logs and API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CatalogEmpty => "catalog_empty",
            Self::NotFound(_) => "not_found",
            Self::InvalidVoteType(_) => "invalid_vote_type",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Storage(_) => "storage_error",
        }
    }
}

impl Display for RatingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CatalogEmpty => write!(f, "no cars available to rate"),
            Self::NotFound(id) => write!(f, "car not found: {id}"),
            Self::InvalidVoteType(value) => {
                write!(f, "invalid vote type `{value}`; expected hot|not")
            }
            Self::StorageUnavailable(message) => write!(f, "storage unavailable: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RatingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RatingError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::CatalogEmpty => Self::CatalogEmpty,
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Unavailable(message) => Self::StorageUnavailable(message),
            other => Self::Storage(other),
        }
    }
}

impl From<ParseVoteTypeError> for RatingError {
    fn from(value: ParseVoteTypeError) -> Self {
        Self::InvalidVoteType(value.0)
    }
}

/// Rating service facade over repository implementations.
pub struct RatingService<R: CarRepository> {
    repo: R,
}

impl<R: CarRepository> RatingService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns a uniformly random car without its tally.
    pub fn next_item(&self) -> RatingResult<CarView> {
        let car = self.repo.get_random_car()?;
        Ok(CarView::from(car))
    }

    /// Records one vote event and returns the updated aggregate.
    ///
    /// # Contract
    /// - `vote_type` must be `hot` or `not`; anything else fails before
    ///   storage is touched.
    /// - Unknown `car_id` fails with `NotFound` and mutates nothing.
    pub fn cast_vote(&self, car_id: &str, vote_type: &str) -> RatingResult<VoteResult> {
        let vote = match vote_type.parse::<VoteType>() {
            Ok(vote) => vote,
            Err(err) => {
                warn!(
                    "event=vote_cast module=service status=rejected error_code=invalid_vote_type car_id={car_id}"
                );
                return Err(err.into());
            }
        };

        match self.repo.increment_vote(car_id, vote) {
            Ok(car) => {
                let result = VoteResult::from(car);
                info!(
                    "event=vote_cast module=service status=ok car_id={} vote={} hot_votes={} not_votes={} hot_percentage={}",
                    result.id, vote, result.hot_votes, result.not_votes, result.hot_percentage
                );
                Ok(result)
            }
            Err(err) => {
                let err = RatingError::from(err);
                warn!(
                    "event=vote_cast module=service status=error error_code={} car_id={car_id} vote={vote} error={err}",
                    err.code()
                );
                Err(err)
            }
        }
    }

    /// Returns the current aggregate for one car without voting.
    pub fn car_stats(&self, car_id: &str) -> RatingResult<VoteResult> {
        let car = self.repo.get_car(car_id)?;
        Ok(VoteResult::from(car))
    }
}
