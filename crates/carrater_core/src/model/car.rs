//! Car domain model and derived vote aggregate.
//!
//! # Responsibility
//! - Define the canonical ratable record and its vote tally.
//! - Compute the aggregate (`total_votes`, `hot_percentage`) from a tally.
//!
//! # Invariants
//! - `id` is stable and never reused for another car.
//! - `hot_votes` and `not_votes` start at 0 and only ever grow by one.
//! - The aggregate is never stored; it is recomputed from counters.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable opaque identifier for a catalog car.
pub type CarId = String;

/// Binary preference recorded by one vote event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    Hot,
    Not,
}

impl VoteType {
    /// Wire name used by HTTP payloads and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::Not => "not",
        }
    }
}

impl Display for VoteType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected vote type input. Carries the raw value for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVoteTypeError(pub String);

impl Display for ParseVoteTypeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid vote type `{}`; expected hot|not", self.0)
    }
}

impl Error for ParseVoteTypeError {}

impl FromStr for VoteType {
    type Err = ParseVoteTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "hot" => Ok(Self::Hot),
            "not" => Ok(Self::Not),
            other => Err(ParseVoteTypeError(other.to_string())),
        }
    }
}

/// Validation failures for car records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarValidationError {
    EmptyId,
    EmptyField(&'static str),
}

impl Display for CarValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "car id cannot be empty"),
            Self::EmptyField(field) => write!(f, "car field `{field}` cannot be empty"),
        }
    }
}

impl Error for CarValidationError {}

/// Canonical catalog record with its vote tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub year: i32,
    /// Opaque image reference. Reachability is never checked.
    pub image_url: String,
    pub hot_votes: u64,
    pub not_votes: u64,
}

impl Car {
    /// Creates a new car with a generated UUID v4 id and an empty tally.
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        image_url: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), make, model, year, image_url)
    }

    /// Creates a new car with a caller-provided stable id and an empty tally.
    ///
    /// Used by import/seed paths where identity already exists externally.
    pub fn with_id(
        id: impl Into<CarId>,
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            make: make.into(),
            model: model.into(),
            year,
            image_url: image_url.into(),
            hot_votes: 0,
            not_votes: 0,
        }
    }

    /// Validates identity and descriptive fields.
    pub fn validate(&self) -> Result<(), CarValidationError> {
        if self.id.trim().is_empty() {
            return Err(CarValidationError::EmptyId);
        }
        if self.make.trim().is_empty() {
            return Err(CarValidationError::EmptyField("make"));
        }
        if self.model.trim().is_empty() {
            return Err(CarValidationError::EmptyField("model"));
        }
        if self.image_url.trim().is_empty() {
            return Err(CarValidationError::EmptyField("image_url"));
        }
        Ok(())
    }

    /// Applies one vote event to the in-memory tally.
    ///
    /// Saturates instead of wrapping; a `u64` counter cannot realistically
    /// reach the bound.
    pub fn record_vote(&mut self, vote: VoteType) {
        match vote {
            VoteType::Hot => self.hot_votes = self.hot_votes.saturating_add(1),
            VoteType::Not => self.not_votes = self.not_votes.saturating_add(1),
        }
    }

    /// Returns the current tally.
    pub fn tally(&self) -> Tally {
        Tally {
            hot_votes: self.hot_votes,
            not_votes: self.not_votes,
        }
    }
}

/// Pair of vote counters for one car.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub hot_votes: u64,
    pub not_votes: u64,
}

impl Tally {
    pub fn total_votes(&self) -> u64 {
        self.hot_votes.saturating_add(self.not_votes)
    }

    /// Share of hot votes as an integer percentage in `0..=100`.
    ///
    /// Rounds to nearest, ties upward. Returns 0 when no votes exist.
    pub fn hot_percentage(&self) -> u8 {
        let total = u128::from(self.total_votes());
        if total == 0 {
            return 0;
        }
        let hot = u128::from(self.hot_votes);
        // round_half_up(100 * hot / total) == floor((200 * hot + total) / (2 * total))
        let percentage = (200 * hot + total) / (2 * total);
        u8::try_from(percentage).unwrap_or(100)
    }
}

/// Client-facing projection shown before a vote. Tallies are withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarView {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub image_url: String,
}

impl From<Car> for CarView {
    fn from(car: Car) -> Self {
        Self {
            id: car.id,
            make: car.make,
            model: car.model,
            year: car.year,
            image_url: car.image_url,
        }
    }
}

/// Car projection with its tally and derived aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResult {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub image_url: String,
    pub hot_votes: u64,
    pub not_votes: u64,
    pub total_votes: u64,
    pub hot_percentage: u8,
}

impl From<Car> for VoteResult {
    fn from(car: Car) -> Self {
        let tally = car.tally();
        Self {
            id: car.id,
            make: car.make,
            model: car.model,
            year: car.year,
            image_url: car.image_url,
            hot_votes: tally.hot_votes,
            not_votes: tally.not_votes,
            total_votes: tally.total_votes(),
            hot_percentage: tally.hot_percentage(),
        }
    }
}
