//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the car store contract used by the rating service.
//! - Isolate SQLite and in-memory storage details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Car::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `CatalogEmpty`,
//!   `Unavailable`) in addition to DB transport errors.

pub mod car_repo;
pub mod memory_repo;
