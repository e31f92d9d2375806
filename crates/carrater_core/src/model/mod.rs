//! Domain model for ratable catalog cars.
//!
//! # Responsibility
//! - Define the canonical car record and its vote tally.
//! - Define client-facing projections with and without the aggregate.
//!
//! # Invariants
//! - Every car is identified by a stable `CarId`.
//! - Vote counters never decrease and are never reset.

pub mod car;
