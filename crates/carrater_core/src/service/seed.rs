//! Catalog seeding.
//!
//! # Responsibility
//! - Provide the reference sample catalog.
//! - Populate an empty store once, atomically, leaving existing catalogs untouched.
//!
//! # Invariants
//! - Seeding never inserts into a non-empty catalog.
//! - Seeded cars start with an empty tally.

use crate::model::car::Car;
use crate::repo::car_repo::{CarRepository, RepoResult};
use log::info;

pub use crate::repo::car_repo::SeedOutcome;

const SAMPLE_CARS: &[(&str, &str, i32, &str)] = &[
    (
        "Lamborghini",
        "Aventador",
        2023,
        "https://images.unsplash.com/photo-1544636331-e26879cd4d9b?auto=format&fit=crop&w=1074&q=80",
    ),
    (
        "Ferrari",
        "F8 Tributo",
        2022,
        "https://images.unsplash.com/photo-1583121274602-3e2820c69888?auto=format&fit=crop&w=1170&q=80",
    ),
    (
        "Porsche",
        "911 Turbo S",
        2023,
        "https://images.unsplash.com/photo-1503736334956-4c8f8e92946d?auto=format&fit=crop&w=1174&q=80",
    ),
    (
        "McLaren",
        "720S",
        2022,
        "https://images.unsplash.com/photo-1618843479313-40f8afb4b4d8?auto=format&fit=crop&w=1170&q=80",
    ),
    (
        "BMW",
        "M4 Competition",
        2023,
        "https://images.unsplash.com/photo-1617814076367-b759c7d7e738?auto=format&fit=crop&w=1170&q=80",
    ),
    (
        "Audi",
        "R8",
        2022,
        "https://images.unsplash.com/photo-1606664515524-ed2f786a0bd6?auto=format&fit=crop&w=1170&q=80",
    ),
    (
        "Mercedes-AMG",
        "GT 63 S",
        2023,
        "https://images.unsplash.com/photo-1606016159991-62ab9b123cb4?auto=format&fit=crop&w=1170&q=80",
    ),
    (
        "Jaguar",
        "F-Type R",
        2022,
        "https://images.unsplash.com/photo-1549399542-7e3f8b79c341?auto=format&fit=crop&w=1170&q=80",
    ),
    (
        "Aston Martin",
        "DB11",
        2023,
        "https://images.unsplash.com/photo-1606664515524-ed2f786a0bd6?auto=format&fit=crop&w=1170&q=80",
    ),
    (
        "Bugatti",
        "Chiron",
        2022,
        "https://images.unsplash.com/photo-1544636331-e26879cd4d9b?auto=format&fit=crop&w=1074&q=80",
    ),
];

/// Builds the sample catalog with fresh ids and empty tallies.
pub fn sample_catalog() -> Vec<Car> {
    SAMPLE_CARS
        .iter()
        .map(|(make, model, year, image_url)| Car::new(*make, *model, *year, *image_url))
        .collect()
}

/// Inserts `cars` when the catalog is empty; otherwise leaves it as is.
///
/// All-or-nothing: a failure on any car leaves the catalog empty, so a
/// later attempt starts from scratch.
pub fn seed_catalog<R: CarRepository + ?Sized>(
    repo: &R,
    cars: &[Car],
) -> RepoResult<SeedOutcome> {
    let outcome = repo.seed_if_empty(cars)?;
    match outcome {
        SeedOutcome::Inserted { count } => {
            info!("event=catalog_seed module=service status=ok inserted={count}");
        }
        SeedOutcome::Skipped { existing } => {
            info!("event=catalog_seed module=service status=skipped existing={existing}");
        }
    }
    Ok(outcome)
}
