//! In-memory car repository with per-car locking.
//!
//! # Responsibility
//! - Serve deployments that do not need durable tallies.
//! - Serialize concurrent votes per car id without a global write lock.
//!
//! # Invariants
//! - The catalog lock is held only to resolve an id to its slot, never
//!   across a vote increment.
//! - Each car's read-increment-write runs under that car's own mutex.
//! - Cars are only ever appended; a resolved slot stays valid forever.

use crate::model::car::{Car, CarId, VoteType};
use crate::repo::car_repo::{CarRepository, RepoError, RepoResult, SeedOutcome};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};

type CarSlot = Arc<Mutex<Car>>;

#[derive(Default)]
struct Catalog {
    /// Insertion order; random selection indexes into this.
    slots: Vec<CarSlot>,
    by_id: HashMap<CarId, CarSlot>,
}

/// Process-local car repository. Tallies are lost on restart.
#[derive(Default)]
pub struct MemoryCarRepository {
    catalog: RwLock<Catalog>,
}

impl MemoryCarRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: &str) -> RepoResult<CarSlot> {
        let catalog = self.catalog.read().map_err(|_| poisoned("catalog"))?;
        catalog
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }
}

impl CarRepository for MemoryCarRepository {
    fn create_car(&self, car: &Car) -> RepoResult<CarId> {
        car.validate()?;

        let mut catalog = self.catalog.write().map_err(|_| poisoned("catalog"))?;
        if catalog.by_id.contains_key(&car.id) {
            return Err(RepoError::Conflict(car.id.clone()));
        }

        let slot = Arc::new(Mutex::new(car.clone()));
        catalog.slots.push(Arc::clone(&slot));
        catalog.by_id.insert(car.id.clone(), slot);

        Ok(car.id.clone())
    }

    fn seed_if_empty(&self, cars: &[Car]) -> RepoResult<SeedOutcome> {
        let mut catalog = self.catalog.write().map_err(|_| poisoned("catalog"))?;
        if !catalog.slots.is_empty() {
            return Ok(SeedOutcome::Skipped {
                existing: catalog.slots.len() as u64,
            });
        }

        // Check the whole batch before touching the catalog.
        let mut seen = HashSet::new();
        for car in cars {
            car.validate()?;
            if !seen.insert(car.id.as_str()) {
                return Err(RepoError::Conflict(car.id.clone()));
            }
        }

        for car in cars {
            let slot = Arc::new(Mutex::new(car.clone()));
            catalog.slots.push(Arc::clone(&slot));
            catalog.by_id.insert(car.id.clone(), slot);
        }

        Ok(SeedOutcome::Inserted { count: cars.len() })
    }

    fn get_car(&self, id: &str) -> RepoResult<Car> {
        let slot = self.slot(id)?;
        let car = slot.lock().map_err(|_| poisoned("car"))?;
        Ok(car.clone())
    }

    fn get_random_car(&self) -> RepoResult<Car> {
        let slot = {
            let catalog = self.catalog.read().map_err(|_| poisoned("catalog"))?;
            if catalog.slots.is_empty() {
                return Err(RepoError::CatalogEmpty);
            }
            let index = rand::rng().random_range(0..catalog.slots.len());
            Arc::clone(&catalog.slots[index])
        };

        let car = slot.lock().map_err(|_| poisoned("car"))?;
        Ok(car.clone())
    }

    fn increment_vote(&self, id: &str, vote: VoteType) -> RepoResult<Car> {
        let slot = self.slot(id)?;
        let mut car = slot.lock().map_err(|_| poisoned("car"))?;
        car.record_vote(vote);
        Ok(car.clone())
    }

    fn count_cars(&self) -> RepoResult<u64> {
        let catalog = self.catalog.read().map_err(|_| poisoned("catalog"))?;
        Ok(catalog.slots.len() as u64)
    }

    fn list_cars(&self) -> RepoResult<Vec<Car>> {
        let slots = {
            let catalog = self.catalog.read().map_err(|_| poisoned("catalog"))?;
            catalog.slots.clone()
        };

        let mut cars = slots
            .iter()
            .map(|slot| {
                slot.lock()
                    .map(|car| car.clone())
                    .map_err(|_| poisoned("car"))
            })
            .collect::<RepoResult<Vec<_>>>()?;
        cars.sort_by(|a, b| (&a.make, &a.model, &a.id).cmp(&(&b.make, &b.model, &b.id)));

        Ok(cars)
    }
}

fn poisoned(what: &str) -> RepoError {
    RepoError::InvalidData(format!("{what} lock poisoned by a panicked writer"))
}
