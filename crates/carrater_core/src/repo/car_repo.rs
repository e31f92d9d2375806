//! Car repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide catalog lookups, uniform random selection and atomic vote
//!   increments over canonical `cars` storage.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Car::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - A vote increment is one SQL statement; it either fully applies or not.

use crate::db::DbError;
use crate::model::car::{Car, CarId, CarValidationError, VoteType};
use log::debug;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CAR_COLUMNS_SQL: &str = "id, make, model, year, image_url, hot_votes, not_votes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for car persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(CarValidationError),
    Db(DbError),
    NotFound(CarId),
    /// Random selection was requested over an empty catalog.
    CatalogEmpty,
    /// A car with the same id already exists.
    Conflict(CarId),
    /// Storage is temporarily unable to serve the request (lock contention).
    Unavailable(String),
    InvalidData(String),
}

impl RepoError {
    /// Only contention is worth retrying; every other error is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "car not found: {id}"),
            Self::CatalogEmpty => write!(f, "car catalog is empty"),
            Self::Conflict(id) => write!(f, "car already exists: {id}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted car data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CarValidationError> for RepoError {
    fn from(value: CarValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        if value.is_contention() {
            return Self::Unavailable(value.to_string());
        }
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::from(DbError::Sqlite(value))
    }
}

/// What a catalog seeding attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted { count: usize },
    Skipped { existing: u64 },
}

/// Repository interface for the car catalog and its vote tallies.
pub trait CarRepository {
    /// Inserts a new catalog entry. Seed-time only.
    fn create_car(&self, car: &Car) -> RepoResult<CarId>;
    /// Inserts all `cars` if the catalog is empty, or nothing at all.
    ///
    /// The emptiness check and the inserts form one atomic step: a failure
    /// on any car leaves the catalog as it was.
    fn seed_if_empty(&self, cars: &[Car]) -> RepoResult<SeedOutcome>;
    /// Exact lookup by id.
    fn get_car(&self, id: &str) -> RepoResult<Car>;
    /// Uniformly random car from the whole catalog.
    fn get_random_car(&self) -> RepoResult<Car>;
    /// Atomically adds one vote and returns the post-update snapshot.
    fn increment_vote(&self, id: &str, vote: VoteType) -> RepoResult<Car>;
    fn count_cars(&self) -> RepoResult<u64>;
    /// All cars ordered by make, model, id.
    fn list_cars(&self) -> RepoResult<Vec<Car>>;
}

impl<R: CarRepository + ?Sized> CarRepository for &R {
    fn create_car(&self, car: &Car) -> RepoResult<CarId> {
        (**self).create_car(car)
    }

    fn seed_if_empty(&self, cars: &[Car]) -> RepoResult<SeedOutcome> {
        (**self).seed_if_empty(cars)
    }

    fn get_car(&self, id: &str) -> RepoResult<Car> {
        (**self).get_car(id)
    }

    fn get_random_car(&self) -> RepoResult<Car> {
        (**self).get_random_car()
    }

    fn increment_vote(&self, id: &str, vote: VoteType) -> RepoResult<Car> {
        (**self).increment_vote(id, vote)
    }

    fn count_cars(&self) -> RepoResult<u64> {
        (**self).count_cars()
    }

    fn list_cars(&self) -> RepoResult<Vec<Car>> {
        (**self).list_cars()
    }
}

/// SQLite-backed car repository.
///
/// Writers on different connections to the same file are serialized by
/// SQLite's database lock; the connection busy timeout bounds the wait.
pub struct SqliteCarRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCarRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CarRepository for SqliteCarRepository<'_> {
    fn create_car(&self, car: &Car) -> RepoResult<CarId> {
        insert_car(self.conn, car)?;
        Ok(car.id.clone())
    }

    fn seed_if_empty(&self, cars: &[Car]) -> RepoResult<SeedOutcome> {
        for car in cars {
            car.validate()?;
        }

        // Immediate: take the write lock before counting so no other writer
        // can fill the catalog between the check and the inserts.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let existing = count_rows(&tx)?;
        if existing > 0 {
            return Ok(SeedOutcome::Skipped { existing });
        }

        for car in cars {
            insert_car(&tx, car)?;
        }
        tx.commit()?;

        Ok(SeedOutcome::Inserted { count: cars.len() })
    }

    fn get_car(&self, id: &str) -> RepoResult<Car> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CAR_COLUMNS_SQL} FROM cars WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => parse_car_row(row),
            None => Err(RepoError::NotFound(id.to_string())),
        }
    }

    fn get_random_car(&self) -> RepoResult<Car> {
        // Count and pick inside one read transaction so the offset is taken
        // from the same catalog snapshot it was drawn against.
        let tx = self.conn.unchecked_transaction()?;
        let count = count_rows(&tx)?;
        if count == 0 {
            return Err(RepoError::CatalogEmpty);
        }

        let offset = i64::try_from(rand::rng().random_range(0..count))
            .map_err(|_| RepoError::InvalidData(format!("catalog of {count} exceeds row range")))?;
        debug!("event=car_pick module=repo status=ok catalog_size={count} offset={offset}");

        let car = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {CAR_COLUMNS_SQL} FROM cars ORDER BY rowid LIMIT 1 OFFSET ?1;"
            ))?;
            let mut rows = stmt.query([offset])?;
            match rows.next()? {
                Some(row) => parse_car_row(row)?,
                None => {
                    return Err(RepoError::InvalidData(format!(
                        "random offset {offset} outside catalog of {count}"
                    )));
                }
            }
        };
        tx.commit()?;

        Ok(car)
    }

    fn increment_vote(&self, id: &str, vote: VoteType) -> RepoResult<Car> {
        let sql = format!(
            "UPDATE cars
             SET
                {column} = {column} + 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
             RETURNING {CAR_COLUMNS_SQL};",
            column = vote_column(vote)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let car = stmt
            .query_row([id], |row| Ok(parse_car_row(row)))
            .optional()?;

        match car {
            Some(car) => car,
            None => Err(RepoError::NotFound(id.to_string())),
        }
    }

    fn count_cars(&self) -> RepoResult<u64> {
        count_rows(self.conn)
    }

    fn list_cars(&self) -> RepoResult<Vec<Car>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CAR_COLUMNS_SQL} FROM cars ORDER BY make ASC, model ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut cars = Vec::new();

        while let Some(row) = rows.next()? {
            cars.push(parse_car_row(row)?);
        }

        Ok(cars)
    }
}

fn insert_car(conn: &Connection, car: &Car) -> RepoResult<()> {
    car.validate()?;

    let inserted = conn.execute(
        "INSERT INTO cars (
            id,
            make,
            model,
            year,
            image_url,
            hot_votes,
            not_votes
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT (id) DO NOTHING;",
        params![
            car.id.as_str(),
            car.make.as_str(),
            car.model.as_str(),
            car.year,
            car.image_url.as_str(),
            counter_to_db(car.hot_votes)?,
            counter_to_db(car.not_votes)?,
        ],
    )?;

    if inserted == 0 {
        return Err(RepoError::Conflict(car.id.clone()));
    }
    Ok(())
}

fn count_rows(conn: &Connection) -> RepoResult<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM cars;", [], |row| row.get(0))?;
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative catalog count `{count}`")))
}

fn parse_car_row(row: &Row<'_>) -> RepoResult<Car> {
    let car = Car {
        id: row.get("id")?,
        make: row.get("make")?,
        model: row.get("model")?,
        year: row.get("year")?,
        image_url: row.get("image_url")?,
        hot_votes: counter_from_db(row.get("hot_votes")?, "hot_votes")?,
        not_votes: counter_from_db(row.get("not_votes")?, "not_votes")?,
    };
    car.validate()
        .map_err(|err| RepoError::InvalidData(format!("car `{}`: {err}", car.id)))?;
    Ok(car)
}

fn counter_from_db(value: i64, column: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid {column} value `{value}` in cars")))
}

fn counter_to_db(value: u64) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("vote counter `{value}` exceeds storage range")))
}

fn vote_column(vote: VoteType) -> &'static str {
    match vote {
        VoteType::Hot => "hot_votes",
        VoteType::Not => "not_votes",
    }
}
