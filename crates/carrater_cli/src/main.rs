//! Operator CLI for a car rating database.
//!
//! - `seed <db_path>`: create the schema and load the sample catalog if empty.
//! - `tally <db_path>`: print every car with its current vote aggregate.

use std::path::{Path, PathBuf};

use anyhow::Context;
use carrater_core::db::open_db;
use carrater_core::{
    sample_catalog, seed_catalog, CarRepository, SeedOutcome, SqliteCarRepository, VoteResult,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "carrater_cli")]
#[command(about = "Seed and inspect a car rating database.", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the schema and load the sample catalog into an empty database
    Seed { db_path: PathBuf },
    /// Print every car with its vote counts and hot percentage
    Tally { db_path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Seed { db_path } => seed(&db_path),
        Command::Tally { db_path } => tally(&db_path),
    }
}

fn seed(db_path: &Path) -> anyhow::Result<()> {
    let conn = open_db(db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let repo = SqliteCarRepository::new(&conn);

    match seed_catalog(&repo, &sample_catalog()).context("seeding failed")? {
        SeedOutcome::Inserted { count } => println!("seeded cars={count}"),
        SeedOutcome::Skipped { existing } => println!("skipped existing={existing}"),
    }
    Ok(())
}

fn tally(db_path: &Path) -> anyhow::Result<()> {
    let conn = open_db(db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    let repo = SqliteCarRepository::new(&conn);

    for car in repo.list_cars().context("listing cars failed")? {
        let result = VoteResult::from(car);
        println!(
            "{}\t{} {} ({})\thot={}\tnot={}\ttotal={}\thot_pct={}",
            result.id,
            result.make,
            result.model,
            result.year,
            result.hot_votes,
            result.not_votes,
            result.total_votes,
            result.hot_percentage
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use carrater_core::db::open_db;
    use carrater_core::{CarRepository, SqliteCarRepository};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands_with_database_path() {
        let cli = Cli::try_parse_from(["carrater_cli", "seed", "/tmp/cars.db"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Seed { db_path } if db_path == PathBuf::from("/tmp/cars.db")
        ));

        let cli = Cli::try_parse_from(["carrater_cli", "tally", "cars.db"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Tally { db_path } if db_path == PathBuf::from("cars.db")
        ));
    }

    #[test]
    fn rejects_missing_path_and_unknown_subcommand() {
        assert!(Cli::try_parse_from(["carrater_cli", "seed"]).is_err());
        assert!(Cli::try_parse_from(["carrater_cli", "wipe", "cars.db"]).is_err());
        assert!(Cli::try_parse_from(["carrater_cli"]).is_err());
    }

    #[test]
    fn seed_then_tally_against_a_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.db");

        super::seed(&path).unwrap();
        super::seed(&path).unwrap();
        super::tally(&path).unwrap();

        let conn = open_db(&path).unwrap();
        assert_eq!(SqliteCarRepository::new(&conn).count_cars().unwrap(), 10);
    }
}
