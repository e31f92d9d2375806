use carrater_core::db::open_db_in_memory;
use carrater_core::{
    Car, CarRepository, MemoryCarRepository, RatingError, RatingService, SqliteCarRepository,
};
use std::sync::Arc;
use std::thread;

fn seeded_memory_repo() -> MemoryCarRepository {
    let repo = MemoryCarRepository::new();
    repo.create_car(&Car::with_id(
        "c1",
        "Lamborghini",
        "Aventador",
        2023,
        "https://img.example/aventador.jpg",
    ))
    .unwrap();
    repo
}

#[test]
fn hot_then_not_scenario_reports_expected_aggregates() {
    let conn = open_db_in_memory().unwrap();
    let sqlite = SqliteCarRepository::new(&conn);
    let memory = MemoryCarRepository::new();
    let repos: [&dyn CarRepository; 2] = [&sqlite, &memory];

    for repo in repos {
        repo.create_car(&Car::with_id("c1", "Audi", "R8", 2022, "https://img.example/r8.jpg"))
            .unwrap();
        let service = RatingService::new(repo);

        let first = service.cast_vote("c1", "hot").unwrap();
        assert_eq!(first.id, "c1");
        assert_eq!(first.make, "Audi");
        assert_eq!(first.image_url, "https://img.example/r8.jpg");
        assert_eq!(
            (first.hot_votes, first.not_votes, first.total_votes, first.hot_percentage),
            (1, 0, 1, 100)
        );

        let second = service.cast_vote("c1", "not").unwrap();
        assert_eq!(
            (second.hot_votes, second.not_votes, second.total_votes, second.hot_percentage),
            (1, 1, 2, 50)
        );

        assert_eq!(service.car_stats("c1").unwrap(), second);
    }
}

#[test]
fn invalid_vote_type_is_rejected_and_leaves_counters_unchanged() {
    let service = RatingService::new(seeded_memory_repo());

    let err = service.cast_vote("c1", "sideways").unwrap_err();
    assert!(matches!(&err, RatingError::InvalidVoteType(value) if value == "sideways"));
    assert_eq!(err.code(), "invalid_vote_type");
    assert!(!err.is_retryable());

    let stats = service.car_stats("c1").unwrap();
    assert_eq!((stats.hot_votes, stats.not_votes), (0, 0));
}

#[test]
fn invalid_vote_type_wins_over_unknown_car() {
    let service = RatingService::new(MemoryCarRepository::new());

    let err = service.cast_vote("ghost", "meh").unwrap_err();
    assert!(matches!(err, RatingError::InvalidVoteType(_)));
}

#[test]
fn unknown_car_fails_with_not_found_and_mutates_nothing() {
    let service = RatingService::new(seeded_memory_repo());

    let err = service.cast_vote("ghost", "hot").unwrap_err();
    assert!(matches!(&err, RatingError::NotFound(id) if id == "ghost"));

    let stats = service.car_stats("c1").unwrap();
    assert_eq!(stats.total_votes, 0);
}

#[test]
fn next_item_projects_without_tallies_and_reports_empty_catalog() {
    let empty = RatingService::new(MemoryCarRepository::new());
    assert!(matches!(
        empty.next_item().unwrap_err(),
        RatingError::CatalogEmpty
    ));

    let repo = seeded_memory_repo();
    let service = RatingService::new(&repo);
    service.cast_vote("c1", "hot").unwrap();

    let view = service.next_item().unwrap();
    assert_eq!(view.id, "c1");
    assert_eq!(view.make, "Lamborghini");
    assert_eq!(view.model, "Aventador");
    assert_eq!(view.year, 2023);
}

#[test]
fn repeated_identical_votes_are_distinct_events() {
    let service = RatingService::new(seeded_memory_repo());

    for _ in 0..3 {
        service.cast_vote("c1", "not").unwrap();
    }
    let stats = service.car_stats("c1").unwrap();
    assert_eq!((stats.not_votes, stats.hot_percentage), (3, 0));
}

#[test]
fn concurrent_hot_votes_are_never_lost() {
    let repo = Arc::new(seeded_memory_repo());
    let voters = 32;

    let handles: Vec<_> = (0..voters)
        .map(|_| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                RatingService::new(&*repo)
                    .cast_vote("c1", "hot")
                    .unwrap()
            })
        })
        .collect();

    let mut observed_totals: Vec<u64> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().total_votes)
        .collect();
    observed_totals.sort_unstable();

    // Each vote observed a distinct post-update state.
    assert_eq!(observed_totals, (1..=voters).collect::<Vec<u64>>());

    let stats = RatingService::new(&*repo).car_stats("c1").unwrap();
    assert_eq!(stats.hot_votes, voters);
    assert_eq!(stats.hot_percentage, 100);
}

#[test]
fn aggregate_always_matches_counters() {
    let service = RatingService::new(seeded_memory_repo());
    let pattern = ["hot", "not", "not", "hot", "hot", "not", "hot", "not", "not"];

    for vote in pattern {
        let result = service.cast_vote("c1", vote).unwrap();
        let total = result.hot_votes + result.not_votes;
        assert_eq!(result.total_votes, total);
        let expected = ((200 * result.hot_votes + total) / (2 * total)) as u8;
        assert_eq!(result.hot_percentage, expected);
        assert!(result.hot_percentage <= 100);
    }
}
