//! SQLite-backed engine: seeding, restart and concurrent transitions

mod common;

use chrono::{Duration, TimeZone, Utc};
use skillswap::fixtures::Fixtures;
use skillswap::persistence::SqliteStore;
use skillswap::store::SwapStore;
use skillswap::{
    DirectoryConfig, DirectoryQuery, ErrorKind, NewSwapRequest, ProfileDirectory, ProfileId,
    RequestQueryService, StatusFilter, SwapAction, SwapRequestLedger, SwapStatus,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

type Engine = (
    Arc<SqliteStore>,
    Arc<ProfileDirectory>,
    Arc<SwapRequestLedger>,
);

async fn open(path: &Path) -> Engine {
    let store = Arc::new(SqliteStore::open(path).await.unwrap());
    let directory = Arc::new(ProfileDirectory::new(
        store.clone(),
        DirectoryConfig::default(),
    ));
    directory.restore().await.unwrap();
    let ledger = Arc::new(SwapRequestLedger::new(directory.clone(), store.clone()));
    (store, directory, ledger)
}

async fn seed(path: &Path) {
    let store = SqliteStore::open(path).await.unwrap();
    Fixtures::from_yaml_str(common::SEED)
        .unwrap()
        .apply(&store, &store)
        .await
        .unwrap();
    store.close().await;
}

#[tokio::test]
async fn test_seed_and_search_from_disk() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("data").join("skillswap.db");

    {
        let store = SqliteStore::open(&db).await.unwrap();
        let fixtures = Fixtures::from_yaml_str(common::SEED).unwrap();
        fixtures.apply(&store, &store).await.unwrap();
        // seeding twice leaves the data unchanged
        fixtures.apply(&store, &store).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_profiles, 8);
        assert_eq!(stats.public_profiles, 7);
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.pending_requests, 1);
        store.close().await;
    }

    let (_store, directory, _ledger) = open(&db).await;
    let page = directory.search(&DirectoryQuery::default());
    assert_eq!(page.total_matches, 7);
    assert_eq!(page.items[0].name, "Marc Demo");
    assert_eq!(page.items[0].skills_offered.as_slice(), ["Java Script", "Python"]);
    assert!((page.items[0].rating.average - 3.9).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_lifecycle_survives_restart() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("skillswap.db");
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let accepted_at = created_at + Duration::hours(2);

    seed(&db).await;

    let id = {
        let (_store, _directory, ledger) = open(&db).await;
        let request = ledger
            .create_at(
                NewSwapRequest {
                    requester_id: ProfileId::from("ana-souza"),
                    recipient_id: ProfileId::from("tom-becker"),
                    offered_skill: "cooking".to_string(),
                    wanted_skill: "photography".to_string(),
                    message: Some("Weekend lessons?".to_string()),
                },
                created_at,
            )
            .await
            .unwrap();

        ledger
            .transition_at(
                &request.id,
                &ProfileId::from("tom-becker"),
                SwapAction::Accept,
                accepted_at,
            )
            .await
            .unwrap();
        request.id
    };

    let (store, _directory, ledger) = open(&db).await;
    let stored = ledger.get(&id).await.unwrap();
    assert_eq!(stored.status, SwapStatus::Accepted);
    assert_eq!(stored.offered_skill, "Cooking");
    assert_eq!(stored.wanted_skill, "Photography");
    assert_eq!(stored.message.as_deref(), Some("Weekend lessons?"));
    assert_eq!(stored.created_at, created_at);
    assert_eq!(stored.last_transitioned_at, accepted_at);

    let queries = RequestQueryService::new(store.clone());
    let accepted = queries
        .list(
            &ProfileId::from("tom-becker"),
            skillswap::Direction::Incoming,
            StatusFilter::Only(SwapStatus::Accepted),
        )
        .await
        .unwrap();
    assert_eq!(accepted.items.len(), 1);
    assert_eq!(accepted.items[0].id, id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sqlite_race_has_one_winner() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("race.db");

    seed(&db).await;

    let (store, _directory, ledger) = open(&db).await;
    let request = ledger
        .create(NewSwapRequest {
            requester_id: ProfileId::from("joe-williams"),
            recipient_id: ProfileId::from("marc-demo"),
            offered_skill: "Guitar".to_string(),
            wanted_skill: "Cooking".to_string(),
            message: None,
        })
        .await
        .unwrap();

    let tasks: Vec<_> = (0..6)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            let id = request.id.clone();
            let action = if i % 2 == 0 {
                SwapAction::Accept
            } else {
                SwapAction::Decline
            };
            tokio::spawn(async move {
                ledger
                    .transition(&id, &ProfileId::from("marc-demo"), action)
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => winners += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::InvalidTransition),
        }
    }
    assert_eq!(winners, 1);

    let stored = store.get_request(&request.id).await.unwrap().unwrap();
    assert!(matches!(
        stored.status,
        SwapStatus::Accepted | SwapStatus::Declined
    ));
}
