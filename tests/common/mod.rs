#![allow(dead_code)]

use skillswap::fixtures::Fixtures;
use skillswap::store::MemoryStore;
use skillswap::{DirectoryConfig, ProfileDirectory, RequestQueryService, SwapRequestLedger};
use std::sync::Arc;

pub const SEED: &str = include_str!("../../fixtures/seed.yaml");

/// Seeded in-memory engine
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub directory: Arc<ProfileDirectory>,
    pub ledger: Arc<SwapRequestLedger>,
    pub queries: RequestQueryService,
}

pub async fn seeded() -> Harness {
    let store = Arc::new(MemoryStore::new());
    Fixtures::from_yaml_str(SEED)
        .unwrap()
        .apply(store.as_ref(), store.as_ref())
        .await
        .unwrap();
    harness(store).await
}

pub async fn empty() -> Harness {
    harness(Arc::new(MemoryStore::new())).await
}

async fn harness(store: Arc<MemoryStore>) -> Harness {
    let directory = Arc::new(ProfileDirectory::new(
        store.clone(),
        DirectoryConfig::default(),
    ));
    directory.restore().await.unwrap();

    let ledger = Arc::new(SwapRequestLedger::new(directory.clone(), store.clone()));
    let queries = RequestQueryService::new(store.clone());

    Harness {
        store,
        directory,
        ledger,
        queries,
    }
}
