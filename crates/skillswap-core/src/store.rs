//! Storage seams for profiles and swap requests
//!
//! The engine talks to persistence only through [`ProfileStore`] and
//! [`SwapStore`]. [`MemoryStore`] backs tests and ephemeral servers;
//! [`crate::persistence::SqliteStore`] is the durable implementation.

use crate::{Profile, ProfileId, RequestId, SwapError, SwapRequest, SwapStatus};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Fixture error: {0}")]
    Fixture(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for SwapError {
    fn from(err: StoreError) -> Self {
        SwapError::Unavailable(err.to_string())
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert or replace a profile
    async fn save_profile(&self, profile: &Profile) -> StoreResult<()>;

    /// All profiles in registration order
    async fn load_profiles(&self) -> StoreResult<Vec<Profile>>;
}

#[async_trait]
pub trait SwapStore: Send + Sync {
    async fn insert_request(&self, request: &SwapRequest) -> StoreResult<()>;

    async fn get_request(&self, id: &RequestId) -> StoreResult<Option<SwapRequest>>;

    /// Replace the stored request with `updated` only if its status is still
    /// `expected`. The comparison and the write are a single atomic step.
    /// Returns false when the status moved on (or the record is gone).
    async fn compare_and_set(&self, expected: SwapStatus, updated: &SwapRequest)
        -> StoreResult<bool>;

    /// Requests where `member` is requester or recipient
    async fn requests_involving(&self, member: &ProfileId) -> StoreResult<Vec<SwapRequest>>;

    async fn request_count(&self) -> StoreResult<usize>;
}

/// In-memory store backed by sharded concurrent maps
#[derive(Default)]
pub struct MemoryStore {
    profiles: DashMap<ProfileId, Profile>,
    requests: DashMap<RequestId, SwapRequest>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn save_profile(&self, profile: &Profile) -> StoreResult<()> {
        self.profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn load_profiles(&self) -> StoreResult<Vec<Profile>> {
        let mut profiles: Vec<Profile> = self.profiles.iter().map(|e| e.value().clone()).collect();
        profiles.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.id.cmp(&b.id)));
        Ok(profiles)
    }
}

#[async_trait]
impl SwapStore for MemoryStore {
    async fn insert_request(&self, request: &SwapRequest) -> StoreResult<()> {
        match self.requests.entry(request.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::InvalidData(format!(
                "duplicate request id: {}",
                request.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(request.clone());
                Ok(())
            }
        }
    }

    async fn get_request(&self, id: &RequestId) -> StoreResult<Option<SwapRequest>> {
        Ok(self.requests.get(id).map(|e| e.value().clone()))
    }

    async fn compare_and_set(
        &self,
        expected: SwapStatus,
        updated: &SwapRequest,
    ) -> StoreResult<bool> {
        // get_mut holds the shard write lock until the guard drops
        let Some(mut entry) = self.requests.get_mut(&updated.id) else {
            return Ok(false);
        };
        if entry.status != expected {
            debug!(
                "CAS lost for {}: expected {}, found {}",
                updated.id, expected, entry.status
            );
            return Ok(false);
        }
        *entry = updated.clone();
        Ok(true)
    }

    async fn requests_involving(&self, member: &ProfileId) -> StoreResult<Vec<SwapRequest>> {
        Ok(self
            .requests
            .iter()
            .filter(|e| e.value().involves(member))
            .map(|e| e.value().clone())
            .collect())
    }

    async fn request_count(&self) -> StoreResult<usize> {
        Ok(self.requests.len())
    }
}
