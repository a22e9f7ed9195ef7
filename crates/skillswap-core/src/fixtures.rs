//! Seed fixtures
//!
//! Demonstration profiles and requests live in YAML and are written straight
//! into a store. Seed requests are stored as given; they do not pass through
//! match validation.

use crate::store::{ProfileStore, StoreResult, SwapStore};
use crate::{Profile, SwapRequest};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub profiles: Vec<Profile>,

    #[serde(default)]
    pub requests: Vec<SwapRequest>,
}

impl Fixtures {
    pub fn from_yaml_str(contents: &str) -> StoreResult<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Write every fixture row, profiles first. Requests that already exist
    /// are left untouched so seeding twice is harmless.
    pub async fn apply(
        &self,
        profiles: &dyn ProfileStore,
        requests: &dyn SwapStore,
    ) -> StoreResult<()> {
        for profile in &self.profiles {
            profiles.save_profile(profile).await?;
        }

        let mut skipped = 0;
        for request in &self.requests {
            if requests.get_request(&request.id).await?.is_some() {
                skipped += 1;
                continue;
            }
            requests.insert_request(request).await?;
        }

        info!(
            "Seeded {} profiles and {} swap requests ({} already present)",
            self.profiles.len(),
            self.requests.len() - skipped,
            skipped
        );
        Ok(())
    }
}
