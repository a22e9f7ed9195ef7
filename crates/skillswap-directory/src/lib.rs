//! Profile directory
//!
//! Holds the searchable population of member profiles and answers:
//! - Free-text search over display name and both skill lists
//! - Availability filtering (with an `All` sentinel)
//! - Fixed-size pagination and the pager label window
//!
//! Reads run against an in-memory snapshot. Writes go to the backing
//! [`ProfileStore`] first and are published to the snapshot afterwards, so a
//! failed write never becomes visible.

pub mod pagination;

pub use pagination::{page_window, total_pages, PageLabel};

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use skillswap_core::store::ProfileStore;
use skillswap_core::{
    Availability, AvailabilityFilter, Profile, ProfileId, RatingSummary, Result, SessionContext,
    SkillSet, SwapError, Visibility,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_PAGE_SIZE: usize = 6;
pub const DEFAULT_MAX_PAGE_SIZE: usize = 50;

/// Directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Profiles per page when the caller does not ask for a size
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Upper bound on caller-supplied page sizes
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> usize {
    DEFAULT_MAX_PAGE_SIZE
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        DirectoryConfig {
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl DirectoryConfig {
    fn effective_page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

/// Directory query
#[derive(Debug, Clone)]
pub struct DirectoryQuery {
    pub text: String,
    pub availability: AvailabilityFilter,
    /// 1-based page number
    pub page: usize,
    pub page_size: Option<usize>,
}

impl Default for DirectoryQuery {
    fn default() -> Self {
        DirectoryQuery {
            text: String::new(),
            availability: AvailabilityFilter::All,
            page: 1,
            page_size: None,
        }
    }
}

/// One page of directory results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryPage {
    pub items: Vec<Profile>,
    pub total_pages: usize,
    pub total_matches: usize,
    pub page: usize,
    pub page_size: usize,
}

impl DirectoryPage {
    /// Pager labels for this page
    pub fn window(&self) -> Vec<PageLabel> {
        page_window(self.page, self.total_pages)
    }
}

/// Registration input
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub skills_offered: Vec<String>,
    #[serde(default)]
    pub skills_wanted: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
}

/// Owner edits; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub skills_offered: Option<Vec<String>>,
    #[serde(default)]
    pub skills_wanted: Option<Vec<String>>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

impl ProfileUpdate {
    fn apply_to(self, profile: &mut Profile) -> Result<()> {
        if let Some(name) = self.name {
            profile.name = validate_name(&name)?;
        }
        if let Some(location) = self.location {
            profile.location = location.trim().to_string();
        }
        if let Some(availability) = self.availability {
            profile.availability = availability;
        }
        if let Some(skills) = self.skills_offered {
            profile.skills_offered = SkillSet::new(skills);
        }
        if let Some(skills) = self.skills_wanted {
            profile.skills_wanted = SkillSet::new(skills);
        }
        if let Some(visibility) = self.visibility {
            profile.visibility = visibility;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SwapError::InvalidInput(
            "display name cannot be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Profiles in registration order with an id lookup
#[derive(Default)]
struct DirectoryIndex {
    entries: Vec<Arc<Profile>>,
    positions: HashMap<ProfileId, usize>,
}

impl DirectoryIndex {
    fn upsert(&mut self, profile: Arc<Profile>) {
        match self.positions.get(&profile.id) {
            Some(&pos) => self.entries[pos] = profile,
            None => {
                self.positions.insert(profile.id.clone(), self.entries.len());
                self.entries.push(profile);
            }
        }
    }

    fn get(&self, id: &ProfileId) -> Option<Arc<Profile>> {
        self.positions.get(id).map(|&pos| self.entries[pos].clone())
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Searchable population of member profiles
pub struct ProfileDirectory {
    config: DirectoryConfig,
    store: Arc<dyn ProfileStore>,
    index: RwLock<DirectoryIndex>,
}

impl ProfileDirectory {
    pub fn new(store: Arc<dyn ProfileStore>, config: DirectoryConfig) -> Self {
        ProfileDirectory {
            config,
            store,
            index: RwLock::new(DirectoryIndex::default()),
        }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Rebuild the snapshot from the backing store
    pub async fn restore(&self) -> Result<usize> {
        let profiles = self.store.load_profiles().await?;
        let mut index = self.index.write();
        index.clear();
        for profile in profiles {
            index.upsert(Arc::new(profile));
        }

        info!("Directory restored with {} profiles", index.len());
        Ok(index.len())
    }

    /// Register a new member profile
    pub async fn register(&self, new: NewProfile) -> Result<Profile> {
        let profile = Profile {
            id: ProfileId::generate(),
            name: validate_name(&new.name)?,
            location: new.location.trim().to_string(),
            availability: new.availability,
            skills_offered: SkillSet::new(new.skills_offered),
            skills_wanted: SkillSet::new(new.skills_wanted),
            visibility: new.visibility,
            rating: RatingSummary::default(),
            joined_at: Utc::now(),
        };

        self.store.save_profile(&profile).await?;
        self.index.write().upsert(Arc::new(profile.clone()));

        info!("Registered profile {} ({})", profile.id, profile.name);
        Ok(profile)
    }

    /// Apply an owner edit. Only the profile's owner may change it.
    pub async fn update(
        &self,
        session: &SessionContext,
        id: &ProfileId,
        update: ProfileUpdate,
    ) -> Result<Profile> {
        let current = self
            .get(id)
            .ok_or_else(|| SwapError::NotFound(format!("profile {}", id)))?;

        if !session.is(id) {
            warn!(
                "Profile update rejected: {} tried to edit {}",
                session.member_id, id
            );
            return Err(SwapError::not_authorized(&session.member_id, "update profile"));
        }

        let mut profile = (*current).clone();
        update.apply_to(&mut profile)?;

        self.store.save_profile(&profile).await?;
        self.index.write().upsert(Arc::new(profile.clone()));

        debug!("Updated profile {}", id);
        Ok(profile)
    }

    /// Show or hide a profile; hiding is the only form of removal
    pub async fn set_visibility(
        &self,
        session: &SessionContext,
        id: &ProfileId,
        visibility: Visibility,
    ) -> Result<Profile> {
        let update = ProfileUpdate {
            visibility: Some(visibility),
            ..Default::default()
        };
        self.update(session, id, update).await
    }

    /// Snapshot of a profile regardless of visibility
    pub fn get(&self, id: &ProfileId) -> Option<Arc<Profile>> {
        self.index.read().get(id)
    }

    /// A profile as seen by other members; private profiles are not found
    pub fn get_public(&self, id: &ProfileId) -> Result<Arc<Profile>> {
        self.get(id)
            .filter(|p| p.is_discoverable())
            .ok_or_else(|| SwapError::NotFound(format!("profile {}", id)))
    }

    /// Filter and paginate discoverable profiles
    pub fn search(&self, query: &DirectoryQuery) -> DirectoryPage {
        let page_size = self.config.effective_page_size(query.page_size);
        let needle = query.text.trim().to_lowercase();

        let matches: Vec<Arc<Profile>> = {
            let index = self.index.read();
            index
                .entries
                .iter()
                .filter(|p| {
                    p.is_discoverable()
                        && query.availability.accepts(p.availability)
                        && p.matches_text(&needle)
                })
                .cloned()
                .collect()
        };

        let total_matches = matches.len();
        let total_pages = total_pages(total_matches, page_size);

        let items = if query.page == 0 || query.page > total_pages {
            Vec::new()
        } else {
            matches
                .into_iter()
                .skip((query.page - 1) * page_size)
                .take(page_size)
                .map(|p| (*p).clone())
                .collect()
        };

        debug!(
            "Directory search {:?}: {} matches, page {}/{}",
            query.text, total_matches, query.page, total_pages
        );

        DirectoryPage {
            items,
            total_pages,
            total_matches,
            page: query.page,
            page_size,
        }
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
