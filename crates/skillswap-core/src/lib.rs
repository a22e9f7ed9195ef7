//! Core types and data structures for skillswap
//!
//! This crate defines the fundamental types shared by every component:
//! - Profile and swap request identifiers and records
//! - Availability, visibility and request status enums
//! - Normalized skill label sets
//! - Error kinds surfaced at the engine boundary
//! - Storage traits, the in-memory store and the SQLite persistence layer
//! - Seed fixtures

pub mod error;
pub mod fixtures;
pub mod persistence;
pub mod store;

pub use error::{ErrorKind, Result, SwapError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of a member profile
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    pub fn generate() -> Self {
        ProfileId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProfileId {
    fn from(s: String) -> Self {
        ProfileId(s)
    }
}

impl From<&str> for ProfileId {
    fn from(s: &str) -> Self {
        ProfileId(s.to_string())
    }
}

/// Stable identifier of a swap request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        RequestId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId(s.to_string())
    }
}

/// When a member is available to meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Availability {
    Weekends,
    Evenings,
    Weekdays,
    #[default]
    Flexible,
}

impl Availability {
    pub const ALL: [Availability; 4] = [
        Availability::Weekends,
        Availability::Evenings,
        Availability::Weekdays,
        Availability::Flexible,
    ];
}

impl FromStr for Availability {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekends" => Ok(Availability::Weekends),
            "evenings" => Ok(Availability::Evenings),
            "weekdays" => Ok(Availability::Weekdays),
            "flexible" => Ok(Availability::Flexible),
            _ => Err(SwapError::InvalidInput(format!("unknown availability: {}", s))),
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Weekends => write!(f, "Weekends"),
            Availability::Evenings => write!(f, "Evenings"),
            Availability::Weekdays => write!(f, "Weekdays"),
            Availability::Flexible => write!(f, "Flexible"),
        }
    }
}

/// Availability criterion of a directory query; `All` disables the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvailabilityFilter {
    #[default]
    All,
    Only(Availability),
}

impl AvailabilityFilter {
    pub fn accepts(&self, availability: Availability) -> bool {
        match self {
            AvailabilityFilter::All => true,
            AvailabilityFilter::Only(wanted) => *wanted == availability,
        }
    }
}

impl FromStr for AvailabilityFilter {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(AvailabilityFilter::All);
        }
        trimmed.parse().map(AvailabilityFilter::Only)
    }
}

/// Whether a profile is discoverable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl FromStr for Visibility {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(SwapError::InvalidInput(format!("unknown visibility: {}", s))),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Review aggregate computed outside the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average: f32,
    pub review_count: u32,
}

/// Ordered set of skill labels
///
/// Labels are trimmed and have internal whitespace collapsed. Uniqueness and
/// membership are case-insensitive; the first spelling of a label is kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SkillSet(Vec<String>);

impl SkillSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = SkillSet(Vec::new());
        for label in labels {
            set.insert(label.as_ref());
        }
        set
    }

    /// Insert a label, returning false when it is empty or already present
    pub fn insert(&mut self, label: &str) -> bool {
        let Some(label) = normalize_label(label) else {
            return false;
        };
        if self.find(&label).is_some() {
            return false;
        }
        self.0.push(label);
        true
    }

    /// Remove a label (case-insensitive), returning whether it was present
    pub fn remove(&mut self, label: &str) -> bool {
        let Some(key) = normalize_label(label).map(|l| l.to_lowercase()) else {
            return false;
        };
        let before = self.0.len();
        self.0.retain(|existing| existing.to_lowercase() != key);
        self.0.len() != before
    }

    /// Look up the stored spelling of a label
    pub fn find(&self, label: &str) -> Option<&str> {
        let key = normalize_label(label)?.to_lowercase();
        self.0
            .iter()
            .find(|existing| existing.to_lowercase() == key)
            .map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.find(label).is_some()
    }

    /// Whether any label contains `needle`, which must already be lowercase
    pub fn any_contains(&self, needle: &str) -> bool {
        self.0.iter().any(|label| label.to_lowercase().contains(needle))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for SkillSet {
    fn from(labels: Vec<String>) -> Self {
        SkillSet::new(labels)
    }
}

impl From<SkillSet> for Vec<String> {
    fn from(set: SkillSet) -> Self {
        set.0
    }
}

fn normalize_label(raw: &str) -> Option<String> {
    let label = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

/// A member's public-facing record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub skills_offered: SkillSet,
    #[serde(default)]
    pub skills_wanted: SkillSet,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub rating: RatingSummary,
    #[serde(default = "Utc::now")]
    pub joined_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_discoverable(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Case-insensitive substring match on name and both skill lists.
    /// `needle` must already be lowercase; an empty needle matches everything.
    pub fn matches_text(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.skills_offered.any_contains(needle)
            || self.skills_wanted.any_contains(needle)
    }
}

/// Lifecycle status of a swap request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Declined,
    Completed,
    Cancelled,
}

impl SwapStatus {
    pub const ALL: [SwapStatus; 5] = [
        SwapStatus::Pending,
        SwapStatus::Accepted,
        SwapStatus::Declined,
        SwapStatus::Completed,
        SwapStatus::Cancelled,
    ];

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SwapStatus::Declined | SwapStatus::Completed | SwapStatus::Cancelled
        )
    }
}

impl FromStr for SwapStatus {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(SwapStatus::Pending),
            "accepted" => Ok(SwapStatus::Accepted),
            // the request pages label declined requests "rejected"
            "declined" | "rejected" => Ok(SwapStatus::Declined),
            "completed" => Ok(SwapStatus::Completed),
            "cancelled" | "canceled" => Ok(SwapStatus::Cancelled),
            _ => Err(SwapError::InvalidInput(format!("unknown status: {}", s))),
        }
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapStatus::Pending => write!(f, "pending"),
            SwapStatus::Accepted => write!(f, "accepted"),
            SwapStatus::Declined => write!(f, "declined"),
            SwapStatus::Completed => write!(f, "completed"),
            SwapStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Status criterion of a request listing; `All` disables the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(SwapStatus),
}

impl StatusFilter {
    pub fn accepts(&self, status: SwapStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        trimmed.parse().map(StatusFilter::Only)
    }
}

/// Action a party applies to a swap request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapAction {
    Accept,
    Decline,
    Complete,
    Cancel,
}

impl SwapAction {
    /// Status a successful application of this action produces
    pub fn target(&self) -> SwapStatus {
        match self {
            SwapAction::Accept => SwapStatus::Accepted,
            SwapAction::Decline => SwapStatus::Declined,
            SwapAction::Complete => SwapStatus::Completed,
            SwapAction::Cancel => SwapStatus::Cancelled,
        }
    }

    /// Status the request must be in for this action to apply
    pub fn source(&self) -> SwapStatus {
        match self {
            SwapAction::Accept | SwapAction::Decline | SwapAction::Cancel => SwapStatus::Pending,
            SwapAction::Complete => SwapStatus::Accepted,
        }
    }
}

impl FromStr for SwapAction {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "accept" => Ok(SwapAction::Accept),
            "decline" | "reject" => Ok(SwapAction::Decline),
            "complete" => Ok(SwapAction::Complete),
            "cancel" => Ok(SwapAction::Cancel),
            _ => Err(SwapError::InvalidInput(format!("unknown action: {}", s))),
        }
    }
}

impl fmt::Display for SwapAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapAction::Accept => write!(f, "accept"),
            SwapAction::Decline => write!(f, "decline"),
            SwapAction::Complete => write!(f, "complete"),
            SwapAction::Cancel => write!(f, "cancel"),
        }
    }
}

/// A proposal to exchange one taught skill for one learned skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: RequestId,
    pub requester_id: ProfileId,
    pub recipient_id: ProfileId,
    pub offered_skill: String,
    pub wanted_skill: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: SwapStatus,
    pub created_at: DateTime<Utc>,
    pub last_transitioned_at: DateTime<Utc>,
}

impl SwapRequest {
    pub fn involves(&self, member: &ProfileId) -> bool {
        &self.requester_id == member || &self.recipient_id == member
    }

    /// Copy of this request moved to `status` at `at`
    pub fn with_status(&self, status: SwapStatus, at: DateTime<Utc>) -> Self {
        SwapRequest {
            status,
            last_transitioned_at: at,
            ..self.clone()
        }
    }
}

/// Identity of the member on whose behalf a call is made
///
/// Passed explicitly into every mutating operation; the engine keeps no
/// notion of a "current user" of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub member_id: ProfileId,
}

impl SessionContext {
    pub fn new(member_id: impl Into<ProfileId>) -> Self {
        SessionContext {
            member_id: member_id.into(),
        }
    }

    pub fn is(&self, member: &ProfileId) -> bool {
        &self.member_id == member
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_set_normalizes_and_dedups() {
        let set = SkillSet::new(["  Guitar ", "guitar", "Music   Production", "", "GUITAR"]);
        assert_eq!(set.as_slice(), &["Guitar", "Music Production"]);
        assert_eq!(set.find("music production"), Some("Music Production"));
        assert!(set.contains(" GUITAR"));
        assert!(!set.contains("Cooking"));
    }

    #[test]
    fn test_skill_set_remove() {
        let mut set = SkillSet::new(["Cooking", "Spanish"]);
        assert!(set.remove("cooking"));
        assert!(!set.remove("cooking"));
        assert_eq!(set.as_slice(), &["Spanish"]);
    }

    #[test]
    fn test_skill_set_deserialize_normalizes() {
        let set: SkillSet = serde_json::from_str(r#"["React", "react", " UI/UX  Design "]"#).unwrap();
        assert_eq!(set.as_slice(), &["React", "UI/UX Design"]);
    }

    #[test]
    fn test_status_terminal() {
        assert!(!SwapStatus::Pending.is_terminal());
        assert!(!SwapStatus::Accepted.is_terminal());
        assert!(SwapStatus::Declined.is_terminal());
        assert!(SwapStatus::Completed.is_terminal());
        assert!(SwapStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!("All".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "Pending".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(SwapStatus::Pending)
        );
        assert_eq!(
            "rejected".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(SwapStatus::Declined)
        );
        assert!("archived".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_availability_filter() {
        let filter: AvailabilityFilter = "evenings".parse().unwrap();
        assert!(filter.accepts(Availability::Evenings));
        assert!(!filter.accepts(Availability::Weekends));
        assert!(AvailabilityFilter::All.accepts(Availability::Weekdays));
        assert!("sometimes".parse::<AvailabilityFilter>().is_err());
    }

    #[test]
    fn test_action_source_and_target() {
        assert_eq!(SwapAction::Accept.source(), SwapStatus::Pending);
        assert_eq!(SwapAction::Complete.source(), SwapStatus::Accepted);
        assert_eq!(SwapAction::Cancel.target(), SwapStatus::Cancelled);
        assert_eq!("reject".parse::<SwapAction>().unwrap(), SwapAction::Decline);
    }

    #[test]
    fn test_profile_text_match() {
        let profile = Profile {
            id: ProfileId::from("p1"),
            name: "Marc Demo".to_string(),
            location: "Berlin".to_string(),
            availability: Availability::Weekends,
            skills_offered: SkillSet::new(["Java Script", "Python"]),
            skills_wanted: SkillSet::new(["Cooking"]),
            visibility: Visibility::Public,
            rating: RatingSummary::default(),
            joined_at: Utc::now(),
        };

        assert!(profile.matches_text(""));
        assert!(profile.matches_text("marc"));
        assert!(profile.matches_text("script"));
        assert!(profile.matches_text("cook"));
        assert!(!profile.matches_text("berlin"));
    }
}
