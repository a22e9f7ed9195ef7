//! Request views for one member
//!
//! Lists a member's incoming and outgoing requests filtered by status, most
//! recently transitioned first, together with per-status tab counts that
//! ignore the active filters.

use serde::{Deserialize, Serialize};
use skillswap_core::store::SwapStore;
use skillswap_core::{ProfileId, Result, StatusFilter, SwapError, SwapRequest, SwapStatus};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Which side of a request the viewer is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Viewer is the recipient
    Incoming,
    /// Viewer is the requester
    Outgoing,
    #[default]
    All,
}

impl Direction {
    fn accepts(&self, request: &SwapRequest, viewer: &ProfileId) -> bool {
        match self {
            Direction::Incoming => &request.recipient_id == viewer,
            Direction::Outgoing => &request.requester_id == viewer,
            Direction::All => request.involves(viewer),
        }
    }
}

impl FromStr for Direction {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "incoming" => Ok(Direction::Incoming),
            "outgoing" => Ok(Direction::Outgoing),
            "" | "all" => Ok(Direction::All),
            _ => Err(SwapError::InvalidInput(format!("unknown direction: {}", s))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Incoming => write!(f, "incoming"),
            Direction::Outgoing => write!(f, "outgoing"),
            Direction::All => write!(f, "all"),
        }
    }
}

/// Per-status totals over everything the viewer takes part in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TabCounts {
    pub pending: usize,
    pub accepted: usize,
    pub completed: usize,
    pub declined: usize,
    pub cancelled: usize,
}

impl TabCounts {
    fn record(&mut self, status: SwapStatus) {
        match status {
            SwapStatus::Pending => self.pending += 1,
            SwapStatus::Accepted => self.accepted += 1,
            SwapStatus::Completed => self.completed += 1,
            SwapStatus::Declined => self.declined += 1,
            SwapStatus::Cancelled => self.cancelled += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.accepted + self.completed + self.declined + self.cancelled
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestListing {
    pub items: Vec<SwapRequest>,
    pub counts: TabCounts,
}

pub struct RequestQueryService {
    store: Arc<dyn SwapStore>,
}

impl RequestQueryService {
    pub fn new(store: Arc<dyn SwapStore>) -> Self {
        RequestQueryService { store }
    }

    pub async fn list(
        &self,
        viewer: &ProfileId,
        direction: Direction,
        status: StatusFilter,
    ) -> Result<RequestListing> {
        let involving = self.store.requests_involving(viewer).await?;

        let mut counts = TabCounts::default();
        for request in &involving {
            counts.record(request.status);
        }

        let mut items: Vec<SwapRequest> = involving
            .into_iter()
            .filter(|r| direction.accepts(r, viewer) && status.accepts(r.status))
            .collect();
        items.sort_by(most_recent_first);

        debug!(
            "Listed {} of {} requests for {} ({}, {:?})",
            items.len(),
            counts.total(),
            viewer,
            direction,
            status
        );

        Ok(RequestListing { items, counts })
    }

    pub async fn counts(&self, viewer: &ProfileId) -> Result<TabCounts> {
        let mut counts = TabCounts::default();
        for request in self.store.requests_involving(viewer).await? {
            counts.record(request.status);
        }
        Ok(counts)
    }
}

/// Latest transition first, then latest creation, then id descending
pub fn most_recent_first(a: &SwapRequest, b: &SwapRequest) -> Ordering {
    b.last_transitioned_at
        .cmp(&a.last_transitioned_at)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use skillswap_core::RequestId;

    fn request(id: &str, created_min: i64, transitioned_min: i64) -> SwapRequest {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        SwapRequest {
            id: RequestId::from(id),
            requester_id: ProfileId::from("a"),
            recipient_id: ProfileId::from("b"),
            offered_skill: "Guitar".to_string(),
            wanted_skill: "Cooking".to_string(),
            message: None,
            status: SwapStatus::Pending,
            created_at: base + Duration::minutes(created_min),
            last_transitioned_at: base + Duration::minutes(transitioned_min),
        }
    }

    #[test]
    fn test_ordering_recency_then_creation() {
        let mut items = vec![
            request("old", 0, 0),
            request("tie-early", 1, 10),
            request("fresh", 2, 20),
            request("tie-late", 5, 10),
        ];
        items.sort_by(most_recent_first);

        let ids: Vec<&str> = items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["fresh", "tie-late", "tie-early", "old"]);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("Incoming".parse::<Direction>().unwrap(), Direction::Incoming);
        assert_eq!("".parse::<Direction>().unwrap(), Direction::All);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_tab_counts_total() {
        let mut counts = TabCounts::default();
        for status in SwapStatus::ALL {
            counts.record(status);
        }
        counts.record(SwapStatus::Pending);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.total(), 6);
    }
}
