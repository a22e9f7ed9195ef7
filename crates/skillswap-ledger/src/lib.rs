//! Swap request ledger
//!
//! Owns swap request records and enforces their lifecycle:
//!
//! ```text
//! pending ──accept──▶ accepted ──complete──▶ completed
//!    │
//!    ├──decline──▶ declined
//!    └──cancel───▶ cancelled
//! ```
//!
//! `declined`, `completed` and `cancelled` are terminal. Every transition is a
//! compare-and-set on the stored status, so concurrent calls against the same
//! record resolve to exactly one winner.

pub mod query;

pub use query::{Direction, RequestListing, RequestQueryService, TabCounts};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use skillswap_core::store::SwapStore;
use skillswap_core::{
    ProfileId, RequestId, Result, SwapAction, SwapError, SwapRequest, SwapStatus,
};
use skillswap_directory::ProfileDirectory;
use skillswap_match::SwapOptions;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Proposal submitted by a requester
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSwapRequest {
    pub requester_id: ProfileId,
    pub recipient_id: ProfileId,
    pub offered_skill: String,
    pub wanted_skill: String,
    #[serde(default)]
    pub message: Option<String>,
}

pub struct SwapRequestLedger {
    directory: Arc<ProfileDirectory>,
    store: Arc<dyn SwapStore>,
}

impl SwapRequestLedger {
    pub fn new(directory: Arc<ProfileDirectory>, store: Arc<dyn SwapStore>) -> Self {
        SwapRequestLedger { directory, store }
    }

    /// Validate and record a new request in `pending`
    pub async fn create(&self, new: NewSwapRequest) -> Result<SwapRequest> {
        self.create_at(new, Utc::now()).await
    }

    pub async fn create_at(&self, new: NewSwapRequest, at: DateTime<Utc>) -> Result<SwapRequest> {
        let requester = self
            .directory
            .get(&new.requester_id)
            .ok_or_else(|| SwapError::NotFound(format!("profile {}", new.requester_id)))?;
        let recipient = self
            .directory
            .get(&new.recipient_id)
            .ok_or_else(|| SwapError::NotFound(format!("profile {}", new.recipient_id)))?;

        let matched = skillswap_match::validate(
            &requester,
            &recipient,
            &new.offered_skill,
            &new.wanted_skill,
        )?;

        let message = new
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let request = SwapRequest {
            id: RequestId::generate(),
            requester_id: requester.id.clone(),
            recipient_id: recipient.id.clone(),
            offered_skill: matched.offered_skill,
            wanted_skill: matched.wanted_skill,
            message,
            status: SwapStatus::Pending,
            created_at: at,
            last_transitioned_at: at,
        };

        self.store.insert_request(&request).await?;

        info!(
            "Swap request {} created: {} offers {:?} to {} for {:?}",
            request.id,
            request.requester_id,
            request.offered_skill,
            request.recipient_id,
            request.wanted_skill
        );
        Ok(request)
    }

    /// Apply `action` on behalf of `actor`
    pub async fn transition(
        &self,
        id: &RequestId,
        actor: &ProfileId,
        action: SwapAction,
    ) -> Result<SwapRequest> {
        self.transition_at(id, actor, action, Utc::now()).await
    }

    pub async fn transition_at(
        &self,
        id: &RequestId,
        actor: &ProfileId,
        action: SwapAction,
        at: DateTime<Utc>,
    ) -> Result<SwapRequest> {
        // status only moves forward, so a lost race re-evaluates at most twice
        loop {
            let current = self.get(id).await?;

            if let Err(err) = check_transition(&current, actor, action) {
                warn!("Rejected {} on {} by {}: {}", action, id, actor, err);
                return Err(err);
            }

            // last_transitioned_at never moves backwards
            let at = at.max(current.last_transitioned_at);
            let updated = current.with_status(action.target(), at);
            if self.store.compare_and_set(current.status, &updated).await? {
                info!(
                    "Swap request {} {} -> {} by {}",
                    id, current.status, updated.status, actor
                );
                return Ok(updated);
            }

            debug!("Status of {} changed concurrently, re-reading", id);
        }
    }

    pub async fn get(&self, id: &RequestId) -> Result<SwapRequest> {
        self.store
            .get_request(id)
            .await?
            .ok_or_else(|| SwapError::NotFound(format!("swap request {}", id)))
    }

    /// Pick-lists for a request form; the recipient must be discoverable
    pub fn swap_options(
        &self,
        requester_id: &ProfileId,
        recipient_id: &ProfileId,
    ) -> Result<SwapOptions> {
        let requester = self
            .directory
            .get(requester_id)
            .ok_or_else(|| SwapError::NotFound(format!("profile {}", requester_id)))?;
        let recipient = self.directory.get_public(recipient_id)?;
        Ok(skillswap_match::swap_options(&requester, &recipient))
    }

    /// A request as seen by one of its parties
    pub async fn get_for(&self, id: &RequestId, viewer: &ProfileId) -> Result<SwapRequest> {
        let request = self.get(id).await?;
        if !request.involves(viewer) {
            return Err(SwapError::not_authorized(viewer, "view this request"));
        }
        Ok(request)
    }
}

/// Decide whether `actor` may apply `action` to `request` in its current state.
///
/// Checked in order: terminal state, actor, source state.
pub fn check_transition(request: &SwapRequest, actor: &ProfileId, action: SwapAction) -> Result<()> {
    let invalid = || SwapError::InvalidTransition {
        action,
        status: request.status,
    };

    if request.status.is_terminal() {
        return Err(invalid());
    }

    let authorized = match action {
        SwapAction::Accept | SwapAction::Decline => actor == &request.recipient_id,
        SwapAction::Complete => request.involves(actor),
        SwapAction::Cancel => actor == &request.requester_id,
    };
    if !authorized {
        return Err(SwapError::not_authorized(actor, action.to_string()));
    }

    if request.status != action.source() {
        return Err(invalid());
    }

    Ok(())
}
