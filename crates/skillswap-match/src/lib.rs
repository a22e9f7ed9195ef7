//! Match Validator
//!
//! Decides whether a proposed swap is legal for the two profiles involved.
//! Rules are checked in order and the first failure wins:
//! 1. requester and recipient differ
//! 2. the recipient is discoverable
//! 3. the offered skill is one the requester offers
//! 4. the wanted skill is one the recipient wants
//!
//! Pure functions over profile snapshots; no storage access.

use serde::Serialize;
use skillswap_core::{Profile, Result, SwapError};
use tracing::{debug, warn};

/// Skill labels of an accepted proposal, spelled as the profiles list them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedSkills {
    pub offered_skill: String,
    pub wanted_skill: String,
}

/// Validate a proposed swap
pub fn validate(
    requester: &Profile,
    recipient: &Profile,
    offered_skill: &str,
    wanted_skill: &str,
) -> Result<MatchedSkills> {
    debug!(
        "Validating swap {} -> {}: offer {:?}, want {:?}",
        requester.id, recipient.id, offered_skill, wanted_skill
    );

    if requester.id == recipient.id {
        warn!("Self swap rejected for {}", requester.id);
        return Err(SwapError::SelfSwap(requester.id.clone()));
    }

    if !recipient.is_discoverable() {
        warn!("Recipient {} is not discoverable", recipient.id);
        return Err(SwapError::RecipientNotDiscoverable(recipient.id.clone()));
    }

    let offered = requester
        .skills_offered
        .find(offered_skill)
        .ok_or_else(|| SwapError::InvalidOfferedSkill(offered_skill.to_string()))?;

    let wanted = recipient
        .skills_wanted
        .find(wanted_skill)
        .ok_or_else(|| SwapError::InvalidWantedSkill(wanted_skill.to_string()))?;

    Ok(MatchedSkills {
        offered_skill: offered.to_string(),
        wanted_skill: wanted.to_string(),
    })
}

/// The two pick-lists a request form offers: what the requester can teach
/// and what the recipient wants to learn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapOptions {
    pub offered_skills: Vec<String>,
    pub wanted_skills: Vec<String>,
}

pub fn swap_options(requester: &Profile, recipient: &Profile) -> SwapOptions {
    SwapOptions {
        offered_skills: requester.skills_offered.as_slice().to_vec(),
        wanted_skills: recipient.skills_wanted.as_slice().to_vec(),
    }
}
