//! skillswap - teach what you know, learn what you want.
//!
//! Members publish the skills they offer and the skills they want, find each
//! other through a paginated directory, and negotiate one-to-one swaps whose
//! lifecycle is enforced by a request ledger:
//! - [`directory`]: profile snapshot, search and pagination
//! - [`matching`]: validation of a proposed swap
//! - [`ledger`]: request state machine and per-member views
//! - [`api`]: JSON HTTP endpoints

pub use skillswap_core::*;

pub use skillswap_api as api;
pub use skillswap_directory as directory;
pub use skillswap_ledger as ledger;
pub use skillswap_match as matching;

pub use skillswap_directory::{DirectoryConfig, DirectoryPage, DirectoryQuery, ProfileDirectory};
pub use skillswap_ledger::{
    Direction, NewSwapRequest, RequestListing, RequestQueryService, SwapRequestLedger, TabCounts,
};
