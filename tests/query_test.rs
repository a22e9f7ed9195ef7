//! Per-member request views and tab counts

mod common;

use skillswap::{
    Direction, NewSwapRequest, ProfileId, StatusFilter, SwapAction, SwapStatus, TabCounts,
};

fn ids(listing: &skillswap::RequestListing) -> Vec<&str> {
    listing.items.iter().map(|r| r.id.as_str()).collect()
}

#[tokio::test]
async fn test_all_requests_most_recent_first() {
    let h = common::seeded().await;
    let marc = ProfileId::from("marc-demo");

    let listing = h
        .queries
        .list(&marc, Direction::All, StatusFilter::All)
        .await
        .unwrap();

    assert_eq!(ids(&listing), vec!["seed-req-2", "seed-req-1", "seed-req-4"]);
    assert_eq!(
        listing.counts,
        TabCounts {
            pending: 1,
            accepted: 1,
            completed: 0,
            declined: 1,
            cancelled: 0,
        }
    );
    assert_eq!(listing.counts.total(), 3);
}

#[tokio::test]
async fn test_direction_filter() {
    let h = common::seeded().await;
    let marc = ProfileId::from("marc-demo");

    let incoming = h
        .queries
        .list(&marc, Direction::Incoming, StatusFilter::All)
        .await
        .unwrap();
    assert_eq!(ids(&incoming), vec!["seed-req-1", "seed-req-4"]);
    assert!(incoming.items.iter().all(|r| r.recipient_id == marc));

    let outgoing = h
        .queries
        .list(&marc, Direction::Outgoing, StatusFilter::All)
        .await
        .unwrap();
    assert_eq!(ids(&outgoing), vec!["seed-req-2"]);
}

#[tokio::test]
async fn test_counts_ignore_filters() {
    let h = common::seeded().await;
    let marc = ProfileId::from("marc-demo");

    let pending = h
        .queries
        .list(&marc, Direction::Outgoing, StatusFilter::Only(SwapStatus::Pending))
        .await
        .unwrap();
    assert!(pending.items.is_empty());
    assert_eq!(pending.counts, h.queries.counts(&marc).await.unwrap());
    assert_eq!(pending.counts.total(), 3);
}

#[tokio::test]
async fn test_rejected_alias_lists_declined() {
    let h = common::seeded().await;
    let status: StatusFilter = "Rejected".parse().unwrap();
    let direction: Direction = "incoming".parse().unwrap();

    let listing = h
        .queries
        .list(&ProfileId::from("marc-demo"), direction, status)
        .await
        .unwrap();
    assert_eq!(ids(&listing), vec!["seed-req-4"]);
    assert!(listing
        .items
        .iter()
        .all(|r| r.status == SwapStatus::Declined));
}

#[tokio::test]
async fn test_new_activity_moves_to_top_and_cancelled_is_counted() {
    let h = common::seeded().await;
    let marc = ProfileId::from("marc-demo");
    let joe = ProfileId::from("joe-williams");

    let fresh = h
        .ledger
        .create(NewSwapRequest {
            requester_id: joe.clone(),
            recipient_id: marc.clone(),
            offered_skill: "Music Production".to_string(),
            wanted_skill: "Cooking".to_string(),
            message: None,
        })
        .await
        .unwrap();

    let listing = h
        .queries
        .list(&marc, Direction::All, StatusFilter::All)
        .await
        .unwrap();
    assert_eq!(listing.items[0].id, fresh.id);
    assert_eq!(listing.counts.pending, 2);

    h.ledger
        .transition(&fresh.id, &joe, SwapAction::Cancel)
        .await
        .unwrap();

    let counts = h.queries.counts(&marc).await.unwrap();
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.cancelled, 1);
    assert_eq!(counts.total(), 4);

    // an old request accepted now jumps ahead of the fresher cancellation
    let old = skillswap::RequestId::from("seed-req-1");
    h.ledger
        .transition(&old, &marc, SwapAction::Accept)
        .await
        .unwrap();
    let listing = h
        .queries
        .list(&marc, Direction::All, StatusFilter::All)
        .await
        .unwrap();
    assert_eq!(listing.items[0].id, old);
}

#[tokio::test]
async fn test_viewer_without_requests() {
    let h = common::seeded().await;
    let listing = h
        .queries
        .list(&ProfileId::from("lena-park"), Direction::All, StatusFilter::All)
        .await
        .unwrap();
    assert!(listing.items.is_empty());
    assert_eq!(listing.counts, TabCounts::default());
}

#[tokio::test]
async fn test_filter_strings_are_validated() {
    assert!("sideways".parse::<Direction>().is_err());
    assert!("archived".parse::<StatusFilter>().is_err());
    assert_eq!("ALL".parse::<StatusFilter>().unwrap(), StatusFilter::All);
}
