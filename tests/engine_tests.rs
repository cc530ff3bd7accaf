use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pokeduel::battle::{initialize, MatchState, Outcome, RosterSizes, Side};
use pokeduel::catalog::{fetch_all, CatalogClient, CATALOG_ID_MAX};
use pokeduel::creature::Creature;
use pokeduel::error::{BattleError, CatalogError};
use pretty_assertions::assert_eq;

/// Serves a creature per id, optionally failing one request or stalling.
#[derive(Default)]
struct FakeCatalog {
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
    delay: Option<Duration>,
    /// Lower ids answer later, so completions arrive in reverse order.
    slow_low_ids: bool,
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn fetch_creature(&self, id: u16) -> Result<Creature, CatalogError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.slow_low_ids {
            let wait = CATALOG_ID_MAX.saturating_sub(id) as u64;
            tokio::time::sleep(Duration::from_millis(wait * 10)).await;
        }
        if self.fail_on_call == Some(call) {
            return Err(CatalogError::Status(503));
        }
        assert!((1..=CATALOG_ID_MAX).contains(&id), "id {id} out of range");
        Ok(Creature::new(
            format!("mon-{id}"),
            20 + id % 50,
            vec!["tackle".into(), "ember".into()],
        ))
    }
}

#[tokio::test]
async fn initialize_builds_rosters_of_requested_sizes() {
    let catalog = Arc::new(FakeCatalog::default());
    let state = initialize(
        catalog.clone(),
        RosterSizes::new(2, 5),
        Duration::from_secs(5),
    )
    .await
    .unwrap();

    assert_eq!(catalog.calls.load(Ordering::SeqCst), 7);
    assert_eq!(state.player.len(), 2);
    assert_eq!(state.cpu.len(), 5);
    assert_eq!(state.roster_sizes, RosterSizes::new(2, 5));
    for side in [Side::Player, Side::Cpu] {
        let roster = state.roster(side);
        assert_eq!(roster.active_index(), 0);
        assert!(roster
            .members()
            .iter()
            .all(|c| c.hit_points == c.max_hit_points && c.hit_points > 0));
    }
    assert_eq!(state.outcome(), Outcome::InProgress);
    assert!(state.validate().is_ok());
}

#[tokio::test]
async fn one_failed_fetch_fails_the_whole_match() {
    let catalog = Arc::new(FakeCatalog {
        fail_on_call: Some(2),
        ..Default::default()
    });
    let err = initialize(catalog, RosterSizes::new(3, 3), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, BattleError::Acquisition(ref msg) if msg.contains("503")));
}

#[tokio::test(start_paused = true)]
async fn slow_catalog_times_out() {
    let catalog = Arc::new(FakeCatalog {
        delay: Some(Duration::from_secs(60)),
        ..Default::default()
    });
    let err = initialize(catalog, RosterSizes::new(1, 1), Duration::from_secs(2))
        .await
        .unwrap_err();
    assert!(matches!(err, BattleError::Acquisition(_)));
}

#[tokio::test]
async fn invalid_sizes_are_rejected_before_fetching() {
    let catalog = Arc::new(FakeCatalog::default());
    for (sizes, side) in [
        (RosterSizes::new(0, 3), Side::Player),
        (RosterSizes::new(3, 7), Side::Cpu),
    ] {
        let err = initialize(catalog.clone(), sizes, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, BattleError::InvalidRosterSize { side: s, .. } if s == side));
    }
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn out_of_order_completions_keep_request_order() {
    let catalog = Arc::new(FakeCatalog {
        slow_low_ids: true,
        ..Default::default()
    });
    let ids = vec![3, 40, 7, 500, 12];
    let creatures = fetch_all(catalog, ids.clone()).await.unwrap();
    let names: Vec<String> = creatures.iter().map(|c| c.name.clone()).collect();
    let expected: Vec<String> = ids.iter().map(|id| format!("mon-{id}")).collect();
    assert_eq!(names, expected);

    let state = MatchState::from_creatures(creatures, RosterSizes::new(2, 3)).unwrap();
    let player: Vec<&str> = state.player.members().iter().map(|c| c.name.as_str()).collect();
    let cpu: Vec<&str> = state.cpu.members().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(player, vec!["mon-3", "mon-40"]);
    assert_eq!(cpu, vec!["mon-7", "mon-500", "mon-12"]);
}
