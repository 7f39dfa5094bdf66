//! Administrative surface: validated edits, live sync, full reset.

use std::sync::Arc;

use prizedraw::admin::{PrizeEdit, reset_all, update_prize};
use prizedraw::config::Config;
use prizedraw::coordinator::{DrawCoordinator, DrawOutcome};
use prizedraw::core::{ParticipantId, PrizeId, set_wall_clock_source_for_tests};
use prizedraw::ledger::RecordLedger;
use prizedraw::store::{MemoryStore, Store};
use prizedraw::test_harness::TestClock;

fn setup() -> (Config, Arc<MemoryStore>, DrawCoordinator<MemoryStore>) {
    let config = Config::default();
    let store = Arc::new(MemoryStore::new(config.default_prizes().unwrap()));
    let coordinator = DrawCoordinator::new(Arc::clone(&store), config.unlock_threshold)
        .with_max_attempts(config.max_draw_attempts);
    (config, store, coordinator)
}

fn participant(name: &str) -> ParticipantId {
    ParticipantId::new(name).unwrap()
}

#[test]
fn reset_is_idempotent() {
    let (config, store, coordinator) = setup();
    for n in 0..5 {
        coordinator.draw(participant(&format!("p{n}"))).unwrap();
    }
    assert_eq!(store.draw_count().unwrap(), 5);

    reset_all(store.as_ref(), &config).unwrap();
    let prizes_once = store.catalog().unwrap().prizes;
    let count_once = store.draw_count().unwrap();
    let records_once = store.records().unwrap();

    reset_all(store.as_ref(), &config).unwrap();
    assert_eq!(store.catalog().unwrap().prizes, prizes_once);
    assert_eq!(store.draw_count().unwrap(), count_once);
    assert_eq!(store.records().unwrap(), records_once);

    assert_eq!(count_once, 0);
    assert!(records_once.is_empty());
    assert_eq!(prizes_once, config.default_prizes().unwrap());
}

#[test]
fn admin_edits_reach_subscribers_and_later_draws() {
    let (_, store, coordinator) = setup();
    let sub = store.subscribe().unwrap();

    // Restock the coupon and crank its weight so it dominates.
    let coupon = PrizeId::parse("coupon").unwrap();
    let edit = PrizeEdit {
        weight: Some(1_000_000.0),
        stock: Some(50),
        ..PrizeEdit::default()
    };
    let version = update_prize(store.as_ref(), &coupon, &edit).unwrap();

    let event = sub.try_recv().expect("edit published");
    assert_eq!(event.version(), version);
    let seen = event.snapshot.get(&coupon).unwrap();
    assert_eq!(seen.weight, 1_000_000.0);
    assert_eq!(seen.current_stock, 50);

    // The engine draws against the operator's latest weights.
    let mut coupon_awards = 0;
    for n in 0..20 {
        if let DrawOutcome::Awarded(award) =
            coordinator.draw(participant(&format!("p{n}"))).unwrap()
        {
            if award.prize.id == coupon {
                coupon_awards += 1;
            }
        }
    }
    assert!(coupon_awards >= 19, "edited weight ignored: {coupon_awards}/20");
}

#[test]
fn records_keep_award_time_display_fields_across_edits() {
    let (_, store, coordinator) = setup();
    let coupon = PrizeId::parse("coupon").unwrap();
    // Funnel everything to the coupon so the award is deterministic.
    let only_coupon = vec![
        prizedraw::core::Prize::new(coupon.clone(), prizedraw::core::Tier::C, 44.0, 10,
            "Special prize", "Free shipping coupon").unwrap(),
    ];
    prizedraw::admin::replace_catalog(store.as_ref(), only_coupon).unwrap();

    coordinator.draw(participant("early-bird")).unwrap();

    update_prize(
        store.as_ref(),
        &coupon,
        &PrizeEdit {
            title: Some("Renamed prize".into()),
            ..PrizeEdit::default()
        },
    )
    .unwrap();

    let records = store.records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Special prize");
}

#[test]
fn record_timestamps_come_from_the_wall_clock() {
    let clock = TestClock::new(1_700_000_000_000);
    let _guard = set_wall_clock_source_for_tests(Arc::new(clock.clone()));

    let (_, store, coordinator) = setup();
    coordinator.draw(participant("pinned")).unwrap();
    clock.advance_ms(5_000);
    coordinator.draw(participant("pinned-later")).unwrap();

    let records = store.records().unwrap();
    assert_eq!(records[0].at.as_millis(), 1_700_000_000_000);
    assert_eq!(records[1].at.as_millis(), 1_700_000_005_000);

    let ledger = RecordLedger::new(Arc::clone(&store));
    let csv = ledger.export_csv().unwrap();
    assert!(csv.contains("2023-11-14T22:13:20Z"));
    assert!(csv.contains("\"pinned-later\""));
}
