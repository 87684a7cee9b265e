mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedSource, bar, coordinator, coordinator_with_timeout, d, setup_store};
use stock_sync::{
    executor::SyncStatus,
    range::DateRange,
    store::RecordStore,
};

#[tokio::test]
async fn bootstrap_then_second_run_is_idempotent() {
    let (_db, store) = setup_store();
    let today = d(2024, 12, 31);
    let source = Arc::new(ScriptedSource::new().with_bars(
        "XYZ",
        vec![
            bar(d(2024, 12, 27), 100.0),
            bar(d(2024, 12, 30), 101.0),
            bar(d(2024, 12, 31), 102.0),
        ],
    ));
    let coord = coordinator(store.clone(), source.clone(), today);
    let symbols = vec!["XYZ".to_string()];

    let first = coord.run(&symbols, false).await;
    assert_eq!(first.outcomes.len(), 1);
    assert_eq!(first.outcomes[0].status, SyncStatus::Updated);
    assert_eq!(first.outcomes[0].records_written, 3);

    // Bootstrap requested the full configured window.
    let calls = source.calls();
    assert_eq!(calls[0], ("XYZ".to_string(), d(2020, 1, 1), today));

    // Second run: latest stored date == today, so nothing is fetched and
    // the record count is unchanged.
    let second = coord.run(&symbols, false).await;
    assert_eq!(second.outcomes[0].status, SyncStatus::UpToDate);
    assert_eq!(source.calls().len(), 1);

    let freshness = store.freshness("XYZ").unwrap().unwrap();
    assert_eq!(freshness.total_records, 3);
    assert_eq!(freshness.earliest, d(2024, 12, 27));
    assert_eq!(freshness.latest, today);
}

#[tokio::test]
async fn incremental_run_fetches_exactly_the_gap() {
    let (_db, store) = setup_store();
    let today = d(2024, 12, 31);
    store
        .upsert(
            "XYZ",
            &[bar(d(2024, 12, 27), 100.0), bar(d(2024, 12, 30), 101.0)],
        )
        .unwrap();

    let source = Arc::new(ScriptedSource::new().with_bars(
        "XYZ",
        vec![bar(d(2024, 12, 30), 101.0), bar(d(2024, 12, 31), 102.0)],
    ));
    let coord = coordinator(store.clone(), source.clone(), today);

    let summary = coord.run(&["XYZ".to_string()], false).await;
    assert_eq!(summary.outcomes[0].status, SyncStatus::Updated);
    assert_eq!(summary.outcomes[0].records_written, 1);

    // The fetch range starts exactly at latest + 1 day.
    assert_eq!(
        source.calls(),
        vec![("XYZ".to_string(), d(2024, 12, 31), d(2024, 12, 31))]
    );

    let freshness = store.freshness("XYZ").unwrap().unwrap();
    assert_eq!(freshness.total_records, 3);
}

#[tokio::test]
async fn refetched_dates_overwrite_instead_of_duplicating() {
    let (_db, store) = setup_store();
    let today = d(2024, 12, 31);
    store.upsert("XYZ", &[bar(d(2024, 12, 30), 100.0)]).unwrap();

    let source = Arc::new(
        ScriptedSource::new().with_bars("XYZ", vec![bar(d(2024, 12, 30), 105.0)]),
    );
    let coord = coordinator(store.clone(), source.clone(), today);

    // Forced refresh re-fetches a window that includes the stored date.
    let summary = coord.run(&["XYZ".to_string()], true).await;
    assert_eq!(summary.outcomes[0].status, SyncStatus::Updated);

    let rows = store.read_range("XYZ", None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].close, 105.0);
}

#[tokio::test]
async fn one_failing_symbol_does_not_poison_the_batch() {
    let (_db, store) = setup_store();
    let today = d(2024, 12, 31);
    let source = Arc::new(
        ScriptedSource::new()
            .with_bars("AAA", vec![bar(d(2024, 12, 31), 10.0)])
            .with_not_found("BBB")
            .with_bars("CCC", vec![bar(d(2024, 12, 31), 30.0)]),
    );
    let coord = coordinator(store.clone(), source.clone(), today);

    let symbols: Vec<String> = ["AAA", "BBB", "CCC"].iter().map(|s| s.to_string()).collect();
    let summary = coord.run(&symbols, false).await;

    // One outcome per symbol, in input order.
    assert_eq!(summary.outcomes.len(), 3);
    assert_eq!(summary.outcomes[0].symbol, "AAA");
    assert_eq!(summary.outcomes[0].status, SyncStatus::Updated);
    assert_eq!(summary.outcomes[1].symbol, "BBB");
    assert_eq!(summary.outcomes[1].status, SyncStatus::SourceError);
    assert!(
        summary.outcomes[1]
            .message
            .as_deref()
            .unwrap()
            .contains("BBB")
    );
    assert_eq!(summary.outcomes[2].symbol, "CCC");
    assert_eq!(summary.outcomes[2].status, SyncStatus::Updated);

    assert!(summary.has_failures());
    assert_eq!(summary.failure_count(), 1);

    // The failed symbol wrote nothing; the others did.
    assert!(store.freshness("BBB").unwrap().is_none());
    assert!(store.freshness("AAA").unwrap().is_some());
    assert!(store.freshness("CCC").unwrap().is_some());
}

#[tokio::test]
async fn future_and_out_of_window_rows_are_dropped_not_merged() {
    let (_db, store) = setup_store();
    let today = d(2024, 12, 31);
    // Misbehaving provider: returns a future-dated row and one before the
    // requested window, alongside a good row.
    let source = Arc::new(ScriptedSource::new().with_raw_bars(
        "XYZ",
        vec![
            bar(d(2025, 1, 2), 999.0),
            bar(d(2019, 6, 1), 1.0),
            bar(d(2024, 12, 31), 102.0),
        ],
    ));
    let coord = coordinator(store.clone(), source.clone(), today);

    let summary = coord.run(&["XYZ".to_string()], false).await;
    let outcome = &summary.outcomes[0];
    assert_eq!(outcome.status, SyncStatus::Updated);
    assert_eq!(outcome.records_written, 1);
    assert_eq!(outcome.records_dropped, 2);

    let rows = store.read_range("XYZ", None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, d(2024, 12, 31));
}

#[tokio::test]
async fn empty_fetch_is_an_update_with_zero_records() {
    let (_db, store) = setup_store();
    let today = d(2024, 12, 31);
    // No script for the symbol: the source answers with an empty vector,
    // as a real provider does for a holiday-only range.
    let source = Arc::new(ScriptedSource::new());
    let coord = coordinator(store.clone(), source.clone(), today);

    let summary = coord.run(&["XYZ".to_string()], false).await;
    let outcome = &summary.outcomes[0];
    assert_eq!(outcome.status, SyncStatus::Updated);
    assert_eq!(outcome.records_written, 0);
    assert!(outcome.message.as_deref().unwrap().contains("no trading data"));
    assert!(store.freshness("XYZ").unwrap().is_none());
}

#[tokio::test]
async fn freshness_summary_reads_without_fetching() {
    let (_db, store) = setup_store();
    let today = d(2024, 12, 31);
    store.upsert("AAA", &[bar(d(2024, 12, 31), 10.0)]).unwrap();
    store.upsert("BBB", &[bar(d(2024, 12, 30), 20.0)]).unwrap();
    store.upsert("CCC", &[bar(d(2024, 12, 29), 30.0)]).unwrap();

    let source = Arc::new(ScriptedSource::new());
    let coord = coordinator(store.clone(), source.clone(), today);

    let symbols: Vec<String> = ["AAA", "BBB", "CCC"].iter().map(|s| s.to_string()).collect();
    let report = coord.freshness_report(&symbols).unwrap();

    let staleness: Vec<Option<i64>> = report
        .rows
        .iter()
        .map(|row| row.days_since_update)
        .collect();
    assert_eq!(staleness, vec![Some(0), Some(1), Some(2)]);

    // Reporting is a pure read path: the source was never consulted.
    assert!(source.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_times_out_as_source_error() {
    let (_db, store) = setup_store();
    let today = d(2024, 12, 31);
    let source = Arc::new(
        ScriptedSource::new().with_delay("XYZ", Duration::from_secs(60)),
    );
    let coord =
        coordinator_with_timeout(store.clone(), source, today, Duration::from_secs(1));

    let summary = coord.run(&["XYZ".to_string()], false).await;
    let outcome = &summary.outcomes[0];
    assert_eq!(outcome.status, SyncStatus::SourceError);
    assert!(outcome.message.as_deref().unwrap().contains("timed out"));
    assert!(store.freshness("XYZ").unwrap().is_none());
}

#[tokio::test]
async fn explicit_future_range_is_rejected_before_fetching() {
    let (_db, store) = setup_store();
    let today = d(2024, 12, 31);
    let source = Arc::new(ScriptedSource::new());
    let coord = coordinator(store.clone(), source.clone(), today);

    let explicit = DateRange {
        start: d(2025, 7, 8),
        end: d(2025, 7, 15),
    };
    let summary = coord.run_explicit(&["XYZ".to_string()], explicit).await;

    assert_eq!(summary.outcomes[0].status, SyncStatus::Rejected);
    assert!(
        summary.outcomes[0]
            .message
            .as_deref()
            .unwrap()
            .contains("2024-12-31")
    );
    assert!(source.calls().is_empty());
}
