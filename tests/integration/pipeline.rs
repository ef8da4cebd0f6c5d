//! Integration tests for the per-ticker pipeline

use crate::fixtures::{bars_from_closes, crossover_closes, day, sinusoid_closes};
use crate::test_utils::{
    no_retry_settings, seeded_store, store_pipeline, tickers, FailingSource, FlakySource,
    RejectingSignalSink,
};
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use stocksignal::core::pipeline::{Pipeline, PipelineError, PipelineSettings};
use stocksignal::db::MemoryStore;
use stocksignal::indicators::calculate_indicators_default;
use stocksignal::metrics::Metrics;
use stocksignal::models::signal::SignalType;
use stocksignal::signals::{DetectorConfig, SignalDetector, TriggerMode};

#[tokio::test]
async fn sinusoid_run_persists_indicators_and_signals() {
    let store = seeded_store(&[("SIN", bars_from_closes(&sinusoid_closes(300)))]).await;
    let pipeline = store_pipeline(store.clone(), no_retry_settings());

    let report = pipeline.run(&tickers(&["SIN"])).await;
    assert_eq!(report.succeeded(), 1);

    let outcome = report.outcome("SIN").unwrap().as_ref().unwrap();
    assert_eq!(outcome.bars, 300);
    assert_eq!(outcome.indicators_persisted, 300);
    assert_eq!(outcome.indicators_skipped, 0);
    assert_eq!(outcome.signals_detected, 192);
    assert_eq!(outcome.signals_persisted, 192);
    assert_eq!(outcome.signals_rejected, 0);

    let indicators = store.indicators("SIN").await;
    assert_eq!(indicators.len(), 300);
    assert_eq!(indicators.iter().filter(|p| p.rsi.is_none()).count(), 13);
    assert_eq!(indicators.iter().filter(|p| p.two_hundred_day_ma.is_none()).count(), 199);

    let signals = store.signals(Some("SIN")).await;
    let mut counts: HashMap<SignalType, usize> = HashMap::new();
    for s in &signals {
        *counts.entry(s.signal_type).or_default() += 1;
    }
    assert_eq!(signals.len(), 192);
    assert_eq!(counts[&SignalType::Buy], 3);
    assert_eq!(counts[&SignalType::Sell], 2);
    assert_eq!(counts[&SignalType::PotentialBuyOversold], 35);
    assert_eq!(counts[&SignalType::PotentialSellOverbought], 51);
    assert_eq!(counts[&SignalType::PotentialBuyMacd], 57);
    assert_eq!(counts[&SignalType::PotentialSellMacd], 44);

    for s in &signals {
        assert_eq!(s.ticker, "SIN");
        assert_eq!(s.volume, 1_000_000);
        assert_eq!(s.stop_loss, s.stock_price * 0.97);
        assert_eq!(s.take_profit, s.stock_price * 1.03);
    }
}

#[tokio::test]
async fn edge_mode_run_emits_fewer_signals() {
    let store = seeded_store(&[("SIN", bars_from_closes(&sinusoid_closes(300)))]).await;
    let settings = PipelineSettings {
        detector: DetectorConfig {
            trigger_mode: TriggerMode::Edge,
            ..DetectorConfig::default()
        },
        ..no_retry_settings()
    };
    let pipeline = store_pipeline(store.clone(), settings);

    let report = pipeline.run(&tickers(&["SIN"])).await;
    assert_eq!(report.signals_persisted(), 15);
    assert_eq!(store.signals(None).await.len(), 15);
}

#[tokio::test]
async fn rerun_appends_signals_and_rewrites_indicators() {
    let store = seeded_store(&[("SIN", bars_from_closes(&sinusoid_closes(300)))]).await;
    let pipeline = store_pipeline(store.clone(), no_retry_settings());

    pipeline.run(&tickers(&["SIN"])).await;
    let first = store.indicators("SIN").await;
    pipeline.run(&tickers(&["SIN"])).await;

    assert_eq!(store.indicators("SIN").await, first);
    assert_eq!(store.signals(Some("SIN")).await.len(), 384);
}

#[tokio::test]
async fn failing_ticker_does_not_stop_others() {
    let store = seeded_store(&[
        ("GOOD", bars_from_closes(&sinusoid_closes(300))),
        ("BAD", bars_from_closes(&sinusoid_closes(300))),
    ])
    .await;
    let source = Arc::new(FailingSource::new(store.clone()).fail("BAD"));
    let pipeline = Arc::new(Pipeline::new(
        source,
        store.clone(),
        store.clone(),
        no_retry_settings(),
    ));

    let report = pipeline.run(&tickers(&["BAD", "GOOD"])).await;

    assert_eq!(report.results[0].ticker, "BAD");
    assert_eq!(report.results[1].ticker, "GOOD");
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);
    assert!(matches!(report.outcome("BAD"), Some(Err(PipelineError::Fetch(_)))));
    assert_eq!(store.signals(Some("GOOD")).await.len(), 192);
    assert!(store.signals(Some("BAD")).await.is_empty());
}

#[tokio::test]
async fn panicking_ticker_reported_as_task_failure() {
    let store = seeded_store(&[("GOOD", bars_from_closes(&sinusoid_closes(300)))]).await;
    let source = Arc::new(FailingSource::new(store.clone()).panic_on("BOOM"));
    let pipeline = Arc::new(Pipeline::new(
        source,
        store.clone(),
        store.clone(),
        no_retry_settings(),
    ));

    let report = pipeline.run(&tickers(&["BOOM", "GOOD"])).await;

    assert!(matches!(report.outcome("BOOM"), Some(Err(PipelineError::Task(_)))));
    assert!(report.outcome("GOOD").unwrap().is_ok());
}

#[tokio::test]
async fn transient_fetch_errors_are_retried() {
    let source = Arc::new(FlakySource::new(bars_from_closes(&sinusoid_closes(300)), 2));
    let sink = Arc::new(MemoryStore::new());
    let settings = PipelineSettings {
        retry_max_times: 3,
        ..PipelineSettings::default()
    };
    let pipeline = Pipeline::new(source.clone(), sink.clone(), sink, settings);

    let outcome = pipeline.run_ticker("SIN").await.unwrap();

    assert_eq!(outcome.bars, 300);
    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retries_give_up_after_limit() {
    let source = Arc::new(FlakySource::new(Vec::new(), 10));
    let sink = Arc::new(MemoryStore::new());
    let settings = PipelineSettings {
        retry_max_times: 1,
        ..PipelineSettings::default()
    };
    let pipeline = Pipeline::new(source.clone(), sink.clone(), sink, settings);

    let result = pipeline.run_ticker("SIN").await;

    assert!(matches!(result, Err(PipelineError::Fetch(_))));
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_signal_append_is_not_replayed() {
    let store = seeded_store(&[("SIN", bars_from_closes(&sinusoid_closes(300)))]).await;
    let signals = Arc::new(RejectingSignalSink::default());
    let settings = PipelineSettings {
        retry_max_times: 3,
        ..PipelineSettings::default()
    };
    let pipeline = Pipeline::new(store.clone(), store.clone(), signals.clone(), settings);

    let result = pipeline.run_ticker("SIN").await;

    assert!(matches!(result, Err(PipelineError::PersistSignal(_))));
    assert_eq!(signals.calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.indicators("SIN").await.len(), 300);
}

#[tokio::test]
async fn indicators_without_stored_bar_are_skipped() {
    let source = seeded_store(&[("SIN", bars_from_closes(&sinusoid_closes(300)))]).await;
    let sink = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(source, sink.clone(), sink.clone(), no_retry_settings());

    let outcome = pipeline.run_ticker("SIN").await.unwrap();

    assert_eq!(outcome.indicators_persisted, 0);
    assert_eq!(outcome.indicators_skipped, 300);
    assert!(sink.indicators("SIN").await.is_empty());
    assert_eq!(sink.signals(Some("SIN")).await.len(), 192);
}

#[tokio::test]
async fn invalid_volume_rejects_only_that_days_signals() {
    let mut bars = bars_from_closes(&crossover_closes());
    bars[220].volume = -1.0;
    let points = calculate_indicators_default(&bars).unwrap();
    let detected = SignalDetector::default().detect(&bars, &points).unwrap();
    let on_bad_day = detected.iter().filter(|s| s.date == day(220)).count();

    let store = seeded_store(&[("CROSS", bars)]).await;
    let pipeline = store_pipeline(store.clone(), no_retry_settings());
    let outcome = pipeline.run_ticker("CROSS").await.unwrap();

    assert!(on_bad_day >= 1);
    assert_eq!(outcome.signals_detected, detected.len());
    assert_eq!(outcome.signals_rejected, on_bad_day);
    assert_eq!(outcome.signals_persisted, detected.len() - on_bad_day);

    let signals = store.signals(Some("CROSS")).await;
    assert!(signals.iter().all(|s| s.date != day(220)));
    assert!(signals.iter().all(|s| s.signal_type != SignalType::Buy));
}

#[tokio::test]
async fn unknown_ticker_is_empty_success() {
    let store = seeded_store(&[]).await;
    let pipeline = store_pipeline(store, no_retry_settings());

    let outcome = pipeline.run_ticker("NONE").await.unwrap();

    assert_eq!(outcome.bars, 0);
    assert_eq!(outcome.signals_persisted, 0);
}

#[tokio::test]
async fn ingest_copies_new_bars_only() {
    let remote = seeded_store(&[("SIN", bars_from_closes(&sinusoid_closes(300)))]).await;
    let local = Arc::new(MemoryStore::new());
    let pipeline = Arc::new(
        Pipeline::from_store(local.clone(), no_retry_settings()).with_ingest(remote, local.clone()),
    );

    let first = pipeline.run_ticker("SIN").await.unwrap();
    assert_eq!(first.bars_ingested, 300);
    assert_eq!(first.bars, 300);
    assert_eq!(first.indicators_persisted, 300);

    let second = pipeline.run_ticker("SIN").await.unwrap();
    assert_eq!(second.bars_ingested, 0);
    assert_eq!(second.bars, 300);
    assert_eq!(local.signals(Some("SIN")).await.len(), 384);
}

#[tokio::test]
async fn metrics_track_outcomes_and_signals() {
    let store = seeded_store(&[
        ("GOOD", bars_from_closes(&sinusoid_closes(300))),
        ("BAD", bars_from_closes(&sinusoid_closes(300))),
    ])
    .await;
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    let source = Arc::new(FailingSource::new(store.clone()).fail("BAD"));
    let pipeline = Arc::new(
        Pipeline::new(source, store.clone(), store.clone(), no_retry_settings())
            .with_metrics(metrics.clone()),
    );

    pipeline.run(&tickers(&["GOOD", "BAD"])).await;

    let outcome = |label: &str| metrics.tickers_processed_total.with_label_values(&[label]).get();
    assert_eq!(outcome("success"), 1);
    assert_eq!(outcome("failure"), 1);
    assert_eq!(metrics.signals_emitted_total.with_label_values(&["Buy"]).get(), 3);
    assert_eq!(metrics.indicator_rows_persisted_total.get(), 300);
    assert_eq!(metrics.ticker_pipeline_duration_seconds.get_sample_count(), 2);
}
