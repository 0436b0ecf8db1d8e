//! Refresh-cycle tests: fan-out, finalize-once, degrade policy, timeouts,
//! overlapping cycles.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use test_fixtures::{load_scenario, FakeProvider, FixedClock, Response, TokioClock};
use vitals_core::config::FailurePolicy;
use vitals_core::constants::UNAVAILABLE_MESSAGE;
use vitals_core::{FetchOutcome, FieldStatus, MetricKind, MetricSnapshot, SyncError, VitalsConfig};
use vitals_sync::VitalsService;

// ── Test Harness ─────────────────────────────────────────────────────────

fn noon() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-10-18T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn setup(
    provider: FakeProvider,
    config: VitalsConfig,
) -> (
    Arc<FakeProvider>,
    Arc<FixedClock>,
    VitalsService<FakeProvider, FixedClock>,
) {
    let provider = Arc::new(provider);
    let clock = Arc::new(FixedClock::new(noon()));
    let service = VitalsService::new(Arc::clone(&provider), Arc::clone(&clock), config);
    (provider, clock, service)
}

fn values_only(snapshot: &MetricSnapshot) -> MetricSnapshot {
    MetricSnapshot {
        last_updated: None,
        ..snapshot.clone()
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn typical_day_lands_exactly_in_snapshot() {
    let scenario = load_scenario("typical_day");
    let (_, _, service) = setup(scenario.provider(), VitalsConfig::default());

    let report = service.refresh().await.unwrap();

    assert!(report.all_succeeded());
    let snapshot = service.snapshot();
    assert_eq!(values_only(&snapshot), scenario.expected);
    assert_eq!(snapshot.step_count, 4200);
    assert_eq!(snapshot.heart_rate, 72);
    assert_eq!(snapshot.active_energy, 310.5);
    assert_eq!(snapshot.walking_distance, 3.1);
    assert_eq!(snapshot.sleep_hours, 6.5);
    assert_eq!(snapshot.last_updated, Some(noon()));

    let state = service.current();
    assert!(!state.is_loading());
    assert_eq!(state.error_message, None);
    for kind in MetricKind::ALL {
        assert_eq!(state.status_of(kind), &FieldStatus::Fresh { at: noon() });
    }
}

#[tokio::test]
async fn failing_step_fetch_degrades_only_steps() {
    let scenario = load_scenario("steps_failing");
    let (_, _, service) = setup(scenario.provider(), VitalsConfig::default());

    let report = service.refresh().await.unwrap();

    assert_eq!(report.degraded_kinds(), vec![MetricKind::StepCount]);
    assert!(matches!(
        report.outcome(MetricKind::StepCount),
        Some(FetchOutcome::Failed { .. })
    ));
    assert_eq!(values_only(&service.snapshot()), scenario.expected);

    let state = service.current();
    assert!(state.status_of(MetricKind::StepCount).is_degraded());
    assert!(!state.status_of(MetricKind::HeartRate).is_degraded());
    // Per-field failures are never surfaced as the error message.
    assert_eq!(state.error_message, None);
}

#[tokio::test]
async fn failed_field_keeps_previous_value_by_default() {
    let (provider, clock, service) = setup(
        FakeProvider::with_values(4200.0, 72.0, 310.5, 3.1, 6.5),
        VitalsConfig::default(),
    );
    service.refresh().await.unwrap();

    provider.set_response(MetricKind::StepCount, Response::Fail("boom".into()));
    provider.set_response(MetricKind::ActiveEnergy, Response::Value(400.0));
    clock.advance(TimeDelta::minutes(5));
    service.refresh().await.unwrap();

    let snapshot = service.snapshot();
    assert_eq!(snapshot.step_count, 4200);
    assert_eq!(snapshot.active_energy, 400.0);
    assert_eq!(snapshot.last_updated, Some(noon() + TimeDelta::minutes(5)));
    assert_eq!(service.degradations().len(), 1);
}

#[tokio::test]
async fn zero_policy_resets_failed_field() {
    let mut config = VitalsConfig::default();
    config.sync.failure_policy = FailurePolicy::Zero;
    let (provider, _, service) = setup(
        FakeProvider::with_values(4200.0, 72.0, 310.5, 3.1, 6.5),
        config,
    );
    service.refresh().await.unwrap();

    provider.set_response(MetricKind::StepCount, Response::NoData);
    service.refresh().await.unwrap();

    let snapshot = service.snapshot();
    assert_eq!(snapshot.step_count, 0);
    assert_eq!(snapshot.heart_rate, 72);
}

#[tokio::test]
async fn cycle_finalizes_once_when_every_fetch_fails() {
    let provider = MetricKind::ALL
        .into_iter()
        .fold(FakeProvider::new(), |p, kind| {
            p.with_response(kind, Response::Fail("store offline".into()))
        });
    let (provider, _, service) = setup(provider, VitalsConfig::default());

    let report = service.refresh().await.unwrap();

    assert_eq!(report.outcomes.len(), 5);
    assert_eq!(report.degraded_kinds().len(), 5);
    assert_eq!(provider.total_query_calls(), 5);

    let state = service.current();
    assert_eq!(state.cycles_started, 1);
    assert_eq!(state.cycles_in_flight, 0);
    assert_eq!(state.snapshot.last_updated, Some(noon()));
    assert_eq!(values_only(&state.snapshot), MetricSnapshot::default());
    assert_eq!(state.error_message, None);
}

#[tokio::test]
async fn unavailable_provider_short_circuits_refresh() {
    let (provider, _, service) = setup(FakeProvider::new().unavailable(), VitalsConfig::default());

    let err = service.refresh().await.unwrap_err();

    assert!(matches!(err, SyncError::Unavailable));
    assert_eq!(provider.total_query_calls(), 0);
    let state = service.current();
    assert_eq!(state.cycles_started, 0);
    assert!(!state.is_loading());
    assert_eq!(state.error_message.as_deref(), Some(UNAVAILABLE_MESSAGE));
    assert_eq!(state.snapshot, MetricSnapshot::default());
}

#[tokio::test]
async fn next_refresh_clears_previous_error() {
    let (provider, _, service) = setup(FakeProvider::new().unavailable(), VitalsConfig::default());
    assert!(service.refresh().await.is_err());

    provider.set_available(true);
    service.refresh().await.unwrap();

    assert_eq!(service.current().error_message, None);
}

#[tokio::test]
async fn day_scoped_kinds_read_from_midnight_and_heart_rate_is_unbounded() {
    let (provider, _, service) = setup(
        FakeProvider::with_values(1.0, 60.0, 1.0, 1.0, 1.0),
        VitalsConfig::default(),
    );
    service.refresh().await.unwrap();

    let midnight = noon() - TimeDelta::hours(12);
    for kind in [
        MetricKind::StepCount,
        MetricKind::ActiveEnergy,
        MetricKind::WalkingDistance,
        MetricKind::SleepDuration,
    ] {
        assert_eq!(provider.windows(kind), vec![(midnight, noon())], "{kind}");
    }
    assert!(provider.windows(MetricKind::HeartRate).is_empty());
    assert_eq!(provider.calls(MetricKind::HeartRate), 1);
}

#[tokio::test]
async fn busy_flag_is_visible_while_cycle_runs() {
    let provider = FakeProvider::with_values(1.0, 60.0, 1.0, 1.0, 1.0)
        .with_delay(MetricKind::SleepDuration, Duration::from_millis(50));
    let (_, _, service) = setup(provider, VitalsConfig::default());
    let mut rx = service.state();

    let (report, seen_busy) = tokio::join!(service.refresh(), async {
        rx.wait_for(|s| s.is_loading()).await.map(|s| s.cycles_in_flight)
    });

    report.unwrap();
    assert_eq!(seen_busy.unwrap(), 1);
    assert!(!service.current().is_loading());
}

// ── Timeouts ─────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn stalled_fetch_times_out_and_cycle_still_finalizes() {
    let mut config = VitalsConfig::default();
    config.sync.fetch_timeout_ms = 5_000;
    let provider = FakeProvider::with_values(4200.0, 72.0, 310.5, 3.1, 6.5)
        .with_response(MetricKind::HeartRate, Response::Hang);
    let (_, _, service) = setup(provider, config);

    let report = service.refresh().await.unwrap();

    assert_eq!(
        report.outcome(MetricKind::HeartRate),
        Some(&FetchOutcome::TimedOut { after_ms: 5_000 })
    );
    let state = service.current();
    assert_eq!(state.snapshot.step_count, 4200);
    assert_eq!(state.snapshot.heart_rate, 0);
    assert!(state.status_of(MetricKind::HeartRate).is_degraded());
    assert!(!state.is_loading());
}

#[tokio::test(start_paused = true)]
async fn disabled_timeout_waits_and_dropped_cycle_releases_busy_flag() {
    let mut config = VitalsConfig::default();
    config.sync.fetch_timeout_ms = 0;
    let provider = FakeProvider::new().with_response(MetricKind::StepCount, Response::Hang);
    let (_, _, service) = setup(provider, config);

    let outer = tokio::time::timeout(Duration::from_secs(3600), service.refresh()).await;

    assert!(outer.is_err(), "refresh should still be waiting on the provider");
    let state = service.current();
    assert_eq!(state.cycles_started, 1);
    assert_eq!(state.cycles_in_flight, 0);
    assert_eq!(state.snapshot.last_updated, None);
}

// ── Overlapping cycles ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn overlapping_cycles_last_finalize_wins() {
    let provider = Arc::new(
        FakeProvider::with_values(100.0, 60.0, 1.0, 1.0, 1.0)
            .with_delay(MetricKind::StepCount, Duration::from_millis(500)),
    );
    let clock = Arc::new(TokioClock::new(noon()));
    let service = VitalsService::new(Arc::clone(&provider), clock, VitalsConfig::default());

    let (slow, fast) = tokio::join!(service.refresh(), async {
        // The slow cycle has already issued its reads with the old script.
        provider.set_delay(MetricKind::StepCount, None);
        provider.set_response(MetricKind::StepCount, Response::Value(200.0));
        service.refresh().await
    });
    let (slow, fast) = (slow.unwrap(), fast.unwrap());

    assert!(slow.finished_at > fast.finished_at);
    assert!(slow.finished_at >= noon() + TimeDelta::milliseconds(500));

    let state = service.current();
    assert_eq!(state.cycles_started, 2);
    assert_eq!(state.cycles_in_flight, 0);
    assert_eq!(state.snapshot.last_updated, Some(slow.finished_at));
    assert_eq!(state.snapshot.step_count, 100);
    assert_ne!(slow.cycle_id, fast.cycle_id);
}
