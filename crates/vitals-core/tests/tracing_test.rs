//! Tracing setup and span definitions.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use vitals_core::config::ObservabilityConfig;
use vitals_core::tracing_setup::{init_tracing, init_tracing_from_config};
use vitals_core::{authorization_span, fetch_span, live_update_span, refresh_span, MetricKind};

/// Global mutex to serialize tracing tests (env var manipulation).
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

// ── Span capture ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct CapturedSpan {
    name: &'static str,
    fields: Vec<(String, String)>,
}

#[derive(Clone, Default)]
struct CaptureLayer {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
}

struct FieldRecorder<'a>(&'a mut Vec<(String, String)>);

impl Visit for FieldRecorder<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut fields = Vec::new();
        attrs.record(&mut FieldRecorder(&mut fields));
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name(),
            fields,
        });
    }
}

fn capture(f: impl FnOnce()) -> Vec<CapturedSpan> {
    let layer = CaptureLayer::default();
    let spans = Arc::clone(&layer.spans);
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = spans.lock().unwrap().clone();
    captured
}

fn field(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

// ── Spans ────────────────────────────────────────────────────────────────

#[test]
fn refresh_and_fetch_spans_carry_their_fields() {
    let spans = capture(|| {
        let cycle = refresh_span!(7_u64);
        let _outer = cycle.enter();
        let _fetch = fetch_span!(MetricKind::SleepDuration);
    });

    assert_eq!(
        spans,
        vec![
            CapturedSpan {
                name: "vitals.refresh",
                fields: vec![field("cycle_id", "7")],
            },
            CapturedSpan {
                name: "vitals.fetch",
                fields: vec![field("kind", "sleep_duration")],
            },
        ]
    );
}

#[test]
fn live_update_and_authorization_span_names() {
    let spans = capture(|| {
        let _live = live_update_span!(MetricKind::HeartRate);
        let _auth = authorization_span!();
    });

    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].name, "vitals.live_update");
    assert_eq!(spans[0].fields, vec![field("kind", "heart_rate")]);
    assert_eq!(spans[1].name, "vitals.authorization");
    assert!(spans[1].fields.is_empty());
}

// ── Setup ────────────────────────────────────────────────────────────────

#[test]
fn init_accepts_per_crate_filter_and_repeats() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("VITALS_LOG", "vitals_sync=debug,vitals_core=warn");
    init_tracing();
    std::env::remove_var("VITALS_LOG");

    init_tracing_from_config(&ObservabilityConfig {
        log_level: "debug".into(),
        json_logs: true,
    });
    init_tracing();

    // The first call installed the global subscriber; later calls are no-ops.
    assert!(tracing::dispatcher::has_been_set());
}
