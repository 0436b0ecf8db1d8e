use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tokio::sync::mpsc;
use vitals_core::traits::{ChangeNotification, ChangeStream, SampleInterval};
use vitals_core::{HealthProvider, MetricKind, ProviderError, ProviderResult};

const STREAM_CAPACITY: usize = 64;

/// Scripted answer for one metric kind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// Sum or newest sample. For sleep: one interval of this many hours
    /// ending at the query's end.
    Value(f64),
    /// Category samples, returned as-is.
    Intervals(Vec<SampleInterval>),
    NoData,
    Fail(String),
    /// Never answers.
    Hang,
}

/// In-memory [`HealthProvider`] with scripted answers and call counters.
pub struct FakeProvider {
    available: AtomicBool,
    authorization: Mutex<ProviderResult<bool>>,
    responses: Mutex<HashMap<MetricKind, Response>>,
    delays: Mutex<HashMap<MetricKind, Duration>>,
    query_calls: Mutex<HashMap<MetricKind, usize>>,
    windows: Mutex<Vec<(MetricKind, DateTime<Utc>, DateTime<Utc>)>>,
    auth_calls: AtomicUsize,
    streams: Mutex<HashMap<MetricKind, mpsc::Sender<ChangeNotification>>>,
    subscription_failure: Mutex<Option<String>>,
}

impl FakeProvider {
    /// Available, grants authorization, answers `NoData` for every kind.
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            authorization: Mutex::new(Ok(true)),
            responses: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            query_calls: Mutex::new(HashMap::new()),
            windows: Mutex::new(Vec::new()),
            auth_calls: AtomicUsize::new(0),
            streams: Mutex::new(HashMap::new()),
            subscription_failure: Mutex::new(None),
        }
    }

    /// Provider answering every kind with a plain value.
    pub fn with_values(
        steps: f64,
        heart_rate: f64,
        energy: f64,
        distance: f64,
        sleep_hours: f64,
    ) -> Self {
        Self::new()
            .with_response(MetricKind::StepCount, Response::Value(steps))
            .with_response(MetricKind::HeartRate, Response::Value(heart_rate))
            .with_response(MetricKind::ActiveEnergy, Response::Value(energy))
            .with_response(MetricKind::WalkingDistance, Response::Value(distance))
            .with_response(MetricKind::SleepDuration, Response::Value(sleep_hours))
    }

    pub fn with_response(self, kind: MetricKind, response: Response) -> Self {
        self.set_response(kind, response);
        self
    }

    /// Delay every answer for `kind` by `delay` (Tokio time).
    pub fn with_delay(self, kind: MetricKind, delay: Duration) -> Self {
        self.set_delay(kind, Some(delay));
        self
    }

    pub fn with_authorization(self, result: ProviderResult<bool>) -> Self {
        self.set_authorization(result);
        self
    }

    pub fn unavailable(self) -> Self {
        self.set_available(false);
        self
    }

    pub fn failing_subscriptions(self, reason: impl Into<String>) -> Self {
        *self.subscription_failure.lock().unwrap() = Some(reason.into());
        self
    }

    pub fn set_response(&self, kind: MetricKind, response: Response) {
        self.responses.lock().unwrap().insert(kind, response);
    }

    /// Replace (or with `None`, clear) the answer delay for `kind`.
    pub fn set_delay(&self, kind: MetricKind, delay: Option<Duration>) {
        let mut delays = self.delays.lock().unwrap();
        match delay {
            Some(d) => delays.insert(kind, d),
            None => delays.remove(&kind),
        };
    }

    pub fn set_authorization(&self, result: ProviderResult<bool>) {
        *self.authorization.lock().unwrap() = result;
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of queries issued for `kind`.
    pub fn calls(&self, kind: MetricKind) -> usize {
        self.query_calls
            .lock()
            .unwrap()
            .get(&kind)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_query_calls(&self) -> usize {
        self.query_calls.lock().unwrap().values().sum()
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    /// Time windows passed to day-scoped queries for `kind`.
    pub fn windows(&self, kind: MetricKind) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.windows
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, start, end)| (*start, *end))
            .collect()
    }

    /// Push a change notification. Returns false if nobody is subscribed.
    pub fn notify(&self, kind: MetricKind) -> bool {
        self.push(ChangeNotification::changed(kind, Utc::now()))
    }

    /// Push an observer error for `kind`.
    pub fn notify_error(&self, kind: MetricKind, error: &str) -> bool {
        self.push(ChangeNotification::errored(kind, Utc::now(), error))
    }

    /// End the change stream for `kind`.
    pub fn close_stream(&self, kind: MetricKind) {
        self.streams.lock().unwrap().remove(&kind);
    }

    pub fn has_stream(&self, kind: MetricKind) -> bool {
        self.streams
            .lock()
            .unwrap()
            .get(&kind)
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }

    fn push(&self, notification: ChangeNotification) -> bool {
        let streams = self.streams.lock().unwrap();
        match streams.get(&notification.kind) {
            Some(tx) => tx.try_send(notification).is_ok(),
            None => false,
        }
    }

    /// Count the call and look up the script. Never holds a lock across an await.
    fn begin_query(&self, kind: MetricKind) -> (Response, Option<Duration>) {
        *self.query_calls.lock().unwrap().entry(kind).or_insert(0) += 1;
        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or(Response::NoData);
        let delay = self.delays.lock().unwrap().get(&kind).copied();
        (response, delay)
    }

    fn record_window(&self, kind: MetricKind, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.windows.lock().unwrap().push((kind, start, end));
    }

    async fn answer(&self, kind: MetricKind) -> ProviderResult<Response> {
        let (response, delay) = self.begin_query(kind);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match response {
            Response::Hang => std::future::pending().await,
            Response::Fail(reason) => Err(ProviderError::QueryFailed { kind, reason }),
            other => Ok(other),
        }
    }
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthProvider for FakeProvider {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn request_authorization(&self, _kinds: &[MetricKind]) -> ProviderResult<bool> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        self.authorization.lock().unwrap().clone()
    }

    async fn query_cumulative_sum(
        &self,
        kind: MetricKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ProviderResult<Option<f64>> {
        self.record_window(kind, start, end);
        scalar(self.answer(kind).await?)
    }

    async fn query_most_recent_sample(&self, kind: MetricKind) -> ProviderResult<Option<f64>> {
        scalar(self.answer(kind).await?)
    }

    async fn query_category_samples(
        &self,
        kind: MetricKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ProviderResult<Vec<SampleInterval>> {
        self.record_window(kind, start, end);
        match self.answer(kind).await? {
            Response::Value(hours) => {
                let length = TimeDelta::milliseconds((hours * 3_600_000.0) as i64);
                Ok(vec![SampleInterval::new(end - length, end)])
            }
            Response::Intervals(intervals) => Ok(intervals),
            _ => Ok(Vec::new()),
        }
    }

    fn subscribe_to_changes(&self, kind: MetricKind) -> ProviderResult<ChangeStream> {
        if let Some(reason) = self.subscription_failure.lock().unwrap().clone() {
            return Err(ProviderError::SubscriptionFailed { kind, reason });
        }
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        self.streams.lock().unwrap().insert(kind, tx);
        Ok(rx)
    }
}

fn scalar(response: Response) -> ProviderResult<Option<f64>> {
    match response {
        Response::Value(v) => Ok(Some(v)),
        Response::Intervals(intervals) => Ok(Some(
            intervals.iter().map(SampleInterval::duration_secs).sum(),
        )),
        _ => Ok(None),
    }
}
