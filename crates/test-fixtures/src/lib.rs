//! Test doubles and scenario fixtures for the Vitals workspace.
//!
//! - [`FakeProvider`]: a scripted, call-counting [`HealthProvider`](vitals_core::HealthProvider).
//! - [`FixedClock`] and [`TokioClock`]: deterministic clocks.
//! - [`load_scenario`]: typed JSON scenarios under `fixtures/scenarios/`.

mod clock;
mod provider;
mod scenario;

pub use clock::{FixedClock, TokioClock};
pub use provider::{FakeProvider, Response};
pub use scenario::{fixture_exists, fixture_path, list_fixtures, load_fixture, load_scenario, Scenario};
