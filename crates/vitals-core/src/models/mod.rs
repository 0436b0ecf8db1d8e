//! Data models shared by the aggregator, the relay, and consumers of the
//! observable state.

pub mod authorization;
pub mod dashboard_state;
pub mod fetch_outcome;
pub mod metric_kind;
pub mod snapshot;

pub use authorization::AuthorizationState;
pub use dashboard_state::{DashboardState, FieldStatus};
pub use fetch_outcome::{FetchOutcome, MetricValue};
pub use metric_kind::{MetricKind, QueryShape};
pub use snapshot::MetricSnapshot;
