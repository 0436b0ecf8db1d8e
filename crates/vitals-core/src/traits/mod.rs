//! Seams to the outside world: the health-data provider and the clock.

pub mod clock;
pub mod provider;

pub use clock::{start_of_day_in, Clock, SystemClock};
pub use provider::{ChangeNotification, ChangeStream, HealthProvider, SampleInterval};
