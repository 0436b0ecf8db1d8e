use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the tracked health measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    StepCount,
    HeartRate,
    ActiveEnergy,
    WalkingDistance,
    SleepDuration,
}

/// How the provider is asked for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// Sum of all samples from the start of the current day until now.
    CumulativeSum,
    /// The single newest sample, no time bound.
    MostRecentSample,
    /// Category intervals overlapping the current day, summed by duration.
    CategoryIntervals,
}

impl MetricKind {
    /// Every tracked kind, in refresh order.
    pub const ALL: [MetricKind; 5] = [
        MetricKind::StepCount,
        MetricKind::HeartRate,
        MetricKind::ActiveEnergy,
        MetricKind::WalkingDistance,
        MetricKind::SleepDuration,
    ];

    pub fn query_shape(self) -> QueryShape {
        match self {
            MetricKind::StepCount | MetricKind::ActiveEnergy | MetricKind::WalkingDistance => {
                QueryShape::CumulativeSum
            }
            MetricKind::HeartRate => QueryShape::MostRecentSample,
            MetricKind::SleepDuration => QueryShape::CategoryIntervals,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::StepCount => "step_count",
            MetricKind::HeartRate => "heart_rate",
            MetricKind::ActiveEnergy => "active_energy",
            MetricKind::WalkingDistance => "walking_distance",
            MetricKind::SleepDuration => "sleep_duration",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown metric kind: {s}"))
    }
}
