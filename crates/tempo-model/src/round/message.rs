use serde::{Deserialize, Serialize};

use crate::{RoundIndex, spec::RateControlSpec};

/// Workload module executed by the worker during a round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    /// Identifier of the workload module.
    pub module: String,
}

/// Per-round message sent by the orchestrator to every worker.
///
/// The worker derives its immutable [`crate::RoundContext`] from this message and its own index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundMessage {
    /// Human-readable round label.
    pub label: String,
    /// Rate-control policy for the round.
    pub rate_control: RateControlSpec,
    /// Workload executed by the round.
    #[serde(default)]
    pub workload: Workload,
    /// Zero-based round index.
    pub test_round: RoundIndex,
    /// Round duration in seconds, for duration-bounded rounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_duration: Option<f64>,
    /// Transaction count, for count-bounded rounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_number: Option<u64>,
    /// Number of workers taking part in the round.
    pub total_workers: u32,
}
