use std::time::Duration;

use crate::{
    RoundIndex, WorkerIndex,
    error::{ModelError, ModelResult},
    round::{RoundMessage, Workload},
    spec::RateControlSpec,
};

/// What ends a round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RoundBound {
    /// The round runs for a fixed wall-clock duration.
    Duration(Duration),
    /// The round submits a fixed number of transactions.
    Count(u64),
}

/// Immutable per-round configuration seen by one worker.
///
/// Built once from a [`RoundMessage`] and never mutated afterwards;
/// controllers receive it by shared reference.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundContext {
    label: String,
    worker_index: WorkerIndex,
    round_index: RoundIndex,
    total_workers: u32,
    bound: RoundBound,
    workload: Workload,
    rate_control: RateControlSpec,
}

impl RoundContext {
    /// Derive the context for `worker_index` from an orchestrator message.
    ///
    /// Rules:
    /// - `totalWorkers` is at least 1 and greater than `worker_index`;
    /// - exactly one of `txDuration` / `txNumber` is set;
    /// - `txDuration` is finite and positive, `txNumber` is positive.
    pub fn from_message(msg: &RoundMessage, worker_index: WorkerIndex) -> ModelResult<Self> {
        if msg.total_workers == 0 {
            return Err(ModelError::Invalid("totalWorkers must be at least 1".into()));
        }
        if worker_index >= msg.total_workers {
            return Err(ModelError::Invalid(format!(
                "worker index {worker_index} out of range for {} workers",
                msg.total_workers
            )));
        }

        let bound = match (msg.tx_duration, msg.tx_number) {
            (Some(secs), None) => {
                if !secs.is_finite() || secs <= 0.0 {
                    return Err(ModelError::Invalid(format!(
                        "txDuration must be positive, got {secs}"
                    )));
                }
                let duration = Duration::try_from_secs_f64(secs).map_err(|_| {
                    ModelError::Invalid(format!("txDuration out of range, got {secs}"))
                })?;
                RoundBound::Duration(duration)
            }
            (None, Some(0)) => {
                return Err(ModelError::Invalid("txNumber must be positive".into()));
            }
            (None, Some(n)) => RoundBound::Count(n),
            (Some(_), Some(_)) => {
                return Err(ModelError::Invalid(
                    "txDuration and txNumber are mutually exclusive".into(),
                ));
            }
            (None, None) => {
                return Err(ModelError::Invalid(
                    "round needs either txDuration or txNumber".into(),
                ));
            }
        };

        Ok(Self {
            label: msg.label.clone(),
            worker_index,
            round_index: msg.test_round,
            total_workers: msg.total_workers,
            bound,
            workload: msg.workload.clone(),
            rate_control: msg.rate_control.clone(),
        })
    }

    /// Convenience constructor for programmatic rounds.
    pub fn new(
        worker_index: WorkerIndex,
        round_index: RoundIndex,
        total_workers: u32,
        bound: RoundBound,
        rate_control: RateControlSpec,
    ) -> Self {
        Self {
            label: format!("round-{round_index}"),
            worker_index,
            round_index,
            total_workers: total_workers.max(1),
            bound,
            workload: Workload::default(),
            rate_control,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn worker_index(&self) -> WorkerIndex {
        self.worker_index
    }

    pub fn round_index(&self) -> RoundIndex {
        self.round_index
    }

    pub fn total_workers(&self) -> u32 {
        self.total_workers
    }

    pub fn bound(&self) -> RoundBound {
        self.bound
    }

    /// Round duration, if the round is duration-bounded.
    pub fn duration(&self) -> Option<Duration> {
        match self.bound {
            RoundBound::Duration(d) => Some(d),
            RoundBound::Count(_) => None,
        }
    }

    /// Transaction count, if the round is count-bounded.
    pub fn tx_number(&self) -> Option<u64> {
        match self.bound {
            RoundBound::Count(n) => Some(n),
            RoundBound::Duration(_) => None,
        }
    }

    /// Copy of this context bounded by `bound` instead.
    ///
    /// Used by composite controllers to hand each sub-controller its own slice of the round.
    pub fn with_bound(&self, bound: RoundBound) -> Self {
        Self {
            bound,
            ..self.clone()
        }
    }

    pub fn workload(&self) -> &Workload {
        &self.workload
    }

    /// Top-level rate-control policy of the round.
    pub fn rate_control(&self) -> &RateControlSpec {
        &self.rate_control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(extra: serde_json::Value) -> RoundMessage {
        let mut base = json!({
            "label": "test",
            "rateControl": {
                "type": "record-rate",
                "opts": {
                    "rateController": { "type": "zero-rate" },
                    "pathTemplate": "../tx_records_client<C>_round<R>.txt",
                    "outputFormat": "TEXT",
                    "logEnd": true
                }
            },
            "workload": { "module": "module.js" },
            "testRound": 0,
            "totalWorkers": 2
        });
        for (k, v) in extra.as_object().unwrap() {
            base[k] = v.clone();
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn builds_duration_bounded_context() {
        let msg = message(json!({"txDuration": 250}));
        let ctx = RoundContext::from_message(&msg, 1).unwrap();

        assert_eq!(ctx.label(), "test");
        assert_eq!(ctx.worker_index(), 1);
        assert_eq!(ctx.round_index(), 0);
        assert_eq!(ctx.total_workers(), 2);
        assert_eq!(ctx.duration(), Some(Duration::from_secs(250)));
        assert_eq!(ctx.tx_number(), None);
        assert_eq!(ctx.workload().module, "module.js");
        assert_eq!(ctx.rate_control().kind, "record-rate");
    }

    #[test]
    fn builds_count_bounded_context() {
        let msg = message(json!({"txNumber": 500}));
        let ctx = RoundContext::from_message(&msg, 0).unwrap();
        assert_eq!(ctx.bound(), RoundBound::Count(500));
    }

    #[test]
    fn rejects_missing_or_conflicting_bounds() {
        let none = message(json!({}));
        assert!(RoundContext::from_message(&none, 0).is_err());

        let both = message(json!({"txDuration": 10, "txNumber": 10}));
        assert!(RoundContext::from_message(&both, 0).is_err());

        let zero = message(json!({"txDuration": 0}));
        assert!(RoundContext::from_message(&zero, 0).is_err());
    }

    #[test]
    fn rejects_out_of_range_duration() {
        let huge = message(json!({"txDuration": 1e20}));
        let err = RoundContext::from_message(&huge, 0).unwrap_err();
        assert!(err.to_string().contains("out of range"), "got: {err}");
    }

    #[test]
    fn with_bound_keeps_identity() {
        let msg = message(json!({"txDuration": 100}));
        let ctx = RoundContext::from_message(&msg, 1).unwrap();
        let slice = ctx.with_bound(RoundBound::Duration(Duration::from_secs(25)));

        assert_eq!(slice.worker_index(), 1);
        assert_eq!(slice.rate_control(), ctx.rate_control());
        assert_eq!(slice.duration(), Some(Duration::from_secs(25)));
        assert_eq!(ctx.duration(), Some(Duration::from_secs(100)));
    }

    #[test]
    fn rejects_worker_index_out_of_range() {
        let msg = message(json!({"txDuration": 1}));
        let err = RoundContext::from_message(&msg, 2).unwrap_err();
        assert!(err.to_string().contains("out of range"), "got: {err}");
    }
}
