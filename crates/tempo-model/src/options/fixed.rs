use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Options of `fixed-rate`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixedRateOpts {
    /// Aggregate target throughput across all workers.
    pub tps: f64,
}

impl Default for FixedRateOpts {
    fn default() -> Self {
        Self { tps: 10.0 }
    }
}

impl FixedRateOpts {
    pub fn validate(&self) -> ModelResult<()> {
        positive("tps", self.tps)
    }
}

/// Options of `linear-rate`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinearRateOpts {
    /// Aggregate throughput at the start of the round.
    pub starting_tps: f64,
    /// Aggregate throughput at the end of the round.
    pub finishing_tps: f64,
}

impl Default for LinearRateOpts {
    fn default() -> Self {
        Self {
            starting_tps: 20.0,
            finishing_tps: 80.0,
        }
    }
}

impl LinearRateOpts {
    pub fn validate(&self) -> ModelResult<()> {
        positive("startingTps", self.starting_tps)?;
        positive("finishingTps", self.finishing_tps)
    }
}

/// Options of `fixed-load`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixedLoadOpts {
    /// Aggregate number of in-flight transactions to maintain.
    pub transaction_load: u64,
    /// Aggregate pacing used until the first transaction completes.
    pub start_tps: f64,
}

impl Default for FixedLoadOpts {
    fn default() -> Self {
        Self {
            transaction_load: 10,
            start_tps: 5.0,
        }
    }
}

impl FixedLoadOpts {
    pub fn validate(&self) -> ModelResult<()> {
        if self.transaction_load == 0 {
            return Err(ModelError::Invalid("transactionLoad must be positive".into()));
        }
        positive("startTps", self.start_tps)
    }
}

fn positive(field: &str, value: f64) -> ModelResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ModelError::Invalid(format!(
            "{field} must be a positive number, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixed_rate_defaults_when_empty() {
        let opts: FixedRateOpts = serde_json::from_value(json!({})).unwrap();
        assert_eq!(opts.tps, 10.0);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn fixed_rate_rejects_non_positive_tps() {
        for tps in [0.0, -5.0, f64::NAN] {
            assert!(FixedRateOpts { tps }.validate().is_err(), "tps={tps}");
        }
    }

    #[test]
    fn linear_rate_reads_camel_case() {
        let opts: LinearRateOpts =
            serde_json::from_value(json!({"startingTps": 5, "finishingTps": 50})).unwrap();
        assert_eq!(opts.starting_tps, 5.0);
        assert_eq!(opts.finishing_tps, 50.0);
    }

    #[test]
    fn fixed_load_rejects_zero_load() {
        let opts = FixedLoadOpts {
            transaction_load: 0,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }
}
