use serde::{Deserialize, Serialize};

use crate::{
    error::{ModelError, ModelResult},
    spec::RateControlSpec,
};

/// Options of `composite-rate`.
///
/// Sub-controllers run one after another. Each one owns a share of the round
/// proportional to its weight; a weight of zero skips the controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeRateOpts {
    /// Relative share of the round for each sub-controller.
    pub weights: Vec<f64>,
    /// Sub-controller specs, same length as `weights`.
    pub rate_controllers: Vec<RateControlSpec>,
    /// Log every switch between sub-controllers at info level.
    #[serde(default)]
    pub log_change: bool,
}

impl CompositeRateOpts {
    /// Rules:
    /// - at least one sub-controller, one weight per sub-controller;
    /// - weights are finite and non-negative, with a positive sum.
    pub fn validate(&self) -> ModelResult<()> {
        if self.rate_controllers.is_empty() {
            return Err(ModelError::Invalid("rateControllers must not be empty".into()));
        }
        if self.weights.len() != self.rate_controllers.len() {
            return Err(ModelError::Invalid(format!(
                "weights ({}) and rateControllers ({}) differ in length",
                self.weights.len(),
                self.rate_controllers.len()
            )));
        }
        if let Some(w) = self.weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(ModelError::Invalid(format!(
                "weights must be non-negative, got {w}"
            )));
        }
        if self.weights.iter().sum::<f64>() <= 0.0 {
            return Err(ModelError::Invalid("weights must not all be zero".into()));
        }
        Ok(())
    }

    /// Cumulative switch points as fractions of the round in `(0, 1]`.
    pub fn boundaries(&self) -> Vec<f64> {
        let total: f64 = self.weights.iter().sum();
        let mut acc = 0.0;
        self.weights
            .iter()
            .map(|w| {
                acc += w / total;
                acc
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts(weights: Vec<f64>, n: usize) -> CompositeRateOpts {
        CompositeRateOpts {
            weights,
            rate_controllers: vec![RateControlSpec::new("no-rate"); n],
            log_change: false,
        }
    }

    #[test]
    fn parses_nested_specs() {
        let parsed: CompositeRateOpts = serde_json::from_value(json!({
            "weights": [2, 1],
            "rateControllers": [
                {"type": "fixed-rate", "opts": {"tps": 10}},
                {"type": "no-rate"}
            ]
        }))
        .unwrap();

        assert_eq!(parsed.rate_controllers[0].kind, "fixed-rate");
        assert!(!parsed.log_change);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn boundaries_are_cumulative_fractions() {
        let b = opts(vec![1.0, 0.0, 3.0], 3).boundaries();
        assert_eq!(b, vec![0.25, 0.25, 1.0]);
    }

    #[test]
    fn validate_rejects_bad_weights() {
        assert!(opts(vec![1.0], 2).validate().is_err());
        assert!(opts(vec![0.0, 0.0], 2).validate().is_err());
        assert!(opts(vec![-1.0, 2.0], 2).validate().is_err());
        assert!(opts(vec![], 0).validate().is_err());
    }
}
