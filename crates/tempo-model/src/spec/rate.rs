use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::{ModelError, ModelResult};

/// Declarative rate-control policy: a type name plus free-form options.
///
/// The type name is resolved by the controller registry; the options are only
/// interpreted by the controller that claims the name. Options may themselves
/// embed further `RateControlSpec` values (e.g. `record-rate` or `composite-rate`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateControlSpec {
    /// Policy name such as `fixed-rate` or `record-rate`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Controller-specific options. Absent options deserialize to an empty map.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub opts: Map<String, Value>,
}

impl RateControlSpec {
    /// Spec with no options.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            opts: Map::new(),
        }
    }

    /// Builder-style helper to attach one option.
    ///
    /// ```rust
    /// # use tempo_model::RateControlSpec;
    /// let spec = RateControlSpec::new("fixed-rate").with_opt("tps", 50);
    /// assert_eq!(spec.opts["tps"], 50);
    /// ```
    pub fn with_opt(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.opts.insert(key.into(), value.into());
        self
    }

    /// Deserialize the options into a typed structure.
    ///
    /// Called by the controller factory that owns `kind`; unknown keys are ignored.
    pub fn parse_opts<T: DeserializeOwned>(&self) -> ModelResult<T> {
        serde_json::from_value(Value::Object(self.opts.clone()))
            .map_err(|e| ModelError::Invalid(format!("{}: {e}", self.kind)))
    }
}
