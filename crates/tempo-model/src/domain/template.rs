use std::{convert::TryFrom, fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    RoundIndex, WorkerIndex,
    domain::{CLIENT_PLACEHOLDER, ROUND_PLACEHOLDER},
    error::ModelError,
};

/// File path template for per-worker, per-round trace files.
///
/// The template must contain both [`CLIENT_PLACEHOLDER`] (`<C>`) and
/// [`ROUND_PLACEHOLDER`] (`<R>`), so every `(worker, round)` pair maps to its
/// own file and concurrent workers never write to the same path.
///
/// # Examples
/// ```
/// use tempo_model::PathTemplate;
///
/// let tpl: PathTemplate = "records/client<C>_round<R>.txt".parse().unwrap();
/// assert_eq!(
///     tpl.resolve(3, 1).to_str(),
///     Some("records/client3_round1.txt"),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
#[serde(into = "String")]
pub struct PathTemplate(String);

impl PathTemplate {
    /// Creates a validated template from a string-like value.
    pub fn new(s: impl Into<String>) -> Result<Self, ModelError> {
        Self::try_from(s.into())
    }

    /// Returns the raw template string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitutes every placeholder occurrence with the given indices.
    pub fn resolve(&self, worker: WorkerIndex, round: RoundIndex) -> PathBuf {
        let resolved = self
            .0
            .replace(CLIENT_PLACEHOLDER, &worker.to_string())
            .replace(ROUND_PLACEHOLDER, &round.to_string());
        PathBuf::from(resolved)
    }
}

impl FromStr for PathTemplate {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for PathTemplate {
    type Error = ModelError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| ModelError::InvalidTemplate {
            template: s.clone(),
            reason: reason.to_string(),
        };

        if s.trim().is_empty() {
            return Err(invalid("template is empty"));
        }
        if !s.contains(CLIENT_PLACEHOLDER) {
            return Err(invalid("missing worker placeholder <C>"));
        }
        if !s.contains(ROUND_PLACEHOLDER) {
            return Err(invalid("missing round placeholder <R>"));
        }
        Ok(PathTemplate(s))
    }
}

impl From<PathTemplate> for String {
    fn from(t: PathTemplate) -> Self {
        t.0
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
