use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ModelError;

/// Serialization format of a recorded trace file.
/// - `Text`: one decimal integer per line.
/// - `Json`: a JSON array of integers.
/// - `BinBe`: 4-byte sample count followed by 4-byte samples, big-endian.
/// - `BinLe`: same layout as `BinBe`, little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceFormat {
    /// Newline-delimited decimal integers (default).
    Text,
    /// JSON array of integers.
    Json,
    /// Length-prefixed big-endian `u32` samples.
    BinBe,
    /// Length-prefixed little-endian `u32` samples.
    BinLe,
}

impl TraceFormat {
    /// Canonical configuration name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceFormat::Text => "TEXT",
            TraceFormat::Json => "JSON",
            TraceFormat::BinBe => "BIN_BE",
            TraceFormat::BinLe => "BIN_LE",
        }
    }
}

impl Default for TraceFormat {
    fn default() -> Self {
        Self::Text
    }
}

impl FromStr for TraceFormat {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_uppercase().replace('-', "_");
        match norm.as_str() {
            "TEXT" => Ok(Self::Text),
            "JSON" => Ok(Self::Json),
            "BIN_BE" => Ok(Self::BinBe),
            "BIN_LE" => Ok(Self::BinLe),
            _ => Err(ModelError::UnknownTraceFormat(s.to_string())),
        }
    }
}

impl fmt::Display for TraceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TraceFormat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TraceFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
