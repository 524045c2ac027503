use serde::{Deserialize, Serialize};

use crate::{PathTemplate, TraceFormat, spec::RateControlSpec};

/// Options of `record-rate`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRateOpts {
    /// Controller whose pacing is observed and recorded.
    pub rate_controller: RateControlSpec,
    /// Destination of the exported trace.
    pub path_template: PathTemplate,
    /// Trace file format.
    #[serde(default)]
    pub output_format: TraceFormat,
    /// Export the trace when the round completes.
    #[serde(default)]
    pub log_end: bool,
}

/// Options of `replay-rate`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayRateOpts {
    /// Location of the previously recorded trace.
    pub path_template: PathTemplate,
    /// Trace file format.
    #[serde(default)]
    pub input_format: TraceFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_opts_from_round_message_shape() {
        let opts: RecordRateOpts = serde_json::from_value(json!({
            "rateController": { "type": "zero-rate" },
            "pathTemplate": "../tx_records_client<C>_round<R>.txt",
            "outputFormat": "TEXT",
            "logEnd": true
        }))
        .unwrap();

        assert_eq!(opts.rate_controller.kind, "zero-rate");
        assert_eq!(opts.output_format, TraceFormat::Text);
        assert!(opts.log_end);
    }

    #[test]
    fn record_opts_defaults() {
        let opts: RecordRateOpts = serde_json::from_value(json!({
            "rateController": { "type": "no-rate" },
            "pathTemplate": "c<C>r<R>"
        }))
        .unwrap();

        assert_eq!(opts.output_format, TraceFormat::Text);
        assert!(!opts.log_end);
    }

    #[test]
    fn replay_opts_reject_invalid_template() {
        let res = serde_json::from_value::<ReplayRateOpts>(json!({
            "pathTemplate": "trace.txt"
        }));
        assert!(res.is_err());
    }
}
