//! Byte-level trace encodings.
//!
//! - TEXT: one decimal sample per line, every line newline-terminated.
//! - JSON: a single array of integers.
//! - BIN_BE / BIN_LE: `u32` sample count followed by one `u32` per sample.
use std::path::Path;

use tempo_model::{Sample, TraceFormat};

use crate::error::TraceError;

const WORD: usize = size_of::<u32>();

pub(crate) fn encode(
    path: &Path,
    samples: &[Sample],
    format: TraceFormat,
) -> Result<Vec<u8>, TraceError> {
    let fail = |reason: String| TraceError::Encode {
        path: path.to_path_buf(),
        format,
        reason,
    };

    match format {
        TraceFormat::Text => {
            let mut out = String::with_capacity(samples.len() * 4);
            for sample in samples {
                out.push_str(&sample.to_string());
                out.push('\n');
            }
            Ok(out.into_bytes())
        }
        TraceFormat::Json => serde_json::to_vec(samples).map_err(|e| fail(e.to_string())),
        TraceFormat::BinBe | TraceFormat::BinLe => {
            let count = u32::try_from(samples.len())
                .map_err(|_| fail(format!("{} samples exceed the u32 count", samples.len())))?;
            let word = |v: u32| match format {
                TraceFormat::BinBe => v.to_be_bytes(),
                _ => v.to_le_bytes(),
            };

            let mut out = Vec::with_capacity(WORD * (samples.len() + 1));
            out.extend_from_slice(&word(count));
            for (idx, sample) in samples.iter().enumerate() {
                let v = u32::try_from(*sample)
                    .map_err(|_| fail(format!("sample {idx} ({sample}) exceeds u32")))?;
                out.extend_from_slice(&word(v));
            }
            Ok(out)
        }
    }
}

pub(crate) fn decode(
    path: &Path,
    bytes: &[u8],
    format: TraceFormat,
) -> Result<Vec<Sample>, TraceError> {
    let fail = |reason: String| TraceError::Format {
        path: path.to_path_buf(),
        format,
        reason,
    };

    match format {
        TraceFormat::Text => {
            let text = std::str::from_utf8(bytes).map_err(|e| fail(e.to_string()))?;
            let body = text.strip_suffix('\n').unwrap_or(text);
            if body.is_empty() {
                return Ok(Vec::new());
            }
            body.split('\n')
                .enumerate()
                .map(|(idx, line)| {
                    let line = line.strip_suffix('\r').unwrap_or(line);
                    let invalid = || {
                        fail(format!(
                            "line {}: expected a non-negative integer, got {line:?}",
                            idx + 1
                        ))
                    };
                    if line.is_empty() || !line.bytes().all(|b| b.is_ascii_digit()) {
                        return Err(invalid());
                    }
                    line.parse::<Sample>().map_err(|_| invalid())
                })
                .collect()
        }
        TraceFormat::Json => serde_json::from_slice(bytes).map_err(|e| fail(e.to_string())),
        TraceFormat::BinBe | TraceFormat::BinLe => {
            let word = |chunk: &[u8]| {
                let mut buf = [0u8; WORD];
                buf.copy_from_slice(chunk);
                match format {
                    TraceFormat::BinBe => u32::from_be_bytes(buf),
                    _ => u32::from_le_bytes(buf),
                }
            };

            if bytes.len() < WORD {
                return Err(fail(format!("{} bytes, too short for the header", bytes.len())));
            }
            let (head, body) = bytes.split_at(WORD);
            let count = word(head) as usize;
            if body.len() != count * WORD {
                return Err(fail(format!(
                    "header announces {count} samples, payload holds {} bytes",
                    body.len()
                )));
            }
            Ok(body.chunks_exact(WORD).map(|c| Sample::from(word(c))).collect())
        }
    }
}
