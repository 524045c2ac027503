//! C ABI shared between the host and rate-controller plugins.
//!
//! A plugin exports [`TEMPO_CONTROLLER_ENTRY_SYMBOL`] with the signature [`TempoControllerEntry`].
//! The returned vtable must stay valid for as long as the library is loaded.
use std::ffi::c_void;

use tempo_model::RoundContext;

use crate::stats::StatsCollector;

/// ABI revision implemented by this host.
pub const TEMPO_CONTROLLER_ABI_VERSION: u32 = 1;

/// Name of the exported entry point.
pub const TEMPO_CONTROLLER_ENTRY_SYMBOL: &str = "tempo_rate_controller_entry";

/// Round parameters passed to `create`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TempoRoundInfo {
    pub worker_index: u32,
    pub round_index: u32,
    pub total_workers: u32,
    /// Round duration in milliseconds, 0 for count-bounded rounds.
    pub duration_ms: u64,
    /// Transaction count, 0 for duration-bounded rounds.
    pub tx_number: u64,
}

impl From<&RoundContext> for TempoRoundInfo {
    fn from(round: &RoundContext) -> Self {
        Self {
            worker_index: round.worker_index(),
            round_index: round.round_index(),
            total_workers: round.total_workers(),
            duration_ms: round.duration().map_or(0, |d| d.as_millis() as u64),
            tx_number: round.tx_number().unwrap_or(0),
        }
    }
}

/// Statistics snapshot passed to `next_delay_ms`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TempoStatsSnapshot {
    pub submitted: u64,
    pub finished: u64,
    pub failed: u64,
    pub elapsed_ms: u64,
}

impl TempoStatsSnapshot {
    pub fn capture(stats: &dyn StatsCollector) -> Self {
        Self {
            submitted: stats.submitted(),
            finished: stats.finished(),
            failed: stats.failed(),
            elapsed_ms: stats.elapsed().as_millis() as u64,
        }
    }
}

/// Function table exported by a plugin.
///
/// - `create` receives the UTF-8 JSON of the spec options and returns an opaque state pointer, or null to reject the options;
/// - `next_delay_ms` returns the delay before attempt `attempt` (zero-based);
/// - `destroy` releases the state returned by `create`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TempoControllerVTable {
    pub abi_version: u32,
    pub create: unsafe extern "C" fn(
        opts_json_utf8: *const u8,
        opts_len: usize,
        round: *const TempoRoundInfo,
    ) -> *mut c_void,
    pub next_delay_ms: unsafe extern "C" fn(
        state: *mut c_void,
        attempt: u64,
        stats: *const TempoStatsSnapshot,
    ) -> u64,
    pub destroy: unsafe extern "C" fn(state: *mut c_void),
}

/// Signature of the exported entry point.
pub type TempoControllerEntry = unsafe extern "C" fn() -> *const TempoControllerVTable;
