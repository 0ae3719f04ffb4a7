//! Constants and fallback values shared by the parsers, the builder and the
//! cost formulas.
//!
//! Every default the pipeline applies is declared here once so the parser
//! and the aggregator can never disagree about what "missing" means.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Replication factor assumed when the schema has no entry for a keyspace.
pub const DEFAULT_REPLICATION_FACTOR: u32 = 3;

/// A 30.4167 day month, in seconds.
pub const SECONDS_PER_MONTH: f64 = (365.0 / 12.0) * (24.0 * 60.0 * 60.0);

pub const HOURS_PER_MONTH: f64 = (365.0 / 12.0) * 24.0;

pub const GIGABYTE: f64 = 1_000_000_000.0;

/// Bytes covered by one write (and one TTL delete) request unit.
pub const WRITE_UNIT_SIZE: f64 = 1024.0;

/// Bytes covered by one read request unit.
pub const READ_UNIT_SIZE: f64 = 4096.0;

pub const DEFAULT_TARGET_UTILIZATION: f64 = 0.70;

/// Row size used when the sampler has nothing usable. Must stay a valid divisor.
pub const DEFAULT_ROW_SIZE_BYTES: u64 = 1;

pub const DEFAULT_COMPRESSION_RATIO: f64 = 1.0;

/// Replacement for any zero or invalid denominator.
pub const DIVISION_GUARD: f64 = 1.0;

pub static SYSTEM_KEYSPACES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "OpsCenter",
        "dse_insights_local",
        "solr_admin",
        "dse_system",
        "HiveMetaStore",
        "system_auth",
        "dse_analytics",
        "system_traces",
        "dse_audit",
        "system",
        "dse_system_local",
        "dsefs",
        "system_distributed",
        "system_schema",
        "dse_perf",
        "dse_insights",
        "system_backups",
        "dse_security",
        "dse_leases",
        "system_distributed_everywhere",
        "reaper_db",
    ]
    .into_iter()
    .collect()
});

pub fn is_system_keyspace(name: &str) -> bool {
    SYSTEM_KEYSPACES.contains(name)
}

/// Returns `value` when it is a usable positive divisor, otherwise [`DIVISION_GUARD`].
pub fn guard_divisor(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        DIVISION_GUARD
    }
}

/// Coerces NaN and infinities to zero before accumulation.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
