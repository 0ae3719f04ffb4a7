//! Monthly cost formulas for provisioned and on-demand capacity.
//!
//! All functions are pure. Per-second rates come from a
//! [`crate::models::KeyspaceAggregate`]; prices come from a
//! [`RegionRateTable`].

use crate::defaults::{
    guard_divisor, HOURS_PER_MONTH, READ_UNIT_SIZE, SECONDS_PER_MONTH, WRITE_UNIT_SIZE,
};
use crate::models::RegionRateTable;

// Units per operation

pub fn calculate_write_units_per_operation(avg_write_row_size_bytes: f64) -> f64 {
    (avg_write_row_size_bytes / WRITE_UNIT_SIZE).ceil()
}

pub fn calculate_read_units_per_operation(avg_read_row_size_bytes: f64) -> f64 {
    (avg_read_row_size_bytes / READ_UNIT_SIZE).ceil()
}

pub fn calculate_ttl_units_per_operation(avg_write_row_size_bytes: f64) -> f64 {
    (avg_write_row_size_bytes / WRITE_UNIT_SIZE).ceil()
}

// Monthly request units

pub fn calculate_read_units_per_month(reads_per_second: f64, avg_read_row_size_bytes: f64) -> f64 {
    reads_per_second * calculate_read_units_per_operation(avg_read_row_size_bytes) * SECONDS_PER_MONTH
}

pub fn calculate_write_units_per_month(writes_per_second: f64, avg_write_row_size_bytes: f64) -> f64 {
    writes_per_second * calculate_write_units_per_operation(avg_write_row_size_bytes) * SECONDS_PER_MONTH
}

pub fn calculate_ttl_units_per_month(ttls_per_second: f64, avg_write_row_size_bytes: f64) -> f64 {
    ttls_per_second * calculate_ttl_units_per_operation(avg_write_row_size_bytes) * SECONDS_PER_MONTH
}

// On-demand costs

pub fn calculate_on_demand_read_cost_per_month(
    reads_per_second: f64,
    avg_read_row_size_bytes: f64,
    rates: &RegionRateTable,
) -> f64 {
    calculate_read_units_per_month(reads_per_second, avg_read_row_size_bytes) * rates.read_request_price
}

pub fn calculate_on_demand_write_cost_per_month(
    writes_per_second: f64,
    avg_write_row_size_bytes: f64,
    rates: &RegionRateTable,
) -> f64 {
    calculate_write_units_per_month(writes_per_second, avg_write_row_size_bytes) * rates.write_request_price
}

pub fn calculate_ttl_cost_per_month(
    ttls_per_second: f64,
    avg_write_row_size_bytes: f64,
    rates: &RegionRateTable,
) -> f64 {
    calculate_ttl_units_per_month(ttls_per_second, avg_write_row_size_bytes) * rates.ttl_deletes_price
}

// Provisioned costs

/// Capacity sized so the average load sits at `target_utilization`.
pub fn calculate_provisioned_read_cost_per_month(
    reads_per_second: f64,
    avg_read_row_size_bytes: f64,
    rates: &RegionRateTable,
    target_utilization: f64,
) -> f64 {
    reads_per_second
        * calculate_read_units_per_operation(avg_read_row_size_bytes)
        * HOURS_PER_MONTH
        * rates.read_request_price_per_hour
        / guard_divisor(target_utilization)
}

pub fn calculate_provisioned_write_cost_per_month(
    writes_per_second: f64,
    avg_write_row_size_bytes: f64,
    rates: &RegionRateTable,
    target_utilization: f64,
) -> f64 {
    writes_per_second
        * calculate_write_units_per_operation(avg_write_row_size_bytes)
        * HOURS_PER_MONTH
        * rates.write_request_price_per_hour
        / guard_divisor(target_utilization)
}

// Storage

pub fn calculate_storage_cost_per_month(uncompressed_single_replica_gb: f64, rates: &RegionRateTable) -> f64 {
    uncompressed_single_replica_gb * rates.storage_price_per_gb
}

/// Point-in-time recovery storage is billed on the same size as the table.
pub fn calculate_backup_cost_per_month(uncompressed_single_replica_gb: f64, rates: &RegionRateTable) -> f64 {
    uncompressed_single_replica_gb * rates.pitr_price_per_gb
}
