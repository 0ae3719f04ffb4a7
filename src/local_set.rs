//! Local Set Builder
//!
//! Merges the per-node parsed dumps into a [`LocalAggregateSet`]: one entry
//! per keyspace, per datacenter, per table, with byte totals and counters
//! normalized to a monthly basis.
//!
//! Node samples of the same table are summed here and `sample_count` is
//! incremented once per sample. The aggregator divides by `sample_count`,
//! which turns the sums into per-node averages.

use crate::defaults::{
    finite_or_zero, guard_divisor, DEFAULT_COMPRESSION_RATIO, DEFAULT_REPLICATION_FACTOR,
    DEFAULT_ROW_SIZE_BYTES, SECONDS_PER_MONTH,
};
use crate::error::{EstimateError, Result};
use crate::models::*;
use tracing::{debug, warn};

/// Builds the local aggregate set for every keyspace in the samples.
pub fn build_local_aggregate_set(
    samples: &Samples,
    topology: &ClusterTopology,
) -> Result<LocalAggregateSet> {
    build(samples, topology, None)
}

/// Same as [`build_local_aggregate_set`], restricted to a single keyspace.
pub fn build_local_aggregate_set_for_keyspace(
    samples: &Samples,
    topology: &ClusterTopology,
    keyspace: &str,
) -> Result<LocalAggregateSet> {
    build(samples, topology, Some(keyspace))
}

fn build(
    samples: &Samples,
    topology: &ClusterTopology,
    only_keyspace: Option<&str>,
) -> Result<LocalAggregateSet> {
    let mut result = LocalAggregateSet::default();

    for (dc_name, nodes) in samples {
        let node_count = topology
            .node_count(dc_name)
            .ok_or_else(|| EstimateError::UnknownDatacenter(dc_name.clone()))?;

        for (node_id, sample) in nodes {
            let uptime_seconds = node_uptime(dc_name, node_id, &sample.info);

            for (keyspace_name, tables) in &sample.tablestats {
                if only_keyspace.is_some_and(|only| only != keyspace_name) {
                    continue;
                }

                let keyspace_schema = sample.schema.get(keyspace_name);
                let replication_factor = match keyspace_schema {
                    Some(schema) => match schema.replication_factor(dc_name) {
                        Some(rf) => rf,
                        None => {
                            debug!(
                                keyspace = %keyspace_name,
                                datacenter = %dc_name,
                                "Keyspace not replicated to datacenter, skipping"
                            );
                            continue;
                        }
                    },
                    None => DEFAULT_REPLICATION_FACTOR,
                };

                let keyspace = result
                    .keyspaces
                    .entry(keyspace_name.clone())
                    .or_insert_with(|| LocalKeyspace {
                        keyspace_type: KeyspaceType::classify(keyspace_name),
                        datacenters: Default::default(),
                    });

                let datacenter = keyspace
                    .datacenters
                    .entry(dc_name.clone())
                    .or_insert_with(|| LocalDatacenter {
                        node_count,
                        replication_factor,
                        tables: Default::default(),
                    });

                for (table_name, stat) in tables {
                    let table = datacenter
                        .tables
                        .entry(table_name.clone())
                        .or_insert_with(|| {
                            let fqtn = format!("{}.{}", keyspace_name, table_name);
                            match sample.row_sizes.get(&fqtn) {
                                Some(row_size) => {
                                    TableAggregate::new(row_size.average_bytes(), row_size.has_ttl())
                                }
                                None => TableAggregate::new(DEFAULT_ROW_SIZE_BYTES, false),
                            }
                        });

                    accumulate(table, stat, uptime_seconds);
                }
            }
        }
    }

    Ok(result)
}

fn node_uptime(dc_name: &str, node_id: &str, info: &NodeInfo) -> f64 {
    let uptime = guard_divisor(info.uptime_seconds);
    if uptime != info.uptime_seconds {
        warn!(
            datacenter = %dc_name,
            node = %node_id,
            uptime_seconds = info.uptime_seconds,
            "Node uptime missing or invalid, treating as 1 second"
        );
    }
    uptime
}

fn accumulate(table: &mut TableAggregate, stat: &TableStat, uptime_seconds: f64) {
    let space_used = finite_or_zero(stat.space_used).max(0.0);
    let read_count = finite_or_zero(stat.read_count).max(0.0);
    let write_count = finite_or_zero(stat.write_count).max(0.0);
    let ratio = if space_used > 0.0 {
        guard_divisor(stat.compression_ratio)
    } else {
        DEFAULT_COMPRESSION_RATIO
    };

    table.total_compressed_bytes += space_used;
    table.total_uncompressed_bytes += uncompressed_bytes(space_used, ratio);
    table.writes_monthly += operations_per_month(write_count, uptime_seconds);
    table.reads_monthly += operations_per_month(read_count, uptime_seconds);
    table.sample_count += 1;
}

pub fn uncompressed_bytes(compressed_bytes: f64, compression_ratio: f64) -> f64 {
    compressed_bytes / compression_ratio
}

/// Linear extrapolation of a cumulative counter to one month.
pub fn operations_per_month(count: f64, uptime_seconds: f64) -> f64 {
    (count / uptime_seconds) * SECONDS_PER_MONTH
}
