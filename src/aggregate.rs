//! Keyspace Aggregator
//!
//! Reduces the table-level entries of a [`LocalAggregateSet`] to one
//! [`KeyspaceAggregate`] per user keyspace for a single datacenter.
//!
//! Each table's sums are first divided by its own `sample_count`, giving
//! a per-node average, then summed across the keyspace. The per-node
//! figures are scaled to the datacenter by `node_count`:
//!
//! - storage: `× n`, and `/ rf` for the single-replica size
//! - writes and TTL deletes: `× n / rf`
//! - reads: `× n / max(rf - 1, 1)`
//!
//! The read divisor is one replica smaller than the write divisor. This
//! matches how the source workbook models reads and is kept as is.

use crate::defaults::{guard_divisor, GIGABYTE, SECONDS_PER_MONTH};
use crate::models::*;
use std::collections::BTreeMap;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct KeyspaceTotals {
    live_bytes: f64,
    uncompressed_bytes: f64,
    write_row_bytes: f64,
    read_row_bytes: f64,
    writes_monthly: f64,
    reads_monthly: f64,
    ttl_writes_monthly: f64,
}

impl KeyspaceTotals {
    fn add_table(&mut self, table: &TableAggregate) {
        let samples = guard_divisor(table.sample_count as f64);
        let row_size = table.avg_row_size_bytes as f64;
        let writes = table.writes_monthly / samples;
        let reads = table.reads_monthly / samples;

        self.live_bytes += table.total_compressed_bytes / samples;
        self.uncompressed_bytes += table.total_uncompressed_bytes / samples;
        self.write_row_bytes += (table.writes_monthly * row_size) / samples;
        self.read_row_bytes += (table.reads_monthly * row_size) / samples;
        self.writes_monthly += writes;
        self.reads_monthly += reads;
        if table.has_ttl {
            self.ttl_writes_monthly += writes;
        }
    }
}

/// Aggregates every non-system keyspace that is replicated to `datacenter`.
pub fn aggregate_keyspace(
    local_set: &LocalAggregateSet,
    datacenter: &str,
) -> BTreeMap<String, KeyspaceAggregate> {
    let mut aggregates = BTreeMap::new();

    for (name, keyspace) in &local_set.keyspaces {
        if keyspace.keyspace_type == KeyspaceType::System {
            continue;
        }
        let Some(dc) = keyspace.datacenters.get(datacenter) else {
            trace!(keyspace = %name, datacenter = %datacenter, "No data for datacenter");
            continue;
        };

        let mut totals = KeyspaceTotals::default();
        for table in dc.tables.values() {
            totals.add_table(table);
        }

        let nodes = dc.node_count as f64;
        let rf = guard_divisor(dc.replication_factor as f64);
        let read_replicas = guard_divisor(rf - 1.0);

        let aggregate = KeyspaceAggregate {
            name: name.clone(),
            keyspace_type: keyspace.keyspace_type,
            replication_factor: dc.replication_factor,
            total_live_space_gb: (totals.live_bytes * nodes) / GIGABYTE,
            uncompressed_single_replica_gb: (totals.uncompressed_bytes * nodes) / rf / GIGABYTE,
            avg_write_row_size_bytes: totals.write_row_bytes / guard_divisor(totals.writes_monthly),
            avg_read_row_size_bytes: totals.read_row_bytes / guard_divisor(totals.reads_monthly),
            writes_per_second: (totals.writes_monthly / SECONDS_PER_MONTH) * (nodes / rf),
            reads_per_second: (totals.reads_monthly / SECONDS_PER_MONTH) * (nodes / read_replicas),
            ttl_deletes_per_second: (totals.ttl_writes_monthly / SECONDS_PER_MONTH) * (nodes / rf),
        };

        debug!(
            keyspace = %name,
            datacenter = %datacenter,
            writes_per_second = aggregate.writes_per_second,
            reads_per_second = aggregate.reads_per_second,
            storage_gb = aggregate.uncompressed_single_replica_gb,
            "Aggregated keyspace"
        );
        aggregates.insert(name.clone(), aggregate);
    }

    aggregates
}
