//! Core Data Models
//!
//! This module defines the data structures that flow through the estimation
//! pipeline, from parsed operator-tool dumps to monthly cost breakdowns.
//!
//! ## Data Flow
//!
//! 1. **Parsed inputs**: [`ClusterTopology`], [`TableStat`], [`NodeInfo`],
//!    [`KeyspaceSchema`], [`RowSizeSample`] - one set per sampled node
//! 2. **Local set**: [`LocalAggregateSet`] - per keyspace, per datacenter,
//!    per table monthly accumulators
//! 3. **Aggregates**: [`KeyspaceAggregate`] - per keyspace storage and
//!    request rates for one datacenter
//! 4. **Costs**: [`CostBreakdown`], [`DatacenterCost`], [`PricingEstimate`]
//!
//! Every keyed collection is a `BTreeMap` so two runs over the same input
//! compare equal and serialize identically.

use crate::defaults::{self, DEFAULT_ROW_SIZE_BYTES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Parsed inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatacenterNodes {
    pub name: String,
    pub node_count: usize,
}

/// Datacenter name to node count, in the order the status dump listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterTopology {
    datacenters: Vec<DatacenterNodes>,
}

impl ClusterTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node count for a datacenter, keeping its original position
    /// when it was already present.
    pub fn insert(&mut self, name: impl Into<String>, node_count: usize) {
        let name = name.into();
        match self.datacenters.iter_mut().find(|dc| dc.name == name) {
            Some(existing) => existing.node_count = node_count,
            None => self.datacenters.push(DatacenterNodes { name, node_count }),
        }
    }

    pub fn node_count(&self, datacenter: &str) -> Option<usize> {
        self.datacenters
            .iter()
            .find(|dc| dc.name == datacenter)
            .map(|dc| dc.node_count)
    }

    pub fn datacenters(&self) -> impl Iterator<Item = &DatacenterNodes> {
        self.datacenters.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.datacenters.iter().map(|dc| dc.name.clone()).collect()
    }

    pub fn total_nodes(&self) -> usize {
        self.datacenters.iter().map(|dc| dc.node_count).sum()
    }

    pub fn len(&self) -> usize {
        self.datacenters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datacenters.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for ClusterTopology {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        let mut topology = ClusterTopology::new();
        for (name, count) in iter {
            topology.insert(name, count);
        }
        topology
    }
}

/// Cumulative per-node counters for one table, since node start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableStat {
    pub space_used: f64,
    pub compression_ratio: f64,
    pub read_count: f64,
    pub write_count: f64,
}

/// keyspace -> table -> stats
pub type TableStatsData = BTreeMap<String, BTreeMap<String, TableStat>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Zero when the dump had no uptime line; the builder guards it.
    pub uptime_seconds: f64,
    pub datacenter: String,
    pub node_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyspaceSchema {
    pub class: String,
    pub datacenters: BTreeMap<String, u32>,
    pub tables: Vec<String>,
}

impl KeyspaceSchema {
    /// Replication factor for a datacenter, `None` when the keyspace is not
    /// replicated there (absent or zero).
    pub fn replication_factor(&self, datacenter: &str) -> Option<u32> {
        self.datacenters
            .get(datacenter)
            .copied()
            .filter(|rf| *rf > 0)
    }
}

pub type SchemaInfo = BTreeMap<String, KeyspaceSchema>;

/// One line of the row-size sampler report, values kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowSizeSample {
    pub fields: BTreeMap<String, String>,
}

impl RowSizeSample {
    /// Leading integer of the `average` field; non-positive or non-numeric
    /// values fall back to [`DEFAULT_ROW_SIZE_BYTES`].
    pub fn average_bytes(&self) -> u64 {
        let Some(raw) = self.fields.get("average") else {
            return DEFAULT_ROW_SIZE_BYTES;
        };
        match leading_integer(raw) {
            Some(bytes) if bytes > 0 => bytes as u64,
            _ => DEFAULT_ROW_SIZE_BYTES,
        }
    }

    /// The sampler reports `default-ttl: n` when rows carry explicit TTLs.
    pub fn has_ttl(&self) -> bool {
        self.fields
            .get("default-ttl")
            .map(|v| v.trim() == "n")
            .unwrap_or(false)
    }
}

/// Optional sign followed by the leading run of digits, ignoring whatever
/// trails it (`"12abc"` is 12, `"849.7"` is 849).
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value = rest[..digits_end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

/// "keyspace.table" -> sample
pub type RowSizeData = BTreeMap<String, RowSizeSample>;

/// Everything parsed from one physically sampled node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSample {
    pub tablestats: TableStatsData,
    pub schema: SchemaInfo,
    pub info: NodeInfo,
    pub row_sizes: RowSizeData,
}

/// datacenter -> node id -> sample
pub type Samples = BTreeMap<String, BTreeMap<String, NodeSample>>;

// ---------------------------------------------------------------------------
// Local aggregate set
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyspaceType {
    System,
    User,
}

impl KeyspaceType {
    pub fn classify(keyspace: &str) -> Self {
        if defaults::is_system_keyspace(keyspace) {
            KeyspaceType::System
        } else {
            KeyspaceType::User
        }
    }
}

impl fmt::Display for KeyspaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyspaceType::System => write!(f, "system"),
            KeyspaceType::User => write!(f, "user"),
        }
    }
}

/// Accumulators for one table in one datacenter. Every summed quantity must
/// be divided by `sample_count` before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableAggregate {
    pub total_compressed_bytes: f64,
    pub total_uncompressed_bytes: f64,
    pub avg_row_size_bytes: u64,
    pub writes_monthly: f64,
    pub reads_monthly: f64,
    pub has_ttl: bool,
    pub sample_count: u32,
}

impl TableAggregate {
    pub fn new(avg_row_size_bytes: u64, has_ttl: bool) -> Self {
        Self {
            total_compressed_bytes: 0.0,
            total_uncompressed_bytes: 0.0,
            avg_row_size_bytes,
            writes_monthly: 0.0,
            reads_monthly: 0.0,
            has_ttl,
            sample_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalDatacenter {
    pub node_count: usize,
    pub replication_factor: u32,
    pub tables: BTreeMap<String, TableAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalKeyspace {
    #[serde(rename = "type")]
    pub keyspace_type: KeyspaceType,
    pub datacenters: BTreeMap<String, LocalDatacenter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalAggregateSet {
    pub keyspaces: BTreeMap<String, LocalKeyspace>,
}

// ---------------------------------------------------------------------------
// Keyspace aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyspaceAggregate {
    pub name: String,
    #[serde(rename = "type")]
    pub keyspace_type: KeyspaceType,
    pub replication_factor: u32,
    pub total_live_space_gb: f64,
    pub uncompressed_single_replica_gb: f64,
    pub avg_write_row_size_bytes: f64,
    pub avg_read_row_size_bytes: f64,
    pub writes_per_second: f64,
    pub reads_per_second: f64,
    pub ttl_deletes_per_second: f64,
}

impl KeyspaceAggregate {
    /// Builds an aggregate from directly entered workload figures, for
    /// quoting a workload that has no cluster dumps behind it.
    pub fn from_manual_inputs(name: impl Into<String>, inputs: &ManualWorkload) -> Self {
        let row_size = inputs.avg_row_size_bytes.max(0.0);
        Self {
            name: name.into(),
            keyspace_type: KeyspaceType::User,
            replication_factor: defaults::DEFAULT_REPLICATION_FACTOR,
            total_live_space_gb: inputs.storage_gb.max(0.0),
            uncompressed_single_replica_gb: inputs.storage_gb.max(0.0),
            avg_write_row_size_bytes: row_size,
            avg_read_row_size_bytes: row_size,
            writes_per_second: inputs.writes_per_second.max(0.0),
            reads_per_second: inputs.reads_per_second.max(0.0),
            ttl_deletes_per_second: inputs.ttl_deletes_per_second.max(0.0),
        }
    }
}

/// Workload figures entered by hand instead of parsed from a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualWorkload {
    pub reads_per_second: f64,
    pub writes_per_second: f64,
    pub ttl_deletes_per_second: f64,
    pub avg_row_size_bytes: f64,
    pub storage_gb: f64,
}

impl Default for ManualWorkload {
    fn default() -> Self {
        Self {
            reads_per_second: 0.0,
            writes_per_second: 0.0,
            ttl_deletes_per_second: 0.0,
            avg_row_size_bytes: 1024.0,
            storage_gb: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Per-region price primitives, in USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionRateTable {
    /// Per on-demand read request unit
    #[serde(rename = "readRequestPrice")]
    pub read_request_price: f64,
    /// Per on-demand write request unit
    #[serde(rename = "writeRequestPrice")]
    pub write_request_price: f64,
    /// Per provisioned write capacity unit-hour
    #[serde(rename = "writeRequestPricePerHour")]
    pub write_request_price_per_hour: f64,
    /// Per provisioned read capacity unit-hour
    #[serde(rename = "readRequestPricePerHour")]
    pub read_request_price_per_hour: f64,
    #[serde(rename = "storagePricePerGB")]
    pub storage_price_per_gb: f64,
    #[serde(rename = "pitrPricePerGB")]
    pub pitr_price_per_gb: f64,
    /// Per TTL delete unit
    #[serde(rename = "ttlDeletesPrice")]
    pub ttl_deletes_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadConsistency {
    /// LOCAL_QUORUM reads, full price
    #[default]
    Strong,
    /// LOCAL_ONE reads, half price
    Eventual,
}

impl ReadConsistency {
    pub fn read_cost_multiplier(&self) -> f64 {
        match self {
            ReadConsistency::Strong => 1.0,
            ReadConsistency::Eventual => 0.5,
        }
    }
}

impl FromStr for ReadConsistency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strong" => Ok(ReadConsistency::Strong),
            "eventual" => Ok(ReadConsistency::Eventual),
            other => Err(format!(
                "unknown read consistency '{}', expected 'strong' or 'eventual'",
                other
            )),
        }
    }
}

impl fmt::Display for ReadConsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadConsistency::Strong => write!(f, "strong"),
            ReadConsistency::Eventual => write!(f, "eventual"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostOptions {
    pub point_in_time_recovery: bool,
    pub read_target_utilization: f64,
    pub write_target_utilization: f64,
    pub read_consistency: ReadConsistency,
}

impl Default for CostOptions {
    fn default() -> Self {
        Self {
            point_in_time_recovery: true,
            read_target_utilization: defaults::DEFAULT_TARGET_UTILIZATION,
            write_target_utilization: defaults::DEFAULT_TARGET_UTILIZATION,
            read_consistency: ReadConsistency::Strong,
        }
    }
}

/// Monthly USD costs for one keyspace, or a datacenter's totals row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub name: String,
    pub storage: f64,
    pub backup: f64,
    pub reads_provisioned: f64,
    pub writes_provisioned: f64,
    pub reads_on_demand: f64,
    pub writes_on_demand: f64,
    pub ttl_deletes: f64,
    pub provisioned_total: f64,
    pub on_demand_total: f64,
}

impl CostBreakdown {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn accumulate(&mut self, other: &CostBreakdown) {
        self.storage += other.storage;
        self.backup += other.backup;
        self.reads_provisioned += other.reads_provisioned;
        self.writes_provisioned += other.writes_provisioned;
        self.reads_on_demand += other.reads_on_demand;
        self.writes_on_demand += other.writes_on_demand;
        self.ttl_deletes += other.ttl_deletes;
        self.provisioned_total += other.provisioned_total;
        self.on_demand_total += other.on_demand_total;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatacenterCost {
    pub region: String,
    pub keyspace_costs: BTreeMap<String, CostBreakdown>,
    pub totals: CostBreakdown,
    pub total_datacenter_provisioned_cost: f64,
    pub total_datacenter_on_demand_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingEstimate {
    pub per_datacenter_cost: BTreeMap<String, DatacenterCost>,
    pub total_monthly_provisioned_cost: f64,
    pub total_monthly_on_demand_cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(fields: &[(&str, &str)]) -> RowSizeSample {
        RowSizeSample {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_topology_keeps_insertion_order() {
        let topology: ClusterTopology = vec![("us-west", 2), ("eu-central", 5)].into_iter().collect();
        assert_eq!(topology.names(), vec!["us-west", "eu-central"]);
        assert_eq!(topology.node_count("eu-central"), Some(5));
        assert_eq!(topology.node_count("ap-south"), None);
        assert_eq!(topology.total_nodes(), 7);
    }

    #[test]
    fn test_topology_insert_replaces_count() {
        let mut topology = ClusterTopology::new();
        topology.insert("dc1", 3);
        topology.insert("dc2", 1);
        topology.insert("dc1", 4);
        assert_eq!(topology.len(), 2);
        assert_eq!(topology.names(), vec!["dc1", "dc2"]);
        assert_eq!(topology.node_count("dc1"), Some(4));
    }

    #[test]
    fn test_row_size_average_defaults() {
        assert_eq!(sample(&[("average", "849")]).average_bytes(), 849);
        assert_eq!(sample(&[("average", "849.7")]).average_bytes(), 849);
        assert_eq!(sample(&[("average", "0")]).average_bytes(), 1);
        assert_eq!(sample(&[("average", "-20")]).average_bytes(), 1);
        assert_eq!(sample(&[("average", "lots")]).average_bytes(), 1);
        assert_eq!(sample(&[]).average_bytes(), 1);
    }

    #[test]
    fn test_row_size_average_takes_leading_digits() {
        assert_eq!(sample(&[("average", "12abc")]).average_bytes(), 12);
        assert_eq!(sample(&[("average", " 512 bytes")]).average_bytes(), 512);
        assert_eq!(sample(&[("average", "+64")]).average_bytes(), 64);
        assert_eq!(sample(&[("average", "abc12")]).average_bytes(), 1);
        assert_eq!(sample(&[("average", "-")]).average_bytes(), 1);
    }

    #[test]
    fn test_row_size_ttl_flag() {
        assert!(sample(&[("default-ttl", "n")]).has_ttl());
        assert!(!sample(&[("default-ttl", "y")]).has_ttl());
        assert!(!sample(&[]).has_ttl());
    }

    #[test]
    fn test_schema_replication_factor_zero_is_absent() {
        let mut schema = KeyspaceSchema::default();
        schema.datacenters.insert("dc1".to_string(), 3);
        schema.datacenters.insert("dc2".to_string(), 0);
        assert_eq!(schema.replication_factor("dc1"), Some(3));
        assert_eq!(schema.replication_factor("dc2"), None);
        assert_eq!(schema.replication_factor("dc3"), None);
    }

    #[test]
    fn test_read_consistency_from_str() {
        assert_eq!("Strong".parse::<ReadConsistency>(), Ok(ReadConsistency::Strong));
        assert_eq!("eventual".parse::<ReadConsistency>(), Ok(ReadConsistency::Eventual));
        assert!("quorum".parse::<ReadConsistency>().is_err());
    }

    #[test]
    fn test_rate_table_field_names() {
        let rates = RegionRateTable {
            read_request_price: 0.1,
            write_request_price: 0.2,
            write_request_price_per_hour: 0.3,
            read_request_price_per_hour: 0.4,
            storage_price_per_gb: 0.5,
            pitr_price_per_gb: 0.6,
            ttl_deletes_price: 0.7,
        };
        let json = serde_json::to_value(rates).unwrap();
        assert_eq!(json["storagePricePerGB"], 0.5);
        assert_eq!(json["pitrPricePerGB"], 0.6);
        assert_eq!(json["ttlDeletesPrice"], 0.7);
    }

    #[test]
    fn test_cost_breakdown_accumulate() {
        let mut totals = CostBreakdown::named("region total");
        let row = CostBreakdown {
            name: "ks".to_string(),
            storage: 1.0,
            backup: 2.0,
            reads_provisioned: 3.0,
            writes_provisioned: 4.0,
            reads_on_demand: 5.0,
            writes_on_demand: 6.0,
            ttl_deletes: 7.0,
            provisioned_total: 17.0,
            on_demand_total: 21.0,
        };
        totals.accumulate(&row);
        totals.accumulate(&row);
        assert_eq!(totals.name, "region total");
        assert_eq!(totals.storage, 2.0);
        assert_eq!(totals.on_demand_total, 42.0);
    }
}
