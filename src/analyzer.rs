//! Estimate Analysis Engine
//!
//! [`EstimateAnalyzer`] orchestrates the whole pipeline for one request:
//!
//! 1. **Discovery**: reads the cluster status and node samples from disk
//! 2. **Local set**: folds every node sample into per-table accumulators
//! 3. **Aggregation**: reduces tables to keyspaces, once per datacenter
//!    (in parallel with the `parallel` feature)
//! 4. **Pricing**: projects monthly costs in each datacenter's mapped region
//!
//! Each run executes inside an `estimate_run` span tagged with a fresh run id.
//!
//! ```no_run
//! use keyspaces_estimator::{parse_region_mappings, CostOptions, EstimateAnalyzer, PricingCatalog};
//!
//! # fn example() -> keyspaces_estimator::Result<()> {
//! let analyzer = EstimateAnalyzer::new(PricingCatalog::fallback());
//! let regions = parse_region_mappings(&["dc1=US East (N. Virginia)".to_string()])?;
//! let report = analyzer.estimate("samples/".as_ref(), &regions, None, &CostOptions::default())?;
//! println!("{:.2}", report.pricing.total_monthly_on_demand_cost);
//! # Ok(())
//! # }
//! ```

use crate::aggregate::aggregate_keyspace;
use crate::error::{EstimateError, Result};
use crate::file_discovery::SampleDiscovery;
use crate::local_set::{build_local_aggregate_set, build_local_aggregate_set_for_keyspace};
use crate::logging::run_span;
use crate::models::*;
use crate::pricing::{calculate_pricing_estimate, PricingCatalog};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Datacenter and keyspace name used for hand-entered workloads
pub const MANUAL_WORKLOAD_NAME: &str = "manual";

/// Everything an estimate run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateReport {
    pub datacenters: Vec<String>,
    pub regions: BTreeMap<String, String>,
    pub aggregates: BTreeMap<String, BTreeMap<String, KeyspaceAggregate>>,
    pub pricing: PricingEstimate,
}

pub struct EstimateAnalyzer {
    catalog: PricingCatalog,
}

impl Default for EstimateAnalyzer {
    fn default() -> Self {
        Self::new(PricingCatalog::fallback())
    }
}

impl EstimateAnalyzer {
    pub fn new(catalog: PricingCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PricingCatalog {
        &self.catalog
    }

    /// Discovers samples under `samples_dir` and prices them
    pub fn estimate(
        &self,
        samples_dir: &Path,
        regions: &BTreeMap<String, String>,
        keyspace: Option<&str>,
        options: &CostOptions,
    ) -> Result<EstimateReport> {
        self.estimate_with_node_counts(samples_dir, &ClusterTopology::new(), regions, keyspace, options)
    }

    /// Same as [`EstimateAnalyzer::estimate`], with `node_counts` replacing
    /// or supplying the status dump's datacenter sizes
    pub fn estimate_with_node_counts(
        &self,
        samples_dir: &Path,
        node_counts: &ClusterTopology,
        regions: &BTreeMap<String, String>,
        keyspace: Option<&str>,
        options: &CostOptions,
    ) -> Result<EstimateReport> {
        let span = run_span("estimate");
        let _enter = span.enter();

        let (topology, samples) = SampleDiscovery::new(samples_dir)
            .with_node_counts(node_counts.clone())
            .load()?;
        self.estimate_samples(&topology, &samples, regions, keyspace, options)
    }

    /// Prices already-parsed samples
    pub fn estimate_samples(
        &self,
        topology: &ClusterTopology,
        samples: &Samples,
        regions: &BTreeMap<String, String>,
        keyspace: Option<&str>,
        options: &CostOptions,
    ) -> Result<EstimateReport> {
        let local_set = match keyspace {
            Some(name) => build_local_aggregate_set_for_keyspace(samples, topology, name)?,
            None => build_local_aggregate_set(samples, topology)?,
        };
        if let Some(name) = keyspace {
            if local_set.keyspaces.is_empty() {
                warn!(keyspace = %name, "Keyspace not found in any node sample");
            }
        }

        let datacenters = topology.names();
        for datacenter in regions.keys() {
            if topology.node_count(datacenter).is_none() {
                warn!(datacenter = %datacenter, "Region mapped for a datacenter not in the cluster status");
            }
        }

        let aggregates = aggregate_datacenters(&local_set, &datacenters);
        let pricing = calculate_pricing_estimate(&datacenters, regions, &self.catalog, &aggregates, options)?;

        info!(
            datacenters = datacenters.len(),
            priced = pricing.per_datacenter_cost.len(),
            provisioned = pricing.total_monthly_provisioned_cost,
            on_demand = pricing.total_monthly_on_demand_cost,
            "Estimate complete"
        );

        Ok(EstimateReport {
            datacenters,
            regions: regions.clone(),
            aggregates,
            pricing,
        })
    }

    /// Prices a hand-entered workload in a single region
    pub fn quote(&self, region: &str, workload: &ManualWorkload, options: &CostOptions) -> Result<PricingEstimate> {
        let span = run_span("quote");
        let _enter = span.enter();

        if self.catalog.get(region).is_none() {
            return Err(EstimateError::UnknownRegion(region.to_string()));
        }

        let datacenter = MANUAL_WORKLOAD_NAME.to_string();
        let mut keyspaces = BTreeMap::new();
        keyspaces.insert(
            MANUAL_WORKLOAD_NAME.to_string(),
            KeyspaceAggregate::from_manual_inputs(MANUAL_WORKLOAD_NAME, workload),
        );
        let estimates = BTreeMap::from([(datacenter.clone(), keyspaces)]);
        let regions = BTreeMap::from([(datacenter.clone(), region.to_string())]);

        calculate_pricing_estimate(&[datacenter], &regions, &self.catalog, &estimates, options)
    }
}

#[cfg(feature = "parallel")]
fn aggregate_datacenters(
    local_set: &LocalAggregateSet,
    datacenters: &[String],
) -> BTreeMap<String, BTreeMap<String, KeyspaceAggregate>> {
    datacenters
        .par_iter()
        .map(|dc| (dc.clone(), aggregate_keyspace(local_set, dc)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn aggregate_datacenters(
    local_set: &LocalAggregateSet,
    datacenters: &[String],
) -> BTreeMap<String, BTreeMap<String, KeyspaceAggregate>> {
    datacenters
        .iter()
        .map(|dc| (dc.clone(), aggregate_keyspace(local_set, dc)))
        .collect()
}

/// Parses `<datacenter>=<region>` pairs; the region may contain spaces
pub fn parse_region_mappings(mappings: &[String]) -> Result<BTreeMap<String, String>> {
    let mut regions = BTreeMap::new();
    for mapping in mappings {
        let (datacenter, region) = mapping
            .split_once('=')
            .map(|(dc, region)| (dc.trim(), region.trim()))
            .filter(|(dc, region)| !dc.is_empty() && !region.is_empty())
            .ok_or_else(|| EstimateError::InvalidRegionMapping(mapping.clone()))?;
        regions.insert(datacenter.to_string(), region.to_string());
    }
    Ok(regions)
}

/// Parses `<datacenter>=<count>` pairs with a positive node count
pub fn parse_node_counts(counts: &[String]) -> Result<ClusterTopology> {
    let mut topology = ClusterTopology::new();
    for entry in counts {
        let (datacenter, count) = entry
            .split_once('=')
            .map(|(dc, count)| (dc.trim(), count.trim().parse::<usize>().ok()))
            .and_then(|(dc, count)| count.filter(|n| *n > 0 && !dc.is_empty()).map(|n| (dc, n)))
            .ok_or_else(|| EstimateError::InvalidNodeCount(entry.clone()))?;
        topology.insert(datacenter, count);
    }
    Ok(topology)
}
