//! Keyspaces Estimator Library
//!
//! Estimates the monthly cost of running an existing Apache Cassandra
//! cluster on Amazon Keyspaces, from the text dumps operators already
//! collect with `nodetool` and `cqlsh`.
//!
//! ## Core Features
//!
//! - **Dump parsing**: cluster status, table statistics, node info, schema
//!   DDL and row-size sampler output, tolerant of noisy input
//! - **Sample averaging**: several node samples of the same table are
//!   averaged, then scaled to the datacenter by node count and replication
//! - **Cost projection**: provisioned and on-demand monthly costs per
//!   keyspace, datacenter and cluster
//! - **Flexible output formats**: JSON and colored terminal reports
//!
//! ## Architecture Overview
//!
//! - [`parsers`] - One parser per dump kind
//! - [`local_set`] - Folds node samples into per-table monthly accumulators
//! - [`aggregate`] - Reduces tables to per-keyspace rates for one datacenter
//! - [`formulas`] - Pure request-unit and cost formulas
//! - [`pricing`] - Region rate catalog and the cost projector
//! - [`file_discovery`] - Loads a directory of collected dumps
//! - [`analyzer`] - Orchestrates the pipeline
//! - [`display`] - Terminal and JSON output
//! - [`config`] - Configuration management with environment variable support
//! - [`logging`] - Structured logging with JSON and pretty-print formats
//!
//! ## Main Entry Point
//!
//! ```no_run
//! use keyspaces_estimator::{parse_region_mappings, CostOptions, EstimateAnalyzer, PricingCatalog};
//!
//! # fn example() -> anyhow::Result<()> {
//! let analyzer = EstimateAnalyzer::new(PricingCatalog::fallback());
//! let regions = parse_region_mappings(&["dc1=US East (N. Virginia)".to_string()])?;
//! let report = analyzer.estimate("samples".as_ref(), &regions, None, &CostOptions::default())?;
//! for (dc, cost) in &report.pricing.per_datacenter_cost {
//!     println!("{dc}: ${:.2}/month on-demand", cost.total_datacenter_on_demand_cost);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod analyzer;
pub mod config;
pub mod defaults;
pub mod display;
pub mod error;
pub mod file_discovery;
pub mod formulas;
pub mod local_set;
pub mod logging;
pub mod models;
pub mod parsers;
pub mod pricing;

pub use aggregate::aggregate_keyspace;
pub use analyzer::{parse_node_counts, parse_region_mappings, EstimateAnalyzer, EstimateReport};
pub use error::{EstimateError, Result};
pub use file_discovery::SampleDiscovery;
pub use local_set::{build_local_aggregate_set, build_local_aggregate_set_for_keyspace};
pub use models::*;
pub use pricing::{calculate_pricing_estimate, PricingCatalog};
