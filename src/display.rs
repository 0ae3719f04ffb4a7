//! Output Formatting and Display Management
//!
//! Renders estimate results either as colored terminal tables or as
//! structured JSON for programmatic consumption.
//!
//! ## Terminal Output
//!
//! For every priced datacenter the report shows:
//! - The mapped region and the datacenter's monthly totals under both
//!   capacity modes
//! - One row per keyspace with storage, request rates and each cost line
//! - The `region total` row
//!
//! A grand total across datacenters closes the report.
//!
//! ## JSON Output
//!
//! JSON documents embed a `generated_at` RFC 3339 timestamp alongside the
//! serialized report:
//!
//! ```json
//! {
//!   "generated_at": "2025-01-15T10:00:00Z",
//!   "datacenters": ["dc1"],
//!   "regions": {"dc1": "US East (N. Virginia)"},
//!   "aggregates": {"dc1": {"app": {"writes_per_second": 0.33}}},
//!   "pricing": {"total_monthly_provisioned_cost": 12.5}
//! }
//! ```

use crate::analyzer::EstimateReport;
use crate::models::*;
use crate::pricing::PricingCatalog;
use chrono::Utc;
use colored::Colorize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

const RULE_WIDTH: usize = 100;

pub struct ReportDisplayManager;

impl Default for ReportDisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportDisplayManager {
    pub fn new() -> Self {
        Self
    }

    pub fn display_estimate(&self, report: &EstimateReport, json_output: bool) {
        if json_output {
            print_json(&self.estimate_json(report));
            return;
        }

        print_banner("Amazon Keyspaces Monthly Cost Estimate");

        println!(
            "\n{} {} datacenters • {} priced • {} provisioned • {} on-demand\n",
            "📊".bright_yellow(),
            report.datacenters.len().to_string().bright_white().bold(),
            report.pricing.per_datacenter_cost.len().to_string().bright_white().bold(),
            format_cost(report.pricing.total_monthly_provisioned_cost).bright_green().bold(),
            format_cost(report.pricing.total_monthly_on_demand_cost).bright_green().bold()
        );

        for datacenter in &report.datacenters {
            let Some(cost) = report.pricing.per_datacenter_cost.get(datacenter) else {
                println!(
                    "{} {} {}\n",
                    "⚠️".bright_yellow(),
                    datacenter.bright_white().bold(),
                    "not priced (no region mapping or pricing data)".bright_black()
                );
                continue;
            };
            let aggregates = report.aggregates.get(datacenter);
            self.print_datacenter(datacenter, cost, aggregates);
        }
    }

    pub fn display_quote(&self, region: &str, estimate: &PricingEstimate, json_output: bool) {
        if json_output {
            print_json(&self.quote_json(region, estimate));
            return;
        }

        print_banner("Amazon Keyspaces Monthly Cost Quote");
        println!("\n{} {}\n", "🌎".bright_blue(), region.bright_white().bold());

        for cost in estimate.per_datacenter_cost.values() {
            print_cost_header();
            for breakdown in cost.keyspace_costs.values() {
                print_cost_row(breakdown, false);
            }
        }

        println!(
            "\n{} {} provisioned • {} on-demand\n",
            "💰".bright_yellow(),
            format_cost(estimate.total_monthly_provisioned_cost).bright_green().bold(),
            format_cost(estimate.total_monthly_on_demand_cost).bright_green().bold()
        );
    }

    pub fn display_regions(&self, catalog: &PricingCatalog, json_output: bool) {
        if json_output {
            let regions: BTreeMap<_, _> = catalog.regions().collect();
            print_json(&json!({ "regions": regions }));
            return;
        }

        println!(
            "{:<32} {:>14} {:>14} {:>12} {:>12} {:>10} {:>10}",
            "Region".bold(),
            "Write/unit".bold(),
            "Read/unit".bold(),
            "WCU-hour".bold(),
            "RCU-hour".bold(),
            "GB-month".bold(),
            "PITR GB".bold()
        );
        for (name, rates) in catalog.regions() {
            println!(
                "{:<32} {:>14.10} {:>14.10} {:>12.6} {:>12.6} {:>10.4} {:>10.4}",
                name.bright_cyan(),
                rates.write_request_price,
                rates.read_request_price,
                rates.write_request_price_per_hour,
                rates.read_request_price_per_hour,
                rates.storage_price_per_gb,
                rates.pitr_price_per_gb
            );
        }
    }

    pub fn estimate_json(&self, report: &EstimateReport) -> Value {
        json!({
            "generated_at": Utc::now().to_rfc3339(),
            "datacenters": report.datacenters,
            "regions": report.regions,
            "aggregates": report.aggregates,
            "pricing": report.pricing,
        })
    }

    pub fn quote_json(&self, region: &str, estimate: &PricingEstimate) -> Value {
        json!({
            "generated_at": Utc::now().to_rfc3339(),
            "region": region,
            "pricing": estimate,
        })
    }

    fn print_datacenter(
        &self,
        datacenter: &str,
        cost: &DatacenterCost,
        aggregates: Option<&BTreeMap<String, KeyspaceAggregate>>,
    ) {
        println!(
            "{} {} ({}) • {} provisioned • {} on-demand",
            "🏢".bright_blue(),
            datacenter.bright_white().bold(),
            cost.region.bright_cyan(),
            format_cost(cost.total_datacenter_provisioned_cost).bright_green().bold(),
            format_cost(cost.total_datacenter_on_demand_cost).bright_green().bold()
        );

        if let Some(aggregates) = aggregates.filter(|a| !a.is_empty()) {
            println!(
                "   {:<24} {:>4} {:>12} {:>12} {:>10} {:>10} {:>10}",
                "Keyspace".bold(),
                "RF".bold(),
                "Live GB".bold(),
                "Billed GB".bold(),
                "Writes/s".bold(),
                "Reads/s".bold(),
                "TTL/s".bold()
            );
            for aggregate in aggregates.values() {
                println!(
                    "   {:<24} {:>4} {:>12.3} {:>12.3} {:>10.2} {:>10.2} {:>10.2}",
                    aggregate.name.bright_cyan(),
                    aggregate.replication_factor,
                    aggregate.total_live_space_gb,
                    aggregate.uncompressed_single_replica_gb,
                    aggregate.writes_per_second,
                    aggregate.reads_per_second,
                    aggregate.ttl_deletes_per_second
                );
            }
            println!();
        }

        print_cost_header();
        for breakdown in cost.keyspace_costs.values() {
            print_cost_row(breakdown, false);
        }
        print_cost_row(&cost.totals, true);
        println!();
    }
}

fn print_banner(title: &str) {
    println!("\n{}", "=".repeat(RULE_WIDTH).bright_cyan());
    println!("{}", title.bright_white().bold());
    println!("{}", "=".repeat(RULE_WIDTH).bright_cyan());
}

fn print_cost_header() {
    println!(
        "   {:<24} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12}",
        "Costs".bold(),
        "Storage".bold(),
        "Backup".bold(),
        "Reads(P)".bold(),
        "Writes(P)".bold(),
        "Reads(OD)".bold(),
        "Writes(OD)".bold(),
        "TTL".bold(),
        "Provisioned".bold(),
        "On-demand".bold()
    );
}

fn print_cost_row(cost: &CostBreakdown, is_total: bool) {
    let name = if is_total {
        cost.name.bright_white().bold()
    } else {
        cost.name.bright_cyan()
    };
    println!(
        "   {:<24} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>12}",
        name,
        format_cost(cost.storage),
        format_cost(cost.backup),
        format_cost(cost.reads_provisioned),
        format_cost(cost.writes_provisioned),
        format_cost(cost.reads_on_demand),
        format_cost(cost.writes_on_demand),
        format_cost(cost.ttl_deletes),
        format_cost(cost.provisioned_total).bright_green(),
        format_cost(cost.on_demand_total).bright_green()
    );
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json_str) => println!("{}", json_str),
        Err(e) => eprintln!("Error serializing report to JSON: {}", e),
    }
}

pub fn format_cost(value: f64) -> String {
    format!("${:.2}", value)
}
