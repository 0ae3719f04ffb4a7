//! Region rate catalog and monthly cost projection.
//!
//! The catalog is an injected, read-only lookup from region name to
//! [`RegionRateTable`]. It is loaded from a regions pricing dataset on disk,
//! or from the built-in fallback table when no dataset is configured.
//! [`calculate_pricing_estimate`] prices keyspace aggregates against it.

use crate::error::{EstimateError, Result};
use crate::formulas::*;
use crate::models::{
    CostBreakdown, CostOptions, DatacenterCost, KeyspaceAggregate, PricingEstimate, RegionRateTable,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const READ_UNITS_KEY: &str = "MCS-ReadUnits";
const WRITE_UNITS_KEY: &str = "MCS-WriteUnits";
const PROVISIONED_WRITE_KEY: &str = "Provisioned Write Units";
const PROVISIONED_READ_KEY: &str = "Provisioned Read Units";
const STORAGE_KEY: &str = "AmazonMCS - Indexed DataStore per GB-Mo";
const PITR_KEY: &str = "Point-In-Time-Restore PITR Backup Storage per GB-Mo";
const TTL_KEY: &str = "Time to Live";

pub const DEFAULT_REGION: &str = "US East (N. Virginia)";

/// Name of the per-datacenter totals row.
pub const TOTALS_ROW: &str = "region total";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingCatalog {
    regions: BTreeMap<String, RegionRateTable>,
}

impl PricingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, region: impl Into<String>, rates: RegionRateTable) {
        self.regions.insert(region.into(), rates);
    }

    pub fn get(&self, region: &str) -> Option<&RegionRateTable> {
        self.regions.get(region)
    }

    pub fn regions(&self) -> impl Iterator<Item = (&String, &RegionRateTable)> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Loads `path` when given, otherwise returns [`PricingCatalog::fallback`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::fallback()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| EstimateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&content).map_err(|reason| EstimateError::PricingFile {
            path: path.to_path_buf(),
            reason,
        })?;
        info!(path = %path.display(), regions = catalog.len(), "Loaded pricing data");
        Ok(catalog)
    }

    /// Parses a dataset shaped as
    /// `{"regions": {"<name>": {"MCS-ReadUnits": {"price": ..}, ..}}}`.
    ///
    /// Regions missing a price are skipped; a negative price is an error.
    pub fn from_json_str(content: &str) -> std::result::Result<Self, String> {
        let root: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
        let regions = root
            .get("regions")
            .and_then(Value::as_object)
            .ok_or_else(|| "missing 'regions' object".to_string())?;

        let mut catalog = PricingCatalog::new();
        for (name, entry) in regions {
            match region_rates(entry) {
                Ok(Some(rates)) => catalog.insert(name.clone(), rates),
                Ok(None) => warn!(region = %name, "Region is missing pricing fields, skipping"),
                Err(field) => {
                    return Err(format!("negative price for '{}' in region '{}'", field, name))
                }
            }
        }

        if catalog.is_empty() {
            return Err("no complete region pricing found".to_string());
        }
        Ok(catalog)
    }

    /// Approximate public list prices for a few common regions.
    pub fn fallback() -> Self {
        let mut catalog = PricingCatalog::new();
        let us = RegionRateTable {
            read_request_price: 0.000_000_3,
            write_request_price: 0.000_001_5,
            write_request_price_per_hour: 0.000_75,
            read_request_price_per_hour: 0.000_15,
            storage_price_per_gb: 0.25,
            pitr_price_per_gb: 0.20,
            ttl_deletes_price: 0.000_000_333,
        };
        catalog.insert(DEFAULT_REGION, us);
        catalog.insert("US East (Ohio)", us);
        catalog.insert("US West (Oregon)", us);
        catalog.insert(
            "Europe (Ireland)",
            RegionRateTable {
                read_request_price: 0.000_000_34,
                write_request_price: 0.000_001_7,
                write_request_price_per_hour: 0.000_85,
                read_request_price_per_hour: 0.000_17,
                storage_price_per_gb: 0.275,
                pitr_price_per_gb: 0.22,
                ttl_deletes_price: 0.000_000_38,
            },
        );
        catalog.insert(
            "Europe (Frankfurt)",
            RegionRateTable {
                read_request_price: 0.000_000_36,
                write_request_price: 0.000_001_83,
                write_request_price_per_hour: 0.000_915,
                read_request_price_per_hour: 0.000_183,
                storage_price_per_gb: 0.306,
                pitr_price_per_gb: 0.245,
                ttl_deletes_price: 0.000_000_41,
            },
        );
        catalog.insert(
            "Asia Pacific (Tokyo)",
            RegionRateTable {
                read_request_price: 0.000_000_38,
                write_request_price: 0.000_001_9,
                write_request_price_per_hour: 0.000_95,
                read_request_price_per_hour: 0.000_19,
                storage_price_per_gb: 0.3,
                pitr_price_per_gb: 0.24,
                ttl_deletes_price: 0.000_000_42,
            },
        );
        catalog
    }
}

/// `Ok(None)` when a field is absent, `Err(field)` when a price is negative.
fn region_rates(entry: &Value) -> std::result::Result<Option<RegionRateTable>, &'static str> {
    let price = |key: &'static str| -> std::result::Result<Option<f64>, &'static str> {
        match entry.get(key).and_then(|field| field.get("price")).and_then(price_value) {
            Some(p) if p < 0.0 => Err(key),
            other => Ok(other),
        }
    };

    let fields = (
        price(READ_UNITS_KEY)?,
        price(WRITE_UNITS_KEY)?,
        price(PROVISIONED_WRITE_KEY)?,
        price(PROVISIONED_READ_KEY)?,
        price(STORAGE_KEY)?,
        price(PITR_KEY)?,
        price(TTL_KEY)?,
    );

    Ok(match fields {
        (Some(read), Some(write), Some(write_hour), Some(read_hour), Some(storage), Some(pitr), Some(ttl)) => {
            Some(RegionRateTable {
                read_request_price: read,
                write_request_price: write,
                write_request_price_per_hour: write_hour,
                read_request_price_per_hour: read_hour,
                storage_price_per_gb: storage,
                pitr_price_per_gb: pitr,
                ttl_deletes_price: ttl,
            })
        }
        _ => None,
    })
}

/// Prices appear both as JSON numbers and as numeric strings.
fn price_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|p| p.is_finite())
}

/// Monthly costs for one keyspace under both capacity modes.
pub fn keyspace_cost(
    aggregate: &KeyspaceAggregate,
    rates: &RegionRateTable,
    options: &CostOptions,
) -> CostBreakdown {
    let read_multiplier = options.read_consistency.read_cost_multiplier();
    let storage = calculate_storage_cost_per_month(aggregate.uncompressed_single_replica_gb, rates);
    let backup = if options.point_in_time_recovery {
        calculate_backup_cost_per_month(aggregate.uncompressed_single_replica_gb, rates)
    } else {
        0.0
    };

    let reads_provisioned = calculate_provisioned_read_cost_per_month(
        aggregate.reads_per_second,
        aggregate.avg_read_row_size_bytes,
        rates,
        options.read_target_utilization,
    ) * read_multiplier;
    let writes_provisioned = calculate_provisioned_write_cost_per_month(
        aggregate.writes_per_second,
        aggregate.avg_write_row_size_bytes,
        rates,
        options.write_target_utilization,
    );
    let reads_on_demand = calculate_on_demand_read_cost_per_month(
        aggregate.reads_per_second,
        aggregate.avg_read_row_size_bytes,
        rates,
    ) * read_multiplier;
    let writes_on_demand = calculate_on_demand_write_cost_per_month(
        aggregate.writes_per_second,
        aggregate.avg_write_row_size_bytes,
        rates,
    );
    let ttl_deletes = calculate_ttl_cost_per_month(
        aggregate.ttl_deletes_per_second,
        aggregate.avg_write_row_size_bytes,
        rates,
    );

    CostBreakdown {
        name: aggregate.name.clone(),
        storage,
        backup,
        reads_provisioned,
        writes_provisioned,
        reads_on_demand,
        writes_on_demand,
        ttl_deletes,
        provisioned_total: reads_provisioned + writes_provisioned + ttl_deletes + storage + backup,
        on_demand_total: reads_on_demand + writes_on_demand + ttl_deletes + storage + backup,
    }
}

/// Prices every datacenter's keyspace aggregates in its mapped region.
///
/// `regions` maps datacenter name to catalog region and `estimates` maps
/// datacenter name to the output of
/// [`crate::aggregate::aggregate_keyspace`]. A datacenter lacking a region,
/// aggregates, or catalog entry is left out of the result.
pub fn calculate_pricing_estimate(
    datacenters: &[String],
    regions: &BTreeMap<String, String>,
    catalog: &PricingCatalog,
    estimates: &BTreeMap<String, BTreeMap<String, KeyspaceAggregate>>,
    options: &CostOptions,
) -> Result<PricingEstimate> {
    if datacenters.is_empty() {
        return Err(EstimateError::NoDatacenters);
    }

    let mut estimate = PricingEstimate::default();

    for datacenter in datacenters {
        let Some(region) = regions.get(datacenter) else {
            warn!(datacenter = %datacenter, "No region selected for datacenter, skipping");
            continue;
        };
        let Some(aggregates) = estimates.get(datacenter) else {
            warn!(datacenter = %datacenter, "No estimate results for datacenter, skipping");
            continue;
        };
        let Some(rates) = catalog.get(region) else {
            warn!(datacenter = %datacenter, region = %region, "No pricing data for region, skipping");
            continue;
        };

        let mut totals = CostBreakdown::named(TOTALS_ROW);
        let mut keyspace_costs = BTreeMap::new();
        for (keyspace, aggregate) in aggregates {
            let cost = keyspace_cost(aggregate, rates, options);
            totals.accumulate(&cost);
            keyspace_costs.insert(keyspace.clone(), cost);
        }

        debug!(
            datacenter = %datacenter,
            region = %region,
            keyspaces = keyspace_costs.len(),
            provisioned = totals.provisioned_total,
            on_demand = totals.on_demand_total,
            "Priced datacenter"
        );

        estimate.total_monthly_provisioned_cost += totals.provisioned_total;
        estimate.total_monthly_on_demand_cost += totals.on_demand_total;
        estimate.per_datacenter_cost.insert(
            datacenter.clone(),
            DatacenterCost {
                region: region.clone(),
                keyspace_costs,
                total_datacenter_provisioned_cost: totals.provisioned_total,
                total_datacenter_on_demand_cost: totals.on_demand_total,
                totals,
            },
        );
    }

    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"{
        "regions": {
            "US East (N. Virginia)": {
                "MCS-ReadUnits": {"price": "0.00000025"},
                "MCS-WriteUnits": {"price": 0.00000125},
                "Provisioned Write Units": {"price": "0.00065"},
                "Provisioned Read Units": {"price": "0.00013"},
                "AmazonMCS - Indexed DataStore per GB-Mo": {"price": "0.25"},
                "Point-In-Time-Restore PITR Backup Storage per GB-Mo": {"price": "0.20"},
                "Time to Live": {"price": "0.000000333"}
            },
            "Incomplete": {
                "MCS-ReadUnits": {"price": "0.1"}
            }
        }
    }"#;

    fn flat_rates() -> RegionRateTable {
        RegionRateTable {
            read_request_price: 0.000_000_25,
            write_request_price: 0.000_001_25,
            write_request_price_per_hour: 0.000_65,
            read_request_price_per_hour: 0.000_13,
            storage_price_per_gb: 0.25,
            pitr_price_per_gb: 0.20,
            ttl_deletes_price: 0.000_000_333,
        }
    }

    fn aggregate(name: &str, storage_gb: f64, rate: f64) -> KeyspaceAggregate {
        KeyspaceAggregate::from_manual_inputs(
            name,
            &crate::models::ManualWorkload {
                reads_per_second: rate,
                writes_per_second: rate,
                ttl_deletes_per_second: 0.0,
                avg_row_size_bytes: 1024.0,
                storage_gb,
            },
        )
    }

    fn single_region_catalog() -> PricingCatalog {
        let mut catalog = PricingCatalog::new();
        catalog.insert("r1", flat_rates());
        catalog
    }

    #[test]
    fn test_keyspace_cost_totals() {
        let cost = keyspace_cost(&aggregate("app", 100.0, 1.0), &flat_rates(), &CostOptions::default());
        assert!((cost.storage - 25.0).abs() < 1e-9);
        assert!((cost.backup - 20.0).abs() < 1e-9);
        let expected = cost.reads_provisioned + cost.writes_provisioned + cost.ttl_deletes + 45.0;
        assert!((cost.provisioned_total - expected).abs() < 1e-9);
        let expected = cost.reads_on_demand + cost.writes_on_demand + cost.ttl_deletes + 45.0;
        assert!((cost.on_demand_total - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pitr_disabled_drops_backup() {
        let options = CostOptions {
            point_in_time_recovery: false,
            ..CostOptions::default()
        };
        let cost = keyspace_cost(&aggregate("app", 100.0, 0.0), &flat_rates(), &options);
        assert_eq!(cost.backup, 0.0);
        assert!((cost.provisioned_total - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_eventual_consistency_halves_reads() {
        let strong = keyspace_cost(&aggregate("app", 0.0, 5.0), &flat_rates(), &CostOptions::default());
        let options = CostOptions {
            read_consistency: crate::models::ReadConsistency::Eventual,
            ..CostOptions::default()
        };
        let eventual = keyspace_cost(&aggregate("app", 0.0, 5.0), &flat_rates(), &options);
        assert!((eventual.reads_on_demand * 2.0 - strong.reads_on_demand).abs() < 1e-9);
        assert!((eventual.reads_provisioned * 2.0 - strong.reads_provisioned).abs() < 1e-9);
        assert_eq!(eventual.writes_on_demand, strong.writes_on_demand);
    }

    #[test]
    fn test_estimate_requires_datacenters() {
        let err = calculate_pricing_estimate(
            &[],
            &BTreeMap::new(),
            &single_region_catalog(),
            &BTreeMap::new(),
            &CostOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EstimateError::NoDatacenters));
    }

    #[test]
    fn test_estimate_sums_datacenters() {
        let datacenters = vec!["dc1".to_string(), "dc2".to_string(), "dc3".to_string()];
        let regions: BTreeMap<String, String> = [("dc1", "r1"), ("dc2", "r1"), ("dc3", "missing")]
            .into_iter()
            .map(|(d, r)| (d.to_string(), r.to_string()))
            .collect();
        let mut estimates = BTreeMap::new();
        for dc in ["dc1", "dc2", "dc3"] {
            let mut ks = BTreeMap::new();
            ks.insert("a".to_string(), aggregate("a", 10.0, 1.0));
            ks.insert("b".to_string(), aggregate("b", 30.0, 2.0));
            estimates.insert(dc.to_string(), ks);
        }

        let estimate = calculate_pricing_estimate(
            &datacenters,
            &regions,
            &single_region_catalog(),
            &estimates,
            &CostOptions::default(),
        )
        .unwrap();

        assert_eq!(estimate.per_datacenter_cost.len(), 2);
        assert!(!estimate.per_datacenter_cost.contains_key("dc3"));

        let dc1 = &estimate.per_datacenter_cost["dc1"];
        assert_eq!(dc1.region, "r1");
        assert_eq!(dc1.totals.name, TOTALS_ROW);
        let summed: f64 = dc1.keyspace_costs.values().map(|c| c.provisioned_total).sum();
        assert!((dc1.total_datacenter_provisioned_cost - summed).abs() < 1e-9);
        assert!((dc1.totals.storage - 10.0).abs() < 1e-9);

        let grand = estimate
            .per_datacenter_cost
            .values()
            .map(|dc| dc.total_datacenter_on_demand_cost)
            .sum::<f64>();
        assert!((estimate.total_monthly_on_demand_cost - grand).abs() < 1e-9);
    }

    #[test]
    fn test_parse_dataset() {
        let catalog = PricingCatalog::from_json_str(DATASET).unwrap();
        assert_eq!(catalog.len(), 1);
        let rates = catalog.get("US East (N. Virginia)").unwrap();
        assert_eq!(rates.read_request_price, 0.000_000_25);
        assert_eq!(rates.write_request_price, 0.000_001_25);
        assert_eq!(rates.storage_price_per_gb, 0.25);
        assert!(catalog.get("Incomplete").is_none());
    }

    #[test]
    fn test_negative_price_rejected() {
        let dataset = DATASET.replace("\"0.25\"", "\"-0.25\"");
        let err = PricingCatalog::from_json_str(&dataset).unwrap_err();
        assert!(err.contains("negative"));
    }

    #[test]
    fn test_missing_regions_rejected() {
        assert!(PricingCatalog::from_json_str("{}").is_err());
        assert!(PricingCatalog::from_json_str("not json").is_err());
    }

    #[test]
    fn test_fallback_has_default_region() {
        let catalog = PricingCatalog::fallback();
        assert!(catalog.get(DEFAULT_REGION).is_some());
        for (_, rates) in catalog.regions() {
            assert!(rates.storage_price_per_gb > 0.0);
            assert!(rates.write_request_price > rates.read_request_price);
        }
    }

    #[test]
    fn test_load_without_path_uses_fallback() {
        assert_eq!(PricingCatalog::load(None).unwrap(), PricingCatalog::fallback());
    }
}
