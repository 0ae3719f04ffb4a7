use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use keyspaces_estimator::config::get_config;
use keyspaces_estimator::display::ReportDisplayManager;
use keyspaces_estimator::logging::init_logging;
use keyspaces_estimator::parsers::{
    parse_cluster_status, parse_node_info, parse_row_size_samples, parse_schema, parse_table_stats,
};
use keyspaces_estimator::{
    parse_node_counts, parse_region_mappings, CostOptions, EstimateAnalyzer, ManualWorkload, PricingCatalog,
    ReadConsistency,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "keyspaces-estimate")]
#[command(about = "Estimate Amazon Keyspaces monthly costs from Cassandra cluster dumps")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate costs from a directory of collected node dumps
    Estimate {
        /// Directory holding status.txt and <datacenter>/<node>/ dumps
        #[arg(long)]
        samples: PathBuf,
        /// Datacenter to region mapping, e.g. dc1="US East (N. Virginia)"
        #[arg(long = "region", value_name = "DC=REGION", required = true)]
        regions: Vec<String>,
        /// Regions pricing dataset (JSON)
        #[arg(long)]
        pricing: Option<PathBuf>,
        /// Only estimate this keyspace
        #[arg(long)]
        keyspace: Option<String>,
        /// Node count for a datacenter, replacing the status dump's count
        #[arg(long = "nodes", value_name = "DC=COUNT")]
        nodes: Vec<String>,
        #[command(flatten)]
        cost: CostArgs,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Parse a single dump file and print it as JSON
    Parse {
        #[arg(value_enum)]
        kind: DumpKind,
        file: PathBuf,
        /// Datacenter a SimpleStrategy keyspace is attributed to
        #[arg(long, default_value = "")]
        datacenter: String,
    },
    /// Price a hand-entered workload in one region
    Quote {
        #[arg(long)]
        region: String,
        #[arg(long, default_value_t = 0.0)]
        reads_per_second: f64,
        #[arg(long, default_value_t = 0.0)]
        writes_per_second: f64,
        #[arg(long, default_value_t = 0.0)]
        ttl_deletes_per_second: f64,
        #[arg(long, default_value_t = 1024.0)]
        row_size_bytes: f64,
        #[arg(long, default_value_t = 0.0)]
        storage_gb: f64,
        /// Regions pricing dataset (JSON)
        #[arg(long)]
        pricing: Option<PathBuf>,
        #[command(flatten)]
        cost: CostArgs,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// List regions in the pricing catalog
    Regions {
        /// Regions pricing dataset (JSON)
        #[arg(long)]
        pricing: Option<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct CostArgs {
    /// Exclude point-in-time recovery backup costs
    #[arg(long)]
    no_pitr: bool,
    /// Read consistency: strong or eventual
    #[arg(long)]
    consistency: Option<ReadConsistency>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpKind {
    Status,
    Tablestats,
    Info,
    Schema,
    RowSize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = get_config();
    let _log_guard = match init_logging(config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: {:#}", e);
            None
        }
    };

    let display = ReportDisplayManager::new();

    match cli.command {
        Commands::Estimate {
            samples,
            regions,
            pricing,
            keyspace,
            nodes,
            cost,
            json,
        } => {
            let result = (|| -> Result<()> {
                let regions = parse_region_mappings(&regions)?;
                let node_counts = parse_node_counts(&nodes)?;
                let analyzer = EstimateAnalyzer::new(load_catalog(pricing.as_deref())?);
                let report = analyzer.estimate_with_node_counts(
                    &samples,
                    &node_counts,
                    &regions,
                    keyspace.as_deref(),
                    &cost.options(),
                )?;
                display.display_estimate(&report, json);
                Ok(())
            })();
            result.or_else(|e| handle_error(e, json))
        }
        Commands::Parse {
            kind,
            file,
            datacenter,
        } => parse_dump(kind, &file, &datacenter).or_else(|e| handle_error(e, false)),
        Commands::Quote {
            region,
            reads_per_second,
            writes_per_second,
            ttl_deletes_per_second,
            row_size_bytes,
            storage_gb,
            pricing,
            cost,
            json,
        } => {
            let workload = ManualWorkload {
                reads_per_second,
                writes_per_second,
                ttl_deletes_per_second,
                avg_row_size_bytes: row_size_bytes,
                storage_gb,
            };
            let result = (|| -> Result<()> {
                let analyzer = EstimateAnalyzer::new(load_catalog(pricing.as_deref())?);
                let estimate = analyzer.quote(&region, &workload, &cost.options())?;
                display.display_quote(&region, &estimate, json);
                Ok(())
            })();
            result.or_else(|e| handle_error(e, json))
        }
        Commands::Regions { pricing, json } => match load_catalog(pricing.as_deref()) {
            Ok(catalog) => {
                display.display_regions(&catalog, json);
                Ok(())
            }
            Err(e) => handle_error(e, json),
        },
    }
}

impl CostArgs {
    /// Configured options with command-line overrides applied
    fn options(&self) -> CostOptions {
        let mut options = get_config().cost_options();
        if self.no_pitr {
            options.point_in_time_recovery = false;
        }
        if let Some(consistency) = self.consistency {
            options.read_consistency = consistency;
        }
        options
    }
}

/// `--pricing` wins over the configured pricing file
fn load_catalog(cli_path: Option<&Path>) -> Result<PricingCatalog> {
    let path = cli_path.or(get_config().paths.pricing_file.as_deref());
    Ok(PricingCatalog::load(path)?)
}

fn parse_dump(kind: DumpKind, file: &Path, datacenter: &str) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let value = match kind {
        DumpKind::Status => serde_json::to_value(parse_cluster_status(&content))?,
        DumpKind::Tablestats => serde_json::to_value(parse_table_stats(&content))?,
        DumpKind::Info => serde_json::to_value(parse_node_info(&content)?)?,
        DumpKind::Schema => serde_json::to_value(parse_schema(&content, datacenter))?,
        DumpKind::RowSize => serde_json::to_value(parse_row_size_samples(&content))?,
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn handle_error(e: anyhow::Error, json: bool) -> Result<(), anyhow::Error> {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
    } else {
        eprintln!("Error: {:#}", e);
    }
    process::exit(1);
}
