//! `DESCRIBE SCHEMA` (CQL DDL) parsing.

use crate::models::{KeyspaceSchema, SchemaInfo};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

static KEYSPACE_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)CREATE\s+KEYSPACE\s+(?:IF\s+NOT\s+EXISTS\s+)?"?(\w+)"?\s+WITH\s+replication\s*=\s*\{([^}]*)\}"#,
    )
    .expect("valid keyspace statement regex")
});
static TABLE_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?"?(\w+)"?\."?(\w+)"?"#)
        .expect("valid table statement regex")
});
static REPLICATION_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'([^']+)'\s*:\s*'([^']*)'").expect("valid replication pair regex"));

const NETWORK_TOPOLOGY_STRATEGY: &str = "NetworkTopologyStrategy";
const SIMPLE_STRATEGY: &str = "SimpleStrategy";

/// Parses keyspace replication settings and table names out of a schema dump.
///
/// `current_datacenter` is the datacenter the dump was taken from. A
/// `SimpleStrategy` keyspace has no per-datacenter settings, so its
/// `replication_factor` is recorded against that datacenter only.
pub fn parse_schema(content: &str, current_datacenter: &str) -> SchemaInfo {
    let mut schema = SchemaInfo::new();

    for caps in KEYSPACE_STATEMENT.captures_iter(content) {
        let name = caps[1].to_string();
        let replication = &caps[2];

        let mut class = String::new();
        let mut datacenters = std::collections::BTreeMap::new();
        let mut simple_factor = None;

        for pair in REPLICATION_PAIR.captures_iter(replication) {
            let key = &pair[1];
            let value = &pair[2];
            match key {
                "class" => class = value.rsplit('.').next().unwrap_or(value).to_string(),
                "replication_factor" => simple_factor = value.trim().parse::<u32>().ok(),
                dc => {
                    if let Ok(rf) = value.trim().parse::<u32>() {
                        datacenters.insert(dc.to_string(), rf);
                    }
                }
            }
        }

        match class.as_str() {
            NETWORK_TOPOLOGY_STRATEGY => {}
            SIMPLE_STRATEGY => {
                datacenters.clear();
                if let Some(rf) = simple_factor {
                    datacenters.insert(current_datacenter.to_string(), rf);
                }
            }
            other => {
                trace!(keyspace = %name, class = %other, "Keyspace has no datacenter replication");
                datacenters.clear();
            }
        }

        schema.insert(
            name,
            KeyspaceSchema {
                class,
                datacenters,
                tables: Vec::new(),
            },
        );
    }

    for caps in TABLE_STATEMENT.captures_iter(content) {
        if let Some(keyspace) = schema.get_mut(&caps[1]) {
            keyspace.tables.push(caps[2].to_string());
        }
    }

    debug!(keyspaces = schema.len(), datacenter = %current_datacenter, "Parsed schema");
    schema
}
