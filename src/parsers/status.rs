//! `nodetool status` parsing.

use crate::models::ClusterTopology;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static DATACENTER_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Datacenter:\s*(.*)$").expect("valid datacenter regex"));

/// Counts `UN`/`DN` node lines under each `Datacenter:` header.
///
/// Node lines seen before the first header, or under a header with no
/// name, are ignored. A datacenter header repeated later in the dump
/// replaces the earlier count.
pub fn parse_cluster_status(content: &str) -> ClusterTopology {
    let mut topology = ClusterTopology::new();
    let mut current: Option<(String, usize)> = None;

    for line in content.lines() {
        if let Some(caps) = DATACENTER_HEADER.captures(line) {
            if let Some((name, count)) = current.take() {
                topology.insert(name, count);
            }
            let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            current = (!name.is_empty()).then(|| (name.to_string(), 0));
            continue;
        }

        if let Some((_, count)) = current.as_mut() {
            if is_node_line(line) {
                *count += 1;
            }
        }
    }

    if let Some((name, count)) = current {
        topology.insert(name, count);
    }

    debug!(
        datacenters = topology.len(),
        nodes = topology.total_nodes(),
        "Parsed cluster status"
    );
    topology
}

fn is_node_line(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .map(|state| state.eq_ignore_ascii_case("UN") || state.eq_ignore_ascii_case("DN"))
        .unwrap_or(false)
}
