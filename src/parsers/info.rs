//! `nodetool info` parsing.

use crate::error::{EstimateError, Result};
use crate::models::NodeInfo;
use once_cell::sync::Lazy;
use regex::Regex;

static UPTIME_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*Uptime\s*\(\s*seconds\s*\)\s*:\s*(.*?)\s*$").expect("valid uptime regex")
});
static ID_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*ID\s*:\s*(.*?)\s*$").expect("valid id regex"));
static DATACENTER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*Data\s*Center\s*:\s*(.*?)\s*$").expect("valid data center regex")
});

/// Extracts uptime, host id and datacenter from a node info dump.
///
/// This is the only parser that fails: an uptime line whose value is not a
/// number invalidates every rate computed from the node. A dump with no
/// uptime line at all yields `uptime_seconds == 0.0`.
pub fn parse_node_info(content: &str) -> Result<NodeInfo> {
    let mut info = NodeInfo::default();

    for line in content.lines() {
        if let Some(caps) = UPTIME_LINE.captures(line) {
            let raw = &caps[1];
            let parsed = raw
                .split_whitespace()
                .next()
                .and_then(|token| token.parse::<f64>().ok())
                .filter(|v| v.is_finite());
            info.uptime_seconds = parsed.ok_or_else(|| EstimateError::UptimeParse {
                value: raw.to_string(),
            })?;
        } else if let Some(caps) = ID_LINE.captures(line) {
            info.node_id = caps[1].to_string();
        } else if let Some(caps) = DATACENTER_LINE.captures(line) {
            info.datacenter = caps[1].to_string();
        }
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: &str = "\
ID                     : 6a1c0c4e-1111-4b8f-9d1a-000000000001
Gossip active          : true
Native Transport active: true
Load                   : 1.21 GiB
Generation No          : 1718035213
Uptime (seconds)       : 1209600
Heap Memory (MB)       : 1024.55 / 8192.00
Data Center            : dc1
Rack                   : rack1
Exceptions             : 0
";

    #[test]
    fn test_parse_full_info() {
        let info = parse_node_info(INFO).unwrap();
        assert_eq!(info.uptime_seconds, 1_209_600.0);
        assert_eq!(info.node_id, "6a1c0c4e-1111-4b8f-9d1a-000000000001");
        assert_eq!(info.datacenter, "dc1");
    }

    #[test]
    fn test_case_insensitive_flexible_whitespace() {
        let info = parse_node_info("uptime(seconds):42\ndata center:east\nid: abc").unwrap();
        assert_eq!(info.uptime_seconds, 42.0);
        assert_eq!(info.datacenter, "east");
        assert_eq!(info.node_id, "abc");
    }

    #[test]
    fn test_unparsable_uptime_is_fatal() {
        let err = parse_node_info("Uptime (seconds): soon\n").unwrap_err();
        assert!(matches!(err, EstimateError::UptimeParse { ref value } if value == "soon"));
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let info = parse_node_info("Gossip active : true\n").unwrap();
        assert_eq!(info.uptime_seconds, 0.0);
        assert_eq!(info.node_id, "");
        assert_eq!(info.datacenter, "");
    }
}
