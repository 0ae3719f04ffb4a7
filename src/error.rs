//! Error types for the estimation pipeline.
//!
//! Only a handful of conditions are allowed to surface to callers: an
//! unparsable node uptime (every rate is divided by it), structurally
//! invalid aggregation input, and I/O or pricing-file problems at the
//! edges. Everything else is a soft miss that falls back to the values in
//! [`crate::defaults`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("Error parsing uptime in seconds: {value:?}")]
    UptimeParse { value: String },

    #[error("Datacenter '{0}' was sampled but is missing from the cluster status")]
    UnknownDatacenter(String),

    #[error("No datacenters supplied for pricing")]
    NoDatacenters,

    #[error("No valid {0} data found in input")]
    EmptyInput(&'static str),

    #[error("No pricing data for region '{0}'")]
    UnknownRegion(String),

    #[error("Invalid region mapping '{0}', expected <datacenter>=<region>")]
    InvalidRegionMapping(String),

    #[error("Invalid node count '{0}', expected <datacenter>=<positive integer>")]
    InvalidNodeCount(String),

    #[error("Failed to load pricing data from {}: {reason}", path.display())]
    PricingFile { path: PathBuf, reason: String },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EstimateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_message_includes_value() {
        let err = EstimateError::UptimeParse {
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Error parsing uptime in seconds: \"abc\"");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = EstimateError::Io {
            path: PathBuf::from("missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("missing.txt"));
    }
}
