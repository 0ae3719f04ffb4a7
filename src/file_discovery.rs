//! Sample directory discovery
//!
//! Loads the cluster status and every collected node sample beneath a
//! samples root. Node counts given explicitly replace the status dump's
//! counts and allow an estimate without a status dump at all.

use crate::error::{EstimateError, Result};
use crate::models::{ClusterTopology, NodeSample, SchemaInfo, RowSizeData, Samples};
use crate::parsers::{
    parse_cluster_status, parse_node_info, parse_row_size_samples, parse_schema, parse_table_stats,
};
use glob::{glob, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const STATUS_FILE: &str = "status.txt";
pub const TABLESTATS_FILE: &str = "tablestats.txt";
pub const INFO_FILE: &str = "info.txt";
pub const SCHEMA_FILE: &str = "schema.cql";
pub const ROW_SIZE_FILE: &str = "row_size.txt";

/// Locates and parses a directory of collected node dumps
///
/// Expected layout:
///
/// ```text
/// <root>/status.txt
/// <root>/<datacenter>/<node>/tablestats.txt
/// <root>/<datacenter>/<node>/info.txt
/// <root>/<datacenter>/<node>/schema.cql     (optional)
/// <root>/<datacenter>/<node>/row_size.txt   (optional)
/// ```
///
/// `status.txt` may be omitted when node counts are supplied through
/// [`SampleDiscovery::with_node_counts`].
pub struct SampleDiscovery {
    root: PathBuf,
    node_counts: ClusterTopology,
}

impl SampleDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            node_counts: ClusterTopology::new(),
        }
    }

    /// Node counts that take precedence over the status dump
    pub fn with_node_counts(mut self, node_counts: ClusterTopology) -> Self {
        self.node_counts = node_counts;
        self
    }

    /// Shorthand for `SampleDiscovery::new(root).load()`
    pub fn discover(root: impl AsRef<Path>) -> Result<(ClusterTopology, Samples)> {
        Self::new(root.as_ref()).load()
    }

    /// Reads the cluster status and every node sample under the root
    pub fn load(&self) -> Result<(ClusterTopology, Samples)> {
        let topology = self.load_topology()?;
        if topology.is_empty() {
            return Err(EstimateError::EmptyInput("status"));
        }

        let mut samples = Samples::new();
        for (datacenter, node, dir) in self.find_node_dirs() {
            let sample = load_node_sample(&dir, &datacenter)?;
            if !sample.info.datacenter.is_empty() && sample.info.datacenter != datacenter {
                warn!(
                    node = %node,
                    expected = %datacenter,
                    reported = %sample.info.datacenter,
                    "Node info reports a different datacenter than its directory"
                );
            }
            debug!(datacenter = %datacenter, node = %node, "Loaded node sample");
            samples.entry(datacenter).or_default().insert(node, sample);
        }

        if samples.is_empty() {
            return Err(EstimateError::EmptyInput("tablestats"));
        }

        info!(
            root = %self.root.display(),
            datacenters = samples.len(),
            nodes = samples.values().map(|nodes| nodes.len()).sum::<usize>(),
            "Discovered node samples"
        );
        Ok((topology, samples))
    }

    fn load_topology(&self) -> Result<ClusterTopology> {
        let status_path = self.root.join(STATUS_FILE);
        let mut topology = if self.node_counts.is_empty() || status_path.exists() {
            parse_cluster_status(&read_required(&status_path)?)
        } else {
            debug!(path = %status_path.display(), "No status dump, using supplied node counts");
            ClusterTopology::new()
        };

        for dc in self.node_counts.datacenters() {
            if let Some(parsed) = topology.node_count(&dc.name) {
                info!(
                    datacenter = %dc.name,
                    parsed,
                    supplied = dc.node_count,
                    "Overriding node count from the status dump"
                );
            }
            topology.insert(dc.name.clone(), dc.node_count);
        }
        Ok(topology)
    }

    /// `(datacenter, node, path)` for every `<root>/<dc>/<node>` directory
    pub fn find_node_dirs(&self) -> Vec<(String, String, PathBuf)> {
        let escaped_root = Pattern::escape(&self.root.to_string_lossy());
        let pattern = Path::new(&escaped_root).join("*").join("*");

        let mut dirs = Vec::new();
        if let Ok(paths) = glob(&pattern.to_string_lossy()) {
            for entry in paths.flatten() {
                if !entry.is_dir() {
                    continue;
                }
                let node = file_name(&entry);
                let datacenter = entry.parent().map(file_name).unwrap_or_default();
                if node.is_empty() || datacenter.is_empty() {
                    continue;
                }
                dirs.push((datacenter, node, entry));
            }
        }
        dirs.sort();
        dirs
    }
}

fn load_node_sample(dir: &Path, datacenter: &str) -> Result<NodeSample> {
    let tablestats = parse_table_stats(&read_required(&dir.join(TABLESTATS_FILE))?);
    let info = parse_node_info(&read_required(&dir.join(INFO_FILE))?)?;
    let schema = read_optional(&dir.join(SCHEMA_FILE))?
        .map(|content| parse_schema(&content, datacenter))
        .unwrap_or_else(SchemaInfo::new);
    let row_sizes = read_optional(&dir.join(ROW_SIZE_FILE))?
        .map(|content| parse_row_size_samples(&content))
        .unwrap_or_else(RowSizeData::new);

    Ok(NodeSample {
        tablestats,
        schema,
        info,
        row_sizes,
    })
}

fn read_required(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| EstimateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        debug!(path = %path.display(), "Optional sample file not present");
        return Ok(None);
    }
    read_required(path).map(Some)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_find_node_dirs_sorted() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "status.txt", "");
        write(temp.path(), "dc2/n1/info.txt", "");
        write(temp.path(), "dc1/n2/info.txt", "");
        write(temp.path(), "dc1/n1/info.txt", "");
        write(temp.path(), "dc1/notes.txt", "");

        let dirs = SampleDiscovery::new(temp.path()).find_node_dirs();
        let names: Vec<_> = dirs.iter().map(|(dc, node, _)| format!("{dc}/{node}")).collect();
        assert_eq!(names, vec!["dc1/n1", "dc1/n2", "dc2/n1"]);
    }

    #[test]
    fn test_missing_status_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = SampleDiscovery::discover(temp.path()).unwrap_err();
        assert!(matches!(err, EstimateError::Io { .. }));
    }

    #[test]
    fn test_node_counts_override_status() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "status.txt", "Datacenter: dc1\nUN 10.0.0.1\nDatacenter: dc2\nUN 10.0.0.2\n");
        let discovery = SampleDiscovery::new(temp.path())
            .with_node_counts(vec![("dc1", 6)].into_iter().collect());

        let topology = discovery.load_topology().unwrap();
        assert_eq!(topology.names(), vec!["dc1", "dc2"]);
        assert_eq!(topology.node_count("dc1"), Some(6));
        assert_eq!(topology.node_count("dc2"), Some(1));
    }

    #[test]
    fn test_node_counts_without_status() {
        let temp = TempDir::new().unwrap();
        let discovery = SampleDiscovery::new(temp.path())
            .with_node_counts(vec![("dc1", 4)].into_iter().collect());
        assert_eq!(discovery.load_topology().unwrap().node_count("dc1"), Some(4));
    }

    #[test]
    fn test_empty_status_rejected() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "status.txt", "nothing here\n");
        let err = SampleDiscovery::discover(temp.path()).unwrap_err();
        assert!(matches!(err, EstimateError::EmptyInput("status")));
    }
}
