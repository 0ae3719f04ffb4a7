//! `nodetool tablestats` parsing.
//!
//! The dump is scanned with a small state machine. A table block only
//! produces an entry once all four tracked fields have been seen, so a
//! truncated block never leaks partial numbers into the estimate.

use crate::defaults::DEFAULT_COMPRESSION_RATIO;
use crate::models::{TableStat, TableStatsData};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

static KEYSPACE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Keyspace\s*:\s*(.+)$").expect("valid keyspace regex"));
static TABLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Table(?:\s*\(index\))?\s*:\s*(.+)$").expect("valid table regex"));
static SPACE_USED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Space used \(live\)\s*:\s*(.*)$").expect("valid space regex"));
static COMPRESSION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^SSTable Compression Ratio\s*:\s*(.*)$").expect("valid compression regex")
});
static READ_COUNT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Local read count\s*:\s*(.*)$").expect("valid read regex"));
static WRITE_COUNT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Local write count\s*:\s*(.*)$").expect("valid write regex"));

#[derive(Debug, Default, Clone, Copy)]
struct PendingFields {
    space_used: Option<f64>,
    compression_ratio: Option<f64>,
    read_count: Option<f64>,
    write_count: Option<f64>,
}

impl PendingFields {
    fn complete(&self) -> Option<TableStat> {
        Some(TableStat {
            space_used: self.space_used?,
            compression_ratio: self.compression_ratio?,
            read_count: self.read_count?,
            write_count: self.write_count?,
        })
    }
}

#[derive(Debug)]
enum ScanState {
    SeekingKeyspace,
    SeekingTable {
        keyspace: String,
    },
    CollectingTableFields {
        keyspace: String,
        table: String,
        fields: PendingFields,
    },
}

/// Parses a tablestats dump into keyspace -> table -> [`TableStat`].
///
/// Keyspaces are registered as soon as their header is seen, even when no
/// table under them completes.
pub fn parse_table_stats(content: &str) -> TableStatsData {
    let mut data = TableStatsData::new();
    let mut state = ScanState::SeekingKeyspace;

    for raw_line in content.lines() {
        let line = raw_line.trim();

        if let Some(caps) = KEYSPACE_LINE.captures(line) {
            let keyspace = caps[1].trim().to_string();
            data.entry(keyspace.clone()).or_default();
            state = ScanState::SeekingTable { keyspace };
            continue;
        }

        state = match state {
            ScanState::SeekingKeyspace => ScanState::SeekingKeyspace,
            ScanState::SeekingTable { keyspace } => match TABLE_LINE.captures(line) {
                Some(caps) => ScanState::CollectingTableFields {
                    keyspace,
                    table: caps[1].trim().to_string(),
                    fields: PendingFields::default(),
                },
                None => ScanState::SeekingTable { keyspace },
            },
            ScanState::CollectingTableFields {
                keyspace,
                table,
                mut fields,
            } => {
                if let Some(caps) = TABLE_LINE.captures(line) {
                    trace!(keyspace = %keyspace, table = %table, "Incomplete table block discarded");
                    ScanState::CollectingTableFields {
                        keyspace,
                        table: caps[1].trim().to_string(),
                        fields: PendingFields::default(),
                    }
                } else {
                    collect_field(line, &mut fields);
                    match fields.complete() {
                        Some(stat) => {
                            data.entry(keyspace.clone()).or_default().insert(table, stat);
                            ScanState::SeekingTable { keyspace }
                        }
                        None => ScanState::CollectingTableFields {
                            keyspace,
                            table,
                            fields,
                        },
                    }
                }
            }
        };
    }

    debug!(
        keyspaces = data.len(),
        tables = data.values().map(|t| t.len()).sum::<usize>(),
        "Parsed tablestats"
    );
    data
}

fn collect_field(line: &str, fields: &mut PendingFields) {
    if let Some(caps) = SPACE_USED_LINE.captures(line) {
        fields.space_used = Some(parse_number(&caps[1]).unwrap_or(0.0));
    } else if let Some(caps) = COMPRESSION_LINE.captures(line) {
        fields.compression_ratio =
            Some(parse_number(&caps[1]).unwrap_or(DEFAULT_COMPRESSION_RATIO));
    } else if let Some(caps) = READ_COUNT_LINE.captures(line) {
        fields.read_count = Some(parse_number(&caps[1]).unwrap_or(0.0));
    } else if let Some(caps) = WRITE_COUNT_LINE.captures(line) {
        fields.write_count = Some(parse_number(&caps[1]).unwrap_or(0.0));
    }
}

/// First whitespace token as a finite float.
fn parse_number(value: &str) -> Option<f64> {
    value
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
