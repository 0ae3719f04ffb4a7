//! Row-size sampler report parsing.
//!
//! Each useful line looks like
//! `ks.table = { lines: 1986, columns: 12, average: 849 bytes, default-ttl: y }`.

use crate::models::{RowSizeData, RowSizeSample};
use tracing::debug;

pub fn parse_row_size_samples(content: &str) -> RowSizeData {
    let mut result = RowSizeData::new();

    for raw_line in content.lines() {
        let line = raw_line.trim();
        if line.contains("NoHostAvailable") {
            continue;
        }
        let Some((key, body)) = line.split_once('=') else {
            continue;
        };

        let body = body.trim();
        let Some(inner) = body.strip_prefix('{').and_then(|b| b.strip_suffix('}')) else {
            continue;
        };

        let fields = inner
            .split(',')
            .filter_map(|field| field.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.replace("bytes", "").trim().to_string()))
            .filter(|(k, _)| !k.is_empty())
            .collect();

        result.insert(key.trim().to_string(), RowSizeSample { fields });
    }

    debug!(tables = result.len(), "Parsed row size samples");
    result
}
