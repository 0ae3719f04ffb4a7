//! Parsers for the operator-tool text dumps collected from each node.
//!
//! All parsers are pure functions of their input text. Malformed or
//! unrecognized lines are skipped; only [`parse_node_info`] can fail.

pub mod info;
pub mod row_size;
pub mod schema;
pub mod status;
pub mod tablestats;

pub use info::parse_node_info;
pub use row_size::parse_row_size_samples;
pub use schema::parse_schema;
pub use status::parse_cluster_status;
pub use tablestats::parse_table_stats;
