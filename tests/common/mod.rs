#![allow(dead_code)]

use std::fs;
use std::path::Path;

use keyspaces_estimator::defaults::SECONDS_PER_MONTH;

pub const STATUS_ONE_DC: &str = "\
Datacenter: dc1
===============
Status=Up/Down
|/ State=Normal/Leaving/Joining/Moving
--  Address    Load       Tokens  Owns (effective)  Host ID                               Rack
UN  10.0.0.1   1.02 GiB   16      100.0%            0b4fa2b4-0000-4000-8000-000000000001  rack1
";

pub const STATUS_TWO_DC: &str = "\
Datacenter: dc1
===============
Status=Up/Down
|/ State=Normal/Leaving/Joining/Moving
--  Address    Load       Tokens  Owns (effective)  Host ID                               Rack
UN  10.0.0.1   1.02 GiB   16      50.0%             0b4fa2b4-0000-4000-8000-000000000001  rack1
UN  10.0.0.2   1.01 GiB   16      50.0%             0b4fa2b4-0000-4000-8000-000000000002  rack1
DN  10.0.0.3   1.00 GiB   16      50.0%             0b4fa2b4-0000-4000-8000-000000000003  rack2

Datacenter: dc2
===============
Status=Up/Down
|/ State=Normal/Leaving/Joining/Moving
--  Address    Load       Tokens  Owns (effective)  Host ID                               Rack
UN  10.1.0.1   1.02 GiB   16      100.0%            0b4fa2b4-0000-4000-8000-000000000101  rack1
UN  10.1.0.2   1.03 GiB   16      100.0%            0b4fa2b4-0000-4000-8000-000000000102  rack1
";

pub const SCHEMA_TWO_DC: &str = r#"
CREATE KEYSPACE shop WITH replication = {'class': 'NetworkTopologyStrategy', 'dc1': '3', 'dc2': '2'}  AND durable_writes = true;

CREATE TABLE shop.orders (
    id uuid PRIMARY KEY,
    total decimal
) WITH default_time_to_live = 0;

CREATE KEYSPACE "analytics" WITH replication = {'class': 'org.apache.cassandra.locator.NetworkTopologyStrategy', 'dc2': '2'}  AND durable_writes = true;

CREATE TABLE "analytics"."rollups" (
    day date PRIMARY KEY
);

CREATE KEYSPACE system_auth WITH replication = {'class': 'SimpleStrategy', 'replication_factor': '1'}  AND durable_writes = true;
"#;

pub const ROW_SIZES: &str = "\
shop.orders = { lines: 2048, columns: 2, average: 1024 bytes, 95th: 1500 bytes, max: 4096 bytes, default-ttl: y }
analytics.rollups = { lines: 300, columns: 1, average: 5000 bytes, 95th: 6000 bytes, max: 9000 bytes, default-ttl: n }
";

/// One table block the way `nodetool tablestats` prints it
pub fn table_block(table: &str, space_used: u64, ratio: f64, reads: u64, writes: u64) -> String {
    format!(
        "\t\tTable: {table}
\t\tSSTable count: 4
\t\tSpace used (live): {space_used}
\t\tSpace used (total): {space_used}
\t\tSSTable Compression Ratio: {ratio}
\t\tNumber of partitions (estimate): 1024
\t\tLocal read count: {reads}
\t\tLocal read latency: 0.120 ms
\t\tLocal write count: {writes}
\t\tLocal write latency: 0.030 ms
\t\tBloom filter false positives: 0
\n"
    )
}

pub fn keyspace_block(keyspace: &str, tables: &[String]) -> String {
    let mut block = format!(
        "Keyspace : {keyspace}\n\tRead Count: 0\n\tRead Latency: NaN ms\n\tWrite Count: 0\n\tWrite Latency: NaN ms\n\tPending Flushes: 0\n"
    );
    for table in tables {
        block.push_str(table);
    }
    block.push_str("----------------\n");
    block
}

pub fn node_info(uptime_seconds: u64, datacenter: &str) -> String {
    format!(
        "ID                     : 0b4fa2b4-0000-4000-8000-000000000001
Gossip active          : true
Native Transport active: true
Load                   : 1.02 GiB
Generation No          : 1718035213
Uptime (seconds)       : {uptime_seconds}
Heap Memory (MB)       : 1024.55 / 8192.00
Data Center            : {datacenter}
Rack                   : rack1
Exceptions             : 0
"
    )
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// The single-node scenario: one user table written about once per second
/// for a month, with no schema so the default replication factor applies.
pub fn write_single_node_tree(root: &Path) {
    write_file(root, "status.txt", STATUS_ONE_DC);
    write_file(
        root,
        "dc1/node1/tablestats.txt",
        &keyspace_block("ks1", &[table_block("t1", 1_000_000_000, 1.0, 0, 2_629_743)]),
    );
    write_file(
        root,
        "dc1/node1/info.txt",
        &node_info(SECONDS_PER_MONTH as u64, "dc1"),
    );
    write_file(
        root,
        "dc1/node1/row_size.txt",
        "ks1.t1 = { lines: 10, columns: 3, average: 1024 bytes, default-ttl: y }\n",
    );
}

/// Two datacenters, two sampled nodes in dc1 and one in dc2
pub fn write_two_dc_tree(root: &Path) {
    write_file(root, "status.txt", STATUS_TWO_DC);

    let stats = format!(
        "{}{}",
        keyspace_block("shop", &[table_block("orders", 2_000_000_000, 0.5, 1_000_000, 3_000_000)]),
        keyspace_block("system", &[table_block("local", 1_000, 1.0, 10, 10)]),
    );
    for node in ["node1", "node2"] {
        write_file(root, &format!("dc1/{node}/tablestats.txt"), &stats);
        write_file(root, &format!("dc1/{node}/info.txt"), &node_info(1_000_000, "dc1"));
        write_file(root, &format!("dc1/{node}/schema.cql"), SCHEMA_TWO_DC);
        write_file(root, &format!("dc1/{node}/row_size.txt"), ROW_SIZES);
    }

    let dc2_stats = format!(
        "{}{}",
        keyspace_block("shop", &[table_block("orders", 1_000_000_000, 1.0, 500_000, 500_000)]),
        keyspace_block("analytics", &[table_block("rollups", 4_000_000_000, 0.25, 0, 1_000_000)]),
    );
    write_file(root, "dc2/node1/tablestats.txt", &dc2_stats);
    write_file(root, "dc2/node1/info.txt", &node_info(2_000_000, "dc2"));
    write_file(root, "dc2/node1/schema.cql", SCHEMA_TWO_DC);
    write_file(root, "dc2/node1/row_size.txt", ROW_SIZES);
}
