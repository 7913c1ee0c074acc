//! Small Fannie Mae and TPC-H datasets written with DuckDB
#![allow(dead_code)]

use duckdb::Connection;
use std::fs;
use std::path::Path;

fn copy_to(conn: &Connection, select: &str, target: &Path) {
    conn.execute_batch(&format!(
        "COPY ({}) TO '{}' (FORMAT 'parquet')",
        select,
        target.display()
    ))
    .expect("Failed to write parquet");
}

/// Three loans from 2000 and 2001, split over two perf files
///
/// The mortgage summary over this data yields three (year, loan_age) rows.
pub fn write_mortgage_data(datadir: &Path) {
    let conn = Connection::open_in_memory().expect("Failed to open DuckDB");
    fs::create_dir_all(datadir.join("perf")).unwrap();
    fs::create_dir_all(datadir.join("acq")).unwrap();

    copy_to(
        &conn,
        "SELECT * FROM (VALUES \
            (1::BIGINT, '01/2000', 700.0::DOUBLE), \
            (2::BIGINT, '02/2000', 650.0::DOUBLE), \
            (3::BIGINT, '05/2001', 720.0::DOUBLE)) \
         AS t(loan_id, orig_date, borrower_credit_score)",
        &datadir.join("acq/Acquisition_2000Q1.txt.parquet"),
    );
    copy_to(
        &conn,
        "SELECT * FROM (VALUES \
            (1::BIGINT, NULL::VARCHAR, NULL::VARCHAR, 1000.0::DOUBLE, 0.0::DOUBLE), \
            (1::BIGINT, NULL::VARCHAR, NULL::VARCHAR, 990.0::DOUBLE, 1.0::DOUBLE), \
            (1::BIGINT, '03', '06/2001', 980.0::DOUBLE, 2.0::DOUBLE)) \
         AS t(loan_id, zero_balance_code, disposition_date, current_actual_upb, loan_age)",
        &datadir.join("perf/Performance_2000Q1.txt.parquet"),
    );
    copy_to(
        &conn,
        "SELECT * FROM (VALUES \
            (2::BIGINT, '01', NULL::VARCHAR, 500.0::DOUBLE, 1.0::DOUBLE), \
            (3::BIGINT, NULL::VARCHAR, NULL::VARCHAR, 800.0::DOUBLE, 1.0::DOUBLE)) \
         AS t(loan_id, zero_balance_code, disposition_date, current_actual_upb, loan_age)",
        &datadir.join("perf/Performance_2000Q2.txt.parquet"),
    );
}

pub const MORTGAGE_SUMMARY_ROWS: usize = 3;

/// TPC-H tables with the column types `prepare tpch` writes, decimals as DOUBLE
const TPCH_TABLES: [(&str, &str, &str); 8] = [
    (
        "region",
        "r_regionkey BIGINT, r_name VARCHAR, r_comment VARCHAR",
        "(0, 'AMERICA', 'x'), (1, 'EUROPE', 'y'), (2, 'ASIA', 'z')",
    ),
    (
        "nation",
        "n_nationkey BIGINT, n_name VARCHAR, n_regionkey BIGINT, n_comment VARCHAR",
        "(0, 'BRAZIL', 0, 'a'), (6, 'FRANCE', 1, 'b'), (7, 'GERMANY', 1, 'c'), \
         (8, 'INDIA', 2, 'd'), (24, 'UNITED STATES', 0, 'e'), (3, 'CANADA', 0, 'f')",
    ),
    (
        "supplier",
        "s_suppkey BIGINT, s_name VARCHAR, s_address VARCHAR, s_nationkey BIGINT, \
         s_phone VARCHAR, s_acctbal DOUBLE, s_comment VARCHAR",
        "(1, 'Supplier#1', 'addr', 6, '16-555-0101', 5000.0, 'fine'), \
         (2, 'Supplier#2', 'addr', 3, '13-555-0102', 7000.0, 'Customer Complaints noted')",
    ),
    (
        "customer",
        "c_custkey BIGINT, c_name VARCHAR, c_address VARCHAR, c_nationkey BIGINT, \
         c_phone VARCHAR, c_acctbal DOUBLE, c_mktsegment VARCHAR, c_comment VARCHAR",
        "(1, 'Customer#1', 'addr', 7, '13-555-0201', 800.0, 'BUILDING', 'x'), \
         (2, 'Customer#2', 'addr', 0, '31-555-0202', 1200.0, 'AUTOMOBILE', 'y'), \
         (3, 'Customer#3', 'addr', 8, '17-555-0203', 900.0, 'BUILDING', 'z')",
    ),
    (
        "part",
        "p_partkey BIGINT, p_name VARCHAR, p_mfgr VARCHAR, p_brand VARCHAR, p_type VARCHAR, \
         p_size INTEGER, p_container VARCHAR, p_retailprice DOUBLE, p_comment VARCHAR",
        "(1, 'forest green metallic', 'Manufacturer#1', 'Brand#12', 'ECONOMY ANODIZED STEEL', \
            15, 'SM CASE', 901.0, 'p'), \
         (2, 'blush thistle blue', 'Manufacturer#2', 'Brand#23', 'PROMO BURNISHED COPPER', \
            3, 'MED BOX', 902.0, 'q')",
    ),
    (
        "partsupp",
        "ps_partkey BIGINT, ps_suppkey BIGINT, ps_availqty INTEGER, ps_supplycost DOUBLE, \
         ps_comment VARCHAR",
        "(1, 1, 3325, 771.64, 'r'), (1, 2, 8076, 993.49, 's'), \
         (2, 1, 3956, 337.09, 't'), (2, 2, 4069, 357.84, 'u')",
    ),
    (
        "orders",
        "o_orderkey BIGINT, o_custkey BIGINT, o_orderstatus VARCHAR, o_totalprice DOUBLE, \
         o_orderdate DATE, o_orderpriority VARCHAR, o_clerk VARCHAR, o_shippriority INTEGER, \
         o_comment VARCHAR",
        "(1, 1, 'O', 1730.0, DATE '1995-03-10', '1-URGENT', 'Clerk#1', 0, 'o'), \
         (2, 2, 'F', 900.0, DATE '1994-06-15', '2-HIGH', 'Clerk#2', 0, 'special requests'), \
         (3, 1, 'F', 450.0, DATE '1996-01-02', '5-LOW', 'Clerk#1', 0, 'o')",
    ),
    (
        "lineitem",
        "l_orderkey BIGINT, l_partkey BIGINT, l_suppkey BIGINT, l_linenumber INTEGER, \
         l_quantity DOUBLE, l_extendedprice DOUBLE, l_discount DOUBLE, l_tax DOUBLE, \
         l_returnflag VARCHAR, l_linestatus VARCHAR, l_shipdate DATE, l_commitdate DATE, \
         l_receiptdate DATE, l_shipinstruct VARCHAR, l_shipmode VARCHAR, l_comment VARCHAR",
        "(1, 1, 1, 1, 17.0, 901.0, 0.05, 0.02, 'N', 'O', DATE '1995-03-20', \
            DATE '1995-03-15', DATE '1995-03-25', 'DELIVER IN PERSON', 'AIR', 'l'), \
         (1, 2, 2, 2, 36.0, 829.0, 0.06, 0.04, 'N', 'O', DATE '1995-04-01', \
            DATE '1995-04-10', DATE '1995-04-05', 'TAKE BACK RETURN', 'MAIL', 'l'), \
         (2, 1, 2, 1, 8.0, 900.0, 0.10, 0.02, 'R', 'F', DATE '1994-07-01', \
            DATE '1994-06-20', DATE '1994-07-10', 'NONE', 'SHIP', 'l'), \
         (3, 2, 1, 1, 5.0, 450.0, 0.00, 0.08, 'A', 'F', DATE '1996-01-20', \
            DATE '1996-01-25', DATE '1996-01-22', 'COLLECT COD', 'TRUCK', 'l')",
    ),
];

/// Every TPC-H table as `<datadir>/<table>.parquet`, a handful of rows each
pub fn write_tpch_data(datadir: &Path) {
    let conn = Connection::open_in_memory().expect("Failed to open DuckDB");
    fs::create_dir_all(datadir).unwrap();

    for (table, columns, rows) in TPCH_TABLES {
        conn.execute_batch(&format!(
            "CREATE TABLE {} ({}); INSERT INTO {} VALUES {};",
            table, columns, table, rows
        ))
        .expect("Failed to create table");
        copy_to(
            &conn,
            &format!("SELECT * FROM {}", table),
            &datadir.join(format!("{}.parquet", table)),
        );
    }
}
