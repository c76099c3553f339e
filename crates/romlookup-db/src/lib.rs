//! Romlookup-DB: read-only access to the metadata source databases
//!
//! This crate opens the SQLite files behind each metadata source with
//! rusqlite and r2d2 connection pooling, and decodes their rows into typed
//! structs.
//!
//! # Modules
//!
//! - `pool` - Read-only connection pools with table verification
//! - `schema` - Table layouts each source's queries rely on
//! - `models` - Typed rows returned by the queries
//! - `queries` - Per-source query operations
//! - `fixtures` - Fixture database helpers (tests and the `fixtures` feature)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use romlookup_common::SourceKind;
//! use romlookup_db::pool::{get_conn, open_readonly};
//! use romlookup_db::queries::openvgdb;
//! use romlookup_db::schema::required_tables;
//!
//! let pool = open_readonly(
//!     Path::new("openvgdb.sqlite"),
//!     required_tables(SourceKind::OpenVgdb),
//! )
//! .unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! for row in openvgdb::find_by_md5(&conn, "AA11BB22CC33DD44EE55FF6600112233", &[]).unwrap() {
//!     println!("{:?}", row.title);
//! }
//! ```

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod models;
pub mod pool;
pub mod queries;
pub mod schema;
