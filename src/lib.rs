//! romlookup - ROM metadata and artwork resolution across local databases
//!
//! The library crate exposes the lookup engine for the CLI and for
//! integration testing.

pub mod artwork;
pub mod config;
pub mod lookup;
pub mod sources;

pub use lookup::{Lookup, LookupBuilder};
