//! Romlookup-Common: Shared types, system tables, and utilities.
//!
//! This crate provides common functionality used across romlookup:
//!
//! - **Core Types**: ROM and artwork metadata records, artwork types, and the
//!   full-corpus artwork mapping
//! - **System Identity**: The canonical [`SystemIdentifier`] enumeration and the
//!   bidirectional vendor-id tables for every metadata source
//! - **Path Utilities**: Filename helpers for search terms and extension lookup
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use romlookup_common::systems::{forward, reverse, VendorId};
//! use romlookup_common::{SourceKind, SystemIdentifier};
//!
//! let snes = forward(SourceKind::OpenVgdb, &VendorId::Numeric(26));
//! assert_eq!(snes, Some(SystemIdentifier::SNES));
//! assert_eq!(
//!     reverse(SourceKind::ShiraGame, SystemIdentifier::SNES),
//!     Some(VendorId::Text("NINTENDO_SNES".into()))
//! );
//! ```

pub mod error;
pub mod paths;
pub mod systems;
pub mod types;

pub use error::{Error, Result};
pub use systems::SystemIdentifier;
pub use types::*;
