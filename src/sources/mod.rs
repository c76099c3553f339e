//! Metadata sources: one adapter per backing database.
//!
//! This module defines the [`MetadataSource`] trait that every source
//! (OpenVGDB, libretro, TheGamesDB, ShiraGame) implements. Adapters decode
//! their own rows into the canonical types from `romlookup_common`; callers
//! never see a source schema.

pub mod libretro;
pub mod openvgdb;
pub mod shiragame;
pub mod thegamesdb;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use romlookup_common::systems::{vendor_ids, VendorId};
use romlookup_common::{
    ArtworkMapping, ArtworkMetadata, ArtworkType, Error, RomMetadata, SourceKind, SystemIdentifier,
};
use romlookup_db::pool::{get_conn, DbPool};
use rusqlite::Connection;

pub use libretro::LibretroSource;
pub use openvgdb::OpenVgdbSource;
pub use shiragame::ShiraGameSource;
pub use thegamesdb::TheGamesDbSource;

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Async trait that all metadata sources implement.
///
/// Each source wraps a single read-only database. An empty result is not an
/// error; errors are reserved for storage failures.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Which database this adapter wraps.
    fn kind(&self) -> SourceKind;

    /// Exact, case-insensitive hash match, optionally restricted to one system.
    /// The filter accepts every vendor id the system is filed under.
    async fn search_by_hash(
        &self,
        md5: &str,
        system: Option<SystemIdentifier>,
    ) -> anyhow::Result<Vec<RomMetadata>>;

    /// Case-insensitive substring match on file names. Only ASCII letters
    /// fold; `É` and `é` are distinct. An empty `systems` slice means no
    /// system filter.
    async fn search_by_filename(
        &self,
        filename: &str,
        systems: &[SystemIdentifier],
    ) -> anyhow::Result<Vec<RomMetadata>>;

    /// Artwork for games whose name contains `game_name`.
    async fn search_artwork(
        &self,
        game_name: &str,
        system: Option<SystemIdentifier>,
        types: Option<&[ArtworkType]>,
    ) -> anyhow::Result<Vec<ArtworkMetadata>>;

    /// Candidate artwork URLs for a ROM.
    async fn artwork_urls(&self, rom: &RomMetadata) -> anyhow::Result<Vec<String>>;

    /// Artwork for a source-native game or release id.
    async fn artwork_for_id(&self, id: &str) -> anyhow::Result<Vec<ArtworkMetadata>>;

    /// Hash and file name index over the whole source.
    async fn artwork_mappings(&self) -> anyhow::Result<ArtworkMapping>;
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Open the adapter for `kind` over the database at `path`.
///
/// Opening verifies the file and its tables, so it runs on the blocking pool.
pub async fn open_source(
    kind: SourceKind,
    path: &Path,
    thumbnails_base_url: &str,
) -> anyhow::Result<Arc<dyn MetadataSource>> {
    let path = path.to_path_buf();
    let thumbnails_base_url = thumbnails_base_url.to_string();

    tokio::task::spawn_blocking(move || -> anyhow::Result<Arc<dyn MetadataSource>> {
        let source: Arc<dyn MetadataSource> = match kind {
            SourceKind::OpenVgdb => Arc::new(OpenVgdbSource::open(&path)?),
            SourceKind::Libretro => Arc::new(LibretroSource::open(&path, &thumbnails_base_url)?),
            SourceKind::TheGamesDb => Arc::new(TheGamesDbSource::open(&path)?),
            SourceKind::ShiraGame => Arc::new(ShiraGameSource::open(&path)?),
        };
        Ok(source)
    })
    .await
    .with_context(|| format!("{kind} open task failed"))?
    .map_err(|e| Error::source_unavailable(kind, e.to_string()).into())
}

// ---------------------------------------------------------------------------
// Shared adapter helpers
// ---------------------------------------------------------------------------

/// Run a query on the blocking pool with a pooled connection.
pub(crate) async fn with_conn<T, F>(pool: &DbPool, kind: SourceKind, f: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> romlookup_common::Result<T> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let conn = get_conn(&pool)?;
        f(&conn)
    })
    .await
    .with_context(|| format!("{kind} query task failed"))?
    .map_err(|e| Error::query_failed(kind, e.to_string()).into())
}

/// Vendor ids to filter on for a list of systems.
///
/// `Some(vec![])` means no filter. `None` means a filter was requested but
/// none of its systems exist in this source, so the query can be skipped.
pub(crate) fn vendor_filter(
    kind: SourceKind,
    systems: &[SystemIdentifier],
) -> Option<Vec<VendorId>> {
    if systems.is_empty() {
        return Some(Vec::new());
    }
    let ids: Vec<VendorId> = systems
        .iter()
        .flat_map(|system| vendor_ids(kind, *system))
        .collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

/// Numeric form of [`vendor_filter`].
pub(crate) fn numeric_filter(kind: SourceKind, systems: &[SystemIdentifier]) -> Option<Vec<i64>> {
    vendor_filter(kind, systems)
        .map(|ids| ids.iter().filter_map(VendorId::as_numeric).collect())
}

/// Keep only records matching the filter. Records of unmapped platforms are
/// `Unknown` and never match a non-empty filter.
pub(crate) fn retain_systems(records: &mut Vec<RomMetadata>, systems: &[SystemIdentifier]) {
    if !systems.is_empty() {
        records.retain(|rom| systems.contains(&rom.system));
    }
}

/// Whether `types` admits `artwork_type`; `None` admits everything.
pub(crate) fn type_wanted(types: Option<&[ArtworkType]>, artwork_type: ArtworkType) -> bool {
    types.map_or(true, |types| types.contains(&artwork_type))
}

/// Treat empty strings in source columns as missing.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
