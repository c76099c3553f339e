//! OpenVGDB metadata source.
//!
//! The curated primary store. Box art URLs are stored per release and point
//! at GameFAQs; the adapter passes them through unchanged.

use std::path::Path;

use async_trait::async_trait;
use romlookup_common::paths::base_title;
use romlookup_common::systems::forward_numeric;
use romlookup_common::{
    normalize_hash, ArtworkMapping, ArtworkMetadata, ArtworkType, RomMetadata, SourceKind,
    SystemIdentifier,
};
use romlookup_db::models::OpenVgdbRow;
use romlookup_db::pool::{open_readonly, DbPool};
use romlookup_db::queries::openvgdb;
use romlookup_db::schema::required_tables;
use tracing::debug;

use super::{non_empty, numeric_filter, retain_systems, type_wanted, with_conn, MetadataSource};

const KIND: SourceKind = SourceKind::OpenVgdb;

/// Decode one joined OpenVGDB row.
///
/// Returns `None` when the row has neither a hash nor a file name.
pub fn rom_from_row(row: &OpenVgdbRow) -> Option<RomMetadata> {
    let md5 = row.md5.as_deref().and_then(normalize_hash);
    let file_name = non_empty(row.file_name.clone());
    if md5.is_none() && file_name.is_none() {
        return None;
    }

    let title = non_empty(row.title.clone())
        .or_else(|| file_name.as_deref().map(base_title))
        .filter(|t| !t.is_empty());

    Some(RomMetadata {
        title,
        system: row
            .system_id
            .and_then(|id| forward_numeric(KIND, id))
            .unwrap_or_default(),
        md5,
        crc: non_empty(row.crc.clone()).map(|c| c.to_ascii_uppercase()),
        file_name,
        serial: non_empty(row.serial.clone()),
        region: non_empty(row.region_name.clone()),
        region_id: row.region_id,
        genres: non_empty(row.genre.clone()),
        developer: non_empty(row.developer.clone()),
        publisher: non_empty(row.publisher.clone()),
        release_date: non_empty(row.release_date.clone()),
        description: non_empty(row.description.clone()),
        reference_url: non_empty(row.reference_url.clone()),
        box_image_url: non_empty(row.cover_front.clone()),
        box_back_url: non_empty(row.cover_back.clone()),
        release_id: row.release_id.map(|id| id.to_string()),
        source: Some(KIND),
    })
}

/// Box art stored on a row, front first.
pub fn artwork_from_row(row: &OpenVgdbRow) -> Vec<ArtworkMetadata> {
    let system = row
        .system_id
        .and_then(|id| forward_numeric(KIND, id))
        .unwrap_or_default();

    [
        (non_empty(row.cover_front.clone()), ArtworkType::BoxFront),
        (non_empty(row.cover_back.clone()), ArtworkType::BoxBack),
    ]
    .into_iter()
    .filter_map(|(url, artwork_type)| {
        url.map(|url| ArtworkMetadata {
            url,
            artwork_type,
            resolution: None,
            source: Some(KIND),
            system,
        })
    })
    .collect()
}

/// OpenVGDB adapter over a read-only pool.
pub struct OpenVgdbSource {
    pool: DbPool,
}

impl OpenVgdbSource {
    pub fn open(path: &Path) -> romlookup_common::Result<Self> {
        let pool = open_readonly(path, required_tables(KIND))?;
        debug!(path = %path.display(), "Opened OpenVGDB");
        Ok(Self { pool })
    }
}

#[async_trait]
impl MetadataSource for OpenVgdbSource {
    fn kind(&self) -> SourceKind {
        KIND
    }

    async fn search_by_hash(
        &self,
        md5: &str,
        system: Option<SystemIdentifier>,
    ) -> anyhow::Result<Vec<RomMetadata>> {
        let systems: Vec<SystemIdentifier> = system.into_iter().collect();
        let Some(ids) = numeric_filter(KIND, &systems) else {
            return Ok(Vec::new());
        };
        let md5 = md5.to_string();

        let rows = with_conn(&self.pool, KIND, move |conn| {
            openvgdb::find_by_md5(conn, &md5, &ids)
        })
        .await?;
        Ok(rows.iter().filter_map(rom_from_row).collect())
    }

    async fn search_by_filename(
        &self,
        filename: &str,
        systems: &[SystemIdentifier],
    ) -> anyhow::Result<Vec<RomMetadata>> {
        let Some(ids) = numeric_filter(KIND, systems) else {
            return Ok(Vec::new());
        };
        let term = filename.to_string();

        let rows = with_conn(&self.pool, KIND, move |conn| {
            openvgdb::find_by_file_name(conn, &term, &ids)
        })
        .await?;
        let mut records: Vec<RomMetadata> = rows.iter().filter_map(rom_from_row).collect();
        retain_systems(&mut records, systems);
        Ok(records)
    }

    async fn search_artwork(
        &self,
        game_name: &str,
        system: Option<SystemIdentifier>,
        types: Option<&[ArtworkType]>,
    ) -> anyhow::Result<Vec<ArtworkMetadata>> {
        let systems: Vec<SystemIdentifier> = system.into_iter().collect();
        let Some(ids) = numeric_filter(KIND, &systems) else {
            return Ok(Vec::new());
        };
        let name = game_name.to_string();

        let rows = with_conn(&self.pool, KIND, move |conn| {
            openvgdb::find_by_title(conn, &name, &ids)
        })
        .await?;
        Ok(rows
            .iter()
            .flat_map(artwork_from_row)
            .filter(|art| type_wanted(types, art.artwork_type))
            .collect())
    }

    async fn artwork_urls(&self, rom: &RomMetadata) -> anyhow::Result<Vec<String>> {
        let Some(md5) = rom.md5.as_deref().and_then(normalize_hash) else {
            return Ok(Vec::new());
        };
        let records = self
            .search_by_hash(&md5, Some(rom.system).filter(|s| *s != SystemIdentifier::Unknown))
            .await?;

        Ok(records
            .into_iter()
            .flat_map(|r| [r.box_image_url, r.box_back_url])
            .flatten()
            .collect())
    }

    async fn artwork_for_id(&self, id: &str) -> anyhow::Result<Vec<ArtworkMetadata>> {
        let Ok(release_id) = id.trim().parse::<i64>() else {
            return Ok(Vec::new());
        };

        let row = with_conn(&self.pool, KIND, move |conn| {
            openvgdb::find_by_release_id(conn, release_id)
        })
        .await?;
        Ok(row.map(|row| artwork_from_row(&row)).unwrap_or_default())
    }

    async fn artwork_mappings(&self) -> anyhow::Result<ArtworkMapping> {
        let rows = with_conn(&self.pool, KIND, openvgdb::all_hashed).await?;

        let mut mapping = ArtworkMapping::default();
        for rom in rows.iter().filter_map(rom_from_row) {
            mapping.insert_record(&rom);
        }
        Ok(mapping)
    }
}
