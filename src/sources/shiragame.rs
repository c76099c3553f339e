//! ShiraGame metadata source.
//!
//! Hash-indexed ROM catalogue, normally configured as the fallback. It has
//! no artwork; titles come from the game's entry name.

use std::path::Path;

use async_trait::async_trait;
use romlookup_common::systems::{forward, VendorId};
use romlookup_common::{
    normalize_hash, ArtworkMapping, ArtworkMetadata, ArtworkType, RomMetadata, SourceKind,
    SystemIdentifier,
};
use romlookup_db::models::ShiraGameRow;
use romlookup_db::pool::{open_readonly, DbPool};
use romlookup_db::queries::shiragame;
use romlookup_db::schema::required_tables;
use tracing::debug;

use super::{non_empty, retain_systems, vendor_filter, with_conn, MetadataSource};

const KIND: SourceKind = SourceKind::ShiraGame;

fn text_ids(ids: &[VendorId]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| id.as_text().map(String::from))
        .collect()
}

/// Decode one joined ShiraGame row.
pub fn rom_from_row(row: &ShiraGameRow) -> Option<RomMetadata> {
    let md5 = normalize_hash(&row.md5);
    let file_name = non_empty(Some(row.file_name.clone()));
    if md5.is_none() && file_name.is_none() {
        return None;
    }

    Some(RomMetadata {
        title: non_empty(Some(row.entry_name.clone())),
        system: forward(KIND, &VendorId::Text(row.platform_id.clone())).unwrap_or_default(),
        md5,
        crc: non_empty(Some(row.crc.clone())).map(|c| c.to_ascii_uppercase()),
        file_name,
        serial: non_empty(row.serial.clone()),
        region: non_empty(row.region.clone()),
        release_id: Some(row.game_id.to_string()),
        source: Some(KIND),
        ..Default::default()
    })
}

/// ShiraGame adapter over a read-only pool.
pub struct ShiraGameSource {
    pool: DbPool,
}

impl ShiraGameSource {
    pub fn open(path: &Path) -> romlookup_common::Result<Self> {
        let pool = open_readonly(path, required_tables(KIND))?;
        debug!(path = %path.display(), "Opened ShiraGame");
        Ok(Self { pool })
    }
}

#[async_trait]
impl MetadataSource for ShiraGameSource {
    fn kind(&self) -> SourceKind {
        KIND
    }

    async fn search_by_hash(
        &self,
        md5: &str,
        system: Option<SystemIdentifier>,
    ) -> anyhow::Result<Vec<RomMetadata>> {
        let systems: Vec<SystemIdentifier> = system.into_iter().collect();
        let Some(ids) = vendor_filter(KIND, &systems) else {
            return Ok(Vec::new());
        };
        let platforms = text_ids(&ids);
        let md5 = md5.to_string();

        let rows = with_conn(&self.pool, KIND, move |conn| {
            shiragame::find_by_md5(conn, &md5, &platforms)
        })
        .await?;
        let mut records: Vec<RomMetadata> = rows.iter().filter_map(rom_from_row).collect();
        retain_systems(&mut records, &systems);
        Ok(records)
    }

    async fn search_by_filename(
        &self,
        filename: &str,
        systems: &[SystemIdentifier],
    ) -> anyhow::Result<Vec<RomMetadata>> {
        let Some(ids) = vendor_filter(KIND, systems) else {
            return Ok(Vec::new());
        };
        let platforms = text_ids(&ids);
        let term = filename.to_string();

        let rows = with_conn(&self.pool, KIND, move |conn| {
            shiragame::find_by_file_name(conn, &term, &platforms)
        })
        .await?;
        let mut records: Vec<RomMetadata> = rows.iter().filter_map(rom_from_row).collect();
        retain_systems(&mut records, systems);
        Ok(records)
    }

    async fn search_artwork(
        &self,
        _game_name: &str,
        _system: Option<SystemIdentifier>,
        _types: Option<&[ArtworkType]>,
    ) -> anyhow::Result<Vec<ArtworkMetadata>> {
        Ok(Vec::new())
    }

    async fn artwork_urls(&self, _rom: &RomMetadata) -> anyhow::Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn artwork_for_id(&self, _id: &str) -> anyhow::Result<Vec<ArtworkMetadata>> {
        Ok(Vec::new())
    }

    async fn artwork_mappings(&self) -> anyhow::Result<ArtworkMapping> {
        let rows = with_conn(&self.pool, KIND, shiragame::all_roms).await?;

        let mut mapping = ArtworkMapping::default();
        for rom in rows.iter().filter_map(rom_from_row) {
            mapping.insert_record(&rom);
        }
        Ok(mapping)
    }
}
