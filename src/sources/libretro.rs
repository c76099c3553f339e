//! libretro-database metadata source.
//!
//! Artwork is not stored in the database. Thumbnail URLs are built from the
//! system's libretro folder name and the game's No-Intro name:
//!
//! ```text
//! {base}/{system folder}/{Named_Boxarts|Named_Snaps|Named_Titles|Named_Logos}/{name}.png
//! ```

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use reqwest::Url;
use romlookup_common::paths::file_stem;
use romlookup_common::systems::forward_numeric;
use romlookup_common::{
    normalize_hash, ArtworkMapping, ArtworkMetadata, ArtworkType, Error, RomMetadata, SourceKind,
    SystemIdentifier,
};
use romlookup_db::models::LibretroRow;
use romlookup_db::pool::{open_readonly, DbPool};
use romlookup_db::queries::libretro;
use romlookup_db::schema::required_tables;
use tracing::debug;

use super::{non_empty, numeric_filter, retain_systems, type_wanted, with_conn, MetadataSource};

const KIND: SourceKind = SourceKind::Libretro;

/// Artwork types the thumbnail host serves, with their folder names.
const THUMBNAIL_FOLDERS: &[(ArtworkType, &str)] = &[
    (ArtworkType::BoxFront, "Named_Boxarts"),
    (ArtworkType::Screenshot, "Named_Snaps"),
    (ArtworkType::TitleScreen, "Named_Titles"),
    (ArtworkType::ClearLogo, "Named_Logos"),
];

/// Characters the thumbnail host replaces with `_` in file names.
const UNSAFE_THUMBNAIL_CHARS: &[char] = &['&', '*', '/', ':', '`', '<', '>', '?', '\\', '|', '"'];

/// Replace characters the thumbnail host cannot store.
///
/// ```
/// use romlookup::sources::libretro::sanitize_thumbnail_name;
///
/// assert_eq!(sanitize_thumbnail_name("Tom & Jerry: Frantic"), "Tom _ Jerry_ Frantic");
/// ```
pub fn sanitize_thumbnail_name(name: &str) -> String {
    name.chars()
        .map(|c| if UNSAFE_THUMBNAIL_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Build a thumbnail URL. Path segments are percent-encoded.
///
/// Returns `None` for systems without a libretro folder or a base URL that
/// cannot take path segments.
pub fn thumbnail_url(
    base: &Url,
    system: SystemIdentifier,
    artwork_type: ArtworkType,
    name: &str,
) -> Option<String> {
    let system_folder = system.libretro_database_name()?;
    let type_folder = THUMBNAIL_FOLDERS
        .iter()
        .find(|(t, _)| *t == artwork_type)
        .map(|(_, folder)| *folder)?;
    let file_name = format!("{}.png", sanitize_thumbnail_name(name));

    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend([system_folder, type_folder, file_name.as_str()]);
    Some(url.to_string())
}

/// Decode one joined libretro row.
///
/// Returns `None` when the row has neither a hash nor a file name.
pub fn rom_from_row(row: &LibretroRow) -> Option<RomMetadata> {
    let md5 = row.md5.as_deref().and_then(normalize_hash);
    let file_name = non_empty(row.file_name.clone());
    if md5.is_none() && file_name.is_none() {
        return None;
    }

    let release_date = match (row.release_year, row.release_month) {
        (Some(year), Some(month)) => Some(format!("{year:04}-{month:02}")),
        (Some(year), None) => Some(format!("{year:04}")),
        _ => None,
    };

    Some(RomMetadata {
        title: non_empty(row.display_name.clone()).or_else(|| non_empty(row.full_name.clone())),
        system: row
            .platform_id
            .and_then(|id| forward_numeric(KIND, id))
            .unwrap_or_default(),
        md5,
        crc: non_empty(row.crc.clone()).map(|c| c.to_ascii_uppercase()),
        file_name,
        serial: non_empty(row.serial.clone()),
        region: non_empty(row.region.clone()),
        genres: non_empty(row.genre.clone()),
        developer: non_empty(row.developer.clone()),
        publisher: non_empty(row.publisher.clone()),
        release_date,
        release_id: row.game_id.map(|id| id.to_string()),
        source: Some(KIND),
        ..Default::default()
    })
}

/// Name the thumbnail host files a ROM under: the file name without its
/// extension, else the title.
fn thumbnail_name(rom: &RomMetadata) -> Option<String> {
    rom.file_name
        .as_deref()
        .map(|f| file_stem(f).to_string())
        .or_else(|| rom.title.clone())
        .filter(|n| !n.trim().is_empty())
}

/// libretro adapter over a read-only pool.
pub struct LibretroSource {
    pool: DbPool,
    thumbnails: Url,
}

impl LibretroSource {
    pub fn open(path: &Path, thumbnails_base_url: &str) -> romlookup_common::Result<Self> {
        let thumbnails = Url::parse(thumbnails_base_url).map_err(|e| {
            Error::invalid_config(format!(
                "thumbnails base URL {thumbnails_base_url:?}: {e}"
            ))
        })?;
        let pool = open_readonly(path, required_tables(KIND))?;
        debug!(path = %path.display(), "Opened libretro database");
        Ok(Self { pool, thumbnails })
    }

    fn with_box_art(&self, mut rom: RomMetadata) -> RomMetadata {
        if rom.box_image_url.is_none() {
            rom.box_image_url = thumbnail_name(&rom).and_then(|name| {
                thumbnail_url(&self.thumbnails, rom.system, ArtworkType::BoxFront, &name)
            });
        }
        rom
    }

    fn artwork_for_rows(
        &self,
        rows: &[LibretroRow],
        types: Option<&[ArtworkType]>,
    ) -> Vec<ArtworkMetadata> {
        let mut seen_games = HashSet::new();
        let mut artwork = Vec::new();

        for row in rows {
            if !seen_games.insert(row.game_id) {
                continue;
            }
            let Some(name) = non_empty(row.full_name.clone())
                .or_else(|| row.file_name.as_deref().map(|f| file_stem(f).to_string()))
            else {
                continue;
            };
            let system = row
                .platform_id
                .and_then(|id| forward_numeric(KIND, id))
                .unwrap_or_default();

            for (artwork_type, _) in THUMBNAIL_FOLDERS {
                if !type_wanted(types, *artwork_type) {
                    continue;
                }
                if let Some(url) = thumbnail_url(&self.thumbnails, system, *artwork_type, &name) {
                    artwork.push(ArtworkMetadata {
                        url,
                        artwork_type: *artwork_type,
                        resolution: None,
                        source: Some(KIND),
                        system,
                    });
                }
            }
        }
        artwork
    }
}

#[async_trait]
impl MetadataSource for LibretroSource {
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
            libretro::find_by_md5(conn, &md5, &ids)
        })
        .await?;
        Ok(rows
            .iter()
            .filter_map(rom_from_row)
            .map(|rom| self.with_box_art(rom))
            .collect())
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
            libretro::find_by_file_name(conn, &term, &ids)
        })
        .await?;
        let mut records: Vec<RomMetadata> = rows
            .iter()
            .filter_map(rom_from_row)
            .map(|rom| self.with_box_art(rom))
            .collect();
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
            libretro::find_by_game_name(conn, &name, &ids)
        })
        .await?;
        Ok(self.artwork_for_rows(&rows, types))
    }

    async fn artwork_urls(&self, rom: &RomMetadata) -> anyhow::Result<Vec<String>> {
        if rom.system == SystemIdentifier::Unknown {
            return Ok(Vec::new());
        }
        let Some(name) = thumbnail_name(rom) else {
            return Ok(Vec::new());
        };

        Ok(THUMBNAIL_FOLDERS
            .iter()
            .filter(|(t, _)| *t != ArtworkType::ClearLogo)
            .filter_map(|(t, _)| thumbnail_url(&self.thumbnails, rom.system, *t, &name))
            .collect())
    }

    async fn artwork_for_id(&self, id: &str) -> anyhow::Result<Vec<ArtworkMetadata>> {
        let Ok(game_id) = id.trim().parse::<i64>() else {
            return Ok(Vec::new());
        };

        let rows = with_conn(&self.pool, KIND, move |conn| {
            libretro::find_by_game_id(conn, game_id)
        })
        .await?;
        Ok(self.artwork_for_rows(&rows, None))
    }

    async fn artwork_mappings(&self) -> anyhow::Result<ArtworkMapping> {
        let rows = with_conn(&self.pool, KIND, libretro::all_hashed).await?;

        let mut mapping = ArtworkMapping::default();
        for rom in rows.iter().filter_map(rom_from_row) {
            mapping.insert_record(&self.with_box_art(rom));
        }
        Ok(mapping)
    }
}
