//! TheGamesDB metadata source (local mirror).
//!
//! The mirror stores no ROM hashes, so hash searches and the artwork mapping
//! are always empty. File name searches match the bare title of the file.

use std::path::Path;

use async_trait::async_trait;
use romlookup_common::paths::base_title;
use romlookup_common::systems::forward_numeric;
use romlookup_common::{
    ArtworkMapping, ArtworkMetadata, ArtworkType, RomMetadata, SourceKind, SystemIdentifier,
};
use romlookup_db::models::{TheGamesDbArtworkRow, TheGamesDbGameRow};
use romlookup_db::pool::{open_readonly, DbPool};
use romlookup_db::queries::thegamesdb;
use romlookup_db::schema::required_tables;
use tracing::debug;

use super::{non_empty, numeric_filter, retain_systems, type_wanted, with_conn, MetadataSource};

const KIND: SourceKind = SourceKind::TheGamesDb;

/// CDN prefix for the `filename` column of the artwork table.
pub const IMAGE_BASE_URL: &str = "https://cdn.thegamesdb.net/images/original/";

fn system_of(platform: Option<i64>) -> SystemIdentifier {
    platform
        .and_then(|id| forward_numeric(KIND, id))
        .unwrap_or_default()
}

/// Decode a game row. Games without a title are skipped.
pub fn rom_from_game(row: &TheGamesDbGameRow) -> Option<RomMetadata> {
    let title = non_empty(Some(row.title.clone()))?;
    Some(RomMetadata {
        title: Some(title),
        system: system_of(row.platform),
        region: non_empty(row.region.clone()),
        genres: non_empty(row.genres.clone()),
        developer: non_empty(row.developers.clone()),
        publisher: non_empty(row.publishers.clone()),
        release_date: non_empty(row.release_date.clone()),
        description: non_empty(row.overview.clone()),
        release_id: Some(row.id.to_string()),
        source: Some(KIND),
        ..Default::default()
    })
}

/// Map the mirror's `type`/`side` pair to an artwork type.
pub fn artwork_type_of(kind: &str, side: Option<&str>) -> ArtworkType {
    match (kind.to_ascii_lowercase().as_str(), side) {
        ("boxart", Some(side)) if side.eq_ignore_ascii_case("back") => ArtworkType::BoxBack,
        ("boxart", _) => ArtworkType::BoxFront,
        ("screenshot", _) => ArtworkType::Screenshot,
        ("titlescreen", _) => ArtworkType::TitleScreen,
        ("clearlogo", _) => ArtworkType::ClearLogo,
        ("banner", _) => ArtworkType::Banner,
        ("fanart", _) => ArtworkType::FanArt,
        ("manual", _) => ArtworkType::Manual,
        _ => ArtworkType::Other,
    }
}

pub fn artwork_from_row(row: &TheGamesDbArtworkRow) -> ArtworkMetadata {
    ArtworkMetadata {
        url: format!("{}{}", IMAGE_BASE_URL, row.filename.trim_start_matches('/')),
        artwork_type: artwork_type_of(&row.kind, row.side.as_deref()),
        resolution: non_empty(row.resolution.clone()),
        source: Some(KIND),
        system: system_of(row.platform),
    }
}

/// TheGamesDB adapter over a read-only pool.
pub struct TheGamesDbSource {
    pool: DbPool,
}

impl TheGamesDbSource {
    pub fn open(path: &Path) -> romlookup_common::Result<Self> {
        let pool = open_readonly(path, required_tables(KIND))?;
        debug!(path = %path.display(), "Opened TheGamesDB mirror");
        Ok(Self { pool })
    }
}

#[async_trait]
impl MetadataSource for TheGamesDbSource {
    fn kind(&self) -> SourceKind {
        KIND
    }

    async fn search_by_hash(
        &self,
        _md5: &str,
        _system: Option<SystemIdentifier>,
    ) -> anyhow::Result<Vec<RomMetadata>> {
        Ok(Vec::new())
    }

    async fn search_by_filename(
        &self,
        filename: &str,
        systems: &[SystemIdentifier],
    ) -> anyhow::Result<Vec<RomMetadata>> {
        let Some(platforms) = numeric_filter(KIND, systems) else {
            return Ok(Vec::new());
        };
        let title = base_title(filename);
        if title.is_empty() {
            return Ok(Vec::new());
        }

        let rows = with_conn(&self.pool, KIND, move |conn| {
            thegamesdb::find_games_by_title(conn, &title, &platforms)
        })
        .await?;
        let mut records: Vec<RomMetadata> = rows.iter().filter_map(rom_from_game).collect();
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
        let Some(platforms) = numeric_filter(KIND, &systems) else {
            return Ok(Vec::new());
        };
        let name = game_name.to_string();

        let rows = with_conn(&self.pool, KIND, move |conn| {
            thegamesdb::artwork_by_title(conn, &name, &platforms)
        })
        .await?;

        Ok(rows
            .iter()
            .map(artwork_from_row)
            .filter(|art| type_wanted(types, art.artwork_type))
            .collect())
    }

    async fn artwork_urls(&self, rom: &RomMetadata) -> anyhow::Result<Vec<String>> {
        let Some(title) = rom
            .title
            .clone()
            .or_else(|| rom.file_name.as_deref().map(base_title))
            .filter(|t| !t.is_empty())
        else {
            return Ok(Vec::new());
        };
        let Some(platforms) = numeric_filter(KIND, &[rom.system]) else {
            return Ok(Vec::new());
        };

        let rows = with_conn(&self.pool, KIND, move |conn| {
            let games = thegamesdb::find_games_by_title(conn, &title, &platforms)?;
            let mut artwork = Vec::new();
            for game in games.iter().filter(|g| g.title.eq_ignore_ascii_case(&title)) {
                artwork.extend(thegamesdb::artwork_for_game(conn, game.id)?);
            }
            Ok(artwork)
        })
        .await?;

        Ok(rows.iter().map(|row| artwork_from_row(row).url).collect())
    }

    async fn artwork_for_id(&self, id: &str) -> anyhow::Result<Vec<ArtworkMetadata>> {
        let Ok(game_id) = id.trim().parse::<i64>() else {
            return Ok(Vec::new());
        };

        let rows = with_conn(&self.pool, KIND, move |conn| {
            thegamesdb::artwork_for_game(conn, game_id)
        })
        .await?;
        Ok(rows.iter().map(artwork_from_row).collect())
    }

    async fn artwork_mappings(&self) -> anyhow::Result<ArtworkMapping> {
        Ok(ArtworkMapping::default())
    }
}
