//! Typed rows returned by the per-source queries.
//!
//! These mirror the joined columns each query selects, not the full tables.
//! Converting a row into a canonical record is the adapter's job.

use serde::{Deserialize, Serialize};

/// One OpenVGDB ROM joined with its release and region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenVgdbRow {
    pub rom_id: i64,
    pub system_id: Option<i64>,
    pub region_id: Option<i64>,
    pub region_name: Option<String>,
    pub crc: Option<String>,
    pub md5: Option<String>,
    pub file_name: Option<String>,
    pub serial: Option<String>,
    pub release_id: Option<i64>,
    pub title: Option<String>,
    pub cover_front: Option<String>,
    pub cover_back: Option<String>,
    pub description: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub genre: Option<String>,
    pub release_date: Option<String>,
    pub reference_url: Option<String>,
}

/// One libretro ROM joined with its game and lookup tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibretroRow {
    pub rom_id: i64,
    pub game_id: Option<i64>,
    pub file_name: Option<String>,
    pub md5: Option<String>,
    pub crc: Option<String>,
    pub display_name: Option<String>,
    /// No-Intro style name, e.g. `Pitfall - The Mayan Adventure (USA)`.
    pub full_name: Option<String>,
    pub platform_id: Option<i64>,
    pub region: Option<String>,
    pub genre: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub release_year: Option<i64>,
    pub release_month: Option<i64>,
    pub serial: Option<String>,
}

/// A TheGamesDB game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheGamesDbGameRow {
    pub id: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub platform: Option<i64>,
    pub region: Option<String>,
    pub overview: Option<String>,
    pub developers: Option<String>,
    pub publishers: Option<String>,
    pub genres: Option<String>,
}

/// A TheGamesDB artwork entry with its owning game's platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheGamesDbArtworkRow {
    pub game_id: i64,
    pub platform: Option<i64>,
    /// `boxart`, `screenshot`, `fanart`, `banner`, `clearlogo`, `titlescreen`.
    pub kind: String,
    /// `front` or `back` for box art.
    pub side: Option<String>,
    /// Path relative to the image CDN, e.g. `boxart/front/1234-1.jpg`.
    pub filename: String,
    pub resolution: Option<String>,
}

/// One ShiraGame ROM joined with its game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiraGameRow {
    pub game_id: i64,
    pub platform_id: String,
    pub entry_name: String,
    pub release_title: Option<String>,
    pub region: Option<String>,
    pub file_name: String,
    pub md5: String,
    pub crc: String,
    pub size: i64,
    pub serial: Option<String>,
}
