//! Fixture databases for tests.
//!
//! Inserts panic on failure; these helpers only ever run inside tests.

use std::path::Path;

use romlookup_common::{Error, Result, SourceKind};
use rusqlite::{params, Connection};

use crate::schema::schema_sql;

/// Create (or open) a writable database file with a source's tables.
pub fn create_database(path: &Path, kind: SourceKind) -> Result<Connection> {
    let conn = Connection::open(path).map_err(|e| Error::database(e.to_string()))?;
    conn.execute_batch(schema_sql(kind))
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(conn)
}

/// In-memory database with a source's tables.
pub fn memory_database(kind: SourceKind) -> Result<Connection> {
    let conn = Connection::open_in_memory().map_err(|e| Error::database(e.to_string()))?;
    conn.execute_batch(schema_sql(kind))
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(conn)
}

fn region_name(region_id: i64) -> String {
    match region_id {
        21 => "USA".to_string(),
        13 => "Japan".to_string(),
        6 => "Europe".to_string(),
        other => format!("Region {}", other),
    }
}

/// One OpenVGDB ROM; a release row is added when `title` is set.
#[derive(Debug, Clone, Default)]
pub struct OpenVgdbFixture<'a> {
    pub rom_id: i64,
    pub system_id: i64,
    pub region_id: Option<i64>,
    pub md5: &'a str,
    pub file_name: &'a str,
    pub title: Option<&'a str>,
    pub cover_front: Option<&'a str>,
    pub genre: Option<&'a str>,
}

pub fn insert_openvgdb_rom(conn: &Connection, rom: &OpenVgdbFixture<'_>) {
    if let Some(region_id) = rom.region_id {
        conn.execute(
            "INSERT OR IGNORE INTO REGIONS (regionID, regionName) VALUES (?1, ?2)",
            params![region_id, region_name(region_id)],
        )
        .unwrap();
    }
    conn.execute(
        "INSERT INTO ROMs (romID, systemID, regionID, romHashMD5, romFileName)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![rom.rom_id, rom.system_id, rom.region_id, rom.md5, rom.file_name],
    )
    .unwrap();

    if let Some(title) = rom.title {
        conn.execute(
            "INSERT INTO RELEASES (romID, releaseTitleName, regionLocalizedID,
                                   releaseCoverFront, releaseGenre)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![rom.rom_id, title, rom.region_id, rom.cover_front, rom.genre],
        )
        .unwrap();
    }
}

/// One libretro ROM with its game.
#[derive(Debug, Clone, Default)]
pub struct LibretroFixture<'a> {
    pub rom_id: i64,
    pub game_id: i64,
    pub platform_id: i64,
    pub md5: Option<&'a str>,
    pub file_name: &'a str,
    pub full_name: &'a str,
    pub display_name: &'a str,
    pub genre: Option<&'a str>,
    pub developer: Option<&'a str>,
}

pub fn insert_libretro_rom(conn: &Connection, rom: &LibretroFixture<'_>) {
    let genre_id = rom.genre.map(|name| {
        conn.execute("INSERT INTO genres (name) VALUES (?1)", [name])
            .unwrap();
        conn.last_insert_rowid()
    });
    let developer_id = rom.developer.map(|name| {
        conn.execute("INSERT INTO developers (name) VALUES (?1)", [name])
            .unwrap();
        conn.last_insert_rowid()
    });

    conn.execute(
        "INSERT OR IGNORE INTO games (id, display_name, full_name, platform_id, genre_id, developer_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            rom.game_id,
            rom.display_name,
            rom.full_name,
            rom.platform_id,
            genre_id,
            developer_id
        ],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO roms (id, name, md5, game_id) VALUES (?1, ?2, ?3, ?4)",
        params![rom.rom_id, rom.file_name, rom.md5, rom.game_id],
    )
    .unwrap();
}

pub fn insert_thegamesdb_game(conn: &Connection, id: i64, title: &str, platform: i64) {
    conn.execute(
        "INSERT INTO games (id, game_title, platform) VALUES (?1, ?2, ?3)",
        params![id, title, platform],
    )
    .unwrap();
}

pub fn insert_thegamesdb_artwork(
    conn: &Connection,
    game_id: i64,
    kind: &str,
    side: Option<&str>,
    filename: &str,
) {
    conn.execute(
        "INSERT INTO artwork (game_id, type, side, filename) VALUES (?1, ?2, ?3, ?4)",
        params![game_id, kind, side, filename],
    )
    .unwrap();
}

pub fn insert_shiragame_rom(
    conn: &Connection,
    game_id: i64,
    platform_id: &str,
    entry_name: &str,
    file_name: &str,
    md5: &str,
) {
    conn.execute(
        "INSERT OR IGNORE INTO game (game_id, platform_id, entry_name, source)
         VALUES (?1, ?2, ?3, 'No-Intro')",
        params![game_id, platform_id, entry_name],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO rom (file_name, md5, crc, sha1, size, game_id)
         VALUES (?1, ?2, '00000000', '', 0, ?3)",
        params![file_name, md5, game_id],
    )
    .unwrap();
}
