//! Table layouts of the four source databases.
//!
//! Production databases are produced elsewhere and only ever opened
//! read-only. The SQL here documents the columns the queries rely on and
//! is used to build fixture databases.

use romlookup_common::SourceKind;

const OPENVGDB_SQL: &str = include_str!("openvgdb.sql");
const LIBRETRO_SQL: &str = include_str!("libretro.sql");
const THEGAMESDB_SQL: &str = include_str!("thegamesdb.sql");
const SHIRAGAME_SQL: &str = include_str!("shiragame.sql");

/// Tables that must exist before a source is considered usable.
pub fn required_tables(kind: SourceKind) -> &'static [&'static str] {
    match kind {
        SourceKind::OpenVgdb => &["SYSTEMS", "REGIONS", "ROMs", "RELEASES"],
        SourceKind::Libretro => &["platforms", "games", "roms"],
        SourceKind::TheGamesDb => &["platforms", "games", "artwork"],
        SourceKind::ShiraGame => &["game", "rom"],
    }
}

/// `CREATE TABLE` script for a source.
pub fn schema_sql(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::OpenVgdb => OPENVGDB_SQL,
        SourceKind::Libretro => LIBRETRO_SQL,
        SourceKind::TheGamesDb => THEGAMESDB_SQL,
        SourceKind::ShiraGame => SHIRAGAME_SQL,
    }
}
