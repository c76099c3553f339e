//! Shared test harness for integration tests.
//!
//! [`Fixture`] writes all four source databases into a temporary directory
//! and returns a [`Config`] pointing at them. The data set is small and
//! fixed:
//!
//! | ROM                                   | openvgdb | libretro | thegamesdb | shiragame |
//! |---------------------------------------|----------|----------|------------|-----------|
//! | Pitfall - The Mayan Adventure SNES    | yes      | yes      | yes        |           |
//! | Pitfall - The Mayan Adventure Genesis | yes      |          | yes        |           |
//! | Pitfall! Atari 2600                   |          |          |            | yes       |

#![allow(dead_code)]

use std::path::PathBuf;

use romlookup::config::{default_file_name, Config};
use romlookup::Lookup;
use romlookup_common::SourceKind;
use romlookup_db::fixtures::{
    create_database, insert_libretro_rom, insert_openvgdb_rom, insert_shiragame_rom,
    insert_thegamesdb_artwork, insert_thegamesdb_game, LibretroFixture, OpenVgdbFixture,
};
use tempfile::TempDir;

pub const PITFALL_SNES_MD5: &str = "A1B2C3D4E5F60718293A4B5C6D7E8F90";
pub const PITFALL_GENESIS_MD5: &str = "0F1E2D3C4B5A69788796A5B4C3D2E1F0";
/// Only present in the fallback source.
pub const PITFALL_2600_MD5: &str = "3E90CF23106F2E08B2781E41299DE556";
pub const MISSING_MD5: &str = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF";

pub const SNES_FILE: &str = "Pitfall - The Mayan Adventure (USA).sfc";
pub const GENESIS_FILE: &str = "Pitfall - The Mayan Adventure (USA).md";
pub const ATARI_FILE: &str = "Pitfall! (USA).a26";

pub const OPENVGDB_SNES_COVER: &str = "https://gamefaqs.gamespot.com/box/1/1_front.jpg";
pub const OPENVGDB_GENESIS_COVER: &str = "https://gamefaqs.gamespot.com/box/2/2_front.jpg";
pub const TGDB_SNES_GAME_ID: i64 = 100;

pub struct Fixture {
    pub dir: TempDir,
    pub config: Config,
}

impl Fixture {
    /// Create every source database with the standard data set.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        write_openvgdb(&dir);
        write_libretro(&dir);
        write_thegamesdb(&dir);
        write_shiragame(&dir);

        let mut config = Config::default();
        config.sources.data_dir = dir.path().to_path_buf();
        config.cache.path = dir.path().join("cache").join("artwork-mapping.json");
        config.lookup.init_wait_ms = 5000;

        Self { dir, config }
    }

    pub fn lookup(&self) -> Lookup {
        Lookup::from_config(self.config.clone()).unwrap()
    }

    pub fn database_path(&self, kind: SourceKind) -> PathBuf {
        self.dir.path().join(default_file_name(kind))
    }

    /// Write the config as TOML for the CLI.
    pub fn write_config(&self) -> PathBuf {
        let path = self.dir.path().join("romlookup.toml");
        std::fs::write(&path, toml::to_string(&self.config).unwrap()).unwrap();
        path
    }
}

fn write_openvgdb(dir: &TempDir) {
    let conn = create_database(
        &dir.path().join(default_file_name(SourceKind::OpenVgdb)),
        SourceKind::OpenVgdb,
    )
    .unwrap();

    insert_openvgdb_rom(
        &conn,
        &OpenVgdbFixture {
            rom_id: 1,
            system_id: 26,
            region_id: Some(21),
            md5: PITFALL_SNES_MD5,
            file_name: SNES_FILE,
            title: Some("Pitfall: The Mayan Adventure"),
            cover_front: Some(OPENVGDB_SNES_COVER),
            genre: None,
        },
    );
    insert_openvgdb_rom(
        &conn,
        &OpenVgdbFixture {
            rom_id: 2,
            system_id: 33,
            region_id: Some(21),
            md5: PITFALL_GENESIS_MD5,
            file_name: GENESIS_FILE,
            title: Some("Pitfall: The Mayan Adventure"),
            cover_front: Some(OPENVGDB_GENESIS_COVER),
            genre: Some("Action"),
        },
    );
}

fn write_libretro(dir: &TempDir) {
    let conn = create_database(
        &dir.path().join(default_file_name(SourceKind::Libretro)),
        SourceKind::Libretro,
    )
    .unwrap();

    // Stored lowercase; lookups must still match.
    let md5 = PITFALL_SNES_MD5.to_lowercase();
    insert_libretro_rom(
        &conn,
        &LibretroFixture {
            rom_id: 1,
            game_id: 1,
            platform_id: 12,
            md5: Some(&md5),
            file_name: SNES_FILE,
            full_name: "Pitfall - The Mayan Adventure (USA)",
            display_name: "Pitfall - The Mayan Adventure",
            genre: Some("Platform"),
            developer: Some("Activision"),
        },
    );
}

fn write_thegamesdb(dir: &TempDir) {
    let conn = create_database(
        &dir.path().join(default_file_name(SourceKind::TheGamesDb)),
        SourceKind::TheGamesDb,
    )
    .unwrap();

    insert_thegamesdb_game(&conn, TGDB_SNES_GAME_ID, "Pitfall - The Mayan Adventure", 6);
    insert_thegamesdb_artwork(&conn, TGDB_SNES_GAME_ID, "screenshot", None, "screenshots/100-1.jpg");
    insert_thegamesdb_artwork(&conn, TGDB_SNES_GAME_ID, "boxart", Some("front"), "boxart/front/100-1.jpg");
    insert_thegamesdb_artwork(&conn, TGDB_SNES_GAME_ID, "boxart", Some("back"), "boxart/back/100-1.jpg");

    insert_thegamesdb_game(&conn, 101, "Pitfall - The Mayan Adventure", 18);
    insert_thegamesdb_artwork(&conn, 101, "boxart", Some("front"), "boxart/front/101-1.jpg");
}

fn write_shiragame(dir: &TempDir) {
    let conn = create_database(
        &dir.path().join(default_file_name(SourceKind::ShiraGame)),
        SourceKind::ShiraGame,
    )
    .unwrap();

    insert_shiragame_rom(
        &conn,
        5,
        "ATARI_2600",
        "Pitfall! (USA)",
        ATARI_FILE,
        &PITFALL_2600_MD5.to_lowercase(),
    );
}
