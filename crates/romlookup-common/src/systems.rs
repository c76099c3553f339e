//! Canonical system enumeration and per-source platform id tables.
//!
//! Every metadata source numbers platforms its own way. Each source has one
//! authoritative forward table (vendor id → canonical system) below; the
//! reverse direction is derived from it once, on first use, so the two can
//! never drift apart.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::types::SourceKind;

/// Canonical platform enumeration, independent of any one source's schema.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[allow(clippy::upper_case_acronyms)]
pub enum SystemIdentifier {
    Atari2600,
    Atari5200,
    Atari7800,
    AtariLynx,
    AtariJaguar,
    AtariJaguarCD,
    ColecoVision,
    Intellivision,
    Vectrex,
    Odyssey2,
    NES,
    FDS,
    SNES,
    N64,
    GameCube,
    Wii,
    GB,
    GBC,
    GBA,
    DS,
    ThreeDS,
    VirtualBoy,
    PokemonMini,
    SG1000,
    MasterSystem,
    GameGear,
    Genesis,
    SegaCD,
    Sega32X,
    Saturn,
    Dreamcast,
    PSX,
    PSP,
    PCEngine,
    PCEngineCD,
    SuperGrafx,
    PCFX,
    NeoGeoPocket,
    NeoGeoPocketColor,
    WonderSwan,
    WonderSwanColor,
    ThreeDO,
    MAME,
    #[default]
    Unknown,
}

impl SystemIdentifier {
    /// Every known system, excluding [`SystemIdentifier::Unknown`].
    pub const ALL: &'static [SystemIdentifier] = &[
        Self::Atari2600,
        Self::Atari5200,
        Self::Atari7800,
        Self::AtariLynx,
        Self::AtariJaguar,
        Self::AtariJaguarCD,
        Self::ColecoVision,
        Self::Intellivision,
        Self::Vectrex,
        Self::Odyssey2,
        Self::NES,
        Self::FDS,
        Self::SNES,
        Self::N64,
        Self::GameCube,
        Self::Wii,
        Self::GB,
        Self::GBC,
        Self::GBA,
        Self::DS,
        Self::ThreeDS,
        Self::VirtualBoy,
        Self::PokemonMini,
        Self::SG1000,
        Self::MasterSystem,
        Self::GameGear,
        Self::Genesis,
        Self::SegaCD,
        Self::Sega32X,
        Self::Saturn,
        Self::Dreamcast,
        Self::PSX,
        Self::PSP,
        Self::PCEngine,
        Self::PCEngineCD,
        Self::SuperGrafx,
        Self::PCFX,
        Self::NeoGeoPocket,
        Self::NeoGeoPocketColor,
        Self::WonderSwan,
        Self::WonderSwanColor,
        Self::ThreeDO,
        Self::MAME,
    ];

    /// Stable lowercase identifier, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Atari2600 => "atari2600",
            Self::Atari5200 => "atari5200",
            Self::Atari7800 => "atari7800",
            Self::AtariLynx => "atarilynx",
            Self::AtariJaguar => "atarijaguar",
            Self::AtariJaguarCD => "atarijaguarcd",
            Self::ColecoVision => "colecovision",
            Self::Intellivision => "intellivision",
            Self::Vectrex => "vectrex",
            Self::Odyssey2 => "odyssey2",
            Self::NES => "nes",
            Self::FDS => "fds",
            Self::SNES => "snes",
            Self::N64 => "n64",
            Self::GameCube => "gamecube",
            Self::Wii => "wii",
            Self::GB => "gb",
            Self::GBC => "gbc",
            Self::GBA => "gba",
            Self::DS => "ds",
            Self::ThreeDS => "threeds",
            Self::VirtualBoy => "virtualboy",
            Self::PokemonMini => "pokemonmini",
            Self::SG1000 => "sg1000",
            Self::MasterSystem => "mastersystem",
            Self::GameGear => "gamegear",
            Self::Genesis => "genesis",
            Self::SegaCD => "segacd",
            Self::Sega32X => "sega32x",
            Self::Saturn => "saturn",
            Self::Dreamcast => "dreamcast",
            Self::PSX => "psx",
            Self::PSP => "psp",
            Self::PCEngine => "pcengine",
            Self::PCEngineCD => "pcenginecd",
            Self::SuperGrafx => "supergrafx",
            Self::PCFX => "pcfx",
            Self::NeoGeoPocket => "neogeopocket",
            Self::NeoGeoPocketColor => "neogeopocketcolor",
            Self::WonderSwan => "wonderswan",
            Self::WonderSwanColor => "wonderswancolor",
            Self::ThreeDO => "threedo",
            Self::MAME => "mame",
            Self::Unknown => "unknown",
        }
    }

    /// Folder name used by the libretro thumbnail host for this system.
    ///
    /// # Examples
    ///
    /// ```
    /// use romlookup_common::SystemIdentifier;
    ///
    /// assert_eq!(
    ///     SystemIdentifier::SegaCD.libretro_database_name(),
    ///     Some("Sega - Mega-CD - Sega CD")
    /// );
    /// assert_eq!(SystemIdentifier::Unknown.libretro_database_name(), None);
    /// ```
    pub fn libretro_database_name(&self) -> Option<&'static str> {
        let name = match self {
            Self::Atari2600 => "Atari - 2600",
            Self::Atari5200 => "Atari - 5200",
            Self::Atari7800 => "Atari - 7800",
            Self::AtariLynx => "Atari - Lynx",
            Self::AtariJaguar | Self::AtariJaguarCD => "Atari - Jaguar",
            Self::ColecoVision => "Coleco - ColecoVision",
            Self::Intellivision => "Mattel - Intellivision",
            Self::Vectrex => "GCE - Vectrex",
            Self::Odyssey2 => "Magnavox - Odyssey2",
            Self::NES => "Nintendo - Nintendo Entertainment System",
            Self::FDS => "Nintendo - Family Computer Disk System",
            Self::SNES => "Nintendo - Super Nintendo Entertainment System",
            Self::N64 => "Nintendo - Nintendo 64",
            Self::GameCube => "Nintendo - GameCube",
            Self::Wii => "Nintendo - Wii",
            Self::GB => "Nintendo - Game Boy",
            Self::GBC => "Nintendo - Game Boy Color",
            Self::GBA => "Nintendo - Game Boy Advance",
            Self::DS => "Nintendo - Nintendo DS",
            Self::ThreeDS => "Nintendo - Nintendo 3DS",
            Self::VirtualBoy => "Nintendo - Virtual Boy",
            Self::PokemonMini => "Nintendo - Pokemon Mini",
            Self::SG1000 => "Sega - SG-1000",
            Self::MasterSystem => "Sega - Master System - Mark III",
            Self::GameGear => "Sega - Game Gear",
            Self::Genesis => "Sega - Mega Drive - Genesis",
            Self::SegaCD => "Sega - Mega-CD - Sega CD",
            Self::Sega32X => "Sega - 32X",
            Self::Saturn => "Sega - Saturn",
            Self::Dreamcast => "Sega - Dreamcast",
            Self::PSX => "Sony - PlayStation",
            Self::PSP => "Sony - PlayStation Portable",
            Self::PCEngine => "NEC - PC Engine - TurboGrafx 16",
            Self::PCEngineCD => "NEC - PC Engine CD - TurboGrafx-CD",
            Self::SuperGrafx => "NEC - PC Engine SuperGrafx",
            Self::PCFX => "NEC - PC-FX",
            Self::NeoGeoPocket => "SNK - Neo Geo Pocket",
            Self::NeoGeoPocketColor => "SNK - Neo Geo Pocket Color",
            Self::WonderSwan => "Bandai - WonderSwan",
            Self::WonderSwanColor => "Bandai - WonderSwan Color",
            Self::ThreeDO => "The 3DO Company - 3DO",
            Self::MAME => "MAME",
            Self::Unknown => return None,
        };
        Some(name)
    }
}

impl fmt::Display for SystemIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemIdentifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("unknown") {
            return Ok(Self::Unknown);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|system| system.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown system identifier: {s}"))
    }
}

/// A source-specific platform identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VendorId {
    Numeric(i64),
    Text(String),
}

impl VendorId {
    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            Self::Numeric(id) => Some(*id),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Numeric(_) => None,
            Self::Text(id) => Some(id),
        }
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for VendorId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for VendorId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Forward tables
// ---------------------------------------------------------------------------

use SystemIdentifier as S;

/// OpenVGDB `SYSTEMS.systemID`.
const OPENVGDB_SYSTEMS: &[(i64, SystemIdentifier)] = &[
    (1, S::ThreeDO),
    (2, S::MAME),
    (3, S::Atari2600),
    (4, S::Atari5200),
    (5, S::Atari7800),
    (6, S::AtariLynx),
    (7, S::AtariJaguar),
    (8, S::AtariJaguarCD),
    (9, S::WonderSwan),
    (10, S::WonderSwanColor),
    (11, S::ColecoVision),
    (12, S::Vectrex),
    (13, S::Intellivision),
    (14, S::PCEngine),
    (15, S::PCEngineCD),
    (16, S::PCFX),
    (17, S::SuperGrafx),
    (18, S::FDS),
    (19, S::GB),
    (20, S::GBA),
    (21, S::GBC),
    (22, S::GameCube),
    (23, S::N64),
    (24, S::DS),
    (25, S::NES),
    (26, S::SNES),
    (27, S::VirtualBoy),
    (28, S::Wii),
    (29, S::Sega32X),
    (30, S::GameGear),
    (31, S::MasterSystem),
    (32, S::SegaCD),
    (33, S::Genesis),
    (34, S::Saturn),
    (35, S::SG1000),
    (36, S::PSX),
    (37, S::PSP),
    (38, S::Odyssey2),
    (39, S::PokemonMini),
    (40, S::NeoGeoPocket),
    (41, S::NeoGeoPocketColor),
    (42, S::Dreamcast),
    (43, S::ThreeDS),
];

/// libretro-database `platforms.id`.
const LIBRETRO_PLATFORMS: &[(i64, SystemIdentifier)] = &[
    (1, S::Atari2600),
    (2, S::Atari5200),
    (3, S::Atari7800),
    (4, S::AtariLynx),
    (5, S::AtariJaguar),
    (6, S::ColecoVision),
    (7, S::Intellivision),
    (8, S::Vectrex),
    (9, S::Odyssey2),
    (10, S::NES),
    (11, S::FDS),
    (12, S::SNES),
    (13, S::N64),
    (14, S::GameCube),
    (15, S::Wii),
    (16, S::GB),
    (17, S::GBC),
    (18, S::GBA),
    (19, S::DS),
    (20, S::ThreeDS),
    (21, S::VirtualBoy),
    (22, S::PokemonMini),
    (23, S::SG1000),
    (24, S::MasterSystem),
    (25, S::GameGear),
    (26, S::Genesis),
    (27, S::SegaCD),
    (28, S::Sega32X),
    (29, S::Saturn),
    (30, S::Dreamcast),
    (31, S::PSX),
    (32, S::PSP),
    (33, S::PCEngine),
    (34, S::PCEngineCD),
    (35, S::SuperGrafx),
    (36, S::PCFX),
    (37, S::NeoGeoPocket),
    (38, S::NeoGeoPocketColor),
    (39, S::WonderSwan),
    (40, S::WonderSwanColor),
    (41, S::ThreeDO),
    (42, S::MAME),
];

/// TheGamesDB `platforms.id`. Regional duplicates map to one system; the
/// first entry is the one used for reverse lookups.
const THEGAMESDB_PLATFORMS: &[(i64, SystemIdentifier)] = &[
    (22, S::Atari2600),
    (26, S::Atari5200),
    (27, S::Atari7800),
    (4924, S::AtariLynx),
    (28, S::AtariJaguar),
    (29, S::AtariJaguarCD),
    (31, S::ColecoVision),
    (32, S::Intellivision),
    (4939, S::Vectrex),
    (4927, S::Odyssey2),
    (7, S::NES),
    (4936, S::FDS),
    (6, S::SNES),
    (3, S::N64),
    (2, S::GameCube),
    (9, S::Wii),
    (4, S::GB),
    (41, S::GBC),
    (5, S::GBA),
    (8, S::DS),
    (4912, S::ThreeDS),
    (4918, S::VirtualBoy),
    (4957, S::PokemonMini),
    (4949, S::SG1000),
    (35, S::MasterSystem),
    (20, S::GameGear),
    (18, S::Genesis),
    (36, S::Genesis),
    (21, S::SegaCD),
    (33, S::Sega32X),
    (17, S::Saturn),
    (16, S::Dreamcast),
    (10, S::PSX),
    (13, S::PSP),
    (34, S::PCEngine),
    (4955, S::PCEngineCD),
    (4930, S::PCFX),
    (4922, S::NeoGeoPocket),
    (4923, S::NeoGeoPocketColor),
    (4925, S::WonderSwan),
    (4926, S::WonderSwanColor),
    (25, S::ThreeDO),
    (23, S::MAME),
];

/// ShiraGame `game.platform_id`.
const SHIRAGAME_PLATFORMS: &[(&str, SystemIdentifier)] = &[
    ("ATARI_2600", S::Atari2600),
    ("ATARI_5200", S::Atari5200),
    ("ATARI_7800", S::Atari7800),
    ("ATARI_LYNX", S::AtariLynx),
    ("ATARI_JAGUAR", S::AtariJaguar),
    ("COLECO_COLECOVISION", S::ColecoVision),
    ("MATTEL_INTELLIVISION", S::Intellivision),
    ("GCE_VECTREX", S::Vectrex),
    ("MAGNAVOX_ODYSSEY2", S::Odyssey2),
    ("NINTENDO_NES", S::NES),
    ("NINTENDO_FAMICOM_DISK_SYSTEM", S::FDS),
    ("NINTENDO_SNES", S::SNES),
    ("NINTENDO_N64", S::N64),
    ("NINTENDO_N64DD", S::N64),
    ("NINTENDO_GAMECUBE", S::GameCube),
    ("NINTENDO_WII", S::Wii),
    ("NINTENDO_GB", S::GB),
    ("NINTENDO_GBC", S::GBC),
    ("NINTENDO_GBA", S::GBA),
    ("NINTENDO_DS", S::DS),
    ("NINTENDO_DSI", S::DS),
    ("NINTENDO_3DS", S::ThreeDS),
    ("NINTENDO_VIRTUAL_BOY", S::VirtualBoy),
    ("NINTENDO_POKEMON_MINI", S::PokemonMini),
    ("SEGA_SG1000", S::SG1000),
    ("SEGA_MASTER_SYSTEM", S::MasterSystem),
    ("SEGA_GAME_GEAR", S::GameGear),
    ("SEGA_GENESIS", S::Genesis),
    ("SEGA_CD", S::SegaCD),
    ("SEGA_32X", S::Sega32X),
    ("SEGA_SATURN", S::Saturn),
    ("SEGA_DREAMCAST", S::Dreamcast),
    ("SONY_PLAYSTATION", S::PSX),
    ("SONY_PSP", S::PSP),
    ("NEC_PC_ENGINE", S::PCEngine),
    ("NEC_PC_ENGINE_CD", S::PCEngineCD),
    ("NEC_SUPERGRAFX", S::SuperGrafx),
    ("NEC_PC_FX", S::PCFX),
    ("SNK_NEOGEO_POCKET", S::NeoGeoPocket),
    ("SNK_NEOGEO_POCKET_COLOR", S::NeoGeoPocketColor),
    ("BANDAI_WONDERSWAN", S::WonderSwan),
    ("BANDAI_WONDERSWAN_COLOR", S::WonderSwanColor),
    ("PANASONIC_3DO", S::ThreeDO),
];

// ---------------------------------------------------------------------------
// Lookup maps
// ---------------------------------------------------------------------------

struct SystemTables {
    forward: HashMap<(SourceKind, VendorId), SystemIdentifier>,
    reverse: HashMap<(SourceKind, SystemIdentifier), VendorId>,
}

impl SystemTables {
    fn build() -> Self {
        let mut forward = HashMap::new();
        let mut reverse = HashMap::new();

        for source in SourceKind::ALL.iter().copied() {
            for (vendor, system) in forward_entries(source) {
                reverse
                    .entry((source, system))
                    .or_insert_with(|| vendor.clone());
                forward.insert((source, vendor), system);
            }
        }

        Self { forward, reverse }
    }
}

static TABLES: LazyLock<SystemTables> = LazyLock::new(SystemTables::build);

/// The authoritative forward table for `source`, in declaration order.
pub fn forward_entries(source: SourceKind) -> Vec<(VendorId, SystemIdentifier)> {
    match source {
        SourceKind::OpenVgdb => numeric_entries(OPENVGDB_SYSTEMS),
        SourceKind::Libretro => numeric_entries(LIBRETRO_PLATFORMS),
        SourceKind::TheGamesDb => numeric_entries(THEGAMESDB_PLATFORMS),
        SourceKind::ShiraGame => SHIRAGAME_PLATFORMS
            .iter()
            .map(|(id, system)| (VendorId::from(*id), *system))
            .collect(),
    }
}

fn numeric_entries(table: &[(i64, SystemIdentifier)]) -> Vec<(VendorId, SystemIdentifier)> {
    table
        .iter()
        .map(|(id, system)| (VendorId::Numeric(*id), *system))
        .collect()
}

/// Translate a source's vendor id into the canonical system.
///
/// Unknown ids yield `None`, never an error.
pub fn forward(source: SourceKind, vendor: &VendorId) -> Option<SystemIdentifier> {
    TABLES.forward.get(&(source, vendor.clone())).copied()
}

/// Translate a canonical system into the vendor id used by `source`.
pub fn reverse(source: SourceKind, system: SystemIdentifier) -> Option<VendorId> {
    TABLES.reverse.get(&(source, system)).cloned()
}

/// Every vendor id `source` uses for `system`, reverse target first.
///
/// Query filters use this rather than [`reverse`] so that rows filed under
/// a regional duplicate id still match.
pub fn vendor_ids(source: SourceKind, system: SystemIdentifier) -> Vec<VendorId> {
    forward_entries(source)
        .into_iter()
        .filter(|(_, s)| *s == system)
        .map(|(vendor, _)| vendor)
        .collect()
}

/// Shorthand for sources with integer platform ids.
pub fn forward_numeric(source: SourceKind, id: i64) -> Option<SystemIdentifier> {
    forward(source, &VendorId::Numeric(id))
}

/// Shorthand for sources with integer platform ids.
pub fn reverse_numeric(source: SourceKind, system: SystemIdentifier) -> Option<i64> {
    reverse(source, system).and_then(|id| id.as_numeric())
}
