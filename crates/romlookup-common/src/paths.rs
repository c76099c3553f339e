//! Filename helpers for system detection and search terms.
//!
//! Only extensions that identify exactly one system are listed. Shared disc
//! and archive formats (`iso`, `bin`, `cue`, `chd`, `zip`) resolve to nothing.

use std::path::Path;

use crate::systems::SystemIdentifier;

/// Extensions that belong to a single system.
const UNIQUE_EXTENSIONS: &[(&str, SystemIdentifier)] = &[
    ("a26", SystemIdentifier::Atari2600),
    ("a52", SystemIdentifier::Atari5200),
    ("a78", SystemIdentifier::Atari7800),
    ("lnx", SystemIdentifier::AtariLynx),
    ("j64", SystemIdentifier::AtariJaguar),
    ("jag", SystemIdentifier::AtariJaguar),
    ("col", SystemIdentifier::ColecoVision),
    ("int", SystemIdentifier::Intellivision),
    ("vec", SystemIdentifier::Vectrex),
    ("o2", SystemIdentifier::Odyssey2),
    ("nes", SystemIdentifier::NES),
    ("fds", SystemIdentifier::FDS),
    ("sfc", SystemIdentifier::SNES),
    ("smc", SystemIdentifier::SNES),
    ("n64", SystemIdentifier::N64),
    ("z64", SystemIdentifier::N64),
    ("v64", SystemIdentifier::N64),
    ("gcm", SystemIdentifier::GameCube),
    ("wbfs", SystemIdentifier::Wii),
    ("gb", SystemIdentifier::GB),
    ("gbc", SystemIdentifier::GBC),
    ("gba", SystemIdentifier::GBA),
    ("nds", SystemIdentifier::DS),
    ("3ds", SystemIdentifier::ThreeDS),
    ("vb", SystemIdentifier::VirtualBoy),
    ("min", SystemIdentifier::PokemonMini),
    ("sg", SystemIdentifier::SG1000),
    ("sms", SystemIdentifier::MasterSystem),
    ("gg", SystemIdentifier::GameGear),
    ("md", SystemIdentifier::Genesis),
    ("gen", SystemIdentifier::Genesis),
    ("smd", SystemIdentifier::Genesis),
    ("32x", SystemIdentifier::Sega32X),
    ("pbp", SystemIdentifier::PSP),
    ("cso", SystemIdentifier::PSP),
    ("pce", SystemIdentifier::PCEngine),
    ("sgx", SystemIdentifier::SuperGrafx),
    ("ngp", SystemIdentifier::NeoGeoPocket),
    ("ngc", SystemIdentifier::NeoGeoPocketColor),
    ("ws", SystemIdentifier::WonderSwan),
    ("wsc", SystemIdentifier::WonderSwanColor),
];

/// Guess the system from a file's extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use romlookup_common::paths::system_for_extension;
/// use romlookup_common::SystemIdentifier;
///
/// assert_eq!(system_for_extension(Path::new("Pitfall (USA).SFC")), Some(SystemIdentifier::SNES));
/// assert_eq!(system_for_extension(Path::new("disc.iso")), None);
/// ```
pub fn system_for_extension(path: &Path) -> Option<SystemIdentifier> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    UNIQUE_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, system)| *system)
}

/// Strip directories and the extension, keeping region and revision tags.
///
/// ```
/// use romlookup_common::paths::file_stem;
///
/// assert_eq!(file_stem("roms/snes/Pitfall (USA).sfc"), "Pitfall (USA)");
/// ```
pub fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

/// Reduce a filename to its bare title: no extension, no `(...)`/`[...]` tags.
///
/// ```
/// use romlookup_common::paths::base_title;
///
/// assert_eq!(base_title("Pitfall - The Mayan Adventure (USA) [!].sfc"), "Pitfall - The Mayan Adventure");
/// ```
pub fn base_title(file_name: &str) -> String {
    let stem = file_stem(file_name);
    let mut out = String::with_capacity(stem.len());
    let mut depth = 0usize;

    for c in stem.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_for_extension() {
        assert_eq!(
            system_for_extension(Path::new("game.sfc")),
            Some(SystemIdentifier::SNES)
        );
        assert_eq!(
            system_for_extension(Path::new("/roms/game.GBA")),
            Some(SystemIdentifier::GBA)
        );
        assert_eq!(
            system_for_extension(Path::new("game.z64")),
            Some(SystemIdentifier::N64)
        );

        // Shared formats
        assert_eq!(system_for_extension(Path::new("game.bin")), None);
        assert_eq!(system_for_extension(Path::new("game.cue")), None);
        assert_eq!(system_for_extension(Path::new("no_extension")), None);
    }

    #[test]
    fn test_extensions_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for (ext, _) in UNIQUE_EXTENSIONS {
            assert!(seen.insert(*ext), "duplicate extension {ext}");
        }
    }

    #[test]
    fn test_base_title() {
        assert_eq!(base_title("Sonic the Hedgehog (USA, Europe).md"), "Sonic the Hedgehog");
        assert_eq!(base_title("Tetris (World) (Rev 1) [b].gb"), "Tetris");
        assert_eq!(base_title("Plain Name"), "Plain Name");
        // Unbalanced tags do not swallow the rest of the name
        assert_eq!(base_title("Odd) Name.nes"), "Odd Name");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("a/b/Game (USA).nes"), "Game (USA)");
        assert_eq!(file_stem("Game"), "Game");
    }
}
