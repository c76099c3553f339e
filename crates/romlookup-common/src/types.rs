//! Canonical record types shared by every metadata source.
//!
//! Each source decodes its own rows into these types; nothing downstream of an
//! adapter ever sees a source-specific schema. Enums serialize in lowercase.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::systems::SystemIdentifier;

/// Which backing database a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Curated primary metadata store.
    OpenVgdb,
    /// libretro-database ROM tables.
    Libretro,
    /// Local mirror of TheGamesDB.
    TheGamesDb,
    /// Hash-indexed secondary store, normally the fallback.
    ShiraGame,
}

impl SourceKind {
    /// All sources, in default precedence order.
    pub const ALL: &'static [SourceKind] = &[
        Self::OpenVgdb,
        Self::Libretro,
        Self::TheGamesDb,
        Self::ShiraGame,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenVgdb => "openvgdb",
            Self::Libretro => "libretro",
            Self::TheGamesDb => "thegamesdb",
            Self::ShiraGame => "shiragame",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown source: {s}"))
    }
}

/// Normalize a content hash to the canonical uppercase hex form.
///
/// Returns `None` for empty input or anything that is not hex.
///
/// # Examples
///
/// ```
/// use romlookup_common::normalize_hash;
///
/// assert_eq!(normalize_hash(" d41d8cd98f00b204 "), Some("D41D8CD98F00B204".to_string()));
/// assert_eq!(normalize_hash("not-a-hash"), None);
/// assert_eq!(normalize_hash(""), None);
/// ```
pub fn normalize_hash(hash: &str) -> Option<String> {
    let trimmed = hash.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(trimmed.to_ascii_uppercase())
}

/// Descriptive metadata for one ROM, possibly assembled from several sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomMetadata {
    pub title: Option<String>,
    pub system: SystemIdentifier,
    /// Uppercase hex MD5.
    pub md5: Option<String>,
    pub crc: Option<String>,
    pub file_name: Option<String>,
    pub serial: Option<String>,
    pub region: Option<String>,
    pub region_id: Option<i64>,
    pub genres: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub release_date: Option<String>,
    pub description: Option<String>,
    pub reference_url: Option<String>,
    pub box_image_url: Option<String>,
    pub box_back_url: Option<String>,
    pub release_id: Option<String>,
    /// The source that supplied the record (the highest-precedence one after a merge).
    pub source: Option<SourceKind>,
}

macro_rules! first_some {
    ($lhs:expr, $rhs:expr, $($field:ident),+ $(,)?) => {
        RomMetadata {
            $($field: $lhs.$field.clone().or_else(|| $rhs.$field.clone()),)+
            ..Default::default()
        }
    };
}

impl RomMetadata {
    /// Field-wise union with `other`.
    ///
    /// `self` wins wherever both sides carry a value, so folding records in
    /// precedence order yields the precedence-respecting merge. A non-null
    /// field is never replaced by null. `system` is taken from `other` only
    /// when `self.system` is `Unknown`.
    ///
    /// # Examples
    ///
    /// ```
    /// use romlookup_common::RomMetadata;
    ///
    /// let a = RomMetadata { title: Some("Foo".into()), ..Default::default() };
    /// let b = RomMetadata { genres: Some("Action".into()), ..Default::default() };
    /// let merged = a.merged_with(&b);
    /// assert_eq!(merged.title.as_deref(), Some("Foo"));
    /// assert_eq!(merged.genres.as_deref(), Some("Action"));
    /// ```
    #[must_use]
    pub fn merged_with(&self, other: &RomMetadata) -> RomMetadata {
        let mut merged = first_some!(
            self,
            other,
            title,
            md5,
            crc,
            file_name,
            serial,
            region,
            region_id,
            genres,
            developer,
            publisher,
            release_date,
            description,
            reference_url,
            box_image_url,
            box_back_url,
            release_id,
            source,
        );
        merged.system = if self.system == SystemIdentifier::Unknown {
            other.system
        } else {
            self.system
        };
        merged
    }

    /// Names of fields where both records hold different non-null values.
    pub fn conflicts_with(&self, other: &RomMetadata) -> Vec<&'static str> {
        let mine = self.to_field_map();
        let theirs = other.to_field_map();
        FIELD_NAMES
            .iter()
            .copied()
            .filter(|name| match (mine.get(*name), theirs.get(*name)) {
                (Some(a), Some(b)) => a != b,
                _ => false,
            })
            .collect()
    }

    /// Flatten the non-null fields into a string map, as stored in an
    /// [`ArtworkMapping`].
    pub fn to_field_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        };

        put("title", self.title.clone());
        if self.system != SystemIdentifier::Unknown {
            put("system", Some(self.system.to_string()));
        }
        put("md5", self.md5.clone());
        put("crc", self.crc.clone());
        put("file_name", self.file_name.clone());
        put("serial", self.serial.clone());
        put("region", self.region.clone());
        put("region_id", self.region_id.map(|id| id.to_string()));
        put("genres", self.genres.clone());
        put("developer", self.developer.clone());
        put("publisher", self.publisher.clone());
        put("release_date", self.release_date.clone());
        put("description", self.description.clone());
        put("reference_url", self.reference_url.clone());
        put("box_image_url", self.box_image_url.clone());
        put("box_back_url", self.box_back_url.clone());
        put("release_id", self.release_id.clone());
        put("source", self.source.map(|s| s.to_string()));
        map
    }
}

const FIELD_NAMES: &[&str] = &[
    "title",
    "system",
    "md5",
    "crc",
    "file_name",
    "serial",
    "region",
    "region_id",
    "genres",
    "developer",
    "publisher",
    "release_date",
    "description",
    "reference_url",
    "box_image_url",
    "box_back_url",
    "release_id",
];

/// Category of an artwork asset. Declaration order is display priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ArtworkType {
    BoxFront,
    BoxBack,
    Screenshot,
    TitleScreen,
    ClearLogo,
    Banner,
    FanArt,
    Manual,
    Other,
}

impl ArtworkType {
    pub const ALL: &'static [ArtworkType] = &[
        Self::BoxFront,
        Self::BoxBack,
        Self::Screenshot,
        Self::TitleScreen,
        Self::ClearLogo,
        Self::Banner,
        Self::FanArt,
        Self::Manual,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BoxFront => "boxfront",
            Self::BoxBack => "boxback",
            Self::Screenshot => "screenshot",
            Self::TitleScreen => "titlescreen",
            Self::ClearLogo => "clearlogo",
            Self::Banner => "banner",
            Self::FanArt => "fanart",
            Self::Manual => "manual",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ArtworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['_', '-'], "");
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| format!("unknown artwork type: {s}"))
    }
}

/// A single artwork image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtworkMetadata {
    pub url: String,
    pub artwork_type: ArtworkType,
    pub resolution: Option<String>,
    pub source: Option<SourceKind>,
    pub system: SystemIdentifier,
}

/// Full-corpus hash and filename index used for offline artwork lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkMapping {
    /// Uppercase MD5 → flattened record fields.
    pub rom_md5: HashMap<String, HashMap<String, String>>,
    /// File name → uppercase MD5.
    pub rom_file_name_to_md5: HashMap<String, String>,
}

impl ArtworkMapping {
    pub fn is_empty(&self) -> bool {
        self.rom_md5.is_empty() && self.rom_file_name_to_md5.is_empty()
    }

    /// Overlay `other` onto `self`; keys present in both take `other`'s value.
    pub fn extend(&mut self, other: ArtworkMapping) {
        self.rom_md5.extend(other.rom_md5);
        self.rom_file_name_to_md5.extend(other.rom_file_name_to_md5);
    }

    /// Index one record. Records without an MD5 are skipped.
    pub fn insert_record(&mut self, rom: &RomMetadata) {
        let Some(md5) = rom.md5.as_deref().and_then(normalize_hash) else {
            return;
        };
        if let Some(file_name) = &rom.file_name {
            self.rom_file_name_to_md5
                .insert(file_name.clone(), md5.clone());
        }
        self.rom_md5.insert(md5, rom.to_field_map());
    }
}
