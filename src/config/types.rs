use romlookup_common::SourceKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub artwork: ArtworkConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    /// Directory holding the source databases under their default names
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Primary sources in precedence order (highest first)
    #[serde(default = "default_order")]
    pub order: Vec<SourceKind>,

    /// Source consulted only when the primaries find nothing
    #[serde(default = "default_fallback")]
    pub fallback: Option<SourceKind>,

    #[serde(default)]
    pub openvgdb: SourceEntry,

    #[serde(default)]
    pub libretro: SourceEntry,

    #[serde(default)]
    pub thegamesdb: SourceEntry,

    #[serde(default)]
    pub shiragame: SourceEntry,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.local/share/romlookup")
}

fn default_order() -> Vec<SourceKind> {
    vec![
        SourceKind::OpenVgdb,
        SourceKind::Libretro,
        SourceKind::TheGamesDb,
    ]
}

fn default_fallback() -> Option<SourceKind> {
    Some(SourceKind::ShiraGame)
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            order: default_order(),
            fallback: default_fallback(),
            openvgdb: SourceEntry::default(),
            libretro: SourceEntry::default(),
            thegamesdb: SourceEntry::default(),
            shiragame: SourceEntry::default(),
        }
    }
}

impl SourcesConfig {
    pub fn entry(&self, kind: SourceKind) -> &SourceEntry {
        match kind {
            SourceKind::OpenVgdb => &self.openvgdb,
            SourceKind::Libretro => &self.libretro,
            SourceKind::TheGamesDb => &self.thegamesdb,
            SourceKind::ShiraGame => &self.shiragame,
        }
    }

    pub fn entry_mut(&mut self, kind: SourceKind) -> &mut SourceEntry {
        match kind {
            SourceKind::OpenVgdb => &mut self.openvgdb,
            SourceKind::Libretro => &mut self.libretro,
            SourceKind::TheGamesDb => &mut self.thegamesdb,
            SourceKind::ShiraGame => &mut self.shiragame,
        }
    }

    /// Database file for a source: its explicit `path`, else the default
    /// file name inside `data_dir`. `~` is expanded.
    pub fn database_path(&self, kind: SourceKind) -> PathBuf {
        match &self.entry(kind).path {
            Some(path) => expand_path(path),
            None => expand_path(&self.data_dir).join(default_file_name(kind)),
        }
    }

    /// Enabled primary sources, in precedence order.
    pub fn enabled_primaries(&self) -> Vec<SourceKind> {
        self.order
            .iter()
            .copied()
            .filter(|kind| self.entry(*kind).enabled)
            .collect()
    }

    /// The fallback source, if configured and enabled.
    pub fn enabled_fallback(&self) -> Option<SourceKind> {
        self.fallback.filter(|kind| self.entry(*kind).enabled)
    }
}

/// File name each source is expected under in `data_dir`.
pub fn default_file_name(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::OpenVgdb => "openvgdb.sqlite",
        SourceKind::Libretro => "libretrodb.sqlite",
        SourceKind::TheGamesDb => "thegamesdb.sqlite",
        SourceKind::ShiraGame => "shiragame.sqlite",
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceEntry {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Explicit database file (overrides `data_dir`)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for SourceEntry {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// When the fallback source is consulted after the primaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Only when the primaries found nothing.
    #[default]
    WhenEmpty,
    /// Also when a system filter was given and the merged primary result
    /// reports a different system.
    WhenEmptyOrSystemMismatch,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupConfig {
    /// How long a query waits for a still-initializing source (milliseconds)
    #[serde(default = "default_init_wait_ms")]
    pub init_wait_ms: u64,

    /// Open every enabled source in the background at construction
    #[serde(default)]
    pub eager_init: bool,

    #[serde(default)]
    pub fallback_policy: FallbackPolicy,
}

fn default_init_wait_ms() -> u64 {
    2000
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            init_wait_ms: default_init_wait_ms(),
            eager_init: false,
            fallback_policy: FallbackPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Artwork
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtworkConfig {
    /// Root of the libretro thumbnail host
    #[serde(default = "default_thumbnails_base_url")]
    pub thumbnails_base_url: String,

    #[serde(default = "default_allowed_schemes")]
    pub allowed_schemes: Vec<String>,

    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,

    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// How long a successful probe is trusted (seconds)
    #[serde(default = "default_validation_ttl_secs")]
    pub validation_ttl_secs: u64,

    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Filter `get_artwork_urls` results through the validator
    #[serde(default)]
    pub validate_candidates: bool,
}

fn default_thumbnails_base_url() -> String {
    "https://thumbnails.libretro.com".to_string()
}

fn default_allowed_schemes() -> Vec<String> {
    vec!["https".to_string()]
}

fn default_allowed_hosts() -> Vec<String> {
    vec![
        "thumbnails.libretro.com".to_string(),
        "gamefaqs.gamespot.com".to_string(),
        "cdn.thegamesdb.net".to_string(),
    ]
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()]
}

fn default_validation_ttl_secs() -> u64 {
    3600
}

fn default_probe_timeout_secs() -> u64 {
    10
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            thumbnails_base_url: default_thumbnails_base_url(),
            allowed_schemes: default_allowed_schemes(),
            allowed_hosts: default_allowed_hosts(),
            allowed_extensions: default_allowed_extensions(),
            validation_ttl_secs: default_validation_ttl_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            validate_candidates: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Where the artwork mapping is persisted
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    /// Age after which the persisted mapping is rebuilt (hours)
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("~/.cache/romlookup/artwork-mapping.json")
}

/// Upper bound for `cache.ttl_hours` (one hundred years).
pub const MAX_CACHE_TTL_HOURS: u64 = 24 * 365 * 100;

fn default_ttl_hours() -> u64 {
    24
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            ttl_hours: default_ttl_hours(),
        }
    }
}

impl CacheConfig {
    pub fn resolved_path(&self) -> PathBuf {
        expand_path(&self.path)
    }
}

/// Expand a leading `~` in a configured path.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}
