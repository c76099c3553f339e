//! Multi-source lookup orchestration.
//!
//! [`Lookup`] owns one [`SourceSlot`] per enabled source and answers every
//! query by fanning out to the sources concurrently, then combining their
//! answers in precedence order. Source failures never reach the caller: a
//! failing or still-initializing source simply contributes nothing.

mod slot;

pub use slot::{Acquired, SourceOpener, SourceSlot, SourceState};

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, FutureExt};
use romlookup_common::paths::system_for_extension;
use romlookup_common::systems::{reverse, VendorId};
use romlookup_common::{
    normalize_hash, ArtworkMapping, ArtworkMetadata, ArtworkType, Error, RomMetadata, SourceKind,
    SystemIdentifier,
};
use tracing::{debug, warn};

use crate::artwork::{dedup_urls, rank_artwork, retain_valid, ArtworkValidator, MappingCache};
use crate::config::{validate_config, Config, FallbackPolicy};
use crate::sources::{open_source, MetadataSource};

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builds a [`Lookup`] from configuration, optionally replacing how
/// individual sources are opened.
pub struct LookupBuilder {
    config: Config,
    openers: HashMap<SourceKind, SourceOpener>,
}

impl LookupBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            openers: HashMap::new(),
        }
    }

    /// Open `kind` with `opener` instead of from its configured database.
    pub fn opener(mut self, kind: SourceKind, opener: SourceOpener) -> Self {
        self.openers.insert(kind, opener);
        self
    }

    /// Use an already constructed source for its kind.
    pub fn source(self, source: Arc<dyn MetadataSource>) -> Self {
        let kind = source.kind();
        self.opener(
            kind,
            Arc::new(move || {
                let source = source.clone();
                async move { Ok::<_, anyhow::Error>(source) }.boxed()
            }),
        )
    }

    /// Validate the configuration and create the source slots.
    ///
    /// No database is opened here. With `lookup.eager_init` set and a Tokio
    /// runtime available, every source starts initializing in the background.
    pub fn build(mut self) -> romlookup_common::Result<Lookup> {
        validate_config(&self.config).map_err(|e| Error::invalid_config(format!("{e:#}")))?;

        let config = &self.config;
        let mut make_slot = |kind: SourceKind| {
            let opener = self.openers.remove(&kind).unwrap_or_else(|| {
                database_opener(
                    kind,
                    config.sources.database_path(kind),
                    config.artwork.thumbnails_base_url.clone(),
                )
            });
            Arc::new(SourceSlot::new(kind, opener))
        };

        let primaries: Vec<Arc<SourceSlot>> = config
            .sources
            .enabled_primaries()
            .into_iter()
            .map(&mut make_slot)
            .collect();
        let fallback = config.sources.enabled_fallback().map(&mut make_slot);

        let lookup = Lookup {
            primaries,
            fallback,
            init_wait: Duration::from_millis(config.lookup.init_wait_ms),
            fallback_policy: config.lookup.fallback_policy,
            validate_candidates: config.artwork.validate_candidates,
            validator: Arc::new(ArtworkValidator::new(&config.artwork)),
            mapping_cache: Arc::new(MappingCache::new(
                config.cache.resolved_path(),
                config.cache.ttl_hours,
            )),
        };

        debug!(
            primaries = ?lookup.primaries.iter().map(|s| s.kind()).collect::<Vec<_>>(),
            fallback = ?lookup.fallback.as_ref().map(|s| s.kind()),
            "Lookup configured"
        );

        if config.lookup.eager_init {
            lookup.warm_up();
        }
        Ok(lookup)
    }
}

/// Opener that reads the source's SQLite database from disk.
fn database_opener(kind: SourceKind, path: PathBuf, thumbnails_base_url: String) -> SourceOpener {
    Arc::new(move || {
        let path = path.clone();
        let thumbnails_base_url = thumbnails_base_url.clone();
        async move { open_source(kind, &path, &thumbnails_base_url).await }.boxed()
    })
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Query engine over all configured metadata sources.
///
/// Cheap to share behind an `Arc`; all operations take `&self`.
pub struct Lookup {
    /// Enabled primary sources, highest precedence first
    primaries: Vec<Arc<SourceSlot>>,
    fallback: Option<Arc<SourceSlot>>,
    init_wait: Duration,
    fallback_policy: FallbackPolicy,
    validate_candidates: bool,
    validator: Arc<ArtworkValidator>,
    mapping_cache: Arc<MappingCache>,
}

impl std::fmt::Debug for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lookup")
            .field("init_wait", &self.init_wait)
            .field("fallback_policy", &self.fallback_policy)
            .field("validate_candidates", &self.validate_candidates)
            .finish_non_exhaustive()
    }
}

impl Lookup {
    /// Build a lookup that opens every source from its configured database.
    pub fn from_config(config: Config) -> romlookup_common::Result<Self> {
        LookupBuilder::new(config).build()
    }

    pub fn builder(config: Config) -> LookupBuilder {
        LookupBuilder::new(config)
    }

    /// Enabled sources in precedence order, fallback last.
    pub fn enabled_sources(&self) -> Vec<SourceKind> {
        self.all_slots().iter().map(|slot| slot.kind()).collect()
    }

    /// Start initializing every source in the background.
    ///
    /// Does nothing outside a Tokio runtime.
    pub fn warm_up(&self) {
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("No Tokio runtime, skipping source warm-up");
            return;
        }
        for slot in self.all_slots() {
            slot.warm_up();
        }
    }

    /// Current initialization state of each enabled source.
    pub fn source_states(&self) -> Vec<(SourceKind, SourceState)> {
        self.all_slots()
            .iter()
            .map(|slot| (slot.kind(), slot.state()))
            .collect()
    }

    /// Initialize every source, waiting up to the init wait for each, and
    /// report the resulting states.
    pub async fn initialize(&self) -> Vec<(SourceKind, SourceState)> {
        let slots = self.all_slots();
        join_all(slots.iter().map(|slot| slot.acquire(self.init_wait))).await;
        self.source_states()
    }

    fn all_slots(&self) -> Vec<Arc<SourceSlot>> {
        self.primaries
            .iter()
            .chain(self.fallback.iter())
            .cloned()
            .collect()
    }

    fn slot(&self, kind: SourceKind) -> Option<Arc<SourceSlot>> {
        self.all_slots().into_iter().find(|slot| slot.kind() == kind)
    }

    // -----------------------------------------------------------------------
    // Fan-out
    // -----------------------------------------------------------------------

    /// Run `query` against every slot concurrently.
    ///
    /// Results come back in slot order. A source that is unavailable, still
    /// initializing after the init wait, or whose query fails yields `None`.
    async fn fan_out<T, F, Fut>(
        &self,
        slots: &[Arc<SourceSlot>],
        operation: &'static str,
        query: F,
    ) -> Vec<(SourceKind, Option<T>)>
    where
        T: Send + 'static,
        F: Fn(Arc<dyn MetadataSource>) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let wait = self.init_wait;
        let tasks = slots.iter().map(|slot| {
            let slot = slot.clone();
            let query = query.clone();
            tokio::spawn(async move {
                let kind = slot.kind();
                let Acquired::Ready(source) = slot.acquire(wait).await else {
                    return None;
                };
                match query(source).await {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!(source = %kind, operation, error = %e, "Source query failed");
                        None
                    }
                }
            })
        });
        let outcomes = join_all(tasks).await;

        slots
            .iter()
            .zip(outcomes)
            .map(|(slot, outcome)| {
                let value = outcome.unwrap_or_else(|e| {
                    warn!(source = %slot.kind(), operation, error = %e, "Source task panicked");
                    None
                });
                (slot.kind(), value)
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    /// Look up one ROM by MD5.
    ///
    /// Each primary source's first candidate is merged in precedence order,
    /// so higher-precedence values win and gaps are filled from the rest.
    /// The fallback source is consulted afterwards according to the
    /// configured [`FallbackPolicy`].
    ///
    /// # Returns
    ///
    /// `None` when the hash is malformed or no source knows it.
    pub async fn search_by_hash(
        &self,
        md5: &str,
        system: Option<SystemIdentifier>,
    ) -> Option<RomMetadata> {
        let Some(md5) = normalize_hash(md5) else {
            debug!(md5 = %md5, "Ignoring malformed hash");
            return None;
        };

        let query = hash_query(md5.clone(), system);
        let results = self
            .fan_out(&self.primaries, "search_by_hash", query.clone())
            .await;
        let merged = merge_candidates(
            results
                .into_iter()
                .map(|(kind, records)| (kind, records.unwrap_or_default())),
        );

        let Some(fallback) = &self.fallback else {
            return merged;
        };
        let mismatch = match (&merged, system) {
            (Some(rom), Some(wanted)) => rom.system != wanted,
            _ => false,
        };
        let consult = merged.is_none()
            || (mismatch && self.fallback_policy == FallbackPolicy::WhenEmptyOrSystemMismatch);
        if !consult {
            return merged;
        }

        debug!(md5 = %md5, source = %fallback.kind(), mismatch, "Consulting fallback source");
        let from_fallback = self
            .fan_out(std::slice::from_ref(fallback), "search_by_hash", query)
            .await
            .into_iter()
            .next()
            .and_then(|(_, records)| records)
            .and_then(|records| records.into_iter().next());

        // On a mismatch the fallback record describes the requested system,
        // so it replaces the primary answer rather than merging with it.
        from_fallback.or(merged)
    }

    /// File name search, optionally restricted to one system.
    pub async fn search_by_filename(
        &self,
        filename: &str,
        system: Option<SystemIdentifier>,
    ) -> Option<Vec<RomMetadata>> {
        let systems: Vec<SystemIdentifier> = system.into_iter().collect();
        self.search_by_filename_across_systems(filename, &systems)
            .await
    }

    /// File name search across every enabled source, fallback included.
    ///
    /// Each source's candidates are deduplicated, tagged with the source and
    /// concatenated in precedence order. An empty `systems` slice means no
    /// filter; otherwise only records of the listed systems are returned.
    pub async fn search_by_filename_across_systems(
        &self,
        filename: &str,
        systems: &[SystemIdentifier],
    ) -> Option<Vec<RomMetadata>> {
        let filename = filename.trim();
        if filename.is_empty() {
            return None;
        }

        let term = filename.to_string();
        let filter = systems.to_vec();
        let results = self
            .fan_out(&self.all_slots(), "search_by_filename", move |source| {
                let term = term.clone();
                let filter = filter.clone();
                async move { source.search_by_filename(&term, &filter).await }
            })
            .await;

        let mut records = Vec::new();
        for (kind, found) in results {
            let mut found = dedup_records(found.unwrap_or_default());
            found.retain(|rom| systems.is_empty() || systems.contains(&rom.system));
            for rom in &mut found {
                rom.source = Some(kind);
            }
            records.extend(found);
        }

        debug!(filename = %filename, results = records.len(), "File name search finished");
        non_empty_vec(records)
    }

    /// Identify the system of a ROM.
    ///
    /// Tries the hash first, then a file name search (preferring the system
    /// implied by the extension when it is among the candidates), then the
    /// extension alone.
    pub async fn resolve_system_identifier(
        &self,
        md5: Option<&str>,
        filename: Option<&str>,
    ) -> Option<SystemIdentifier> {
        if let Some(md5) = md5 {
            if let Some(rom) = self.search_by_hash(md5, None).await {
                if rom.system != SystemIdentifier::Unknown {
                    debug!(md5 = %md5, system = %rom.system, "System resolved by hash");
                    return Some(rom.system);
                }
            }
        }

        let filename = filename.map(str::trim).filter(|f| !f.is_empty())?;
        let by_extension = system_for_extension(Path::new(filename));
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(filename);

        if let Some(candidates) = self.search_by_filename(name, None).await {
            let known: Vec<SystemIdentifier> = candidates
                .iter()
                .map(|rom| rom.system)
                .filter(|system| *system != SystemIdentifier::Unknown)
                .collect();
            let chosen = by_extension
                .filter(|ext| known.contains(ext))
                .or_else(|| known.first().copied());
            if let Some(system) = chosen {
                debug!(filename = %filename, system = %system, "System resolved by file name");
                return Some(system);
            }
        }

        if let Some(system) = by_extension {
            debug!(filename = %filename, system = %system, "System resolved by extension");
        }
        by_extension
    }

    /// The system of a ROM expressed as `source`'s own platform id.
    pub async fn resolve_vendor_system_id(
        &self,
        source: SourceKind,
        md5: Option<&str>,
        filename: Option<&str>,
    ) -> Option<VendorId> {
        let system = self.resolve_system_identifier(md5, filename).await?;
        reverse(source, system)
    }

    // -----------------------------------------------------------------------
    // Artwork
    // -----------------------------------------------------------------------

    /// Candidate artwork URLs for a ROM from every enabled source.
    ///
    /// URLs are deduplicated in precedence order. With
    /// `artwork.validate_candidates` set, only URLs that pass validation are
    /// returned.
    pub async fn get_artwork_urls(&self, rom: &RomMetadata) -> Option<Vec<String>> {
        if rom.system == SystemIdentifier::Unknown {
            debug!(title = ?rom.title, "No artwork lookup for unknown system");
            return None;
        }

        let rom = Arc::new(rom.clone());
        let results = self
            .fan_out(&self.all_slots(), "artwork_urls", move |source| {
                let rom = rom.clone();
                async move { source.artwork_urls(&rom).await }
            })
            .await;

        let mut urls = dedup_urls(
            results
                .into_iter()
                .flat_map(|(_, urls)| urls.unwrap_or_default()),
        );
        if self.validate_candidates && !urls.is_empty() {
            let before = urls.len();
            urls = retain_valid(&self.validator, urls).await;
            debug!(candidates = before, valid = urls.len(), "Validated artwork candidates");
        }
        non_empty_vec(urls)
    }

    /// Artwork for games whose name contains `name`, best types first.
    pub async fn search_artwork_by_name(
        &self,
        name: &str,
        system: Option<SystemIdentifier>,
        types: Option<&[ArtworkType]>,
    ) -> Option<Vec<ArtworkMetadata>> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let term = name.to_string();
        let types: Option<Vec<ArtworkType>> = types.map(<[ArtworkType]>::to_vec);
        let results = self
            .fan_out(&self.all_slots(), "search_artwork", move |source| {
                let term = term.clone();
                let types = types.clone();
                async move {
                    source
                        .search_artwork(&term, system, types.as_deref())
                        .await
                }
            })
            .await;

        non_empty_vec(rank_artwork(
            results
                .into_iter()
                .flat_map(|(_, artwork)| artwork.unwrap_or_default()),
        ))
    }

    /// Artwork for a game or release id native to `source`.
    pub async fn get_artwork_for_id(
        &self,
        source: SourceKind,
        id: &str,
    ) -> Option<Vec<ArtworkMetadata>> {
        let Some(slot) = self.slot(source) else {
            debug!(source = %source, "Source is not enabled");
            return None;
        };

        let id = id.trim().to_string();
        let results = self
            .fan_out(&[slot], "artwork_for_id", move |source| {
                let id = id.clone();
                async move { source.artwork_for_id(&id).await }
            })
            .await;

        non_empty_vec(rank_artwork(
            results
                .into_iter()
                .flat_map(|(_, artwork)| artwork.unwrap_or_default()),
        ))
    }

    /// Hash and file name index over all enabled sources.
    ///
    /// Served from the mapping cache; rebuilt when stale.
    pub async fn get_full_artwork_mapping(&self) -> Arc<ArtworkMapping> {
        self.mapping_cache
            .get_or_rebuild(|| self.build_artwork_mapping())
            .await
    }

    /// Combine every source's mapping in enabled order; later sources
    /// overwrite earlier ones key by key.
    async fn build_artwork_mapping(&self) -> anyhow::Result<ArtworkMapping> {
        let results = self
            .fan_out(&self.all_slots(), "artwork_mappings", |source| async move {
                source.artwork_mappings().await
            })
            .await;

        let mut mapping = ArtworkMapping::default();
        let mut contributors = Vec::new();
        for (kind, partial) in results {
            if let Some(partial) = partial.filter(|m| !m.is_empty()) {
                contributors.push(kind);
                mapping.extend(partial);
            }
        }

        if contributors.is_empty() {
            anyhow::bail!("no source contributed to the artwork mapping");
        }
        debug!(sources = ?contributors, "Built artwork mapping");
        Ok(mapping)
    }

    /// Structural and reachability check for an artwork URL.
    pub async fn validate_artwork_url(&self, url: &str) -> bool {
        self.validator.validate_url(url).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hash_query(
    md5: String,
    system: Option<SystemIdentifier>,
) -> impl Fn(Arc<dyn MetadataSource>) -> futures::future::BoxFuture<'static, anyhow::Result<Vec<RomMetadata>>>
       + Clone
       + Send
       + 'static {
    move |source| {
        let md5 = md5.clone();
        async move { source.search_by_hash(&md5, system).await }.boxed()
    }
}

/// Fold each source's first candidate in precedence order.
fn merge_candidates(
    results: impl IntoIterator<Item = (SourceKind, Vec<RomMetadata>)>,
) -> Option<RomMetadata> {
    let mut merged: Option<RomMetadata> = None;
    for (kind, records) in results {
        let Some(candidate) = records.into_iter().next() else {
            continue;
        };
        merged = Some(match merged {
            None => candidate,
            Some(current) => {
                let conflicts = current.conflicts_with(&candidate);
                if !conflicts.is_empty() {
                    debug!(source = %kind, fields = ?conflicts, "Kept higher-precedence values");
                }
                current.merged_with(&candidate)
            }
        });
    }
    merged
}

#[derive(PartialEq, Eq, Hash)]
enum DedupKey {
    File(Option<String>, Option<String>, SystemIdentifier),
    /// Title-only records (no hash, no file name)
    Title(Option<String>, SystemIdentifier),
}

fn dedup_key(rom: &RomMetadata) -> DedupKey {
    if rom.md5.is_none() && rom.file_name.is_none() {
        DedupKey::Title(rom.title.as_deref().map(str::to_lowercase), rom.system)
    } else {
        DedupKey::File(rom.md5.clone(), rom.file_name.clone(), rom.system)
    }
}

/// Drop repeated `(md5, file_name, system)` records, keeping the first.
fn dedup_records(records: Vec<RomMetadata>) -> Vec<RomMetadata> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|rom| seen.insert(dedup_key(rom)))
        .collect()
}

fn non_empty_vec<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
