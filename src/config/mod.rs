mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./romlookup.toml",
        "~/.config/romlookup/config.toml",
        "/etc/romlookup/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let sources = &config.sources;

    let mut seen = HashSet::new();
    for kind in &sources.order {
        if !seen.insert(*kind) {
            anyhow::bail!("Source '{}' is listed more than once in sources.order", kind);
        }
    }

    if let Some(fallback) = sources.fallback {
        if sources.order.contains(&fallback) {
            anyhow::bail!(
                "Source '{}' cannot be both a primary source and the fallback",
                fallback
            );
        }
    }

    for kind in sources.order.iter().chain(sources.fallback.iter()) {
        let path = sources.database_path(*kind);
        if sources.entry(*kind).enabled && !path.exists() {
            tracing::warn!(source = %kind, path = %path.display(), "Source database does not exist");
        }
    }

    let artwork = &config.artwork;
    if artwork.validation_ttl_secs == 0 {
        anyhow::bail!("artwork.validation_ttl_secs cannot be 0");
    }
    if artwork.probe_timeout_secs == 0 {
        anyhow::bail!("artwork.probe_timeout_secs cannot be 0");
    }
    if artwork.allowed_schemes.is_empty() {
        anyhow::bail!("artwork.allowed_schemes cannot be empty");
    }
    if artwork.allowed_hosts.is_empty() {
        anyhow::bail!("artwork.allowed_hosts cannot be empty");
    }
    if artwork.allowed_extensions.is_empty() {
        anyhow::bail!("artwork.allowed_extensions cannot be empty");
    }
    reqwest::Url::parse(&artwork.thumbnails_base_url).with_context(|| {
        format!(
            "artwork.thumbnails_base_url is not a valid URL: {}",
            artwork.thumbnails_base_url
        )
    })?;

    if config.cache.ttl_hours == 0 {
        anyhow::bail!("cache.ttl_hours cannot be 0");
    }
    if config.cache.ttl_hours > MAX_CACHE_TTL_HOURS {
        anyhow::bail!(
            "cache.ttl_hours cannot exceed {} (got {})",
            MAX_CACHE_TTL_HOURS,
            config.cache.ttl_hours
        );
    }

    Ok(())
}
