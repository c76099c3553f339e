//! Artwork URL validation.
//!
//! A URL is valid when it passes the structural allow-lists (scheme, host,
//! file extension) and the host answers a probe with a success status.
//! Structural failures never touch the network. Successful probes are cached
//! for the configured TTL; failures are always re-probed.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use reqwest::header::RANGE;
use reqwest::{Client, StatusCode, Url};
use romlookup_common::Error;
use tracing::{debug, warn};

use crate::config::ArtworkConfig;

pub struct ArtworkValidator {
    client: Client,
    allowed_schemes: Vec<String>,
    allowed_hosts: Vec<String>,
    allowed_extensions: Vec<String>,
    ttl: Duration,
    /// URL → time of the last successful probe
    validated: DashMap<String, Instant>,
}

impl ArtworkValidator {
    pub fn new(config: &ArtworkConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.probe_timeout_secs))
            .user_agent(concat!("romlookup/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client: {}", e);
                Client::new()
            });

        let lower = |values: &[String]| -> Vec<String> {
            values.iter().map(|v| v.to_ascii_lowercase()).collect()
        };

        Self {
            client,
            allowed_schemes: lower(&config.allowed_schemes),
            allowed_hosts: lower(&config.allowed_hosts),
            allowed_extensions: lower(&config.allowed_extensions),
            ttl: Duration::from_secs(config.validation_ttl_secs),
            validated: DashMap::new(),
        }
    }

    /// Structural checks only.
    ///
    /// # Returns
    ///
    /// The parsed URL, or [`Error::InvalidArtworkUrl`] naming the first
    /// check that failed.
    pub fn check_structure(&self, url: &str) -> romlookup_common::Result<Url> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| Error::invalid_artwork_url(format!("{url}: {e}")))?;

        if !self.allowed_schemes.iter().any(|s| s == parsed.scheme()) {
            return Err(Error::invalid_artwork_url(format!(
                "scheme '{}' is not allowed",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| Error::invalid_artwork_url(format!("{url}: missing host")))?;
        if !self.allowed_hosts.contains(&host) {
            return Err(Error::invalid_artwork_url(format!(
                "host '{host}' is not allowed"
            )));
        }

        let extension = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !self.allowed_extensions.contains(&extension) {
            return Err(Error::invalid_artwork_url(format!(
                "extension '{extension}' is not allowed"
            )));
        }

        Ok(parsed)
    }

    /// Whether `url` is structurally acceptable and reachable.
    pub async fn validate_url(&self, url: &str) -> bool {
        let parsed = match self.check_structure(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(url = %url, error = %e, "Rejected artwork URL");
                return false;
            }
        };

        if self.is_cached(url) {
            return true;
        }

        let ok = self.probe(parsed).await;
        if ok {
            self.validated.insert(url.to_string(), Instant::now());
        }
        ok
    }

    fn is_cached(&self, url: &str) -> bool {
        match self.validated.get(url) {
            Some(entry) if entry.elapsed() < self.ttl => true,
            Some(entry) => {
                drop(entry);
                self.validated.remove(url);
                false
            }
            None => false,
        }
    }

    /// HEAD the URL; hosts that reject HEAD get a one-byte ranged GET.
    async fn probe(&self, url: Url) -> bool {
        let response = match self.client.head(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %url, error = %e, "Artwork probe failed");
                return false;
            }
        };

        if response.status() != StatusCode::METHOD_NOT_ALLOWED {
            debug!(url = %url, status = %response.status(), "Probed artwork URL");
            return response.status().is_success();
        }

        match self
            .client
            .get(url.clone())
            .header(RANGE, "bytes=0-0")
            .send()
            .await
        {
            Ok(response) => {
                debug!(url = %url, status = %response.status(), "Probed artwork URL with GET");
                response.status().is_success()
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Artwork probe failed");
                false
            }
        }
    }

    /// Number of URLs currently trusted without a probe.
    pub fn cached_count(&self) -> usize {
        self.validated
            .iter()
            .filter(|entry| entry.value().elapsed() < self.ttl)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn validator() -> ArtworkValidator {
        ArtworkValidator::new(&ArtworkConfig::default())
    }

    #[test]
    fn accepts_allowed_urls() {
        let v = validator();
        v.check_structure(
            "https://thumbnails.libretro.com/Nintendo%20-%20Super%20Nintendo%20Entertainment%20System/Named_Boxarts/Pitfall.png",
        )
        .unwrap();
        v.check_structure("https://CDN.thegamesdb.net/images/original/boxart/front/1-1.JPG")
            .unwrap();
    }

    #[test]
    fn rejects_each_structural_failure() {
        let v = validator();
        assert_matches!(
            v.check_structure("http://thumbnails.libretro.com/a.png"),
            Err(Error::InvalidArtworkUrl(msg)) if msg.contains("scheme")
        );
        assert_matches!(
            v.check_structure("https://evil.example.com/a.png"),
            Err(Error::InvalidArtworkUrl(msg)) if msg.contains("host")
        );
        assert_matches!(
            v.check_structure("https://thumbnails.libretro.com/a.gif"),
            Err(Error::InvalidArtworkUrl(msg)) if msg.contains("extension")
        );
        assert_matches!(
            v.check_structure("https://thumbnails.libretro.com/"),
            Err(Error::InvalidArtworkUrl(_))
        );
        assert_matches!(v.check_structure("not a url"), Err(Error::InvalidArtworkUrl(_)));
    }

    #[tokio::test]
    async fn structural_failure_is_not_cached() {
        let v = validator();
        assert!(!v.validate_url("ftp://thumbnails.libretro.com/a.png").await);
        assert_eq!(v.cached_count(), 0);
    }
}
