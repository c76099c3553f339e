//! Artwork URL validation against a mock HTTP host.

use std::sync::Arc;

use async_trait::async_trait;
use romlookup::artwork::ArtworkValidator;
use romlookup::config::{ArtworkConfig, Config};
use romlookup::sources::MetadataSource;
use romlookup::Lookup;
use romlookup_common::{
    ArtworkMapping, ArtworkMetadata, ArtworkType, RomMetadata, SourceKind, SystemIdentifier,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn local_config() -> ArtworkConfig {
    ArtworkConfig {
        allowed_schemes: vec!["http".to_string()],
        allowed_hosts: vec!["127.0.0.1".to_string()],
        probe_timeout_secs: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_successful_probe_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/box/front.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let validator = ArtworkValidator::new(&local_config());
    let url = format!("{}/box/front.png", server.uri());

    assert!(validator.validate_url(&url).await);
    assert!(validator.validate_url(&url).await);
    assert_eq!(validator.cached_count(), 1);
}

#[tokio::test]
async fn test_failed_probe_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/box/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let validator = ArtworkValidator::new(&local_config());
    let url = format!("{}/box/missing.png", server.uri());

    assert!(!validator.validate_url(&url).await);
    assert!(!validator.validate_url(&url).await);
    assert_eq!(validator.cached_count(), 0);
}

#[tokio::test]
async fn test_head_not_allowed_falls_back_to_ranged_get() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/snap.jpg"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/snap.jpg"))
        .and(header("range", "bytes=0-0"))
        .respond_with(ResponseTemplate::new(206))
        .expect(1)
        .mount(&server)
        .await;

    let validator = ArtworkValidator::new(&local_config());
    assert!(validator
        .validate_url(&format!("{}/snap.jpg", server.uri()))
        .await);
}

#[tokio::test]
async fn test_structural_rejection_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let validator = ArtworkValidator::new(&local_config());
    let port = server.address().port();

    // Wrong extension
    assert!(!validator
        .validate_url(&format!("{}/manual.pdf", server.uri()))
        .await);
    // Host not on the allow-list
    assert!(!validator
        .validate_url(&format!("http://localhost:{port}/box.png"))
        .await);
    // Scheme not on the allow-list
    assert!(!validator
        .validate_url(&format!("https://127.0.0.1:{port}/box.png"))
        .await);
    assert!(!validator.validate_url("not a url").await);
}

#[tokio::test]
async fn test_unreachable_host_is_invalid() {
    let server = MockServer::start().await;
    let url = format!("{}/gone.png", server.uri());
    drop(server);

    let validator = ArtworkValidator::new(&local_config());
    assert!(!validator.validate_url(&url).await);
}

// ---------------------------------------------------------------------------
// Candidate filtering through the lookup engine
// ---------------------------------------------------------------------------

struct FixedUrls(Vec<String>);

#[async_trait]
impl MetadataSource for FixedUrls {
    fn kind(&self) -> SourceKind {
        SourceKind::OpenVgdb
    }

    async fn search_by_hash(
        &self,
        _md5: &str,
        _system: Option<SystemIdentifier>,
    ) -> anyhow::Result<Vec<RomMetadata>> {
        Ok(Vec::new())
    }

    async fn search_by_filename(
        &self,
        _filename: &str,
        _systems: &[SystemIdentifier],
    ) -> anyhow::Result<Vec<RomMetadata>> {
        Ok(Vec::new())
    }

    async fn search_artwork(
        &self,
        _game_name: &str,
        _system: Option<SystemIdentifier>,
        _types: Option<&[ArtworkType]>,
    ) -> anyhow::Result<Vec<ArtworkMetadata>> {
        Ok(Vec::new())
    }

    async fn artwork_urls(&self, _rom: &RomMetadata) -> anyhow::Result<Vec<String>> {
        Ok(self.0.clone())
    }

    async fn artwork_for_id(&self, _id: &str) -> anyhow::Result<Vec<ArtworkMetadata>> {
        Ok(Vec::new())
    }

    async fn artwork_mappings(&self) -> anyhow::Result<ArtworkMapping> {
        Ok(ArtworkMapping::default())
    }
}

fn lookup_with_urls(urls: Vec<String>, validate_candidates: bool) -> Lookup {
    let mut config = Config::default();
    config.sources.order = vec![SourceKind::OpenVgdb];
    config.sources.fallback = None;
    config.artwork = ArtworkConfig {
        validate_candidates,
        ..local_config()
    };

    Lookup::builder(config)
        .source(Arc::new(FixedUrls(urls)))
        .build()
        .unwrap()
}

fn snes_rom() -> RomMetadata {
    RomMetadata {
        title: Some("Pitfall - The Mayan Adventure".into()),
        system: SystemIdentifier::SNES,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_candidate_urls_are_filtered_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/front.png"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/back.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let front = format!("{}/front.png", server.uri());
    let urls = vec![
        front.clone(),
        format!("{}/back.png", server.uri()),
        "ftp://127.0.0.1/front.png".to_string(),
    ];

    let lookup = lookup_with_urls(urls.clone(), true);
    assert_eq!(lookup.get_artwork_urls(&snes_rom()).await, Some(vec![front]));

    let unfiltered = lookup_with_urls(urls.clone(), false);
    assert_eq!(unfiltered.get_artwork_urls(&snes_rom()).await, Some(urls));
}

#[tokio::test]
async fn test_no_valid_candidates_yields_none() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let lookup = lookup_with_urls(vec![format!("{}/front.png", server.uri())], true);
    assert_eq!(lookup.get_artwork_urls(&snes_rom()).await, None);
    assert!(!lookup
        .validate_artwork_url(&format!("{}/front.png", server.uri()))
        .await);
}
