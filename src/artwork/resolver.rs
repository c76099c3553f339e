//! Ranking and filtering of artwork candidates gathered from several sources.

use std::collections::HashSet;

use futures::future::join_all;
use romlookup_common::{ArtworkMetadata, ArtworkType, SystemIdentifier};

use super::ArtworkValidator;

/// Drop repeated URLs, keeping the first occurrence.
pub fn dedup_urls(urls: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Deduplicate on `(url, type, system)` and stable-sort by type priority.
///
/// Within one type, entries keep the order in which sources produced them,
/// so higher-precedence sources stay first.
pub fn rank_artwork(artwork: impl IntoIterator<Item = ArtworkMetadata>) -> Vec<ArtworkMetadata> {
    let mut seen: HashSet<(String, ArtworkType, SystemIdentifier)> = HashSet::new();
    let mut ranked: Vec<ArtworkMetadata> = artwork
        .into_iter()
        .filter(|art| seen.insert((art.url.clone(), art.artwork_type, art.system)))
        .collect();
    ranked.sort_by_key(|art| art.artwork_type);
    ranked
}

/// Keep the URLs the validator accepts, probing them concurrently.
pub async fn retain_valid(validator: &ArtworkValidator, urls: Vec<String>) -> Vec<String> {
    let verdicts = join_all(urls.iter().map(|url| validator.validate_url(url))).await;
    urls.into_iter()
        .zip(verdicts)
        .filter_map(|(url, ok)| ok.then_some(url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use romlookup_common::SourceKind;

    fn art(url: &str, artwork_type: ArtworkType, source: SourceKind) -> ArtworkMetadata {
        ArtworkMetadata {
            url: url.to_string(),
            artwork_type,
            resolution: None,
            source: Some(source),
            system: SystemIdentifier::SNES,
        }
    }

    #[test]
    fn dedup_preserves_first_occurrence() {
        let urls = dedup_urls(["b", "a", "b", "c", "a"].map(String::from));
        assert_eq!(urls, vec!["b", "a", "c"]);
    }

    #[test]
    fn ranking_is_stable_by_priority() {
        let ranked = rank_artwork(vec![
            art("snap-1", ArtworkType::Screenshot, SourceKind::OpenVgdb),
            art("front-1", ArtworkType::BoxFront, SourceKind::OpenVgdb),
            art("snap-2", ArtworkType::Screenshot, SourceKind::Libretro),
            art("front-2", ArtworkType::BoxFront, SourceKind::Libretro),
            art("front-1", ArtworkType::BoxFront, SourceKind::TheGamesDb),
            art("logo", ArtworkType::ClearLogo, SourceKind::TheGamesDb),
        ]);

        let urls: Vec<&str> = ranked.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["front-1", "front-2", "snap-1", "snap-2", "logo"]);
        assert_eq!(ranked[0].source, Some(SourceKind::OpenVgdb));
    }

    #[test]
    fn same_url_with_different_type_is_kept() {
        let ranked = rank_artwork(vec![
            art("x", ArtworkType::BoxFront, SourceKind::OpenVgdb),
            art("x", ArtworkType::Other, SourceKind::OpenVgdb),
        ]);
        assert_eq!(ranked.len(), 2);
    }
}
