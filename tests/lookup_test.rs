//! Lookup integration tests against fixture databases for all four sources.

mod common;

use assert_matches::assert_matches;
use common::*;
use romlookup::lookup::SourceState;
use romlookup_common::systems::VendorId;
use romlookup_common::{ArtworkType, RomMetadata, SourceKind, SystemIdentifier};

#[tokio::test]
async fn test_unknown_hash_returns_none() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    assert_eq!(lookup.search_by_hash(MISSING_MD5, None).await, None);
    assert_eq!(lookup.search_by_hash("", None).await, None);
}

#[tokio::test]
async fn test_hash_lookup_merges_sources_by_precedence() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    let rom = lookup
        .search_by_hash(&PITFALL_SNES_MD5.to_lowercase(), None)
        .await
        .unwrap();

    // OpenVGDB wins the title; libretro fills what OpenVGDB lacks.
    assert_eq!(rom.title.as_deref(), Some("Pitfall: The Mayan Adventure"));
    assert_eq!(rom.genres.as_deref(), Some("Platform"));
    assert_eq!(rom.developer.as_deref(), Some("Activision"));
    assert_eq!(rom.box_image_url.as_deref(), Some(OPENVGDB_SNES_COVER));
    assert_eq!(rom.region.as_deref(), Some("USA"));
    assert_eq!(rom.system, SystemIdentifier::SNES);
    assert_eq!(rom.md5.as_deref(), Some(PITFALL_SNES_MD5));
    assert_eq!(rom.source, Some(SourceKind::OpenVgdb));
}

#[tokio::test]
async fn test_hash_lookup_with_system_filter() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    let rom = lookup
        .search_by_hash(PITFALL_GENESIS_MD5, Some(SystemIdentifier::Genesis))
        .await
        .unwrap();
    assert_eq!(rom.system, SystemIdentifier::Genesis);
    assert_eq!(rom.genres.as_deref(), Some("Action"));

    assert_eq!(
        lookup
            .search_by_hash(PITFALL_GENESIS_MD5, Some(SystemIdentifier::SNES))
            .await,
        None
    );
}

#[tokio::test]
async fn test_fallback_answers_when_primaries_are_empty() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    let rom = lookup.search_by_hash(PITFALL_2600_MD5, None).await.unwrap();
    assert_eq!(rom.source, Some(SourceKind::ShiraGame));
    assert_eq!(rom.title.as_deref(), Some("Pitfall! (USA)"));
    assert_eq!(rom.system, SystemIdentifier::Atari2600);
    assert_eq!(rom.file_name.as_deref(), Some(ATARI_FILE));
}

#[tokio::test]
async fn test_disabled_fallback_is_never_consulted() {
    let mut fixture = Fixture::new();
    fixture.config.sources.shiragame.enabled = false;
    let lookup = fixture.lookup();

    assert_eq!(lookup.search_by_hash(PITFALL_2600_MD5, None).await, None);
}

#[tokio::test]
async fn test_broken_source_does_not_affect_others() {
    let fixture = Fixture::new();
    std::fs::write(
        fixture.database_path(SourceKind::OpenVgdb),
        b"this is not a sqlite database",
    )
    .unwrap();
    let lookup = fixture.lookup();

    let rom = lookup.search_by_hash(PITFALL_SNES_MD5, None).await.unwrap();
    assert_eq!(rom.source, Some(SourceKind::Libretro));
    assert_eq!(rom.title.as_deref(), Some("Pitfall - The Mayan Adventure"));

    let states = lookup.source_states();
    assert_matches!(&states[0], (SourceKind::OpenVgdb, SourceState::Failed(_)));
    assert_eq!(states[1], (SourceKind::Libretro, SourceState::Ready));
}

#[tokio::test]
async fn test_missing_database_is_reported_as_failed() {
    let fixture = Fixture::new();
    std::fs::remove_file(fixture.database_path(SourceKind::TheGamesDb)).unwrap();
    let lookup = fixture.lookup();

    let states = lookup.initialize().await;
    assert_eq!(states.len(), 4);
    for (kind, state) in states {
        if kind == SourceKind::TheGamesDb {
            assert_matches!(state, SourceState::Failed(reason) if reason.contains("not found") || reason.contains("Not found"));
        } else {
            assert_eq!(state, SourceState::Ready, "{kind}");
        }
    }
}

#[tokio::test]
async fn test_filename_search_respects_system_filter() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    let all = lookup.search_by_filename("Pitfall", None).await.unwrap();
    let systems: Vec<SystemIdentifier> = all.iter().map(|r| r.system).collect();
    assert!(systems.contains(&SystemIdentifier::SNES));
    assert!(systems.contains(&SystemIdentifier::Genesis));
    assert!(systems.contains(&SystemIdentifier::Atari2600));
    assert!(all.iter().all(|r| r.source.is_some()));

    for wanted in [
        SystemIdentifier::SNES,
        SystemIdentifier::Genesis,
        SystemIdentifier::Atari2600,
    ] {
        let filtered = lookup
            .search_by_filename("Pitfall", Some(wanted))
            .await
            .unwrap();
        assert!(
            filtered.iter().all(|r| r.system == wanted),
            "filter {wanted} leaked {:?}",
            filtered.iter().map(|r| r.system).collect::<Vec<_>>()
        );
    }

    assert_eq!(
        lookup
            .search_by_filename("Pitfall", Some(SystemIdentifier::N64))
            .await,
        None
    );
}

#[tokio::test]
async fn test_filename_search_orders_by_precedence() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    let results = lookup
        .search_by_filename_across_systems(SNES_FILE, &[SystemIdentifier::SNES])
        .await
        .unwrap();
    let sources: Vec<SourceKind> = results.iter().filter_map(|r| r.source).collect();
    assert_eq!(
        sources,
        vec![SourceKind::OpenVgdb, SourceKind::Libretro, SourceKind::TheGamesDb]
    );
}

#[tokio::test]
async fn test_filename_search_across_several_systems() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    let results = lookup
        .search_by_filename_across_systems(
            "Pitfall",
            &[SystemIdentifier::Genesis, SystemIdentifier::Atari2600],
        )
        .await
        .unwrap();
    assert!(results.iter().all(|r| matches!(
        r.system,
        SystemIdentifier::Genesis | SystemIdentifier::Atari2600
    )));
    assert!(results.iter().any(|r| r.system == SystemIdentifier::Atari2600));
}

#[tokio::test]
async fn test_resolve_system_identifier() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    // By hash
    assert_eq!(
        lookup
            .resolve_system_identifier(Some(PITFALL_GENESIS_MD5), None)
            .await,
        Some(SystemIdentifier::Genesis)
    );
    // By file name when the hash is unknown
    assert_eq!(
        lookup
            .resolve_system_identifier(Some(MISSING_MD5), Some(ATARI_FILE))
            .await,
        Some(SystemIdentifier::Atari2600)
    );
    // By extension alone
    assert_eq!(
        lookup
            .resolve_system_identifier(None, Some("/roms/Unreleased Prototype.gba"))
            .await,
        Some(SystemIdentifier::GBA)
    );
    assert_eq!(
        lookup
            .resolve_system_identifier(None, Some("Unreleased Prototype.iso"))
            .await,
        None
    );
    assert_eq!(lookup.resolve_system_identifier(None, None).await, None);
}

#[tokio::test]
async fn test_resolve_vendor_system_id() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    assert_eq!(
        lookup
            .resolve_vendor_system_id(SourceKind::TheGamesDb, Some(PITFALL_GENESIS_MD5), None)
            .await,
        Some(VendorId::Numeric(18))
    );
    assert_eq!(
        lookup
            .resolve_vendor_system_id(SourceKind::ShiraGame, Some(PITFALL_SNES_MD5), None)
            .await,
        Some(VendorId::Text("NINTENDO_SNES".to_string()))
    );
}

#[tokio::test]
async fn test_artwork_urls_from_every_source() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    let rom = RomMetadata {
        title: Some("Pitfall - The Mayan Adventure".into()),
        system: SystemIdentifier::SNES,
        md5: Some(PITFALL_SNES_MD5.into()),
        file_name: Some(SNES_FILE.into()),
        ..Default::default()
    };
    let urls = lookup.get_artwork_urls(&rom).await.unwrap();

    assert_eq!(urls[0], OPENVGDB_SNES_COVER);
    assert!(urls.contains(
        &"https://thumbnails.libretro.com/Nintendo%20-%20Super%20Nintendo%20Entertainment%20System/Named_Boxarts/Pitfall%20-%20The%20Mayan%20Adventure%20(USA).png"
            .to_string()
    ));
    assert!(urls.contains(
        &"https://cdn.thegamesdb.net/images/original/boxart/front/100-1.jpg".to_string()
    ));
    // The Genesis release's artwork never leaks into the SNES answer.
    assert!(!urls.iter().any(|u| u.contains("101-1")));

    let mut deduped = urls.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), urls.len());
}

#[tokio::test]
async fn test_artwork_urls_for_unknown_system() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    let rom = RomMetadata {
        title: Some("Pitfall - The Mayan Adventure".into()),
        md5: Some(PITFALL_SNES_MD5.into()),
        ..Default::default()
    };
    assert_eq!(lookup.get_artwork_urls(&rom).await, None);
}

#[tokio::test]
async fn test_artwork_search_is_ranked_and_filtered() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    let artwork = lookup
        .search_artwork_by_name("Pitfall", Some(SystemIdentifier::SNES), None)
        .await
        .unwrap();
    assert_eq!(artwork[0].artwork_type, ArtworkType::BoxFront);
    assert!(artwork
        .windows(2)
        .all(|pair| pair[0].artwork_type <= pair[1].artwork_type));
    assert!(artwork.iter().all(|a| a.system == SystemIdentifier::SNES));

    let backs = lookup
        .search_artwork_by_name("Pitfall", None, Some(&[ArtworkType::BoxBack]))
        .await
        .unwrap();
    assert!(backs.iter().all(|a| a.artwork_type == ArtworkType::BoxBack));
    assert!(!backs.is_empty());

    assert_eq!(
        lookup
            .search_artwork_by_name("Zelda", None, None)
            .await,
        None
    );
}

#[tokio::test]
async fn test_artwork_for_source_native_id() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    let artwork = lookup
        .get_artwork_for_id(SourceKind::TheGamesDb, &TGDB_SNES_GAME_ID.to_string())
        .await
        .unwrap();
    let types: Vec<ArtworkType> = artwork.iter().map(|a| a.artwork_type).collect();
    assert_eq!(
        types,
        vec![ArtworkType::BoxFront, ArtworkType::BoxBack, ArtworkType::Screenshot]
    );

    assert_eq!(
        lookup
            .get_artwork_for_id(SourceKind::ShiraGame, "5")
            .await,
        None
    );
    assert_eq!(
        lookup
            .get_artwork_for_id(SourceKind::TheGamesDb, "not-a-number")
            .await,
        None
    );
}

#[tokio::test]
async fn test_full_artwork_mapping_is_built_and_persisted() {
    let fixture = Fixture::new();
    let lookup = fixture.lookup();

    let mapping = lookup.get_full_artwork_mapping().await;
    for md5 in [PITFALL_SNES_MD5, PITFALL_GENESIS_MD5, PITFALL_2600_MD5] {
        assert!(mapping.rom_md5.contains_key(md5), "missing {md5}");
    }
    assert_eq!(
        mapping.rom_file_name_to_md5.get(ATARI_FILE).map(String::as_str),
        Some(PITFALL_2600_MD5)
    );
    assert!(fixture.config.cache.path.exists());

    // A fresh engine serves the persisted mapping without touching sources.
    for kind in SourceKind::ALL {
        std::fs::remove_file(fixture.database_path(*kind)).unwrap();
    }
    let reloaded = fixture.lookup().get_full_artwork_mapping().await;
    assert_eq!(*reloaded, *mapping);
}

#[tokio::test]
async fn test_mapping_is_empty_without_any_source() {
    let fixture = Fixture::new();
    for kind in SourceKind::ALL {
        std::fs::remove_file(fixture.database_path(*kind)).unwrap();
    }
    let lookup = fixture.lookup();

    assert!(lookup.get_full_artwork_mapping().await.is_empty());
    assert!(!fixture.config.cache.path.exists());
}

#[tokio::test]
async fn test_eager_init_warms_up_sources() {
    let mut fixture = Fixture::new();
    fixture.config.lookup.eager_init = true;
    let lookup = fixture.lookup();

    assert!(lookup
        .source_states()
        .iter()
        .all(|(_, state)| *state != SourceState::Uninitialized));

    let states = lookup.initialize().await;
    assert!(states.iter().all(|(_, state)| *state == SourceState::Ready));
}
