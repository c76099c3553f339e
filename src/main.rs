mod cli;

use romlookup::{config, lookup::Lookup};
use romlookup_common::systems::{reverse, VendorId};
use romlookup_common::{RomMetadata, SourceKind, SystemIdentifier};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag.
    // Logs go to stderr so stdout stays valid JSON.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "romlookup=trace,romlookup_db=debug,romlookup_common=debug,reqwest=debug".to_string()
        } else {
            "romlookup=warn,romlookup_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Systems => print_json(&system_table()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("romlookup {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_query(command, cli.config.as_deref()))
        }
    }
}

/// Commands that need the lookup engine.
async fn run_query(command: Commands, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let lookup = Lookup::from_config(config).context("Failed to set up lookup")?;

    match command {
        Commands::Hash { md5, system } => print_json(&lookup.search_by_hash(&md5, system).await),
        Commands::Search { filename, systems } => print_json(
            &lookup
                .search_by_filename_across_systems(&filename, &systems)
                .await,
        ),
        Commands::Artwork {
            name,
            system,
            types,
        } => {
            let types = (!types.is_empty()).then_some(types.as_slice());
            print_json(&lookup.search_artwork_by_name(&name, system, types).await)
        }
        Commands::ArtworkId { source, id } => {
            print_json(&lookup.get_artwork_for_id(source, &id).await)
        }
        Commands::Urls {
            title,
            system,
            file_name,
            md5,
        } => {
            let rom = RomMetadata {
                title,
                system,
                file_name,
                md5: md5.as_deref().and_then(romlookup_common::normalize_hash),
                ..Default::default()
            };
            print_json(&lookup.get_artwork_urls(&rom).await)
        }
        Commands::Identify {
            md5,
            file_name,
            source,
        } => {
            if md5.is_none() && file_name.is_none() {
                anyhow::bail!("identify needs --md5 or --file-name");
            }
            let system = lookup
                .resolve_system_identifier(md5.as_deref(), file_name.as_deref())
                .await;
            let vendor_id = match (source, system) {
                (Some(source), Some(_)) => {
                    lookup
                        .resolve_vendor_system_id(source, md5.as_deref(), file_name.as_deref())
                        .await
                }
                _ => None,
            };
            print_json(&Identification {
                system,
                source,
                vendor_id,
            })
        }
        Commands::Mapping { full } => {
            let mapping = lookup.get_full_artwork_mapping().await;
            if full {
                print_json(mapping.as_ref())
            } else {
                print_json(&MappingSummary {
                    hashes: mapping.rom_md5.len(),
                    file_names: mapping.rom_file_name_to_md5.len(),
                })
            }
        }
        Commands::CheckUrl { url } => {
            let valid = lookup.validate_artwork_url(&url).await;
            print_json(&UrlCheck { url, valid })
        }
        Commands::Status => {
            let states: BTreeMap<String, _> = lookup
                .initialize()
                .await
                .into_iter()
                .map(|(kind, state)| (kind.to_string(), state))
                .collect();
            print_json(&states)
        }
        Commands::Systems | Commands::Validate { .. } | Commands::Version => Ok(()),
    }
}

#[derive(Serialize)]
struct Identification {
    system: Option<SystemIdentifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<SourceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor_id: Option<VendorId>,
}

#[derive(Serialize)]
struct MappingSummary {
    hashes: usize,
    file_names: usize,
}

#[derive(Serialize)]
struct UrlCheck {
    url: String,
    valid: bool,
}

/// Every canonical system with the id each source uses for it.
fn system_table() -> BTreeMap<String, BTreeMap<String, VendorId>> {
    SystemIdentifier::ALL
        .iter()
        .map(|system| {
            let ids = SourceKind::ALL
                .iter()
                .filter_map(|source| {
                    reverse(*source, *system).map(|id| (source.to_string(), id))
                })
                .collect();
            (system.to_string(), ids)
        })
        .collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("✓ Configuration is valid");
    println!(
        "  Primary sources: {}",
        join_kinds(&config.sources.enabled_primaries())
    );
    println!(
        "  Fallback: {}",
        config
            .sources
            .enabled_fallback()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    for kind in SourceKind::ALL {
        let path = config.sources.database_path(*kind);
        let status = if path.exists() { "found" } else { "missing" };
        println!("  {}: {} ({})", kind, path.display(), status);
    }
    println!("  Mapping cache: {}", config.cache.resolved_path().display());

    Ok(())
}

fn join_kinds(kinds: &[SourceKind]) -> String {
    kinds
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
