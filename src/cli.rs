use clap::{Parser, Subcommand};
use romlookup_common::{ArtworkType, SourceKind, SystemIdentifier};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "romlookup")]
#[command(author, version, about = "ROM metadata and artwork lookup across local databases")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up a ROM by MD5 and print the merged record
    Hash {
        /// MD5 of the ROM contents
        md5: String,

        /// Restrict to one system (e.g. snes, genesis)
        #[arg(long)]
        system: Option<SystemIdentifier>,
    },

    /// Search ROMs by file name
    Search {
        /// File name or fragment
        filename: String,

        /// Restrict to these systems (repeatable)
        #[arg(long = "system")]
        systems: Vec<SystemIdentifier>,
    },

    /// Search artwork by game name
    Artwork {
        /// Game name or fragment
        name: String,

        #[arg(long)]
        system: Option<SystemIdentifier>,

        /// Artwork types to keep (repeatable, e.g. boxfront)
        #[arg(long = "type")]
        types: Vec<ArtworkType>,
    },

    /// Artwork for a source-native game or release id
    ArtworkId {
        /// Source the id belongs to
        source: SourceKind,

        id: String,
    },

    /// Candidate artwork URLs for a ROM
    Urls {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        system: SystemIdentifier,

        #[arg(long)]
        file_name: Option<String>,

        #[arg(long)]
        md5: Option<String>,
    },

    /// Identify the system of a ROM
    Identify {
        #[arg(long)]
        md5: Option<String>,

        #[arg(long)]
        file_name: Option<String>,

        /// Also print the system id used by this source
        #[arg(long)]
        source: Option<SourceKind>,
    },

    /// Show the full artwork mapping (summary unless --full)
    Mapping {
        #[arg(long)]
        full: bool,
    },

    /// List canonical systems and their per-source ids
    Systems,

    /// Check an artwork URL against the allow-lists and its host
    CheckUrl { url: String },

    /// Show the initialization state of every source
    Status,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
