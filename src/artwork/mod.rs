//! Artwork resolution support: candidate ranking, URL validation and the
//! persisted hash/file name mapping.

pub mod mapping_cache;
pub mod resolver;
pub mod validator;

pub use mapping_cache::MappingCache;
pub use resolver::{dedup_urls, rank_artwork, retain_valid};
pub use validator::ArtworkValidator;
