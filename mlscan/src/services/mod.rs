//! Scan pipeline services
//!
//! Leaves first: name grammars, sidecar and tag readers, the resolver that
//! combines them, the catalog client, the identity cache, and finally the
//! coordinator that walks the library tree.

pub mod catalog_client;
pub mod directory_walker;
pub mod identity_cache;
pub mod metadata_resolver;
pub mod path_parser;
pub mod scan_coordinator;
pub mod sidecar;
pub mod tag_reader;

pub use catalog_client::{BackoffPolicy, CatalogClient, CatalogError};
pub use identity_cache::{AlbumKey, ArtistKey, IdentityCache};
pub use metadata_resolver::{AlbumContext, Provenance};
pub use path_parser::FormatError;
pub use scan_coordinator::{ScanCoordinator, ScanSettings};
pub use tag_reader::{TagError, TrackTags};
