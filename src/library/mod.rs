//! Content catalog.
//!
//! The catalog is the read-only source every navigation query runs against.
//!
//! # File Format
//!
//! ```text
//! {
//!   "version": 1,
//!   "nodes": [
//!     {
//!       "id": "rust-101-ep1",
//!       "seriesId": "rust-101",
//!       "episodeNumber": 1,
//!       "alternateVersions": ["rust-101-ep1", "rust-101-ep1-whiteboard"],
//!       "tags": ["rust", "ownership"],
//!       "resourceUrl": "https://cdn.example.com/rust-101/ep1.mp4"
//!     }
//!   ]
//! }
//! ```

pub mod catalog;

pub use catalog::{Catalog, CatalogError, CatalogFile, CATALOG_VERSION};
