//! Manga Sources Library
//!
//! Site adapters ("sources") that translate manga websites into a shared,
//! normalized content model: manga listings, manga details, chapter lists and
//! page image lists.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`model`] - Manga, chapter, page and filter value objects
//! - [`http`] - Request/response values, the [`Fetch`] seam and the reqwest-backed client
//! - [`pagination`] - Page-number cursors and next-page rules
//! - [`source`] - The [`Source`] adapter contract, errors and registry
//! - [`madara`] - Shared template for the Madara WordPress theme family
//! - [`sources`] - Concrete site adapters

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod http;
pub mod madara;
pub mod model;
pub mod pagination;
pub mod source;
pub mod sources;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use http::{
    CachePolicy, ClientSettings, Fetch, FormBody, HttpClient, RateLimitPolicy, RateLimiter,
    Request, Response,
};
pub use madara::{
    ChapterFallback, ChapterTransport, DateFormat, FieldQuery, Madara, MadaraConfig, MadaraHooks,
    StatusTable,
};
pub use model::{Chapter, Filter, FilterList, Manga, MangaStatus, MangasPage, Page};
pub use pagination::{ApiPage, NextPage, PageCursor};
pub use source::{DeepLink, Result, Source, SourceError, SourceRegistry};
pub use sources::build_default_source_registry;
