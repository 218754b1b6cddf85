//! Registry of available sources.
//!
//! The [`SourceRegistry`] owns every constructed adapter and looks them up by
//! id or by the host of a site URL.

use tracing::debug;
use url::Url;

use super::utils::hosts_match;
use super::{Result, Source, SourceError};

/// A registration-ordered collection of sources.
pub struct SourceRegistry {
    sources: Vec<Box<dyn Source>>,
}

impl SourceRegistry {
    /// Creates an empty source registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Registers a source; a later source with the same id replaces the earlier one.
    #[tracing::instrument(skip(self, source), fields(source_id))]
    pub fn register(&mut self, source: Box<dyn Source>) {
        tracing::Span::current().record("source_id", source.id());
        debug!(
            id = source.id(),
            name = source.name(),
            lang = source.lang(),
            "Registering source"
        );
        self.sources.retain(|existing| existing.id() != source.id());
        self.sources.push(source);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Looks a source up by id.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::UnknownSource`] when no source has `id`.
    pub fn get(&self, id: &str) -> Result<&dyn Source> {
        self.sources
            .iter()
            .find(|source| source.id() == id)
            .map(AsRef::as_ref)
            .ok_or_else(|| SourceError::unknown_source(id))
    }

    /// Finds the source whose site hosts `url`.
    #[must_use]
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn find_by_url(&self, url: &str) -> Option<&dyn Source> {
        let host = Url::parse(url).ok()?.host_str()?.to_string();
        self.sources
            .iter()
            .find(|source| {
                Url::parse(source.base_url())
                    .ok()
                    .and_then(|base| base.host_str().map(|base_host| hosts_match(base_host, &host)))
                    .unwrap_or(false)
            })
            .map(AsRef::as_ref)
    }

    /// Registered sources in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Source> {
        self.sources.iter().map(AsRef::as_ref)
    }

    /// Registered source ids in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.id()).collect()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("source_count", &self.sources.len())
            .field("sources", &self.ids())
            .finish()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
