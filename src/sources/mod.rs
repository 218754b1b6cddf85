//! Concrete site adapters.
//!
//! Madara deployments are configurations of [`crate::madara::Madara`]; each
//! module exposes `source()` for the production site and `with_base_url()` for
//! mirrors and tests. SlimeRead talks to a JSON API and implements
//! [`crate::Source`] directly.

pub mod first_kiss_dash_manga;
pub mod mangas_no_sekai;
pub mod mhscans;
pub mod slimeread;

use tracing::info;

use crate::source::SourceRegistry;

/// Builds a registry with every bundled source.
#[must_use]
pub fn build_default_source_registry() -> SourceRegistry {
    let mut registry = SourceRegistry::new();

    registry.register(Box::new(mangas_no_sekai::source()));
    registry.register(Box::new(mhscans::source()));
    registry.register(Box::new(first_kiss_dash_manga::source()));
    registry.register(Box::new(slimeread::SlimeRead::new()));

    info!(
        sources = registry.len(),
        ids = ?registry.ids(),
        "source registry ready"
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_holds_every_source() {
        let registry = build_default_source_registry();
        assert_eq!(
            registry.ids(),
            vec!["mangasnosekai", "mhscans", "firstkissdashmanga", "slimeread"]
        );
        assert!(registry.get("slimeread").is_ok());
        assert!(registry.get("unknown").is_err());
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = build_default_source_registry();
        let mut ids = registry.ids();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), registry.len());
    }
}
