//! Remote media catalog abstraction.
//!
//! A catalog lists media resources page by page. Each page may carry an
//! opaque cursor for the next one; its absence ends the listing.

mod cloudinary;

pub use cloudinary::CloudinaryCatalog;

use crate::error::{HarkError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// A media item known to the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResource {
    /// Catalog resource ID.
    pub id: String,
    /// URL the media can be fetched from.
    pub secure_url: String,
}

impl MediaResource {
    pub fn new(id: impl Into<String>, secure_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secure_url: secure_url.into(),
        }
    }
}

/// One page of a catalog listing.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub resources: Vec<MediaResource>,
    pub next_cursor: Option<String>,
}

/// Trait for media catalog providers.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Fetch one page of the listing, starting at `cursor` (or the beginning).
    async fn list(&self, cursor: Option<&str>) -> Result<CatalogPage>;
}

/// Page through the catalog until it stops returning a cursor.
#[instrument(skip_all)]
pub async fn list_all(catalog: &dyn MediaCatalog) -> Result<Vec<MediaResource>> {
    let mut resources = Vec::new();
    let mut seen_cursors = HashSet::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = catalog.list(cursor.as_deref()).await?;
        pages += 1;
        debug!("Catalog page {} returned {} resources", pages, page.resources.len());
        resources.extend(page.resources);

        match page.next_cursor {
            Some(next) if !next.is_empty() => {
                if !seen_cursors.insert(next.clone()) {
                    return Err(HarkError::CatalogUnavailable(format!(
                        "catalog returned cursor '{}' twice",
                        next
                    )));
                }
                cursor = Some(next);
            }
            _ => break,
        }
    }

    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeCatalog;

    #[tokio::test]
    async fn test_list_all_follows_cursors() {
        let catalog = FakeCatalog::new(vec![
            vec![
                MediaResource::new("a", "https://cdn/a.mp4"),
                MediaResource::new("b", "https://cdn/b.mp4"),
            ],
            vec![MediaResource::new("c", "https://cdn/c.mp4")],
        ]);

        let all = list_all(&catalog).await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(catalog.calls(), 2);
    }

    #[tokio::test]
    async fn test_list_all_propagates_failure() {
        let catalog = FakeCatalog::failing();
        let err = list_all(&catalog).await.unwrap_err();
        assert!(matches!(err, HarkError::CatalogUnavailable(_)));
    }
}
