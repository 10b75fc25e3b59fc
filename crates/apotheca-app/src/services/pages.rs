//! CMS pages

use super::{encode, Backend};
use crate::cache::QueryKey;
use crate::config::tables::CMS_PAGES;
use crate::error::Result;
use crate::notify::{Notice, Notifier};
use crate::records::{CmsPage, NewCmsPage, PublishStatus};
use crate::remote::{Direction, Query};

use serde_json::Value;

/// Cache key of the page list
pub fn list_key() -> QueryKey {
    QueryKey::new(["cms-pages"])
}

/// Cache key of one published page
pub fn page_key(slug: &str) -> QueryKey {
    QueryKey::new(["cms-page", slug])
}

/// CMS page queries and mutations
pub struct CmsPages {
    backend: Backend,
}

impl CmsPages {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Every page regardless of status, most recently edited first
    pub fn list(&self) -> Result<Vec<CmsPage>> {
        self.backend.cached(list_key(), CMS_PAGES, |source| {
            let query = Query::table(CMS_PAGES).order_by("updated_at", Direction::Descending);
            source.select(&query).map(Value::Array)
        })
    }

    /// The published page at `slug`
    ///
    /// Drafts, archived pages and unknown slugs are all `NotFound`.
    pub fn published(&self, slug: &str) -> Result<CmsPage> {
        self.backend.cached(page_key(slug), CMS_PAGES, |source| {
            let query = Query::table(CMS_PAGES)
                .eq("slug", slug)
                .eq("status", PublishStatus::Published.as_str());
            source.select_single(&query)
        })
    }

    /// Create a page
    pub fn create(&self, page: &NewCmsPage, notifier: Option<&dyn Notifier>) -> Result<CmsPage> {
        let row = encode(CMS_PAGES, page)?;
        self.backend.mutate(
            CMS_PAGES,
            |source| source.insert(CMS_PAGES, row),
            &[list_key()],
            notifier,
            Notice::new("Page created", format!("\"{}\" has been created.", page.title)),
        )
    }
}
