//! Paginated listing aggregation
//!
//! A single list-objects call returns at most [`LIST_PAGE_SIZE`] keys plus a
//! continuation cursor. [`ListingAggregator`] follows the cursor until the
//! backend stops returning one, yielding the same sequence a single
//! unpaginated call would.
//!
//! There is no cap on the number of pages: a backend that always returns a
//! cursor keeps the loop running until the caller drops the future.

use futures::{Stream, TryStreamExt};

use crate::error::Result;
use crate::traits::{LIST_PAGE_SIZE, ListObjectsRequest, ListPage, ObjectStore, ObjectSummary};

/// Position in a paginated listing
enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Walks every page of a prefix listing in one bucket
pub struct ListingAggregator<'a> {
    store: &'a dyn ObjectStore,
    bucket: &'a str,
    page_size: i32,
}

impl<'a> ListingAggregator<'a> {
    pub fn new(store: &'a dyn ObjectStore, bucket: &'a str) -> Self {
        Self {
            store,
            bucket,
            page_size: LIST_PAGE_SIZE,
        }
    }

    /// Override the page size (clamped to 1..=1000)
    pub fn page_size(mut self, size: i32) -> Self {
        self.page_size = size.clamp(1, LIST_PAGE_SIZE);
        self
    }

    /// Lazily fetch pages for `prefix`, one round trip per poll
    ///
    /// Each call starts a fresh walk from the first page.
    pub fn pages(&self, prefix: &str) -> impl Stream<Item = Result<ListPage>> + 'a {
        let store = self.store;
        let bucket = self.bucket;
        let page_size = self.page_size;
        let prefix = prefix.to_string();

        futures::stream::try_unfold(Cursor::Start, move |cursor| {
            let prefix = prefix.clone();
            async move {
                let continuation_token = match cursor {
                    Cursor::Done => return Ok(None),
                    Cursor::Start => None,
                    Cursor::Next(token) => Some(token),
                };

                let request = ListObjectsRequest {
                    prefix,
                    max_keys: page_size,
                    continuation_token,
                    fetch_owner: false,
                };
                let page = store.list_objects(bucket, &request).await?;
                tracing::debug!(
                    bucket,
                    prefix = %request.prefix,
                    items = page.items.len(),
                    "Fetched listing page"
                );

                let next = match page.next_continuation_token.as_deref() {
                    Some(token) if !token.is_empty() => Cursor::Next(token.to_string()),
                    _ => Cursor::Done,
                };
                Ok(Some((page, next)))
            }
        })
    }

    /// Fetch every object under `prefix`, in backend order
    pub async fn list_all(&self, prefix: &str) -> Result<Vec<ObjectSummary>> {
        let mut pages = std::pin::pin!(self.pages(prefix));
        let mut items = Vec::new();
        while let Some(page) = pages.try_next().await? {
            items.extend(page.items);
        }
        Ok(items)
    }
}
