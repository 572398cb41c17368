//! Cursor-following pagination over Daemo list endpoints.
//!
//! Every list endpoint returns a [`Page`] envelope. The paginator walks the
//! `next` links one page at a time, either lazily as a stream of pages or
//! eagerly into a single `Vec` with an optional early-exit cap.

use futures::stream::{self, Stream, TryStreamExt};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{DaemoError, Result};
use super::transport::Transport;
use crate::models::Resource;

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T = Resource> {
    /// Total number of items across the whole listing.
    pub count: u64,
    /// Absolute URL of the following page; `None` on the last page.
    pub next: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct Paginator {
    transport: Transport,
}

impl Paginator {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Stream pages starting at `start_url`, following `next` links.
    ///
    /// Pages are fetched lazily and strictly in order: the request for page
    /// n+1 is only issued once page n has been yielded and the stream polled
    /// again. The stream ends after the page whose `next` is null, or after
    /// the first error.
    pub fn pages<'a, T>(
        &'a self,
        start_url: &str,
        headers: &'a HeaderMap,
    ) -> impl Stream<Item = Result<Page<T>>> + 'a
    where
        T: DeserializeOwned + 'a,
    {
        stream::try_unfold(Some(start_url.to_string()), move |next| {
            self.advance::<T>(next, headers)
        })
    }

    /// Collect every item of a listing into one `Vec`.
    ///
    /// With `max_count`, stops after the first page at which the running sum
    /// of the pages' reported `count` reaches `max_count`. Whole pages are
    /// kept, so the result can hold more than `max_count` items. Any failure
    /// discards everything fetched so far.
    pub async fn collect<T: DeserializeOwned>(
        &self,
        start_url: &str,
        headers: &HeaderMap,
        max_count: Option<u64>,
    ) -> Result<Vec<T>> {
        let pages = self.pages::<T>(start_url, headers);
        futures::pin_mut!(pages);

        let mut results = Vec::new();
        let mut reported_total: u64 = 0;
        let mut page_number = 0usize;

        while let Some(page) = pages.try_next().await? {
            page_number += 1;
            reported_total = reported_total.saturating_add(page.count);
            debug!(
                page = page_number,
                items = page.results.len(),
                reported_total = reported_total,
                "Fetched page"
            );
            results.extend(page.results);

            if let Some(max) = max_count {
                if reported_total >= max {
                    debug!(max_count = max, "Reached max_count, stopping pagination");
                    break;
                }
            }
        }

        Ok(results)
    }

    async fn advance<T: DeserializeOwned>(
        &self,
        next: Option<String>,
        headers: &HeaderMap,
    ) -> Result<Option<(Page<T>, Option<String>)>> {
        let Some(url) = next else {
            return Ok(None);
        };
        let page = self.fetch_page::<T>(&url, headers).await?;
        let following = page.next.clone();
        Ok(Some((page, following)))
    }

    async fn fetch_page<T: DeserializeOwned>(&self, url: &str, headers: &HeaderMap) -> Result<Page<T>> {
        let value = self.transport.get(url, headers).await?;
        serde_json::from_value(value)
            .map_err(|e| DaemoError::protocol(url, format!("not a page envelope: {}", e)))
    }
}
