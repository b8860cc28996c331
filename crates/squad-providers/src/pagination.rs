// ABOUTME: Page-until-short-page collection for offset and page-number APIs
// ABOUTME: Streams equal-size pages lazily and stops on a short page or the page cap
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Page Collection
//!
//! Garmin's activity search takes an item offset, Strava's athlete activities
//! take a 1-based page number. Both return equal-size pages until the history
//! runs out, so a page shorter than the requested size marks the end.
//!
//! [`page_stream`] yields items as pages arrive; [`collect_pages`] drains it.
//! A page cap bounds the number of requests when a provider keeps returning
//! full pages.

use async_stream::try_stream;
use futures_util::{Stream, TryStreamExt};
use squad_core::errors::{ProviderError, ProviderResult};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use tracing::warn;

/// Position of the page being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 0-based page index
    pub index: usize,
    /// Item offset of the first entry (`index * size`)
    pub offset: usize,
    /// Requested page size
    pub size: usize,
}

impl PageRequest {
    /// 1-based page number, for APIs that count pages from one
    #[must_use]
    pub const fn number(&self) -> usize {
        self.index + 1
    }
}

/// Boxed stream of paged items
pub type PageStream<'a, T> = Pin<Box<dyn Stream<Item = ProviderResult<T>> + Send + 'a>>;

/// Lazily fetch pages of `page_size` until a short page or `max_pages`
///
/// An empty page and a page shorter than `page_size` both end the stream.
/// Hitting `max_pages` ends it too, logged at `warn`.
pub fn page_stream<'a, T, F, Fut>(
    page_size: usize,
    max_pages: usize,
    mut fetch_page: F,
) -> PageStream<'a, T>
where
    T: Send + 'a,
    F: FnMut(PageRequest) -> Fut + Send + 'a,
    Fut: Future<Output = ProviderResult<Vec<T>>> + Send + 'a,
{
    let page_size = page_size.max(1);

    Box::pin(try_stream! {
        let mut buffer: VecDeque<T> = VecDeque::new();
        let mut index = 0;
        let mut exhausted = false;

        loop {
            if let Some(item) = buffer.pop_front() {
                yield item;
                continue;
            }

            if exhausted {
                break;
            }

            if index >= max_pages {
                warn!(max_pages, page_size, "page cap reached, history truncated");
                break;
            }

            let request = PageRequest {
                index,
                offset: index * page_size,
                size: page_size,
            };
            let page = fetch_page(request).await?;
            index += 1;

            if page.len() < page_size {
                exhausted = true;
            }
            buffer.extend(page);
        }
    })
}

/// Collect every item across pages
///
/// # Errors
///
/// Returns the first error any page fetch produced; items from earlier pages
/// are discarded.
pub async fn collect_pages<'a, T, F, Fut>(
    page_size: usize,
    max_pages: usize,
    fetch_page: F,
) -> Result<Vec<T>, ProviderError>
where
    T: Send + 'a,
    F: FnMut(PageRequest) -> Fut + Send + 'a,
    Fut: Future<Output = ProviderResult<Vec<T>>> + Send + 'a,
{
    page_stream(page_size, max_pages, fetch_page)
        .try_collect()
        .await
}
