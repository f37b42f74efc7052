// src/api/pagination.rs
//! Page-numbered traversal of a listing endpoint.

use super::throttle::AdaptiveThrottle;
use crate::constants::{PAGE_FETCH_ESCALATION, PAGE_FETCH_PAUSE};
use crate::error::AppError;
use crate::events::{RunEvent, RunObserver};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEnvelope<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
}

/// Accumulates every page of a listing into one ordered vector.
pub struct PaginatedCollector {
    throttle: AdaptiveThrottle,
    observer: Arc<dyn RunObserver>,
    pause: Duration,
}

impl PaginatedCollector {
    pub fn new(throttle: AdaptiveThrottle, observer: Arc<dyn RunObserver>) -> Self {
        Self {
            throttle,
            observer,
            pause: PAGE_FETCH_PAUSE,
        }
    }

    /// Fetches pages 1..=N, where N is the page count reported by page 1.
    ///
    /// Later pages' totals are not consulted, so a collection that grows or
    /// shrinks during the walk can be over- or under-collected. Any error
    /// aborts the walk and discards what was gathered.
    pub async fn collect_all<T, F, Fut>(&self, mut fetch_page: F) -> Result<Vec<T>, AppError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<PageEnvelope<T>, AppError>>,
    {
        let first = fetch_page(1).await?;
        let total_pages = first.total_pages;
        self.report(1, total_pages, first.items.len());

        let mut all_items = first.items;
        let mut page = 2u32;

        while page <= total_pages {
            self.throttle.delay(self.pause, PAGE_FETCH_ESCALATION).await;

            let envelope = fetch_page(page).await?;
            if envelope.current_page != page {
                log::warn!(
                    "Asked for page {} but the server labelled it {}",
                    page,
                    envelope.current_page
                );
            }
            self.report(page, total_pages, envelope.items.len());
            all_items.extend(envelope.items);
            page += 1;
        }

        log::debug!(
            "Collected {} items over {} page(s)",
            all_items.len(),
            total_pages.max(1)
        );
        Ok(all_items)
    }

    fn report(&self, page: u32, total_pages: u32, items: usize) {
        self.observer.observe(RunEvent::PageCollected {
            page,
            total_pages,
            items,
        });
    }
}
