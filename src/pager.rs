//! Client-side infinite scroll over an already fetched list.
//!
//! Nothing is fetched here. The pager only widens a visible prefix of
//! `items`, `per_page` at a time, after a short simulated load delay.

use std::time::Duration;

pub const DEFAULT_LOAD_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct InfiniteScroll<T> {
    items: Vec<T>,
    per_page: usize,
    page: usize,
    loading: bool,
    delay: Duration,
}

impl<T> InfiniteScroll<T> {
    /// A `per_page` of zero is treated as one.
    #[must_use]
    pub fn new(items: Vec<T>, per_page: usize) -> Self {
        Self { items, per_page: per_page.max(1), page: 1, loading: false, delay: DEFAULT_LOAD_DELAY }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn visible_items(&self) -> &[T] {
        let end = self
            .page
            .saturating_mul(self.per_page)
            .min(self.items.len());
        &self.items[..end]
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.visible_items().len() < self.items.len()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Replace the underlying list, keeping the current page.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Reveal the next `per_page` items. Returns whether anything was revealed.
    pub async fn load_more(&mut self) -> bool {
        if self.loading || !self.has_more() {
            return false;
        }
        let loading = LoadingFlag::raise(&mut self.loading);
        tokio::time::sleep(self.delay).await;
        self.page += 1;
        drop(loading);
        true
    }
}

/// Clears `loading` when dropped, including when `load_more` is cancelled mid-delay.
struct LoadingFlag<'a>(&'a mut bool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

#[cfg(test)]
#[path = "pager_test.rs"]
mod tests;
