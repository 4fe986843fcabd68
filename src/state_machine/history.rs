//! On-demand copy of the user's stored analyses

use crate::sentiment::{HistoryItem, HistoryPage};
use std::collections::HashSet;

/// Position of the cached page within the full history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageInfo {
    pub page: u32,
    pub pages: u32,
    pub total: u64,
    /// Page size the cached page was requested with
    pub limit: u32,
}

/// Page count the service reports for `total` rows at `limit` per page
fn page_count(total: u64, limit: u32) -> u32 {
    u32::try_from(total.div_ceil(u64::from(limit.max(1)))).unwrap_or(u32::MAX)
}

/// Cached history list. Entries keep the service's order and are unique by id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryCache {
    items: Vec<HistoryItem>,
    page: Option<PageInfo>,
}

impl HistoryCache {
    /// Replace the cache with a freshly fetched page.
    ///
    /// Repeated ids in the payload collapse to their first occurrence.
    pub fn replace(&mut self, page: HistoryPage, limit: u32) {
        let mut seen = HashSet::new();
        self.items = page
            .chats
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();
        self.page = Some(PageInfo {
            page: page.page,
            pages: page.pages,
            total: page.total,
            limit,
        });
    }

    /// Drop the entry with `id`, if cached. The page metadata follows the
    /// shrunken total.
    pub fn remove(&mut self, id: &str) -> Option<HistoryItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        if let Some(info) = self.page.as_mut() {
            info.total = info.total.saturating_sub(1);
            info.pages = page_count(info.total, info.limit);
        }
        Some(self.items.remove(index))
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// `None` until the first successful load
    pub fn page_info(&self) -> Option<PageInfo> {
        self.page
    }

    pub fn is_loaded(&self) -> bool {
        self.page.is_some()
    }
}
