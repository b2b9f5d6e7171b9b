use serde::{Deserialize, Serialize};

/// One page of a larger result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: u32, size: u32) -> Self {
        Self { items, total, page: page.max(1), size }
    }

    /// A page holding the whole result set; size mirrors the item count.
    pub fn unpaged(items: Vec<T>) -> Self {
        let size = items.len() as u32;
        Self { total: items.len() as i64, items, page: 1, size }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_pages(&self) -> u32 {
        if self.size == 0 {
            return if self.total > 0 { 1 } else { 0 };
        }
        ((self.total.max(0) as u64).div_ceil(self.size as u64)) as u32
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where F: FnMut(T) -> U {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
        }
    }
}
