use serde::{Deserialize, Serialize};

/// Arguments of a paginated list request.
///
/// Serializes straight into the query string; an empty search term is left
/// off entirely so the server returns the unfiltered set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(rename = "searchTerm", default, skip_serializing_if = "String::is_empty")]
    pub search_term: String,
}

impl ListQuery {
    pub fn new(page: u32, limit: u32, search_term: impl Into<String>) -> Self {
        Self {
            page,
            limit,
            search_term: search_term.into(),
        }
    }
}

/// One page of rows plus the server-side count of all matching rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(rows: Vec<T>, total: u64) -> Self {
        Self { rows, total }
    }

    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn page_count(&self, page_size: u32) -> u32 {
        page_count(self.total, page_size)
    }
}

/// Number of pages needed to show `total` rows, `page_size` at a time.
pub fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
