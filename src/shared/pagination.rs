use serde::{Deserialize, Serialize};

/// Paging fields shared by every search request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchPaging {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub retrieve_all: bool,
    pub include_total_count: bool,
    /// Substring matched against the resource's full-text fields
    pub fts: Option<String>,
}

impl SearchPaging {
    pub fn page(page: u64, page_size: u64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    pub fn full_text_token(&self) -> Option<&str> {
        self.fts.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Rows to skip, only when both page and page size are present
    pub fn offset(&self) -> Option<u64> {
        if self.retrieve_all {
            return None;
        }
        match (self.page, self.page_size) {
            (Some(page), Some(size)) => Some(page * size),
            _ => None,
        }
    }

    pub fn limit(&self) -> Option<u64> {
        if self.retrieve_all {
            None
        } else {
            self.page_size
        }
    }
}

/// Implemented by every resource search request
pub trait SearchCriteria {
    fn paging(&self) -> &SearchPaging;
}

/// Paged response wrapper
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: Option<u64>,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: Option<u64>) -> Self {
        Self { items, total_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_requires_page_and_size() {
        let paging = SearchPaging::page(2, 10);
        assert_eq!(paging.offset(), Some(20));
        assert_eq!(paging.limit(), Some(10));

        let size_only = SearchPaging {
            page_size: Some(5),
            ..Default::default()
        };
        assert_eq!(size_only.offset(), None);
        assert_eq!(size_only.limit(), Some(5));
    }

    #[test]
    fn retrieve_all_bypasses_paging() {
        let paging = SearchPaging {
            retrieve_all: true,
            ..SearchPaging::page(3, 10)
        };
        assert_eq!(paging.offset(), None);
        assert_eq!(paging.limit(), None);
    }

    #[test]
    fn blank_full_text_token_is_ignored() {
        let paging = SearchPaging {
            fts: Some("   ".into()),
            ..Default::default()
        };
        assert!(paging.full_text_token().is_none());
    }
}
