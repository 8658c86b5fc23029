use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query string parameters for paged resources.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// A normalized page request. Pages are 1-based.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageParams {
    page: u32,
    per_page: u32,
}

impl PageParams {
    /// Build page parameters, clamping out of range values rather than
    /// rejecting them.
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl From<PageQuery> for PageParams {
    fn from(query: PageQuery) -> Self {
        Self::new(query.page, query.per_page)
    }
}

/// One page of a larger collection.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, params: PageParams, total: u64) -> Self {
        Self {
            items,
            page: params.page(),
            per_page: params.per_page(),
            total,
        }
    }

    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Page<U> {
        Page {
            items: self.items.iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let params = PageParams::new(None, None);

        assert_eq!(1, params.page());
        assert_eq!(DEFAULT_PAGE_SIZE, params.per_page());
        assert_eq!(0, params.offset());
    }

    #[test]
    fn clamps_out_of_range_values() {
        let params = PageParams::new(Some(0), Some(1_000));

        assert_eq!(1, params.page());
        assert_eq!(MAX_PAGE_SIZE, params.per_page());

        let params = PageParams::new(Some(2), Some(0));
        assert_eq!(1, params.per_page());
    }

    #[test]
    fn offset_skips_previous_pages() {
        let params = PageParams::new(Some(3), Some(25));

        assert_eq!(50, params.offset());
        assert_eq!(25, params.limit());
    }
}
