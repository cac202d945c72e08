//! Page-number pagination.
//!
//! Slices an already filtered and ordered result set into numbered pages.
//! Pages are 1-indexed; requesting a page past the end is an error, except
//! page 1 of an empty result, which is simply empty.

use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("Invalid page.")]
    InvalidPage,
}

/// Requested page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// Build a request from raw query values.
    ///
    /// A missing or zero `page_size` falls back to `default_size`; anything
    /// larger than `max_size` is capped. A zero `page` is rejected.
    pub fn from_params(
        page: Option<usize>,
        page_size: Option<usize>,
        default_size: usize,
        max_size: usize,
    ) -> Result<Self, PageError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(PageError::InvalidPage);
        }
        let page_size = match page_size {
            Some(size) if size > 0 => size.min(max_size),
            _ => default_size,
        };
        Ok(Self { page, page_size })
    }

    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    /// Cut `items` down to the requested page.
    pub fn paginate<T>(&self, items: Vec<T>) -> Result<Page<T>, PageError> {
        let count = items.len();
        let total_pages = count.div_ceil(self.page_size).max(1);
        if self.page > total_pages {
            return Err(PageError::InvalidPage);
        }

        let items = items
            .into_iter()
            .skip(self.offset())
            .take(self.page_size)
            .collect();

        Ok(Page {
            items,
            count,
            page: self.page,
            page_size: self.page_size,
            total_pages,
        })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus enough context to link its neighbours.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the whole result set, not just this page.
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn next_page(&self) -> Option<usize> {
        (self.page < self.total_pages).then_some(self.page + 1)
    }

    pub fn previous_page(&self) -> Option<usize> {
        (self.page > 1).then(|| self.page - 1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page: usize, size: usize) -> PageRequest {
        PageRequest::from_params(Some(page), Some(size), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let req = PageRequest::from_params(None, None, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).unwrap();
        assert_eq!(req, PageRequest::default());
    }

    #[test]
    fn test_page_size_is_capped() {
        let req = PageRequest::from_params(None, Some(1000), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
            .unwrap();
        assert_eq!(req.page_size, 100);
    }

    #[test]
    fn test_zero_page_size_falls_back_to_default() {
        let req =
            PageRequest::from_params(None, Some(0), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE).unwrap();
        assert_eq!(req.page_size, 25);
    }

    #[test]
    fn test_zero_page_rejected() {
        assert_eq!(
            PageRequest::from_params(Some(0), None, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
            Err(PageError::InvalidPage)
        );
    }

    #[test]
    fn test_first_page_multi_page() {
        let page = request(1, 5).paginate((0..12).collect::<Vec<_>>()).unwrap();

        assert_eq!(page.items, vec![0, 1, 2, 3, 4]);
        assert_eq!(page.count, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.next_page(), Some(2));
        assert_eq!(page.previous_page(), None);
    }

    #[test]
    fn test_last_page_partial() {
        let page = request(3, 5).paginate((0..12).collect::<Vec<_>>()).unwrap();

        assert_eq!(page.items, vec![10, 11]);
        assert_eq!(page.next_page(), None);
        assert_eq!(page.previous_page(), Some(2));
    }

    #[test]
    fn test_page_past_end() {
        let result = request(4, 5).paginate((0..12).collect::<Vec<_>>());
        assert_eq!(result.unwrap_err(), PageError::InvalidPage);
    }

    #[test]
    fn test_empty_first_page_is_valid() {
        let page = request(1, 5).paginate(Vec::<u8>::new()).unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.count, 0);
        assert_eq!(page.next_page(), None);
    }

    #[test]
    fn test_map_keeps_window() {
        let page = request(2, 2)
            .paginate(vec![1, 2, 3, 4, 5])
            .unwrap()
            .map(|n| n * 10);

        assert_eq!(page.items, vec![30, 40]);
        assert_eq!(page.page, 2);
        assert_eq!(page.count, 5);
    }
}
