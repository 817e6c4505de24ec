//! Page-number pagination.
//!
//! Clients send `page` (1-based) and `limit`; responses carry the total
//! `count` plus absolute `next` and `previous` links that keep every other
//! query parameter intact.

use axum::http::Uri;
use foodgram_common::{AppError, AppResult, config::PaginationConfig};
use serde::{Deserialize, Serialize};
use url::Url;

/// Raw pagination query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
}

/// Resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
}

impl PageParams {
    /// Apply defaults and bounds from configuration.
    pub fn resolve(self, config: &PaginationConfig) -> AppResult<PageRequest> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(invalid_page());
        }

        let limit = match self.limit {
            None | Some(0) => config.page_size,
            Some(limit) => limit.min(config.max_page_size),
        };

        Ok(PageRequest { page, limit })
    }
}

impl PageRequest {
    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    const fn has_next(&self, count: u64) -> bool {
        self.page.saturating_mul(self.limit) < count
    }
}

/// A page of results.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    /// Total number of rows across all pages.
    pub count: u64,
    /// Absolute URL of the next page.
    pub next: Option<String>,
    /// Absolute URL of the previous page.
    pub previous: Option<String>,
    /// Rows on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page for a request to `uri`.
    ///
    /// Any page past the first that starts beyond `count` is a 404, as is
    /// page zero.
    pub fn new(
        results: Vec<T>,
        count: u64,
        request: PageRequest,
        base_url: &str,
        uri: &Uri,
    ) -> AppResult<Self> {
        if request.page > 1 && request.offset() >= count {
            return Err(invalid_page());
        }

        let next = if request.has_next(count) {
            page_url(base_url, uri, Some(request.page + 1))
        } else {
            None
        };

        // The first page is linked without a page parameter
        let previous = match request.page {
            1 => None,
            2 => page_url(base_url, uri, None),
            page => page_url(base_url, uri, Some(page - 1)),
        };

        Ok(Self {
            count,
            next,
            previous,
            results,
        })
    }
}

fn invalid_page() -> AppError {
    AppError::NotFound("Invalid page".to_string())
}

fn page_url(base_url: &str, uri: &Uri, page: Option<u64>) -> Option<String> {
    let mut url = Url::parse(base_url).ok()?.join(uri.path()).ok()?;

    let pairs: Vec<(String, String)> =
        url::form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
            .filter(|(key, _)| key != "page")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

    url.set_query(None);
    if !pairs.is_empty() || page.is_some() {
        let mut query = url.query_pairs_mut();
        for (key, value) in &pairs {
            query.append_pair(key, value);
        }
        if let Some(page) = page {
            query.append_pair("page", &page.to_string());
        }
    }

    Some(url.into())
}
