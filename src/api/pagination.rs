//! Page-number pagination shared by the list endpoints.
//!
//! `?page=N&limit=M` in, `{count, next, previous, results}` out, with
//! absolute `next`/`previous` links that keep every other query parameter.

use axum::http::Uri;
use serde::Serialize;
use url::Url;

use crate::config::PaginationConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl PageParams {
    /// Parse raw query values. A non-numeric `page` is rejected; a bad
    /// `limit` falls back to the default and is clamped to the maximum.
    pub fn parse(page: Option<&str>, limit: Option<&str>, config: &PaginationConfig) -> Result<Self> {
        let page = match page {
            None => 1,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or_else(|| Error::NotFound("Invalid page.".to_string()))?,
        };

        let limit = limit
            .and_then(|raw| raw.parse::<u32>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(config.page_size)
            .min(config.max_page_size);

        Ok(Self { page, limit })
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// Pages past the end are an error, except the first page of an empty set.
    pub fn check_in_range(&self, count: i64) -> Result<()> {
        if self.page > 1 && self.offset() >= count {
            return Err(Error::NotFound("Invalid page.".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, params: PageParams, public_url: &str, uri: &Uri) -> Self {
        let has_next = params.offset() + i64::from(params.limit) < count;
        Self {
            count,
            next: has_next
                .then(|| page_url(public_url, uri, params.page + 1))
                .flatten(),
            previous: (params.page > 1)
                .then(|| page_url(public_url, uri, params.page - 1))
                .flatten(),
            results,
        }
    }
}

/// The request URL with `page` replaced; page 1 drops the parameter.
fn page_url(public_url: &str, uri: &Uri, page: u32) -> Option<String> {
    let mut url = Url::parse(&format!("{}{}", public_url.trim_end_matches('/'), uri.path())).ok()?;

    let kept: Vec<(String, String)> = uri
        .query()
        .map(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .filter(|(key, _)| key != "page")
                .collect()
        })
        .unwrap_or_default();

    if !kept.is_empty() || page > 1 {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        if page > 1 {
            pairs.append_pair("page", &page.to_string());
        }
    }

    Some(url.into())
}
