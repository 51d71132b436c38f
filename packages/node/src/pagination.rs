//! Query parameters and offset-based pagination links.

use std::fmt::Display;

use axum::{extract::Query, http::Uri};
use jsonapi_document::{keywords, Link, Links};

/// The JSON:API query parameters the middleware and handlers understand.
///
/// Unknown parameters are ignored and a repeated parameter keeps its last
/// value. A query string that cannot be decoded at all reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonApiQuery {
    page_offset: Option<String>,
    page_limit: Option<String>,
    include: Option<String>,
}

impl JsonApiQuery {
    pub fn from_uri(uri: &Uri) -> Self {
        match Query::<Vec<(String, String)>>::try_from_uri(uri) {
            Ok(Query(pairs)) => Self::from_pairs(pairs),
            Err(e) => {
                tracing::debug!(error = %e, uri = %uri, "query string discarded");
                Self::default()
            }
        }
    }

    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page[offset]" => &mut query.page_offset,
                "page[limit]" => &mut query.page_limit,
                "include" => &mut query.include,
                _ => continue,
            };
            *slot = Some(value);
        }
        query
    }

    pub fn page_offset(&self) -> Option<i64> {
        parse_int(self.page_offset.as_deref())
    }

    pub fn page_limit(&self) -> Option<i64> {
        parse_int(self.page_limit.as_deref())
    }

    /// Comma-separated `include` entries, empty entries dropped.
    pub fn include_paths(&self) -> Vec<String> {
        self.include
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The page window for a collection of `total_count` items, when both
    /// page parameters are present and usable.
    pub fn window(&self, total_count: u64) -> Option<PaginationWindow> {
        let total = i64::try_from(total_count).ok()?;
        PaginationWindow::new(self.page_offset()?, self.page_limit()?, total)
    }
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw?.trim().parse().ok()
}

/// One page of an offset/limit listing.
///
/// `prev` and `offset - limit` can go negative, and the last-page offset
/// rounds rather than floors. Clients see exactly these numbers.
///
/// Offsets are computed in `i128`, so any pair of `i64` page parameters
/// yields a link instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationWindow {
    offset: i128,
    limit: i128,
    total_count: i128,
}

impl PaginationWindow {
    /// `None` when `limit` is not positive.
    pub fn new(offset: i64, limit: i64, total_count: i64) -> Option<Self> {
        (limit > 0).then_some(Self {
            offset: offset.into(),
            limit: limit.into(),
            total_count: total_count.into(),
        })
    }

    pub fn last_offset(&self) -> i128 {
        let pages = (self.total_count as f64 / self.limit as f64).round() as i128;
        let last = pages.saturating_mul(self.limit);
        if last == self.total_count {
            self.total_count - self.limit
        } else {
            last
        }
    }

    pub fn prev_offset(&self) -> Option<i128> {
        (self.offset - 1 >= 0).then_some(self.offset - self.limit)
    }

    pub fn next_offset(&self) -> Option<i128> {
        let next = self.offset + self.limit;
        ((self.total_count - self.limit) - next >= 0).then_some(next)
    }

    /// `self`, `first`, `last` and, when applicable, `prev` and `next`,
    /// each pointing at `path` with the page query.
    pub fn links(&self, path: &str) -> Links {
        let link = |offset: i128| Link::new(uri_string(path, Some(&page_query(offset, self.limit))));

        let mut links = Links::new();
        links.insert(keywords::SELF.into(), link(self.offset));
        links.insert(keywords::FIRST.into(), link(0));
        if let Some(prev) = self.prev_offset() {
            links.insert(keywords::PREV.into(), link(prev));
        }
        if let Some(next) = self.next_offset() {
            links.insert(keywords::NEXT.into(), link(next));
        }
        links.insert(keywords::LAST.into(), link(self.last_offset()));
        links
    }
}

/// `page%5Boffset%5D={offset}&page%5Blimit%5D={limit}`
pub fn page_query(offset: impl Display, limit: impl Display) -> String {
    format!(
        "{}={offset}&{}={limit}",
        urlencoding::encode("page[offset]"),
        urlencoding::encode("page[limit]"),
    )
}

/// Path (with a leading `/`) plus `?query` when the query is non-empty.
pub fn uri_string(path: &str, query: Option<&str>) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    if !path.starts_with('/') {
        out.push('/');
    }
    out.push_str(path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        out.push('?');
        out.push_str(query);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(offset: i64, limit: i64, total: i64) -> PaginationWindow {
        PaginationWindow::new(offset, limit, total).unwrap()
    }

    fn href(links: &Links, name: &str) -> Option<String> {
        links.get(name).map(|l| l.href().to_string())
    }

    #[test]
    fn last_offset_rounds_up_past_a_partial_page() {
        assert_eq!(window(20, 20, 95).last_offset(), 100);
    }

    #[test]
    fn last_offset_on_exact_multiple_steps_back_one_page() {
        assert_eq!(window(0, 20, 100).last_offset(), 80);
    }

    #[test]
    fn last_offset_rounds_down_below_half_a_page() {
        assert_eq!(window(0, 20, 85).last_offset(), 80);
    }

    #[test]
    fn first_page_has_next_but_no_prev() {
        let links = window(0, 20, 100).links("/devices");
        assert!(!links.contains_key("prev"));
        assert_eq!(
            href(&links, "next").as_deref(),
            Some("/devices?page%5Boffset%5D=20&page%5Blimit%5D=20")
        );
        assert_eq!(
            href(&links, "first").as_deref(),
            Some("/devices?page%5Boffset%5D=0&page%5Blimit%5D=20")
        );
        assert_eq!(
            href(&links, "last").as_deref(),
            Some("/devices?page%5Boffset%5D=80&page%5Blimit%5D=20")
        );
    }

    #[test]
    fn prev_needs_a_positive_offset_and_may_go_negative() {
        assert_eq!(window(5, 20, 100).prev_offset(), Some(-15));
        assert_eq!(window(0, 20, 100).prev_offset(), None);
    }

    #[test]
    fn next_requires_a_full_page_beyond_the_following_one() {
        // 60 + 20 = 80 and 100 - 20 - 80 = 0: still present.
        assert_eq!(window(60, 20, 100).next_offset(), Some(80));
        assert_eq!(window(80, 20, 100).next_offset(), None);
        assert_eq!(window(20, 20, 95).next_offset(), Some(40));
        assert_eq!(window(60, 20, 95).next_offset(), None);
    }

    #[test]
    fn middle_page_links() {
        let links = window(20, 20, 95).links("devices");
        let names: Vec<_> = links.keys().map(String::as_str).collect();
        assert_eq!(names, ["first", "last", "next", "prev", "self"]);
        assert_eq!(
            href(&links, "self").as_deref(),
            Some("/devices?page%5Boffset%5D=20&page%5Blimit%5D=20")
        );
        assert_eq!(
            href(&links, "last").as_deref(),
            Some("/devices?page%5Boffset%5D=100&page%5Blimit%5D=20")
        );
    }

    #[test]
    fn non_positive_limit_disables_pagination() {
        assert!(PaginationWindow::new(0, 0, 10).is_none());
        assert!(PaginationWindow::new(0, -5, 10).is_none());
    }

    #[test]
    fn query_parsing() {
        let uri: Uri = "/devices?page%5Boffset%5D=40&page%5Blimit%5D=20&include=channels,,device.channels&x=1"
            .parse()
            .unwrap();
        let query = JsonApiQuery::from_uri(&uri);
        assert_eq!(query.page_offset(), Some(40));
        assert_eq!(query.page_limit(), Some(20));
        assert_eq!(query.include_paths(), ["channels", "device.channels"]);
        assert_eq!(query.window(95), PaginationWindow::new(40, 20, 95));
    }

    #[test]
    fn unusable_page_parameters_mean_no_window() {
        let uri: Uri = "/devices?page%5Boffset%5D=abc&page%5Blimit%5D=20".parse().unwrap();
        assert!(JsonApiQuery::from_uri(&uri).window(10).is_none());

        let uri: Uri = "/devices?page%5Blimit%5D=20".parse().unwrap();
        assert!(JsonApiQuery::from_uri(&uri).window(10).is_none());
    }

    #[test]
    fn extreme_offsets_produce_links_instead_of_overflowing() {
        let uri: Uri = "/devices?page%5Boffset%5D=9223372036854775807&page%5Blimit%5D=20"
            .parse()
            .unwrap();
        let links = JsonApiQuery::from_uri(&uri).window(95).unwrap().links("/devices");
        assert_eq!(
            href(&links, "prev").as_deref(),
            Some("/devices?page%5Boffset%5D=9223372036854775787&page%5Blimit%5D=20")
        );
        assert!(!links.contains_key("next"));
        assert_eq!(
            href(&links, "last").as_deref(),
            Some("/devices?page%5Boffset%5D=100&page%5Blimit%5D=20")
        );

        let uri: Uri = "/devices?page%5Boffset%5D=-9223372036854775808&page%5Blimit%5D=20"
            .parse()
            .unwrap();
        let links = JsonApiQuery::from_uri(&uri).window(95).unwrap().links("/devices");
        assert!(!links.contains_key("prev"));
        assert_eq!(
            href(&links, "next").as_deref(),
            Some("/devices?page%5Boffset%5D=-9223372036854775788&page%5Blimit%5D=20")
        );
    }

    #[test]
    fn extreme_limit_keeps_the_last_page_arithmetic() {
        let empty = window(i64::MAX, i64::MAX, 0);
        assert_eq!(empty.last_offset(), -i128::from(i64::MAX));
        assert_eq!(empty.prev_offset(), Some(0));
        assert_eq!(empty.next_offset(), None);
    }

    #[test]
    fn repeated_parameters_keep_the_last_value() {
        let uri: Uri = "/devices?include=channels&page%5Boffset%5D=0&include=device&page%5Blimit%5D=10"
            .parse()
            .unwrap();
        let query = JsonApiQuery::from_uri(&uri);
        assert_eq!(query.include_paths(), ["device"]);
        assert_eq!(query.page_offset(), Some(0));
        assert_eq!(query.page_limit(), Some(10));
    }

    #[test]
    fn uri_string_enforces_leading_slash_and_skips_empty_query() {
        assert_eq!(uri_string("devices", Some("")), "/devices");
        assert_eq!(uri_string("/devices", Some("a=1")), "/devices?a=1");
        assert_eq!(uri_string("/devices", None), "/devices");
    }
}
