//! Cursor-based pagination for Shopify list endpoints.
//!
//! Shopify paginates with a `Link` response header:
//!
//! ```text
//! Link: <https://shop.myshopify.com/admin/api/2024-01/themes.json?limit=2&page_info=abc>; rel="next",
//!       <https://shop.myshopify.com/admin/api/2024-01/themes.json?limit=2&page_info=xyz>; rel="previous"
//! ```
//!
//! Each URL becomes a [`PageCursor`]; a page without a `next` cursor is the
//! last one.

use futures::stream::BoxStream;
use serde::Serialize;
use url::Url;

use crate::error::Result;

/// Query parameter carrying the opaque cursor.
pub const PAGE_INFO_PARAM: &str = "page_info";

/// Largest page size Shopify accepts.
pub const MAX_PAGE_SIZE: u32 = 250;

/// Lazy sequence of entities spanning every page of a list call.
///
/// Pages are fetched only when the consumer advances past the items already
/// buffered. The stream is single-use: listing again issues new requests.
pub type ListStream<'a, T> = BoxStream<'a, Result<T>>;

/// Opaque position in a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageCursor {
    page_info: String,
    params: Vec<(String, String)>,
}

impl PageCursor {
    /// Build a cursor from a `page_info` token and its companion parameters.
    pub fn new(page_info: impl Into<String>, mut params: Vec<(String, String)>) -> Self {
        let page_info = page_info.into();
        if !params.iter().any(|(k, _)| k == PAGE_INFO_PARAM) {
            params.push((PAGE_INFO_PARAM.to_string(), page_info.clone()));
        }
        Self { page_info, params }
    }

    /// Extract a cursor from a pagination URL.
    ///
    /// Returns `None` when the URL has no `page_info` parameter.
    pub fn from_url(url: &Url) -> Option<Self> {
        let params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let page_info = params
            .iter()
            .find(|(k, _)| k == PAGE_INFO_PARAM)
            .map(|(_, v)| v.clone())?;
        Some(Self { page_info, params })
    }

    /// The raw `page_info` token.
    pub fn page_info(&self) -> &str {
        &self.page_info
    }

    /// Query parameters to send for this page, in server order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Cursors found in a `Link` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkCursors {
    pub next: Option<PageCursor>,
    pub previous: Option<PageCursor>,
}

/// Parse a `Link` header into next/previous cursors.
///
/// Unknown relations, unparseable URLs and URLs without `page_info` are
/// ignored.
pub fn parse_link_header(header: &str) -> LinkCursors {
    let mut cursors = LinkCursors::default();
    let mut rest = header;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('>') else {
            break;
        };
        let target = &after[..end];
        let tail = &after[end + 1..];
        let params_end = tail.find('<').unwrap_or(tail.len());
        let params = &tail[..params_end];
        rest = &tail[params_end..];

        let rels: Vec<&str> = params
            .split(';')
            .filter_map(|p| p.trim().strip_prefix("rel="))
            .flat_map(|r| r.trim_matches('"').split_whitespace())
            .collect();

        let Some(cursor) = Url::parse(target).ok().as_ref().and_then(PageCursor::from_url)
        else {
            continue;
        };

        for rel in rels {
            match rel {
                "next" => cursors.next = Some(cursor.clone()),
                "previous" | "prev" => cursors.previous = Some(cursor.clone()),
                _ => {}
            }
        }
    }

    cursors
}

/// A page of results from a Shopify list endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page, in server order.
    pub items: Vec<T>,
    /// Cursor for the following page.
    pub next: Option<PageCursor>,
    /// Cursor for the preceding page.
    pub previous: Option<PageCursor>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, cursors: LinkCursors) -> Self {
        Self {
            items,
            next: cursors.next,
            previous: cursors.previous,
        }
    }

    /// Whether another page follows this one.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next: self.next,
            previous: self.previous,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
