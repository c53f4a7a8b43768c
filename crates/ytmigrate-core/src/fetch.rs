//! Cursor-driven pagination over remote listings.
//!
//! One iteration driver serves every paged listing: it composes a
//! page-fetch closure with cursor advancement until the remote system
//! stops returning a continuation cursor. Both the collection listing
//! and the per-collection item listing go through [`fetch_all`].

use tracing::debug;

use crate::api::ApiResult;
use crate::error::FetchError;
use crate::model::Page;

/// Fixed upper bound on items requested per page.
///
/// The remote system caps page sizes at 50; there is no client-side
/// negotiation beyond requesting that maximum.
pub const MAX_PAGE_SIZE: u64 = 50;

/// Walk a paged listing to completion, preserving remote order.
///
/// `selector` names the listing for diagnostics (e.g. `"playlists"` or
/// `"playlist PL123"`). `fetch_page` is called with `None` first, then
/// with each continuation cursor the previous page returned.
///
/// An empty listing yields an empty vector, not an error. Failure of
/// any single page request fails the whole fetch; a listing is never
/// silently truncated.
///
/// # Errors
///
/// Returns [`FetchError::PageRequestFailed`] if any page request fails.
pub fn fetch_all<T, F>(selector: &str, mut fetch_page: F) -> Result<Vec<T>, FetchError>
where
    F: FnMut(Option<&str>) -> ApiResult<Page<T>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch_page(cursor.as_deref()).map_err(|e| FetchError::PageRequestFailed {
            selector: selector.to_string(),
            message: e.to_string(),
        })?;

        pages += 1;
        debug!(
            selector,
            page = pages,
            page_items = page.items.len(),
            "fetched listing page"
        );
        items.extend(page.items);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    debug!(selector, total = items.len(), pages, "listing complete");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    /// Fake paged source serving fixed-size pages of numbered items.
    fn paged_source(
        page_sizes: &'static [usize],
    ) -> impl FnMut(Option<&str>) -> ApiResult<Page<String>> {
        move |cursor: Option<&str>| {
            let page_index: usize = match cursor {
                None => 0,
                Some(c) => c.parse().map_err(|_| ApiError::transport("bad cursor"))?,
            };
            let start: usize = page_sizes[..page_index].iter().sum();
            let items = (start..start + page_sizes[page_index])
                .map(|i| format!("item-{i:03}"))
                .collect();
            let next_cursor = if page_index + 1 < page_sizes.len() {
                Some((page_index + 1).to_string())
            } else {
                None
            };
            Ok(Page { items, next_cursor })
        }
    }

    #[test]
    fn test_fetch_all_three_pages_complete_and_ordered() {
        let items = fetch_all("items", paged_source(&[50, 50, 7])).expect("fetch should succeed");

        assert_eq!(items.len(), 107);
        for (i, item) in items.iter().enumerate() {
            assert_eq!(item, &format!("item-{i:03}"));
        }
    }

    #[test]
    fn test_fetch_all_single_page() {
        let items = fetch_all("items", paged_source(&[3])).expect("fetch should succeed");
        assert_eq!(items, vec!["item-000", "item-001", "item-002"]);
    }

    #[test]
    fn test_fetch_all_empty_listing_is_not_an_error() {
        let items = fetch_all("items", |_cursor| Ok(Page::<String>::empty()))
            .expect("empty listing should succeed");
        assert!(items.is_empty());
    }

    #[test]
    fn test_fetch_all_page_failure_is_fatal() {
        let mut calls = 0;
        let result: Result<Vec<String>, _> = fetch_all("items", |cursor| {
            calls += 1;
            match cursor {
                None => Ok(Page {
                    items: vec!["a".to_string()],
                    next_cursor: Some("1".to_string()),
                }),
                Some(_) => Err(ApiError::transport("backend unavailable")),
            }
        });

        let err = result.expect_err("second page failure must fail the fetch");
        assert!(err.to_string().contains("items"));
        assert!(err.to_string().contains("backend unavailable"));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_fetch_all_passes_cursors_through_opaquely() {
        let mut seen = Vec::new();
        let _items: Vec<String> = fetch_all("items", |cursor| {
            seen.push(cursor.map(String::from));
            let next = match cursor {
                None => Some("opaque-token-A".to_string()),
                Some("opaque-token-A") => Some("opaque-token-B".to_string()),
                Some(_) => None,
            };
            Ok(Page {
                items: Vec::new(),
                next_cursor: next,
            })
        })
        .expect("fetch should succeed");

        assert_eq!(
            seen,
            vec![
                None,
                Some("opaque-token-A".to_string()),
                Some("opaque-token-B".to_string())
            ]
        );
    }
}
