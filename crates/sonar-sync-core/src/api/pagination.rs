//! Cursor pagination

use std::collections::BTreeSet;

use super::types::Page;
use crate::Result;

/// Follow `pagination.cursor` until a page carries none
///
/// `fetch` receives `None` for the first page and the previous page's
/// cursor afterwards. A cursor that was already requested ends the walk,
/// whether echoed back at once or after a longer cycle.
pub fn collect_pages<T, F>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut seen = BTreeSet::new();
    let mut pages = 0usize;
    let mut total = None;

    loop {
        let page = fetch(cursor.as_deref())?;
        pages += 1;
        if let Some(pagination) = &page.pagination {
            total = pagination.total.or(total);
        }
        let next = page.next_cursor().map(str::to_string);
        items.extend(page.data);

        match next {
            None => break,
            Some(next) if !seen.insert(next.clone()) => {
                tracing::warn!(cursor = %next, "API returned an already visited cursor, stopping");
                break;
            }
            Some(next) => cursor = Some(next),
        }
    }

    tracing::debug!(pages, items = items.len(), ?total, "Collected paginated results");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::api::types::Pagination;

    fn page(data: &[u32], cursor: Option<&str>) -> Page<u32> {
        Page {
            data: data.to_vec(),
            pagination: Some(Pagination {
                cursor: cursor.map(str::to_string),
                ..Pagination::default()
            }),
        }
    }

    #[test]
    fn test_follows_cursors_in_order() {
        let mut requested = Vec::new();
        let items = collect_pages(|cursor| {
            requested.push(cursor.map(str::to_string));
            Ok(match cursor {
                None => page(&[1, 2], Some("c1")),
                Some("c1") => page(&[3], Some("c2")),
                _ => page(&[4], None),
            })
        })
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(
            requested,
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
    }

    #[test]
    fn test_single_page_without_pagination() {
        let items = collect_pages(|_| {
            Ok(Page {
                data: vec![7u32],
                pagination: None,
            })
        })
        .unwrap();
        assert_eq!(items, vec![7]);
    }

    #[test]
    fn test_repeated_cursor_stops() {
        let mut calls = 0;
        let items = collect_pages(|_| {
            calls += 1;
            Ok(page(&[1], Some("same")))
        })
        .unwrap();
        assert_eq!(calls, 2);
        assert_eq!(items, vec![1, 1]);
    }

    #[test]
    fn test_cursor_cycle_stops() {
        let mut requested = Vec::new();
        let items = collect_pages(|cursor| {
            requested.push(cursor.map(str::to_string));
            Ok(match cursor {
                None => page(&[1], Some("a")),
                Some("a") => page(&[2], Some("b")),
                _ => page(&[3], Some("a")),
            })
        })
        .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(
            requested,
            vec![None, Some("a".to_string()), Some("b".to_string())]
        );
    }

    #[test]
    fn test_error_on_later_page_propagates() {
        let result: Result<Vec<u32>> = collect_pages(|cursor| match cursor {
            None => Ok(page(&[1], Some("next"))),
            Some(_) => Err(Error::Api {
                status: 500,
                url: "https://example.test/tools".to_string(),
                body: String::new(),
            }),
        });
        assert!(matches!(result, Err(Error::Api { status: 500, .. })));
    }
}
