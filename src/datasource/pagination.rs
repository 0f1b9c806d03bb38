//! Cursor-based page loop shared by every subgraph fetch.
//!
//! Rows are ordered ascending by a backend-assigned monotonic id, never by
//! time, so nothing is skipped or duplicated when the underlying data grows
//! between pages. The loop terminates on the first page shorter than the
//! page size; a result set that is an exact multiple of the page size costs
//! one extra round trip returning zero rows.

use super::SourceError;
use std::future::Future;

/// Page size for every paginated subgraph query.
pub const PAGE_SIZE: usize = 1000;

/// A row type that carries the backend-assigned pagination cursor.
pub trait Cursored {
    fn cursor(&self) -> &str;
}

/// Fetch every page of a cursor-ordered query. `fetch_page` receives the
/// cursor to resume after (empty string for the first page) and returns one
/// page of at most `page_size` rows. Any page error aborts the whole loop.
pub async fn collect_pages<R, F, Fut>(
    page_size: usize,
    mut fetch_page: F,
) -> Result<Vec<R>, SourceError>
where
    R: Cursored,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<R>, SourceError>>,
{
    let mut rows = Vec::new();
    let mut cursor = String::new();

    loop {
        let page = fetch_page(cursor.clone()).await?;
        let page_len = page.len();
        if let Some(last) = page.last() {
            cursor = last.cursor().to_string();
        }
        rows.extend(page);

        if page_len < page_size {
            return Ok(rows);
        }
    }
}
