//! Page-number pagination over listing endpoints.

use std::future::Future;

use tracing::debug;

/// Fetch pages `1, 2, 3, ...` until one comes back shorter than `page_size`,
/// and return every item in page order.
///
/// Each call starts again from page 1. There is no ceiling on the number of
/// pages. An empty page always terminates, so a zero `page_size` cannot loop.
pub async fn fetch_all_pages<T, E, F, Fut>(page_size: u32, mut fetch_page: F) -> Result<Vec<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let mut items = Vec::new();
    let mut page = 1u32;
    loop {
        let batch = fetch_page(page).await?;
        let len = batch.len();
        items.extend(batch);
        debug!(page, len, total = items.len(), "fetched page");
        if len == 0 || len < page_size as usize {
            break;
        }
        page += 1;
    }
    Ok(items)
}
