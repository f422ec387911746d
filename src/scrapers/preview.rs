//! Best-effort link previews read from a page's meta description.

use crate::http::HttpFetcher;
use crate::utils::{collapse_whitespace, truncate_chars};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument};

static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static OG_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:description"]"#).unwrap());

/// Pull `meta[name=description]`, falling back to `og:description`.
pub fn extract_meta_description(html: &str, budget: usize) -> Option<String> {
    let document = Html::parse_document(html);
    [&*META_DESCRIPTION, &*OG_DESCRIPTION]
        .into_iter()
        .filter_map(|selector| {
            document
                .select(selector)
                .filter_map(|el| el.value().attr("content"))
                .map(collapse_whitespace)
                .find(|content| !content.is_empty())
        })
        .next()
        .map(|content| truncate_chars(&content, budget).trim_end().to_string())
}

/// Fetch `url` once and read its description.
///
/// Any failure (timeout, non-2xx, no description) yields `None`.
#[instrument(level = "debug", skip(http, timeout, budget))]
pub async fn fetch_link_preview(
    http: &HttpFetcher,
    url: &str,
    timeout: Duration,
    budget: usize,
) -> Option<String> {
    match http.get_text_once(url, timeout).await {
        Ok(html) => extract_meta_description(&html, budget),
        Err(e) => {
            debug!(error = %e, "Link preview unavailable");
            None
        }
    }
}
