//! Source fetchers for every category.
//!
//! Two fetcher shapes share one output contract, an ordered `Vec<Item>`:
//!
//! | Shape | Module | Categories | Scoring |
//! |-------|--------|------------|---------|
//! | Point API | [`hackernews`] | Hacker News | `min(score + comments * 2, 100)` |
//! | RSS/Atom | [`feeds`] | HF Papers, HF Blog, Product Hunt, Research Blogs, Reddit, YouTube | `max(base - index * 3, 10)` |
//!
//! # Common Patterns
//!
//! - Network calls go through [`crate::http::HttpFetcher`] with retry
//! - Relevance is a case-insensitive keyword match ([`relevance`])
//! - Any fetcher-level failure is logged and becomes an empty list; a broken
//!   source never aborts the build
//! - Retained items are translated concurrently before being returned

pub mod feeds;
pub mod hackernews;
pub mod preview;
pub mod relevance;

use crate::api::AskAsync;
use crate::config::AppConfig;
use crate::http::HttpFetcher;
use crate::models::{Category, Item, SourceKind};
use crate::translate::Translator;
use relevance::KeywordFilter;
use tracing::{debug, instrument};

/// Everything a fetcher needs, borrowed for the length of the build.
pub struct FetchContext<'a, C> {
    pub http: &'a HttpFetcher,
    pub translator: &'a Translator<C>,
    pub config: &'a AppConfig,
    pub filter: &'a KeywordFilter,
}

/// Fetch the items of one category, dispatching on its source kind.
#[instrument(level = "info", skip(ctx))]
pub async fn fetch_category<C: AskAsync>(
    ctx: &FetchContext<'_, C>,
    category: Category,
) -> Vec<Item> {
    match category.kind() {
        SourceKind::PointApi => hackernews::fetch_hacker_news(ctx).await,
        SourceKind::Feeds => feeds::fetch_category(ctx, ctx.config.feeds_for(category)).await,
    }
}

/// Fill in the translated title and snippet of `item`.
pub async fn translate_item<C: AskAsync>(translator: &Translator<C>, mut item: Item) -> Item {
    if !translator.is_enabled() {
        return item;
    }
    let (title, snippet) = futures::join!(
        translator.translate(&item.title),
        translator.translate_opt(item.snippet.as_deref())
    );
    debug!(title = %item.title, "Translated item");
    item.title_translated = Some(title);
    item.snippet_translated = snippet;
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedAsk;

    fn sample() -> Item {
        Item::new("Mistral Large 3", "https://example.com", "HN", None, 60)
            .unwrap()
            .with_snippet(Some("A new model".to_string()))
    }

    #[tokio::test]
    async fn test_translate_item_fills_both_fields() {
        let client = ScriptedAsk::replying("译文");
        let translator = Translator::new(Some(&client), "Simplified Chinese");
        let item = translate_item(&translator, sample()).await;
        assert_eq!(item.title_translated.as_deref(), Some("译文"));
        assert_eq!(item.snippet_translated.as_deref(), Some("译文"));
        assert_eq!(item.title, "Mistral Large 3");
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_translate_item_disabled_leaves_item_alone() {
        let translator: Translator<ScriptedAsk> = Translator::new(None, "Simplified Chinese");
        let item = translate_item(&translator, sample()).await;
        assert_eq!(item, sample());
    }

    #[tokio::test]
    async fn test_translate_item_without_snippet_makes_one_call() {
        let client = ScriptedAsk::replying("标题");
        let translator = Translator::new(Some(&client), "Simplified Chinese");
        let item = translate_item(&translator, sample().with_snippet(None)).await;
        assert_eq!(item.snippet_translated, None);
        assert_eq!(client.calls(), 1);
    }
}
