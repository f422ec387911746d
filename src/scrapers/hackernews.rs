//! Hacker News top stories via the Firebase point API.
//!
//! # Flow
//!
//! 1. Fetch the ranked id list and keep the first `top_k`
//! 2. Fetch every story concurrently (the API is cheap, so no cap)
//! 3. Keep stories whose title matches a keyword, up to the per-source limit
//! 4. Score `min(score + comments * weight, 100)`
//! 5. Read a link preview for stories pointing off-site, then translate
//!
//! Text posts (Ask HN and friends) have no `url`; they link to the
//! discussion page and get no preview.

use crate::api::AskAsync;
use crate::models::Item;
use crate::scrapers::preview::fetch_link_preview;
use crate::scrapers::relevance::{point_importance, KeywordFilter};
use crate::scrapers::{translate_item, FetchContext};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Deserialize;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};

pub const SOURCE_NAME: &str = "Hacker News";

/// One story record from `/item/<id>.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Story {
    pub id: u64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub score: Option<i64>,
    pub descendants: Option<i64>,
    pub time: Option<i64>,
}

impl Story {
    /// External URL, or the discussion page for text posts.
    pub fn link(&self) -> String {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("https://news.ycombinator.com/item?id={}", self.id),
        }
    }

    pub fn has_external_url(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.time.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn to_item(&self, comment_weight: i64) -> Option<Item> {
        let importance = point_importance(
            self.score.unwrap_or(0),
            self.descendants.unwrap_or(0),
            comment_weight,
        );
        Item::new(
            self.title.as_deref().unwrap_or_default(),
            self.link(),
            SOURCE_NAME,
            self.published_at(),
            i64::from(importance),
        )
    }
}

/// Keep keyword-matching stories in rank order, at most `max_items`.
pub fn select_stories(stories: Vec<Story>, filter: &KeywordFilter, max_items: usize) -> Vec<Story> {
    stories
        .into_iter()
        .filter(|story| {
            story
                .title
                .as_deref()
                .is_some_and(|title| !title.trim().is_empty() && filter.matches(title))
        })
        .take(max_items)
        .collect()
}

/// Fetch Hacker News; any failure degrades to an empty list.
#[instrument(level = "info", skip_all)]
pub async fn fetch_hacker_news<C: AskAsync>(ctx: &FetchContext<'_, C>) -> Vec<Item> {
    match try_fetch_hacker_news(ctx).await {
        Ok(items) => {
            info!(count = items.len(), "Fetched Hacker News stories");
            items
        }
        Err(e) => {
            error!(error = %e, "Hacker News fetch failed; using empty result");
            Vec::new()
        }
    }
}

async fn try_fetch_hacker_news<C: AskAsync>(
    ctx: &FetchContext<'_, C>,
) -> Result<Vec<Item>, Box<dyn Error>> {
    let hn = &ctx.config.hacker_news;
    let base = hn.api_base.trim_end_matches('/');

    let mut ids: Vec<u64> = ctx.http.get_json(&format!("{base}/topstories.json")).await?;
    ids.truncate(hn.top_k);
    debug!(count = ids.len(), "Fetched top story ids");

    let details = join_all(ids.iter().map(|id| {
        let url = format!("{base}/item/{id}.json");
        async move {
            match ctx.http.get_json::<Option<Story>>(&url).await {
                Ok(story) => story,
                Err(e) => {
                    warn!(%url, error = %e, "Story detail unavailable; skipping");
                    None
                }
            }
        }
    }))
    .await;
    let stories: Vec<Story> = details.into_iter().flatten().collect();

    let selected = select_stories(stories, ctx.filter, ctx.config.limits.max_items_per_source);
    info!(selected = selected.len(), "Selected relevant stories");

    let items = join_all(selected.iter().map(|story| enrich_story(ctx, story))).await;
    Ok(items.into_iter().flatten().collect())
}

async fn enrich_story<C: AskAsync>(ctx: &FetchContext<'_, C>, story: &Story) -> Option<Item> {
    let item = story.to_item(ctx.config.hacker_news.comment_weight)?;
    let snippet = if story.has_external_url() {
        fetch_link_preview(
            ctx.http,
            &item.link,
            ctx.config.http.preview_timeout(),
            ctx.config.limits.snippet_chars,
        )
        .await
    } else {
        None
    };
    Some(translate_item(ctx.translator, item.with_snippet(snippet)).await)
}
