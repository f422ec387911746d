//! RSS 2.0 and Atom feed fetcher.
//!
//! Each configured [`FeedSource`] is downloaded, parsed, filtered by keyword
//! relevance and turned into [`Item`]s whose importance decays with position.
//! A category may list several feeds; they are fetched concurrently and their
//! items concatenated in configuration order.
//!
//! # Snippets
//!
//! The snippet comes from the rich content when there is any, else from the
//! summary. Either way the first non-empty paragraph is used, falling back to
//! all of the text. Reddit's `Discussion | Link` boilerplate and markdown
//! image syntax are stripped before truncating to the snippet budget.

use crate::api::AskAsync;
use crate::config::FeedSource;
use crate::http::FEED_ACCEPT;
use crate::models::Item;
use crate::scrapers::relevance::{feed_importance, KeywordFilter};
use crate::scrapers::{translate_item, FetchContext};
use crate::utils::{collapse_whitespace, truncate_chars};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::error::Error;
use tracing::{debug, error, info, instrument};

static BOILERPLATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Discussion\s*\|\s*Link").unwrap());
static MARKDOWN_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[.*?\]\(.*?\)").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(rename = "content:encoded", alias = "encoded")]
    content_encoded: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
    #[serde(rename = "media:group", alias = "group")]
    media_group: Option<MediaGroup>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaGroup {
    #[serde(rename = "media:description", alias = "description")]
    description: Option<String>,
}

/// One entry of a parsed feed, before scoring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Rich (HTML) content, if the feed carries any.
    pub content_html: Option<String>,
    /// Plain or lightly formatted summary.
    pub summary: Option<String>,
}

impl FeedEntry {
    /// Text the keyword filter looks at: title plus the plain-text description.
    fn relevance_text(&self) -> String {
        let body = self
            .summary
            .as_deref()
            .or(self.content_html.as_deref())
            .map(html_to_text)
            .unwrap_or_default();
        format!("{} {}", self.title, body)
    }
}

enum FeedFormat {
    Rss,
    Atom,
}

/// Identify the document by the local name of its first element.
fn detect_format(xml: &str) -> Result<FeedFormat, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                return match e.local_name().as_ref() {
                    b"rss" => Ok(FeedFormat::Rss),
                    b"feed" => Ok(FeedFormat::Atom),
                    other => Err(format!(
                        "unsupported feed root <{}>",
                        String::from_utf8_lossy(other)
                    )
                    .into()),
                };
            }
            Event::Eof => return Err("not an RSS or Atom document".into()),
            _ => {}
        }
    }
}

/// Parse an RSS 2.0 or Atom document, picked by its root element.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, Box<dyn Error>> {
    let xml = scrub_html_entities(xml);
    match detect_format(&xml)? {
        FeedFormat::Rss => {
            let rss: RssDocument = quick_xml::de::from_str(&xml)?;
            Ok(rss.channel.items.into_iter().map(FeedEntry::from).collect())
        }
        FeedFormat::Atom => {
            let atom: AtomFeed = quick_xml::de::from_str(&xml)?;
            Ok(atom.entries.into_iter().map(FeedEntry::from).collect())
        }
    }
}

impl From<RssItem> for FeedEntry {
    /// `content:encoded` is the rich body; `description` is only ever the
    /// summary, so each piece of text lands in exactly one field.
    fn from(item: RssItem) -> Self {
        Self {
            title: item.title.unwrap_or_default().trim().to_string(),
            link: item.link.unwrap_or_default().trim().to_string(),
            published_at: item.pub_date.as_deref().and_then(parse_feed_date),
            content_html: non_blank(item.content_encoded),
            summary: non_blank(item.description),
        }
    }
}

impl From<AtomEntry> for FeedEntry {
    fn from(entry: AtomEntry) -> Self {
        let link = entry
            .links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or(entry.links.first())
            .map(|l| l.href.trim().to_string())
            .unwrap_or_default();
        let summary = non_blank(entry.summary.map(|t| t.value))
            .or_else(|| non_blank(entry.media_group.and_then(|g| g.description)));
        Self {
            title: entry.title.map(|t| t.value).unwrap_or_default().trim().to_string(),
            link,
            published_at: entry
                .published
                .as_deref()
                .or(entry.updated.as_deref())
                .and_then(parse_feed_date),
            content_html: non_blank(entry.content.map(|t| t.value)),
            summary,
        }
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

/// Accepts RFC 2822 (RSS) and RFC 3339 (Atom) timestamps.
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// HTML entities that are common in feeds but undefined in XML.
fn scrub_html_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    collapse_whitespace(&fragment.root_element().text().collect::<Vec<_>>().join(" "))
}

fn strip_boilerplate(text: &str) -> String {
    BOILERPLATE.replace_all(text, "").trim().to_string()
}

/// First non-empty paragraph of `html`, else all of its text, minus boilerplate.
fn snippet_from_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment
        .select(&PARAGRAPH)
        .map(|p| collapse_whitespace(&p.text().collect::<Vec<_>>().join(" ")))
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| html_to_text(html));
    strip_boilerplate(&text)
}

/// Build the display snippet for an entry, or `None` if nothing useful remains.
///
/// The rich content wins over the summary; whichever is used goes through
/// [`snippet_from_html`].
pub fn extract_snippet(
    content_html: Option<&str>,
    summary: Option<&str>,
    budget: usize,
) -> Option<String> {
    let snippet = [content_html, summary]
        .into_iter()
        .flatten()
        .map(snippet_from_html)
        .find(|text| !text.is_empty())
        .unwrap_or_default();

    let snippet = collapse_whitespace(&MARKDOWN_IMAGE.replace_all(&snippet, ""));
    let snippet = truncate_chars(&snippet, budget).trim();
    (!snippet.is_empty()).then(|| snippet.to_string())
}

/// Filter, truncate and score parsed entries for one feed.
///
/// Importance decays with the entry's position among the retained entries.
pub fn score_entries(
    entries: Vec<FeedEntry>,
    feed: &FeedSource,
    filter: &KeywordFilter,
    max_items: usize,
    default_decay: i64,
    default_floor: i64,
    snippet_budget: usize,
) -> Vec<Item> {
    let decay = feed.decay_step.unwrap_or(default_decay);
    let floor = feed.floor.unwrap_or(default_floor);

    entries
        .into_iter()
        .filter(|entry| filter.matches(&entry.relevance_text()))
        .take(max_items)
        .enumerate()
        .filter_map(|(index, entry)| {
            let importance = i64::from(feed_importance(feed.base_score, index, decay, floor));
            let snippet = extract_snippet(
                entry.content_html.as_deref(),
                entry.summary.as_deref(),
                snippet_budget,
            );
            Item::new(&entry.title, entry.link, feed.name.as_str(), entry.published_at, importance)
                .map(|item| item.with_snippet(snippet))
        })
        .collect()
}

/// Fetch one feed; any failure degrades to an empty list.
#[instrument(level = "info", skip_all, fields(feed = %feed.name))]
pub async fn fetch_feed<C: AskAsync>(ctx: &FetchContext<'_, C>, feed: &FeedSource) -> Vec<Item> {
    match try_fetch_feed(ctx, feed).await {
        Ok(items) => {
            info!(count = items.len(), "Fetched feed");
            items
        }
        Err(e) => {
            error!(url = %feed.url, error = %e, "Feed fetch failed; using empty result");
            Vec::new()
        }
    }
}

async fn try_fetch_feed<C: AskAsync>(
    ctx: &FetchContext<'_, C>,
    feed: &FeedSource,
) -> Result<Vec<Item>, Box<dyn Error>> {
    let xml = ctx.http.get_text(&feed.url, &[("Accept", FEED_ACCEPT)]).await?;
    let entries = parse_feed(&xml)?;
    debug!(entries = entries.len(), "Parsed feed");

    let limits = &ctx.config.limits;
    let scored = score_entries(
        entries,
        feed,
        ctx.filter,
        limits.max_items_per_source,
        limits.decay_step,
        limits.importance_floor,
        limits.snippet_chars,
    );
    Ok(join_all(scored.into_iter().map(|item| translate_item(ctx.translator, item))).await)
}

/// Fetch every feed of a category concurrently and concatenate in config order.
pub async fn fetch_category<C: AskAsync>(
    ctx: &FetchContext<'_, C>,
    feeds: &[FeedSource],
) -> Vec<Item> {
    join_all(feeds.iter().map(|feed| fetch_feed(ctx, feed)))
        .await
        .into_iter()
        .flatten()
        .collect()
}
