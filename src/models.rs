//! Data models shared by the fetchers, the pipeline and the renderer.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Category`]: the closed set of tabs, each carrying its key and display metadata
//! - [`Item`]: one normalized piece of content pulled from a source
//! - [`BuildArtifact`]: everything one build collected, handed whole to the renderer
//!
//! All of these are rebuilt from scratch on every run; nothing here is persisted.

use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// How a category obtains its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Ranked-stories point API (one request for ids, one per story).
    PointApi,
    /// One or more RSS/Atom feeds configured for the category.
    Feeds,
}

/// A logical grouping of sources presented together as one tab.
///
/// This enum is the single source of truth for category keys: fetching,
/// briefing and rendering all iterate the same configured list of variants,
/// so a tab can never reference data that was never fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum Category {
    #[serde(rename = "hn")]
    HackerNews,
    #[serde(rename = "hfPapers")]
    HfPapers,
    #[serde(rename = "hfBlog")]
    HfBlog,
    #[serde(rename = "productHunt")]
    ProductHunt,
    #[serde(rename = "researchBlogs")]
    ResearchBlogs,
    #[serde(rename = "reddit")]
    Reddit,
    #[serde(rename = "youtube")]
    YouTube,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Category; 7] = [
        Category::HackerNews,
        Category::HfPapers,
        Category::HfBlog,
        Category::ProductHunt,
        Category::ResearchBlogs,
        Category::Reddit,
        Category::YouTube,
    ];

    /// Stable key used for DOM ids and configuration.
    pub fn key(self) -> &'static str {
        match self {
            Category::HackerNews => "hn",
            Category::HfPapers => "hfPapers",
            Category::HfBlog => "hfBlog",
            Category::ProductHunt => "productHunt",
            Category::ResearchBlogs => "researchBlogs",
            Category::Reddit => "reddit",
            Category::YouTube => "youtube",
        }
    }

    /// Full name used in section headings, empty states and briefing prompts.
    pub fn label(self) -> &'static str {
        match self {
            Category::HackerNews => "Hacker News",
            Category::HfPapers => "Hugging Face Daily Papers",
            Category::HfBlog => "Hugging Face Blog",
            Category::ProductHunt => "Product Hunt",
            Category::ResearchBlogs => "Industry Research Blogs",
            Category::Reddit => "Reddit",
            Category::YouTube => "YouTube",
        }
    }

    /// Short name shown on the tab button.
    pub fn tab_label(self) -> &'static str {
        match self {
            Category::HackerNews => "Hacker News",
            Category::HfPapers => "HF Papers",
            Category::HfBlog => "HF Blog",
            Category::ProductHunt => "Product Hunt",
            Category::ResearchBlogs => "Research Blogs",
            Category::Reddit => "Reddit",
            Category::YouTube => "YouTube",
        }
    }

    /// Landing page the section heading links to, if the category has one.
    pub fn homepage(self) -> Option<&'static str> {
        match self {
            Category::HackerNews => Some("https://news.ycombinator.com"),
            Category::HfPapers => Some("https://huggingface.co/papers"),
            Category::HfBlog => Some("https://huggingface.co/blog"),
            Category::ProductHunt => Some("https://www.producthunt.com/topics/artificial-intelligence"),
            Category::ResearchBlogs => None,
            Category::Reddit => Some("https://www.reddit.com"),
            Category::YouTube => Some("https://www.youtube.com"),
        }
    }

    pub fn kind(self) -> SourceKind {
        match self {
            Category::HackerNews => SourceKind::PointApi,
            _ => SourceKind::Feeds,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Clamp a raw score into the `[0, 100]` importance range.
pub fn clamp_importance(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// One normalized piece of content pulled from a source.
///
/// Items are only constructed through [`Item::new`], which rejects blank
/// titles and clamps the importance, so every retained item satisfies both
/// invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Original-language headline.
    pub title: String,
    /// Headline in the target language, when translation ran.
    pub title_translated: Option<String>,
    /// Canonical URL of the content.
    pub link: String,
    /// Human-readable name of the originating feed or site.
    pub source: String,
    /// Original publication time, when the source reports one.
    pub published_at: Option<DateTime<Utc>>,
    /// Relevance score in `[0, 100]`.
    pub importance: u8,
    /// Short description, already truncated to the snippet budget.
    pub snippet: Option<String>,
    pub snippet_translated: Option<String>,
}

impl Item {
    /// Build an item, returning `None` when the title is blank.
    pub fn new(
        title: &str,
        link: impl Into<String>,
        source: impl Into<String>,
        published_at: Option<DateTime<Utc>>,
        importance: i64,
    ) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            title_translated: None,
            link: link.into(),
            source: source.into(),
            published_at,
            importance: clamp_importance(importance),
            snippet: None,
            snippet_translated: None,
        })
    }

    pub fn with_snippet(mut self, snippet: Option<String>) -> Self {
        self.snippet = snippet;
        self
    }

    /// Items above this score get the "Hot" badge.
    pub fn is_hot(&self) -> bool {
        self.importance > 85
    }
}

/// Everything one build collected, passed whole into the renderer.
#[derive(Debug, Clone)]
pub struct BuildArtifact {
    /// When the build started.
    pub generated_at: DateTime<Local>,
    /// Items per category. A category whose task failed has no entry.
    pub results: BTreeMap<Category, Vec<Item>>,
    /// Markdown briefing per category, only for categories that got one.
    pub briefings: BTreeMap<Category, String>,
}

impl BuildArtifact {
    pub fn new(generated_at: DateTime<Local>) -> Self {
        Self {
            generated_at,
            results: BTreeMap::new(),
            briefings: BTreeMap::new(),
        }
    }

    pub fn items(&self, category: Category) -> &[Item] {
        self.results
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn briefing(&self, category: Category) -> Option<&str> {
        self.briefings.get(&category).map(String::as_str)
    }

    pub fn total_items(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }
}
