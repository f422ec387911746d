//! Build configuration: the feed table, relevance keywords and tuning knobs.
//!
//! [`AppConfig`] is an immutable table passed explicitly to every component.
//! The built-in defaults describe the full production setup; an optional YAML
//! file overrides any subset of it:
//!
//! ```yaml
//! categories: [hn, hfPapers, reddit]
//! keywords: [LLM, Agent]
//! limits:
//!   batch_size: 2
//! feeds:
//!   reddit:
//!     - name: r/LocalLLaMA
//!       url: https://www.reddit.com/r/LocalLLaMA/top/.rss?t=day
//!       base_score: 80
//! ```
//!
//! A `feeds` entry replaces the whole default feed map, not just the
//! categories it names.

use crate::models::Category;
use itertools::Itertools;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::info;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

/// One named RSS/Atom feed belonging to a category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedSource {
    /// Display name, used as the item `source`.
    pub name: String,
    pub url: String,
    /// Importance of the first entry in the feed.
    pub base_score: i64,
    /// Per-feed override of [`Limits::decay_step`].
    #[serde(default)]
    pub decay_step: Option<i64>,
    /// Per-feed override of [`Limits::importance_floor`].
    #[serde(default)]
    pub floor: Option<i64>,
}

impl FeedSource {
    pub fn new(name: &str, url: &str, base_score: i64) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            base_score,
            decay_step: None,
            floor: None,
        }
    }
}

/// Settings for the ranked-stories point API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HackerNewsConfig {
    pub api_base: String,
    /// How many ranked ids to look at.
    pub top_k: usize,
    /// Multiplier applied to the comment count when scoring.
    pub comment_weight: i64,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            api_base: "https://hacker-news.firebaseio.com/v0".to_string(),
            top_k: 100,
            comment_weight: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Items kept per source after keyword filtering.
    pub max_items_per_source: usize,
    /// Character budget for snippets.
    pub snippet_chars: usize,
    /// Importance lost per position in a feed.
    pub decay_step: i64,
    /// Lowest importance a feed entry can decay to.
    pub importance_floor: i64,
    /// How many categories are fetched and briefed concurrently.
    pub batch_size: usize,
    /// How many top items go into a briefing prompt.
    pub briefing_top_n: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_items_per_source: 20,
            snippet_chars: 300,
            decay_step: 3,
            importance_floor: 10,
            batch_size: 3,
            briefing_top_n: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub preview_timeout_secs: u64,
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub user_agent: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn preview_timeout(&self) -> Duration {
        Duration::from_secs(self.preview_timeout_secs)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            preview_timeout_secs: 3,
            max_attempts: 3,
            base_delay_ms: 1000,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

/// OpenAI-compatible chat completions endpoint used for translation and briefings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub translate_model: String,
    pub briefing_model: String,
    /// Language titles and snippets are translated into.
    pub target_language: String,
    pub translate_timeout_secs: u64,
    pub briefing_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.deepseek.com/chat/completions".to_string(),
            translate_model: "deepseek-chat".to_string(),
            briefing_model: "deepseek-reasoner".to_string(),
            target_language: "Simplified Chinese".to_string(),
            translate_timeout_secs: 10,
            briefing_timeout_secs: 180,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Enabled categories in display order.
    pub categories: Vec<Category>,
    /// Relevance keywords, matched case-insensitively as substrings.
    pub keywords: Vec<String>,
    pub feeds: BTreeMap<Category, Vec<FeedSource>>,
    pub hacker_news: HackerNewsConfig,
    pub limits: Limits,
    pub http: HttpConfig,
    pub llm: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            keywords: default_keywords(),
            feeds: default_feeds(),
            hacker_news: HackerNewsConfig::default(),
            limits: Limits::default(),
            http: HttpConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the configuration, starting from the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                let parsed = Self::from_yaml(&raw)?;
                info!(path = %path.display(), "Loaded configuration file");
                parsed
            }
            None => Self::default(),
        };
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, Box<dyn Error>> {
        let parsed: AppConfig = serde_yaml::from_str(raw)?;
        Ok(parsed.normalized())
    }

    /// Drop repeated categories so every category owns exactly one output slot.
    pub fn normalized(mut self) -> Self {
        self.categories = self.categories.into_iter().unique().collect();
        self.limits.batch_size = self.limits.batch_size.max(1);
        self
    }

    pub fn feeds_for(&self, category: Category) -> &[FeedSource] {
        self.feeds
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn default_keywords() -> Vec<String> {
    [
        "AI",
        "LLM",
        "GPT",
        "Deep Learning",
        "Machine Learning",
        "Transformer",
        "Neural Network",
        "OpenAI",
        "Anthropic",
        "Gemini",
        "Llama",
        "Mistral",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

fn default_feeds() -> BTreeMap<Category, Vec<FeedSource>> {
    BTreeMap::from([
        (
            Category::HfPapers,
            vec![FeedSource::new(
                "Hugging Face Daily Papers",
                "https://papers.takara.ai/api/feed",
                90,
            )],
        ),
        (
            Category::HfBlog,
            vec![FeedSource::new(
                "Hugging Face Blog",
                "https://huggingface.co/blog/feed.xml",
                85,
            )],
        ),
        (
            Category::ProductHunt,
            vec![FeedSource::new(
                "Product Hunt AI",
                "https://www.producthunt.com/feed?category=ai",
                75,
            )],
        ),
        (
            Category::ResearchBlogs,
            vec![
                FeedSource::new("OpenAI Blog", "https://openai.com/blog/rss.xml", 95),
                FeedSource::new(
                    "AWS Machine Learning",
                    "https://aws.amazon.com/blogs/machine-learning/feed/",
                    90,
                ),
                FeedSource::new(
                    "Microsoft Research",
                    "https://www.microsoft.com/en-us/research/feed/",
                    90,
                ),
            ],
        ),
        (
            Category::Reddit,
            vec![
                FeedSource::new(
                    "r/LocalLLaMA",
                    "https://www.reddit.com/r/LocalLLaMA/top/.rss?t=day",
                    80,
                ),
                FeedSource::new(
                    "r/ChatGPT",
                    "https://www.reddit.com/r/ChatGPT/top/.rss?t=day",
                    70,
                ),
            ],
        ),
        (
            Category::YouTube,
            vec![
                FeedSource::new(
                    "Two Minute Papers",
                    "https://www.youtube.com/feeds/videos.xml?channel_id=UCbfYPyITQ-7l4upoX8nvctg",
                    85,
                ),
                FeedSource::new(
                    "DeepMind",
                    "https://www.youtube.com/feeds/videos.xml?channel_id=UCP7jMXSY2xbc3KCAE0MHQ-A",
                    88,
                ),
                FeedSource::new(
                    "OpenAI",
                    "https://www.youtube.com/feeds/videos.xml?channel_id=UCvJJ_dzjViJCoLf5uKUTwoA",
                    95,
                ),
            ],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceKind;

    #[test]
    fn test_defaults_cover_every_feed_category() {
        let config = AppConfig::default();
        assert_eq!(config.categories, Category::ALL.to_vec());
        for category in Category::ALL {
            if category.kind() == SourceKind::Feeds {
                assert!(
                    !config.feeds_for(category).is_empty(),
                    "no default feeds for {category}"
                );
            }
        }
        assert!(config.feeds_for(Category::HackerNews).is_empty());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config =
            AppConfig::from_yaml("keywords: [Agent, RAG]\nlimits:\n  batch_size: 2\n").unwrap();
        assert_eq!(config.keywords, vec!["Agent".to_string(), "RAG".to_string()]);
        assert_eq!(config.limits.batch_size, 2);
        assert_eq!(config.limits.max_items_per_source, 20);
        assert_eq!(config.hacker_news.comment_weight, 2);
        assert_eq!(config.feeds_for(Category::Reddit).len(), 2);
    }

    #[test]
    fn test_yaml_categories_use_keys_and_dedupe() {
        let config = AppConfig::from_yaml("categories: [reddit, hn, reddit]\n").unwrap();
        assert_eq!(config.categories, vec![Category::Reddit, Category::HackerNews]);
    }

    #[test]
    fn test_yaml_feed_overrides() {
        let raw = r#"
feeds:
  youtube:
    - name: Yannic Kilcher
      url: https://www.youtube.com/feeds/videos.xml?channel_id=abc
      base_score: 60
      decay_step: 5
"#;
        let config = AppConfig::from_yaml(raw).unwrap();
        let feeds = config.feeds_for(Category::YouTube);
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].decay_step, Some(5));
        assert_eq!(feeds[0].floor, None);
        assert!(config.feeds_for(Category::Reddit).is_empty());
    }

    #[test]
    fn test_zero_batch_size_is_raised() {
        let config = AppConfig::from_yaml("limits:\n  batch_size: 0\n").unwrap();
        assert_eq!(config.limits.batch_size, 1);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert!(AppConfig::from_yaml("categories: [github]\n").is_err());
    }
}
