//! Daily report page.
//!
//! [`render_report`] is a pure function of the [`BuildArtifact`]: no network,
//! no file system, and no wall clock (ages are measured against the build
//! timestamp). Every item field is escaped before it reaches the markup.
//!
//! # Layout
//!
//! - A header with the build time, hidden when the page runs inside the
//!   shell's iframe (`body.embedded`)
//! - One tab per configured category, the first one active
//! - Per tab: the briefing (markdown rendered to HTML) and up to
//!   `max_cards` item cards, or an explicit empty state

use crate::config::Limits;
use crate::models::{BuildArtifact, Category, Item};
use crate::utils::truncate_chars;
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use itertools::Itertools;
use pulldown_cmark::{html, Event, Options, Parser};
use url::Url;

const REPORT_CSS: &str = include_str!("../../assets/report.css");

const REPORT_SCRIPT: &str = r#"
        if (window.self !== window.top) {
            document.body.classList.add('embedded');
        }

        function openTab(tabId) {
            document.querySelectorAll('.tab-content').forEach(el => el.classList.remove('active'));
            document.querySelectorAll('.tab-btn').forEach(el => {
                el.classList.toggle('active', el.dataset.tab === tabId);
            });
            document.getElementById(tabId).classList.add('active');
            window.scrollTo(0, 0);
        }
"#;

/// Marker class of the empty-state block.
pub const EMPTY_STATE_CLASS: &str = "empty-state";

/// Rendering knobs that come from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Cards shown per category.
    pub max_cards: usize,
    /// Characters of snippet shown before the ellipsis.
    pub snippet_chars: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            max_cards: 20,
            snippet_chars: 300,
        }
    }
}

impl From<&Limits> for ReportOptions {
    fn from(limits: &Limits) -> Self {
        Self {
            max_cards: limits.max_items_per_source,
            snippet_chars: limits.snippet_chars,
        }
    }
}

/// Render the full daily page for the given categories, in order.
pub fn render_report(
    artifact: &BuildArtifact,
    categories: &[Category],
    options: ReportOptions,
) -> String {
    let now = artifact.generated_at.with_timezone(&Utc);
    let generated = artifact.generated_at.format("%Y-%m-%d %H:%M %:z");

    let tabs = categories
        .iter()
        .enumerate()
        .map(|(i, category)| render_tab_button(*category, i == 0))
        .join("\n        ");
    let sections = categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            format!(
                r#"<div id="tab-{key}" class="tab-content{active}">
            {section}
        </div>"#,
                key = category.key(),
                active = if i == 0 { " active" } else { "" },
                section = render_section(
                    *category,
                    artifact.items(*category),
                    artifact.briefing(*category),
                    now,
                    options
                ),
            )
        })
        .join("\n\n        ");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Daily Report</title>
    <style>
{REPORT_CSS}
    </style>
</head>
<body>
    <header>
        <div class="header-left">
            <div class="logo">AI Pulse <span style="font-size:0.8em; font-weight:400; opacity:0.7">Report</span></div>
        </div>
        <div class="timestamp">Generated: {generated}</div>
    </header>

    <nav class="tab-nav">
        {tabs}
    </nav>

    <main>
        {sections}
    </main>

    <script>{REPORT_SCRIPT}    </script>
</body>
</html>
"#
    )
}

fn render_tab_button(category: Category, active: bool) -> String {
    format!(
        r#"<button class="tab-btn{active}" data-tab="tab-{key}" onclick="openTab('tab-{key}')">{label}</button>"#,
        active = if active { " active" } else { "" },
        key = category.key(),
        label = encode_text(category.tab_label()),
    )
}

/// One category: heading, optional briefing, then cards or the empty state.
pub fn render_section(
    category: Category,
    items: &[Item],
    briefing: Option<&str>,
    now: DateTime<Utc>,
    options: ReportOptions,
) -> String {
    let label = encode_text(category.label());
    let title = match category.homepage() {
        Some(url) => format!(
            r#"<a href="{}" target="_blank" class="section-link">{label}</a>"#,
            encode_double_quoted_attribute(url)
        ),
        None => label.to_string(),
    };

    let briefing = briefing
        .map(|md| {
            format!(
                r#"<div class="category-briefing">
                {}
            </div>"#,
                markdown_to_html(md)
            )
        })
        .unwrap_or_default();

    let content = if items.is_empty() {
        format!(r#"<div class="{EMPTY_STATE_CLASS}">No stories found for {label} today.</div>"#)
    } else {
        let cards = items
            .iter()
            .take(options.max_cards)
            .enumerate()
            .map(|(i, item)| render_card(item, i, now, options.snippet_chars))
            .join("");
        format!(r#"<div class="grid">{cards}</div>"#)
    };

    format!(
        r#"<section>
            <h2 class="section-header">{title}</h2>
            {briefing}
            {content}
        </section>"#
    )
}

fn render_card(item: &Item, index: usize, now: DateTime<Utc>, snippet_chars: usize) -> String {
    let badge = if item.is_hot() {
        r#" <span class="badge fire">🔥 Hot</span>"#
    } else {
        ""
    };
    let translated_title = item
        .title_translated
        .as_deref()
        .filter(|t| *t != item.title)
        .map(|t| format!(r#"<h4 class="card-title-translated">{}</h4>"#, encode_text(t)))
        .unwrap_or_default();

    let snippet = item
        .snippet
        .as_deref()
        .map(|s| {
            format!(
                r#"<div class="card-snippet">{}</div>"#,
                encode_text(&clip(s, snippet_chars))
            )
        })
        .unwrap_or_default();
    let snippet_translated = item
        .snippet_translated
        .as_deref()
        .map(|s| {
            format!(
                r#"<div class="card-snippet-translated">{}</div>"#,
                encode_text(&clip(s, snippet_chars))
            )
        })
        .unwrap_or_default();
    let snippet_block = if snippet.is_empty() && snippet_translated.is_empty() {
        String::new()
    } else {
        format!(r#"<div class="snippet-block">{snippet}{snippet_translated}</div>"#)
    };

    let age = item
        .published_at
        .map(|published| relative_age(published, now))
        .unwrap_or_else(|| "Recently".to_string());

    format!(
        r#"
            <a href="{href}" target="_blank" rel="noopener" class="card fade-in" style="animation-delay: {delay}ms">
                <div class="card-header">
                    <div class="card-source">{source}{badge}</div>
                    <div class="card-score" title="Importance Score">{score}</div>
                </div>
                <div class="content-block">
                    <h3 class="card-title">{title}</h3>
                    {translated_title}
                </div>
                <div class="card-meta">{age}</div>
                {snippet_block}
            </a>"#,
        href = safe_href(&item.link),
        delay = index * 30,
        source = encode_text(&item.source),
        score = item.importance,
        title = encode_text(&item.title),
    )
}

/// Truncate to `max` characters, adding `...` when something was cut.
fn clip(s: &str, max: usize) -> String {
    let cut = truncate_chars(s, max);
    if cut.len() < s.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}

/// Escape a link for an `href`, refusing anything that is not http(s).
pub fn safe_href(link: &str) -> String {
    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            encode_double_quoted_attribute(url.as_str()).into_owned()
        }
        _ => "#".to_string(),
    }
}

/// Render model-written markdown; raw HTML in it is shown as text.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Human-friendly age such as `about 3 hours ago`.
pub fn relative_age(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - published).num_seconds();
    if secs < 0 {
        return "Recently".to_string();
    }

    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };

    let minutes = secs / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    if minutes < 1 {
        "less than a minute ago".to_string()
    } else if hours < 1 {
        format!("{} ago", plural(minutes, "minute"))
    } else if days < 1 {
        format!("about {} ago", plural(hours, "hour"))
    } else if days < 30 {
        format!("{} ago", plural(days, "day"))
    } else if days < 365 {
        format!("{} ago", plural(days / 30, "month"))
    } else {
        format!("{} ago", plural(days / 365, "year"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};

    fn artifact() -> BuildArtifact {
        let generated = Local.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let mut artifact = BuildArtifact::new(generated);
        let mut item = Item::new(
            "GPT <script>alert(1)</script>",
            "https://example.com/a?x=1&y=2",
            "Hacker News",
            Some(generated.with_timezone(&Utc) - Duration::hours(3)),
            90,
        )
        .unwrap()
        .with_snippet(Some("Snippet & more".to_string()));
        item.title_translated = Some("翻译标题".to_string());
        artifact.results.insert(Category::HackerNews, vec![item]);
        artifact.results.insert(Category::Reddit, Vec::new());
        artifact
            .briefings
            .insert(Category::HackerNews, "### English Summary\n**Agents** dominate.".to_string());
        artifact
    }

    #[test]
    fn test_items_are_escaped() {
        let page = render_report(&artifact(), &[Category::HackerNews], ReportOptions::default());
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("GPT &lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(page.contains("Snippet &amp; more"));
        assert!(page.contains("https://example.com/a?x=1&amp;y=2"));
        assert!(page.contains("翻译标题"));
        assert!(page.contains("🔥 Hot"));
        assert!(page.contains("about 3 hours ago"));
    }

    #[test]
    fn test_empty_category_renders_empty_state_and_no_cards() {
        let section = render_section(
            Category::Reddit,
            &[],
            None,
            Utc::now(),
            ReportOptions::default(),
        );
        assert!(section.contains(EMPTY_STATE_CLASS));
        assert!(section.contains("No stories found for Reddit today."));
        assert!(!section.contains("class=\"card "));
        assert!(!section.contains("class=\"grid\""));
    }

    #[test]
    fn test_missing_category_renders_empty_state() {
        let page = render_report(&artifact(), &[Category::YouTube], ReportOptions::default());
        assert!(page.contains("No stories found for YouTube today."));
    }

    #[test]
    fn test_first_tab_is_active() {
        let page = render_report(
            &artifact(),
            &[Category::HackerNews, Category::Reddit, Category::YouTube],
            ReportOptions::default(),
        );
        assert!(page.contains(r#"<button class="tab-btn active" data-tab="tab-hn""#));
        assert!(page.contains(r#"<button class="tab-btn" data-tab="tab-reddit""#));
        assert!(page.contains(r#"<div id="tab-hn" class="tab-content active">"#));
        assert!(page.contains(r#"<div id="tab-youtube" class="tab-content">"#));
        assert_eq!(page.matches("tab-btn active").count(), 1);
    }

    #[test]
    fn test_embedded_mode_hides_header() {
        let page = render_report(&artifact(), &[Category::HackerNews], ReportOptions::default());
        assert!(page.contains("body.embedded header"));
        assert!(page.contains("window.self !== window.top"));
    }

    #[test]
    fn test_briefing_markdown_is_rendered() {
        let page = render_report(&artifact(), &[Category::HackerNews], ReportOptions::default());
        assert!(page.contains("<h3>English Summary</h3>"));
        assert!(page.contains("<strong>Agents</strong>"));
    }

    #[test]
    fn test_markdown_raw_html_is_escaped() {
        let html = markdown_to_html("Hi <img src=x onerror=alert(1)>\n\n<div>block</div>");
        assert!(!html.contains("<img"));
        assert!(!html.contains("<div>"));
        assert!(html.contains("&lt;img"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = render_report(&artifact(), &Category::ALL, ReportOptions::default());
        let b = render_report(&artifact(), &Category::ALL, ReportOptions::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_identical_translation_is_not_repeated() {
        let now = Utc::now();
        let mut item = Item::new("LLM", "https://example.com", "HN", None, 10).unwrap();
        item.title_translated = Some("LLM".to_string());
        let html = render_card(&item, 0, now, 300);
        assert!(!html.contains("card-title-translated"));
        assert!(html.contains("Recently"));
        assert!(!html.contains("snippet-block"));
    }

    #[test]
    fn test_cards_are_capped() {
        let items: Vec<Item> = (0..25)
            .map(|i| Item::new(&format!("AI {i}"), "https://example.com", "HN", None, 10).unwrap())
            .collect();
        let options = ReportOptions::default();
        let section = render_section(Category::HackerNews, &items, None, Utc::now(), options);
        assert_eq!(section.matches("class=\"card fade-in\"").count(), 20);
    }

    #[test]
    fn test_safe_href_rejects_other_schemes() {
        assert_eq!(safe_href("javascript:alert(1)"), "#");
        assert_eq!(safe_href("not a url"), "#");
        assert_eq!(safe_href("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn test_clip_adds_ellipsis_only_when_cut() {
        assert_eq!(clip("short", 300), "short");
        assert_eq!(clip("abcdef", 3), "abc...");
    }

    #[test]
    fn test_relative_age() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        assert_eq!(relative_age(now - Duration::seconds(20), now), "less than a minute ago");
        assert_eq!(relative_age(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(relative_age(now - Duration::minutes(45), now), "45 minutes ago");
        assert_eq!(relative_age(now - Duration::hours(1), now), "about 1 hour ago");
        assert_eq!(relative_age(now - Duration::days(2), now), "2 days ago");
        assert_eq!(relative_age(now - Duration::days(65), now), "2 months ago");
        assert_eq!(relative_age(now - Duration::days(800), now), "2 years ago");
        assert_eq!(relative_age(now + Duration::hours(1), now), "Recently");
    }
}
