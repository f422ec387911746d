//! Per-category briefings generated by the LLM.
//!
//! A briefing is free-text markdown summarizing the top items of one
//! category. It is absent when there is nothing to summarize, when no
//! credential is configured, or when the call fails; a failure here never
//! affects other categories or the build.

use crate::api::AskAsync;
use crate::models::Item;
use std::fmt::Write;
use tracing::{debug, error, info, instrument, warn};

const SYSTEM_PROMPT: &str = "You are a helpful AI news assistant.";

/// Build the user prompt from at most `top_n` items.
pub fn build_prompt(label: &str, items: &[Item], top_n: usize, target_language: &str) -> String {
    let mut context = format!("Here are the top stories for {label}:\n\n");
    for (i, item) in items.iter().take(top_n).enumerate() {
        let details = item.snippet.as_deref().unwrap_or("No details");
        let _ = writeln!(context, "{}. {}: {}", i + 1, item.title, details);
    }

    format!(
        "You are an expert AI news analyst.\n\
         Based on the following news items for **{label}**, generate a concise summary.\n\
         \n\
         Guidelines:\n\
         - Provide the summary in **both English and {target_language}**.\n\
         - Structure it as:\n\
         \x20 ### English Summary\n\
         \x20 (English content)\n\
         \n\
         \x20 ### {target_language} Summary\n\
         \x20 ({target_language} content)\n\
         \n\
         - Focus on the key trends or most interesting updates in this specific category.\n\
         - Use bolding for key terms.\n\
         - Keep it under 200 words total.\n\
         - Do not include links.\n\
         - Start directly with the headers.\n\
         \n\
         News Items:\n\
         {context}"
    )
}

/// Ask the LLM for a briefing of `items`.
///
/// Returns the reply verbatim, or `None` if there are no items, no client,
/// or the call failed.
#[instrument(level = "info", skip(client, items, target_language), fields(count = items.len()))]
pub async fn generate_briefing<C: AskAsync>(
    client: Option<&C>,
    label: &str,
    items: &[Item],
    top_n: usize,
    target_language: &str,
) -> Option<String> {
    if items.is_empty() {
        debug!("No items; skipping briefing");
        return None;
    }
    let Some(client) = client else {
        debug!("No LLM credential; skipping briefing");
        return None;
    };

    let prompt = build_prompt(label, items, top_n, target_language);
    info!("Requesting briefing");
    match client.ask(SYSTEM_PROMPT, &prompt).await {
        Ok(text) if text.trim().is_empty() => {
            warn!("Briefing came back empty");
            None
        }
        Ok(text) => {
            info!(chars = text.chars().count(), "Received briefing");
            Some(text)
        }
        Err(e) => {
            error!(error = %e, "Briefing generation failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedAsk;

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| {
                Item::new(&format!("Story {i}"), format!("https://example.com/{i}"), "HN", None, 50)
                    .unwrap()
                    .with_snippet((i % 2 == 0).then(|| format!("Snippet {i}")))
            })
            .collect()
    }

    #[test]
    fn test_prompt_is_bounded_to_top_n() {
        let prompt = build_prompt("Hacker News", &items(8), 5, "Simplified Chinese");
        assert!(prompt.contains("1. Story 0: Snippet 0"));
        assert!(prompt.contains("2. Story 1: No details"));
        assert!(prompt.contains("5. Story 4: Snippet 4"));
        assert!(!prompt.contains("Story 5"));
        assert!(prompt.contains("**Hacker News**"));
        assert!(prompt.contains("Simplified Chinese Summary"));
    }

    #[tokio::test]
    async fn test_empty_items_make_no_call() {
        let client = ScriptedAsk::replying("unused");
        let result = generate_briefing(Some(&client), "Reddit", &[], 5, "Simplified Chinese").await;
        assert!(result.is_none());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_credential_returns_none() {
        let result =
            generate_briefing::<ScriptedAsk>(None, "Reddit", &items(3), 5, "Simplified Chinese")
                .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_reply_is_returned_verbatim() {
        let reply = "### English Summary\n**Llama** everywhere.\n";
        let client = ScriptedAsk::replying(reply);
        let result =
            generate_briefing(Some(&client), "Reddit", &items(2), 5, "Simplified Chinese").await;
        assert_eq!(result.as_deref(), Some(reply));
        assert_eq!(client.calls(), 1);
        assert!(client.prompts()[0].contains("Here are the top stories for Reddit"));
    }

    #[tokio::test]
    async fn test_failure_is_contained() {
        let client = ScriptedAsk::failing();
        let result =
            generate_briefing(Some(&client), "YouTube", &items(2), 5, "Simplified Chinese").await;
        assert!(result.is_none());
    }
}
