//! Keyword relevance filter and importance scoring.

use crate::models::clamp_importance;

/// Case-insensitive substring match against a fixed keyword list.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    /// Blank keywords are ignored; an empty list matches nothing.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let keywords = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn matches(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }
}

/// Importance for point-API items: `min(base + secondary * weight, 100)`.
pub fn point_importance(base: i64, secondary: i64, weight: i64) -> u8 {
    clamp_importance(base.saturating_add(secondary.saturating_mul(weight)))
}

/// Importance for the `index`-th entry of a feed: `max(base - index * decay, floor)`.
pub fn feed_importance(base_score: i64, index: usize, decay_step: i64, floor: i64) -> u8 {
    let index = i64::try_from(index).unwrap_or(i64::MAX);
    let decayed = base_score.saturating_sub(index.saturating_mul(decay_step));
    clamp_importance(decayed.max(floor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_is_case_insensitive() {
        let filter = KeywordFilter::new(&["GPT"]);
        assert!(filter.matches("exploring GPT internals"));
        assert!(filter.matches("exploring gpt internals"));
        let lower = KeywordFilter::new(&["deep learning"]);
        assert!(lower.matches("A Deep Learning primer"));
    }

    #[test]
    fn test_filter_rejects_unrelated_titles() {
        let filter = KeywordFilter::new(&["LLM", "Transformer"]);
        assert!(!filter.matches("Show HN: a faster grep"));
    }

    #[test]
    fn test_substring_semantics() {
        // "AI" is a plain substring match, so it also hits words like "maintain".
        let filter = KeywordFilter::new(&["AI"]);
        assert!(filter.matches("How to maintain a garden"));
    }

    #[test]
    fn test_empty_and_blank_keywords_match_nothing() {
        let filter = KeywordFilter::new::<&str>(&[]);
        assert!(!filter.matches("GPT"));
        let blank = KeywordFilter::new(&["", "  "]);
        assert!(!blank.matches("anything"));
    }

    #[test]
    fn test_point_importance_caps_at_100() {
        assert_eq!(point_importance(50, 30, 2), 100);
        assert_eq!(point_importance(10, 5, 2), 20);
        assert_eq!(point_importance(0, 0, 2), 0);
    }

    #[test]
    fn test_point_importance_never_negative() {
        assert_eq!(point_importance(-20, 0, 2), 0);
        assert_eq!(point_importance(i64::MAX, i64::MAX, 2), 100);
    }

    #[test]
    fn test_feed_importance_decays_in_order() {
        let scores: Vec<u8> = (0..3).map(|i| feed_importance(80, i, 3, 10)).collect();
        assert_eq!(scores, vec![80, 77, 74]);
    }

    #[test]
    fn test_feed_importance_stops_at_floor() {
        assert_eq!(feed_importance(80, 30, 3, 10), 10);
        assert_eq!(feed_importance(95, 100_000, 3, 10), 10);
    }

    #[test]
    fn test_feed_importance_is_clamped() {
        assert_eq!(feed_importance(150, 0, 3, 10), 100);
        assert_eq!(feed_importance(5, 10, 3, -50), 0);
    }
}
