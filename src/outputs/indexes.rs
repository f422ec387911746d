//! History of published daily pages.
//!
//! The output directory is the only record of past builds: every file named
//! `YYYY-MM-DD.html` is one day. The history list is that set, deduplicated
//! and sorted newest first, which is the order the shell's selector shows.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};

static DAILY_PAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}\.html$").unwrap());

pub fn is_daily_page(name: &str) -> bool {
    DAILY_PAGE.is_match(name)
}

/// List the daily pages already present in `dir`. A missing directory is an
/// empty history.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn scan_history(dir: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    if !fs::try_exists(dir).await? {
        debug!("Output directory does not exist yet");
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            if is_daily_page(name) {
                found.push(name.to_string());
            }
        }
    }
    info!(count = found.len(), "Scanned history");
    Ok(found)
}

/// Insert `today` into `existing`, drop duplicates, sort newest first.
///
/// ISO dates sort lexicographically, so a reverse string sort is a reverse
/// chronological sort.
pub fn merge_history(mut existing: Vec<String>, today: &str) -> Vec<String> {
    existing.push(today.to_string());
    existing.sort_unstable_by(|a, b| b.cmp(a));
    existing.dedup();
    existing
}
