//! `history.json`: the history list for clients that do not parse the shell.
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── history.json      ["2024-01-03.html", "2024-01-02.html", ...]
//! ├── 2024-01-03.html
//! └── 2024-01-02.html
//! ```

use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub const HISTORY_FILE: &str = "history.json";

/// Write `history` (newest first) as a pretty-printed JSON array.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), entries = history.len()))]
pub async fn write_history(dir: &Path, history: &[String]) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(history)?;
    let path = dir.join(HISTORY_FILE);
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote history index");
    Ok(())
}
