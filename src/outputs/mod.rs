//! Output generation: the daily report, the shell page and the history list.
//!
//! # Submodules
//!
//! - [`html`]: Renders a [`crate::models::BuildArtifact`] into the daily page
//! - [`shell`]: Renders `index.html`, which frames the latest daily page
//! - [`indexes`]: Scans and orders the history of published days
//! - [`json`]: Writes the history list as `history.json`
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── index.html        # Shell with history selector
//! ├── history.json      # Newest-first list of daily pages
//! ├── 2024-01-03.html   # Daily report
//! └── 2024-01-02.html
//! ```
//!
//! Rendering is pure; only [`indexes`] and [`json`] touch the file system.

pub mod html;
pub mod indexes;
pub mod json;
pub mod shell;
