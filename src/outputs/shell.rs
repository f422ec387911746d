//! The `index.html` shell: a header with a history selector framing the
//! latest daily page in an iframe.

use chrono::{DateTime, Local};
use html_escape::{encode_double_quoted_attribute, encode_text};
use itertools::Itertools;

const SHELL_CSS: &str = include_str!("../../assets/shell.css");

/// Render the shell for `history` (newest first). The first entry is the
/// page the iframe opens on and the preselected option.
pub fn render_shell(history: &[String], generated_at: DateTime<Local>) -> String {
    let latest = history.first().map(String::as_str).unwrap_or("about:blank");
    let options = history
        .iter()
        .enumerate()
        .map(|(i, file)| {
            format!(
                r#"<option value="{value}"{selected}>{label}</option>"#,
                value = encode_double_quoted_attribute(file),
                selected = if i == 0 { " selected" } else { "" },
                label = encode_text(file.trim_end_matches(".html")),
            )
        })
        .join("\n                ");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AI Pulse</title>
    <style>
{SHELL_CSS}
    </style>
</head>
<body>
    <header>
        <div class="header-left">
            <div class="logo">AI Pulse</div>
            <select id="history-select" class="history-select" onchange="loadReport(this.value)">
                {options}
            </select>
        </div>
        <div class="timestamp">Updated: {updated}</div>
    </header>

    <iframe id="report-frame" src="{src}"></iframe>

    <script>
        function loadReport(file) {{
            if (file) {{
                document.getElementById('report-frame').src = file;
            }}
        }}
    </script>
</body>
</html>
"#,
        updated = generated_at.format("%Y-%m-%d %H:%M %:z"),
        src = encode_double_quoted_attribute(latest),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn history() -> Vec<String> {
        vec![
            "2024-01-03.html".to_string(),
            "2024-01-02.html".to_string(),
            "2024-01-01.html".to_string(),
        ]
    }

    #[test]
    fn test_iframe_points_at_latest() {
        let now = Local.with_ymd_and_hms(2024, 1, 3, 8, 0, 0).unwrap();
        let html = render_shell(&history(), now);
        assert!(html.contains(r#"<iframe id="report-frame" src="2024-01-03.html">"#));
    }

    #[test]
    fn test_latest_option_is_preselected() {
        let html = render_shell(&history(), Local::now());
        assert!(html.contains(r#"<option value="2024-01-03.html" selected>2024-01-03</option>"#));
        assert!(html.contains(r#"<option value="2024-01-01.html">2024-01-01</option>"#));
        assert_eq!(html.matches(" selected>").count(), 1);
    }

    #[test]
    fn test_options_keep_history_order() {
        let html = render_shell(&history(), Local::now());
        let first = html.find("2024-01-03</option>").unwrap();
        let last = html.find("2024-01-01</option>").unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_empty_history_renders_blank_frame() {
        let html = render_shell(&[], Local::now());
        assert!(html.contains(r#"src="about:blank""#));
        assert!(!html.contains("<option"));
    }
}
