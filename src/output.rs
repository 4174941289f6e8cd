//! Output formatting utilities with TTY auto-detection and semantic styling.

use std::io::IsTerminal;
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use regex::Regex;
use unicode_width::UnicodeWidthStr;

use crate::checklist::{ChecklistLine, Progress};
use crate::due::{Bucket, Classification};

static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Output format for commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-optimized: colors, tables, rendered markdown
    #[default]
    Pretty,
    /// Script-friendly: no colors, pipe-delimited
    Plain,
    /// Machine-readable JSON with ISO 8601 timestamps
    Json,
    /// Machine-readable YAML with ISO 8601 timestamps
    Yaml,
}

impl OutputFormat {
    /// Resolve the output format, applying TTY auto-detection.
    ///
    /// If format is Pretty but stdout is not a TTY, returns Plain.
    pub fn resolve(self) -> Self {
        match self {
            OutputFormat::Pretty if !std::io::stdout().is_terminal() => OutputFormat::Plain,
            other => other,
        }
    }
}

/// Serialize `value` for json/yaml output.
pub fn to_machine<T: serde::Serialize>(value: &T, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {}", e)),
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {}", e)),
        _ => Err("not a machine-readable format".to_string()),
    }
}

// ============================================================================
// Semantic Styling
// ============================================================================

/// Due label colors.
/// - Red: overdue
/// - Bold red: due today
/// - Yellow: due within a week
/// - Plain: later
pub fn style_due(classification: &Classification) -> ColoredString {
    let label = classification.label.as_deref().unwrap_or("");
    match (classification.bucket, classification.days_delta) {
        (Bucket::Overdue, _) => label.red(),
        (Bucket::DueToday, _) => label.red().bold(),
        (Bucket::Upcoming, Some(days)) if days <= 7 => label.yellow(),
        _ => label.normal(),
    }
}

/// Section heading for a bucket.
pub fn style_heading(bucket: Bucket) -> ColoredString {
    let heading = bucket.heading();
    match bucket {
        Bucket::Overdue => heading.red().bold(),
        Bucket::DueToday => heading.red().bold(),
        Bucket::Upcoming => heading.yellow().bold(),
        Bucket::None => heading.bold(),
    }
}

/// Style for list ids and checklist keys - always dimmed.
pub fn style_id(id: &str) -> ColoredString {
    id.dimmed()
}

pub fn style_tag(tag: &str) -> ColoredString {
    format!("#{}", tag).cyan()
}

/// Progress counter: green when everything is checked.
pub fn style_progress(progress: Progress) -> ColoredString {
    let text = progress.to_string();
    if progress.total == 0 {
        text.dimmed()
    } else if progress.done == progress.total {
        text.green()
    } else {
        text.normal()
    }
}

/// Checkbox marker for pretty output.
pub fn checkbox(line: &ChecklistLine) -> ColoredString {
    if line.checked { "☑".green() } else { "☐".normal() }
}

// ============================================================================
// Terminal utilities
// ============================================================================

/// Get terminal width, defaulting to 80 if unavailable.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Wrap `content` to `width`, putting `prefix` on the first line and
/// indenting continuation lines to the prefix's visible width.
pub fn wrap_with_prefix(prefix: &str, content: &str, width: usize) -> Vec<String> {
    let prefix_width = visible_width(prefix);
    let content_width = width.saturating_sub(prefix_width);
    if content_width == 0 {
        return vec![format!("{}{}", prefix, content)];
    }

    let indent = " ".repeat(prefix_width);
    wrap_ansi::wrap_ansi(content, content_width, None)
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("{}{}", prefix, line)
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect()
}

/// Display width of a string, ignoring ANSI escape codes.
pub fn visible_width(s: &str) -> usize {
    ANSI_RE.replace_all(s, "").width()
}

// ============================================================================
// Date formatting
// ============================================================================

/// Format a datetime as short relative time (e.g., "5m", "3h", "2d", "1w", "2mo", "1y").
pub fn format_relative_short(dt: DateTime<Local>) -> String {
    let now = Local::now();
    let duration = now.signed_duration_since(dt);

    let minutes = duration.num_minutes().abs();
    let hours = duration.num_hours().abs();
    let days = duration.num_days().abs();

    if minutes < 1 {
        "now".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if hours < 24 {
        format!("{}h", hours)
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}

/// Truncate a string from the back, showing "prefix…".
pub fn truncate_back(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else if max_chars <= 1 {
        "…".to_string()
    } else {
        let truncated: String = s.chars().take(max_chars - 1).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_truncate_back() {
        let cases = vec![
            ("short", 10, "short"),
            ("exactly10!", 10, "exactly10!"),
            ("a longer list name", 8, "a longe…"),
            ("abc", 1, "…"),
        ];
        for (input, max, want) in cases {
            assert_eq!(truncate_back(input, max), want, "truncate_back({:?}, {})", input, max);
        }
    }

    #[test]
    fn test_format_relative_short() {
        let now = Local::now();
        assert_eq!(format_relative_short(now), "now");
        assert_eq!(format_relative_short(now - Duration::minutes(5)), "5m");
        assert_eq!(format_relative_short(now - Duration::hours(3)), "3h");
        assert_eq!(format_relative_short(now - Duration::days(2)), "2d");
        assert_eq!(format_relative_short(now - Duration::days(14)), "2w");
        assert_eq!(format_relative_short(now - Duration::days(400)), "1y");
    }

    #[test]
    fn test_visible_width_ignores_ansi() {
        assert_eq!(visible_width("hello"), 5);
        assert_eq!(visible_width("\x1b[32mhello\x1b[0m"), 5);
        assert_eq!(visible_width("\x1b[1;31mdue\x1b[0m today"), 9);
    }

    #[test]
    fn test_wrap_with_prefix() {
        let lines = wrap_with_prefix("☐ ", "buy milk and eggs", 10);
        assert!(lines.len() > 1);
        assert!(lines[0].starts_with("☐ "));
        assert!(lines[1].starts_with("  "));

        let lines = wrap_with_prefix("[x] ", "short", 40);
        assert_eq!(lines, vec!["[x] short"]);
    }

    #[test]
    fn test_style_due_keeps_label() {
        let c = crate::due::classify(
            chrono::NaiveDate::from_ymd_opt(2026, 10, 18),
            chrono::NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date"),
        );
        assert!(style_due(&c).to_string().contains("Overdue by 1 day"));
    }

    #[test]
    fn test_machine_format() {
        let out = to_machine(&vec!["a", "b"], OutputFormat::Json).expect("json");
        assert!(out.contains("\"a\""));
        assert!(to_machine(&1, OutputFormat::Plain).is_err());
    }
}
