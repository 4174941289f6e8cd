//! Shared CLI argument structs for consistent flag definitions across commands.
//!
//! Use `#[command(flatten)]` to include them in command-specific Args structs.

use clap::{Args, ValueEnum};

use crate::config::env_string;
use crate::list::{List, parse_tags};
use crate::output::OutputFormat;

// ============================================================================
// FormatArgs - Output format flags
// ============================================================================

/// Common output format flags.
///
/// Provides consistent --format/-f and --json flags across commands.
/// Use `resolve()` to get the effective format with TTY auto-detection.
#[derive(Args, Clone, Debug, Default)]
pub struct FormatArgs {
    /// Output format (default: $LISTS_FORMAT, else pretty; auto-detects TTY)
    #[arg(short = 'f', long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Output as JSON (shorthand for --format=json)
    #[arg(long, conflicts_with = "format", global = true)]
    pub json: bool,
}

impl FormatArgs {
    /// Resolve the effective output format.
    ///
    /// --json wins, then --format, then LISTS_FORMAT. Pretty falls back to
    /// plain when stdout is not a TTY.
    pub fn resolve(&self) -> OutputFormat {
        if self.json {
            return OutputFormat::Json;
        }
        self.format
            .or_else(|| {
                env_string("LISTS_FORMAT").and_then(|v| OutputFormat::from_str(v.trim(), true).ok())
            })
            .unwrap_or_default()
            .resolve()
    }
}

// ============================================================================
// TagFilterArgs - Tag filter flags
// ============================================================================

/// Tag filter shared by `list` and `due`.
///
/// `--tag` is repeatable and also accepts comma-separated values. A list
/// passes when it carries any of the selected tags.
#[derive(Args, Clone, Debug, Default)]
pub struct TagFilterArgs {
    /// Only lists with any of these tags (repeatable, comma-separated)
    #[arg(short = 't', long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

impl TagFilterArgs {
    /// Selected tags, split on commas, trimmed, empties dropped.
    pub fn selected(&self) -> Vec<String> {
        self.tags.iter().flat_map(|t| parse_tags(t)).collect()
    }

    pub fn is_active(&self) -> bool {
        !self.selected().is_empty()
    }

    pub fn matches(&self, list: &List) -> bool {
        list.has_any_tag(&self.selected())
    }

    /// Summary like "3 lists filtered by 2 tags"; empty when no filter is set.
    pub fn description(&self, shown: usize) -> String {
        let n = self.selected().len();
        if n == 0 {
            return String::new();
        }
        format!(
            "{} list{} filtered by {} tag{}",
            shown,
            if shown == 1 { "" } else { "s" },
            n,
            if n == 1 { "" } else { "s" }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(tags: &[&str]) -> TagFilterArgs {
        TagFilterArgs {
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_tag_filter_selected() {
        assert!(filter(&[]).selected().is_empty());
        assert!(!filter(&[" , "]).is_active());
        assert_eq!(filter(&["work", "home"]).selected(), vec!["work", "home"]);
        assert_eq!(
            filter(&["work, home", "errands"]).selected(),
            vec!["work", "home", "errands"]
        );
    }

    #[test]
    fn test_tag_filter_description() {
        let cases = vec![
            (vec![], 4, ""),
            (vec!["work"], 1, "1 list filtered by 1 tag"),
            (vec!["work,home"], 3, "3 lists filtered by 2 tags"),
            (vec!["a", "b", "c"], 0, "0 lists filtered by 3 tags"),
        ];
        for (tags, shown, want) in cases {
            let args = filter(&tags);
            assert_eq!(args.description(shown), want, "tags {:?}", tags);
        }
    }

    #[test]
    fn test_format_flag_wins() {
        let args = FormatArgs {
            format: Some(OutputFormat::Yaml),
            json: false,
        };
        assert_eq!(args.resolve(), OutputFormat::Yaml);

        let args = FormatArgs {
            format: None,
            json: true,
        };
        assert_eq!(args.resolve(), OutputFormat::Json);
    }
}
