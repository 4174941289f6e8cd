//! Checklist items in raw markdown.
//!
//! A list's `content` is the only place checklist state lives. Everything in
//! this module is derived from it on demand:
//!
//! - `parse` finds the task-list lines (`- [ ]`, `- [x]`, `- [X]`, also with
//!   `*`/`+` bullets, any indentation, also inside `>` quotes) outside
//!   fenced code blocks.
//! - Every line gets a key: six hex digits of the md5 of its normalized text
//!   plus a two-digit counter for repeated texts. Keys ignore the checked
//!   state, so a key survives toggling.
//! - `toggle` rewrites the three-byte marker of exactly one line and leaves
//!   every other byte alone, line separators included.
//!
//! Lines can be addressed by key (prefix) or by their rendered text. Text
//! lookup is a two-step heuristic: first line whose text contains the whole
//! locator, then first line whose text contains its first
//! [`PREFIX_MATCH_CHARS`] characters. The first line in document order wins,
//! so an earlier item whose text also contains the locator (or its prefix)
//! captures the toggle. Keys don't have that problem.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use md5::{Digest, Md5};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Characters of the locator text used by the prefix fallback.
pub const PREFIX_MATCH_CHARS: usize = 20;

// quote prefix, indent, marker char, item text
static CHECKLIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[ \t]*>[ \t]?)*([ \t]*)[-*+][ \t]+\[([ xX])\](?:[ \t]+(.*))?$").unwrap()
});

const CHECKED_MARKER: &str = "[x]";
const UNCHECKED_MARKER: &str = "[ ]";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("no checklist item matches {locator}")]
    NotFound { locator: String },
    #[error("key '{key}' matches {count} checklist items")]
    Ambiguous { key: String, count: usize },
}

/// How a caller points at a checklist line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineLocator {
    /// Key or unique key prefix as returned by [`parse`]
    Key(String),
    /// Rendered item text, matched against the raw line text
    Text(String),
}

impl fmt::Display for LineLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineLocator::Key(key) => write!(f, "key '{}'", key),
            LineLocator::Text(text) => write!(f, "text '{}'", text),
        }
    }
}

/// One task-list line of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistLine {
    /// Zero-based line number in the document
    pub line: usize,
    /// Position among the document's checklist lines
    pub ordinal: usize,
    /// Width of the whitespace before the bullet, after any quote markers
    pub indent: usize,
    pub checked: bool,
    /// Everything after the marker, trimmed
    pub text: String,
    pub key: String,
    /// Byte offset of the `[` in the document
    #[serde(skip)]
    marker_offset: usize,
}

/// Checked / total counts for a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.done, self.total)
    }
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fence character and run length if `line` is a code fence.
///
/// Four columns of indentation make it indented code instead.
fn fence_of(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() >= 4 {
        return None;
    }
    let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let run = trimmed.chars().take_while(|c| *c == ch).count();
    if run < 3 || (ch == '`' && trimmed[run..].contains('`')) {
        return None;
    }
    Some((ch, run))
}

/// A fence closes only with the same character, at least as long, and no info string.
fn closes_fence(line: &str, open: (char, usize)) -> bool {
    match fence_of(line) {
        Some((ch, run)) => ch == open.0 && run >= open.1 && line.trim()[run..].is_empty(),
        None => false,
    }
}

fn text_hash(text: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(normalize_whitespace(text).as_bytes());
    let digest = hasher.finalize();
    format!("{:02x}{:02x}{:02x}", digest[0], digest[1], digest[2])
}

/// Find every checklist line in `content`, in document order.
pub fn parse(content: &str) -> Vec<ChecklistLine> {
    let mut items = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut open_fence: Option<(char, usize)> = None;
    let mut line_start = 0;

    for (line_no, raw) in content.split_inclusive('\n').enumerate() {
        let line = raw.trim_end_matches(['\n', '\r']);
        let offset = line_start;
        line_start += raw.len();

        if let Some(open) = open_fence {
            if closes_fence(line, open) {
                open_fence = None;
            }
            continue;
        }
        if let Some(fence) = fence_of(line) {
            open_fence = Some(fence);
            continue;
        }

        let Some(caps) = CHECKLIST_RE.captures(line) else {
            continue;
        };
        let (Some(indent), Some(mark)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let text = caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default();

        let hash = text_hash(text);
        let dup = seen.entry(hash.clone()).or_insert(0);
        let key = format!("{}{:02x}", hash, dup);
        *dup += 1;

        items.push(ChecklistLine {
            line: line_no,
            ordinal: items.len(),
            indent: indent.as_str().len(),
            checked: mark.as_str().eq_ignore_ascii_case("x"),
            text: text.to_string(),
            key,
            marker_offset: offset + mark.start() - 1,
        });
    }

    items
}

/// Count checked and total checklist lines.
pub fn progress(content: &str) -> Progress {
    let items = parse(content);
    Progress {
        done: items.iter().filter(|i| i.checked).count(),
        total: items.len(),
    }
}

/// Resolve a locator against parsed lines.
pub fn resolve<'a>(
    items: &'a [ChecklistLine],
    target: &LineLocator,
) -> Result<&'a ChecklistLine, ChecklistError> {
    let not_found = || ChecklistError::NotFound {
        locator: target.to_string(),
    };

    match target {
        LineLocator::Key(prefix) => {
            let prefix = prefix.trim().to_ascii_lowercase();
            if prefix.is_empty() {
                return Err(not_found());
            }
            let matches: Vec<&ChecklistLine> =
                items.iter().filter(|i| i.key.starts_with(&prefix)).collect();
            match matches.as_slice() {
                [] => Err(not_found()),
                [only] => Ok(*only),
                _ => Err(ChecklistError::Ambiguous {
                    key: prefix,
                    count: matches.len(),
                }),
            }
        }
        LineLocator::Text(text) => {
            let needle = normalize_whitespace(text);
            if needle.is_empty() {
                return Err(not_found());
            }
            let normalized: Vec<String> =
                items.iter().map(|i| normalize_whitespace(&i.text)).collect();

            if let Some(pos) = normalized.iter().position(|t| t.contains(&needle)) {
                return Ok(&items[pos]);
            }

            let prefix: String = needle.chars().take(PREFIX_MATCH_CHARS).collect();
            normalized
                .iter()
                .position(|t| t.contains(&prefix))
                .map(|pos| &items[pos])
                .ok_or_else(not_found)
        }
    }
}

/// Set the checked state of the line `target` points at.
///
/// Returns the whole new document; only the marker of the matched line
/// differs from `content`. On `NotFound` the caller keeps its content as is.
pub fn toggle(content: &str, target: &LineLocator, checked: bool) -> Result<String, ChecklistError> {
    let items = parse(content);
    let item = resolve(&items, target)?;

    let marker = if checked {
        CHECKED_MARKER
    } else {
        UNCHECKED_MARKER
    };
    let start = item.marker_offset;
    let end = start + marker.len();

    let mut out = String::with_capacity(content.len());
    out.push_str(&content[..start]);
    out.push_str(marker);
    out.push_str(&content[end..]);

    debug!(line = item.line, key = %item.key, checked, "set checklist item");
    Ok(out)
}
