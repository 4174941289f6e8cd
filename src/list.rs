use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checklist::{self, ChecklistLine, Progress};
use crate::due::{self, Classification};

const DELIMITER: &str = "---\n";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("missing frontmatter delimiter")]
    MissingFrontmatter,
    #[error("unclosed frontmatter")]
    UnclosedFrontmatter,
    #[error("parsing YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A named markdown list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub id: u64,
    pub name: String,
    /// Raw markdown, the single source of truth for checklist state
    pub content: String,
    pub due_date: Option<NaiveDate>,
    /// In the order given, duplicates kept
    pub tags: Vec<String>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

/// YAML header of a list file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Frontmatter {
    id: u64,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due: Option<NaiveDate>,
    #[serde(default)]
    tags: Vec<String>,
    created: DateTime<Local>,
    updated: DateTime<Local>,
}

impl List {
    /// Parse a list file: `---` YAML `---` followed by the raw content.
    ///
    /// Delimiter lines may end in `\n` or `\r\n`.
    pub fn from_document(text: &str) -> Result<Self, DocumentError> {
        let rest = text
            .strip_prefix(DELIMITER)
            .or_else(|| text.strip_prefix("---\r\n"))
            .ok_or(DocumentError::MissingFrontmatter)?;

        let (yaml, content) = split_frontmatter(rest).ok_or(DocumentError::UnclosedFrontmatter)?;

        let fm: Frontmatter = serde_yaml::from_str(yaml)?;
        Ok(List {
            id: fm.id,
            name: fm.name,
            content: content.to_string(),
            due_date: fm.due,
            tags: fm.tags,
            created_at: fm.created,
            updated_at: fm.updated,
        })
    }

    /// Render the file form. Content is appended verbatim.
    pub fn to_document(&self) -> Result<String, DocumentError> {
        let fm = Frontmatter {
            id: self.id,
            name: self.name.clone(),
            due: self.due_date,
            tags: self.tags.clone(),
            created: self.created_at,
            updated: self.updated_at,
        };
        let yaml = serde_yaml::to_string(&fm)?;

        let mut doc = String::with_capacity(yaml.len() + self.content.len() + 8);
        doc.push_str(DELIMITER);
        doc.push_str(yaml.trim_end());
        doc.push('\n');
        doc.push_str(DELIMITER);
        doc.push_str(&self.content);
        Ok(doc)
    }

    pub fn checklist(&self) -> Vec<ChecklistLine> {
        checklist::parse(&self.content)
    }

    pub fn progress(&self) -> Progress {
        checklist::progress(&self.content)
    }

    pub fn classify(&self, today: NaiveDate) -> Classification {
        due::classify(self.due_date, today)
    }

    /// True if the list carries at least one of `tags` (or `tags` is empty).
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.is_empty() || tags.iter().any(|t| self.tags.contains(t))
    }

    /// Case-insensitive substring search over name, content and tags.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

/// Split at the first `---` line: YAML before it, content after it.
fn split_frontmatter(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Split comma-separated tag input: each tag trimmed, empty ones dropped.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trimmed list name, or `None` if nothing is left.
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> List {
        let ts = Local
            .with_ymd_and_hms(2026, 10, 19, 9, 30, 0)
            .single()
            .expect("valid timestamp");
        List {
            id: 7,
            name: "Groceries".to_string(),
            content: "- [ ] Milk\n- [x] Eggs\n".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 10, 21),
            tags: vec!["home".to_string(), "food".to_string(), "home".to_string()],
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_document_round_trip() {
        let list = sample();
        let doc = list.to_document().expect("to_document failed");
        assert!(doc.starts_with("---\nid: 7\n"));
        assert!(doc.contains("due:"));
        assert!(doc.ends_with("---\n- [ ] Milk\n- [x] Eggs\n"));

        let parsed = List::from_document(&doc).expect("from_document failed");
        assert_eq!(parsed, list);
    }

    #[test]
    fn test_document_preserves_content_bytes() {
        let cases = vec![
            "",
            "no trailing newline",
            "\n\nleading blank lines\n",
            "crlf\r\nlines\r\n",
            "rule below\n---\nstill content\n",
        ];
        for content in cases {
            let mut list = sample();
            list.content = content.to_string();
            let doc = list.to_document().expect("to_document failed");
            let parsed = List::from_document(&doc).expect("from_document failed");
            assert_eq!(parsed.content, content, "content {:?} changed", content);
        }
    }

    #[test]
    fn test_document_without_due_date_or_tags() {
        let mut list = sample();
        list.due_date = None;
        list.tags.clear();
        let doc = list.to_document().expect("to_document failed");
        assert!(!doc.contains("due:"));

        let parsed = List::from_document(&doc).expect("from_document failed");
        assert_eq!(parsed.due_date, None);
        assert!(parsed.tags.is_empty());
    }

    #[test]
    fn test_document_tags_keep_order_and_duplicates() {
        let list = sample();
        let doc = list.to_document().expect("to_document failed");
        let parsed = List::from_document(&doc).expect("from_document failed");
        assert_eq!(parsed.tags, vec!["home", "food", "home"]);
    }

    #[test]
    fn test_document_errors() {
        assert!(matches!(
            List::from_document("no frontmatter"),
            Err(DocumentError::MissingFrontmatter)
        ));
        assert!(matches!(
            List::from_document("---\nid: 1\nname: x\n"),
            Err(DocumentError::UnclosedFrontmatter)
        ));
        assert!(matches!(
            List::from_document("---\nid: [oops\n---\n"),
            Err(DocumentError::Yaml(_))
        ));
    }

    #[test]
    fn test_document_closing_delimiter_at_eof() {
        let doc = "---\nid: 3\nname: Bare\ncreated: 2026-10-19T09:30:00+00:00\nupdated: 2026-10-19T09:30:00+00:00\n---";
        let parsed = List::from_document(doc).expect("from_document failed");
        assert_eq!(parsed.id, 3);
        assert_eq!(parsed.content, "");
    }

    #[test]
    fn test_document_with_crlf_delimiters() {
        let doc = "---\r\nid: 4\r\nname: Windows\r\ncreated: 2026-10-19T09:30:00+00:00\r\nupdated: 2026-10-19T09:30:00+00:00\r\n---\r\n- [ ] a\r\n- [x] b\r\n";
        let parsed = List::from_document(doc).expect("from_document failed");
        assert_eq!(parsed.id, 4);
        assert_eq!(parsed.name, "Windows");
        assert_eq!(parsed.content, "- [ ] a\r\n- [x] b\r\n");
        assert_eq!(parsed.progress(), Progress { done: 1, total: 2 });
    }

    #[test]
    fn test_parse_tags() {
        let cases = vec![
            ("", vec![]),
            ("work", vec!["work"]),
            (" work , home ", vec!["work", "home"]),
            ("a,,b, ,c", vec!["a", "b", "c"]),
            ("dup, dup", vec!["dup", "dup"]),
        ];
        for (input, want) in cases {
            assert_eq!(parse_tags(input), want, "parse_tags({:?})", input);
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Trip  "), Some("Trip".to_string()));
        assert_eq!(normalize_name("   "), None);
        assert_eq!(normalize_name(""), None);
    }

    #[test]
    fn test_has_any_tag() {
        let list = sample();
        assert!(list.has_any_tag(&[]));
        assert!(list.has_any_tag(&["food".to_string(), "x".to_string()]));
        assert!(!list.has_any_tag(&["work".to_string()]));
    }

    #[test]
    fn test_matches_search() {
        let list = sample();
        assert!(list.matches_search("grocer"));
        assert!(list.matches_search("EGGS"));
        assert!(list.matches_search("food"));
        assert!(list.matches_search(""));
        assert!(!list.matches_search("hardware"));
    }

    #[test]
    fn test_progress_and_classify() {
        let list = sample();
        assert_eq!(list.progress(), Progress { done: 1, total: 2 });
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        assert_eq!(list.classify(today).label.as_deref(), Some("Due in 2 days"));
    }
}
