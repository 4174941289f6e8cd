//! File-backed list store.
//!
//! Lists live in a `.lists/` directory at the store root, one file per list
//! named `NNNNNN-slug.md`. The numeric prefix is the list id and is
//! authoritative over the id in the frontmatter. Files that fail to parse are
//! skipped (with a warning) when listing, and reported when addressed
//! directly.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use clap_complete::engine::CompletionCandidate;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::checklist::{self, ChecklistError, LineLocator};
use crate::config::env_string;
use crate::list::{self, DocumentError, List};

/// Directory holding the list files
pub const LISTS_DIR: &str = ".lists";

static FILE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)-.*\.md$").unwrap());

static SLUGIFY_NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

static SLUGIFY_MULTI_DASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no .lists directory found here or in any parent (run 'lists init')")]
    NotInitialized,
    #[error("list {0} not found")]
    NotFound(u64),
    #[error("no list matches '{0}'")]
    NoMatch(String),
    #[error("ambiguous reference '{reference}' matches {}", .names.join(", "))]
    Ambiguous {
        reference: String,
        names: Vec<String>,
    },
    #[error("list name is required")]
    EmptyName,
    #[error("{path}: {source}")]
    Document {
        path: String,
        source: DocumentError,
    },
    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
    #[error("could not update checklist item: {0}")]
    Checklist(#[from] ChecklistError),
}

fn io_error(context: String) -> impl FnOnce(std::io::Error) -> StoreError {
    move |source| StoreError::Io { context, source }
}

/// Fields of a list to be created.
#[derive(Debug, Clone, Default)]
pub struct NewList {
    pub name: String,
    pub content: String,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

/// Changes to apply to a list; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct ListUpdate {
    pub name: Option<String>,
    pub content: Option<String>,
    /// `Some(None)` clears the due date
    pub due_date: Option<Option<NaiveDate>>,
    pub tags: Option<Vec<String>>,
}

impl ListUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none() && self.due_date.is_none() && self.tags.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ListStore {
    root: PathBuf,
    dir: PathBuf,
}

impl ListStore {
    /// Open the store at `root`; its `.lists/` directory must exist.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let dir = root.join(LISTS_DIR);
        if !dir.is_dir() {
            return Err(StoreError::NotInitialized);
        }
        Ok(ListStore {
            root: root.to_path_buf(),
            dir,
        })
    }

    /// Create `.lists/` under `root` (no-op if present) and open it.
    pub fn init(root: &Path) -> Result<Self, StoreError> {
        let dir = root.join(LISTS_DIR);
        fs::create_dir_all(&dir).map_err(io_error(format!("creating {}", dir.display())))?;
        info!(dir = %dir.display(), "initialized list store");
        Self::open(root)
    }

    /// Find the store for `cwd`: `root_override` if given, else the nearest
    /// ancestor (cwd included) that has a `.lists/` directory.
    pub fn discover(cwd: &Path, root_override: Option<&Path>) -> Result<Self, StoreError> {
        if let Some(root) = root_override {
            return Self::open(root);
        }
        cwd.ancestors()
            .find(|dir| dir.join(LISTS_DIR).is_dir())
            .ok_or(StoreError::NotInitialized)
            .and_then(Self::open)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// (id, path) of every list file, sorted by id.
    fn entries(&self) -> Result<Vec<(u64, PathBuf)>, StoreError> {
        let read = fs::read_dir(&self.dir).map_err(io_error(format!("reading {}", self.dir.display())))?;

        let mut entries = Vec::new();
        for entry in read.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(OsStr::to_str) else {
                continue;
            };
            if let Some(id) = FILE_NAME_RE
                .captures(name)
                .and_then(|c| c[1].parse::<u64>().ok())
            {
                entries.push((id, path));
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn path_of(&self, id: u64) -> Result<PathBuf, StoreError> {
        self.entries()?
            .into_iter()
            .find(|(i, _)| *i == id)
            .map(|(_, p)| p)
            .ok_or(StoreError::NotFound(id))
    }

    fn load(id: u64, path: &Path) -> Result<List, StoreError> {
        let text = fs::read_to_string(path).map_err(io_error(format!("reading {}", path.display())))?;
        let mut list = List::from_document(&text).map_err(|source| StoreError::Document {
            path: path.display().to_string(),
            source,
        })?;
        if list.id != id {
            warn!(file = %path.display(), frontmatter_id = list.id, "list id differs from file name");
            list.id = id;
        }
        Ok(list)
    }

    /// Where `list` is stored.
    pub fn file_path(&self, list: &List) -> PathBuf {
        self.dir.join(file_name(list.id, &list.name))
    }

    /// Write `list`, removing `previous` if the file name changed.
    fn save(&self, list: &List, previous: Option<&Path>) -> Result<PathBuf, StoreError> {
        let path = self.file_path(list);
        let doc = list.to_document().map_err(|source| StoreError::Document {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(&path, doc).map_err(io_error(format!("writing {}", path.display())))?;

        if let Some(prev) = previous {
            if prev != path {
                fs::remove_file(prev).map_err(io_error(format!("removing {}", prev.display())))?;
                debug!(from = %prev.display(), to = %path.display(), "renamed list file");
            }
        }
        Ok(path)
    }

    pub fn get(&self, id: u64) -> Result<List, StoreError> {
        let path = self.path_of(id)?;
        Self::load(id, &path)
    }

    /// Resolve a user reference: an id, an exact name (case-insensitive), or
    /// a substring of exactly one list's name.
    pub fn find(&self, reference: &str) -> Result<List, StoreError> {
        let reference = reference.trim();
        if let Ok(id) = reference.parse::<u64>() {
            match self.get(id) {
                Err(StoreError::NotFound(_)) => debug!(id, "no list with this id, matching by name"),
                result => return result,
            }
        }

        let needle = reference.to_lowercase();
        if needle.is_empty() {
            return Err(StoreError::NoMatch(reference.to_string()));
        }
        let lists = self.list()?;

        if let Some(exact) = lists.iter().find(|l| l.name.to_lowercase() == needle) {
            return Ok(exact.clone());
        }

        let mut matches: Vec<List> = lists
            .into_iter()
            .filter(|l| l.name.to_lowercase().contains(&needle))
            .collect();
        match matches.len() {
            0 => Err(StoreError::NoMatch(reference.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(StoreError::Ambiguous {
                reference: reference.to_string(),
                names: matches
                    .iter()
                    .map(|l| format!("{} ({})", l.name, l.id))
                    .collect(),
            }),
        }
    }

    pub fn create(&self, new: NewList) -> Result<List, StoreError> {
        let name = list::normalize_name(&new.name).ok_or(StoreError::EmptyName)?;
        let id = self
            .entries()?
            .last()
            .map(|(id, _)| id + 1)
            .unwrap_or(1);

        let now = Local::now();
        let list = List {
            id,
            name,
            content: new.content,
            due_date: new.due_date,
            tags: new.tags,
            created_at: now,
            updated_at: now,
        };
        self.save(&list, None)?;
        info!(id, name = %list.name, "created list");
        Ok(list)
    }

    pub fn update(&self, id: u64, changes: ListUpdate) -> Result<List, StoreError> {
        let path = self.path_of(id)?;
        let mut list = Self::load(id, &path)?;

        if let Some(name) = changes.name {
            list.name = list::normalize_name(&name).ok_or(StoreError::EmptyName)?;
        }
        if let Some(content) = changes.content {
            list.content = content;
        }
        if let Some(due_date) = changes.due_date {
            list.due_date = due_date;
        }
        if let Some(tags) = changes.tags {
            list.tags = tags;
        }
        list.updated_at = Local::now();

        self.save(&list, Some(&path))?;
        info!(id, "updated list");
        Ok(list)
    }

    /// Replace the whole content (editor save).
    pub fn set_content(&self, id: u64, content: String) -> Result<List, StoreError> {
        self.update(
            id,
            ListUpdate {
                content: Some(content),
                ..ListUpdate::default()
            },
        )
    }

    /// Check or uncheck one checklist item of the stored content.
    ///
    /// Always works on the content currently on disk. When the locator
    /// matches nothing the file is not touched.
    pub fn toggle_item(&self, id: u64, target: &LineLocator, checked: bool) -> Result<List, StoreError> {
        let path = self.path_of(id)?;
        let mut list = Self::load(id, &path)?;

        let content = checklist::toggle(&list.content, target, checked).inspect_err(|e| {
            warn!(id, error = %e, "checklist toggle failed, list left unchanged");
        })?;

        list.content = content;
        list.updated_at = Local::now();
        self.save(&list, Some(&path))?;
        Ok(list)
    }

    /// All lists, newest first.
    pub fn list(&self) -> Result<Vec<List>, StoreError> {
        let mut lists = Vec::new();
        for (id, path) in self.entries()? {
            match Self::load(id, &path) {
                Ok(list) => lists.push(list),
                Err(e) => warn!(error = %e, "skipping unreadable list file"),
            }
        }
        lists.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(lists)
    }

    /// Lists that have a due date, earliest first.
    pub fn list_with_due_dates(&self) -> Result<Vec<List>, StoreError> {
        let mut lists: Vec<List> = self
            .list()?
            .into_iter()
            .filter(|l| l.due_date.is_some())
            .collect();
        lists.sort_by_key(|l| (l.due_date, l.id));
        Ok(lists)
    }

    pub fn delete(&self, id: u64) -> Result<(), StoreError> {
        let path = self.path_of(id)?;
        fs::remove_file(&path).map_err(io_error(format!("removing {}", path.display())))?;
        info!(id, "deleted list");
        Ok(())
    }

    /// Every tag in use, sorted and deduplicated.
    pub fn all_tags(&self) -> Result<Vec<String>, StoreError> {
        let tags: BTreeSet<String> = self
            .list()?
            .into_iter()
            .flat_map(|l| l.tags)
            .collect();
        Ok(tags.into_iter().collect())
    }
}

/// Convert a list name to a file-name slug.
pub fn slugify(name: &str) -> String {
    let s = name.to_lowercase();
    let s = SLUGIFY_NON_ALNUM_RE.replace_all(&s, "-");
    let s = SLUGIFY_MULTI_DASH_RE.replace_all(&s, "-");
    s.trim_matches('-').to_string()
}

fn file_name(id: u64, name: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        format!("{:06}-list.md", id)
    } else {
        format!("{:06}-{}.md", id, slug)
    }
}

/// Completer for list ids - returns ids with list names as descriptions.
pub fn complete_list_ids(current: &OsStr) -> Vec<CompletionCandidate> {
    let current = current.to_str().unwrap_or_default();
    let Ok(cwd) = std::env::current_dir() else {
        return vec![];
    };
    let root_override = env_string("LISTS_ROOT").map(PathBuf::from);
    let Ok(store) = ListStore::discover(&cwd, root_override.as_deref()) else {
        return vec![];
    };
    let Ok(lists) = store.list() else {
        return vec![];
    };

    lists
        .into_iter()
        .map(|l| (l.id.to_string(), l.name))
        .filter(|(id, _)| id.starts_with(current))
        .map(|(id, name)| CompletionCandidate::new(id).help(Some(name.into())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ListStore) {
        let tmp = TempDir::new().expect("tempdir");
        let store = ListStore::init(tmp.path()).expect("init failed");
        (tmp, store)
    }

    fn new_list(name: &str, content: &str, due: Option<&str>, tags: &[&str]) -> NewList {
        NewList {
            name: name.to_string(),
            content: content.to_string(),
            due_date: due.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").expect("bad date")),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_slugify() {
        let cases = vec![
            ("Hello World", "hello-world"),
            ("Weekend: groceries & errands", "weekend-groceries-errands"),
            ("Trailing hyphens---", "trailing-hyphens"),
            ("---Leading hyphens", "leading-hyphens"),
            ("MixedCASE", "mixedcase"),
            ("123 numbers first", "123-numbers-first"),
            ("!!!", ""),
        ];

        for (name, want) in cases {
            let got = slugify(name);
            assert_eq!(got, want, "slugify({:?}) = {:?}, want {:?}", name, got, want);
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(3, "Groceries"), "000003-groceries.md");
        assert_eq!(file_name(12, "???"), "000012-list.md");
    }

    #[test]
    fn test_discover() {
        let tmp = TempDir::new().expect("tempdir");
        let nested = tmp.path().join("a").join("b");
        fs::create_dir_all(&nested).expect("mkdir");

        assert!(matches!(
            ListStore::discover(&nested, None),
            Err(StoreError::NotInitialized)
        ));

        ListStore::init(tmp.path()).expect("init failed");
        let found = ListStore::discover(&nested, None).expect("discover failed");
        assert_eq!(found.root(), tmp.path());

        let other = TempDir::new().expect("tempdir");
        assert!(matches!(
            ListStore::discover(&nested, Some(other.path())),
            Err(StoreError::NotInitialized)
        ));
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let (_tmp, store) = store();
        let a = store.create(new_list("First", "", None, &[])).expect("create");
        let b = store.create(new_list("Second", "", None, &[])).expect("create");
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(store.dir().join("000001-first.md").is_file());
        assert!(store.dir().join("000002-second.md").is_file());
    }

    #[test]
    fn test_create_requires_name() {
        let (_tmp, store) = store();
        let err = store.create(new_list("   ", "", None, &[])).unwrap_err();
        assert!(matches!(err, StoreError::EmptyName));
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn test_get_round_trips_fields() {
        let (_tmp, store) = store();
        let created = store
            .create(new_list(
                " Trip ",
                "- [ ] Passport\n",
                Some("2026-11-01"),
                &["travel", "urgent", "travel"],
            ))
            .expect("create");
        let got = store.get(created.id).expect("get");
        assert_eq!(got.name, "Trip");
        assert_eq!(got.content, "- [ ] Passport\n");
        assert_eq!(got.due_date, created.due_date);
        assert_eq!(got.tags, vec!["travel", "urgent", "travel"]);
        assert_eq!(got.created_at, created.created_at);
    }

    #[test]
    fn test_get_missing() {
        let (_tmp, store) = store();
        assert!(matches!(store.get(42), Err(StoreError::NotFound(42))));
    }

    #[test]
    fn test_update_renames_and_refreshes_timestamp() {
        let (_tmp, store) = store();
        let created = store
            .create(new_list("Old name", "body", Some("2026-11-01"), &["a"]))
            .expect("create");

        let updated = store
            .update(
                created.id,
                ListUpdate {
                    name: Some("New name".to_string()),
                    due_date: Some(None),
                    ..ListUpdate::default()
                },
            )
            .expect("update");

        assert_eq!(updated.name, "New name");
        assert_eq!(updated.content, "body");
        assert_eq!(updated.due_date, None);
        assert_eq!(updated.tags, vec!["a"]);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);

        assert!(!store.dir().join("000001-old-name.md").exists());
        assert!(store.dir().join("000001-new-name.md").is_file());
        assert_eq!(store.get(created.id).expect("get").name, "New name");
    }

    #[test]
    fn test_update_rejects_blank_name() {
        let (_tmp, store) = store();
        let created = store.create(new_list("Keep", "", None, &[])).expect("create");
        let err = store
            .update(
                created.id,
                ListUpdate {
                    name: Some(" ".to_string()),
                    ..ListUpdate::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyName));
        assert_eq!(store.get(created.id).expect("get").name, "Keep");
    }

    #[test]
    fn test_set_content() {
        let (_tmp, store) = store();
        let created = store.create(new_list("Doc", "old", None, &[])).expect("create");
        store
            .set_content(created.id, "new\ncontent\n".to_string())
            .expect("set_content");
        assert_eq!(store.get(created.id).expect("get").content, "new\ncontent\n");
    }

    #[test]
    fn test_toggle_item_persists() {
        let (_tmp, store) = store();
        let created = store
            .create(new_list("Chores", "- [ ] Dishes\n- [ ] Laundry\n", None, &[]))
            .expect("create");

        let toggled = store
            .toggle_item(created.id, &LineLocator::Text("Laundry".to_string()), true)
            .expect("toggle");
        assert_eq!(toggled.content, "- [ ] Dishes\n- [x] Laundry\n");
        assert_eq!(
            store.get(created.id).expect("get").content,
            "- [ ] Dishes\n- [x] Laundry\n"
        );

        let key = toggled.checklist()[1].key.clone();
        let back = store
            .toggle_item(created.id, &LineLocator::Key(key), false)
            .expect("toggle by key");
        assert_eq!(back.content, "- [ ] Dishes\n- [ ] Laundry\n");
    }

    #[test]
    fn test_toggle_item_not_found_leaves_file_untouched() {
        let (_tmp, store) = store();
        let created = store
            .create(new_list("Chores", "- [ ] Dishes\n", None, &[]))
            .expect("create");
        let path = store.dir().join("000001-chores.md");
        let before = fs::read_to_string(&path).expect("read");

        let err = store
            .toggle_item(created.id, &LineLocator::Text("Vacuum".to_string()), true)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Checklist(ChecklistError::NotFound { .. })
        ));
        assert!(err.to_string().starts_with("could not update checklist item"));

        let after = fs::read_to_string(&path).expect("read");
        assert_eq!(before, after);
    }

    #[test]
    fn test_list_newest_first() {
        let (_tmp, store) = store();
        for name in ["one", "two", "three"] {
            store.create(new_list(name, "", None, &[])).expect("create");
        }
        let names: Vec<String> = store
            .list()
            .expect("list")
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["three", "two", "one"]);
    }

    #[test]
    fn test_list_with_due_dates_sorted_ascending() {
        let (_tmp, store) = store();
        store.create(new_list("late", "", Some("2026-12-01"), &[])).expect("create");
        store.create(new_list("none", "", None, &[])).expect("create");
        store.create(new_list("early", "", Some("2026-10-01"), &[])).expect("create");
        store.create(new_list("mid", "", Some("2026-11-01"), &[])).expect("create");

        let names: Vec<String> = store
            .list_with_due_dates()
            .expect("list")
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_delete() {
        let (_tmp, store) = store();
        let a = store.create(new_list("a", "", None, &[])).expect("create");
        store.create(new_list("b", "", None, &[])).expect("create");

        store.delete(a.id).expect("delete");
        assert!(matches!(store.get(a.id), Err(StoreError::NotFound(_))));
        assert_eq!(store.list().expect("list").len(), 1);
        assert!(matches!(store.delete(a.id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_all_tags_sorted_unique() {
        let (_tmp, store) = store();
        store.create(new_list("a", "", None, &["work", "home"])).expect("create");
        store.create(new_list("b", "", None, &["errands", "work", "work"])).expect("create");
        store.create(new_list("c", "", None, &[])).expect("create");

        assert_eq!(
            store.all_tags().expect("tags"),
            vec!["errands", "home", "work"]
        );
    }

    #[test]
    fn test_list_skips_unreadable_files() {
        let (_tmp, store) = store();
        store.create(new_list("good", "", None, &[])).expect("create");
        fs::write(store.dir().join("000009-broken.md"), "not a list").expect("write");
        fs::write(store.dir().join("README.txt"), "ignored").expect("write");

        let lists = store.list().expect("list");
        assert_eq!(lists.len(), 1);
        assert!(matches!(store.get(9), Err(StoreError::Document { .. })));
    }

    #[test]
    fn test_find_by_reference() {
        let (_tmp, store) = store();
        store.create(new_list("Groceries", "", None, &[])).expect("create");
        store.create(new_list("Grocery budget", "", None, &[])).expect("create");
        store.create(new_list("Packing", "", None, &[])).expect("create");

        assert_eq!(store.find("3").expect("by id").name, "Packing");
        assert_eq!(store.find("groceries").expect("exact").name, "Groceries");
        assert_eq!(store.find("pack").expect("substring").name, "Packing");
        assert!(matches!(
            store.find("grocer"),
            Err(StoreError::Ambiguous { .. })
        ));
        assert!(matches!(store.find("garden"), Err(StoreError::NoMatch(_))));
    }

    #[test]
    fn test_find_numeric_name_falls_back_to_name() {
        let (_tmp, store) = store();
        store.create(new_list("Errands", "", None, &[])).expect("create");
        store.create(new_list("2026", "", None, &[])).expect("create");

        assert_eq!(store.find("1").expect("by id").name, "Errands");
        assert_eq!(store.find("2026").expect("by name").id, 2);
        assert!(matches!(store.find("99"), Err(StoreError::NoMatch(_))));
    }

    #[test]
    fn test_file_name_wins_over_frontmatter_id() {
        let (_tmp, store) = store();
        let created = store.create(new_list("Moved", "", None, &[])).expect("create");
        let from = store.dir().join("000001-moved.md");
        let to = store.dir().join("000005-moved.md");
        fs::rename(&from, &to).expect("rename");

        let got = store.get(5).expect("get");
        assert_eq!(got.id, 5);
        assert_eq!(got.name, created.name);
    }
}
