//! Due-date classification.
//!
//! Due dates are `NaiveDate`s: no time of day, no zone. "Today" is a
//! `NaiveDate` as well, so the day difference is plain calendar arithmetic
//! and a DST switch between the two dates cannot move a list into another
//! bucket.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// On-disk and CLI format of a due date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DueDateError {
    #[error("invalid due date '{0}': expected YYYY-MM-DD")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Overdue,
    DueToday,
    Upcoming,
    /// No due date
    None,
}

impl Bucket {
    /// Section heading used by grouped views.
    pub fn heading(self) -> &'static str {
        match self {
            Bucket::Overdue => "Overdue",
            Bucket::DueToday => "Due Today",
            Bucket::Upcoming => "Upcoming",
            Bucket::None => "No Due Date",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Bucket::Overdue => "overdue",
            Bucket::DueToday => "due_today",
            Bucket::Upcoming => "upcoming",
            Bucket::None => "none",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub bucket: Bucket,
    /// "Overdue by 2 days", "Due today", ...; absent without a due date
    pub label: Option<String>,
    /// Due date minus today in days; absent without a due date
    pub days_delta: Option<i64>,
}

impl Classification {
    fn none() -> Self {
        Classification {
            bucket: Bucket::None,
            label: None,
            days_delta: None,
        }
    }
}

/// Current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse user or file input. Blank input means "no due date".
pub fn parse_due_date(input: &str) -> Result<Option<NaiveDate>, DueDateError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| DueDateError::Invalid(trimmed.to_string()))
}

/// Signed day difference between `due` and `today`.
pub fn days_until(due: NaiveDate, today: NaiveDate) -> i64 {
    due.signed_duration_since(today).num_days()
}

/// Human label for a day difference.
pub fn label_for(days_delta: i64) -> String {
    match days_delta.cmp(&0) {
        Ordering::Less => {
            let n = days_delta.unsigned_abs();
            format!("Overdue by {} day{}", n, if n == 1 { "" } else { "s" })
        }
        Ordering::Equal => "Due today".to_string(),
        Ordering::Greater if days_delta == 1 => "Due tomorrow".to_string(),
        Ordering::Greater => format!("Due in {} days", days_delta),
    }
}

pub fn classify(due: Option<NaiveDate>, today: NaiveDate) -> Classification {
    let Some(due) = due else {
        return Classification::none();
    };

    let days_delta = days_until(due, today);
    let bucket = match days_delta.cmp(&0) {
        Ordering::Less => Bucket::Overdue,
        Ordering::Equal => Bucket::DueToday,
        Ordering::Greater => Bucket::Upcoming,
    };

    Classification {
        bucket,
        label: Some(label_for(days_delta)),
        days_delta: Some(days_delta),
    }
}

/// Items split by bucket, each keeping the order it was supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueGroups<T> {
    pub overdue: Vec<T>,
    pub today: Vec<T>,
    pub upcoming: Vec<T>,
}

impl<T> Default for DueGroups<T> {
    fn default() -> Self {
        DueGroups {
            overdue: Vec::new(),
            today: Vec::new(),
            upcoming: Vec::new(),
        }
    }
}

impl<T> DueGroups<T> {
    pub fn len(&self) -> usize {
        self.overdue.len() + self.today.len() + self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-empty buckets in display order.
    pub fn sections(&self) -> Vec<(Bucket, &[T])> {
        [
            (Bucket::Overdue, self.overdue.as_slice()),
            (Bucket::DueToday, self.today.as_slice()),
            (Bucket::Upcoming, self.upcoming.as_slice()),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .collect()
    }
}

/// Stable partition of `items` by the bucket of their due date.
///
/// Items without a due date are dropped. No re-sorting happens inside a
/// bucket.
pub fn group<T, F>(items: impl IntoIterator<Item = T>, due_of: F, today: NaiveDate) -> DueGroups<T>
where
    F: Fn(&T) -> Option<NaiveDate>,
{
    let mut groups = DueGroups::default();
    for item in items {
        match classify(due_of(&item), today).bucket {
            Bucket::Overdue => groups.overdue.push(item),
            Bucket::DueToday => groups.today.push(item),
            Bucket::Upcoming => groups.upcoming.push(item),
            Bucket::None => {}
        }
    }
    groups
}

/// Whether an upcoming date falls within `horizon` days (no horizon = always).
pub fn within_horizon(due: NaiveDate, today: NaiveDate, horizon: Option<u32>) -> bool {
    match horizon {
        Some(days) => days_until(due, today) <= i64::from(days),
        None => true,
    }
}
