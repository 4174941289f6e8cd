use chrono::{NaiveDate, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::args::{FormatArgs, TagFilterArgs};
use crate::checklist::Progress;
use crate::config::{Config, is_quiet};
use crate::due::{self, Bucket, DATE_FORMAT};
use crate::list::List;
use crate::output::{self, OutputFormat};
use crate::store::ListStore;

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    filter: TagFilterArgs,

    /// Search name, content and tags (substring, case-insensitive)
    #[arg(short = 's', long)]
    search: Option<String>,

    #[command(flatten)]
    format: FormatArgs,
}

/// Serializable list summary with ISO 8601 dates for JSON/YAML
#[derive(Serialize)]
pub(super) struct ListInfo {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub due_bucket: Bucket,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_delta: Option<i64>,
    pub tags: Vec<String>,
    pub progress: Progress,
    pub created: String,
    pub updated: String,
}

impl ListInfo {
    pub(super) fn new(list: &List, today: NaiveDate) -> Self {
        let classification = list.classify(today);
        Self {
            id: list.id,
            name: list.name.clone(),
            due_date: list.due_date.map(|d| d.format(DATE_FORMAT).to_string()),
            due_bucket: classification.bucket,
            due_label: classification.label,
            days_delta: classification.days_delta,
            tags: list.tags.clone(),
            progress: list.progress(),
            created: list.created_at.with_timezone(&Utc).to_rfc3339(),
            updated: list.updated_at.with_timezone(&Utc).to_rfc3339(),
        }
    }
}

/// Row data for tabled output
#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DONE")]
    progress: String,
    #[tabled(rename = "DUE")]
    due: String,
    #[tabled(rename = "MOD")]
    modified: String,
    #[tabled(rename = "TAGS")]
    tags: String,
    #[tabled(rename = "NAME")]
    name: String,
}

pub fn run(args: ListArgs, store: &ListStore, config: &Config) -> Result<(), String> {
    let format = args.format.resolve();

    let lists: Vec<List> = store
        .list()
        .map_err(|e| e.to_string())?
        .into_iter()
        .filter(|l| args.filter.matches(l))
        .filter(|l| args.search.as_deref().is_none_or(|q| l.matches_search(q)))
        .collect();

    let today = due::today();

    match format {
        OutputFormat::Pretty => output_pretty(&lists, &args, today, config),
        OutputFormat::Plain => output_plain(&lists, &args, today),
        OutputFormat::Json | OutputFormat::Yaml => {
            let infos: Vec<ListInfo> = lists.iter().map(|l| ListInfo::new(l, today)).collect();
            println!("{}", output::to_machine(&infos, format)?.trim_end());
            Ok(())
        }
    }
}

/// Build filter description for summary line
fn build_filter_desc(args: &ListArgs, shown: usize) -> String {
    let mut parts = Vec::new();
    let tag_desc = args.filter.description(shown);
    if !tag_desc.is_empty() {
        parts.push(tag_desc);
    }
    if let Some(ref s) = args.search {
        parts.push(format!("search=\"{}\"", s));
    }
    parts.join(", ")
}

fn output_pretty(lists: &[List], args: &ListArgs, today: NaiveDate, config: &Config) -> Result<(), String> {
    let filter_desc = build_filter_desc(args, lists.len());
    if filter_desc.is_empty() {
        println!("{} lists", lists.len().to_string().bold());
    } else {
        println!("{} lists ({})", lists.len().to_string().bold(), filter_desc.dimmed());
    }
    println!();

    if lists.is_empty() {
        if !is_quiet(config) {
            println!("{}", "Hint: create one with: lists new \"name\"".dimmed());
        }
        return Ok(());
    }

    let name_max = output::terminal_width().saturating_sub(50).max(20);

    let rows: Vec<TableRow> = lists
        .iter()
        .map(|l| {
            let classification = l.classify(today);
            TableRow {
                id: output::style_id(&l.id.to_string()).to_string(),
                progress: output::style_progress(l.progress()).to_string(),
                due: output::style_due(&classification).to_string(),
                modified: output::format_relative_short(l.updated_at),
                tags: l
                    .tags
                    .iter()
                    .map(|t| output::style_tag(t).to_string())
                    .collect::<Vec<_>>()
                    .join(" "),
                name: output::truncate_back(&l.name, name_max),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());

    println!("{}", table);

    Ok(())
}

fn output_plain(lists: &[List], args: &ListArgs, today: NaiveDate) -> Result<(), String> {
    let filter_desc = build_filter_desc(args, lists.len());
    if filter_desc.is_empty() {
        println!("Showing {} lists", lists.len());
    } else {
        println!("Showing {} lists ({})", lists.len(), filter_desc);
    }
    println!();

    if lists.is_empty() {
        return Ok(());
    }

    // Pipe-delimited format, no truncation
    println!("ID | DONE | DUE | DUE_LABEL | TAGS | UPDATED | NAME");
    for l in lists {
        let classification = l.classify(today);
        println!(
            "{} | {} | {} | {} | {} | {} | {}",
            l.id,
            l.progress(),
            l.due_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            classification.label.unwrap_or_default(),
            l.tags.join(","),
            l.updated_at.format("%Y-%m-%d"),
            l.name
        );
    }

    Ok(())
}
