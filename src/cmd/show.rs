use chrono::NaiveDate;
use clap::Args;
use clap_complete::engine::ArgValueCompleter;
use colored::Colorize;
use serde::Serialize;
use termimad::MadSkin;

use crate::args::FormatArgs;
use crate::checklist::ChecklistLine;
use crate::cmd::list::ListInfo;
use crate::config::Config;
use crate::due;
use crate::list::List;
use crate::output::{self, OutputFormat};
use crate::store::ListStore;

#[derive(Args)]
pub struct ShowArgs {
    /// List id or name reference
    #[arg(add = ArgValueCompleter::new(crate::store::complete_list_ids))]
    id: String,

    /// Hide checklist item keys
    #[arg(long)]
    no_keys: bool,

    #[command(flatten)]
    format: FormatArgs,

    /// Override terminal width (for testing)
    #[arg(long, hide = true)]
    width: Option<usize>,
}

/// Structured output data for JSON/YAML
#[derive(Serialize)]
struct ShowOutput {
    #[serde(flatten)]
    info: ListInfo,
    path: String,
    items: Vec<ChecklistLine>,
    content: String,
}

pub fn run(args: ShowArgs, store: &ListStore, config: &Config) -> Result<(), String> {
    let format = args.format.resolve();
    let list = store.find(&args.id).map_err(|e| e.to_string())?;
    let today = due::today();

    match format {
        OutputFormat::Pretty => {
            let show_keys = config.display.show_keys && !args.no_keys;
            let width = args.width.unwrap_or_else(output::terminal_width);
            output_pretty(&list, today, config, show_keys, width)
        }
        OutputFormat::Plain => {
            output_plain(&list, today);
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let out = ShowOutput {
                info: ListInfo::new(&list, today),
                path: store.file_path(&list).to_string_lossy().to_string(),
                items: list.checklist(),
                content: list.content.clone(),
            };
            println!("{}", output::to_machine(&out, format)?.trim_end());
            Ok(())
        }
    }
}

fn output_pretty(
    list: &List,
    today: NaiveDate,
    config: &Config,
    show_keys: bool,
    width: usize,
) -> Result<(), String> {
    let classification = list.classify(today);

    println!(
        "{} {}",
        list.name.bold(),
        output::style_id(&format!("#{}", list.id))
    );

    let mut meta = Vec::new();
    let progress = list.progress();
    if progress.total > 0 {
        meta.push(format!("{} done", output::style_progress(progress)));
    }
    if let Some(d) = list.due_date {
        meta.push(format!(
            "{} ({})",
            output::style_due(&classification),
            d.format(due::DATE_FORMAT)
        ));
    }
    if !list.tags.is_empty() {
        meta.push(
            list.tags
                .iter()
                .map(|t| output::style_tag(t).to_string())
                .collect::<Vec<_>>()
                .join(" "),
        );
    }
    if !meta.is_empty() {
        println!("{}", meta.join("  "));
    }
    let date_format = config.display.date_format.as_str();
    println!(
        "{}",
        format!(
            "created {}  updated {}",
            list.created_at.format(date_format),
            list.updated_at.format(date_format)
        )
        .dimmed()
    );
    println!();

    print!("{}", render_content(list, show_keys, width)?);
    Ok(())
}

/// Render markdown with termimad, drawing checklist lines as checkboxes.
fn render_content(list: &List, show_keys: bool, width: usize) -> Result<String, String> {
    let skin = MadSkin::default();
    let items = list.checklist();
    let mut items = items.iter().peekable();

    let mut out = String::new();
    let mut pending = String::new();

    for (line_no, line) in list.content.lines().enumerate() {
        let Some(item) = items.next_if(|i| i.line == line_no) else {
            pending.push_str(line);
            pending.push('\n');
            continue;
        };

        flush_markdown(&skin, &mut pending, &mut out)?;

        let indent = " ".repeat(item.indent);
        let prefix = format!("{}{} ", indent, output::checkbox(item));
        let text = skin.inline(&item.text).to_string();
        let text = if item.checked {
            text.dimmed().to_string()
        } else {
            text
        };
        let text = if show_keys {
            format!("{} {}", text, output::style_id(&item.key))
        } else {
            text
        };
        for wrapped in output::wrap_with_prefix(&prefix, &text, width) {
            out.push_str(&wrapped);
            out.push('\n');
        }
    }
    flush_markdown(&skin, &mut pending, &mut out)?;

    Ok(out)
}

fn flush_markdown(skin: &MadSkin, pending: &mut String, out: &mut String) -> Result<(), String> {
    if pending.trim().is_empty() {
        if !pending.is_empty() {
            out.push('\n');
        }
        pending.clear();
        return Ok(());
    }
    let mut buf = Vec::new();
    skin.write_text_on(&mut buf, pending)
        .map_err(|e| format!("rendering markdown: {}", e))?;
    out.push_str(&String::from_utf8_lossy(&buf));
    pending.clear();
    Ok(())
}

fn output_plain(list: &List, today: NaiveDate) {
    let classification = list.classify(today);
    println!("ID: {}", list.id);
    println!("Name: {}", list.name);
    if let Some(d) = list.due_date {
        println!(
            "Due: {} ({})",
            d.format(due::DATE_FORMAT),
            classification.label.unwrap_or_default()
        );
    }
    if !list.tags.is_empty() {
        println!("Tags: {}", list.tags.join(", "));
    }
    println!("Progress: {}", list.progress());
    println!("Created: {}", list.created_at.to_rfc3339());
    println!("Updated: {}", list.updated_at.to_rfc3339());
    println!();
    print!("{}", list.content);
    if !list.content.is_empty() && !list.content.ends_with('\n') {
        println!();
    }
}
