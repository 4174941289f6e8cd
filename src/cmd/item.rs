use clap::Args;
use clap_complete::engine::ArgValueCompleter;
use colored::Colorize;
use serde::Serialize;

use crate::args::FormatArgs;
use crate::checklist::{self, ChecklistLine, LineLocator};
use crate::config::Config;
use crate::list::List;
use crate::output::{self, OutputFormat};
use crate::store::ListStore;

#[derive(Args)]
pub struct ItemArgs {
    /// List id or name reference
    #[arg(add = ArgValueCompleter::new(crate::store::complete_list_ids))]
    id: String,

    /// Action: list, check, uncheck (default: list)
    #[arg(default_value = "list")]
    action: String,

    /// Item key (or key prefix); with --text, the item text
    #[arg(num_args = 0..)]
    item: Vec<String>,

    /// Locate the item by its text instead of its key
    #[arg(long)]
    text: bool,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Serialize)]
struct ToggleOutput<'a> {
    list_id: u64,
    item: &'a ChecklistLine,
    progress: checklist::Progress,
}

pub fn run(args: ItemArgs, store: &ListStore, config: &Config) -> Result<(), String> {
    let format = args.format.resolve();
    let list = store.find(&args.id).map_err(|e| e.to_string())?;

    let checked = match args.action.as_str() {
        "list" | "ls" => return list_items(&list, format, config),
        "check" | "done" => true,
        "uncheck" | "undo" => false,
        _ => {
            return Err(format!(
                "unknown action '{}'. Use: list, check, uncheck",
                args.action
            ));
        }
    };

    let target = args.item.join(" ");
    if target.trim().is_empty() {
        return Err(format!(
            "usage: lists item <id> {} <key>  (or --text \"item text\")",
            args.action
        ));
    }
    let locator = if args.text {
        LineLocator::Text(target)
    } else {
        LineLocator::Key(target)
    };

    let updated = store
        .toggle_item(list.id, &locator, checked)
        .map_err(|e| e.to_string())?;

    let items = updated.checklist();
    let item = checklist::resolve(&items, &locator).map_err(|e| e.to_string())?;

    match format {
        OutputFormat::Pretty => {
            let verb = if checked { "Checked" } else { "Unchecked" };
            println!(
                "{} {} {}  {}",
                verb,
                output::checkbox(item),
                item.text,
                output::style_progress(updated.progress())
            );
        }
        OutputFormat::Plain => {
            let verb = if checked { "checked" } else { "unchecked" };
            println!("{} | {} | {}", verb, item.key, item.text);
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let out = ToggleOutput {
                list_id: updated.id,
                item,
                progress: updated.progress(),
            };
            println!("{}", output::to_machine(&out, format)?.trim_end());
        }
    }

    Ok(())
}

fn list_items(list: &List, format: OutputFormat, config: &Config) -> Result<(), String> {
    let items = list.checklist();

    match format {
        OutputFormat::Pretty => {
            if items.is_empty() {
                println!("No checklist items.");
                return Ok(());
            }
            let width = output::terminal_width();
            for item in &items {
                let key = if config.display.show_keys {
                    format!("{} ", output::style_id(&item.key))
                } else {
                    String::new()
                };
                let prefix = format!(
                    "{}{}{} ",
                    " ".repeat(item.indent),
                    key,
                    output::checkbox(item)
                );
                let text = if item.checked {
                    item.text.dimmed().to_string()
                } else {
                    item.text.clone()
                };
                for line in output::wrap_with_prefix(&prefix, &text, width) {
                    println!("{}", line);
                }
            }
            println!();
            println!("{} done", output::style_progress(list.progress()));
        }
        OutputFormat::Plain => {
            println!("KEY | DONE | TEXT");
            for item in &items {
                println!(
                    "{} | {} | {}",
                    item.key,
                    if item.checked { "x" } else { " " },
                    item.text
                );
            }
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            println!("{}", output::to_machine(&items, format)?.trim_end());
        }
    }

    Ok(())
}
