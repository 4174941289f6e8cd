use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::args::FormatArgs;
use crate::config::{Config, is_quiet};
use crate::due::parse_due_date;
use crate::input;
use crate::list::parse_tags;
use crate::output::{self, OutputFormat};
use crate::store::{ListStore, NewList};

#[derive(Args)]
pub struct NewArgs {
    /// List name
    name: String,

    /// Markdown content (default: stdin when piped)
    #[arg(short = 'c', long)]
    content: Option<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(short = 'd', long)]
    due: Option<String>,

    /// Comma-separated tags
    #[arg(short = 't', long)]
    tags: Option<String>,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Serialize)]
struct NewOutput {
    id: u64,
    name: String,
    path: String,
}

pub fn run(args: NewArgs, store: &ListStore, config: &Config) -> Result<(), String> {
    let format = args.format.resolve();

    let due_date = match args.due.as_deref() {
        Some(d) => parse_due_date(d).map_err(|e| e.to_string())?,
        None => None,
    };

    let content = match args.content {
        Some(c) => c,
        None => input::read_stdin_content()?.unwrap_or_default(),
    };

    let list = store
        .create(NewList {
            name: args.name,
            content,
            due_date,
            tags: args.tags.as_deref().map(parse_tags).unwrap_or_default(),
        })
        .map_err(|e| e.to_string())?;

    let path = store.file_path(&list);

    match format {
        OutputFormat::Pretty => {
            println!(
                "Created list {} {}",
                output::style_id(&list.id.to_string()),
                list.name.bold()
            );
            if list.content.is_empty() && !is_quiet(config) {
                println!(
                    "{}",
                    format!("Hint: add items with: lists edit {} --content \"- [ ] ...\"", list.id)
                        .dimmed()
                );
            }
        }
        OutputFormat::Plain => {
            println!("Created: {} | {}", list.id, list.name);
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let out = NewOutput {
                id: list.id,
                name: list.name,
                path: path.to_string_lossy().to_string(),
            };
            println!("{}", output::to_machine(&out, format)?.trim_end());
        }
    }

    Ok(())
}
