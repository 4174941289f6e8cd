use clap::Args;
use clap_complete::engine::ArgValueCompleter;

use crate::args::FormatArgs;
use crate::due::{self, parse_due_date};
use crate::input;
use crate::list::parse_tags;
use crate::output::{self, OutputFormat};
use crate::store::{ListStore, ListUpdate};

#[derive(Args)]
pub struct EditArgs {
    /// List id or name reference
    #[arg(add = ArgValueCompleter::new(crate::store::complete_list_ids))]
    id: String,

    /// New name
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Replace the whole content ("-" reads stdin)
    #[arg(short = 'c', long)]
    content: Option<String>,

    /// New due date (YYYY-MM-DD)
    #[arg(short = 'd', long, conflicts_with = "clear_due")]
    due: Option<String>,

    /// Remove the due date
    #[arg(long)]
    clear_due: bool,

    /// Replace tags (comma-separated, "" clears)
    #[arg(short = 't', long)]
    tags: Option<String>,

    #[command(flatten)]
    format: FormatArgs,
}

pub fn run(args: EditArgs, store: &ListStore) -> Result<(), String> {
    let format = args.format.resolve();

    let content = match args.content.as_deref() {
        Some("-") => Some(
            input::read_stdin_content()?.ok_or("--content -: stdin is a terminal, pipe the content in")?,
        ),
        Some(c) => Some(c.to_string()),
        None => None,
    };

    let due_date = if args.clear_due {
        Some(None)
    } else {
        match args.due.as_deref() {
            // Blank input also clears
            Some(d) => Some(parse_due_date(d).map_err(|e| e.to_string())?),
            None => None,
        }
    };

    let changes = ListUpdate {
        name: args.name,
        content,
        due_date,
        tags: args.tags.as_deref().map(parse_tags),
    };
    if changes.is_empty() {
        return Err("nothing to change: specify --name, --content, --due, --clear-due or --tags".to_string());
    }

    let list = store.find(&args.id).map_err(|e| e.to_string())?;
    let updated = match changes {
        ListUpdate {
            name: None,
            content: Some(content),
            due_date: None,
            tags: None,
        } => store.set_content(list.id, content),
        changes => store.update(list.id, changes),
    }
    .map_err(|e| e.to_string())?;

    match format {
        OutputFormat::Pretty | OutputFormat::Plain => {
            println!("Updated list {}: {}", updated.id, updated.name);
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let info = crate::cmd::list::ListInfo::new(&updated, due::today());
            println!("{}", output::to_machine(&info, format)?.trim_end());
        }
    }

    Ok(())
}
