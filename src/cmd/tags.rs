use clap::Args;

use crate::args::FormatArgs;
use crate::output::{self, OutputFormat};
use crate::store::ListStore;

#[derive(Args)]
pub struct TagsArgs {
    #[command(flatten)]
    format: FormatArgs,
}

pub fn run(args: TagsArgs, store: &ListStore) -> Result<(), String> {
    let format = args.format.resolve();
    let tags = store.all_tags().map_err(|e| e.to_string())?;

    match format {
        OutputFormat::Pretty => {
            if tags.is_empty() {
                println!("No tags.");
            }
            for tag in &tags {
                println!("{}", output::style_tag(tag));
            }
        }
        OutputFormat::Plain => {
            for tag in &tags {
                println!("{}", tag);
            }
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            println!("{}", output::to_machine(&tags, format)?.trim_end());
        }
    }

    Ok(())
}
