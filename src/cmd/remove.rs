use clap::Args;
use clap_complete::engine::ArgValueCompleter;
use serde::Serialize;

use crate::args::FormatArgs;
use crate::output::{self, OutputFormat};
use crate::store::ListStore;

#[derive(Args)]
pub struct RemoveArgs {
    /// List id or name reference
    #[arg(add = ArgValueCompleter::new(crate::store::complete_list_ids))]
    id: String,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Serialize)]
struct RemoveOutput {
    id: u64,
    name: String,
    path: String,
}

pub fn run(args: RemoveArgs, store: &ListStore) -> Result<(), String> {
    let format = args.format.resolve();

    let list = store.find(&args.id).map_err(|e| e.to_string())?;
    let path = store.file_path(&list);
    store.delete(list.id).map_err(|e| e.to_string())?;

    match format {
        OutputFormat::Pretty | OutputFormat::Plain => {
            println!("Removed list {}: {}", list.id, list.name);
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let out = RemoveOutput {
                id: list.id,
                name: list.name,
                path: path.to_string_lossy().to_string(),
            };
            println!("{}", output::to_machine(&out, format)?.trim_end());
        }
    }

    Ok(())
}
