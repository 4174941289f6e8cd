use std::path::Path;

use clap::Args;

use crate::config::{Config, is_quiet};
use crate::store::{LISTS_DIR, ListStore};

#[derive(Args)]
pub struct InitArgs {
    /// Directory to create the store in (default: current directory)
    #[arg(default_value = ".")]
    path: String,
}

pub fn run(args: InitArgs, cwd: &Path, config: &Config) -> Result<(), String> {
    let root = if args.path == "." {
        cwd.to_path_buf()
    } else {
        cwd.join(&args.path)
    };

    let existed = root.join(LISTS_DIR).is_dir();
    let store = ListStore::init(&root).map_err(|e| e.to_string())?;

    if existed {
        println!("Already initialized: {}", store.dir().display());
    } else {
        println!("Initialized: {}", store.dir().display());
        if !is_quiet(config) {
            println!("Hint: create a list with: lists new \"Groceries\" --tags home");
        }
    }

    Ok(())
}
