use std::io;
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::env::CompleteEnv;
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

mod args;
mod checklist;
mod cmd;
mod config;
mod due;
mod input;
mod list;
mod output;
mod store;

use store::ListStore;

#[derive(Parser)]
#[command(name = "lists")]
#[command(version = env!("LISTS_VERSION"))]
#[command(about = "Personal markdown lists with checklists and due dates")]
#[command(
    long_about = "lists - Personal list manager.\n\nLists are markdown files in a .lists/ directory. Checklist lines\n(`- [ ] item`) can be checked off by key or text, and lists with a due\ndate are grouped into Overdue, Due Today and Upcoming."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a .lists/ store in the current directory
    Init(cmd::init::InitArgs),

    /// Create a new list
    New(cmd::new::NewArgs),

    /// List all lists
    #[command(alias = "ls")]
    List(cmd::list::ListArgs),

    /// Show one list
    #[command(alias = "cat")]
    Show(cmd::show::ShowArgs),

    /// Change name, content, due date or tags
    Edit(cmd::edit::EditArgs),

    /// List, check or uncheck checklist items
    Item(cmd::item::ItemArgs),

    /// Lists grouped by due date
    Due(cmd::due::DueArgs),

    /// All tags in use
    Tags(cmd::tags::TagsArgs),

    /// Delete a list
    #[command(alias = "rm")]
    Remove(cmd::remove::RemoveArgs),

    /// Configuration introspection
    Config(cmd::config_cmd::ConfigArgs),

    /// Generate shell completion script
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
struct CompletionArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Clone, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

fn main() {
    // Handle dynamic shell completions
    CompleteEnv::with_factory(Cli::command).complete();

    install_tracing();

    // Use try_parse to catch errors and normalize exit code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Exit with 0 for help/version, 1 for actual errors
            let exit_code = if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                0
            } else {
                1
            };
            process::exit(exit_code);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let cwd = std::env::current_dir().map_err(|e| format!("cannot get cwd: {}", e))?;
    let root_override = config::env_string("LISTS_ROOT").map(PathBuf::from);

    // Commands that work without a store
    match cli.command {
        Commands::Completion(args) => {
            let shell = match args.shell {
                CompletionShell::Bash => Shell::Bash,
                CompletionShell::Zsh => Shell::Zsh,
                CompletionShell::Fish => Shell::Fish,
                CompletionShell::Powershell => Shell::PowerShell,
            };
            generate(shell, &mut Cli::command(), "lists", &mut io::stdout());
            return Ok(());
        }
        Commands::Init(args) => {
            let loaded = config::load_config(None);
            let base = root_override.unwrap_or(cwd);
            return cmd::init::run(args, &base, &loaded.config);
        }
        Commands::Config(args) => {
            let store = ListStore::discover(&cwd, root_override.as_deref()).ok();
            let root = store.as_ref().map(|s| s.root());
            let loaded = config::load_config(root);
            return cmd::config_cmd::run(args, &loaded, root, &cwd);
        }
        command => {
            let store = ListStore::discover(&cwd, root_override.as_deref()).map_err(|e| e.to_string())?;
            let loaded = config::load_config(Some(store.root()));
            let config = &loaded.config;

            match command {
                Commands::New(args) => cmd::new::run(args, &store, config),
                Commands::List(args) => cmd::list::run(args, &store, config),
                Commands::Show(args) => cmd::show::run(args, &store, config),
                Commands::Edit(args) => cmd::edit::run(args, &store),
                Commands::Item(args) => cmd::item::run(args, &store, config),
                Commands::Due(args) => cmd::due::run(args, &store, config),
                Commands::Tags(args) => cmd::tags::run(args, &store),
                Commands::Remove(args) => cmd::remove::run(args, &store),
                Commands::Completion(_) | Commands::Init(_) | Commands::Config(_) => {
                    unreachable!() // Handled above
                }
            }
        }
    }
}

/// Diagnostics go to stderr, filtered by RUST_LOG (default: warn).
fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
