//! Configuration introspection command.
//!
//! Provides `lists config` subcommands:
//! - show: Display resolved configuration
//! - env: List environment variables
//! - schema: Output JSON schema
//! - init: Create template manifest

use std::fs;
use std::path::Path;

use clap::{Args, Subcommand};

use crate::config::{
    self, CONFIG_DIR, ConfigSource, ENV_VARS, LoadedConfig, env_is_set, env_string,
    template_manifest, user_config_path,
};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show resolved configuration
    Show(ShowArgs),

    /// List environment variables
    Env,

    /// Output JSON schema for manifest validation
    Schema,

    /// Create template manifest file
    Init(InitArgs),
}

#[derive(Args)]
struct ShowArgs {
    /// Show where values came from, including env overrides
    #[arg(long)]
    effective: bool,
}

#[derive(Args)]
struct InitArgs {
    /// Directory to create the manifest in (default: store root, else current directory)
    path: Option<String>,

    /// Overwrite existing manifest
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, loaded: &LoadedConfig, root: Option<&Path>, cwd: &Path) -> Result<(), String> {
    match args.command {
        ConfigCommand::Show(show_args) => run_show(loaded, show_args.effective),
        ConfigCommand::Env => run_env(),
        ConfigCommand::Schema => run_schema(),
        ConfigCommand::Init(init_args) => run_init(root.unwrap_or(cwd), cwd, init_args),
    }
}

fn run_show(loaded: &LoadedConfig, effective: bool) -> Result<(), String> {
    let yaml = serde_yaml::to_string(&loaded.config)
        .map_err(|e| format!("failed to serialize config: {}", e))?;

    if !effective {
        println!("{}", yaml.trim());
        return Ok(());
    }

    let mut sources = loaded.sources.clone();
    for var in ENV_VARS {
        if env_is_set(var.name) {
            sources.push(ConfigSource::EnvVar(var.name.to_string()));
        }
    }

    println!("# Resolved configuration");
    println!("# Sources (in order of precedence, lowest first):");
    for source in &sources {
        println!("#   - {}", source);
    }
    println!();
    println!("{}", yaml.trim());

    let horizon = config::upcoming_days(&loaded.config);
    if horizon != loaded.config.due.upcoming_days {
        println!();
        println!(
            "# effective due.upcoming_days: {} (from $LISTS_UPCOMING_DAYS)",
            horizon.map(|d| d.to_string()).unwrap_or_else(|| "null".to_string())
        );
    }
    if let Some(root) = env_string("LISTS_ROOT") {
        println!("# store root: {} (from $LISTS_ROOT)", root);
    }

    Ok(())
}

fn run_env() -> Result<(), String> {
    println!("Environment Variables:");
    println!();

    for var in ENV_VARS {
        println!("  {}", var.name);
        println!("    {}", var.description);
        if let Some(values) = var.values {
            println!("    Values: {}", values);
        }
        println!("    Default: {}", var.default);
        println!("    Config path: {}", var.config_path);
        println!();
    }

    Ok(())
}

fn run_schema() -> Result<(), String> {
    println!("{}", config::json_schema());
    Ok(())
}

fn run_init(default_dir: &Path, cwd: &Path, args: InitArgs) -> Result<(), String> {
    let target_dir = match args.path.as_deref() {
        Some(p) => cwd.join(p),
        None => default_dir.to_path_buf(),
    };

    let config_dir = target_dir.join(CONFIG_DIR);
    let manifest_path = config::manifest_path(&target_dir);

    if manifest_path.exists() && !args.force {
        return Err(format!(
            "manifest already exists: {}\nUse --force to overwrite",
            manifest_path.display()
        ));
    }

    fs::create_dir_all(&config_dir)
        .map_err(|e| format!("failed to create {}: {}", config_dir.display(), e))?;

    fs::write(&manifest_path, template_manifest())
        .map_err(|e| format!("failed to write {}: {}", manifest_path.display(), e))?;

    println!("Created: {}", manifest_path.display());

    if let Some(user_path) = user_config_path()
        && !user_path.exists()
    {
        println!(
            "Hint: User global config can be placed at: {}",
            user_path.display()
        );
    }

    Ok(())
}
