use chrono::NaiveDate;
use clap::Args;
use colored::Colorize;

use crate::args::{FormatArgs, TagFilterArgs};
use crate::cmd::list::ListInfo;
use crate::config::{self, Config, is_quiet};
use crate::due::{self, DATE_FORMAT, DueGroups};
use crate::list::List;
use crate::output::{self, OutputFormat};
use crate::store::ListStore;

#[derive(Args)]
pub struct DueArgs {
    #[command(flatten)]
    filter: TagFilterArgs,

    /// Only show upcoming lists due within N days (default: $LISTS_UPCOMING_DAYS, then config)
    #[arg(long, value_name = "N")]
    days: Option<u32>,

    #[command(flatten)]
    format: FormatArgs,
}

pub fn run(args: DueArgs, store: &ListStore, config: &Config) -> Result<(), String> {
    let format = args.format.resolve();
    let today = due::today();
    let horizon = args.days.or_else(|| config::upcoming_days(config));

    let lists: Vec<List> = store
        .list_with_due_dates()
        .map_err(|e| e.to_string())?
        .into_iter()
        .filter(|l| args.filter.matches(l))
        .collect();

    let mut groups = due::group(lists, |l| l.due_date, today);
    groups
        .upcoming
        .retain(|l| l.due_date.is_some_and(|d| due::within_horizon(d, today, horizon)));

    match format {
        OutputFormat::Pretty => output_pretty(&groups, &args, today, config),
        OutputFormat::Plain => {
            output_plain(&groups, today);
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let infos = DueGroups {
                overdue: groups.overdue.iter().map(|l| ListInfo::new(l, today)).collect(),
                today: groups.today.iter().map(|l| ListInfo::new(l, today)).collect(),
                upcoming: groups.upcoming.iter().map(|l| ListInfo::new(l, today)).collect(),
            };
            println!("{}", output::to_machine(&infos, format)?.trim_end());
            Ok(())
        }
    }
}

fn output_pretty(groups: &DueGroups<List>, args: &DueArgs, today: NaiveDate, config: &Config) -> Result<(), String> {
    let filter_desc = args.filter.description(groups.len());
    if !filter_desc.is_empty() {
        println!("{}", filter_desc.dimmed());
        println!();
    }

    if groups.is_empty() {
        println!("Nothing due.");
        if !args.filter.is_active() && !is_quiet(config) {
            println!("{}", "Hint: set a due date with: lists edit <id> --due YYYY-MM-DD".dimmed());
        }
        return Ok(());
    }

    let name_max = output::terminal_width().saturating_sub(40).max(20);

    for (i, (bucket, lists)) in groups.sections().into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{} {}", output::style_heading(bucket), format!("({})", lists.len()).dimmed());
        for l in lists {
            let classification = l.classify(today);
            let progress = l.progress();
            let progress = if progress.total > 0 {
                format!("  {}", output::style_progress(progress))
            } else {
                String::new()
            };
            println!(
                "  {:<18} {} {}{}",
                output::style_due(&classification),
                output::truncate_back(&l.name, name_max),
                output::style_id(&format!("#{}", l.id)),
                progress
            );
        }
    }

    Ok(())
}

fn output_plain(groups: &DueGroups<List>, today: NaiveDate) {
    println!("BUCKET | DUE | LABEL | ID | DONE | NAME");
    for (bucket, lists) in groups.sections() {
        for l in lists {
            let classification = l.classify(today);
            println!(
                "{} | {} | {} | {} | {} | {}",
                bucket,
                l.due_date
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
                classification.label.unwrap_or_default(),
                l.id,
                l.progress(),
                l.name
            );
        }
    }
}
