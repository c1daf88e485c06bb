/// CLI argument parsing and the offline / scripted commands.
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::api::TimeClockApi;
use crate::config::{self, Config};
use crate::editor::projection::{DailyRow, project_rows};
use crate::editor::time_format::{clock_text, validate_and_format_time};
use crate::types::{DateRange, UserId};

#[derive(Parser, Debug)]
#[command(
    name = "timeclock",
    version,
    about = "Timeclock - review and edit Belcka timesheets from the terminal"
)]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Open this user's timesheet directly
    #[arg(long)]
    pub user: Option<UserId>,

    /// First day of the range (dd/mm/yyyy or yyyy-mm-dd)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day of the range (dd/mm/yyyy or yyyy-mm-dd)
    #[arg(long)]
    pub to: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the HH:MM rendition of each input, e.g. 900 -> 09:00
    FormatTime {
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Print a user's timesheet as text
    Show {
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Write a default config file if none exists
    Init,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::default_path)
    }

    /// Loads the config file, then applies environment and flag overrides.
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path();
        let mut config = Config::load(&path)?.with_env();
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn range(&self) -> Result<DateRange> {
        resolve_range(self.from.as_deref(), self.to.as_deref(), today())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Accepts `dd/mm/yyyy` or `yyyy-mm-dd`.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    DateRange::parse_wire(value)
        .or_else(|| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .with_context(|| format!("Invalid date '{value}', expected dd/mm/yyyy or yyyy-mm-dd"))
}

/// Missing bounds fall back to the week containing the other bound, or today.
pub fn resolve_range(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Result<DateRange> {
    let from = from.map(parse_date).transpose()?;
    let to = to.map(parse_date).transpose()?;
    let range = match (from, to) {
        (Some(start), Some(end)) => {
            if end < start {
                bail!("--to must not be before --from");
            }
            DateRange::new(start, end)
        }
        (Some(start), None) => DateRange::week_of(start),
        (None, Some(end)) => DateRange::week_of(end),
        (None, None) => DateRange::week_of(today),
    };
    Ok(range)
}

/// Commands that never touch the network.
pub fn run_offline(cli: &Cli, command: &Command) -> Result<bool> {
    match command {
        Command::FormatTime { inputs } => {
            for input in inputs {
                println!("{}", validate_and_format_time(input));
            }
        }
        Command::Config {
            command: ConfigCommand::Path,
        } => println!("{}", cli.config_path().display()),
        Command::Config {
            command: ConfigCommand::Init,
        } => {
            let path = cli.config_path();
            if Config::init(&path)? {
                println!("Wrote default config to {}", path.display());
            } else {
                println!("Config already exists at {}", path.display());
            }
        }
        Command::Show { .. } => return Ok(false),
    }
    Ok(true)
}

pub fn run_show(
    api: &dyn TimeClockApi,
    user_id: UserId,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let range = resolve_range(from, to, today())?;
    let details = api
        .details(user_id, &range)
        .with_context(|| format!("Failed to load timesheet for user {user_id}"))?;
    for line in render_rows(&project_rows(&details.info)) {
        println!("{line}");
    }
    println!();
    println!(
        "Total {}h  Payable {}h  Amount {}  Requests {}  Conflicts {}",
        dash(&details.total_hours),
        dash(&details.payable_total_hours),
        dash(&details.total_payable_amount),
        details.pending_request_count,
        details.total_conflicts,
    );
    Ok(())
}

fn dash(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

fn render_rows(rows: &[DailyRow]) -> Vec<String> {
    let mut out = Vec::new();
    for row in rows {
        match row {
            DailyRow::Week(week) => out.push(format!(
                "== {}  {}h  {} ==",
                week.week_range,
                dash(&week.weekly_total_hours),
                dash(&week.weekly_payable_amount)
            )),
            DailyRow::Day(day) => {
                let worklogs = day.worklogs();
                if worklogs.is_empty() {
                    out.push(format!("{:<12}{:>6}  -", day.date, dash(&day.daily_total)));
                    continue;
                }
                for (index, log) in worklogs.iter().enumerate() {
                    let (date, total) = if index == 0 {
                        (day.date.as_str(), dash(&day.daily_total))
                    } else {
                        ("", "")
                    };
                    out.push(format!(
                        "{:<12}{:>6}  {:<14}{:<16}{}-{}  {}h{}",
                        date,
                        total,
                        log.shift_name.as_deref().unwrap_or("-"),
                        log.project_name.as_deref().unwrap_or("-"),
                        clock_text(log.start.as_deref()),
                        clock_text(log.end.as_deref()),
                        dash(&log.total_hours),
                        if log.is_locked() { "  locked" } else { "" },
                    ));
                }
            }
        }
    }
    out
}
