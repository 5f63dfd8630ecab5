use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::str::FromStr;
use upkeep_core::model::TaskStatus;

#[derive(Parser, Debug)]
#[command(name = "upkeep", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct When {
    /// Calendar month 1-12 (defaults to the current month)
    #[arg(long)]
    pub month: Option<u8>,
    /// Year (defaults to the selected year)
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks due in a month
    ///
    /// Example: upkeep tasks --month 4
    Tasks {
        /// Calendar month 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u8>,
    },
    /// List the built-in checklist grouped by cadence
    ///
    /// Example: upkeep catalog
    Catalog,
    /// Show a task and its progress for one month
    ///
    /// Example: upkeep show hvac-filter --month 3
    Show {
        id: String,
        #[command(flatten)]
        when: When,
    },
    /// Set the status of a task occurrence
    ///
    /// Example: upkeep status hvac-filter complete --month 3 --year 2024
    Status {
        id: String,
        status: StatusArg,
        #[command(flatten)]
        when: When,
    },
    /// Record what a task occurrence cost ("none" clears it)
    ///
    /// Example: upkeep cost hvac-filter 42.50 --month 3
    Cost {
        id: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
        #[command(flatten)]
        when: When,
    },
    /// Attach a note to a task occurrence
    ///
    /// Example: upkeep note hvac-filter "MERV 11, 20x25x1"
    Note {
        id: String,
        note: String,
        #[command(flatten)]
        when: When,
    },
    /// Add a one-off task to a calendar month
    ///
    /// Example: upkeep add-custom 5 "Reseal deck" --detail "Two coats"
    AddCustom {
        month: u8,
        title: String,
        #[arg(long, default_value = "")]
        detail: String,
    },
    /// Summarize one month: due tasks, completion and spend
    ///
    /// Example: upkeep month --month 3 --year 2024
    Month {
        #[command(flatten)]
        when: When,
    },
    /// Summarize a year (defaults to the selected year)
    ///
    /// Example: upkeep year --year 2024
    Year {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Change the selected year, or list the selectable years
    ///
    /// Example: upkeep year-select 2025
    YearSelect { year: Option<i32> },
    /// Pull changes written by other processes or devices
    ///
    /// Example: upkeep sync
    Sync,
    /// Manage calendar reminders
    Reminders {
        #[command(subcommand)]
        action: RemindersCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum RemindersCommand {
    /// Replace installed reminders with the current checklist
    ///
    /// Example: upkeep reminders sync
    Sync,
    /// List installed reminders
    ///
    /// Example: upkeep reminders list
    List,
    /// Show reminders due at a wall-clock time (defaults to now)
    ///
    /// Example: upkeep reminders fire --at "2024-04-01 09:00"
    Fire {
        #[arg(long, value_name = "YYYY-MM-DD HH:MM")]
        at: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    NotStarted,
    InProgress,
    Complete,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::NotStarted => TaskStatus::NotStarted,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Complete => TaskStatus::Complete,
        }
    }
}

/// Parses a cost argument; `none` (or an empty string) clears the cost.
pub fn parse_cost(raw: &str) -> Result<Option<Decimal>, String> {
    let trimmed = raw.trim().trim_start_matches('$');
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Decimal::from_str(trimmed)
        .map(Some)
        .map_err(|_| format!("invalid cost '{}'", raw.trim()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    MonthlyBudget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "monthly_budget" | "budget" => {
            match parse_cost(&value)? {
                Some(amount) if !amount.is_sign_negative() => {}
                _ => return Err("monthly_budget must be a non-negative amount".to_string()),
            }
            ConfigOverrideTarget::MonthlyBudget
        }
        other => return Err(format!("unknown config field '{other}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
