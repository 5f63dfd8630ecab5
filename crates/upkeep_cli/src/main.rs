mod cli;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use cli::{Cli, Command, ConfigOverrideTarget, RemindersCommand, When};
use rust_decimal::Decimal;
use std::ffi::OsString;
use std::io::{self, BufRead};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::macros::format_description;
use time::{Month, PrimitiveDateTime};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use upkeep_core::clock;
use upkeep_core::config::{
    Config, ConfigOverrides, Palette, load_config_with_fallback, merge_overrides,
    palette_for_theme,
};
use upkeep_core::error::AppError;
use upkeep_core::ledger::{MonthSummary, available_years};
use upkeep_core::model::{
    ALL_MONTHS, ProgressRecord, Task, TaskStatus, month_from_number, validate_year,
};
use upkeep_core::notify::parse_activation_argument;
use upkeep_core::recurrence::TriggerSpec;
use upkeep_core::reminders::ReminderRequest;
use upkeep_core::task_api::{self, FileHomeStore};

const LOG_ENV_VAR: &str = "UPKEEP_LOG";

struct Session {
    store: FileHomeStore,
    config: Config,
    current_year: i32,
    current_month: Month,
}

impl Session {
    fn open() -> Result<Self, AppError> {
        let (current_year, current_month) = clock::year_and_month(clock::local_now());
        let loaded = load_config_with_fallback();
        if let Some(err) = &loaded.error {
            warn!(error = %err, "using default config");
        }
        let store = task_api::open_store(current_year)?;
        Ok(Self {
            store,
            config: loaded.config,
            current_year,
            current_month,
        })
    }

    fn month_or_current(&self, month: Option<u8>) -> Result<Month, AppError> {
        month.map_or(Ok(self.current_month), month_from_number)
    }

    fn year_or_selected(&self, year: Option<i32>) -> Result<i32, AppError> {
        year.map_or(Ok(self.store.ledger().selected_year()), validate_year)
    }

    fn resolve(&self, when: When) -> Result<(i32, Month), AppError> {
        Ok((
            self.year_or_selected(when.year)?,
            self.month_or_current(when.month)?,
        ))
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve_config(base: &Config, raw_overrides: &[String]) -> Result<Config, AppError> {
    let mut overrides = ConfigOverrides::default();
    for raw in raw_overrides {
        let parsed = cli::parse_config_override(raw).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::MonthlyBudget => {
                overrides.monthly_budget =
                    cli::parse_cost(&parsed.value).map_err(AppError::invalid_input)?;
            }
        }
    }
    Ok(merge_overrides(base, &overrides))
}

fn money(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

fn optional_money(amount: Option<Decimal>) -> String {
    amount.map_or_else(|| "-".to_string(), money)
}

fn short_month(month: Month) -> String {
    month.to_string().chars().take(3).collect()
}

fn describe_trigger(trigger: &TriggerSpec) -> String {
    let at = format!("{:02}:00", trigger.hour);
    match (trigger.month, trigger.day) {
        (Some(month), Some(day)) => format!("every {month} {day} at {at}"),
        (Some(month), None) => format!("daily in {month} at {at}"),
        (None, Some(day)) => format!("day {day} of every month at {at}"),
        (None, None) => format!("daily at {at}"),
    }
}

fn print_tasks_plain(tasks: &[Task]) {
    for task in tasks {
        println!("{} | {} | {}", task.id, task.title, task.schedule);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn print_occurrence_json(task: &Task, year: i32, month: Month, progress: &ProgressRecord) {
    let json = serde_json::json!({
        "task": task,
        "year": year,
        "month": u8::from(month),
        "progress": progress,
    });
    println!("{}", json);
}

fn print_occurrence_plain(year: i32, month: Month, progress: &ProgressRecord) {
    let note = if progress.note.is_empty() {
        "-"
    } else {
        progress.note.as_str()
    };
    println!(
        "{} {}: {} | cost {} | note {}",
        month,
        year,
        progress.status.display_name(),
        optional_money(progress.cost),
        note
    );
}

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    title: String,
    #[tabled(rename = "Cadence")]
    cadence: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Note")]
    note: String,
}

fn print_month_plain(summary: &MonthSummary, month: Month, config: &Config, palette: &Palette) {
    let heading = format!("{} {}", month, summary.year);
    println!("{}", palette.accentize(&heading));

    if summary.tasks.is_empty() {
        println!("No tasks due.");
        return;
    }

    let rows = summary.tasks.iter().map(|entry| MonthRow {
        id: entry.task.id.clone(),
        title: entry.task.title.clone(),
        cadence: entry.task.schedule.to_string(),
        status: entry.progress.status.display_name().to_string(),
        cost: optional_money(entry.progress.cost),
        note: entry.progress.note.clone(),
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");

    let budget = config.suggested_monthly_budget();
    println!(
        "Completed {}/{}, spent {} of {} suggested",
        summary.completed_tasks,
        summary.total_tasks,
        money(summary.month_cost),
        money(budget)
    );
    if summary.month_cost > budget {
        println!("{}", palette.mutedize("Over the suggested budget."));
    }
    if summary.is_month_complete {
        println!("{}", palette.accentize("Month complete."));
    }
}

fn run_command(cli: Cli, session: &mut Session) -> Result<(), AppError> {
    let config = resolve_config(&session.config, &cli.config_override)?;
    let palette = palette_for_theme(config.theme.as_deref());

    match cli.command {
        Command::Tasks { month } => {
            let month = session.month_or_current(month)?;
            let tasks = session.store.ledger().tasks_in(month);
            if cli.json {
                print_json(&tasks)?;
            } else if tasks.is_empty() {
                println!("No tasks due in {month}.");
            } else {
                print_tasks_plain(&tasks);
            }
        }
        Command::Catalog => {
            let ledger = session.store.ledger();
            let grouped = ledger.grouped_tasks();
            if cli.json {
                let payload: Vec<_> = ledger
                    .cadences()
                    .into_iter()
                    .map(|cadence| {
                        serde_json::json!({
                            "cadence": cadence.display_name(),
                            "tasks": grouped.get(&cadence),
                        })
                    })
                    .collect();
                println!("{}", serde_json::Value::Array(payload));
            } else {
                for cadence in ledger.cadences() {
                    println!("{}", palette.accentize(cadence.display_name()));
                    for task in grouped.get(&cadence).into_iter().flatten() {
                        println!("  {} | {}", task.id, task.title);
                    }
                }
            }
        }
        Command::Show { id, when } => {
            let (year, month) = session.resolve(when)?;
            let task = session.store.task(&id)?;
            let progress = session.store.ledger().get(&task, year, month);
            if cli.json {
                print_occurrence_json(&task, year, month, &progress);
            } else {
                println!("{} | {} | {}", task.id, task.title, task.schedule);
                if !task.detail.is_empty() {
                    println!("{}", palette.mutedize(&task.detail));
                }
                print_occurrence_plain(year, month, &progress);
            }
        }
        Command::Status { id, status, when } => {
            let (year, month) = session.resolve(when)?;
            let status = TaskStatus::from(status);
            let progress = session.store.set_status(&id, status, year, month)?;
            let task = session.store.task(&id)?;
            if cli.json {
                print_occurrence_json(&task, year, month, &progress);
            } else {
                println!(
                    "Updated {} for {} {}: {}",
                    task.id,
                    month,
                    year,
                    progress.status.display_name()
                );
            }
        }
        Command::Cost { id, amount, when } => {
            let (year, month) = session.resolve(when)?;
            let cost = cli::parse_cost(&amount).map_err(AppError::invalid_input)?;
            let progress = session.store.set_cost(&id, cost, year, month)?;
            let task = session.store.task(&id)?;
            if cli.json {
                print_occurrence_json(&task, year, month, &progress);
            } else {
                println!(
                    "Recorded cost for {} in {} {}: {}",
                    task.id,
                    month,
                    year,
                    optional_money(progress.cost)
                );
            }
        }
        Command::Note { id, note, when } => {
            let (year, month) = session.resolve(when)?;
            let progress = session.store.set_note(&id, &note, year, month)?;
            let task = session.store.task(&id)?;
            if cli.json {
                print_occurrence_json(&task, year, month, &progress);
            } else {
                println!("Saved note for {} in {} {}", task.id, month, year);
            }
        }
        Command::AddCustom {
            month,
            title,
            detail,
        } => {
            let month = month_from_number(month)?;
            let task = session.store.add_custom_task(month, &title, &detail)?;
            if cli.json {
                print_json(&task)?;
            } else {
                println!("Added custom task: {} ({}) in {}", task.title, task.id, month);
            }
        }
        Command::Month { when } => {
            let (year, month) = session.resolve(when)?;
            let summary = session.store.ledger().month_summary(month, year);
            if cli.json {
                print_json(&summary)?;
            } else {
                print_month_plain(&summary, month, &config, &palette);
            }
        }
        Command::Year { year } => {
            let year = session.year_or_selected(year)?;
            let summary = session.store.ledger().year_summary(year);
            if cli.json {
                print_json(&summary)?;
            } else {
                println!(
                    "{}: {} completed, {} spent, {:.0}% of months complete",
                    palette.accentize(&year.to_string()),
                    summary.completed_count,
                    money(summary.completed_cost),
                    summary.year_progress * 100.0
                );
                for (month, totals) in ALL_MONTHS.into_iter().zip(&summary.months) {
                    if totals.total_tasks == 0 {
                        continue;
                    }
                    let line = format!(
                        "{}  {}/{}  {}",
                        short_month(month),
                        totals.completed_tasks,
                        totals.total_tasks,
                        money(totals.completed_cost)
                    );
                    if totals.is_month_complete {
                        println!("{}", palette.accentize(&format!("{line}  done")));
                    } else {
                        println!("{line}");
                    }
                }
            }
        }
        Command::YearSelect { year } => match year {
            Some(year) => {
                session.store.set_selected_year(year)?;
                if cli.json {
                    print_json(&serde_json::json!({ "selected_year": year }))?;
                } else {
                    println!("Selected year: {year}");
                }
            }
            None => {
                let selected = session.store.ledger().selected_year();
                let years = available_years(session.current_year);
                if cli.json {
                    print_json(&serde_json::json!({
                        "selected_year": selected,
                        "available_years": years,
                    }))?;
                } else {
                    for year in years {
                        if year == selected {
                            println!("{}", palette.accentize(&format!("* {year}")));
                        } else {
                            println!("  {year}");
                        }
                    }
                }
            }
        },
        Command::Sync => {
            let reports = session.store.synchronize()?;
            if cli.json {
                print_json(&serde_json::json!({ "applied_changes": reports.len() }))?;
            } else {
                println!("Applied {} external change(s)", reports.len());
            }
        }
        Command::Reminders { action } => run_reminders(action, cli.json, session)?,
    }

    Ok(())
}

fn print_reminders_plain(requests: &[ReminderRequest]) {
    for request in requests {
        println!(
            "{} | {} | {}",
            request.identifier,
            describe_trigger(&request.trigger),
            request.title
        );
    }
}

fn parse_wall_clock(raw: &str) -> Result<PrimitiveDateTime, AppError> {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    PrimitiveDateTime::parse(raw.trim(), &format).map_err(|_| {
        AppError::invalid_input(format!(
            "invalid time '{}', expected YYYY-MM-DD HH:MM",
            raw.trim()
        ))
    })
}

fn run_reminders(action: RemindersCommand, json: bool, session: &Session) -> Result<(), AppError> {
    match action {
        RemindersCommand::Sync => {
            let outcome = task_api::sync_reminders(session.store.ledger().catalog())?;
            for failure in &outcome.failures {
                eprintln!("WARN: {} - {}", failure.identifier, failure.error);
            }
            if json {
                let failures: Vec<_> = outcome
                    .failures
                    .iter()
                    .map(|failure| {
                        serde_json::json!({
                            "identifier": failure.identifier,
                            "error": failure.error.to_string(),
                        })
                    })
                    .collect();
                print_json(&serde_json::json!({
                    "skipped": outcome.skipped,
                    "installed": outcome.installed,
                    "failures": failures,
                }))?;
            } else if let Some(authorization) = outcome.skipped {
                println!("Reminders not installed (permission: {authorization:?})");
            } else {
                println!("Installed {} reminder(s)", outcome.installed.len());
            }
        }
        RemindersCommand::List => {
            let requests = task_api::installed_reminders()?;
            if json {
                print_json(&requests)?;
            } else if requests.is_empty() {
                println!("No reminders installed.");
            } else {
                print_reminders_plain(&requests);
            }
        }
        RemindersCommand::Fire { at } => {
            let now = match at {
                Some(raw) => parse_wall_clock(&raw)?,
                None => clock::local_now(),
            };
            let outcome = task_api::fire_due_reminders(now)?;
            for failure in &outcome.failures {
                eprintln!("WARN: {} - {}", failure.identifier, failure.error);
            }
            if json {
                print_json(&outcome.fired)?;
            } else {
                println!("Fired {} reminder(s)", outcome.fired.len());
                print_reminders_plain(&outcome.fired);
            }
        }
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_interactive() -> Result<(), AppError> {
    let mut session = Session::open()?;
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("upkeep".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = session.store.synchronize() {
            warn!(error = %err, "could not synchronize store");
        }

        if let Err(err) = run_command(cli, &mut session) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

/// Maps a notification activation (`upkeep show:<id>`) onto `upkeep show <id>`.
fn activation_args(args: Vec<OsString>) -> Vec<OsString> {
    let task_id = args
        .get(1)
        .and_then(|arg| arg.to_str())
        .and_then(parse_activation_argument);
    match (args.len(), task_id) {
        (2, Some(task_id)) => vec![args[0].clone(), "show".into(), task_id.into()],
        _ => args,
    }
}

fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();
    if args.len() < 2 {
        init_logging(0);
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse_from(activation_args(args)) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    init_logging(cli.verbose);
    let result = Session::open().and_then(|mut session| run_command(cli, &mut session));
    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
