//! CLI inspection probe.
//!
//! # Responsibility
//! - Verify `taskboard_core` linkage (ping/version).
//! - Optionally open a board database and print its tasks.
//! - With `--audit`, run one urgency sweep and tag each task.

use clap::Parser;
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use taskboard_core::{
    format_task_date, init_logging, BoardConfig, BoardService, LogConfig, Status, Urgency,
    DEFAULT_STORAGE_KEY,
};

#[derive(Parser)]
#[command(author, version, about = "Inspect a task board database", long_about = None)]
struct Cli {
    /// Board database file (created when missing)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long = "log-dir")]
    log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long = "log-level")]
    log_level: Option<String>,

    /// Key the board document is stored under
    #[arg(long, default_value = DEFAULT_STORAGE_KEY)]
    key: String,

    /// Run one due-date audit sweep and tag every task with its urgency
    #[arg(long)]
    audit: bool,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("taskboard: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    println!("taskboard_core ping={}", taskboard_core::ping());
    println!("taskboard_core version={}", taskboard_core::core_version());

    let log = cli.log_dir.map(|log_dir| {
        let log = LogConfig::new(log_dir);
        match cli.log_level {
            Some(level) => log.with_level(level),
            None => log,
        }
    });

    let Some(db) = cli.db else {
        if let Some(log) = &log {
            init_logging(log)?;
        }
        return Ok(());
    };
    let mut config = BoardConfig::default()
        .with_db_path(db)
        .with_storage_key(cli.key);
    if let Some(log) = log {
        config = config.with_logging(log);
    }
    let service = BoardService::open_with_config(&config)?;
    let report = cli.audit.then(|| service.audit());
    info!(
        "event=cli_inspect module=cli status=ok tasks={} audit={}",
        service.board().len(),
        report.is_some()
    );

    for status in Status::ALL {
        let list = service.board().list(status);
        println!("{status} ({})", list.len());
        for (index, task) in list.iter().enumerate() {
            let date = format_task_date(task.date);
            match &report {
                Some(report) => {
                    let urgency = report.urgency_of(task.id).unwrap_or(Urgency::Normal);
                    println!("  [{index}] {date} {urgency:<8} {} {}", task.id, task.text);
                }
                None => println!("  [{index}] {date} {} {}", task.id, task.text),
            }
        }
    }
    if let Some(report) = report {
        println!(
            "overdue={} warning={}",
            report.overdue_count(),
            report.warning_count()
        );
    }
    Ok(())
}
