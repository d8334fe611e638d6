//! masterrota - sync ChurchSuite rotas and attendance into Google Sheets.
//!
//! ```text
//! masterrota rota [config.json] [--html FILE] [--year YYYY] [--dry-run]
//! masterrota attendance [config.json] [--html FILE] [--date YYYY-MM-DD] [--dry-run]
//! masterrota store-password [config.json]
//! ```

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use masterrota_core::api::{ChurchSuiteClient, ReportWindow};
use masterrota_core::auth::CredentialStore;
use masterrota_core::config::Config;
use masterrota_core::sheets::{MemorySheets, SheetsClient};
use masterrota_core::sync::{last_sunday, sync_attendance, sync_rota};
use masterrota_core::utils::render_table;

// ============================================================================
// Constants
// ============================================================================

/// Directory for a daily rolling log file, in addition to stderr
const LOG_DIR_ENV: &str = "MASTERROTA_LOG_DIR";

const LOG_FILE_PREFIX: &str = "masterrota.log";

const USAGE: &str = "\
Usage:
  masterrota rota [config.json] [--html FILE] [--year YYYY] [--dry-run]
  masterrota attendance [config.json] [--html FILE] [--date YYYY-MM-DD] [--dry-run]
  masterrota store-password [config.json]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Rota,
    Attendance,
    StorePassword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    command: Command,
    config: Option<PathBuf>,
    html: Option<PathBuf>,
    year: Option<i32>,
    date: Option<NaiveDate>,
    dry_run: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the log file on drop and must be held until exit.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match std::env::var_os(LOG_DIR_ENV) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut iter = args.iter();
    let command = match iter.next().map(String::as_str) {
        Some("rota") => Command::Rota,
        Some("attendance") => Command::Attendance,
        Some("store-password") => Command::StorePassword,
        Some(other) => bail!("Unknown command {:?}\n\n{}", other, USAGE),
        None => bail!("{}", USAGE),
    };

    let mut parsed = Args {
        command,
        config: None,
        html: None,
        year: None,
        date: None,
        dry_run: false,
    };

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("{} needs a value", flag))
        };
        match arg.as_str() {
            "--html" => parsed.html = Some(PathBuf::from(value("--html")?)),
            "--year" => {
                let year = value("--year")?;
                parsed.year = Some(
                    year.parse()
                        .with_context(|| format!("Invalid year {:?}", year))?,
                );
            }
            "--date" => {
                let date = value("--date")?;
                parsed.date = Some(
                    NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                        .with_context(|| format!("Invalid date {:?}, expected YYYY-MM-DD", date))?,
                );
            }
            "--dry-run" => parsed.dry_run = true,
            flag if flag.starts_with("--") => bail!("Unknown option {:?}\n\n{}", flag, USAGE),
            path if parsed.config.is_none() => parsed.config = Some(PathBuf::from(path)),
            extra => bail!("Unexpected argument {:?}\n\n{}", extra, USAGE),
        }
    }

    if parsed.year.is_some() && parsed.command != Command::Rota {
        bail!("--year only applies to the rota command");
    }
    if parsed.date.is_some() && parsed.command != Command::Attendance {
        bail!("--date only applies to the attendance command");
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = init_tracing();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let result = match parse_args(&raw) {
        Ok(args) => run(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    info!(site = config.display_name(), "masterrota starting");

    match args.command {
        Command::Rota => run_rota(&config, &args).await,
        Command::Attendance => run_attendance(&config, &args).await,
        Command::StorePassword => store_password(&config),
    }
}

/// Log in to ChurchSuite and select the configured site.
async fn connect(config: &Config) -> Result<ChurchSuiteClient> {
    let client = ChurchSuiteClient::new(&config.churchname, config.request_timeout())?;
    let password = config.resolve_password()?;
    client.login(&config.username, &password).await?;
    if let Some(site_id) = &config.site_id {
        client.switch_site(site_id).await?;
    }
    Ok(client)
}

fn read_report(path: &Path) -> Result<String> {
    info!(path = %path.display(), "Reading report from file");
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report {}", path.display()))
}

fn sheets_client(config: &Config) -> Result<SheetsClient> {
    let token = config.resolve_sheets_token()?;
    let sheets = SheetsClient::new(&config.google_sheet_id, &token, config.request_timeout())?;
    info!(url = %sheets.browser_url(), "Writing to spreadsheet");
    Ok(sheets)
}

async fn run_rota(config: &Config, args: &Args) -> Result<()> {
    let html = match &args.html {
        Some(path) => read_report(path)?,
        None => {
            let window = args.year.map(ReportWindow::Year).unwrap_or_else(ReportWindow::from_today);
            connect(config).await?.fetch_rota_overview(window).await?
        }
    };

    let roles = config.role_config();
    let now = Local::now().naive_local();
    let report = if args.dry_run {
        sync_rota(&MemorySheets::new(), &html, &roles, &config.ranges, now).await?
    } else {
        sync_rota(&sheets_client(config)?, &html, &roles, &config.ranges, now).await?
    };

    if let Some(rows) = &report.next_rows {
        print!("{}", render_table(rows));
    }
    info!(dates = report.dataset.len(), "Rota sync complete");
    Ok(())
}

async fn run_attendance(config: &Config, args: &Args) -> Result<()> {
    let now = Local::now().naive_local();
    let date = args.date.unwrap_or_else(|| last_sunday(now.date()));

    let html = match &args.html {
        Some(path) => read_report(path)?,
        None => connect(config).await?.fetch_attendance(date).await?,
    };

    let report = if args.dry_run {
        sync_attendance(&MemorySheets::new(), &html, date, &config.ranges, now).await?
    } else {
        sync_attendance(&sheets_client(config)?, &html, date, &config.ranges, now).await?
    };

    info!(
        date = %date,
        meetings = report.table.len(),
        written = report.cells_written,
        missing = report.labels_missing,
        "Attendance sync complete"
    );
    Ok(())
}

fn store_password(config: &Config) -> Result<()> {
    let prompt = format!(
        "ChurchSuite password for {}@{}: ",
        config.username, config.churchname
    );
    let password = rpassword::prompt_password(prompt)?;
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    CredentialStore::store(&config.churchname, &config.username, &password)?;
    eprintln!("Password stored in keychain.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        let owned: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        parse_args(&owned)
    }

    #[test]
    fn test_rota_defaults() {
        let parsed = args(&["rota"]).unwrap();
        assert_eq!(parsed.command, Command::Rota);
        assert_eq!(parsed.config, None);
        assert!(!parsed.dry_run);
    }

    #[test]
    fn test_rota_with_options() {
        let parsed = args(&["rota", "church.json", "--year", "2018", "--dry-run"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("church.json")));
        assert_eq!(parsed.year, Some(2018));
        assert!(parsed.dry_run);
    }

    #[test]
    fn test_attendance_date_and_html() {
        let parsed =
            args(&["attendance", "--date", "2018-04-22", "--html", "report.html"]).unwrap();
        assert_eq!(parsed.command, Command::Attendance);
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2018, 4, 22));
        assert_eq!(parsed.html, Some(PathBuf::from("report.html")));
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(args(&[]).is_err());
        assert!(args(&["sync"]).is_err());
        assert!(args(&["rota", "--html"]).is_err());
        assert!(args(&["rota", "--year", "next"]).is_err());
        assert!(args(&["attendance", "--date", "22/04/2018"]).is_err());
        assert!(args(&["rota", "a.json", "b.json"]).is_err());
        assert!(args(&["rota", "--verbose"]).is_err());
    }

    #[test]
    fn test_flags_limited_to_their_command() {
        assert!(args(&["attendance", "--year", "2018"]).is_err());
        assert!(args(&["rota", "--date", "2018-04-22"]).is_err());
    }
}
