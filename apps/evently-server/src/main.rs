use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use db::{ConnectOpts, DbHandle};
use event_bookings::config::EventBookingsConfig;
use event_bookings::model::{BookingScope, DateRange};
use event_bookings::EventBookings;
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use uuid::Uuid;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Evently server - event booking engine
#[derive(Parser)]
#[command(name = "evently-server")]
#[command(about = "Evently server - vendor bookings, availability and guest RSVPs")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check configuration
    Check,
    /// Apply database migrations
    Migrate,
    /// Show the dates a vendor is committed to
    Availability {
        #[arg(long)]
        vendor: Uuid,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        from: NaiveDate,
        /// Last day (inclusive), YYYY-MM-DD
        #[arg(long)]
        to: NaiveDate,
    },
    /// Booking counts by status for a vendor or a planner
    #[command(group(ArgGroup::new("scope").required(true).args(["vendor", "planner"])))]
    Stats {
        #[arg(long)]
        vendor: Option<Uuid>,
        #[arg(long)]
        planner: Option<Uuid>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config
        .logging
        .clone()
        .unwrap_or_else(runtime::default_logging_config);
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Evently server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => check_config(&config),
        Commands::Migrate => {
            let (db, _) = bootstrap(&config).await?;
            println!("Migrations applied to {:?} database", db.engine());
            db.close().await;
            Ok(())
        }
        Commands::Availability { vendor, from, to } => {
            let (db, module) = bootstrap(&config).await?;
            let client = module.client()?;
            let dates = client
                .unavailable_dates(vendor, DateRange::new(from, to))
                .await?;
            let out: Vec<String> = dates.iter().map(NaiveDate::to_string).collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
            db.close().await;
            Ok(())
        }
        Commands::Stats { vendor, planner } => {
            let scope = match (vendor, planner) {
                (Some(v), _) => BookingScope::Vendor(v),
                (None, Some(p)) => BookingScope::Planner(p),
                (None, None) => anyhow::bail!("either --vendor or --planner is required"),
            };
            let (db, module) = bootstrap(&config).await?;
            let stats = module.client()?.booking_statistics(scope).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "total": stats.total,
                    "pending": stats.pending,
                    "confirmed": stats.confirmed,
                    "completed": stats.completed,
                    "cancelled": stats.cancelled,
                }))?
            );
            db.close().await;
            Ok(())
        }
    }
}

/// Connect, migrate and wire the bookings module.
async fn bootstrap(config: &AppConfig) -> Result<(DbHandle, EventBookings)> {
    let db_config = config
        .database
        .clone()
        .context("No database configuration found")?;

    let mut dsn = db_config.url.trim().to_owned();
    if dsn.is_empty() {
        anyhow::bail!("Database URL not configured");
    }
    // Absolutize sqlite DSNs to avoid cwd issues
    if dsn.starts_with("sqlite") {
        dsn = db::absolutize_sqlite_dsn(&dsn, Path::new(&config.server.home_dir))?;
    }

    let connect_opts = ConnectOpts {
        max_conns: db_config.max_conns,
        acquire_timeout: Some(Duration::from_secs(5)),
        sqlite_busy_timeout: db_config
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        create_sqlite_dirs: true,
    };

    tracing::info!("Connecting to database: {}", dsn);
    let db = DbHandle::connect(&dsn, connect_opts).await?;
    tracing::info!("Connected DB backend: {:?}", db.engine());

    let module = EventBookings::default();
    module.migrate(&db).await?;
    let module_cfg: EventBookingsConfig = config.module_config(EventBookings::NAME)?;
    module.init(&db, module_cfg).await?;
    Ok((db, module))
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let module_cfg: EventBookingsConfig = config.module_config(EventBookings::NAME)?;
    module_cfg.validate()?;

    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
