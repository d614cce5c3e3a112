use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecosystem_calendar::commands::{
    calendar::{DayCommand, FacetsCommand, MonthCommand, ShowCommand},
    config_ops::InitConfigCommand,
    Command, CommandContext,
};
use ecosystem_calendar::config::Config;
use ecosystem_calendar::services::CalendarService;
use ecosystem_calendar::{DateKey, FilterCriteria, YearMonth};

#[derive(Parser)]
#[command(name = "ecosystem-calendar")]
#[command(about = "Ecosystem Calendar - merged local and external events, by month")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output JSON instead of terminal text
    #[arg(long, global = true)]
    json: bool,

    /// Use this configuration file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Args, Clone, Default)]
struct FilterArgs {
    /// Only events whose category contains this text
    #[arg(long)]
    category: Option<String>,

    /// Only events whose audience contains this text
    #[arg(long)]
    audience: Option<String>,

    /// Only events mentioning this text in title, description or location
    #[arg(long)]
    search: Option<String>,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            category: args.category,
            audience: args.audience,
            search_text: args.search,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the month calendar (defaults to the current month)
    Month {
        /// Month to show, as YYYY-MM
        #[arg(long)]
        month: Option<YearMonth>,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// List every event on one day
    Day {
        /// Day to list, as YYYY-MM-DD
        date: DateKey,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show one stored event
    Show {
        /// Event id from the directory backend
        id: String,
    },
    /// List the categories and audiences present in the feeds
    Facets,
    /// Write the configuration file with current settings
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_deref())
        .await
        .context("Failed to load application configuration")?;

    // Initialize logging on stderr so rendered output stays clean
    let log_level = if cli.debug { "debug" } else { config.general.log_level.as_str() };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ecosystem_calendar={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Configuration loaded, timezone {}", config.get_timezone());

    let calendar = CalendarService::new(&config).context("Failed to create events API client")?;
    let config = Arc::new(RwLock::new(config));
    let context = CommandContext::new(config, calendar, cli.json);

    let mut command: Box<dyn Command + Send> = match cli.command.unwrap_or(Commands::Month {
        month: None,
        filters: FilterArgs::default(),
    }) {
        Commands::Month { month, filters } => Box::new(MonthCommand {
            month,
            criteria: filters.into(),
        }),
        Commands::Day { date, filters } => Box::new(DayCommand {
            date,
            criteria: filters.into(),
        }),
        Commands::Show { id } => Box::new(ShowCommand { id }),
        Commands::Facets => Box::new(FacetsCommand),
        Commands::InitConfig => Box::new(InitConfigCommand { path: cli.config.clone() }),
    };

    command
        .execute(&context)
        .await
        .context("Failed to execute command")?;

    Ok(())
}
