//! Planning CLI entrypoint.
//!
//! This is the main entrypoint for the planning command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use planning_grid::cli::{Cli, Commands, OutputFormatter};
use planning_grid::config::{
    ConfigParser, ConfigValidator, DashboardConfig, LoadedConfig, find_config_file,
};
use planning_grid::error::{AuthError, Result};
use planning_grid::feeds::{FeedClient, HttpSkuLookup};
use planning_grid::planning::{RowKey, build_gm_trend, classify_gm_text};
use planning_grid::reconciler::PlanningReconciler;
use planning_grid::session::Session;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Everything a data command needs once a session is open.
struct AppContext {
    /// Loaded configuration.
    config: DashboardConfig,
    /// Feed client.
    client: FeedClient,
    /// Output formatter.
    formatter: OutputFormatter,
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    if !cli.command.requires_session() {
        return run_local(&cli, &formatter);
    }

    let loaded = load_config(cli.config.as_ref())?;

    // clap reads credential variables at parse time, before .env is loaded.
    let cli = if cli.credentials().is_none() && loaded.env_file.is_some() {
        Cli::parse()
    } else {
        cli
    };

    let session = open_session(&loaded.config, &cli)?;
    let client = FeedClient::new(&loaded.config.feeds, &loaded.config.sheet)?;
    let ctx = AppContext {
        config: loaded.config,
        client,
        formatter,
    };

    let result = match cli.command {
        Commands::Schema => cmd_schema(&ctx).await,
        Commands::Rows { week } => cmd_rows(&ctx, week.as_deref()).await,
        Commands::Edit {
            store,
            sku,
            week,
            units,
        } => cmd_edit(&ctx, RowKey::new(store, sku), &week, &units).await,
        Commands::Skus => cmd_skus(&ctx).await,
        Commands::Stores => cmd_stores(&ctx).await,
        Commands::Trend => cmd_trend(&ctx).await,
        Commands::Init { .. } | Commands::Validate { .. } | Commands::Classify { .. } => Ok(()),
    };

    session.logout();
    result
}

/// Runs a command that reads no dashboard data.
fn run_local(cli: &Cli, formatter: &OutputFormatter) -> Result<()> {
    match &cli.command {
        Commands::Init { path, force } => cmd_init(path, *force),
        Commands::Validate { warnings } => cmd_validate(cli.config.as_ref(), *warnings),
        Commands::Classify { value } => {
            let band = classify_gm_text(Some(value));
            emit(&formatter.format_band(value, band))
        }
        _ => Ok(()),
    }
}

/// Writes command output to stdout.
fn emit(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

/// Initialize a new configuration.
fn cmd_init(path: &Path, force: bool) -> Result<()> {
    info!("Initializing planning configuration in: {}", path.display());

    let config_path = path.join("planning.yaml");
    let env_path = path.join(".env.example");
    let gitignore_path = path.join(".gitignore");

    // Check if files exist
    if !force && config_path.exists() {
        eprintln!("Configuration file already exists: {}", config_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(());
    }

    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }

    let config_template = include_str!("../templates/planning.yaml");
    std::fs::write(&config_path, config_template)?;
    eprintln!("Created: {}", config_path.display());

    let env_template = include_str!("../templates/.env.example");
    std::fs::write(&env_path, env_template)?;
    eprintln!("Created: {}", env_path.display());

    if gitignore_path.exists() {
        let existing = std::fs::read_to_string(&gitignore_path)?;
        if !existing.lines().any(|line| line.trim() == ".env") {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&gitignore_path)?;
            writeln!(file, "\n# Planning credentials\n.env")?;
            eprintln!("Updated: {}", gitignore_path.display());
        }
    } else {
        std::fs::write(&gitignore_path, ".env\n")?;
        eprintln!("Created: {}", gitignore_path.display());
    }

    eprintln!("\nConfiguration initialized successfully!");
    eprintln!("Next steps:");
    eprintln!("  1. Copy .env.example to .env and fill in your credentials");
    eprintln!("  2. Edit planning.yaml with your feed and sheet locations");
    eprintln!("  3. Run 'planning validate' to check your configuration");
    eprintln!("  4. Run 'planning rows' to load the planning grid");

    Ok(())
}

/// Validate configuration.
fn cmd_validate(config_path: Option<&PathBuf>, show_warnings: bool) -> Result<()> {
    let config_file = resolve_config_path(config_path)?;
    info!("Validating configuration: {}", config_file.display());

    let LoadedConfig {
        config,
        env_file,
        overrides,
        ..
    } = ConfigParser::for_file(&config_file).load(&config_file)?;

    let result = ConfigValidator::new().validate(&config)?;

    if result.is_valid() {
        eprintln!("Configuration is valid!");
        if show_warnings && !result.warnings.is_empty() {
            eprintln!("\nWarnings:");
            for warning in &result.warnings {
                eprintln!("  - {warning}");
            }
        } else if result.warning_count() > 0 {
            eprintln!("({} warnings, use --warnings to show)", result.warning_count());
        }
    }

    eprintln!("\nConfiguration summary:");
    eprintln!("  Calendar: {}", config.feeds.calendar_url());
    eprintln!("  SKUs: {}", config.feeds.sku_url());
    eprintln!("  Stores: {}", config.feeds.store_url());
    eprintln!("  Planning sheet: {}", config.sheet.gviz_url(&config.sheet.planning_gid));
    eprintln!("  Trend sheet: {}", config.sheet.gviz_url(&config.sheet.trend_gid));
    eprintln!("  User: {}", config.auth.username);
    if let Some(env_file) = env_file {
        eprintln!("  Environment file: {}", env_file.display());
    }
    if !overrides.is_empty() {
        eprintln!("  Overridden by: {}", overrides.join(", "));
    }

    Ok(())
}

/// Show the grid column schema.
async fn cmd_schema(ctx: &AppContext) -> Result<()> {
    let lookup = HttpSkuLookup::new(ctx.client.clone());
    let (reconciler, report) = PlanningReconciler::mount(&ctx.client, lookup).await;
    eprint!("{}", ctx.formatter.format_mount(&report));
    emit(&ctx.formatter.format_schema(reconciler.schema()))
}

/// Show the planning rows.
async fn cmd_rows(ctx: &AppContext, week: Option<&str>) -> Result<()> {
    let lookup = HttpSkuLookup::new(ctx.client.clone());
    let (reconciler, report) = PlanningReconciler::mount(&ctx.client, lookup).await;
    eprint!("{}", ctx.formatter.format_mount(&report));

    if let Some(week) = week.filter(|w| !reconciler.schema().has_week(w)) {
        warn!("Week '{week}' is not in the calendar");
    }

    emit(&ctx.formatter.format_rows(&reconciler.rows(), week))
}

/// Apply successive sales-units edits to one row and week.
///
/// Each edit fetches the SKU feed for its price and cost.
async fn cmd_edit(ctx: &AppContext, key: RowKey, week: &str, units: &[String]) -> Result<()> {
    let lookup = HttpSkuLookup::new(ctx.client.clone());
    let (reconciler, report) = PlanningReconciler::mount(&ctx.client, lookup).await;
    eprint!("{}", ctx.formatter.format_mount(&report));

    let mut outcomes = Vec::with_capacity(units.len());
    for input in units {
        let outcome = reconciler.edit_units(&key, week, input).await;
        outcomes.push((input.clone(), outcome));
    }

    emit(&ctx.formatter.format_edits(&key, week, &outcomes))
}

/// List the SKU catalog.
async fn cmd_skus(ctx: &AppContext) -> Result<()> {
    let skus = ctx.client.fetch_skus().await?;
    emit(&ctx.formatter.format_skus(&skus))
}

/// List the store catalog.
async fn cmd_stores(ctx: &AppContext) -> Result<()> {
    let stores = ctx.client.fetch_stores().await?;
    emit(&ctx.formatter.format_stores(&stores))
}

/// Show the weekly GM trend.
async fn cmd_trend(ctx: &AppContext) -> Result<()> {
    info!(
        "Loading GM trend from sheet {}",
        ctx.config.sheet.gviz_url(&ctx.config.sheet.trend_gid)
    );
    let trend = match ctx.client.fetch_trend_sheet().await {
        Ok(sheet) => build_gm_trend(&sheet).unwrap_or_else(|e| {
            warn!("Trend sheet is malformed: {e}");
            Vec::new()
        }),
        Err(e) => {
            warn!("Failed to load trend sheet: {e}");
            Vec::new()
        }
    };
    emit(&ctx.formatter.format_trend(&trend))
}

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Loads and validates the configuration.
fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_file = resolve_config_path(config_path)?;
    debug!("Loading configuration from: {}", config_file.display());

    let loaded = ConfigParser::for_file(&config_file).load(&config_file)?;
    if !loaded.overrides.is_empty() {
        debug!("Environment overrides: {}", loaded.overrides.join(", "));
    }

    ConfigValidator::new().validate(&loaded.config)?;
    Ok(loaded)
}

/// Opens a session from the CLI credentials.
fn open_session(config: &DashboardConfig, cli: &Cli) -> Result<Session> {
    let (username, password) = cli.credentials().ok_or(AuthError::MissingCredentials)?;
    Ok(Session::login(&config.auth, username, password)?)
}
