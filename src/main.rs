use std::path::PathBuf;

use clap::Parser;

mod config;
mod db;
mod helpdesk;
mod models;
mod observability;
mod queue;
mod retention;
mod secrets;

#[cfg(test)]
mod tests;

/// CLI arguments for the custodian sweep
#[derive(Parser, Debug)]
#[command(version, about = "Custodian ticket-retention sweep", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to config file (defaults to custodian.toml in the working directory)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log what the sweep would enqueue and update without doing either
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Run one retention sweep (default)
    Run,
    /// Run database migrations and exit
    ///
    /// Useful for CI/CD pipelines and init containers. Connects to the
    /// database, runs any pending migrations, and exits.
    Migrate,
    /// Validate the configuration file and print a summary
    Config,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Some(Command::Migrate) => {
            run_migrate(args.config.as_deref()).await;
        }
        Some(Command::Config) => {
            run_config_check(args.config.as_deref());
        }
        Some(Command::Run) | None => {
            run_sweep_command(args.config.as_deref(), args.dry_run).await;
        }
    }
}

/// Resolve the config path.
///
/// An explicit path must exist. Without one, `custodian.toml` in the
/// working directory is used. The sweep touches production data, so a
/// missing config is an error rather than an auto-generated default.
fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf, String> {
    if let Some(path) = explicit_path {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()));
        }
        return Ok(path);
    }

    let cwd_config = PathBuf::from("custodian.toml");
    if cwd_config.exists() {
        return Ok(cwd_config);
    }

    Err("No configuration found. Create custodian.toml or pass --config <path>".to_string())
}

async fn run_sweep_command(explicit_config_path: Option<&str>, dry_run: bool) {
    let config_path = match resolve_config_path(explicit_config_path) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut config = match config::CustodianConfig::from_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "Failed to load config from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(1);
        }
    };

    // The flag wins over the config file, never the other way around.
    if dry_run {
        config.retention.dry_run = true;
    }

    observability::init_tracing(&config.observability).expect("Failed to initialize tracing");

    tracing::info!(
        config_file = %config_path.display(),
        dry_run = config.retention.dry_run,
        "Starting retention sweep"
    );

    if config.database.is_none() {
        eprintln!("Error: Database is not configured.");
        std::process::exit(1);
    }

    let secret_manager = secrets::create_secret_manager(&config.secrets);

    // Verify connectivity on startup
    if let Some(manager) = &secret_manager
        && let Err(e) = manager.health_check().await
    {
        eprintln!("Error: Secrets backend health check failed: {}", e);
        std::process::exit(1);
    }

    let helpdesk_key = match secrets::resolve_api_key(
        config.helpdesk.api_key.as_deref(),
        config.helpdesk.api_key_secret.as_deref(),
        secret_manager.as_ref(),
    )
    .await
    {
        Ok(Some(key)) => key,
        Ok(None) => {
            eprintln!("Error: No helpdesk API key configured.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: Failed to resolve helpdesk API key: {}", e);
            std::process::exit(1);
        }
    };

    let queue_key = match secrets::resolve_api_key(
        config.queue.api_key.as_deref(),
        config.queue.api_key_secret.as_deref(),
        secret_manager.as_ref(),
    )
    .await
    {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Error: Failed to resolve queue API key: {}", e);
            std::process::exit(1);
        }
    };

    let db = match db::DbPool::from_config(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db.health_check().await {
        tracing::error!(error = %e, "Database health check failed");
        eprintln!("Error: Database health check failed: {}", e);
        std::process::exit(1);
    }

    if config.database.migrate_on_start()
        && let Err(e) = db.run_migrations().await
    {
        tracing::error!(error = %e, "Database migrations failed");
        eprintln!("Error: Database migrations failed: {}", e);
        std::process::exit(1);
    }

    let http_client = reqwest::Client::new();
    let helpdesk_client =
        helpdesk::HelpdeskClient::from_config(&config.helpdesk, http_client.clone(), helpdesk_key);
    let work_queue = queue::create_work_queue(&config.queue, http_client, queue_key);

    match retention::run_sweep(&db, &helpdesk_client, work_queue.as_ref(), &config).await {
        Ok(result) => {
            tracing::info!(
                candidates = result.candidates,
                resolved = result.resolved,
                expired = result.expired,
                folder_items = result.folder_items,
                archive_items = result.archive_items,
                enqueue_failures = result.enqueue_failures,
                folder_flags_set = result.folder_flags_set,
                archive_flags_set = result.archive_flags_set,
                duration_ms = result.duration_ms,
                dry_run = config.retention.dry_run,
                "Retention sweep complete"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Retention sweep failed");
            eprintln!("Error: Retention sweep failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_migrate(explicit_config_path: Option<&str>) {
    let config_path = match resolve_config_path(explicit_config_path) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = match config::CustodianConfig::from_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "Failed to load config from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(1);
        }
    };

    observability::init_tracing(&config.observability).expect("Failed to initialize tracing");

    tracing::info!(
        config_file = %config_path.display(),
        "Running database migrations"
    );

    if config.database.is_none() {
        eprintln!("Error: Database is not configured. Nothing to migrate.");
        std::process::exit(1);
    }

    match db::DbPool::from_config(&config.database).await {
        Ok(pool) => match pool.run_migrations().await {
            Ok(()) => {
                tracing::info!("Database migrations completed successfully");
                std::process::exit(0);
            }
            Err(e) => {
                tracing::error!(error = %e, "Database migrations failed");
                eprintln!("Error: Database migrations failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            eprintln!("Error: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    }
}

/// Validate the config file and print a summary. Secret values are never
/// printed, only which backends and options are in effect.
fn run_config_check(explicit_config_path: Option<&str>) {
    let config_path = match resolve_config_path(explicit_config_path) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match config::CustodianConfig::from_file(&config_path) {
        Ok(config) => {
            println!("Configuration OK: {}", config_path.display());
            println!("  database:          {}", config.database.backend_name());
            println!("  retention window:  {} days", config.retention.window_days);
            println!(
                "  completion marker: {}",
                if config.helpdesk.require_completion_marker {
                    "required"
                } else {
                    "not required"
                }
            );
            println!(
                "  snapshot mode:     {}",
                config.retention.snapshot.mode.as_str()
            );
            println!("  dry run:           {}", config.retention.dry_run);
        }
        Err(e) => {
            eprintln!("Configuration error in {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    }
}
