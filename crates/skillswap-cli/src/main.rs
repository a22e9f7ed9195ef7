//! skillswap CLI
//!
//! Runs the HTTP API and offers a few operator commands against the same
//! database:
//! - server: serve the JSON API
//! - search / requests: query the directory and a member's requests
//! - propose / respond: create and move swap requests
//! - seed: load demonstration fixtures
//! - paths / validate / config: inspect the installation

mod paths;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paths::{paths_from_env, PathsConfig, SwapPaths};
use serde::{Deserialize, Serialize};
use skillswap_api::{AppState, ServerConfig};
use skillswap_core::fixtures::Fixtures;
use skillswap_core::persistence::SqliteStore;
use skillswap_core::{AvailabilityFilter, ProfileId, RequestId, StatusFilter, SwapAction};
use skillswap_directory::{DirectoryConfig, DirectoryQuery, ProfileDirectory};
use skillswap_ledger::{Direction, NewSwapRequest, RequestQueryService, SwapRequestLedger};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "skillswap")]
#[command(about = "skillswap - trade what you know for what you want to learn", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults to system config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory (overrides config and system default)
    #[arg(long, env = "SKILLSWAP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Database path (overrides config)
    #[arg(long, env = "SKILLSWAP_DATABASE_PATH")]
    database: Option<PathBuf>,

    /// Log level (overrides config; RUST_LOG wins over both)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Server {
        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Search the public directory
    Search {
        /// Text matched against names and skills
        query: Option<String>,

        /// Weekends, Evenings, Weekdays, Flexible or all
        #[arg(short, long, default_value = "all")]
        availability: String,

        #[arg(short, long, default_value_t = 1)]
        page: usize,

        #[arg(long)]
        page_size: Option<usize>,

        #[arg(short, long)]
        json: bool,
    },

    /// List a member's swap requests
    Requests {
        /// Member viewing their requests
        viewer: String,

        /// incoming, outgoing or all
        #[arg(short, long, default_value = "all")]
        direction: String,

        /// pending, accepted, completed, declined, cancelled or all
        #[arg(short, long, default_value = "all")]
        status: String,

        #[arg(short, long)]
        json: bool,
    },

    /// Propose a swap to another member
    Propose {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Skill the requester offers
        #[arg(long)]
        offer: String,

        /// Skill the recipient wants
        #[arg(long)]
        want: String,

        #[arg(short, long)]
        message: Option<String>,
    },

    /// Accept, decline, complete or cancel a request
    Respond {
        id: String,

        action: String,

        /// Member performing the action
        #[arg(long)]
        actor: String,
    },

    /// Load seed fixtures into the database
    Seed {
        /// Fixture file (defaults to the configured fixtures path)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show system paths
    Paths,

    /// Validate configuration and database access
    Validate,

    /// Print the effective configuration
    Config,
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Config {
    #[serde(default)]
    server: ServerConfig,

    #[serde(default)]
    directory: DirectoryConfig,

    #[serde(default)]
    logging: LoggingConfig,

    #[serde(default)]
    paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    #[serde(default = "default_log_level")]
    level: String,

    #[serde(default)]
    json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Logs go to stderr so command output on stdout stays clean
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Layer the YAML file (if present) under `SKILLSWAP__SECTION__KEY` variables
fn load_config(path: &std::path::Path) -> Result<Config> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("SKILLSWAP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

    settings
        .try_deserialize()
        .context("Invalid configuration")
}

/// Resolve paths with precedence: CLI args > env vars > config > system defaults
fn resolve_paths(cli: &Cli, config: &Config) -> Result<SwapPaths> {
    let mut paths = SwapPaths::new()?;
    paths = config.paths.apply_to(paths);
    paths = paths_from_env().apply_to(paths);

    let flags = PathsConfig {
        data_dir: cli.data_dir.clone(),
        database_path: cli.database.clone(),
        ..Default::default()
    };
    paths = flags.apply_to(paths);

    paths.ensure_directories()?;
    Ok(paths)
}

/// Open the database and hydrate the directory snapshot
async fn open_directory(
    config: &Config,
    paths: &SwapPaths,
) -> Result<(Arc<SqliteStore>, Arc<ProfileDirectory>)> {
    let store = Arc::new(
        SqliteStore::open(&paths.database_path)
            .await
            .with_context(|| format!("Failed to open {}", paths.database_path.display()))?,
    );
    let directory = Arc::new(ProfileDirectory::new(
        store.clone(),
        config.directory.clone(),
    ));
    directory.restore().await?;
    Ok((store, directory))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(ref path) => path.clone(),
        None => {
            let sys_config = SwapPaths::new()?.default_config_file();
            if sys_config.exists() {
                sys_config
            } else {
                PathBuf::from("config.yaml")
            }
        }
    };

    let mut config = load_config(&config_path)?;
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    config.logging.json |= cli.log_json;

    init_logging(&config.logging);
    info!("Using config file: {}", config_path.display());

    let paths = resolve_paths(&cli, &config)?;

    match cli.command {
        Commands::Server { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }

            let (store, directory) = open_directory(&config, &paths).await?;
            let state = AppState::new(directory, store);
            let app = skillswap_api::router(state, &config.server)?;

            let listener = tokio::net::TcpListener::bind(&config.server.bind)
                .await
                .with_context(|| format!("Failed to bind {}", config.server.bind))?;
            info!("HTTP server listening on {}", config.server.bind);
            eprintln!("skillswap v{}", env!("CARGO_PKG_VERSION"));
            eprintln!("API: http://{}/api", config.server.bind);
            eprintln!("Database: {}", paths.database_path.display());

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for shutdown signal: {}", e);
                    }
                    info!("Shutting down...");
                })
                .await?;
        }

        Commands::Search {
            query,
            availability,
            page,
            page_size,
            json,
        } => {
            let (_store, directory) = open_directory(&config, &paths).await?;
            let availability: AvailabilityFilter = availability.parse()?;

            let results = directory.search(&DirectoryQuery {
                text: query.unwrap_or_default(),
                availability,
                page,
                page_size,
            });

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                println!(
                    "{} matches, page {} of {}\n",
                    results.total_matches, results.page, results.total_pages
                );
                for profile in &results.items {
                    println!(
                        "{} ({}) - {}, {}",
                        profile.name, profile.id, profile.location, profile.availability
                    );
                    println!("   Offers: {}", profile.skills_offered.as_slice().join(", "));
                    println!("   Wants:  {}", profile.skills_wanted.as_slice().join(", "));
                }
                let window = results.window();
                if !window.is_empty() {
                    let labels: Vec<String> = window.iter().map(|l| l.to_string()).collect();
                    println!("\nPages: {}", labels.join(" "));
                }
            }
        }

        Commands::Requests {
            viewer,
            direction,
            status,
            json,
        } => {
            let store = SqliteStore::open(&paths.database_path).await?;
            let queries = RequestQueryService::new(Arc::new(store));
            let direction: Direction = direction.parse()?;
            let status: StatusFilter = status.parse()?;

            let listing = queries
                .list(&ProfileId::from(viewer.as_str()), direction, status)
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                let c = &listing.counts;
                println!(
                    "pending {} | accepted {} | completed {} | declined {} | cancelled {}\n",
                    c.pending, c.accepted, c.completed, c.declined, c.cancelled
                );
                for request in &listing.items {
                    let side = if request.recipient_id.as_str() == viewer {
                        format!("from {}", request.requester_id)
                    } else {
                        format!("to {}", request.recipient_id)
                    };
                    println!(
                        "[{}] {} {}: {} for {}",
                        request.status, request.id, side, request.offered_skill, request.wanted_skill
                    );
                }
            }
        }

        Commands::Propose {
            from,
            to,
            offer,
            want,
            message,
        } => {
            let (store, directory) = open_directory(&config, &paths).await?;
            let ledger = SwapRequestLedger::new(directory, store);

            let request = ledger
                .create(NewSwapRequest {
                    requester_id: ProfileId::from(from),
                    recipient_id: ProfileId::from(to),
                    offered_skill: offer,
                    wanted_skill: want,
                    message,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }

        Commands::Respond { id, action, actor } => {
            let action: SwapAction = action.parse()?;
            let (store, directory) = open_directory(&config, &paths).await?;
            let ledger = SwapRequestLedger::new(directory, store);

            let request = ledger
                .transition(&RequestId::from(id), &ProfileId::from(actor), action)
                .await?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }

        Commands::Seed { file } => {
            let file = file.unwrap_or_else(|| paths.fixtures_path.clone());
            let fixtures = Fixtures::load(&file)
                .with_context(|| format!("Failed to load fixtures from {}", file.display()))?;

            let store = SqliteStore::open(&paths.database_path).await?;
            fixtures.apply(&store, &store).await?;

            let stats = store.stats().await?;
            eprintln!("Seeded {} into {}", file.display(), paths.database_path.display());
            eprintln!(
                "  Profiles: {} ({} public)",
                stats.total_profiles, stats.public_profiles
            );
            eprintln!(
                "  Requests: {} ({} pending)",
                stats.total_requests, stats.pending_requests
            );
        }

        Commands::Paths => {
            eprintln!("{}", paths.display());
            eprintln!("\nEnvironment variables for overrides:");
            eprintln!("  SKILLSWAP_DATA_DIR       - Override data directory");
            eprintln!("  SKILLSWAP_CONFIG_DIR     - Override config directory");
            eprintln!("  SKILLSWAP_DATABASE_PATH  - Override database path");
            eprintln!("  SKILLSWAP_FIXTURES_PATH  - Override seed fixtures");
            eprintln!("  SKILLSWAP__SECTION__KEY  - Override any config value");
        }

        Commands::Validate => {
            eprintln!("Validating skillswap configuration...\n");

            eprintln!("✓ Server");
            eprintln!("  Bind: {}", config.server.bind);
            eprintln!("  CORS origin: {}", config.server.cors_origin);
            config
                .server
                .bind
                .parse::<std::net::SocketAddr>()
                .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;

            if config.directory.page_size == 0 || config.directory.max_page_size == 0 {
                anyhow::bail!("directory page sizes must be at least 1");
            }
            eprintln!("\n✓ Directory");
            eprintln!(
                "  Page size: {} (max {})",
                config.directory.page_size, config.directory.max_page_size
            );

            let store = SqliteStore::open(&paths.database_path).await?;
            let stats = store.stats().await?;
            eprintln!("\n✓ Database: {}", paths.database_path.display());
            eprintln!(
                "  {} profiles, {} requests",
                stats.total_profiles, stats.total_requests
            );

            eprintln!("\n✓ Configuration is valid");
        }

        Commands::Config => {
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("missing.yaml")).unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:5000");
        assert_eq!(config.directory.page_size, 6);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_yaml_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "server:\n  bind: 0.0.0.0:8080\ndirectory:\n  page_size: 12\nlogging:\n  json: true\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.cors_origin, "http://localhost:3000");
        assert_eq!(config.directory.page_size, 12);
        assert_eq!(config.directory.max_page_size, 50);
        assert!(config.logging.json);
    }

    #[test]
    fn test_cli_parses_commands() {
        let cli = Cli::try_parse_from([
            "skillswap",
            "--log-json",
            "requests",
            "marc",
            "--direction",
            "incoming",
            "--status",
            "pending",
        ])
        .unwrap();
        assert!(cli.log_json);
        assert!(matches!(cli.command, Commands::Requests { ref viewer, .. } if viewer == "marc"));

        let cli = Cli::try_parse_from(["skillswap", "respond", "r1", "accept", "--actor", "joe"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Respond { .. }));
    }
}
