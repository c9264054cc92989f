use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use equipdesk::config::{ENV_DB_CONNECT_STRING, ENV_DB_PASSWORD, ENV_DB_USER};
use equipdesk::db::ConnectionProvider;
use equipdesk::{routes, AppState, Config};

const DEFAULT_CONFIG_PATH: &str = "./etc/equipdesk.toml";

fn print_usage() {
    println!("Usage: equipdesk [-config <path>] [-help]");
    println!();
    println!("  -config <path>  TOML configuration (default: {})", DEFAULT_CONFIG_PATH);
    println!("  -help, --help   Show this message");
    println!();
    println!(
        "{}, {} and {} override the [database] section; a .env file is read if present.",
        ENV_DB_USER, ENV_DB_PASSWORD, ENV_DB_CONNECT_STRING
    );
}

/// `None` means usage was requested
fn config_path_from_args(args: &[String]) -> Option<String> {
    if args.iter().any(|a| a == "-help" || a == "--help") {
        return None;
    }
    let path = args
        .windows(2)
        .find(|pair| pair[0] == "-config")
        .map(|pair| pair[1].clone())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    Some(path)
}

/// RUST_LOG wins over `[log] level`
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let Some(config_path) = config_path_from_args(&args) else {
        print_usage();
        return Ok(());
    };

    let dotenv = dotenvy::dotenv().ok();

    // Logging is configured from the file, so load it before anything logs
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}; falling back to defaults", config_path, e);
            Config::default()
        }
    }
    .with_env();

    init_tracing(&config);

    tracing::info!(config = %config_path, "equipdesk {} starting", env!("CARGO_PKG_VERSION"));
    if let Some(path) = dotenv {
        tracing::info!("environment read from {:?}", path);
    }
    tracing::warn!("user passwords are stored and compared in plain text");

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen address {:?}: {}", config.addr, e))?;

    let pool = ConnectionProvider::connect(&config.database)
        .await
        .map_err(|e| {
            tracing::error!("cannot open connection pool: {}", e);
            anyhow::anyhow!("cannot open connection pool: {}", e)
        })?;

    let app = routes::create_router(AppState::new(pool, config));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
