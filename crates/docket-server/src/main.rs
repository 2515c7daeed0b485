//! Docket server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the portal API over HTTP.
//!
//! # Proxy secret hash generation
//!
//! To generate the argon2 PHC string for `proxy_secret_hash` in config.toml:
//!
//! ```
//! cargo run -p docket-server --bin server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use docket_server::{AppState, ServerConfig, seed};
use docket_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Docket judicial records portal")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a secret entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Load citizens and vehicles from a JSON file into the store and exit.
  #[arg(long, value_name = "FILE")]
  seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let secret = read_secret()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(secret.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 3000)?
    .set_default("store_path", "docket.sqlite3")?
    .set_default("entry_point", "/")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("DOCKET"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(path) = cli.seed {
    let file = seed::SeedFile::read(&path)
      .with_context(|| format!("failed to read seed file {path:?}"))?;
    seed::load(&store, file).await.context("failed to load seed")?;
    return Ok(());
  }

  if server_cfg.proxy_secret_hash.is_empty() {
    tracing::warn!("proxy_secret_hash is not set; every request will be redirected to the entry point");
  }

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState::new(Arc::new(store), server_cfg);
  let app = docket_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read one line from stdin.
fn read_secret() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Secret: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
