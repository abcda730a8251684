//! CLI binary for quotemate.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `ServerConfig` and runs the server.

use anyhow::{Context, Result};
use clap::Parser;
use quotemate::{OpenAiCompletionClient, QuoteServer, ServerConfig};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default port with a key from the environment
  OPENAI_API_KEY=sk-... quotemate

  # Different model and port, keep uploads for debugging
  quotemate --model gpt-4.1 --port 3000 --keep-uploads

ENVIRONMENT:
  OPENAI_API_KEY   Completion credential. The server starts without it,
                   but every quote check is refused until it is set.
  RUST_LOG         Overrides the log filter (e.g. quotemate=debug,tower_http=debug)
"#;

/// Check Australian tradie quotes with a language model.
#[derive(Parser, Debug)]
#[command(
    name = "quotemate",
    version,
    about = "Web service that reviews tradie quotes with a language model",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// OpenAI API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Listening port.
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Bind address.
    #[arg(long, env = "QUOTEMATE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Completion model ID.
    #[arg(long, env = "QUOTEMATE_MODEL", default_value = quotemate::config::DEFAULT_MODEL)]
    model: String,

    /// Chat completions API base URL (OpenAI-compatible).
    #[arg(long, env = "OPENAI_BASE_URL", default_value = quotemate::config::DEFAULT_API_BASE)]
    api_base: String,

    /// Directory where uploaded PDFs are staged.
    #[arg(long, env = "QUOTEMATE_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Maximum request body size in bytes.
    #[arg(long, env = "QUOTEMATE_MAX_BODY_BYTES",
          default_value_t = quotemate::config::DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    /// Keep staged PDFs after their text has been read.
    #[arg(long, env = "QUOTEMATE_KEEP_UPLOADS")]
    keep_uploads: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "QUOTEMATE_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "quotemate=debug,tower_http=debug"
    } else {
        "quotemate=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Configuration ────────────────────────────────────────────────────
    let config = ServerConfig::builder()
        .api_key(cli.api_key)
        .host(cli.host)
        .port(cli.port)
        .model(cli.model)
        .api_base(cli.api_base)
        .upload_dir(cli.upload_dir)
        .max_body_bytes(cli.max_body_bytes)
        .keep_uploads(cli.keep_uploads)
        .build()
        .context("Invalid configuration")?;

    tracing::info!("Configuration loaded: {:?}", config);

    // ── Serve ────────────────────────────────────────────────────────────
    let client = Arc::new(
        OpenAiCompletionClient::new(config.model.clone()).with_api_base(config.api_base.clone()),
    );
    let server = QuoteServer::new(config, client)
        .await
        .context("Failed to prepare server")?;

    tracing::info!("Health: http://{}/health", server.address());

    server.start().await.context("Server stopped with an error")?;
    Ok(())
}
