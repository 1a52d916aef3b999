//! LanPaste — entry point.
//!
//! Starts the local sync engine and drives it from a line-based console, so
//! the engine can be used (and tried out) without a graphical front-end.
//!
//! # Usage
//!
//! ```text
//! lanpaste [OPTIONS]
//!
//! Options:
//!   --config         <FILE>  Config file [default: platform config dir]
//!   --port           <PORT>  HTTP listener port [default: 2234]
//!   --bind           <IP>    Interface to bind [default: 0.0.0.0]
//!   --template       <FILE>  HTML page template
//!   --queue-capacity <N>     Inbound queue capacity [default: 64]
//! ```
//!
//! Command-line values (or their environment variables) override the config
//! file, which overrides the built-in defaults.
//!
//! | Variable                  | Overrides          |
//! |---------------------------|--------------------|
//! | `LANPASTE_CONFIG`         | `--config`         |
//! | `LANPASTE_PORT`           | `--port`           |
//! | `LANPASTE_BIND`           | `--bind`           |
//! | `LANPASTE_TEMPLATE`       | `--template`       |
//! | `LANPASTE_QUEUE_CAPACITY` | `--queue-capacity` |
//!
//! # Console commands
//!
//! ```text
//! send <text>   publish <text> for peers to fetch from /content
//! accept        take the oldest text peers have submitted
//! paste         read the local clipboard
//! status        show server state and queue length
//! quit          stop the server and exit (Ctrl+C works too)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lanpaste_core::{SourceTag, SyncEvent};
use lanpaste_host::infrastructure::clipboard::SystemClipboard;
use lanpaste_host::infrastructure::storage::config::{load_config, load_config_from, AppConfig};
use lanpaste_host::SyncFacade;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// LanPaste: share text with any browser on the local network.
#[derive(Debug, Parser)]
#[command(name = "lanpaste", about = "Share text with browsers on the local network", version)]
struct Cli {
    /// Config file to read instead of the platform default.
    #[arg(long, env = "LANPASTE_CONFIG")]
    config: Option<PathBuf>,

    /// TCP port for the HTTP listener.
    #[arg(long, env = "LANPASTE_PORT")]
    port: Option<u16>,

    /// IP address to bind.
    ///
    /// `0.0.0.0` accepts connections from the whole LAN, `127.0.0.1` only
    /// from this machine.
    #[arg(long, env = "LANPASTE_BIND")]
    bind: Option<String>,

    /// HTML template served on `GET /`.
    #[arg(long, env = "LANPASTE_TEMPLATE")]
    template: Option<PathBuf>,

    /// Items kept in the inbound queue before the oldest is dropped.
    #[arg(long, env = "LANPASTE_QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,
}

impl Cli {
    /// Loads the config file this invocation points at.
    fn load_app_config(&self) -> anyhow::Result<AppConfig> {
        match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => load_config().context("failed to load config"),
        }
    }

    /// Overlays command-line values onto `config`.
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(bind) = &self.bind {
            config.server.bind_address = bind.clone();
        }
        if let Some(template) = &self.template {
            config.server.template_path = template.clone();
        }
        if let Some(capacity) = self.queue_capacity {
            config.server.queue_capacity = capacity;
        }
    }
}

// ── Console commands ──────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Send(String),
    Accept,
    Paste,
    Status,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parses one console line.  `None` for a blank line.
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim_start()),
            None => (line, ""),
        };
        Some(match word {
            "send" => Self::Send(rest.to_string()),
            "accept" => Self::Accept,
            "paste" => Self::Paste,
            "status" => Self::Status,
            "quit" | "exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        })
    }
}

/// Runs one command.  Returns `false` when the console should exit.
fn execute(facade: &SyncFacade, command: Command) -> bool {
    match command {
        Command::Send(text) if text.is_empty() => println!("usage: send <text>"),
        Command::Send(text) => {
            facade.on_send_pressed(text);
        }
        Command::Accept => match facade.on_retrieve_pressed() {
            Some(item) => println!("{}", item.text),
            None => println!("nothing waiting"),
        },
        Command::Paste => {
            if let Err(e) = facade.paste_from_clipboard() {
                println!("paste failed: {e}");
            }
        }
        Command::Status => println!(
            "server {} | {}",
            facade.server_state(),
            facade.queue_info()
        ),
        Command::Quit => return false,
        Command::Unknown(word) => {
            println!("unknown command '{word}' (send, accept, paste, status, quit)")
        }
    }
    true
}

fn log_event(event: &SyncEvent) {
    match event.source {
        SourceTag::ServerInfo => info!("status: {}", event.text),
        SourceTag::Received => info!("accepted text ({} bytes)", event.text.len()),
        SourceTag::Sent => info!("published text ({} bytes)", event.text.len()),
        SourceTag::Clipboard => info!("clipboard: {}", event.text),
        SourceTag::Empty => {}
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut app_config = cli.load_app_config()?;
    cli.apply_overrides(&mut app_config);

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&app_config.app.log_level)),
        )
        .init();

    let server_config = app_config
        .to_server_config()
        .context("invalid configuration")?;

    info!(
        "LanPaste starting — bind={}, template={}",
        server_config.bind_addr(),
        server_config.template_path.display()
    );

    let facade = SyncFacade::new(server_config, Arc::new(SystemClipboard))
        .context("failed to create sync engine")?;
    facade
        .subscribe(log_event)
        .context("failed to attach event logger")?;

    let bound = match facade.init().await {
        Ok(bound) => bound,
        Err(e) => {
            error!("LanPaste could not start: {e}");
            facade.dispose().await;
            return Err(anyhow::Error::new(e).context("failed to start the sync listener"));
        }
    };
    println!("LanPaste is listening on {}", bound.url());

    // ── Console loop ──────────────────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    error!("failed to listen for Ctrl+C signal: {e}");
                }
                info!("received Ctrl+C — shutting down");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if let Some(command) = Command::parse(&line) {
                        if !execute(&facade, command) {
                            break;
                        }
                    }
                }
                // Detached from a terminal: keep serving until Ctrl+C.
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("stdin read failed: {e}; console disabled");
                    stdin_open = false;
                }
            }
        }
    }

    facade.dispose().await;
    info!("LanPaste stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
