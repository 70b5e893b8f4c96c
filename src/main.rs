//! c3-lsp binary: parses the command line, sets up logging and serves LSP
//! over stdio.

mod cli;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use c3lsp::server::{self, ServerOptions};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Log to `log_path` or stderr. Stdout carries JSON-RPC.
fn init_tracing(debug: bool, log_path: Option<&Path>) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let file = log_path.map(|path| (path, File::create(path)));
    match file {
        Some((_, Ok(file))) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        Some((path, Err(e))) => {
            builder.with_writer(std::io::stderr).init();
            warn!(path = %path.display(), error = %e, "cannot open log file; logging to stderr");
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.debug, cli.log_path.as_deref());

    if cli.send_crash_reports {
        info!("crash reporting requested; no reporter is configured, reports stay local");
    }

    server::run(ServerOptions {
        lang_version: cli.lang_version,
        send_crash_reports: cli.send_crash_reports,
    })
    .await;
}
