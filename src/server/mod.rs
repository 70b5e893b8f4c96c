//! Language Server Protocol front end.
//!
//! A thin layer: handlers convert protocol types, take the project lock,
//! call into [`crate::search`] or [`crate::project`] and convert back.
//! The lock is never held across an `.await`.

mod backend;
mod compiler;
mod convert;
mod diagnostics;

pub use backend::Backend;
pub use diagnostics::DiagnosticsWorker;

use tower_lsp::{LspService, Server};
use tracing::info;

/// Options fixed for the process lifetime, from the command line.
#[derive(Clone, Debug, Default)]
pub struct ServerOptions {
    /// Overrides every other source of the language version.
    pub lang_version: Option<String>,
    pub send_crash_reports: bool,
}

/// Serve over stdin/stdout until the client exits.
pub async fn run(options: ServerOptions) {
    info!(version = env!("CARGO_PKG_VERSION"), "starting c3-lsp");
    let (service, socket) = LspService::new(|client| Backend::new(client, options));
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}
