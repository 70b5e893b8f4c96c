//! Debounced compiler diagnostics.
//!
//! Each trigger cancels the run scheduled before it, waits out the
//! configured delay and then runs the compiler over the whole workspace.
//! Results replace the previous round; documents that no longer have
//! problems get an empty publish.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tower_lsp::Client;
use tower_lsp::lsp_types::{Diagnostic, MessageType, Url};
use tracing::{debug, warn};

use super::compiler;
use super::convert;
use crate::base::DocId;
use crate::project::{DiagnosticsError, ProjectState, Settings, parse_compiler_output};

#[derive(Debug, Default)]
pub struct DiagnosticsWorker {
    pending: Mutex<Option<CancellationToken>>,
    /// Set once the compiler proved unable to report diagnostics.
    disabled: AtomicBool,
}

impl DiagnosticsWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Cancel whatever is scheduled.
    pub fn cancel(&self) {
        if let Some(token) = self.pending.lock().take() {
            token.cancel();
        }
    }

    /// Schedule a run after `settings.diagnostics.delay`.
    pub fn schedule(self: &Arc<Self>, client: Client, state: Arc<RwLock<ProjectState>>, settings: &Settings) {
        if !settings.diagnostics.enabled || self.is_disabled() {
            return;
        }
        let Some(root) = state.read().root().map(|p| p.to_path_buf()) else {
            debug!("no workspace root; skipping diagnostics");
            return;
        };

        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().replace(token.clone()) {
            previous.cancel();
        }

        let worker = Arc::clone(self);
        let delay = Duration::from_millis(settings.diagnostics.delay);
        let binary = settings.c3.binary();
        let args = settings.c3.compile_args.clone();

        tokio::spawn(async move {
            let run = async {
                tokio::time::sleep(delay).await;
                compiler::build_for_diagnostics(&binary, &args, &root).await
            };
            let stderr = tokio::select! {
                _ = token.cancelled() => return,
                stderr = run => stderr,
            };

            let published = match stderr.and_then(|stderr| parse_compiler_output(&stderr)) {
                Ok(report) => {
                    let fresh = report.by_document(&root);
                    let mut state = state.write();
                    let mut out = to_lsp(&state, fresh.iter().map(|(id, d)| (id, d.as_slice())));
                    let cleared = state.replace_diagnostics(fresh);
                    out.extend(cleared.iter().filter_map(|id| Some((convert::url(id)?, Vec::new()))));
                    out
                }
                Err(DiagnosticsError::UnusableOutput) => {
                    if !worker.disabled.swap(true, Ordering::Relaxed) {
                        warn!("compiler output has no LSPERR lines; disabling diagnostics");
                        client
                            .show_message(
                                MessageType::WARNING,
                                "c3c does not report diagnostics in LSP format; diagnostics are disabled for this session.",
                            )
                            .await;
                    }
                    let cleared = state.write().clear_diagnostics();
                    cleared
                        .iter()
                        .filter_map(|id| Some((convert::url(id)?, Vec::new())))
                        .collect()
                }
                Err(e) => {
                    warn!(error = %e, "diagnostics run failed");
                    return;
                }
            };

            for (uri, diagnostics) in published {
                client.publish_diagnostics(uri, diagnostics, None).await;
            }
        });
    }
}

/// Protocol diagnostics for each document, with ranges fitted to the
/// document's current text when it is loaded.
fn to_lsp<'a>(
    state: &ProjectState,
    grouped: impl Iterator<Item = (&'a DocId, &'a [crate::project::CompilerDiagnostic])>,
) -> Vec<(Url, Vec<Diagnostic>)> {
    grouped
        .filter_map(|(doc_id, diagnostics)| {
            let uri = convert::url(doc_id)?;
            let document = state.document(doc_id);
            let converted = diagnostics
                .iter()
                .map(|d| {
                    let line = document.and_then(|doc| doc.line_index().line_text(doc.text(), d.line));
                    convert::diagnostic(d, line)
                })
                .collect();
            Some((uri, converted))
        })
        .collect()
}
