//! The `LanguageServer` implementation.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::request::{
    GotoDeclarationParams, GotoDeclarationResponse, GotoImplementationParams, GotoImplementationResponse,
};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, info, warn};

use super::ServerOptions;
use super::compiler;
use super::convert;
use super::diagnostics::DiagnosticsWorker;
use crate::project::stdlib_loader::cache::default_cache_dir;
use crate::project::workspace_loader::{is_source_path, path_for_doc_id};
use crate::project::{ProjectState, Settings, WorkspaceLoader};
use crate::search;

const SOURCE_GLOB: &str = "**/*.{c3,c3i}";

pub struct Backend {
    client: Client,
    state: Arc<RwLock<ProjectState>>,
    settings: RwLock<Settings>,
    /// Version reported by `c3c --version`.
    detected_version: RwLock<Option<String>>,
    diagnostics: Arc<DiagnosticsWorker>,
    options: ServerOptions,
}

impl Backend {
    pub fn new(client: Client, options: ServerOptions) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(ProjectState::new())),
            settings: RwLock::new(Settings::default()),
            detected_version: RwLock::new(None),
            diagnostics: Arc::new(DiagnosticsWorker::new()),
            options,
        }
    }

    /// The version to load: command line, then settings, then compiler.
    fn language_version(&self) -> String {
        if let Some(version) = &self.options.lang_version {
            return version.clone();
        }
        let detected = self.detected_version.read().clone();
        self.settings.read().language_version(detected.as_deref())
    }

    /// Load the stdlib for the current version, off the async runtime.
    ///
    /// Queries wait on the state lock until it is registered.
    async fn load_stdlib(&self) {
        let version = self.language_version();
        let stdlib_root = self.settings.read().c3.stdlib_root();
        let state = Arc::clone(&self.state);
        let task = tokio::task::spawn_blocking(move || {
            state
                .write()
                .set_language_version(&version, stdlib_root.as_deref(), default_cache_dir().as_deref());
        });
        if let Err(e) = task.await {
            warn!(error = %e, "stdlib loading panicked");
        }
    }

    async fn index_workspace(&self) {
        let Some(root) = self.state.read().root().map(|p| p.to_path_buf()) else {
            return;
        };
        let state = Arc::clone(&self.state);
        let task = tokio::task::spawn_blocking(move || {
            let mut state = state.write();
            WorkspaceLoader::new().load_directory_into_state(&root, &mut state)
        });
        match task.await {
            Ok(Ok(())) => info!("workspace indexed"),
            Ok(Err(e)) => warn!("{e}"),
            Err(e) => warn!(error = %e, "workspace indexing panicked"),
        }
    }

    async fn register_file_watcher(&self) {
        let options = DidChangeWatchedFilesRegistrationOptions {
            watchers: vec![FileSystemWatcher {
                glob_pattern: GlobPattern::String(SOURCE_GLOB.to_string()),
                kind: None,
            }],
        };
        let registration = Registration {
            id: "c3-source-watcher".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: serde_json::to_value(options).ok(),
        };
        if let Err(e) = self.client.register_capability(vec![registration]).await {
            debug!(error = %e, "client refused file watcher registration");
        }
    }

    fn schedule_diagnostics(&self) {
        let settings = self.settings.read().clone();
        self.diagnostics
            .schedule(self.client.clone(), Arc::clone(&self.state), &settings);
    }

    async fn clear_published_diagnostics(&self) {
        let cleared = self.state.write().clear_diagnostics();
        for uri in cleared.iter().filter_map(convert::url) {
            self.client.publish_diagnostics(uri, Vec::new(), None).await;
        }
    }

    fn apply_settings(&self, value: &Value) -> bool {
        match self.settings.write().apply_change(value) {
            Ok(changed) => changed,
            Err(e) => {
                warn!(error = %e, "ignoring invalid settings");
                false
            }
        }
    }
}

fn file_operation_filters() -> FileOperationRegistrationOptions {
    FileOperationRegistrationOptions {
        filters: vec![
            FileOperationFilter {
                scheme: Some("file".to_string()),
                pattern: FileOperationPattern {
                    glob: SOURCE_GLOB.to_string(),
                    matches: Some(FileOperationPatternKind::File),
                    options: None,
                },
            },
            FileOperationFilter {
                scheme: Some("file".to_string()),
                pattern: FileOperationPattern {
                    glob: "**/*".to_string(),
                    matches: Some(FileOperationPatternKind::Folder),
                    options: None,
                },
            },
        ],
    }
}

fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    #[allow(deprecated)]
    let root_uri = params.root_uri.as_ref();
    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| &folder.uri)
        .or(root_uri)
        .and_then(|uri| uri.to_file_path().ok())
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(root) = workspace_root(&params) {
            let mut settings = self.settings.write();
            if let Err(e) = settings.load_workspace_file(&root) {
                warn!(error = %e, "using default settings");
            }
            info!(root = %root.display(), "workspace root");
            self.state.write().set_root(root);
        }
        if let Some(options) = &params.initialization_options {
            self.apply_settings(options);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                    ..Default::default()
                })),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![".".to_string(), ":".to_string()]),
                    ..Default::default()
                }),
                signature_help_provider: Some(SignatureHelpOptions {
                    trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
                    retrigger_characters: Some(vec![")".to_string()]),
                    work_done_progress_options: Default::default(),
                }),
                declaration_provider: Some(DeclarationCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                implementation_provider: Some(ImplementationProviderCapability::Simple(true)),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: None,
                    file_operations: Some(WorkspaceFileOperationsServerCapabilities {
                        did_delete: Some(file_operation_filters()),
                        did_rename: Some(file_operation_filters()),
                        ..Default::default()
                    }),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "c3-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let needs_detection = self.options.lang_version.is_none() && self.settings.read().c3.version.is_none();
        if needs_detection {
            let binary = self.settings.read().c3.binary();
            let detected = compiler::detect_version(&binary).await;
            *self.detected_version.write() = detected;
        }
        self.load_stdlib().await;
        self.index_workspace().await;
        self.register_file_watcher().await;
        info!(version = %self.language_version(), "server ready");
    }

    async fn shutdown(&self) -> Result<()> {
        self.diagnostics.cancel();
        Ok(())
    }

    // ========================================================================
    // DOCUMENT SYNC
    // ========================================================================

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        if document.language_id != "c3" {
            debug!(uri = %document.uri, language = %document.language_id, "ignoring non-C3 document");
            return;
        }
        self.state
            .write()
            .open_document(convert::doc_id(&document.uri), document.text, document.version);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let doc_id = convert::doc_id(&params.text_document.uri);
        let changes: Vec<_> = params
            .content_changes
            .into_iter()
            .map(convert::content_change)
            .collect();
        self.state
            .write()
            .update_document(&doc_id, &changes, params.text_document.version);
        self.schedule_diagnostics();
    }

    async fn did_save(&self, _: DidSaveTextDocumentParams) {
        self.schedule_diagnostics();
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.state
            .write()
            .close_document(&convert::doc_id(&params.text_document.uri));
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    async fn goto_declaration(&self, params: GotoDeclarationParams) -> Result<Option<GotoDeclarationResponse>> {
        let position = params.text_document_position_params;
        let doc_id = convert::doc_id(&position.text_document.uri);
        let state = self.state.read();
        let found = search::find_declaration(&state, &doc_id, convert::position(position.position));
        Ok(found
            .as_ref()
            .and_then(convert::location)
            .map(GotoDeclarationResponse::Scalar))
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params;
        let doc_id = convert::doc_id(&position.text_document.uri);
        let state = self.state.read();
        let found = search::find_declaration(&state, &doc_id, convert::position(position.position));
        Ok(found
            .as_ref()
            .and_then(convert::location)
            .map(GotoDefinitionResponse::Scalar))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params;
        let doc_id = convert::doc_id(&position.text_document.uri);
        let state = self.state.read();
        Ok(search::hover(&state, &doc_id, convert::position(position.position)).map(convert::hover))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let doc_id = convert::doc_id(&position.text_document.uri);
        let items: Vec<CompletionItem> = {
            let state = self.state.read();
            search::completions(&state, &doc_id, convert::position(position.position))
                .into_iter()
                .map(convert::completion_item)
                .collect()
        };
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let position = params.text_document_position_params;
        let doc_id = convert::doc_id(&position.text_document.uri);
        let state = self.state.read();
        Ok(search::signature_help(&state, &doc_id, convert::position(position.position)).map(convert::signature_help))
    }

    async fn goto_implementation(
        &self,
        params: GotoImplementationParams,
    ) -> Result<Option<GotoImplementationResponse>> {
        let position = params.text_document_position_params;
        let doc_id = convert::doc_id(&position.text_document.uri);
        let state = self.state.read();
        let locations: Vec<Location> = search::find_implementations(&state, &doc_id, convert::position(position.position))
            .iter()
            .filter_map(convert::location)
            .collect();
        Ok(Some(GotoImplementationResponse::Array(locations)))
    }

    // ========================================================================
    // WORKSPACE
    // ========================================================================

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let loader = WorkspaceLoader::new();
        for event in params.changes {
            let doc_id = convert::doc_id(&event.uri);
            match event.typ {
                FileChangeType::DELETED => self.state.write().delete_document(&doc_id),
                _ => {
                    let Some(path) = path_for_doc_id(&doc_id).filter(|p| is_source_path(p)) else {
                        continue;
                    };
                    if let Err(e) = loader.load_file_into_state(&path, &mut self.state.write()) {
                        warn!("{e}");
                    }
                }
            }
        }
    }

    async fn did_delete_files(&self, params: DeleteFilesParams) {
        let mut state = self.state.write();
        for file in params.files {
            let deleted = state.delete_under(&file.uri);
            debug!(uri = %file.uri, documents = deleted.len(), "deleted files");
        }
    }

    async fn did_rename_files(&self, params: RenameFilesParams) {
        let mut state = self.state.write();
        for file in params.files {
            state.rename_under(&file.old_uri, &file.new_uri);
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        if !self.apply_settings(&params.settings) {
            return;
        }
        info!("settings changed; reloading stdlib");
        if !self.settings.read().diagnostics.enabled {
            self.diagnostics.cancel();
            self.clear_published_diagnostics().await;
        }
        self.load_stdlib().await;
    }
}
