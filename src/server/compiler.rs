//! Running `c3c`.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::project::DiagnosticsError;
use crate::project::settings::parse_compiler_version;

/// `x.y.z` reported by `c3c --version`, if the binary runs.
pub async fn detect_version(binary: &Path) -> Option<String> {
    let output = Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| debug!(binary = %binary.display(), error = %e, "c3c --version failed"))
        .ok()?;
    let text = String::from_utf8_lossy(&output.stdout);
    let version = parse_compiler_version(&text);
    if let Some(version) = &version {
        info!(version, "detected compiler");
    }
    version
}

/// Run `c3c build --lsp <args>` in `root` and return its stderr.
///
/// The child is killed if the returned future is dropped.
pub async fn build_for_diagnostics(binary: &Path, args: &[String], root: &Path) -> Result<String, DiagnosticsError> {
    debug!(binary = %binary.display(), root = %root.display(), "running compiler for diagnostics");
    let output = Command::new(binary)
        .arg("build")
        .arg("--lsp")
        .args(args)
        .current_dir(root)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| DiagnosticsError::Spawn {
            binary: binary.to_path_buf(),
            source,
        })?;
    Ok(String::from_utf8_lossy(&output.stderr).into_owned())
}
