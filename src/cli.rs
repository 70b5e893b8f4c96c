use clap::Parser;
use std::path::PathBuf;

/// c3-lsp: language server for C3
#[derive(Parser, Debug)]
#[command(name = "c3-lsp", version)]
#[command(about = "Language server for the C3 programming language, speaking LSP over stdio", long_about = None)]
pub struct Cli {
    /// Load the stdlib of this language version
    #[arg(long)]
    pub lang_version: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_path: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Send crash reports
    #[arg(long, default_value_t = false)]
    pub send_crash_reports: bool,
}

impl Cli {
    /// Parse CLI arguments from the environment
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cli = Cli::try_parse_from(["c3-lsp"]).unwrap();
        assert_eq!(cli.lang_version, None);
        assert_eq!(cli.log_path, None);
        assert!(!cli.debug);
        assert!(!cli.send_crash_reports);
    }

    #[test]
    fn test_all_overrides() {
        let cli = Cli::try_parse_from([
            "c3-lsp",
            "--lang-version",
            "0.6.8",
            "--log-path",
            "/tmp/c3-lsp.log",
            "--debug",
            "--send-crash-reports",
        ])
        .unwrap();
        assert_eq!(cli.lang_version.as_deref(), Some("0.6.8"));
        assert_eq!(cli.log_path, Some(PathBuf::from("/tmp/c3-lsp.log")));
        assert!(cli.debug);
        assert!(cli.send_crash_reports);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["c3-lsp", "--port", "1"]).is_err());
    }
}
