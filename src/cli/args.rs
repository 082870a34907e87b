//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::net::IpAddr;
use std::path::PathBuf;

/// Live viewer for local markdown and source files
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Files to track at startup
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// HTTP port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// WebSocket port number for live updates
    #[arg(long)]
    pub ws_port: Option<u16>,

    /// Track startup files without watching them
    #[arg(long)]
    pub inactive: bool,

    /// Config file path (default: livemd.toml)
    #[arg(short = 'C', long, default_value = "livemd.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_files_and_flags() {
        let cli = Cli::parse_from([
            "livemd",
            "notes.md",
            "src/main.rs",
            "-p",
            "8080",
            "--ws-port",
            "9000",
            "--inactive",
        ]);
        assert_eq!(
            cli.files,
            [PathBuf::from("notes.md"), PathBuf::from("src/main.rs")]
        );
        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.ws_port, Some(9000));
        assert!(cli.inactive);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["livemd"]);
        assert!(cli.files.is_empty());
        assert_eq!(cli.config, PathBuf::from("livemd.toml"));
        assert_eq!(cli.interface, None);
        assert!(matches!(cli.color, ColorChoice::Auto));
    }

    #[test]
    fn test_interface_must_be_ip() {
        assert!(Cli::try_parse_from(["livemd", "-i", "localhost"]).is_err());
    }

    #[test]
    fn test_verbose_and_version_flags() {
        assert!(Cli::parse_from(["livemd", "-v"]).verbose);
        assert!(Cli::parse_from(["livemd", "--verbose"]).verbose);

        let err = Cli::try_parse_from(["livemd", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
