use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use hapticforge::{ClientConfig, DEFAULT_URL};
use hapticforge::resolver::parse_alias_file;
use hapticforge::session::SessionConfig;

/// Reads device commands from stdin, one per line, and plays them on a
/// Buttplug-family server.
///
/// Commands: `VIBRATE <dev> <power>`, `PULSE <dev> LOW|MEDIUM|HIGH`,
/// `HEARTBEAT <dev> LOW|MEDIUM|HIGH`, `CONNECT <dev>` and `STOP`.
/// A device is `<index>`, a bare name, or `@1` for whichever device is
/// connected first.
#[derive(Debug, Parser)]
#[command(name = "hapticforge", version)]
pub struct Cli {
    /// Server URL.
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Alias file with one `alias <from> <to>` rule per line.
    #[arg(long, value_name = "PATH")]
    pub aliases: Option<PathBuf>,

    /// Seconds each device scan stays open.
    #[arg(long, default_value_t = 30)]
    pub scan_secs: u64,

    /// Client name announced to the server.
    #[arg(long, default_value = "hapticforge")]
    pub client_name: String,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Builds the client configuration, reading the alias file if one
    /// was given.
    pub fn client_config(&self) -> std::io::Result<ClientConfig> {
        let rules = match &self.aliases {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                let file = parse_alias_file(&text);
                if !file.rejected.is_empty() {
                    tracing::warn!(
                        path = %path.display(),
                        rejected = file.rejected.len(),
                        "some alias rules were skipped"
                    );
                }
                file.rules
            }
            None => Vec::new(),
        };

        Ok(ClientConfig {
            url: self.url.clone(),
            rules,
            session: SessionConfig {
                client_name: self.client_name.clone(),
                scan_duration: Duration::from_secs(self.scan_secs),
                ..SessionConfig::default()
            }
            .validated(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["hapticforge"]);
        assert_eq!(cli.url, DEFAULT_URL);
        assert!(cli.aliases.is_none());
        assert_eq!(cli.scan_secs, 30);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_help_describes_device_addresses() {
        use clap::CommandFactory;

        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("a bare name"), "{help}");
        assert!(help.contains("`@1` for whichever device"), "{help}");
        assert!(!help.contains("#<name>"), "{help}");
    }

    #[test]
    fn test_cli_counts_verbose_flags() {
        let cli = Cli::parse_from(["hapticforge", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_client_config_carries_flags() {
        let cli = Cli::parse_from([
            "hapticforge",
            "--url",
            "ws://10.0.0.2:12345",
            "--scan-secs",
            "5",
            "--client-name",
            "bench",
        ]);
        let config = cli.client_config().unwrap();
        assert_eq!(config.url, "ws://10.0.0.2:12345");
        assert_eq!(config.session.scan_duration, Duration::from_secs(5));
        assert_eq!(config.session.client_name, "bench");
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_client_config_zero_scan_falls_back() {
        let cli = Cli::parse_from(["hapticforge", "--scan-secs", "0"]);
        let config = cli.client_config().unwrap();
        assert_eq!(config.session.scan_duration, Duration::from_secs(30));
    }

    #[test]
    fn test_client_config_missing_alias_file_errors() {
        let cli = Cli::parse_from(["hapticforge", "--aliases", "/nonexistent/hapticforge.aliases"]);
        assert!(cli.client_config().is_err());
    }

    #[test]
    fn test_client_config_reads_alias_file() {
        let path = std::env::temp_dir().join(format!("hapticforge-{}.aliases", std::process::id()));
        std::fs::write(&path, "alias * @1\nbogus line\nalias hush 3\n").unwrap();

        let cli = Cli::parse_from(["hapticforge", "--aliases", path.to_str().unwrap()]);
        let config = cli.client_config().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.rules.len(), 2);
    }
}
