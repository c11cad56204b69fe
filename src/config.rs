//! Command-line configuration for the server binary.

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Book checkout ledger served over HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "book-ledger", version, about)]
pub struct Config {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, short, default_value_t = 3000)]
    pub port: u16,

    /// Log output format. Filtering follows `RUST_LOG` (default `info`).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Skip the startup dump of the chain to the log.
    #[arg(long)]
    pub no_report: bool,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_format: LogFormat::Text,
            no_report: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_parser() {
        let parsed = Config::parse_from(["book-ledger"]);
        let default = Config::default();
        assert_eq!(parsed.bind_addr(), default.bind_addr());
        assert_eq!(parsed.log_format, LogFormat::Text);
        assert!(!parsed.no_report);
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = Config::parse_from([
            "book-ledger",
            "--host",
            "127.0.0.1",
            "-p",
            "8080",
            "--log-format",
            "json",
            "--no-report",
        ]);
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8080");
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert!(cfg.no_report);
    }
}
