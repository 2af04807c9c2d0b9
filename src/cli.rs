use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Watch USF course sections and ping Discord when seats open up.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON config file. A default one is written if it's missing.
    #[arg(long, short, default_value = "config.json", env = "SEATWATCH_CONFIG")]
    pub config: PathBuf,

    /// Log output format. Defaults to pretty in debug builds and json in release.
    #[arg(long, value_enum)]
    pub tracing: Option<TracingFormat>,

    /// Run a single tick and exit.
    #[arg(long)]
    pub once: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingFormat {
    /// Human-readable, compact lines
    Pretty,
    /// One JSON object per event
    Json,
}

impl TracingFormat {
    pub fn resolve(format: Option<Self>) -> Self {
        format.unwrap_or(if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["seatwatch"]).unwrap();
        assert_eq!(args.config, PathBuf::from("config.json"));
        assert_eq!(args.tracing, None);
        assert!(!args.once);
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "seatwatch",
            "--config",
            "/etc/seatwatch.json",
            "--tracing",
            "json",
            "--once",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("/etc/seatwatch.json"));
        assert_eq!(args.tracing, Some(TracingFormat::Json));
        assert!(args.once);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Args::try_parse_from(["seatwatch", "--tracing", "xml"]).is_err());
    }
}
