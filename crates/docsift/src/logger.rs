//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup, after the config is loaded. Logs go to
//! stderr so that `--json` output on stdout stays machine-readable.

use anyhow::{anyhow, bail, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set and valid; otherwise `level` (one of `error`,
/// `warn`, `info`, `debug`, `trace`) is used.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("invalid log level '{level}': {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to set subscriber: {e}"))?;

    Ok(())
}

/// Parse a level string, rejecting anything tracing does not recognise.
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    if level.is_empty() {
        bail!("log level must not be empty");
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| anyhow!("unrecognised log level: '{level}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_levels_parse() {
        for l in &["error", "warn", "info", "debug", "trace"] {
            assert!(parse_level(l).is_ok(), "expected '{l}' to be valid");
        }
    }

    #[test]
    fn invalid_level_errors() {
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("").is_err());
    }

    #[test]
    fn init_succeeds_or_already_init() {
        if let Err(e) = init("info") {
            assert!(e.to_string().contains("set subscriber"), "{e}");
        }
    }
}
