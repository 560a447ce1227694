// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::EnvFilter;

use crate::domain::errors::*;

/// Log levels accepted on the command line
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Build the filter: `RUST_LOG` wins over the requested level
pub fn build_filter(level: &str) -> Result<EnvFilter, DomainError> {
    let level = level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(DomainError::BadArgs(format!(
            "Invalid log level: {}. Valid levels: {}",
            level,
            LOG_LEVELS.join(", ")
        )));
    }
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
}

/// Install the global subscriber; later calls are no-ops
pub fn init_logging(level: &str, json: bool) -> Result<(), DomainError> {
    let filter = build_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // Already initialised (tests, embedding hosts) is fine
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unknown_level() {
        assert!(build_filter("loud").is_err());
        assert!(build_filter("DEBUG").is_ok());
    }

    #[test]
    fn test_init_twice() {
        assert!(init_logging("warn", false).is_ok());
        assert!(init_logging("warn", true).is_ok());
    }
}
