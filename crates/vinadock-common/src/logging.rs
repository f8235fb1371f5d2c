//! Structured logging setup.

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;
use vinadock_config::LoggingConfig;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Returns
/// `Ok(false)` when a subscriber was already installed, which is harmless
/// in tests.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, ParseError> {
    let filter = resolve_filter(std::env::var("RUST_LOG").ok(), &config.filter)?;
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok())
}

/// A valid `RUST_LOG` wins; otherwise the configured directives are used.
fn resolve_filter(env: Option<String>, configured: &str) -> Result<EnvFilter, ParseError> {
    if let Some(filter) = env.and_then(|raw| EnvFilter::try_new(raw).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(configured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_filter_is_used() {
        let config = LoggingConfig {
            filter: "vinadock=trace".to_string(),
        };
        let filter = resolve_filter(None, &config.filter).unwrap();
        assert_eq!(filter.to_string(), "vinadock=trace");
    }

    #[test]
    fn test_default_config_filter() {
        let filter = resolve_filter(None, &LoggingConfig::default().filter).unwrap();
        assert!(filter.to_string().contains("vinadock=debug"));
    }

    #[test]
    fn test_env_overrides_config() {
        let filter = resolve_filter(Some("warn".to_string()), "vinadock=trace").unwrap();
        assert_eq!(filter.to_string(), "warn");

        let filter = resolve_filter(Some("vinadock=[".to_string()), "info").unwrap();
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn test_invalid_configured_filter() {
        assert!(resolve_filter(None, "vinadock=[").is_err());
    }

    #[test]
    fn test_second_init_is_harmless() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(matches!(init_tracing(&config), Ok(false)));
        }
    }
}
