//! Configuration validation logic.

use url::Url;

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Minimum length for user agent.
const MIN_USER_AGENT_LENGTH: usize = 10;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_user_agent(&config.http.user_agent)?;
    validate_fragment_base_url(&config.http.fragment_base_url)?;
    validate_positive("timeout_seconds", config.http.timeout_seconds)?;
    validate_positive(
        "connect_timeout_seconds",
        config.http.connect_timeout_seconds,
    )?;
    validate_positive("poll_interval_ms", config.queue.poll_interval_ms)?;
    validate_delay_range(
        config.options.chapter_delay_min_ms,
        config.options.chapter_delay_max_ms,
    )?;

    Ok(())
}

/// Validate the user agent string.
pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.trim().len() < MIN_USER_AGENT_LENGTH {
        return Err(Error::ConfigValidation {
            field: "user_agent".to_string(),
            message: format!(
                "User agent must be at least {} characters (got {})",
                MIN_USER_AGENT_LENGTH,
                user_agent.trim().len()
            ),
        });
    }

    Ok(())
}

/// Validate the fragment base URL.
pub fn validate_fragment_base_url(base: &str) -> Result<()> {
    let url = Url::parse(base).map_err(|e| Error::ConfigValidation {
        field: "fragment_base_url".to_string(),
        message: format!("'{}' is not a valid URL: {}", base, e),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::ConfigValidation {
            field: "fragment_base_url".to_string(),
            message: format!("Unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(())
}

fn validate_positive(field: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: "Must be greater than zero".to_string(),
        });
    }
    Ok(())
}

/// Validate the chapter delay bounds.
pub fn validate_delay_range(min_ms: u64, max_ms: u64) -> Result<()> {
    if max_ms < min_ms {
        return Err(Error::ConfigValidation {
            field: "chapter_delay_max_ms".to_string(),
            message: format!(
                "Upper bound ({}) is below lower bound ({})",
                max_ms, min_ms
            ),
        });
    }
    Ok(())
}

/// Validate a URL submitted for download.
pub fn validate_source_url(input: &str) -> Result<String> {
    let input = input.trim();

    let url = Url::parse(input).map_err(|e| Error::ConfigValidation {
        field: "url".to_string(),
        message: format!("'{}' is not a valid URL: {}", input, e),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::ConfigValidation {
            field: "url".to_string(),
            message: format!("'{}' must use http or https", input),
        });
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.http.timeout_seconds = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_delay_range() {
        assert!(validate_delay_range(0, 0).is_ok());
        assert!(validate_delay_range(400, 750).is_ok());
        assert!(validate_delay_range(750, 400).is_err());
    }

    #[test]
    fn test_fragment_base_url() {
        assert!(validate_fragment_base_url("https://content-select.com/media/display").is_ok());
        assert!(validate_fragment_base_url("ftp://example.com").is_err());
        assert!(validate_fragment_base_url("not a url").is_err());
    }

    #[test]
    fn test_source_url() {
        let url = "https://content-select.com/de/portal/media/view/abc";
        assert_eq!(validate_source_url(url).unwrap(), url);
        assert!(validate_source_url("  https://example.com/book  ").is_ok());
        assert!(validate_source_url("file:///etc/passwd").is_err());
        assert!(validate_source_url("example.com").is_err());
    }
}
