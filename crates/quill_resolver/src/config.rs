//! Resolver configuration.
//!
//! [`ResolverConfig`] can be built in code, deserialized from a host
//! application's config file, or read from `QUILL_*` environment variables.
//! Durations are expressed in milliseconds outside of code.

use core::time::Duration;
use serde::Deserialize;

/// Environment variable for [`ResolverConfig::default_timeout`].
pub const ENV_DEFAULT_TIMEOUT_MS: &str = "QUILL_DEFAULT_TIMEOUT_MS";
/// Environment variable for [`ResolverConfig::init_timeout`].
pub const ENV_INIT_TIMEOUT_MS: &str = "QUILL_INIT_TIMEOUT_MS";
/// Environment variable for [`ResolverConfig::provider_timeout`].
pub const ENV_PROVIDER_TIMEOUT_MS: &str = "QUILL_PROVIDER_TIMEOUT_MS";
/// Environment variable for [`ResolverConfig::max_concurrency`].
pub const ENV_MAX_CONCURRENCY: &str = "QUILL_MAX_CONCURRENCY";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value could not be parsed or is out of range.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Offending raw value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Tuning knobs for [`InjectableResolver`](crate::InjectableResolver).
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use quill_resolver::ResolverConfig;
///
/// let config = ResolverConfig::default()
///     .with_default_timeout(Duration::from_secs(5))
///     .with_max_concurrency(4);
/// assert_eq!(config.max_concurrency, 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "RawResolverConfig")]
pub struct ResolverConfig {
    /// Deadline for injectors that declare a zero timeout.
    pub default_timeout: Duration,
    /// Deadline for the registry initializer.
    pub init_timeout: Duration,
    /// Deadline for the provider batch call.
    pub provider_timeout: Duration,
    /// Maximum injectors running at once within a level.
    pub max_concurrency: usize,
}

impl ResolverConfig {
    /// Engine default deadline for injectors, the initializer and the provider.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Default per-level concurrency limit.
    pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default injector deadline.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sets the initializer deadline.
    #[must_use]
    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    /// Sets the provider call deadline.
    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Sets the per-level concurrency limit. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Reads overrides from the process environment.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, keyed by the `QUILL_*` variable names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a value is set but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = parse_positive(&lookup, ENV_DEFAULT_TIMEOUT_MS)? {
            config.default_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_positive(&lookup, ENV_INIT_TIMEOUT_MS)? {
            config.init_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_positive(&lookup, ENV_PROVIDER_TIMEOUT_MS)? {
            config.provider_timeout = Duration::from_millis(ms);
        }
        if let Some(max) = parse_positive(&lookup, ENV_MAX_CONCURRENCY)? {
            config.max_concurrency = usize::try_from(max).unwrap_or(usize::MAX);
        }

        Ok(config)
    }

    /// Returns `timeout`, or the default if `timeout` is zero.
    #[must_use]
    pub fn effective_timeout(&self, timeout: Duration) -> Duration {
        if timeout.is_zero() {
            self.default_timeout
        } else {
            timeout
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_timeout: Self::DEFAULT_TIMEOUT,
            init_timeout: Self::DEFAULT_TIMEOUT,
            provider_timeout: Self::DEFAULT_TIMEOUT,
            max_concurrency: Self::DEFAULT_MAX_CONCURRENCY,
        }
    }
}

fn parse_positive<F>(lookup: &F, key: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let invalid = |reason| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.clone(),
        reason,
    };
    let value: u64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("expected an unsigned integer"))?;
    if value == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(Some(value))
}

/// On-disk shape of [`ResolverConfig`]; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawResolverConfig {
    default_timeout_ms: Option<u64>,
    init_timeout_ms: Option<u64>,
    provider_timeout_ms: Option<u64>,
    max_concurrency: Option<usize>,
}

impl From<RawResolverConfig> for ResolverConfig {
    fn from(raw: RawResolverConfig) -> Self {
        let mut config = Self::default();
        if let Some(ms) = raw.default_timeout_ms {
            config.default_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = raw.init_timeout_ms {
            config.init_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = raw.provider_timeout_ms {
            config.provider_timeout = Duration::from_millis(ms);
        }
        if let Some(max) = raw.max_concurrency {
            config = config.with_max_concurrency(max);
        }
        config
    }
}
