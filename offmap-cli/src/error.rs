//! CLI error type.

use std::fmt;

use offmap::config::ConfigError;
use offmap::coord::CoordError;
use offmap::provider::ProviderError;
use offmap::PrefetchError;

/// Errors reported to the user by the `offmap` binary.
#[derive(Debug)]
pub enum CliError {
    /// Invalid arguments or settings.
    Config(String),

    /// Reading or writing the config file failed.
    ConfigFile(ConfigError),

    /// The route file could not be loaded.
    Route(CoordError),

    /// The HTTP client could not be built.
    Client(ProviderError),

    /// Prefetch or cache operation failed.
    Prefetch(PrefetchError),

    /// Failed to create the Tokio runtime.
    Runtime(String),

    /// Writing command output failed.
    Output(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Route(e) => write!(f, "Failed to load route: {}", e),
            CliError::Client(e) => write!(f, "{}", e),
            CliError::Prefetch(e) => write!(f, "{}", e),
            CliError::Runtime(msg) => write!(f, "Failed to create Tokio runtime: {}", msg),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Route(e) => Some(e),
            CliError::Client(e) => Some(e),
            CliError::Prefetch(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::Config(_) | CliError::Runtime(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Route(e)
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Client(e)
    }
}

impl From<PrefetchError> for CliError {
    fn from(e: PrefetchError) -> Self {
        CliError::Prefetch(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Output(e)
    }
}
