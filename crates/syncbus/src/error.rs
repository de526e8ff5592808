// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Errors returned by syncbus constructors and configuration loaders.
//!
//! Runtime data paths never fail: empty containers and missing keys are
//! reported as `None`, expired subscribers are skipped. Only building an
//! active object or loading configuration can produce an [`Error`].

/// Errors returned by syncbus operations.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use syncbus::{Error, PeriodicTask};
///
/// let result = PeriodicTask::new(|_ctx: &Arc<()>, _name| {}, Arc::new(()), "tick", Duration::ZERO);
///
/// match result {
///     Err(Error::InvalidPeriod) => println!("period must be > 0"),
///     Err(e) => println!("Other error: {}", e),
///     Ok(_) => println!("Running"),
/// }
/// ```
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// Periodic task period is zero.
    InvalidPeriod,
    /// Sleep ratio outside `0.0..=1.0` (or not finite).
    InvalidRatio(f64),
    /// Configuration value rejected by validation.
    InvalidConfig(String),

    // ========================================================================
    // Configuration Loading Errors
    // ========================================================================
    /// Configuration file not found at specified path.
    ConfigFileNotFound(String),
    /// Configuration file could not be parsed.
    ConfigParse(String),

    // ========================================================================
    // Runtime Errors
    // ========================================================================
    /// The OS refused to spawn the task thread.
    SpawnFailed(std::io::Error),
    /// I/O error with underlying cause.
    IoError(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidPeriod => write!(f, "Invalid period: must be greater than zero"),
            Error::InvalidRatio(ratio) => {
                write!(f, "Invalid sleep ratio: {} (must be within 0.0..=1.0)", ratio)
            }
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
            Error::ConfigParse(msg) => write!(f, "Config parse error: {}", msg),
            Error::SpawnFailed(e) => write!(f, "Failed to spawn task thread: {}", e),
            Error::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SpawnFailed(e) | Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}

/// Convenient alias for results using the crate `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::InvalidPeriod.to_string(),
            "Invalid period: must be greater than zero"
        );
        assert!(Error::InvalidRatio(1.5).to_string().contains("1.5"));
        assert!(Error::ConfigFileNotFound("/nope.yaml".to_string())
            .to_string()
            .contains("/nope.yaml"));
    }

    #[test]
    fn test_io_source_preserved() {
        let err: Error = std::io::Error::other("boom").into();
        assert!(matches!(err, Error::IoError(_)));
        assert!(err.source().is_some());

        let spawn = Error::SpawnFailed(std::io::Error::other("no threads"));
        assert!(spawn.source().is_some());
        assert!(Error::InvalidPeriod.source().is_none());
    }
}
