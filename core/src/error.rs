//! Error types for driver provisioning and connection negotiation.
//!
//! One unified error type covers the whole pipeline: directory resolution,
//! package loading, driver probing, and connection negotiation. Failures
//! are absorbed locally wherever a fallback exists; a `ProvisionError`
//! reaching the caller means a whole fallback chain was exhausted.

use std::path::PathBuf;

use thiserror::Error;

use crate::vendor::Vendor;

/// Boxed error preserving an underlying cause verbatim.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while provisioning a driver and connecting.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// No driver directory could be located, either because an explicit
    /// override was invalid or because no default candidate exists.
    #[error("driver directory not found: {detail}; use --driver-dir to point at a directory of driver packages")]
    DirectoryNotFound {
        /// Which part of the search failed.
        detail: String,
    },

    /// A single driver package could not be loaded.
    #[error("failed to load driver package '{}': {message}", .path.display())]
    PackageLoad {
        /// The package file that failed.
        path: PathBuf,
        /// Loader-reported cause.
        message: String,
    },

    /// One loading strategy attempt failed; fatal only once every strategy
    /// is exhausted.
    #[error("load strategy '{strategy}' failed: {message}")]
    LoadStrategy {
        /// Name of the strategy that failed.
        strategy: &'static str,
        /// What went wrong.
        message: String,
    },

    /// Every identifier strategy for the vendor failed.
    #[error(
        "could not load any {vendor} driver; tried: {}. Make sure a matching driver package is in the driver directory",
        .tried.join(", ")
    )]
    DriverNotAvailable {
        /// Vendor the caller asked for.
        vendor: Vendor,
        /// Every identifier attempted, in trial order.
        tried: Vec<String>,
    },

    /// A driver resolved but connection negotiation failed. The underlying
    /// cause (authentication, network, unknown host or database) is kept
    /// verbatim.
    #[error("connection failed: {0}")]
    Connection(#[source] BoxError),

    /// The spec cannot map to a connect string for its vendor.
    #[error("invalid connection spec: {0}")]
    InvalidSpec(String),

    /// Connection profile parsing or serialization failure.
    #[error("profile error: {0}")]
    Profile(#[from] serde_yaml::Error),

    /// Filesystem access failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results with [`ProvisionError`].
pub type Result<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_not_available_lists_every_identifier() {
        let err = ProvisionError::DriverNotAvailable {
            vendor: Vendor::MySql,
            tried: vec![
                "com.mysql.jdbc.Driver".into(),
                "com.mysql.cj.jdbc.Driver".into(),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("mysql"));
        assert!(message.contains("com.mysql.jdbc.Driver, com.mysql.cj.jdbc.Driver"));
    }

    #[test]
    fn test_directory_not_found_names_the_override_flag() {
        let err = ProvisionError::DirectoryNotFound {
            detail: "no default candidate exists".into(),
        };
        assert!(err.to_string().contains("--driver-dir"));
    }

    #[test]
    fn test_connection_error_preserves_cause_verbatim() {
        let cause: BoxError = "FATAL: password authentication failed for user \"reports\"".into();
        let err = ProvisionError::Connection(cause);
        assert_eq!(
            err.to_string(),
            "connection failed: FATAL: password authentication failed for user \"reports\""
        );
    }
}
