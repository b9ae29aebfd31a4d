//! Driver plugin ABI.
//!
//! A driver package is a shared library exporting one entry point that
//! hands back the drivers it implements. The host registers each driver
//! under its identifier in a [`LoaderContext`](crate::LoaderContext) and
//! keeps the library handle alive for the lifetime of that context.
//!
//! # Example: implementing a driver package
//!
//! ```rust,ignore
//! use reportlink_driver::api::{Connection, Credentials, Driver};
//! use reportlink_core::BoxError;
//! use std::sync::Arc;
//!
//! struct PgDriver;
//!
//! impl Driver for PgDriver {
//!     fn identifier(&self) -> &str {
//!         "org.postgresql.Driver"
//!     }
//!
//!     fn accepts_url(&self, url: &str) -> bool {
//!         url.starts_with("postgresql://")
//!     }
//!
//!     fn connect(&self, url: &str, credentials: &Credentials)
//!         -> Result<Box<dyn Connection>, BoxError>
//!     {
//!         let conn = PgConnection::open(url, credentials)?;
//!         Ok(Box::new(conn))
//!     }
//! }
//!
//! // Export for dynamic loading
//! #[no_mangle]
//! pub extern "C" fn reportlink_driver_entry() -> Vec<Arc<dyn Driver>> {
//!     vec![Arc::new(PgDriver)]
//! }
//! ```

use std::sync::Arc;

use reportlink_core::BoxError;

/// Credentials handed to a driver's low-level connect operation.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Login user.
    pub user: String,
    /// Login password.
    pub password: String,
}

impl Credentials {
    /// Credentials for `user`/`password`.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

/// One vendor driver implementation.
///
/// Drivers register for standard connection resolution: the host walks
/// registered drivers and the first one whose [`accepts_url`](Driver::accepts_url)
/// matches gets to connect. A driver can also be obtained directly by
/// identifier from an isolated context and asked to connect without going
/// through resolution.
pub trait Driver: Send + Sync {
    /// Fully-qualified identifier this driver registers under.
    fn identifier(&self) -> &str;

    /// Whether this driver understands the given connection URL.
    fn accepts_url(&self, url: &str) -> bool;

    /// Opens a connection to `url` with the given credentials.
    fn connect(&self, url: &str, credentials: &Credentials)
    -> Result<Box<dyn Connection>, BoxError>;
}

/// A live database connection.
///
/// The handle is owned by the caller, which must release it on every exit
/// path; dropping without [`close`](Connection::close) leaks whatever the
/// driver holds open.
pub trait Connection: Send {
    /// URL the connection was established against.
    fn url(&self) -> &str;

    /// Releases the connection.
    fn close(self: Box<Self>) -> Result<(), BoxError>;
}

impl std::fmt::Debug for dyn Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").field("url", &self.url()).finish()
    }
}

/// Type alias for the package entry point function.
///
/// Driver packages must export this function:
///
/// ```rust,ignore
/// #[no_mangle]
/// pub extern "C" fn reportlink_driver_entry() -> Vec<Arc<dyn Driver>> {
///     vec![Arc::new(MyDriver)]
/// }
/// ```
#[allow(improper_ctypes_definitions)]
pub type DriverEntryFn = unsafe extern "C" fn() -> Vec<Arc<dyn Driver>>;

/// Name of the entry point symbol driver packages export.
pub const DRIVER_ENTRY_SYMBOL: &str = "reportlink_driver_entry";
