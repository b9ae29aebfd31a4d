//! Core types for reportlink's driver provisioning subsystem.
//!
//! This crate defines the vendor model, the [`ConnectionSpec`] parameter
//! struct, the shared [`ProvisionError`] type, and the [`Diagnostics`]
//! sink that the provisioning pipeline narrates itself through. The
//! actual directory resolution, dynamic loading, and connection
//! negotiation live in `reportlink-driver`.
//!
//! # Quick start
//!
//! ```
//! use reportlink_core::{ConnectionSpec, Vendor};
//!
//! let mut spec = ConnectionSpec::new(Vendor::Postgres);
//! spec.host = "db.internal".into();
//! spec.dbname = Some("reports".into());
//! assert_eq!(
//!     spec.connect_string().unwrap(),
//!     "postgresql://db.internal:5432/reports"
//! );
//! ```

mod diag;
mod error;
mod spec;
mod vendor;

pub use diag::{Diagnostics, DiagnosticsBuffer};
pub use error::{BoxError, ProvisionError, Result};
pub use spec::ConnectionSpec;
pub use vendor::{
    MYSQL_DRIVER_LEGACY, MYSQL_DRIVER_MODERN, ORACLE_DRIVER, POSTGRES_DRIVER, Vendor,
};
