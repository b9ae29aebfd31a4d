//! Dynamic database-driver provisioning and connection subsystem.
//!
//! Given a target vendor, this crate locates a directory of pluggable
//! driver packages, makes their code resolvable at runtime, and
//! establishes a working connection by trying several driver-identity and
//! loading strategies in a fixed fallback order.
//!
//! # Pipeline
//!
//! 1. [`DriverSearchPath`]: find the on-disk driver directory.
//! 2. [`scan`](scan::scan): tag package files by vendor (diagnostics
//!    only; discovery never blocks loading).
//! 3. [`Provisioner::extend`]: make package code resolvable, via
//!    process-wide extension or per-package isolated contexts.
//! 4. [`ConnectionFactory::connect`]: resolve a driver identifier and
//!    negotiate the connection.
//!
//! # Quick start
//!
//! ```no_run
//! use reportlink_core::{ConnectionSpec, Diagnostics, Vendor};
//! use reportlink_driver::{ConnectionFactory, Provisioner};
//!
//! let mut diag = Diagnostics::stderr(false);
//! let mut provisioner = Provisioner::new();
//! provisioner.initialize(Some(Vendor::Postgres), &mut diag).unwrap();
//!
//! let mut spec = ConnectionSpec::new(Vendor::Postgres);
//! spec.host = "db.internal".into();
//! spec.dbname = Some("reports".into());
//!
//! let factory = ConnectionFactory::new(&provisioner);
//! let conn = factory.connect(&spec, &mut diag).unwrap();
//! // ... hand `conn` to the reporting engine ...
//! conn.close().unwrap();
//! ```
//!
//! # Concurrency
//!
//! Everything is synchronous and blocking, and a [`Provisioner`] must not
//! be shared between concurrent callers: installing a context is
//! unsynchronized provisioner state. Loaded packages stay loaded for the
//! lifetime of their context; nothing is reverted mid-run.

pub mod api;
mod context;
mod factory;
mod probe;
mod provision;
pub mod scan;
mod search;
mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use context::LoaderContext;
pub use factory::ConnectionFactory;
pub use probe::DriverProber;
pub use provision::Provisioner;
pub use scan::{CandidateModule, PACKAGE_EXTENSION};
pub use search::{DRIVER_DIR_NAME, DriverSearchPath};
pub use strategy::{GlobalExtension, HostCapabilities, IsolatedContext, LoadStrategy};
