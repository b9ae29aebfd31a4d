//! Driver provisioning orchestration.
//!
//! A [`Provisioner`] owns one invocation's loader state: the search path,
//! the host capability probe, and the loader-context stack. It walks the
//! pipeline end to end (resolve the driver directory, scan it, extend the
//! running process's resolution ability) and hands the resulting context
//! to connection negotiation.
//!
//! Context mutation is one-way: contexts installed during a run are never
//! reverted, so a second `extend` against a different directory layers on
//! top of whatever an earlier attempt registered. Concurrent use of one
//! provisioner is unsupported; callers must serialize access externally.

use std::path::PathBuf;
use std::sync::Arc;

use reportlink_core::{Diagnostics, ProvisionError, Result, Vendor};

use crate::api::Driver;
use crate::context::LoaderContext;
use crate::scan::{self, CandidateModule};
use crate::search::DriverSearchPath;
use crate::strategy::HostCapabilities;

/// Owns the loader state for one provisioning run.
///
/// # Examples
///
/// ```no_run
/// use reportlink_driver::Provisioner;
/// use reportlink_core::{Diagnostics, Vendor};
///
/// let mut diag = Diagnostics::stderr(true);
/// let mut provisioner = Provisioner::new();
/// provisioner.initialize(Some(Vendor::Postgres), &mut diag).unwrap();
/// ```
pub struct Provisioner {
    search: DriverSearchPath,
    capabilities: HostCapabilities,
    root: Arc<LoaderContext>,
    current: Arc<LoaderContext>,
    resolved_dir: Option<PathBuf>,
}

impl Provisioner {
    /// Provisioner with the default search path and a fresh context.
    pub fn new() -> Self {
        Self::with_search(DriverSearchPath::new())
    }

    /// Provisioner with an explicit driver-directory override.
    pub fn with_override(dir: impl Into<PathBuf>) -> Self {
        Self::with_search(DriverSearchPath::with_override(dir))
    }

    /// Provisioner over an arbitrary search path.
    pub fn with_search(search: DriverSearchPath) -> Self {
        let root = LoaderContext::root();
        Self {
            search,
            capabilities: HostCapabilities::probe(),
            current: Arc::clone(&root),
            root,
            resolved_dir: None,
        }
    }

    /// The context subsequent driver resolution should use.
    pub fn context(&self) -> &Arc<LoaderContext> {
        &self.current
    }

    /// The configured search path.
    pub fn search(&self) -> &DriverSearchPath {
        &self.search
    }

    /// The directory resolved by the last [`resolve_dir`](Self::resolve_dir)
    /// call, if any.
    pub fn resolved_dir(&self) -> Option<&PathBuf> {
        self.resolved_dir.as_ref()
    }

    /// Registers a driver directly into the root context, bypassing
    /// package loading. This is how embedders wire in statically linked
    /// drivers, and how tests install fakes.
    pub fn register_driver(&self, driver: Arc<dyn Driver>) {
        self.root.register(driver);
    }

    /// Resolves the driver directory and remembers it for the direct
    /// connection path. The search itself re-reads the filesystem on
    /// every call.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::DirectoryNotFound`] when no directory can
    /// be located.
    pub fn resolve_dir(&mut self, diag: &mut Diagnostics) -> Result<PathBuf> {
        let dir = self.search.resolve(diag)?;
        self.resolved_dir = Some(dir.clone());
        Ok(dir)
    }

    /// Scans the resolved driver directory, resolving it first if needed.
    pub fn scan(&mut self, diag: &mut Diagnostics) -> Result<Vec<CandidateModule>> {
        let dir = match &self.resolved_dir {
            Some(dir) => dir.clone(),
            None => self.resolve_dir(diag)?,
        };
        scan::scan(&dir, diag)
    }

    /// Makes the loadable modules resolvable, trying each available
    /// strategy in probed order until one succeeds. The winning strategy's
    /// context becomes the current context.
    ///
    /// # Errors
    ///
    /// Returns the last [`ProvisionError::LoadStrategy`] once every
    /// strategy has failed.
    pub fn extend(
        &mut self,
        modules: &[CandidateModule],
        diag: &mut Diagnostics,
    ) -> Result<()> {
        let loadable: Vec<CandidateModule> = modules
            .iter()
            .filter(|m| m.loadable)
            .cloned()
            .collect();
        if loadable.is_empty() {
            diag.step("No loadable driver packages found");
            return Ok(());
        }

        let mut last_err = None;
        for strategy in self.capabilities.strategies() {
            diag.step(format!("Extending loader via {} strategy", strategy.name()));
            match strategy.extend(&self.current, &loadable, diag) {
                Ok(ctx) => {
                    self.current = ctx;
                    diag.step(format!(
                        "Loader extended via {} strategy",
                        strategy.name()
                    ));
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(strategy = strategy.name(), error = %err, "Load strategy failed");
                    diag.step(format!(
                        "Strategy {} failed: {err}; trying next strategy",
                        strategy.name()
                    ));
                    last_err = Some(err);
                }
            }
        }

        Err(last_err.unwrap_or(ProvisionError::LoadStrategy {
            strategy: "none",
            message: "no load strategy available on this host".into(),
        }))
    }

    /// Full provisioning pass: resolve the directory, scan it, warn when
    /// `required`'s package is absent, and extend the loader.
    ///
    /// # Errors
    ///
    /// Propagates [`ProvisionError::DirectoryNotFound`], scan I/O
    /// failures, and exhausted-strategy failures. A missing vendor package
    /// is a warning, never an error.
    pub fn initialize(
        &mut self,
        required: Option<Vendor>,
        diag: &mut Diagnostics,
    ) -> Result<()> {
        let dir = self.resolve_dir(diag)?;
        let modules = self.scan(diag)?;
        if let Some(vendor) = required {
            scan::warn_missing_vendor(&modules, vendor, &dir, diag);
        }
        self.extend(&modules, diag)
    }
}

impl Default for Provisioner {
    fn default() -> Self {
        Self::new()
    }
}
