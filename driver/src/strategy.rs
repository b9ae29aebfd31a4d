//! Pluggable loading strategies.
//!
//! The host's ability to make driver packages resolvable differs between
//! platforms, so loading is modeled as a strategy interface with two
//! implementations, selected once by a capability probe and tried in a
//! fixed order:
//!
//! 1. [`GlobalExtension`]: one atomic attempt to load every package into
//!    the shared context with process-wide symbol visibility.
//! 2. [`IsolatedContext`]: per-package fallback where each package gets
//!    its own context layered over the current one, installed best-effort.
//!
//! New host behaviors become new strategy implementations, never inline
//! branches.

use std::sync::Arc;

use reportlink_core::{Diagnostics, ProvisionError, Result};

use crate::context::LoaderContext;
use crate::scan::CandidateModule;

/// Pluggable strategy for making driver packages resolvable.
///
/// `extend` returns the context subsequent resolution should use: the
/// base context itself for global strategies, or the top of a stack of
/// layered contexts for isolated ones.
pub trait LoadStrategy {
    fn name(&self) -> &'static str;
    fn extend(
        &self,
        base: &Arc<LoaderContext>,
        modules: &[CandidateModule],
        diag: &mut Diagnostics,
    ) -> Result<Arc<LoaderContext>>;
}

/// What the host platform supports, probed once per provisioner.
#[derive(Debug, Clone, Copy)]
pub struct HostCapabilities {
    /// Whether the platform can promote package symbols process-wide.
    pub global_extension: bool,
}

impl HostCapabilities {
    /// Probes the running host.
    pub fn probe() -> Self {
        // Process-wide symbol promotion rides on RTLD_GLOBAL, a Unix
        // dynamic-linker facility; elsewhere every library is isolated.
        Self {
            global_extension: cfg!(unix),
        }
    }

    /// Strategies available on this host, in trial order.
    pub fn strategies(&self) -> Vec<Box<dyn LoadStrategy>> {
        let mut strategies: Vec<Box<dyn LoadStrategy>> = Vec::new();
        if self.global_extension {
            strategies.push(Box::new(GlobalExtension));
        }
        strategies.push(Box::new(IsolatedContext));
        strategies
    }
}

/// Loads every package into the base context so all subsequent resolution
/// sees them. One atomic attempt: the first package failure fails the
/// whole strategy (drivers registered before the failure stay registered;
/// loader state is never reverted mid-run).
pub struct GlobalExtension;

impl LoadStrategy for GlobalExtension {
    fn name(&self) -> &'static str {
        "global-extension"
    }

    fn extend(
        &self,
        base: &Arc<LoaderContext>,
        modules: &[CandidateModule],
        diag: &mut Diagnostics,
    ) -> Result<Arc<LoaderContext>> {
        for module in modules {
            diag.step(format!("Loading driver package: {}", module.file_name));
            let count = base
                .load_package_process_wide(&module.path)
                .map_err(|err| ProvisionError::LoadStrategy {
                    strategy: self.name(),
                    message: err.to_string(),
                })?;
            diag.step(format!(
                "Registered {count} driver(s) from {}",
                module.file_name
            ));
        }
        Ok(Arc::clone(base))
    }
}

/// Per-package fallback: layers an isolated context over the current one
/// for each package independently. A package that fails to load is logged
/// and skipped; the remaining packages still get their contexts. While
/// installing a context, the vendor's known identifiers are probed for
/// diagnostics only; a probe miss never prevents installation.
pub struct IsolatedContext;

impl LoadStrategy for IsolatedContext {
    fn name(&self) -> &'static str {
        "isolated-context"
    }

    fn extend(
        &self,
        base: &Arc<LoaderContext>,
        modules: &[CandidateModule],
        diag: &mut Diagnostics,
    ) -> Result<Arc<LoaderContext>> {
        let mut current = Arc::clone(base);

        for module in modules {
            diag.step(format!(
                "Attempting isolated load of: {}",
                module.file_name
            ));
            let child = LoaderContext::child(&current);
            match child.load_package(&module.path) {
                Ok(count) => {
                    diag.step(format!(
                        "Registered {count} driver(s) from {}",
                        module.file_name
                    ));
                    probe_known_identifiers(&child, module, diag);
                    current = child;
                }
                Err(err) => {
                    tracing::warn!(
                        package = %module.path.display(),
                        error = %err,
                        "Failed to load driver package"
                    );
                    diag.step(format!(
                        "Failed to load {}: {err}",
                        module.file_name
                    ));
                }
            }
        }

        Ok(current)
    }
}

// Diagnostic only: report which of the vendor's known identifiers became
// resolvable through the freshly installed context.
fn probe_known_identifiers(
    ctx: &Arc<LoaderContext>,
    module: &CandidateModule,
    diag: &mut Diagnostics,
) {
    let Some(vendor) = module.vendor else {
        diag.step(format!(
            "Unknown package vendor, skipping identifier probe: {}",
            module.file_name
        ));
        return;
    };

    for identifier in vendor.known_identifiers() {
        let hit = ctx.lookup(identifier).is_some();
        diag.step(format!(
            "Probing driver {identifier}: {}",
            if hit { "resolvable" } else { "not resolvable" }
        ));
    }
}
