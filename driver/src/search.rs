//! Driver directory resolution.
//!
//! Finds the one on-disk directory holding driver packages for this
//! invocation. An explicit override short-circuits the search and must
//! itself exist; otherwise a fixed list of default candidates is probed in
//! order and the first existing directory wins. Every probe is re-run on
//! every call; nothing is cached.

use std::path::{Path, PathBuf};

use reportlink_core::{Diagnostics, ProvisionError, Result};

/// Name of the default driver directory probed next to the process.
pub const DRIVER_DIR_NAME: &str = "drivers";

/// Ordered candidate directories for driver packages.
///
/// # Examples
///
/// ```no_run
/// use reportlink_driver::DriverSearchPath;
/// use reportlink_core::Diagnostics;
///
/// let mut diag = Diagnostics::stderr(true);
/// let dir = DriverSearchPath::new().resolve(&mut diag).unwrap();
/// println!("loading driver packages from {}", dir.display());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DriverSearchPath {
    override_dir: Option<PathBuf>,
}

impl DriverSearchPath {
    /// Search path using the default candidates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Search path short-circuited to an explicit directory. The
    /// directory must exist; no default search is attempted if it does
    /// not.
    pub fn with_override(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
        }
    }

    /// Resolves the driver directory, anchoring the default candidates at
    /// the process working directory and executable location.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::DirectoryNotFound`] if the override is
    /// invalid or every default candidate is missing.
    pub fn resolve(&self, diag: &mut Diagnostics) -> Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        let exe = std::env::current_exe().ok();
        self.resolve_from(&cwd, exe.as_deref(), diag)
    }

    /// Resolves the driver directory with explicit anchor points.
    ///
    /// Default candidates, probed in order:
    ///
    /// 1. `<cwd>/drivers`
    /// 2. `<cwd parent>/drivers`
    /// 3. `<exe dir sibling>/drivers`, only when the executable's own
    ///    directory is named `bin` (any case)
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::DirectoryNotFound`] if the override is
    /// invalid or every candidate is missing.
    pub fn resolve_from(
        &self,
        cwd: &Path,
        exe: Option<&Path>,
        diag: &mut Diagnostics,
    ) -> Result<PathBuf> {
        if let Some(dir) = &self.override_dir {
            if !dir.is_dir() {
                return Err(ProvisionError::DirectoryNotFound {
                    detail: format!(
                        "'{}' does not exist or is not a directory",
                        dir.display()
                    ),
                });
            }
            diag.step(format!(
                "Using user-specified driver directory: {}",
                dir.display()
            ));
            return Ok(dir.clone());
        }

        diag.step("Looking for driver directory...");
        diag.step(format!("Current directory: {}", cwd.display()));

        for candidate in self.default_candidates(cwd, exe, diag) {
            let found = candidate.is_dir();
            diag.step(format!(
                "Checking: {} - {}",
                candidate.display(),
                if found { "FOUND" } else { "NOT FOUND" }
            ));
            if found {
                diag.step(format!("Using driver directory: {}", candidate.display()));
                return Ok(candidate);
            }
        }

        Err(ProvisionError::DirectoryNotFound {
            detail: "no default candidate exists".into(),
        })
    }

    fn default_candidates(
        &self,
        cwd: &Path,
        exe: Option<&Path>,
        diag: &mut Diagnostics,
    ) -> Vec<PathBuf> {
        let mut candidates = vec![cwd.join(DRIVER_DIR_NAME)];
        if let Some(parent) = cwd.parent() {
            candidates.push(parent.join(DRIVER_DIR_NAME));
        }

        // The install-tree candidate only applies when the binary lives in
        // a directory literally named "bin".
        if let Some(exe) = exe {
            diag.step(format!("Executable path: {}", exe.display()));
            if let Some(exe_dir) = exe.parent() {
                let in_bin = exe_dir
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.eq_ignore_ascii_case("bin"));
                if in_bin {
                    if let Some(install_root) = exe_dir.parent() {
                        candidates.push(install_root.join(DRIVER_DIR_NAME));
                    }
                }
            }
        }

        candidates
    }
}
