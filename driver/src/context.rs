//! Loader contexts.
//!
//! A [`LoaderContext`] is the runtime's view of which drivers are
//! resolvable: a registry of identifier → driver plus the library handles
//! keeping dynamically loaded code alive. Contexts layer: a child context
//! delegates lookups to its parent chain, so an isolated context sees
//! everything the context it was built over sees, while the parent never
//! observes the child. Contexts are explicit values owned by the caller;
//! there is no process-global registry, and tests construct independent
//! contexts freely.
//!
//! Libraries loaded into a context stay loaded until the context itself is
//! dropped; nothing is unloaded mid-run.

use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use libloading::Library;

use reportlink_core::{ProvisionError, Result};

use crate::api::{Connection, Credentials, DRIVER_ENTRY_SYMBOL, Driver, DriverEntryFn};

/// One layer of driver resolvability.
pub struct LoaderContext {
    parent: Option<Arc<LoaderContext>>,
    drivers: RwLock<Vec<Arc<dyn Driver>>>,
    libraries: Mutex<Vec<Library>>,
}

impl std::fmt::Debug for LoaderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderContext")
            .field("identifiers", &self.registered_identifiers())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

impl LoaderContext {
    /// A fresh root context with nothing registered.
    pub fn root() -> Arc<Self> {
        Arc::new(Self {
            parent: None,
            drivers: RwLock::new(Vec::new()),
            libraries: Mutex::new(Vec::new()),
        })
    }

    /// A new empty context layered over `parent`. Lookups fall back to the
    /// parent chain; registrations stay in the child.
    pub fn child(parent: &Arc<Self>) -> Arc<Self> {
        Arc::new(Self {
            parent: Some(Arc::clone(parent)),
            drivers: RwLock::new(Vec::new()),
            libraries: Mutex::new(Vec::new()),
        })
    }

    /// Registers a driver in this context, replacing any driver already
    /// registered here under the same identifier.
    pub fn register(&self, driver: Arc<dyn Driver>) {
        let mut drivers = self.drivers.write().unwrap();
        if let Some(existing) = drivers
            .iter_mut()
            .find(|d| d.identifier() == driver.identifier())
        {
            *existing = driver;
        } else {
            drivers.push(driver);
        }
    }

    /// Looks up a driver by identifier, walking this context then its
    /// parent chain.
    pub fn lookup(&self, identifier: &str) -> Option<Arc<dyn Driver>> {
        let found = self
            .drivers
            .read()
            .unwrap()
            .iter()
            .find(|d| d.identifier() == identifier)
            .map(Arc::clone);
        match found {
            Some(driver) => Some(driver),
            None => self.parent.as_ref()?.lookup(identifier),
        }
    }

    /// Identifiers resolvable through this context, child layers first.
    pub fn registered_identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self
            .drivers
            .read()
            .unwrap()
            .iter()
            .map(|d| d.identifier().to_string())
            .collect();
        if let Some(parent) = &self.parent {
            for id in parent.registered_identifiers() {
                if !identifiers.contains(&id) {
                    identifiers.push(id);
                }
            }
        }
        identifiers
    }

    /// Loads one driver package into this context and registers every
    /// driver it provides. Returns the number of drivers registered.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::PackageLoad`] if the library cannot be
    /// opened or does not export the entry symbol.
    pub fn load_package(&self, path: &Path) -> Result<usize> {
        self.load_package_inner(path, false)
    }

    /// Like [`load_package`](Self::load_package), but asks the host linker
    /// to promote the package's symbols process-wide where the platform
    /// supports it, so later packages can link against them.
    pub(crate) fn load_package_process_wide(&self, path: &Path) -> Result<usize> {
        self.load_package_inner(path, true)
    }

    fn load_package_inner(&self, path: &Path, process_wide: bool) -> Result<usize> {
        let package_err = |message: String| ProvisionError::PackageLoad {
            path: path.to_path_buf(),
            message,
        };

        // SAFETY: loading arbitrary shared objects from a user-specified
        // directory is inherently unsafe; we trust driver packages to
        // export the entry symbol with the declared signature.
        unsafe {
            let library =
                open_library(path, process_wide).map_err(|e| package_err(e.to_string()))?;
            let entry: libloading::Symbol<DriverEntryFn> = library
                .get(DRIVER_ENTRY_SYMBOL.as_bytes())
                .map_err(|e| {
                    package_err(format!("missing entry point '{DRIVER_ENTRY_SYMBOL}': {e}"))
                })?;

            let drivers = entry();
            let count = drivers.len();
            for driver in drivers {
                tracing::debug!(
                    identifier = driver.identifier(),
                    package = %path.display(),
                    "Registering driver"
                );
                self.register(driver);
            }

            self.libraries.lock().unwrap().push(library);
            Ok(count)
        }
    }

    /// Standard connection resolution: walks drivers registered in this
    /// context (registration order), then the parent chain, and asks the
    /// first driver that accepts `url` to connect.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Connection`] wrapping the driver's own
    /// failure verbatim, or a "no suitable driver" cause when no
    /// registered driver accepts the URL.
    pub fn connect(
        &self,
        url: &str,
        user: &str,
        password: &str,
    ) -> Result<Box<dyn Connection>> {
        match self.driver_for_url(url) {
            Some(driver) => {
                let credentials = Credentials::new(user, password);
                driver
                    .connect(url, &credentials)
                    .map_err(ProvisionError::Connection)
            }
            None => Err(ProvisionError::Connection(
                format!("no suitable driver for {url}").into(),
            )),
        }
    }

    fn driver_for_url(&self, url: &str) -> Option<Arc<dyn Driver>> {
        let found = self
            .drivers
            .read()
            .unwrap()
            .iter()
            .find(|d| d.accepts_url(url))
            .map(Arc::clone);
        match found {
            Some(driver) => Some(driver),
            None => self.parent.as_ref()?.driver_for_url(url),
        }
    }
}

fn open_library(path: &Path, process_wide: bool) -> std::result::Result<Library, libloading::Error> {
    #[cfg(unix)]
    if process_wide {
        use libloading::os::unix::{Library as UnixLibrary, RTLD_GLOBAL, RTLD_NOW};
        return unsafe { UnixLibrary::open(Some(path), RTLD_NOW | RTLD_GLOBAL) }
            .map(Library::from);
    }
    #[cfg(not(unix))]
    let _ = process_wide;
    unsafe { Library::new(path) }
}
