//! Connection factory.
//!
//! Builds the vendor connection string and obtains a live connection,
//! trying driver identities in a fixed fallback order. MySQL runs a deep
//! chain: legacy identifier, modern identifier, configured identifier,
//! then a last-resort direct load of the vendor's package into an
//! isolated context. Every other vendor tries exactly its configured
//! identifier once, with no further fallback.

use std::sync::Arc;

use reportlink_core::{
    ConnectionSpec, Diagnostics, MYSQL_DRIVER_LEGACY, MYSQL_DRIVER_MODERN, ProvisionError,
    Result, Vendor,
};

use crate::api::{Connection, Credentials};
use crate::context::LoaderContext;
use crate::probe::DriverProber;
use crate::provision::Provisioner;
use crate::scan;

/// Produces live connections from a provisioned loader state.
pub struct ConnectionFactory<'a> {
    provisioner: &'a Provisioner,
}

impl<'a> ConnectionFactory<'a> {
    /// Factory over an initialized provisioner.
    pub fn new(provisioner: &'a Provisioner) -> Self {
        Self { provisioner }
    }

    /// Obtains a connection for `spec`.
    ///
    /// Resolution proceeds: candidate identifiers against the active
    /// context (the full chain for MySQL, single-shot otherwise), then,
    /// for MySQL only, the direct isolated path. Once any identifier
    /// resolves, the connection is requested from standard resolution
    /// with `(connect_string, user, password)`.
    ///
    /// # Errors
    ///
    /// - [`ProvisionError::InvalidSpec`] when the spec cannot produce a
    ///   connect string or names no driver identifier.
    /// - [`ProvisionError::DriverNotAvailable`] when every identifier in
    ///   the vendor's chain fails, naming each one tried.
    /// - [`ProvisionError::Connection`] when a driver resolved but
    ///   negotiation failed; the cause is wrapped verbatim and never
    ///   retried.
    pub fn connect(
        &self,
        spec: &ConnectionSpec,
        diag: &mut Diagnostics,
    ) -> Result<Box<dyn Connection>> {
        let connect_string = spec.connect_string()?;
        let configured = spec.configured_identifier().ok_or_else(|| {
            ProvisionError::InvalidSpec(
                "generic vendor requires an explicit driver identifier".into(),
            )
        })?;

        diag.step(format!("Driver identifier: {configured}"));
        diag.step(format!("Connect string: {connect_string}"));
        diag.step(format!("db-user: {}", spec.user));
        if spec.password.is_empty() {
            diag.step("db-password is empty");
        }

        let ctx = self.provisioner.context();
        let mut prober = DriverProber::new();

        let resolved = match spec.vendor {
            Vendor::MySql => prober.try_chain(
                ctx,
                &[MYSQL_DRIVER_LEGACY, MYSQL_DRIVER_MODERN, &configured],
                diag,
            ),
            _ => prober.try_identifier(ctx, &configured, diag),
        };

        if resolved.is_some() {
            return ctx.connect(&connect_string, &spec.user, &spec.password);
        }

        if spec.vendor == Vendor::MySql {
            if let Some(conn) =
                self.connect_directly(spec, &connect_string, &mut prober, diag)?
            {
                return Ok(conn);
            }
        }

        Err(ProvisionError::DriverNotAvailable {
            vendor: spec.vendor,
            tried: prober.into_attempts(),
        })
    }

    /// Last-resort path: load the vendor's candidate module into an
    /// isolated context scoped to just that file and connect through a
    /// directly obtained driver, bypassing standard resolution.
    ///
    /// Any failure here falls back to the caller's `DriverNotAvailable`
    /// accounting; only a successful connection short-circuits.
    fn connect_directly(
        &self,
        spec: &ConnectionSpec,
        connect_string: &str,
        prober: &mut DriverProber,
        diag: &mut Diagnostics,
    ) -> Result<Option<Box<dyn Connection>>> {
        diag.step("Attempting direct driver load from the driver directory");

        let dir = match self.provisioner.resolved_dir() {
            Some(dir) => dir.clone(),
            None => match self.provisioner.search().resolve(diag) {
                Ok(dir) => dir,
                Err(err) => {
                    diag.step(format!("Direct load failed: {err}"));
                    return Ok(None);
                }
            },
        };

        let modules = scan::scan(&dir, diag)?;
        let Some(module) = modules
            .iter()
            .find(|m| m.loadable && m.vendor == Some(spec.vendor))
        else {
            diag.step(format!(
                "No {} driver package found in {}",
                spec.vendor,
                dir.display()
            ));
            return Ok(None);
        };
        diag.step(format!("Found driver package: {}", module.file_name));

        let isolated = LoaderContext::child(self.provisioner.context());
        match isolated.load_package(&module.path) {
            Ok(count) => diag.step(format!(
                "Registered {count} driver(s) from {}",
                module.file_name
            )),
            // A failed load leaves the isolated context empty; the probes
            // below still run so the failure message names the whole chain.
            Err(err) => diag.step(format!("Failed to load {}: {err}", module.file_name)),
        }

        for identifier in [MYSQL_DRIVER_LEGACY, MYSQL_DRIVER_MODERN] {
            let Some(driver) = prober.try_identifier(&isolated, identifier, diag) else {
                continue;
            };

            let credentials = Credentials::new(spec.user.clone(), spec.password.clone());
            match driver.connect(connect_string, &credentials) {
                Ok(conn) => {
                    diag.step(format!(
                        "Successfully created direct connection using {identifier}"
                    ));
                    return Ok(Some(conn));
                }
                Err(err) => {
                    diag.step(format!(
                        "Failed to create direct connection with {identifier}: {err}"
                    ));
                }
            }
        }

        Ok(None)
    }
}
