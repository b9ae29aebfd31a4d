//! Connection specification and connection-string templates.
//!
//! A [`ConnectionSpec`] folds every inbound connection parameter into one
//! struct: vendor, addressing, credentials, and the optional driver
//! identifier and raw URL overrides. Each vendor maps deterministically to
//! exactly one connection-string template; the template strings must match
//! exactly for interoperability with existing driver packages.
//!
//! Specs are serde-serializable and can be stored as YAML connection
//! profiles:
//!
//! ```yaml
//! vendor: postgres
//! host: db.internal
//! dbname: reports
//! user: reporting
//! password: hunter2
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, Result};
use crate::vendor::Vendor;

fn default_host() -> String {
    "localhost".to_string()
}

/// Full parameter set needed to address and authenticate to one database
/// instance.
///
/// # Examples
///
/// ```
/// use reportlink_core::{ConnectionSpec, Vendor};
///
/// let mut spec = ConnectionSpec::new(Vendor::MySql);
/// spec.host = "db1".into();
/// spec.dbname = Some("reports".into());
/// assert_eq!(
///     spec.connect_string().unwrap(),
///     "mysql://db1:3306/reports?useSSL=false&allowPublicKeyRetrieval=true"
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSpec {
    /// Target database vendor.
    pub vendor: Vendor,
    /// Database host name (default `localhost`).
    #[serde(default = "default_host")]
    pub host: String,
    /// Wire port; the vendor default applies when unset.
    #[serde(default)]
    pub port: Option<u16>,
    /// Database name (MySQL/PostgreSQL).
    #[serde(default)]
    pub dbname: Option<String>,
    /// Service id (Oracle).
    #[serde(default)]
    pub sid: Option<String>,
    /// Login user.
    #[serde(default)]
    pub user: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
    /// User-configured driver identifier; overrides the vendor default.
    #[serde(default)]
    pub driver: Option<String>,
    /// Raw connection URL (generic vendor only), used verbatim.
    #[serde(default)]
    pub url: Option<String>,
}

impl ConnectionSpec {
    /// Creates a spec for `vendor` with defaults for everything else.
    pub fn new(vendor: Vendor) -> Self {
        Self {
            vendor,
            host: default_host(),
            port: None,
            dbname: None,
            sid: None,
            user: String::new(),
            password: String::new(),
            driver: None,
            url: None,
        }
    }

    /// Port to connect to: the explicit port if set, else the vendor
    /// default.
    pub fn effective_port(&self) -> Option<u16> {
        self.port.or_else(|| self.vendor.default_port())
    }

    /// Driver identifier to try as the user-configured candidate: the
    /// explicit identifier if set, else the vendor's built-in one. `None`
    /// only for a generic spec with no identifier configured.
    pub fn configured_identifier(&self) -> Option<String> {
        self.driver
            .clone()
            .or_else(|| self.vendor.default_identifier().map(str::to_owned))
    }

    /// Builds the vendor's connection string.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::InvalidSpec`] when a template input is
    /// missing: no database name for MySQL/PostgreSQL, no service id for
    /// Oracle, or no URL for the generic vendor.
    pub fn connect_string(&self) -> Result<String> {
        match self.vendor {
            Vendor::MySql => {
                let port = self.require_port()?;
                let dbname = self.require(&self.dbname, "a database name")?;
                Ok(format!(
                    "mysql://{}:{}/{}?useSSL=false&allowPublicKeyRetrieval=true",
                    self.host, port, dbname
                ))
            }
            Vendor::Postgres => {
                let port = self.require_port()?;
                let dbname = self.require(&self.dbname, "a database name")?;
                Ok(format!("postgresql://{}:{}/{}", self.host, port, dbname))
            }
            Vendor::Oracle => {
                let port = self.require_port()?;
                let sid = self.require(&self.sid, "a service id")?;
                Ok(format!("oracle:thin:@{}:{}:{}", self.host, port, sid))
            }
            Vendor::Generic => self
                .url
                .clone()
                .ok_or_else(|| {
                    ProvisionError::InvalidSpec(
                        "generic vendor requires an explicit connection URL".into(),
                    )
                }),
        }
    }

    /// Loads a spec from a YAML connection profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Io`] if the file cannot be read, or
    /// [`ProvisionError::Profile`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let spec = serde_yaml::from_reader(reader)?;
        Ok(spec)
    }

    /// Saves the spec as a YAML connection profile.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Io`] if the file cannot be written, or
    /// [`ProvisionError::Profile`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    fn require_port(&self) -> Result<u16> {
        self.effective_port().ok_or_else(|| {
            ProvisionError::InvalidSpec(format!("{} connection requires a port", self.vendor))
        })
    }

    fn require<'a>(&self, field: &'a Option<String>, what: &str) -> Result<&'a str> {
        field.as_deref().ok_or_else(|| {
            ProvisionError::InvalidSpec(format!("{} connection requires {what}", self.vendor))
        })
    }
}
