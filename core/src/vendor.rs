//! Database vendor model.
//!
//! A [`Vendor`] carries everything that distinguishes one database family
//! from another during provisioning: the default wire port, the filename
//! keywords used to tag driver packages, and the ordered table of driver
//! identifiers to try when resolving a usable driver.
//!
//! Driver identifiers are opaque plugin identities preserved verbatim for
//! compatibility with existing driver packages; they are never parsed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Legacy MySQL driver identifier (Connector/J 5.1.x and earlier).
pub const MYSQL_DRIVER_LEGACY: &str = "com.mysql.jdbc.Driver";
/// Modern MySQL driver identifier (Connector/J 8.0.x and later).
pub const MYSQL_DRIVER_MODERN: &str = "com.mysql.cj.jdbc.Driver";
/// PostgreSQL driver identifier.
pub const POSTGRES_DRIVER: &str = "org.postgresql.Driver";
/// Oracle thin driver identifier.
pub const ORACLE_DRIVER: &str = "oracle.jdbc.driver.OracleDriver";

/// Supported database vendors.
///
/// `Generic` addresses any database reachable through a user-supplied URL
/// and driver identifier; the named vendors carry built-in defaults.
///
/// # Examples
///
/// ```
/// use reportlink_core::Vendor;
///
/// assert_eq!(Vendor::Postgres.default_port(), Some(5432));
/// assert_eq!(Vendor::tag_for_file_name("MySQL-connector-8.so"), Some(Vendor::MySql));
/// assert_eq!(Vendor::tag_for_file_name("notes.txt"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// MySQL and compatible servers.
    MySql,
    /// PostgreSQL.
    Postgres,
    /// Oracle (thin wire protocol, service id addressing).
    Oracle,
    /// Any vendor addressed by an explicit URL and driver identifier.
    Generic,
}

impl Vendor {
    /// Default wire port, or `None` when the vendor requires a full URL.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Vendor::MySql => Some(3306),
            Vendor::Postgres => Some(5432),
            Vendor::Oracle => Some(1521),
            Vendor::Generic => None,
        }
    }

    /// Filename keywords that tag a package file as belonging to this
    /// vendor. PostgreSQL matches on either of two alternate spellings.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Vendor::MySql => &["mysql"],
            Vendor::Postgres => &["postgresql", "postgres"],
            Vendor::Oracle => &["oracle"],
            Vendor::Generic => &[],
        }
    }

    /// Built-in driver identifier, or `None` for the generic vendor, which
    /// has no default and must be configured explicitly.
    pub fn default_identifier(&self) -> Option<&'static str> {
        match self {
            Vendor::MySql => Some(MYSQL_DRIVER_LEGACY),
            Vendor::Postgres => Some(POSTGRES_DRIVER),
            Vendor::Oracle => Some(ORACLE_DRIVER),
            Vendor::Generic => None,
        }
    }

    /// Identifiers known to ship inside this vendor's packages, in probe
    /// order. Used for diagnostic probing while installing a loader
    /// context; the connect-time candidate chain additionally appends the
    /// user-configured identifier.
    pub fn known_identifiers(&self) -> &'static [&'static str] {
        match self {
            Vendor::MySql => &[MYSQL_DRIVER_LEGACY, MYSQL_DRIVER_MODERN],
            Vendor::Postgres => &[POSTGRES_DRIVER],
            Vendor::Oracle => &[ORACLE_DRIVER],
            Vendor::Generic => &[],
        }
    }

    /// Tags a package file name with a vendor via case-insensitive
    /// substring match against the keyword sets. Unmatched names yield
    /// `None`; that is an "unknown" tag, never an error.
    pub fn tag_for_file_name(file_name: &str) -> Option<Vendor> {
        let lowered = file_name.to_lowercase();
        for vendor in [Vendor::MySql, Vendor::Postgres, Vendor::Oracle] {
            if vendor.keywords().iter().any(|kw| lowered.contains(kw)) {
                return Some(vendor);
            }
        }
        None
    }

    /// Lowercase vendor name as used in CLI arguments and profiles.
    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::MySql => "mysql",
            Vendor::Postgres => "postgres",
            Vendor::Oracle => "oracle",
            Vendor::Generic => "generic",
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        assert_eq!(Vendor::MySql.default_port(), Some(3306));
        assert_eq!(Vendor::Postgres.default_port(), Some(5432));
        assert_eq!(Vendor::Oracle.default_port(), Some(1521));
        assert_eq!(Vendor::Generic.default_port(), None);
    }

    #[test]
    fn test_tagging_is_case_insensitive() {
        assert_eq!(
            Vendor::tag_for_file_name("MySQL-Connector-8.0.33.so"),
            Some(Vendor::MySql)
        );
        assert_eq!(
            Vendor::tag_for_file_name("ORACLE-thin-21c.so"),
            Some(Vendor::Oracle)
        );
    }

    #[test]
    fn test_postgres_matches_both_spellings() {
        assert_eq!(
            Vendor::tag_for_file_name("postgresql-42.7.so"),
            Some(Vendor::Postgres)
        );
        assert_eq!(
            Vendor::tag_for_file_name("postgres-driver.so"),
            Some(Vendor::Postgres)
        );
    }

    #[test]
    fn test_unmatched_name_is_unknown() {
        assert_eq!(Vendor::tag_for_file_name("notes.txt"), None);
        assert_eq!(Vendor::tag_for_file_name("sqlite3.so"), None);
    }

    #[test]
    fn test_identifiers_are_verbatim() {
        assert_eq!(MYSQL_DRIVER_LEGACY, "com.mysql.jdbc.Driver");
        assert_eq!(MYSQL_DRIVER_MODERN, "com.mysql.cj.jdbc.Driver");
        assert_eq!(POSTGRES_DRIVER, "org.postgresql.Driver");
        assert_eq!(ORACLE_DRIVER, "oracle.jdbc.driver.OracleDriver");
    }

    #[test]
    fn test_display_round_trip_with_serde() {
        for vendor in [
            Vendor::MySql,
            Vendor::Postgres,
            Vendor::Oracle,
            Vendor::Generic,
        ] {
            let yaml = serde_yaml::to_string(&vendor).unwrap();
            assert_eq!(yaml.trim(), vendor.as_str());
        }
    }
}
