//! Driver package discovery.
//!
//! Scans the resolved driver directory and tags every file by vendor using
//! filename heuristics. Tagging is best-effort and non-blocking: a file
//! that matches no vendor keyword is tagged unknown, and the absence of a
//! required vendor's package is a warning only, since a driver may be
//! registered through mechanisms outside the search directory. Every scan
//! re-reads the filesystem.

use std::path::{Path, PathBuf};

use serde::Serialize;

use reportlink_core::{Diagnostics, Result, Vendor};

/// Platform extension for driver packages.
pub const PACKAGE_EXTENSION: &str = if cfg!(target_os = "windows") {
    "dll"
} else if cfg!(target_os = "macos") {
    "dylib"
} else {
    "so"
};

/// A file discovered in the driver directory.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateModule {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// File name component.
    pub file_name: String,
    /// Vendor inferred from the file name; `None` means unknown.
    pub vendor: Option<Vendor>,
    /// Whether the file carries the recognized package extension and can
    /// be handed to the dynamic loader.
    pub loadable: bool,
}

impl CandidateModule {
    /// Vendor tag as a display string (`"unknown"` for untagged files).
    pub fn vendor_tag(&self) -> &'static str {
        self.vendor.map_or("unknown", |v| v.as_str())
    }
}

/// Scans `dir` for candidate modules, sorted by file name.
///
/// # Errors
///
/// Returns [`ProvisionError::Io`](reportlink_core::ProvisionError::Io) if
/// the directory cannot be read.
pub fn scan(dir: &Path, diag: &mut Diagnostics) -> Result<Vec<CandidateModule>> {
    let mut modules = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let file_name = file_name.to_string();
        let loadable =
            path.extension().and_then(|e| e.to_str()) == Some(PACKAGE_EXTENSION);
        let vendor = Vendor::tag_for_file_name(&file_name);
        modules.push(CandidateModule {
            path,
            file_name,
            vendor,
            loadable,
        });
    }

    // read_dir order is platform-dependent; sort for deterministic output.
    modules.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    if diag.is_verbose() {
        diag.step("Files found in driver directory:");
        if modules.is_empty() {
            diag.step("  no files found in driver directory!");
        }
        for module in &modules {
            let size = std::fs::metadata(&module.path).map(|m| m.len()).unwrap_or(0);
            diag.step(format!(
                "  - {} ({} bytes, vendor: {})",
                module.file_name,
                size,
                module.vendor_tag()
            ));
        }
    }

    tracing::debug!(
        dir = %dir.display(),
        total = modules.len(),
        loadable = modules.iter().filter(|m| m.loadable).count(),
        "Scanned driver directory"
    );

    Ok(modules)
}

/// Checks that a loadable package for `vendor` was discovered; emits a
/// non-blocking warning otherwise. Discovery never blocks later loading
/// attempts.
pub fn warn_missing_vendor(
    modules: &[CandidateModule],
    vendor: Vendor,
    dir: &Path,
    diag: &mut Diagnostics,
) {
    if vendor.keywords().is_empty() {
        return;
    }

    match modules
        .iter()
        .find(|m| m.loadable && m.vendor == Some(vendor))
    {
        Some(module) => {
            diag.step(format!(
                "Found {} driver package: {}",
                vendor, module.file_name
            ));
        }
        None => {
            diag.warn(format!(
                "no {} driver package found in {}",
                vendor,
                dir.display()
            ));
            let hint = match vendor {
                Vendor::MySql => Some("a MySQL connector package"),
                Vendor::Postgres => Some("a PostgreSQL driver package"),
                _ => None,
            };
            if let Some(hint) = hint {
                diag.step(format!(
                    "         Place {hint} in the driver directory, or rely on an externally registered driver."
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"stub").unwrap();
    }

    #[test]
    fn test_scan_tags_by_vendor_and_flags_loadable() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &format!("mysql-connector-8.{PACKAGE_EXTENSION}"));
        touch(dir.path(), "notes.txt");
        touch(dir.path(), &format!("postgresql-42.{PACKAGE_EXTENSION}"));

        let mut diag = Diagnostics::quiet();
        let modules = scan(dir.path(), &mut diag).unwrap();

        let tags: Vec<&str> = modules.iter().map(|m| m.vendor_tag()).collect();
        assert_eq!(tags, vec!["mysql", "unknown", "postgres"]);

        let loadable: Vec<&str> = modules
            .iter()
            .filter(|m| m.loadable)
            .map(|m| m.file_name.as_str())
            .collect();
        assert_eq!(loadable.len(), 2);
        assert!(!loadable.contains(&"notes.txt"));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &format!("oracle-thin.{PACKAGE_EXTENSION}"));

        let mut diag = Diagnostics::quiet();
        let first = scan(dir.path(), &mut diag).unwrap();
        let second = scan(dir.path(), &mut diag).unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.file_name, b.file_name);
            assert_eq!(a.vendor, b.vendor);
            assert_eq!(a.loadable, b.loadable);
        }
    }

    #[test]
    fn test_scan_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("mysql-subdir")).unwrap();
        touch(dir.path(), &format!("mysql.{PACKAGE_EXTENSION}"));

        let mut diag = Diagnostics::quiet();
        let modules = scan(dir.path(), &mut diag).unwrap();
        assert_eq!(modules.len(), 1);
    }

    #[test]
    fn test_missing_vendor_is_a_warning_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut diag_source = Diagnostics::quiet();
        let modules = scan(dir.path(), &mut diag_source).unwrap();

        let (mut diag, buffer) = Diagnostics::capture(true);
        warn_missing_vendor(&modules, Vendor::MySql, dir.path(), &mut diag);
        assert!(buffer.contents().contains("WARNING: no mysql driver package"));
    }

    #[test]
    fn test_generic_vendor_never_warns() {
        let dir = tempfile::tempdir().unwrap();
        let (mut diag, buffer) = Diagnostics::capture(true);
        warn_missing_vendor(&[], Vendor::Generic, dir.path(), &mut diag);
        assert!(buffer.contents().is_empty());
    }
}
