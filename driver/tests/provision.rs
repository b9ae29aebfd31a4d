use std::path::Path;
use std::sync::Arc;

use reportlink_core::{
    BoxError, ConnectionSpec, Diagnostics, MYSQL_DRIVER_LEGACY, ProvisionError, Vendor,
};
use reportlink_driver::api::{Connection, Credentials, Driver};
use reportlink_driver::{
    ConnectionFactory, DriverSearchPath, PACKAGE_EXTENSION, Provisioner, scan,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct StubDriver {
    identifier: &'static str,
    url_prefix: &'static str,
}

impl Driver for StubDriver {
    fn identifier(&self) -> &str {
        self.identifier
    }

    fn accepts_url(&self, url: &str) -> bool {
        url.starts_with(self.url_prefix)
    }

    fn connect(
        &self,
        url: &str,
        _credentials: &Credentials,
    ) -> Result<Box<dyn Connection>, BoxError> {
        Ok(Box::new(StubConnection { url: url.into() }))
    }
}

struct StubConnection {
    url: String,
}

impl Connection for StubConnection {
    fn url(&self) -> &str {
        &self.url
    }

    fn close(self: Box<Self>) -> Result<(), BoxError> {
        Ok(())
    }
}

fn stub_driver(identifier: &'static str, url_prefix: &'static str) -> Arc<dyn Driver> {
    Arc::new(StubDriver {
        identifier,
        url_prefix,
    })
}

fn touch(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"stub").unwrap();
}

// ---------------------------------------------------------------------------
// Directory resolution
// ---------------------------------------------------------------------------

#[test]
fn test_override_must_exist() {
    let mut diag = Diagnostics::quiet();
    let err = DriverSearchPath::with_override("/nonexistent/drivers")
        .resolve_from(Path::new("/tmp"), None, &mut diag)
        .unwrap_err();
    assert!(matches!(err, ProvisionError::DirectoryNotFound { .. }));
}

#[test]
fn test_each_default_candidate_position_can_win() {
    // Candidate 1: <cwd>/drivers
    let root = tempfile::tempdir().unwrap();
    let cwd = root.path().join("a/b");
    std::fs::create_dir_all(cwd.join("drivers")).unwrap();
    let mut diag = Diagnostics::quiet();
    let resolved = DriverSearchPath::new()
        .resolve_from(&cwd, None, &mut diag)
        .unwrap();
    assert_eq!(resolved, cwd.join("drivers"));

    // Candidate 2: <cwd parent>/drivers
    let root = tempfile::tempdir().unwrap();
    let cwd = root.path().join("work");
    std::fs::create_dir_all(&cwd).unwrap();
    std::fs::create_dir_all(root.path().join("drivers")).unwrap();
    let resolved = DriverSearchPath::new()
        .resolve_from(&cwd, None, &mut diag)
        .unwrap();
    assert_eq!(resolved, root.path().join("drivers"));

    // Candidate 3: sibling of the executable's bin directory
    let root = tempfile::tempdir().unwrap();
    let cwd = root.path().join("elsewhere");
    std::fs::create_dir_all(&cwd).unwrap();
    let install = root.path().join("install");
    std::fs::create_dir_all(install.join("bin")).unwrap();
    std::fs::create_dir_all(install.join("drivers")).unwrap();
    let exe = install.join("bin/reportlink");
    let resolved = DriverSearchPath::new()
        .resolve_from(&cwd, Some(&exe), &mut diag)
        .unwrap();
    assert_eq!(resolved, install.join("drivers"));
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[test]
fn test_discovery_tags_and_loadability() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &format!("mysql-connector-8.{PACKAGE_EXTENSION}"));
    touch(dir.path(), "notes.txt");
    touch(dir.path(), &format!("postgresql-42.{PACKAGE_EXTENSION}"));

    let mut diag = Diagnostics::quiet();
    let modules = scan::scan(dir.path(), &mut diag).unwrap();

    let tags: Vec<&str> = modules.iter().map(|m| m.vendor_tag()).collect();
    assert_eq!(tags, vec!["mysql", "unknown", "postgres"]);
    assert!(
        modules
            .iter()
            .filter(|m| m.loadable)
            .all(|m| m.file_name != "notes.txt")
    );
}

#[test]
fn test_repeated_resolution_and_scan_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &format!("oracle-21c.{PACKAGE_EXTENSION}"));

    let mut provisioner = Provisioner::with_override(dir.path());
    let mut diag = Diagnostics::quiet();

    let first_dir = provisioner.resolve_dir(&mut diag).unwrap();
    let first_scan = provisioner.scan(&mut diag).unwrap();
    let second_dir = provisioner.resolve_dir(&mut diag).unwrap();
    let second_scan = provisioner.scan(&mut diag).unwrap();

    assert_eq!(first_dir, second_dir);
    assert_eq!(first_scan.len(), second_scan.len());
    for (a, b) in first_scan.iter().zip(&second_scan) {
        assert_eq!(a.file_name, b.file_name);
        assert_eq!(a.vendor, b.vendor);
    }

    // Loader state is untouched by resolution and scanning alone.
    assert!(provisioner.context().registered_identifiers().is_empty());
}

// ---------------------------------------------------------------------------
// End-to-end provisioning and connection
// ---------------------------------------------------------------------------

#[test]
fn test_full_pipeline_with_registered_driver() {
    let dir = tempfile::tempdir().unwrap();
    // A garbage package alongside: loading it fails, the run continues.
    touch(dir.path(), &format!("postgresql-42.{PACKAGE_EXTENSION}"));

    let (mut diag, buffer) = Diagnostics::capture(true);
    let mut provisioner = Provisioner::with_override(dir.path());
    provisioner
        .initialize(Some(Vendor::Postgres), &mut diag)
        .unwrap();
    provisioner.register_driver(stub_driver("org.postgresql.Driver", "postgresql://"));

    let mut spec = ConnectionSpec::new(Vendor::Postgres);
    spec.host = "db.internal".into();
    spec.dbname = Some("reports".into());
    spec.user = "reports".into();
    spec.password = "secret".into();

    let factory = ConnectionFactory::new(&provisioner);
    let conn = factory.connect(&spec, &mut diag).unwrap();
    assert_eq!(conn.url(), "postgresql://db.internal:5432/reports");
    conn.close().unwrap();

    let output = buffer.contents();
    assert!(output.contains("Found postgres driver package: postgresql-42"));
    assert!(output.contains("Successfully resolved driver: org.postgresql.Driver"));
}

#[test]
fn test_mysql_chain_connects_via_legacy_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut provisioner = Provisioner::with_override(dir.path());
    let mut diag = Diagnostics::quiet();
    provisioner.initialize(Some(Vendor::MySql), &mut diag).unwrap();
    provisioner.register_driver(stub_driver(MYSQL_DRIVER_LEGACY, "mysql://"));

    let mut spec = ConnectionSpec::new(Vendor::MySql);
    spec.host = "db1".into();
    spec.dbname = Some("reports".into());

    let (mut diag, buffer) = Diagnostics::capture(true);
    let factory = ConnectionFactory::new(&provisioner);
    let conn = factory.connect(&spec, &mut diag).unwrap();
    assert_eq!(
        conn.url(),
        "mysql://db1:3306/reports?useSSL=false&allowPublicKeyRetrieval=true"
    );
    conn.close().unwrap();

    // The modern identifier is never attempted once legacy resolves.
    assert!(!buffer.contents().contains("com.mysql.cj.jdbc.Driver"));
}

#[test]
fn test_missing_vendor_package_warns_but_still_connects() {
    let dir = tempfile::tempdir().unwrap();

    let (mut diag, buffer) = Diagnostics::capture(true);
    let mut provisioner = Provisioner::with_override(dir.path());
    provisioner
        .initialize(Some(Vendor::Oracle), &mut diag)
        .unwrap();
    provisioner.register_driver(stub_driver("oracle.jdbc.driver.OracleDriver", "oracle:"));

    let mut spec = ConnectionSpec::new(Vendor::Oracle);
    spec.host = "ora1".into();
    spec.sid = Some("XE".into());

    let factory = ConnectionFactory::new(&provisioner);
    let conn = factory.connect(&spec, &mut diag).unwrap();
    assert_eq!(conn.url(), "oracle:thin:@ora1:1521:XE");
    conn.close().unwrap();

    assert!(buffer.contents().contains("WARNING: no oracle driver package"));
}
