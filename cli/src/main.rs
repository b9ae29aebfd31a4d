use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reportlink_core::{ConnectionSpec, Diagnostics, Vendor};
use reportlink_driver::{ConnectionFactory, Provisioner};

/// CLI-specific vendor enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliVendor {
    Mysql,
    Postgres,
    Oracle,
    Generic,
}

impl From<CliVendor> for Vendor {
    fn from(vendor: CliVendor) -> Self {
        match vendor {
            CliVendor::Mysql => Self::MySql,
            CliVendor::Postgres => Self::Postgres,
            CliVendor::Oracle => Self::Oracle,
            CliVendor::Generic => Self::Generic,
        }
    }
}

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "reportlink")]
#[command(about = "Database driver provisioning and connection checks")]
struct Cli {
    /// Stream every resolution step, discovery result, and strategy
    /// attempt to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Provision a driver and verify that a connection can be established.
    Check(CheckArgs),
    /// List driver packages discovered in the driver directory.
    Scan(ScanArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// YAML connection profile; explicit flags override profile values.
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Datasource type: mysql, postgres, oracle, generic.
    #[arg(short = 't', long = "db-type")]
    db_type: Option<CliVendor>,
    /// Database host.
    #[arg(short = 'H', long = "db-host")]
    db_host: Option<String>,
    /// Database user.
    #[arg(short = 'u', long = "db-user")]
    db_user: Option<String>,
    /// Database password.
    #[arg(short = 'p', long = "db-passwd")]
    db_passwd: Option<String>,
    /// Database port (vendor default if unset).
    #[arg(long = "db-port")]
    db_port: Option<u16>,
    /// Database name.
    #[arg(short = 'n', long = "db-name")]
    db_name: Option<String>,
    /// Oracle service id.
    #[arg(long = "db-sid")]
    db_sid: Option<String>,
    /// Driver identifier override.
    #[arg(long = "db-driver")]
    db_driver: Option<String>,
    /// Raw connection URL (generic vendor), used verbatim.
    #[arg(long = "db-url")]
    db_url: Option<String>,
    /// Directory containing driver packages.
    #[arg(long = "driver-dir")]
    driver_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// Directory containing driver packages.
    #[arg(long = "driver-dir")]
    driver_dir: Option<PathBuf>,
    /// Output format for the package listing.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check(args) => run_check(args, cli.verbose),
        Command::Scan(args) => run_scan(args, cli.verbose),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_check(args: CheckArgs, verbose: bool) -> Result<(), String> {
    let spec = build_spec(&args)?;
    let mut diag = Diagnostics::stderr(verbose);

    let mut provisioner = match &args.driver_dir {
        Some(dir) => Provisioner::with_override(dir),
        None => Provisioner::new(),
    };
    provisioner
        .initialize(Some(spec.vendor), &mut diag)
        .map_err(|e| e.to_string())?;

    let factory = ConnectionFactory::new(&provisioner);
    let conn = factory.connect(&spec, &mut diag).map_err(|e| e.to_string())?;
    println!("Connection established: {}", conn.url());
    conn.close().map_err(|e| e.to_string())?;
    Ok(())
}

fn run_scan(args: ScanArgs, verbose: bool) -> Result<(), String> {
    let mut diag = Diagnostics::stderr(verbose);

    let mut provisioner = match &args.driver_dir {
        Some(dir) => Provisioner::with_override(dir),
        None => Provisioner::new(),
    };
    let dir = provisioner.resolve_dir(&mut diag).map_err(|e| e.to_string())?;
    let modules = provisioner.scan(&mut diag).map_err(|e| e.to_string())?;

    match args.format {
        CliOutputFormat::Json => {
            let raw = serde_json::to_string_pretty(&modules)
                .map_err(|err| format!("Failed to serialize package listing: {err}"))?;
            println!("{raw}");
        }
        CliOutputFormat::Yaml => {
            let raw = serde_yaml::to_string(&modules)
                .map_err(|err| format!("Failed to serialize package listing: {err}"))?;
            print!("{raw}");
        }
        CliOutputFormat::Table => {
            println!("Driver packages in {}:", dir.display());
            if modules.is_empty() {
                println!("  (none)");
            }
            for module in &modules {
                println!(
                    "  {:<40} vendor: {:<10} loadable: {}",
                    module.file_name,
                    module.vendor_tag(),
                    if module.loadable { "yes" } else { "no" }
                );
            }
        }
    }

    Ok(())
}

fn build_spec(args: &CheckArgs) -> Result<ConnectionSpec, String> {
    let mut spec = match (&args.profile, args.db_type) {
        (Some(path), _) => ConnectionSpec::load(path).map_err(|e| e.to_string())?,
        (None, Some(vendor)) => ConnectionSpec::new(vendor.into()),
        (None, None) => {
            return Err("specify a datasource with --db-type or --profile".to_string());
        }
    };

    if let Some(vendor) = args.db_type {
        spec.vendor = vendor.into();
    }
    if let Some(host) = &args.db_host {
        spec.host = host.clone();
    }
    if let Some(user) = &args.db_user {
        spec.user = user.clone();
    }
    if let Some(passwd) = &args.db_passwd {
        spec.password = passwd.clone();
    }
    if args.db_port.is_some() {
        spec.port = args.db_port;
    }
    if args.db_name.is_some() {
        spec.dbname = args.db_name.clone();
    }
    if args.db_sid.is_some() {
        spec.sid = args.db_sid.clone();
    }
    if args.db_driver.is_some() {
        spec.driver = args.db_driver.clone();
    }
    if args.db_url.is_some() {
        spec.url = args.db_url.clone();
    }

    Ok(spec)
}
