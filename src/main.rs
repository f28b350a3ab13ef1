//! objdef CLI
//!
//! Usage:
//!   objdef [OPTIONS] [FILES]...
//!
//! Options:
//!   -m, --manifest <FILE>      TOML manifest listing sources in order
//!   -d, --dialect <DIALECT>    Force the dialect of FILES
//!   -v, --verbose              Log each source and definition as it is read
//!   -h, --help                 Print help

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use objdef::{read_files, Dialect, Manifest, ObjectDefinition, ReadOptions};

#[derive(Parser)]
#[command(name = "objdef")]
#[command(about = "Read and print container object definitions")]
struct Cli {
    /// Definition files, read after the manifest's sources
    files: Vec<PathBuf>,

    /// TOML manifest listing sources in order
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Dialect of FILES (detected per file when omitted)
    #[arg(short, long, value_enum)]
    dialect: Option<Dialect>,

    /// Debug logging to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.manifest.is_none() && cli.files.is_empty() {
        eprintln!("Error: no sources given (pass FILES or --manifest)");
        process::exit(1);
    }

    let mut objects: Vec<ObjectDefinition> = Vec::new();

    if let Some(path) = &cli.manifest {
        let manifest = match Manifest::from_file(path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error loading manifest '{}': {}", path.display(), e);
                process::exit(1);
            }
        };
        match manifest.read_definitions() {
            Ok(defs) => objects.extend(defs),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    }

    let options = ReadOptions::new().with_dialect(cli.dialect);
    match read_files(&cli.files, &options) {
        Ok(defs) => objects.extend(defs),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    for object in &objects {
        println!("{}", object);
    }
}
