mod bsa;
mod collisions;
mod inputs;

use bsa::BsaReader;
use collisions::{CollisionIndex, HashBucket};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::{debug, info};
use std::path::{Path, PathBuf};

const USAGE: &str = "Usage: [path to BSA] [optional additional BSAs]";

#[derive(Parser)]
#[command(name = "bsa-hash-checker")]
#[command(version = "1.0.0")]
#[command(about = "Find file names that share a hash inside Morrowind BSA archives", long_about = None)]
struct Cli {
    /// BSA archives to check; directories are searched for *.bsa files
    #[arg(allow_hyphen_values = true)]
    paths: Vec<PathBuf>,

    /// Print each colliding hash in front of its names
    #[arg(long)]
    show_hashes: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Argument errors exit 1 like any other failure; --help/--version exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    // Initialize logging
    // If RUST_LOG is set, use it; otherwise use cli.verbose flag
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    } else {
        env_logger::Builder::new()
            .filter_level(if cli.verbose {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            })
            .init();
    }

    if cli.paths.is_empty() {
        println!("{}", USAGE);
        return Ok(());
    }

    let archives = inputs::collect_archives(&cli.paths)?;

    // Any failure aborts the run before anything is reported
    let mut index = CollisionIndex::new();
    for path in &archives {
        check_archive(path, &mut index)?;
    }

    let buckets: Vec<_> = index.collisions().collect();
    for bucket in &buckets {
        println!("{}", format_bucket(bucket, cli.show_hashes));
    }

    info!(
        "Checked {} archives: {} names, {} distinct hashes, {} collisions",
        archives.len(),
        index.total_names(),
        index.distinct_hashes(),
        buckets.len()
    );

    Ok(())
}

/// Read one archive and add its entries to the shared index
///
/// The file is closed when the reader drops at the end of this call.
fn check_archive(path: &Path, index: &mut CollisionIndex) -> Result<()> {
    let mut reader =
        BsaReader::open(path).with_context(|| format!("Failed to open BSA: {:?}", path))?;
    let entries = match reader.read_entries() {
        Ok(entries) => entries,
        Err(err) => {
            let hint = if err.is_invalid_format() {
                " (not a valid version 256 archive)"
            } else if err.is_truncated() {
                " (file ends before its header says it should)"
            } else {
                ""
            };
            return Err(err).with_context(|| format!("Failed to read BSA: {:?}{}", path, hint));
        }
    };

    if let Some(header) = reader.header() {
        debug!(
            "{:?}: hash table at byte {}",
            path,
            header.hash_table_start()
        );
    }
    info!("Read {} entries from {:?}", entries.len(), path);

    index.extend(entries);
    Ok(())
}

/// One report line: `[name1, name2]`, optionally prefixed with the hash
fn format_bucket(bucket: &HashBucket, show_hash: bool) -> String {
    let names = format!("[{}]", bucket.names.iter().join(", "));
    if show_hash {
        format!("{}: {}", bucket.hash, names)
    } else {
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsa::BsaHash;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_accepts_no_paths() {
        let cli = Cli::try_parse_from(["bsa-hash-checker"]).unwrap();
        assert!(cli.paths.is_empty());
        assert!(!cli.show_hashes);
    }

    #[test]
    fn test_cli_accepts_hyphenated_paths() {
        let cli =
            Cli::try_parse_from(["bsa-hash-checker", "--show-hashes", "-weird.bsa", "b.bsa"]).unwrap();
        assert!(cli.show_hashes);
        assert_eq!(cli.paths, [PathBuf::from("-weird.bsa"), PathBuf::from("b.bsa")]);
    }

    #[test]
    fn test_format_bucket() {
        let bucket = HashBucket {
            hash: BsaHash(0x0000_0001_0000_0002),
            names: vec!["a".to_string(), "bb".to_string()],
        };
        assert_eq!(format_bucket(&bucket, false), "[a, bb]");
        assert_eq!(format_bucket(&bucket, true), "0x0000000100000002: [a, bb]");
    }

    #[test]
    fn test_check_archive_missing_file() {
        let mut index = CollisionIndex::new();
        let err = check_archive(Path::new("/nonexistent/Morrowind.bsa"), &mut index).unwrap_err();
        assert!(err.to_string().contains("Failed to open BSA"));
        assert_eq!(index.total_names(), 0);
    }

    #[test]
    fn test_check_archive_error_carries_hint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Morrowind.bsa");
        std::fs::write(&path, 0x0041_5342u32.to_le_bytes().repeat(3)).unwrap();

        let mut index = CollisionIndex::new();
        let err = check_archive(&path, &mut index).unwrap_err();
        // One message carrying the hint, followed by the underlying cause
        assert!(err.to_string().contains("not a valid version 256 archive"));
        assert!(format!("{:#}", err).contains("Invalid BSA version"));
    }
}
