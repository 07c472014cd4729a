use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

// Use library instead of local modules
use swift_codes::{load_if_empty, logging, Config, LoadOutcome, SqliteRepository, SwiftCodeRepository};

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = env::args().collect();
    let config = Config::from_env();

    match args.get(1).map(String::as_str) {
        Some("import") => {
            let data_file = args.get(2).map(PathBuf::from).unwrap_or(config.data_file.clone());
            run_import(&config, data_file)
        }
        Some("stats") => run_stats(&config),
        _ => {
            eprintln!("Usage: swift-codes <import [FILE] | stats>");
            eprintln!("   Database: SWIFT_DB_PATH (default {})", config.db_path.display());
            eprintln!("   Data file: SWIFT_DATA_FILE (default {})", config.data_file.display());
            bail!("missing or unknown command");
        }
    }
}

fn run_import(config: &Config, data_file: PathBuf) -> Result<()> {
    println!("🗄️  SWIFT Code Import - CSV/XLSX → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Open database
    println!("\n🔧 Opening database...");
    let repo = SqliteRepository::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    println!("✓ Database ready: {}", config.db_path.display());

    // 2. Load data file (skipped when storage is populated)
    println!("\n📂 Loading {}...", data_file.display());
    let outcome = load_if_empty(&repo, &data_file)
        .with_context(|| format!("Failed to import {}", data_file.display()))?;

    match outcome {
        LoadOutcome::AlreadyLoaded => {
            println!("✓ Data already loaded, nothing to do");
        }
        LoadOutcome::Loaded(report) => {
            println!("✓ Rows read: {}", report.rows_read);
            println!("✓ Imported: {}", report.imported);
            println!("✓ Skipped blank rows: {}", report.skipped_blank);
            println!("✓ Rejected codes: {}", report.rejected_code);
            println!("✓ Failed rows: {}", report.failed);
            println!("✓ Duplicates in file: {}", report.duplicates);
        }
    }

    // 3. Verify count
    println!("\n🔍 Verifying database...");
    let count = repo.count_all()?;
    println!("✓ Database contains {} swift codes", count);

    Ok(())
}

fn run_stats(config: &Config) -> Result<()> {
    let repo = SqliteRepository::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;

    println!("{} swift codes in {}", repo.count_all()?, config.db_path.display());
    Ok(())
}
