use std::path::PathBuf;

use anyhow::{bail, Context};
use itemload::{
    config::LoadConfig,
    database,
    verify::{count_rows, verify_items},
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => LoadConfig::from_json_file(PathBuf::from(path))
            .context("Failed loading config")?,
        None => LoadConfig::default(),
    };
    config.validate().context("Invalid load configuration")?;

    if !config.db_path.exists() {
        bail!("Database {} does not exist", config.db_path.display());
    }
    let connection = database::open(&config.db_path).context("Cannot open database")?;

    let report = verify_items(&connection, &config.target_table, config.row_count)
        .with_context(|| format!("Failed reading {}", config.target_table))?;
    println!(
        "{}: {} rows (expected {}), {} mismatched",
        config.target_table, report.rows, report.expected_rows, report.mismatched
    );

    let mut non_empty = vec![];
    for table in config.tables.iter().filter(|t| t.name != config.target_table) {
        let rows = count_rows(&connection, &table.name)
            .with_context(|| format!("Failed counting {}", table.name))?;
        println!("{}: {} rows", table.name, rows);
        if rows > 0 {
            non_empty.push(table.name.as_str());
        }
    }

    if let Some(id) = report.first_mismatch {
        bail!("{} does not match, first bad id {}", config.target_table, id);
    }
    if !report.is_complete() {
        bail!(
            "{} is incomplete: {} of {} rows",
            config.target_table,
            report.rows,
            report.expected_rows
        );
    }
    if !non_empty.is_empty() {
        bail!("Tables expected to stay empty have rows: {}", non_empty.join(", "));
    }

    Ok(())
}
