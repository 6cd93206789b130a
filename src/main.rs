use std::path::PathBuf;

use anyhow::Context;
use itemload::{config::LoadConfig, loader::Loader, observer::StdoutProgress};
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => LoadConfig::from_json_file(PathBuf::from(path))
            .context("Failed loading config")?,
        None => LoadConfig::default(),
    };

    let loader = Loader::new(config).context("Invalid load configuration")?;
    let report = loader
        .run(&mut StdoutProgress)
        .with_context(|| format!("Load into {} failed", loader.config().db_path.display()))?;

    info!(
        "Inserted {} rows into {} ({} commits, last committed row {:?})",
        report.rows,
        loader.config().target_table,
        report.commits,
        report.last_committed_row
    );

    Ok(())
}
