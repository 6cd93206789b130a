use std::time::{Duration, Instant};

use log::{debug, info, warn};
use sqlite::{Connection, Statement};

use crate::{
    common::LoadError,
    config::{LoadConfig, ITEM_COLUMNS},
    database,
    observer::LoadObserver,
    value::ItemRow,
};

/// Outcome of a finished load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows written, or only derived on a dry run.
    pub rows: u64,
    pub commits: u64,
    pub last_committed_row: Option<u64>,
    pub duration: Duration,
    pub dry_run: bool,
}

#[derive(Debug, Default)]
struct Progress {
    rows: u64,
    commits: u64,
    last_committed_row: Option<u64>,
    in_transaction: bool,
}

impl Progress {
    fn committed(&self) -> u64 {
        self.last_committed_row.unwrap_or(0)
    }
}

pub struct Loader {
    config: LoadConfig,
}

impl Loader {
    /// # Errors
    ///
    /// When the config does not validate.
    pub fn new(config: LoadConfig) -> Result<Self, LoadError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Connects, creates the tables, inserts rows `1..row_count` and commits.
    ///
    /// The connection lives only inside this call. On any failure the open batch is rolled back,
    /// so the database keeps exactly the rows of the last commit.
    ///
    /// # Errors
    ///
    /// On connect, existing tables, insert failures and interruption by the observer.
    pub fn run(&self, observer: &mut impl LoadObserver) -> Result<LoadReport, LoadError> {
        let started = Instant::now();
        let mut progress = Progress::default();

        if let Err(err) = self.load(observer, &mut progress) {
            warn!("Load failed: {err}");
            observer.on_error(&err);
            return Err(err);
        }

        let report = LoadReport {
            rows: progress.rows,
            commits: progress.commits,
            last_committed_row: progress.last_committed_row,
            duration: started.elapsed(),
            dry_run: self.config.dry_run,
        };
        info!(
            "Load finished: {} rows, {} commits in {:?}",
            report.rows, report.commits, report.duration
        );
        observer.on_complete(&report);

        Ok(report)
    }

    fn load(
        &self,
        observer: &mut impl LoadObserver,
        progress: &mut Progress,
    ) -> Result<(), LoadError> {
        if self.config.dry_run {
            info!("Dry run, not touching {}", self.config.db_path.display());
            return self.derive_rows(observer, progress);
        }

        let connection = database::open(&self.config.db_path)?;
        database::create_tables(&connection, &self.config.tables)?;

        if let Err(err) = self.insert_rows(&connection, observer, progress) {
            rollback(&connection, progress);
            return Err(err);
        }

        debug!("Closing database: {}", self.config.db_path.display());
        Ok(())
    }

    fn insert_rows(
        &self,
        connection: &Connection,
        observer: &mut impl LoadObserver,
        progress: &mut Progress,
    ) -> Result<(), LoadError> {
        let target = self.config.target_schema()?;
        let mut statement = connection.prepare(insert_sql(&target.name))?;

        for index in 1..self.config.row_count {
            if observer.before_row(index).is_break() {
                return Err(LoadError::Interrupted {
                    row: index,
                    committed: progress.committed(),
                });
            }

            let row = ItemRow::new(index, self.config.id_binding)?;

            if !progress.in_transaction {
                connection.execute("BEGIN")?;
                progress.in_transaction = true;
            }

            insert_row(&mut statement, &row).map_err(|source| LoadError::Insert {
                row: index,
                committed: progress.committed(),
                source,
            })?;
            progress.rows += 1;

            if index % self.config.commit_interval == 0 {
                commit(connection, progress, index)?;
                observer.on_commit(index);
            }

            if index % self.config.log_interval == 0 {
                debug!("Progress: {index} rows");
                observer.on_progress(index);
            }
        }

        if progress.in_transaction {
            let last_row = progress.rows;
            commit(connection, progress, last_row)?;
            observer.on_commit(last_row);
        }

        Ok(())
    }

    fn derive_rows(
        &self,
        observer: &mut impl LoadObserver,
        progress: &mut Progress,
    ) -> Result<(), LoadError> {
        for index in 1..self.config.row_count {
            if observer.before_row(index).is_break() {
                return Err(LoadError::Interrupted {
                    row: index,
                    committed: 0,
                });
            }

            ItemRow::new(index, self.config.id_binding)?;
            progress.rows += 1;

            if index % self.config.log_interval == 0 {
                observer.on_progress(index);
            }
        }

        Ok(())
    }
}

fn insert_sql(table_name: &str) -> String {
    format!(
        "INSERT INTO {table_name} ({}) VALUES (?, ?, ?)",
        ITEM_COLUMNS.join(", ")
    )
}

fn insert_row(statement: &mut Statement<'_>, row: &ItemRow) -> Result<(), sqlite::Error> {
    row.bind_to(statement)?;
    statement.next()?;
    statement.reset()
}

fn commit(connection: &Connection, progress: &mut Progress, last_row: u64) -> Result<(), LoadError> {
    connection.execute("COMMIT")?;
    progress.in_transaction = false;
    progress.commits += 1;
    progress.last_committed_row = Some(last_row);
    debug!("Committed up to row {last_row}");
    Ok(())
}

fn rollback(connection: &Connection, progress: &Progress) {
    if !progress.in_transaction {
        return;
    }

    match connection.execute("ROLLBACK") {
        Ok(()) => info!(
            "Rolled back uncommitted rows, {} rows remain committed",
            progress.committed()
        ),
        Err(err) => warn!("Rollback failed: {err}"),
    }
}
