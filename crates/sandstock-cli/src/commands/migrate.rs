use std::fmt;

use clap::Args;
use sandstock_database::migration::MigrationResult;
use sandstock_database::MigrationRunner;

use crate::app::App;

/// Apply pending schema migrations
///
/// Opening the database already applies them; this command reports what
/// was applied and can verify the recorded checksums.
#[derive(Debug, Args)]
pub struct MigrateCommand {
    /// Also check applied migrations against this build
    #[arg(long)]
    pub verify: bool,
}

#[derive(Debug)]
pub struct MigrateReport {
    pub applied: Vec<MigrationResult>,
    pub current_version: Option<i64>,
}

impl MigrateCommand {
    pub async fn execute(&self, app: &App) -> anyhow::Result<MigrateReport> {
        let runner = MigrationRunner::with_schema(app.pool().pool().clone());

        if self.verify {
            let mismatched = runner.verify().await?;
            if !mismatched.is_empty() {
                anyhow::bail!("schema verification failed: {}", mismatched.join("; "));
            }
        }

        Ok(MigrateReport {
            applied: app.migrations().to_vec(),
            current_version: runner.current_version().await?,
        })
    }
}

impl fmt::Display for MigrateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.applied.is_empty() {
            writeln!(f, "Schema is up to date")?;
        }
        for migration in &self.applied {
            writeln!(
                f,
                "Applied {:>3} {} ({} ms)",
                migration.version, migration.name, migration.execution_time_ms
            )?;
        }
        match self.current_version {
            Some(version) => writeln!(f, "Current version: {version}"),
            None => writeln!(f, "Current version: none"),
        }
    }
}
