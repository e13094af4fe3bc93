use std::fmt;

use clap::Args;
use sandstock_changelog_types::ChangeLog;

use crate::app::App;

/// List recorded change logs, newest first
#[derive(Debug, Args)]
pub struct ChangesCommand {
    /// Only show changes to this table
    #[arg(long)]
    pub table: Option<String>,

    /// Maximum number of entries
    #[arg(long, default_value_t = 20)]
    pub limit: i64,

    /// Print entries as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug)]
pub struct ChangesReport {
    pub logs: Vec<ChangeLog>,
    pub json: bool,
}

impl ChangesCommand {
    pub async fn execute(&self, app: &App) -> anyhow::Result<ChangesReport> {
        if self.limit <= 0 {
            anyhow::bail!("limit must be positive, got {}", self.limit);
        }

        let logs = match &self.table {
            Some(table) => app.changelog().list_for_table(table, self.limit).await?,
            None => app.changelog().list_recent(self.limit).await?,
        };

        Ok(ChangesReport {
            logs,
            json: self.json,
        })
    }
}

impl fmt::Display for ChangesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.json {
            let text = serde_json::to_string_pretty(&self.logs).map_err(|_| fmt::Error)?;
            return writeln!(f, "{text}");
        }

        if self.logs.is_empty() {
            return writeln!(f, "No changes recorded");
        }
        for log in &self.logs {
            writeln!(f, "{}", log.summary())?;
        }
        Ok(())
    }
}
