//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};
use sandstock_common_config::{ChangelogMode, ConfigError, ConfigLoader, SandstockConfig};

use crate::commands::{ChangesCommand, MigrateCommand, RestockCommand, SeedCommand};

/// Sandstock - inventory store with change data capture
///
/// Every insert, update and delete of a business entity is recorded in the
/// `change_log` table.
#[derive(Debug, Parser)]
#[command(
    name = "sandstock",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "SANDSTOCK_CONFIG_PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Override the configured change capture mode
    #[arg(long, global = true, value_enum)]
    pub mode: Option<ModeArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Immediate,
    Queued,
}

impl From<ModeArg> for ChangelogMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Immediate => ChangelogMode::Immediate,
            ModeArg::Queued => ChangelogMode::Queued,
        }
    }
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create or upgrade the database schema
    Migrate(MigrateCommand),

    /// Populate the database with generated inventory data
    Seed(SeedCommand),

    /// Add stock to a product
    Restock(RestockCommand),

    /// Show recorded change logs
    Changes(ChangesCommand),
}

impl Cli {
    /// Load the configuration file and apply command line overrides.
    pub fn load_config(&self) -> Result<SandstockConfig, ConfigError> {
        let loader = match &self.config {
            Some(path) => ConfigLoader::new(path),
            None => ConfigLoader::from_env(),
        };

        let mut config = loader.load()?;
        if let Some(mode) = self.mode {
            config.changelog.mode = mode.into();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Scale;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_defaults() {
        let cli = Cli::try_parse_from(["sandstock", "seed"]).unwrap();
        match cli.command {
            Command::Seed(cmd) => {
                assert_eq!(cmd.scale, Scale::Full);
                assert_eq!(cmd.seed, 42);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.mode, None);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sandstock", "changes", "--table", "dim_product", "--mode", "queued", "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.mode, Some(ModeArg::Queued));
        match cli.command {
            Command::Changes(cmd) => {
                assert_eq!(cmd.table.as_deref(), Some("dim_product"));
                assert_eq!(cmd.limit, 20);
                assert!(!cmd.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_restock() {
        let cli = Cli::try_parse_from(["sandstock", "restock", "3", "25", "--user", "2"]).unwrap();
        match cli.command {
            Command::Restock(cmd) => {
                assert_eq!(cmd.product_id, 3);
                assert_eq!(cmd.quantity, 25);
                assert_eq!(cmd.user, 2);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result = Cli::try_parse_from(["sandstock", "migrate", "--mode", "lazy"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_mode_override_applies_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sandstock.yaml");
        std::fs::write(&path, "changelog:\n  mode: immediate\n").unwrap();

        let args: Vec<std::ffi::OsString> = vec![
            "sandstock".into(),
            "--config".into(),
            path.into_os_string(),
            "--mode".into(),
            "queued".into(),
            "migrate".into(),
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        let config = cli.load_config().unwrap();
        assert_eq!(config.changelog.mode, ChangelogMode::Queued);
    }
}
