//! Environment variable handling.

use std::env;
use std::path::Path;

/// Environment variable names.
pub mod vars {
    pub const SANDSTOCK_CONFIG_PATH: &str = "SANDSTOCK_CONFIG_PATH";
    pub const SANDSTOCK_DATABASE_PATH: &str = "SANDSTOCK_DATABASE_PATH";
    pub const SANDSTOCK_CHANGELOG_MODE: &str = "SANDSTOCK_CHANGELOG_MODE";
    pub const SANDSTOCK_ENV: &str = "SANDSTOCK_ENV";
}

/// Dotenv files loaded by [`Environment::init`], in load order.
pub struct Environment {
    loaded: Vec<String>,
}

impl Environment {
    /// Load `.env`, `.env.local` and `.env.<SANDSTOCK_ENV>` from the working
    /// directory; variables already set are never overwritten.
    pub fn init() -> Self {
        Self::init_in(Path::new("."))
    }

    fn init_in(dir: &Path) -> Self {
        let mut names = vec![".env".to_string(), ".env.local".to_string()];
        if let Ok(name) = env::var(vars::SANDSTOCK_ENV) {
            names.push(format!(".env.{name}"));
        }

        let loaded = names
            .into_iter()
            .filter(|name| dotenvy::from_path(dir.join(name)).is_ok())
            .collect();

        Self { loaded }
    }

    /// Names of the files that were found and loaded.
    pub fn loaded(&self) -> &[String] {
        &self.loaded
    }
}
