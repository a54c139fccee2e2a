//! Store configuration, resolved from the environment.

use std::path::PathBuf;

use anyhow::Context;

pub const DATABASE_URL_VAR: &str = "DOCMGMT_DATABASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite connection URL, e.g. `sqlite://./docmgmt.db` or `sqlite::memory:`.
    pub database_url: String,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Read `DOCMGMT_DATABASE_URL`, falling back to a database file under the
    /// OS data directory.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var(DATABASE_URL_VAR) {
            Ok(url) if !url.trim().is_empty() => Ok(Self::new(url.trim())),
            _ => {
                let path = default_db_path()?;
                tracing::warn!(path = %path.display(), "{DATABASE_URL_VAR} not set; using default database location");
                Ok(Self::new(format!("sqlite://{}", path.to_string_lossy())))
            }
        }
    }

    /// Filesystem path behind a `sqlite://` URL. `None` for in-memory databases.
    pub fn database_path(&self) -> Option<PathBuf> {
        let rest = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or(rest);
        if path.is_empty() || path == ":memory:" {
            return None;
        }
        Some(PathBuf::from(path))
    }
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS data directory - tried data_dir() and home_dir()/.local/share")?;

    let mut path = base;
    path.push("docmgmt");
    path.push("docmgmt.db");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_extracted_from_file_urls() {
        let config = StoreConfig::new("sqlite:///var/lib/docmgmt/docmgmt.db?mode=rwc");
        assert_eq!(config.database_path(), Some(PathBuf::from("/var/lib/docmgmt/docmgmt.db")));

        let relative = StoreConfig::new("sqlite:docmgmt.db");
        assert_eq!(relative.database_path(), Some(PathBuf::from("docmgmt.db")));
    }

    #[test]
    fn in_memory_urls_have_no_path() {
        assert_eq!(StoreConfig::new("sqlite::memory:").database_path(), None);
        assert_eq!(StoreConfig::new("postgres://localhost/db").database_path(), None);
    }

    #[test]
    fn default_path_lives_under_a_docmgmt_directory() {
        let path = default_db_path().unwrap();
        assert!(path.ends_with("docmgmt/docmgmt.db"));
    }
}
