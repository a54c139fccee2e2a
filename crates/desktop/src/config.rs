use docmgmt_infra::StoreConfig;
use docmgmt_observability::LogConfig;

/// Everything the client needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub store: StoreConfig,
    pub log: LogConfig,
}

impl ClientConfig {
    /// `DOCMGMT_DATABASE_URL` and `DOCMGMT_LOG_FORMAT`, with defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            store: StoreConfig::from_env()?,
            log: LogConfig::from_env(),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            store: StoreConfig::new("sqlite::memory:"),
            log: LogConfig::default(),
        }
    }
}
