//! Process configuration from environment variables.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DATABASE_URL` | local docvault database | PostgreSQL connection string |
//! | `DATABASE_MAX_CONNECTIONS` | `10` | Pool size |
//! | `S3_ENDPOINT` | AWS default | Custom S3 endpoint (MinIO) |
//! | `S3_REGION` | `us-east-1` | Bucket region |
//! | `S3_ACCESS_KEY` / `S3_SECRET_KEY` | ambient credentials | Static credentials |
//! | `S3_BUCKET` | `documents` | Bucket for originals and previews |
//! | `ELASTICSEARCH_URL` | unset | Search index; unset disables full-text search |
//! | `ELASTICSEARCH_USERNAME` / `ELASTICSEARCH_PASSWORD` | unset | Basic auth |
//! | `ELASTICSEARCH_INDEX` | `documents` | Index name |
//! | `SEARCH_LANGUAGE` | `russian` | Analyzer language for new indexes |
//! | `GOTENBERG_URL` | unset | Conversion service; unset disables previews |
//! | `GOTENBERG_TIMEOUT_SECS` | `60` | Conversion request timeout |
//! | `DOCD_URL` | unset | Extraction service; unset disables text indexing |
//! | `JOB_MAX_CONCURRENT` | `8` | Max concurrently executing background jobs |

use std::time::Duration;

use docvault_core::env::{self, Lookup};
use docvault_core::{defaults, Result};
use docvault_jobs::DispatcherConfig;
use docvault_search::ElasticsearchConfig;
use docvault_storage::S3Config;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub s3: S3Config,
    /// `None` runs without a search index.
    pub elasticsearch: Option<ElasticsearchConfig>,
    pub gotenberg_url: Option<String>,
    pub gotenberg_timeout: Duration,
    pub docd_url: Option<String>,
    pub dispatcher: DispatcherConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env::process)
    }

    /// Build from an arbitrary variable source. Empty values count as unset;
    /// a numeric variable that does not parse is a `Validation` error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup: Lookup<'_> = &lookup;
        let var = |name: &str| env::var(lookup, name);

        Ok(Self {
            database_url: var(defaults::ENV_DATABASE_URL)
                .unwrap_or_else(|| defaults::DATABASE_URL.to_string()),
            database_max_connections: env::parse_or(
                lookup,
                defaults::ENV_DATABASE_MAX_CONNECTIONS,
                defaults::DB_MAX_CONNECTIONS,
            )?,
            s3: S3Config::from_lookup(lookup),
            elasticsearch: ElasticsearchConfig::from_lookup(lookup),
            gotenberg_url: var(defaults::ENV_GOTENBERG_URL),
            gotenberg_timeout: Duration::from_secs(env::parse_or(
                lookup,
                defaults::ENV_GOTENBERG_TIMEOUT_SECS,
                defaults::CONVERSION_TIMEOUT_SECS,
            )?),
            docd_url: var(defaults::ENV_DOCD_URL),
            dispatcher: DispatcherConfig::from_lookup(lookup)?,
        })
    }
}
