//! Elasticsearch-compatible full-text index over HTTP.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use docvault_core::env::{self, Lookup};
use docvault_core::{defaults, BoolQuery, Error, Result, SearchDocument, SearchHit, SearchIndex};

use crate::query::{index_definition, search_body};

#[derive(Debug, Clone)]
pub struct ElasticsearchConfig {
    pub url: String,
    pub index: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub language: String,
    pub timeout: Duration,
}

impl ElasticsearchConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            index: defaults::SEARCH_INDEX.to_string(),
            username: None,
            password: None,
            language: defaults::SEARCH_LANGUAGE.to_string(),
            timeout: Duration::from_secs(defaults::SEARCH_TIMEOUT_SECS),
        }
    }

    /// Read `ELASTICSEARCH_URL` and friends. Returns `None` when no URL is
    /// configured, meaning the deployment runs without a search index.
    pub fn from_lookup(lookup: Lookup<'_>) -> Option<Self> {
        let mut config = Self::new(env::var(lookup, defaults::ENV_ELASTICSEARCH_URL)?);
        config.username = env::var(lookup, defaults::ENV_ELASTICSEARCH_USERNAME);
        config.password = env::var(lookup, defaults::ENV_ELASTICSEARCH_PASSWORD);
        if let Some(index) = env::var(lookup, defaults::ENV_ELASTICSEARCH_INDEX) {
            config.index = index;
        }
        if let Some(language) = env::var(lookup, defaults::ENV_SEARCH_LANGUAGE) {
            config.language = language;
        }
        Some(config)
    }
}

#[derive(Debug, Clone)]
pub struct ElasticsearchIndex {
    client: Client,
    config: ElasticsearchConfig,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawHit {
    #[serde(rename = "_score")]
    score: Option<f32>,
    #[serde(rename = "_source")]
    source: HitSource,
}

#[derive(Deserialize)]
struct HitSource {
    document_id: Uuid,
}

impl ElasticsearchIndex {
    pub fn new(config: ElasticsearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn index_name(&self) -> &str {
        &self.config.index
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}{}",
            self.config.url.trim_end_matches('/'),
            self.config.index,
            path
        )
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.username {
            Some(user) => builder.basic_auth(user, self.config.password.as_ref()),
            None => builder,
        }
    }

    async fn check(response: reqwest::Response, op: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::DependencyUnavailable(format!(
            "search index {} failed ({}): {}",
            op, status, body
        )))
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn upsert(&self, doc: &SearchDocument) -> Result<()> {
        let response = self
            .authed(
                self.client
                    .put(self.url(&format!("/_doc/{}", doc.document_id)))
                    .query(&[("refresh", "true")])
                    .json(doc),
            )
            .send()
            .await?;
        Self::check(response, "upsert").await?;

        debug!(
            subsystem = "search",
            component = "elasticsearch",
            op = "upsert",
            document_id = %doc.document_id,
            text_len = doc.text.len(),
            "Indexed document"
        );
        Ok(())
    }

    async fn query(&self, query: &BoolQuery) -> Result<Vec<SearchHit>> {
        let start = Instant::now();
        let response = self
            .authed(self.client.post(self.url("/_search")).json(&search_body(query)))
            .send()
            .await?;
        let parsed: SearchResponse = Self::check(response, "query").await?.json().await?;

        let hits: Vec<SearchHit> = parsed
            .hits
            .hits
            .into_iter()
            .map(|h| SearchHit {
                document_id: h.source.document_id,
                score: h.score.unwrap_or_default(),
            })
            .collect();

        debug!(
            subsystem = "search",
            component = "elasticsearch",
            op = "query",
            result_count = hits.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search index query complete"
        );
        Ok(hits)
    }

    async fn delete(&self, document_id: Uuid) -> Result<()> {
        let response = self
            .authed(
                self.client
                    .delete(self.url(&format!("/_doc/{}", document_id)))
                    .query(&[("refresh", "true")]),
            )
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check(response, "delete").await?;
        Ok(())
    }

    async fn ensure_index(&self) -> Result<()> {
        let head = self
            .authed(self.client.head(self.url("")))
            .send()
            .await?;
        if head.status().is_success() {
            return Ok(());
        }
        if head.status() != StatusCode::NOT_FOUND {
            return Err(Error::DependencyUnavailable(format!(
                "search index existence check failed ({})",
                head.status()
            )));
        }

        let response = self
            .authed(
                self.client
                    .put(self.url(""))
                    .json(&index_definition(&self.config.language)),
            )
            .send()
            .await?;
        Self::check(response, "create").await?;

        info!(
            subsystem = "search",
            component = "elasticsearch",
            op = "ensure_index",
            index = %self.config.index,
            language = %self.config.language,
            "Created search index"
        );
        Ok(())
    }
}
