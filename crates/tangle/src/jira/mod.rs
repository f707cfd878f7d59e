//! Jira REST client — the engine's issue source.
//!
//! The engine only depends on the [`IssueSource`] trait; this module
//! provides the live implementation over `/rest/api/2/search`. Pagination
//! and key-batch chunking are handled here so callers always see complete
//! result sets.

mod wire;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{Issue, IssueKey};
use crate::error::{Error, Result};
use wire::{SearchResponse, QUERY_FIELDS};

/// Supplies issue records by query or by key.
///
/// Any error aborts the whole fetch; implementations do not retry.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// All issues matching a JQL query, fully paginated.
    async fn issues_by_query(&self, jql: &str) -> Result<Vec<Issue>>;

    /// Issues for the given keys, chunked internally to the source's
    /// per-request limit.
    async fn issues_by_key(&self, keys: &[IssueKey]) -> Result<Vec<Issue>>;

    /// Child issues of the given epics.
    async fn issues_by_epic_key(&self, epic_keys: &[IssueKey]) -> Result<Vec<Issue>>;
}

/// Live [`IssueSource`] over the Jira REST API with basic auth.
pub struct Client {
    http: reqwest::Client,
    server: String,
    username: String,
    token: String,
    page_size: usize,
    key_chunk_size: usize,
    epic_key_custom_field: Option<String>,
    parent_key_custom_field: Option<String>,
}

impl Client {
    /// Build a client from the run configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            server: config.server.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            token: config.token.clone(),
            page_size: config.page_size,
            key_chunk_size: config.key_chunk_size,
            epic_key_custom_field: config.epic_key_custom_field.clone(),
            parent_key_custom_field: config.parent_key_custom_field.clone(),
        }
    }

    fn fields_param(&self) -> String {
        let mut fields: Vec<&str> = QUERY_FIELDS.to_vec();
        if let Some(field) = &self.epic_key_custom_field {
            fields.push(field);
        }
        if let Some(field) = &self.parent_key_custom_field {
            fields.push(field);
        }
        fields.join(",")
    }

    async fn search_page(&self, jql: &str, start_at: usize) -> Result<SearchResponse> {
        debug!(jql, start_at, "calling search");
        let response = self
            .http
            .get(format!("{}/rest/api/2/search", self.server))
            .basic_auth(&self.username, Some(&self.token))
            .query(&[
                ("jql", jql),
                ("startAt", &start_at.to_string()),
                ("maxResults", &self.page_size.to_string()),
                ("fields", &self.fields_param()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Source(format!("search returned {status}: {body}")));
        }
        Ok(response.json().await?)
    }

    /// Run a JQL query to exhaustion, following `startAt` pagination.
    async fn search_all(&self, jql: &str) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        let mut start_at = 0;
        loop {
            let page = self.search_page(jql, start_at).await?;
            let fetched = page.issues.len();
            for wire_issue in page.issues {
                issues.push(wire_issue.into_domain(
                    self.epic_key_custom_field.as_deref(),
                    self.parent_key_custom_field.as_deref(),
                )?);
            }
            start_at = page.start_at + fetched;
            if fetched == 0 || start_at >= page.total {
                break;
            }
        }
        Ok(issues)
    }

    fn key_list(keys: &[IssueKey]) -> String {
        keys.iter()
            .map(IssueKey::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn epic_field_jql(&self) -> String {
        // JQL addresses custom fields as `cf[10008]`; fall back to the
        // standard Epic Link name when no field id is configured.
        match self
            .epic_key_custom_field
            .as_deref()
            .and_then(|f| f.strip_prefix("customfield_"))
        {
            Some(id) => format!("cf[{id}]"),
            None => "\"Epic Link\"".to_string(),
        }
    }
}

#[async_trait]
impl IssueSource for Client {
    async fn issues_by_query(&self, jql: &str) -> Result<Vec<Issue>> {
        info!(jql, "fetching issues by query");
        self.search_all(jql).await
    }

    async fn issues_by_key(&self, keys: &[IssueKey]) -> Result<Vec<Issue>> {
        info!(count = keys.len(), "fetching issues by key");
        // One request per chunk, dispatched together and awaited as a batch.
        let lookups = keys.chunks(self.key_chunk_size).map(|chunk| {
            let jql = format!("key in ({})", Self::key_list(chunk));
            async move { self.search_all(&jql).await }
        });
        let batches = try_join_all(lookups).await?;
        Ok(batches.into_iter().flatten().collect())
    }

    async fn issues_by_epic_key(&self, epic_keys: &[IssueKey]) -> Result<Vec<Issue>> {
        info!(count = epic_keys.len(), "fetching epic children");
        let lookups = epic_keys.chunks(self.key_chunk_size).map(|chunk| {
            let jql = format!("{} in ({})", self.epic_field_jql(), Self::key_list(chunk));
            async move { self.search_all(&jql).await }
        });
        let batches = try_join_all(lookups).await?;
        Ok(batches.into_iter().flatten().collect())
    }
}
