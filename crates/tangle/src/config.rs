//! Configuration loading and defaults.
//!
//! The whole option surface is enumerated here with serde defaults, loaded
//! once from a YAML file by the CLI layer, merged with flags and environment
//! variables, validated, and then passed immutably into the engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Priority, StatusCategory};
use crate::error::{Error, Result};

/// Environment variable holding the Jira username.
pub const USERNAME_ENV: &str = "TANGLE_USERNAME";

/// Environment variable holding the Jira API token or password.
pub const TOKEN_ENV: &str = "TANGLE_TOKEN";

/// Numeric weight assigned to each priority during scoring.
///
/// Monotonic but deliberately not linear: the default mapping makes a
/// `Highest` issue worth five `Medium` ones, while `Low` and `Lowest` carry
/// no weight at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    /// Weight for `Highest`.
    pub highest: u64,
    /// Weight for `High`.
    pub high: u64,
    /// Weight for `Medium`.
    pub medium: u64,
    /// Weight for `Low`.
    pub low: u64,
    /// Weight for `Lowest`.
    pub lowest: u64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            highest: 5,
            high: 3,
            medium: 1,
            low: 0,
            lowest: 0,
        }
    }
}

impl PriorityWeights {
    /// Look up the weight for a priority.
    pub fn weight(&self, priority: Priority) -> u64 {
        match priority {
            Priority::Highest => self.highest,
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
            Priority::Lowest => self.lowest,
        }
    }
}

/// Full configuration for a tangle run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Jira server base URL, e.g. `https://example.atlassian.net/`.
    pub server: String,

    /// Jira username for basic auth.
    pub username: String,

    /// Jira API token (or password) for basic auth.
    pub token: String,

    /// Seed JQL query for the fetch phase.
    pub query: String,

    /// Directory for the local cache store. `None` disables caching.
    pub path: Option<PathBuf>,

    /// Directory where rendered output (dot files) is written.
    pub output: PathBuf,

    /// Issue types whose children are pulled in via a by-epic query.
    pub epic_issue_types: Vec<String>,

    /// Custom field id carrying the epic key, e.g. `customfield_10008`.
    pub epic_key_custom_field: Option<String>,

    /// Custom field id carrying a parent key for hierarchies above epics.
    pub parent_key_custom_field: Option<String>,

    /// Status categories whose outward links are still worth following.
    pub follow_status_categories: Vec<StatusCategory>,

    /// Link type names the traversal follows.
    pub follow_link_types: Vec<String>,

    /// A component is only valid if it contains at least one issue of one of
    /// these types.
    pub allowed_graph_issue_types: Vec<String>,

    /// Issue types that are allowed to sit at the root of a graph.
    pub allowed_root_issue_types: Vec<String>,

    /// Project prefixes to keep; empty allows all.
    pub allowed_issue_key_prefixes: Vec<String>,

    /// Labels that mark an issue as tracked.
    pub tracked_issue_labels: Vec<String>,

    /// Page size for the seed query.
    pub page_size: usize,

    /// Maximum keys per batched lookup request.
    pub key_chunk_size: usize,

    /// Priority-to-weight mapping for scoring.
    pub priority_weights: PriorityWeights,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: String::new(),
            username: String::new(),
            token: String::new(),
            query: String::new(),
            path: Some(PathBuf::from("./data")),
            output: PathBuf::from("./output"),
            epic_issue_types: vec!["Epic".to_string()],
            epic_key_custom_field: None,
            parent_key_custom_field: None,
            follow_status_categories: vec![StatusCategory::ToDo, StatusCategory::InProgress],
            follow_link_types: vec![
                "Blocks".to_string(),
                "Epic".to_string(),
                "Parent".to_string(),
            ],
            allowed_graph_issue_types: vec!["Initiative".to_string()],
            allowed_root_issue_types: vec![
                "Initiative".to_string(),
                "Requirement".to_string(),
                "Bug".to_string(),
            ],
            allowed_issue_key_prefixes: vec![],
            tracked_issue_labels: vec![],
            page_size: 100,
            key_chunk_size: 50,
            priority_weights: PriorityWeights::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, or defaults if the file does not
    /// exist.
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(serde_yaml::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Overlay credentials from the environment when the file left them
    /// empty.
    pub fn with_env_credentials(mut self) -> Self {
        if self.username.is_empty() {
            if let Ok(username) = std::env::var(USERNAME_ENV) {
                self.username = username;
            }
        }
        if self.token.is_empty() {
            if let Ok(token) = std::env::var(TOKEN_ENV) {
                self.token = token;
            }
        }
        self
    }

    /// Validate the parts of the configuration a fetch needs.
    ///
    /// Commands that only read the cache skip this.
    pub fn validate_for_fetch(&self) -> Result<()> {
        if self.server.is_empty() {
            return Err(Error::Config("server is required".to_string()));
        }
        if self.query.is_empty() {
            return Err(Error::Config("query is required".to_string()));
        }
        if self.page_size == 0 || self.key_chunk_size == 0 {
            return Err(Error::Config(
                "page_size and key_chunk_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
