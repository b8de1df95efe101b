use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5100";

pub const DEFAULT_KEYWORDS: [&str; 6] = [
    "bug",
    "issue",
    "broken",
    "crash",
    "not working",
    "feature request",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid endpoint url {endpoint:?}: {message}")]
    InvalidEndpoint { endpoint: String, message: String },
}

/// Collection policy supplied by the options store.
///
/// The pipeline re-reads this before every scan pass and never holds on to
/// a copy across passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub keywords: Vec<String>,
    pub monitored_accounts: Vec<String>,
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            monitored_accounts: Vec::new(),
            enabled: false,
        }
    }
}

impl Config {
    /// Options-form validation. Only the save path calls this; the
    /// submission path treats a bad endpoint as a submission failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint(&self.endpoint).map(|_| ())
    }
}

/// Everything the options store persists: the policy plus counters.
///
/// Legacy key names (`api_url`, `collection_enabled`) are accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSettings {
    #[serde(alias = "api_url")]
    pub endpoint: String,
    pub keywords: Vec<String>,
    pub monitored_accounts: Vec<String>,
    #[serde(alias = "collection_enabled")]
    pub enabled: bool,
    pub collected_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self::from_config(Config::default())
    }
}

impl StoredSettings {
    pub fn from_config(config: Config) -> Self {
        Self {
            endpoint: config.endpoint,
            keywords: config.keywords,
            monitored_accounts: config.monitored_accounts,
            enabled: config.enabled,
            collected_count: 0,
            last_sync: None,
        }
    }

    pub fn config(&self) -> Config {
        Config {
            endpoint: self.endpoint.clone(),
            keywords: self.keywords.clone(),
            monitored_accounts: self.monitored_accounts.clone(),
            enabled: self.enabled,
        }
    }

    /// Replace the policy fields, keeping counters.
    pub fn apply(&mut self, config: Config) {
        self.endpoint = config.endpoint;
        self.keywords = config.keywords;
        self.monitored_accounts = config.monitored_accounts;
        self.enabled = config.enabled;
    }
}

pub fn validate_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        message,
    };
    let url = Url::parse(endpoint.trim()).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}

/// Join an API path onto the configured endpoint.
///
/// `http://host:5100/` and `http://host:5100` both yield
/// `http://host:5100/api/...`.
pub fn endpoint_url(endpoint: &str, path: &str) -> Result<Url, ConfigError> {
    let base = endpoint.trim().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    validate_endpoint(&format!("{base}/{path}"))
}

/// Parse a comma separated options field: trimmed, empties dropped.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Blank endpoint input falls back to the default collector.
pub fn normalize_endpoint(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_ENDPOINT.to_string()
    } else {
        trimmed.to_string()
    }
}
