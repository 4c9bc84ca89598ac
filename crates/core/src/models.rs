use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Search text that is non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query(String);

impl Query {
    pub fn parse(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One scored page as served by `/search`.
///
/// `keywords` keeps the backend's key order, which breaks ties when chips
/// are sorted by score.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub score: f64,
    pub title: String,
    pub link: String,
    pub last_modification_date: String,
    pub file_size: String,
    #[serde(default)]
    #[serde_as(as = "serde_with::Map<_, _>")]
    pub keywords: Vec<(String, String)>,
    #[serde(default)]
    pub children_links: Vec<String>,
    #[serde(default)]
    pub parent_links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteHistoryEntry {
    pub query: String,
    pub timestamp: DateTime<Utc>,
}

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    /// `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Scheme, host and port of the backend; local state is scoped by it.
    pub fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }
}
