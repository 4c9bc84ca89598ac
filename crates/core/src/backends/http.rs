use crate::traits::{SearchClient, SuggestionClient};
use crate::{ClientConfig, ClientError, Query, RemoteHistoryEntry, SearchResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

const SEARCH_PATH: &str = "search";
const SUGGESTIONS_PATH: &str = "suggestions";
const HISTORY_PATH: &str = "history";
const STEMMED_WORDS_PATH: &str = "get_stemmed_word";

/// JSON-over-GET client for the search backend.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&str>,
    ) -> Result<T, ClientError> {
        let mut url = self.endpoint(path)?;
        if let Some(query) = query {
            url.query_pairs_mut().append_pair("query", query);
        }

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::BackendResponse {
                endpoint: format!("/{path}"),
                details: response.status().to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SuggestionClient for HttpBackend {
    async fn suggestions(&self, text: &str) -> Result<Vec<String>, ClientError> {
        self.get_json(SUGGESTIONS_PATH, Some(text)).await
    }
}

#[async_trait]
impl SearchClient for HttpBackend {
    async fn search(&self, query: &Query) -> Result<Vec<SearchResult>, ClientError> {
        self.get_json(SEARCH_PATH, Some(query.as_str())).await
    }

    async fn stemmed_words(&self) -> Result<Vec<String>, ClientError> {
        self.get_json(STEMMED_WORDS_PATH, None).await
    }

    async fn recent_queries(&self) -> Result<Vec<RemoteHistoryEntry>, ClientError> {
        let mut entries: Vec<RemoteHistoryEntry> = self.get_json(HISTORY_PATH, None).await?;
        entries.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
        Ok(entries)
    }
}
