use crate::config::Config;
use crate::error::{PiiGraphError, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::Fetcher;

/// HTTP client for a relation backend
///
/// Fetches the initial query text from `<base>/<query_path>` and entity relations
/// from `<base>/<entity_path>/<id>`, with the id percent-encoded as one path segment.
pub struct HttpFetcher {
    client: Client,
    base: Url,
    query_path: String,
    entity_path: String,
}

impl HttpFetcher {
    /// Create a fetcher against `base`
    ///
    /// # Arguments
    ///
    /// * `base` - Backend base URL, e.g. `http://localhost:4747/`
    /// * `timeout` - Optional request timeout; `None` lets a request wait forever
    pub fn new(base: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| PiiGraphError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            query_path: "query".to_string(),
            entity_path: "entity".to_string(),
        })
    }

    /// Create a fetcher from the `[backend]` configuration section
    pub fn from_config(config: &Config) -> Result<Self> {
        let base = config
            .backend_url()
            .map_err(|e| PiiGraphError::Config(format!("{:#}", e)))?;
        let mut fetcher = Self::new(base, config.fetch_timeout())?;
        fetcher.query_path = config.backend.query_path.clone();
        fetcher.entity_path = config.backend.entity_path.clone();
        Ok(fetcher)
    }

    pub fn query_url(&self) -> Result<Url> {
        self.base
            .join(&self.query_path)
            .map_err(|e| PiiGraphError::Config(format!("query path {}: {}", self.query_path, e)))
    }

    pub fn entity_url(&self, id: &str) -> Result<Url> {
        let mut url = self.base.join(&self.entity_path).map_err(|e| {
            PiiGraphError::Config(format!("entity path {}: {}", self.entity_path, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| PiiGraphError::Config(format!("cannot append to {}", self.base)))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Fetch the backend's initial query text
    pub async fn fetch_query(&self) -> Result<String> {
        let url = self.query_url()?;
        self.get_text(url).await
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PiiGraphError::Fetch(format!("Network error for {}: {}", url, e)))?;

        let status = response.status();

        if !status.is_success() {
            return Err(PiiGraphError::Fetch(format!("{} returned {}", url, status)));
        }

        response
            .text()
            .await
            .map_err(|e| PiiGraphError::Fetch(format!("Failed to read body of {}: {}", url, e)))
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch_entity(&self, id: &str) -> Result<String> {
        let url = self.entity_url(id)?;
        self.get_text(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(base: &str) -> HttpFetcher {
        HttpFetcher::new(Url::parse(base).unwrap(), None).unwrap()
    }

    #[test]
    fn test_entity_url_joins_base() {
        let f = fetcher("http://localhost:4747/");
        assert_eq!(
            f.entity_url("abc-123").unwrap().as_str(),
            "http://localhost:4747/entity/abc-123"
        );
        assert_eq!(f.query_url().unwrap().as_str(), "http://localhost:4747/query");
    }

    #[test]
    fn test_entity_url_encodes_id() {
        let f = fetcher("http://localhost:4747/pii/");
        assert_eq!(
            f.entity_url("a b/c").unwrap().as_str(),
            "http://localhost:4747/pii/entity/a%20b%2Fc"
        );
    }

    #[test]
    fn test_entity_url_with_trailing_slash_path() {
        let mut f = fetcher("http://localhost:4747/");
        f.entity_path = "entity/".to_string();
        assert_eq!(
            f.entity_url("X").unwrap().as_str(),
            "http://localhost:4747/entity/X"
        );
    }

    #[test]
    fn test_from_config_uses_backend_section() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[backend]\nbase_url = \"http://localhost:4747/pii/\"\nentity_path = \"node\"\n",
        )
        .unwrap();
        let config = Config::from_file(&config_path).unwrap();

        let f = HttpFetcher::from_config(&config).unwrap();
        assert_eq!(f.query_url().unwrap().as_str(), "http://localhost:4747/pii/query");
        assert_eq!(
            f.entity_url("A").unwrap().as_str(),
            "http://localhost:4747/pii/node/A"
        );
    }

    #[tokio::test]
    async fn test_fetch_rejected_scheme_is_fetch_error() {
        // The client refuses non-HTTP schemes before opening a connection.
        let f = fetcher("ftp://backend.invalid/");
        let err = f.fetch_entity("A").await.unwrap_err();
        assert!(matches!(err, PiiGraphError::Fetch(_)));
        let err = f.fetch_query().await.unwrap_err();
        assert!(matches!(err, PiiGraphError::Fetch(_)));
    }
}
