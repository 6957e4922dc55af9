//! Thin JSON-over-HTTP client shared by the control API clients

use crate::common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct JsonClient {
    inner: reqwest::Client,
    base_url: String,
}

impl JsonClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {}", e)))?;
        Ok(Self {
            inner,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .inner
            .get(self.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;

        // A body cut short is a transport failure; only a complete body that
        // fails to parse is a bad response.
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::ConnectionFailed(format!("reading response body: {}", e)))?;
        serde_json::from_slice(&body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    /// GET `path` and only check the status code
    pub async fn ping(&self, path: &str) -> Result<()> {
        self.inner
            .get(self.url(path))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// POST a JSON body, discarding the response body
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.inner
            .post(self.url(path))
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.inner
            .delete(self.url(path))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
