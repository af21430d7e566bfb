//! Token metadata documents behind `tokenURI`

use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::ethereum::ChainError;

/// The three fields the details screen shows. Anything else in the document
/// is ignored; missing fields come back empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync + 'static {
    async fn fetch(&self, uri: &str) -> Result<TokenMetadata, ChainError>;
}

/// Plain HTTP GET of the URI, body parsed as JSON
pub struct HttpMetadata {
    http: reqwest::Client,
}

impl HttpMetadata {
    pub fn new(timeout: Duration) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ChainError::Metadata(err.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl MetadataSource for HttpMetadata {
    async fn fetch(&self, uri: &str) -> Result<TokenMetadata, ChainError> {
        let response = self
            .http
            .get(uri)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| ChainError::Metadata(err.to_string()))?;

        response
            .json::<TokenMetadata>()
            .await
            .map_err(|err| ChainError::Metadata(err.to_string()))
    }
}
