//! Firestore REST API client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::auth::TokenCache;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{
    BatchWriteRequest, BatchWriteResponse, Document, ListDocumentsResponse, Value, Write,
};

/// Firestore client configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// GCP project ID
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// API base URL (overridable for tests)
    pub base_url: String,
}

impl FirestoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> FirestoreResult<Self> {
        let project_id = std::env::var("GCP_PROJECT_ID")
            .or_else(|_| std::env::var("FIREBASE_PROJECT_ID"))
            .map_err(|_| {
                FirestoreError::auth_error(
                    "GCP_PROJECT_ID or FIREBASE_PROJECT_ID must be set to access Firestore",
                )
            })?;

        if project_id.is_empty() {
            return Err(FirestoreError::auth_error(
                "GCP_PROJECT_ID or FIREBASE_PROJECT_ID cannot be empty",
            ));
        }

        Ok(Self {
            project_id,
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| "(default)".to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(
                std::env::var("FIRESTORE_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            base_url: std::env::var("FIRESTORE_BASE_URL")
                .unwrap_or_else(|_| "https://firestore.googleapis.com".to_string()),
        })
    }
}

/// Firestore REST API client.
pub struct FirestoreClient {
    http: Client,
    config: FirestoreConfig,
    documents_url: String,
    tokens: Arc<TokenCache>,
}

impl Clone for FirestoreClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            documents_url: self.documents_url.clone(),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl FirestoreClient {
    /// Create a new Firestore client.
    pub fn new(config: FirestoreConfig, tokens: TokenCache) -> FirestoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("cutsheet-firestore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FirestoreError::Network)?;

        let documents_url = format!(
            "{}/v1/projects/{}/databases/{}/documents",
            config.base_url, config.project_id, config.database_id
        );

        Ok(Self {
            http,
            config,
            documents_url,
            tokens: Arc::new(tokens),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> FirestoreResult<Self> {
        let config = FirestoreConfig::from_env()?;
        let tokens = TokenCache::from_env()?;
        Self::new(config, tokens)
    }

    fn document_url(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, doc_id)
    }

    /// Full resource name of a document, as used in batch writes.
    pub fn full_document_name(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "projects/{}/databases/{}/documents/{}/{}",
            self.config.project_id, self.config.database_id, collection, doc_id
        )
    }

    /// Send a request with a bearer token, refreshing the token and
    /// retrying once if Firestore reports it expired.
    async fn send_authorized<F>(&self, build: F) -> FirestoreResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let token = self.tokens.token().await?;
        let response = build().bearer_auth(&token).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if !body.contains("ACCESS_TOKEN_EXPIRED") && !body.contains("\"UNAUTHENTICATED\"") {
            return Err(FirestoreError::AuthError(body));
        }

        self.tokens.invalidate().await;
        let token = self.tokens.token().await?;
        Ok(build().bearer_auth(&token).send().await?)
    }

    async fn error_for(status: StatusCode, url: &str, response: Response) -> FirestoreError {
        let body = response.text().await.unwrap_or_default();
        FirestoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }

    // =========================================================================
    // CRUD operations
    // =========================================================================

    /// Get a document. `None` when it does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> FirestoreResult<Option<Document>> {
        let url = self.document_url(collection, doc_id);
        let response = self.send_authorized(|| self.http.get(&url)).await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(Self::error_for(status, &url, response).await),
        }
    }

    /// Create a document with the given id.
    pub async fn create_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
    ) -> FirestoreResult<Document> {
        let url = format!("{}/{}?documentId={}", self.documents_url, collection, doc_id);
        let body = Document::new(fields);

        let response = self
            .send_authorized(|| self.http.post(&url).json(&body))
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(response.json().await?),
            StatusCode::CONFLICT => Err(FirestoreError::AlreadyExists(format!(
                "{}/{}",
                collection, doc_id
            ))),
            status => Err(Self::error_for(status, &url, response).await),
        }
    }

    /// Merge-update the masked fields of a document.
    pub async fn update_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
        update_mask: Vec<String>,
    ) -> FirestoreResult<Document> {
        let params: Vec<String> = update_mask
            .iter()
            .map(|f| format!("updateMask.fieldPaths={}", f))
            .collect();
        let url = format!(
            "{}?{}",
            self.document_url(collection, doc_id),
            params.join("&")
        );
        let body = Document::new(fields);

        let response = self
            .send_authorized(|| self.http.patch(&url).json(&body))
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => {
                Err(FirestoreError::not_found(format!("{}/{}", collection, doc_id)))
            }
            status => Err(Self::error_for(status, &url, response).await),
        }
    }

    /// Delete a document. Deleting a missing document succeeds.
    pub async fn delete_document(&self, collection: &str, doc_id: &str) -> FirestoreResult<()> {
        let url = self.document_url(collection, doc_id);
        let response = self.send_authorized(|| self.http.delete(&url)).await?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!("document {}/{} already deleted", collection, doc_id);
                Ok(())
            }
            status => Err(Self::error_for(status, &url, response).await),
        }
    }

    /// List documents in a collection, one page at a time.
    pub async fn list_documents(
        &self,
        collection: &str,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> FirestoreResult<ListDocumentsResponse> {
        let mut params = Vec::new();
        if let Some(size) = page_size {
            params.push(format!("pageSize={}", size));
        }
        if let Some(token) = page_token {
            params.push(format!("pageToken={}", token));
        }

        let mut url = format!("{}/{}", self.documents_url, collection);
        if !params.is_empty() {
            url = format!("{}?{}", url, params.join("&"));
        }

        let response = self.send_authorized(|| self.http.get(&url)).await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => Err(Self::error_for(status, &url, response).await),
        }
    }

    /// Execute a batch write. All writes succeed or the call errors; a
    /// partial per-write failure in the response is surfaced as an error.
    pub async fn batch_write(&self, writes: Vec<Write>) -> FirestoreResult<()> {
        if writes.is_empty() {
            return Ok(());
        }
        if writes.len() > 500 {
            return Err(FirestoreError::request_failed(
                "Batch write exceeds 500 document limit",
            ));
        }

        let url = format!("{}:batchWrite", self.documents_url);
        let request = BatchWriteRequest { writes };

        let response = self
            .send_authorized(|| self.http.post(&url).json(&request))
            .await?;

        match response.status() {
            StatusCode::OK => {
                let batch: BatchWriteResponse = response.json().await?;
                batch.check_for_errors()
            }
            status => Err(Self::error_for(status, &url, response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_from_env_requires_project_id() {
        std::env::remove_var("GCP_PROJECT_ID");
        std::env::remove_var("FIREBASE_PROJECT_ID");
        assert!(FirestoreConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_config_default_values() {
        std::env::set_var("GCP_PROJECT_ID", "test-project");
        std::env::remove_var("FIRESTORE_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("FIRESTORE_DATABASE_ID");
        let config = FirestoreConfig::from_env().unwrap();
        assert_eq!(config.database_id, "(default)");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        std::env::remove_var("GCP_PROJECT_ID");
    }
}
