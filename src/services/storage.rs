// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cloud Storage client for memory photos (JSON API).
//!
//! For local development with the emulator, set STORAGE_EMULATOR_HOST;
//! requests then go unauthenticated to that host.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::body::Bytes;

use crate::error::AppError;

const STORAGE_API_BASE: &str = "https://storage.googleapis.com";
const STORAGE_TIMEOUT: Duration = Duration::from_secs(60);

struct StorageInner {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
    /// `None` when talking to the emulator
    auth: Option<gcloud_sdk::GoogleAuthTokenGenerator>,
}

/// Object storage for memory photos.
#[derive(Clone)]
pub struct CloudStorage {
    inner: Option<Arc<StorageInner>>,
}

impl CloudStorage {
    pub async fn new(bucket: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(STORAGE_TIMEOUT)
            .build()
            .context("failed building storage HTTP client")?;

        let (base_url, auth) = match std::env::var("STORAGE_EMULATOR_HOST") {
            Ok(host) => {
                tracing::info!(host = %host, "Using Cloud Storage emulator");
                (host.trim_end_matches('/').to_string(), None)
            }
            Err(_) => {
                let generator = gcloud_sdk::GoogleAuthTokenGenerator::new(
                    gcloud_sdk::TokenSourceType::Default,
                    gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
                )
                .await
                .context("failed creating Cloud Storage credentials")?;
                (STORAGE_API_BASE.to_string(), Some(generator))
            }
        };

        tracing::info!(bucket, "Cloud Storage client ready");

        Ok(Self {
            inner: Some(Arc::new(StorageInner {
                http,
                base_url,
                bucket: bucket.to_string(),
                auth,
            })),
        })
    }

    /// Storage that fails every call (offline tests).
    pub fn new_mock() -> Self {
        Self { inner: None }
    }

    fn inner(&self) -> Result<&StorageInner, AppError> {
        self.inner
            .as_deref()
            .ok_or_else(|| AppError::Storage("Storage not connected (offline mode)".to_string()))
    }

    async fn authorize(
        &self,
        inner: &StorageInner,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, AppError> {
        match &inner.auth {
            Some(generator) => {
                let token = generator
                    .create_token()
                    .await
                    .map_err(|e| AppError::Storage(format!("Failed to get credentials: {}", e)))?;
                Ok(request.header(reqwest::header::AUTHORIZATION, token.header_value()))
            }
            None => Ok(request),
        }
    }

    /// Upload an object and return its public URL.
    pub async fn upload(
        &self,
        object_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, AppError> {
        let inner = self.inner()?;
        let url = format!("{}/upload/storage/v1/b/{}/o", inner.base_url, inner.bucket);

        let request = inner
            .http
            .post(&url)
            .query(&[("uploadType", "media"), ("name", object_name)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);

        let response = self
            .authorize(inner, request)
            .await?
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Upload of {} failed with HTTP {}: {}",
                object_name, status, body
            )));
        }

        tracing::debug!(object = object_name, "Stored object");
        Ok(self.public_url(object_name))
    }

    /// Delete an object. A missing object counts as deleted.
    pub async fn delete(&self, object_name: &str) -> Result<(), AppError> {
        let inner = self.inner()?;
        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            inner.base_url,
            inner.bucket,
            urlencoding::encode(object_name)
        );

        let response = self
            .authorize(inner, inner.http.delete(&url))
            .await?
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Delete request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::Storage(format!(
            "Delete of {} failed with HTTP {}: {}",
            object_name, status, body
        )))
    }

    pub fn public_url(&self, object_name: &str) -> String {
        let bucket = self.inner.as_deref().map(|i| i.bucket.as_str()).unwrap_or("");
        format!("{}/{}/{}", STORAGE_API_BASE, bucket, object_name)
    }
}
