//! Client for the external media host that stores lecture videos.
//!
//! Configured entirely from the environment; when no credentials are set
//! the service stays disabled and every call returns `MediaError::Disabled`.

use std::env;

use reqwest::Client;
use serde::Deserialize;

use crate::error::MediaError;

#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub base_url: String,
    pub api_key: String,
}

impl MediaConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("COURSE_MEDIA_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("COURSE_MEDIA_BASE_URL")
            .unwrap_or_else(|_| "https://upload.media.example.com/v1".into());
        Some(Self { base_url, api_key })
    }
}

/// An asset stored on the media host.
///
/// `public_id` is the host's opaque handle, kept alongside the lecture so
/// the asset can be deleted when the lecture is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaUpload {
    pub url: String,
    pub public_id: String,
}

#[derive(Clone)]
pub struct MediaService {
    client: Client,
    config: Option<MediaConfig>,
}

impl MediaService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(MediaConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<MediaConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn config(&self) -> Result<&MediaConfig, MediaError> {
        self.config.as_ref().ok_or(MediaError::Disabled)
    }

    /// Upload one video file and return the host's url and handle.
    ///
    /// # Errors
    ///
    /// Returns `MediaError` when the service is disabled or the request fails.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<MediaUpload, MediaError> {
        let config = self.config()?;
        let url = format!("{}/upload", config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .query(&[("filename", file_name)])
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MediaError::HttpStatus(response.status()));
        }

        let upload: MediaUpload = response.json().await?;
        if upload.url.is_empty() || upload.public_id.is_empty() {
            return Err(MediaError::EmptyResponse);
        }
        Ok(upload)
    }

    /// Delete an asset by its public id.
    ///
    /// # Errors
    ///
    /// Returns `MediaError` when the service is disabled or the request fails.
    pub async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        let config = self.config()?;
        let url = format!(
            "{}/media/{public_id}",
            config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .delete(url)
            .bearer_auth(&config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MediaError::HttpStatus(response.status()));
        }
        Ok(())
    }

    /// Upload a batch of files, isolating failures per item.
    ///
    /// One failed upload never aborts the rest; each slot carries its own
    /// result in input order.
    pub async fn bulk_upload(
        &self,
        files: Vec<(String, Vec<u8>)>,
    ) -> Vec<Result<MediaUpload, MediaError>> {
        let mut results = Vec::with_capacity(files.len());
        for (file_name, bytes) in files {
            results.push(self.upload(&file_name, bytes).await);
        }
        results
    }

    /// Delete a batch of assets, isolating failures per item.
    pub async fn bulk_delete(
        &self,
        public_ids: &[String],
    ) -> Vec<(String, Result<(), MediaError>)> {
        let mut results = Vec::with_capacity(public_ids.len());
        for public_id in public_ids {
            results.push((public_id.clone(), self.delete(public_id).await));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_disables_the_service() {
        let service = MediaService::new(None);
        assert!(!service.enabled());
    }

    #[tokio::test]
    async fn disabled_service_rejects_every_call() {
        let service = MediaService::new(None);
        assert!(matches!(
            service.upload("intro.mp4", vec![0u8; 4]).await,
            Err(MediaError::Disabled)
        ));
        assert!(matches!(service.delete("abc").await, Err(MediaError::Disabled)));
    }

    #[tokio::test]
    async fn bulk_upload_isolates_failures_per_item() {
        let service = MediaService::new(None);
        let results = service
            .bulk_upload(vec![
                ("a.mp4".into(), vec![1]),
                ("b.mp4".into(), vec![2]),
            ])
            .await;
        assert_eq!(results.len(), 2);
        assert!(results
            .iter()
            .all(|result| matches!(result, Err(MediaError::Disabled))));
    }

    #[tokio::test]
    async fn bulk_delete_reports_each_public_id() {
        let service = MediaService::new(None);
        let ids = vec!["a".to_string(), "b".to_string()];
        let results = service.bulk_delete(&ids).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "a");
        assert!(matches!(results[1].1, Err(MediaError::Disabled)));
    }
}
