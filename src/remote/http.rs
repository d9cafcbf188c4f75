use super::Remote;
use super::types::{
    AnalyzeEnvelope, AnalyzeRequest, ApiDiag, RecyclersPage, RecyclersRequest, UploadReceipt,
};
use crate::acquire::ImagePreview;
use crate::config::Config;
use crate::error::ScanError;
use crate::model::{self, RecyclerRecord};
use crate::recyclers::GeoPosition;
use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, warn};

pub struct HttpRemote {
    client: Client,
    cfg: Config,
}

impl HttpRemote {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .with_context(|| "building HTTP client")?;
        Ok(Self {
            client,
            cfg: cfg.clone(),
        })
    }

    fn backend_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.cfg.backend.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Remote for HttpRemote {
    async fn upload_image(&self, preview: &ImagePreview) -> Result<String, ScanError> {
        if self.cfg.upload.endpoint.is_empty() {
            return Err(ScanError::UploadFailed(
                "upload.endpoint is not configured".into(),
            ));
        }

        let part = Part::bytes(preview.bytes.clone())
            .file_name(preview.file_name.clone())
            .mime_str(&preview.mime)
            .map_err(|e| ScanError::UploadFailed(format!("building file part: {e}")))?;
        let form = Form::new()
            .part(self.cfg.upload.field_name.clone(), part)
            .text("upload_preset", self.cfg.upload.profile.clone());

        debug!(
            "uploading {} ({} bytes) to media host",
            preview.file_name, preview.byte_len
        );

        let response = self
            .client
            .post(&self.cfg.upload.endpoint)
            .multipart(form)
            .timeout(Duration::from_secs(self.cfg.upload.timeout_seconds))
            .send()
            .await
            .map_err(|e| ScanError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScanError::UploadFailed(format!(
                "media host returned HTTP {}",
                response.status()
            )));
        }

        let receipt: UploadReceipt = response
            .json()
            .await
            .map_err(|e| ScanError::UploadFailed(format!("unreadable upload response: {e}")))?;

        // A success response without a retrievable URL is still a failed
        // upload; nothing downstream can run without one.
        receipt
            .secure_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ScanError::UploadFailed("upload response carried no secure_url".into()))
    }

    async fn analyze(&self, image_url: &str) -> Result<String, ScanError> {
        let url = self.backend_url(&self.cfg.backend.analyze_path);
        debug!("requesting analysis from {url}");

        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest { image_url })
            .timeout(Duration::from_secs(self.cfg.backend.timeout_seconds))
            .send()
            .await
            .map_err(|e| ScanError::AnalysisFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScanError::AnalysisFailed(format!(
                "backend returned HTTP {}",
                response.status()
            )));
        }

        let envelope: AnalyzeEnvelope = response
            .json()
            .await
            .map_err(|e| ScanError::AnalysisFailed(format!("unreadable analyze response: {e}")))?;

        envelope
            .result
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| ScanError::AnalysisFailed("analyze response carried no result".into()))
    }

    async fn nearby_recyclers(
        &self,
        position: GeoPosition,
    ) -> Result<Vec<RecyclerRecord>, ScanError> {
        let url = self.backend_url(&self.cfg.backend.recyclers_path);
        debug!(
            "querying recyclers near ({:.4}, {:.4})",
            position.latitude, position.longitude
        );

        let response = self
            .client
            .post(&url)
            .json(&RecyclersRequest {
                latitude: position.latitude,
                longitude: position.longitude,
            })
            .timeout(Duration::from_secs(self.cfg.backend.timeout_seconds))
            .send()
            .await
            .map_err(|e| ScanError::RecyclerLookupFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ScanError::RecyclerLookupFailed(format!(
                "backend returned HTTP {}",
                response.status()
            )));
        }

        let page: RecyclersPage = response.json().await.map_err(|e| {
            ScanError::RecyclerLookupFailed(format!("unreadable recyclers response: {e}"))
        })?;

        let mut records = page.recyclers;
        model::backfill_ids(&mut records);
        Ok(records)
    }

    async fn doctor(&self) -> ApiDiag {
        let base = self.cfg.backend.base_url.clone();
        let probe = self
            .client
            .get(self.backend_url("/"))
            .timeout(Duration::from_secs(10))
            .send()
            .await;

        match probe {
            Ok(response) if response.status().is_success() => {
                let message = response
                    .json::<serde_json::Value>()
                    .await
                    .ok()
                    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from));
                ApiDiag {
                    base_url: base,
                    reachable: true,
                    message,
                    error: None,
                }
            }
            Ok(response) => ApiDiag {
                base_url: base,
                reachable: false,
                message: None,
                error: Some(format!("HTTP {}", response.status())),
            },
            Err(e) => {
                warn!("backend unreachable: {e}");
                ApiDiag {
                    base_url: base,
                    reachable: false,
                    message: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
