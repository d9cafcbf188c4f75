pub mod http;
pub mod types;

use crate::acquire::ImagePreview;
use crate::error::ScanError;
use crate::model::RecyclerRecord;
use crate::recyclers::GeoPosition;
use async_trait::async_trait;

pub use http::HttpRemote;
pub use types::{AnalyzeEnvelope, ApiDiag, RecyclersPage, UploadReceipt};

/// The three endpoints the product talks to, behind one seam so the
/// pipeline can be exercised without a network.
#[async_trait]
pub trait Remote: Send + Sync {
    /// Uploads the raw image to the media host; returns the retrievable URL.
    async fn upload_image(&self, preview: &ImagePreview) -> Result<String, ScanError>;

    /// Asks the analysis backend for a report on an uploaded image; returns
    /// the raw (possibly fenced) result string.
    async fn analyze(&self, image_url: &str) -> Result<String, ScanError>;

    async fn nearby_recyclers(
        &self,
        position: GeoPosition,
    ) -> Result<Vec<RecyclerRecord>, ScanError>;

    async fn doctor(&self) -> ApiDiag;
}
