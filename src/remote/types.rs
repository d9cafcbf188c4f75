use serde::{Deserialize, Serialize};

/// Media-host reply to a multipart upload. Only the retrievable URL
/// matters; everything else the host sends is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub secure_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub image_url: &'a str,
}

/// `result` is a JSON document in a string, possibly fenced; it is decoded
/// by `envelope::decode_analysis`, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeEnvelope {
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RecyclersRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecyclersPage {
    #[serde(default)]
    pub recyclers: Vec<crate::model::RecyclerRecord>,
}

/// Reachability diagnosis for the `doctor` subcommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDiag {
    pub base_url: String,
    pub reachable: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
