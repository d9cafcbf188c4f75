use thiserror::Error;

/// Boundary failures a scan session can surface to the user.
///
/// Every remote call and input check maps into one of these; nothing here is
/// fatal to the process. The session returns to a stable state and the user
/// decides whether to retry.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("input is not an image: {0}")]
    InvalidInputKind(String),
    #[error("media upload failed: {0}")]
    UploadFailed(String),
    #[error("analysis request failed: {0}")]
    AnalysisFailed(String),
    #[error("analysis payload is not valid JSON: {0}")]
    MalformedAnalysisPayload(String),
    #[error("this host has no geolocation source")]
    GeolocationUnsupported,
    #[error("could not resolve current position: {0}")]
    LocationUnavailable(String),
    #[error("recycler lookup failed: {0}")]
    RecyclerLookupFailed(String),
}

/// Internal session-machine misuse. Not user-facing: an `InvalidTransition`
/// is a caller bug, and `Stale` marks a write from a run that was reset out
/// from under it (the write is discarded).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid session transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },
    #[error("stale session generation {have} (current {current}); write discarded")]
    Stale { have: u64, current: u64 },
}
