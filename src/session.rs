//! The per-session upload state machine.
//!
//! `Idle -> PreviewReady -> Uploading -> AwaitingAnalysis -> Complete`, with
//! `Failed` reachable from the two in-flight states and a reset back to
//! `Idle` from anywhere. A session holds at most one analysis result, and at
//! most one upload may be in flight at a time.
//!
//! Writes carry the generation that was current when their run started.
//! Resetting bumps the generation, so a response that arrives late cannot
//! touch the fresh session; it gets [`SessionError::Stale`] and is dropped.

use crate::acquire::ImagePreview;
use crate::error::{ScanError, SessionError};
use crate::model::DeviceAnalysis;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    PreviewReady,
    Uploading,
    AwaitingAnalysis,
    Complete,
    Failed,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::PreviewReady => "preview-ready",
            Phase::Uploading => "uploading",
            Phase::AwaitingAnalysis => "awaiting-analysis",
            Phase::Complete => "complete",
            Phase::Failed => "failed",
        }
    }

    fn in_flight(self) -> bool {
        matches!(self, Phase::Uploading | Phase::AwaitingAnalysis)
    }
}

#[derive(Debug, Clone)]
pub struct UploadSession {
    pub phase: Phase,
    pub preview: Option<ImagePreview>,
    pub remote_url: Option<String>,
    pub progress: u8,
    pub result: Option<DeviceAnalysis>,
    pub last_error: Option<String>,
    /// Every phase entered since the last reset, `Idle` first.
    pub history: Vec<Phase>,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            preview: None,
            remote_url: None,
            progress: 0,
            result: None,
            last_error: None,
            history: vec![Phase::Idle],
        }
    }
}

impl UploadSession {
    pub fn is_uploading(&self) -> bool {
        self.phase == Phase::Uploading
    }

    fn enter(&mut self, phase: Phase) {
        debug!("session phase {} -> {}", self.phase.name(), phase.name());
        self.phase = phase;
        self.history.push(phase);
    }
}

struct Inner {
    state: Mutex<UploadSession>,
    generation: AtomicU64,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

/// Cloneable handle to one session; the pipeline, the progress ticker and
/// the caller all share it.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Inner>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(UploadSession::default()),
                generation: AtomicU64::new(0),
                ticker: Mutex::new(None),
            }),
        }
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> UploadSession {
        self.inner.state.lock().expect("session state lock").clone()
    }

    /// Clears everything, bumps the generation and stops the ticker. Any
    /// write still in flight for the old generation will be discarded.
    pub fn reset(&self) {
        {
            let mut state = self.inner.state.lock().expect("session state lock");
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            *state = UploadSession::default();
        }
        self.release_ticker();
        info!("session reset");
    }

    pub fn select_preview(&self, generation: u64, preview: ImagePreview) -> Result<(), SessionError> {
        self.mutate(generation, "preview-ready", |s| {
            if s.phase != Phase::Idle {
                return Err(invalid(s.phase, "preview-ready"));
            }
            s.preview = Some(preview);
            s.enter(Phase::PreviewReady);
            Ok(())
        })
    }

    pub fn begin_upload(&self, generation: u64) -> Result<(), SessionError> {
        self.mutate(generation, "uploading", |s| {
            let retryable = s.phase == Phase::Failed && s.preview.is_some();
            if s.phase != Phase::PreviewReady && !retryable {
                return Err(invalid(s.phase, "uploading"));
            }
            s.progress = 0;
            s.last_error = None;
            s.result = None;
            s.enter(Phase::Uploading);
            Ok(())
        })
    }

    pub fn mark_uploaded(&self, generation: u64, url: String) -> Result<(), SessionError> {
        self.mutate(generation, "awaiting-analysis", |s| {
            if s.phase != Phase::Uploading {
                return Err(invalid(s.phase, "awaiting-analysis"));
            }
            s.remote_url = Some(url);
            s.enter(Phase::AwaitingAnalysis);
            Ok(())
        })
    }

    pub fn mark_complete(
        &self,
        generation: u64,
        result: DeviceAnalysis,
    ) -> Result<(), SessionError> {
        let out = self.mutate(generation, "complete", |s| {
            if s.phase != Phase::AwaitingAnalysis {
                return Err(invalid(s.phase, "complete"));
            }
            s.result = Some(result);
            s.progress = 100;
            s.enter(Phase::Complete);
            Ok(())
        });
        if out.is_ok() {
            self.release_ticker();
        }
        out
    }

    /// Failure keeps the preview so the user can retry without re-selecting
    /// the file.
    pub fn mark_failed(&self, generation: u64, error: &ScanError) -> Result<(), SessionError> {
        let out = self.mutate(generation, "failed", |s| {
            if !s.phase.in_flight() {
                return Err(invalid(s.phase, "failed"));
            }
            s.last_error = Some(error.to_string());
            s.enter(Phase::Failed);
            Ok(())
        });
        if out.is_ok() {
            self.release_ticker();
        }
        out
    }

    /// One ticker step. Only legal while an upload or analysis is in
    /// flight; the ticker uses the error to know when to stop.
    pub fn advance_progress(
        &self,
        generation: u64,
        step: u8,
        cap: u8,
    ) -> Result<u8, SessionError> {
        let mut after = 0;
        self.mutate(generation, "advance-progress", |s| {
            if !s.phase.in_flight() {
                return Err(invalid(s.phase, "advance-progress"));
            }
            s.progress = s.progress.saturating_add(step).min(cap.min(99));
            after = s.progress;
            Ok(())
        })?;
        Ok(after)
    }

    pub fn attach_ticker(&self, handle: JoinHandle<()>) {
        let mut slot = self.inner.ticker.lock().expect("ticker lock");
        if let Some(old) = slot.take() {
            old.abort();
        }
        *slot = Some(handle);
    }

    /// Stops the ticker if one is running. Leaving it behind would keep a
    /// timer mutating state after the owning run is gone.
    pub fn release_ticker(&self) {
        let handle = self.inner.ticker.lock().expect("ticker lock").take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    fn mutate<F>(&self, generation: u64, to: &'static str, f: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut UploadSession) -> Result<(), SessionError>,
    {
        let mut state = self.inner.state.lock().expect("session state lock");
        let current = self.inner.generation.load(Ordering::SeqCst);
        if generation != current {
            debug!("discarding stale {to} write (generation {generation}, current {current})");
            return Err(SessionError::Stale {
                have: generation,
                current,
            });
        }
        f(&mut state)
    }
}

fn invalid(from: Phase, to: &'static str) -> SessionError {
    SessionError::InvalidTransition {
        from: from.name(),
        to,
    }
}
