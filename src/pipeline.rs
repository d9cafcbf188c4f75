//! The upload-to-analysis sequence: preview, upload, analyze, decode,
//! report. Each stage either advances the session machine or parks it in
//! `Failed` with the boundary error; nothing here retries on its own.

use crate::acquire::{self, ImagePreview};
use crate::config::Config;
use crate::envelope;
use crate::error::ScanError;
use crate::model::DeviceAnalysis;
use crate::progress;
use crate::remote::Remote;
use crate::report::ScanReport;
use crate::session::{Phase, SessionHandle};
use anyhow::{Result, bail};
use std::path::Path;
use std::time::Instant;
use tracing::info;

pub struct Pipeline<R: Remote> {
    cfg: Config,
    remote: R,
    session: SessionHandle,
}

pub struct ScanOutcome {
    pub session_id: String,
    pub analysis: DeviceAnalysis,
    pub report: ScanReport,
}

impl<R: Remote> Pipeline<R> {
    pub fn new(cfg: &Config, remote: R) -> Self {
        Self {
            cfg: cfg.clone(),
            remote,
            session: SessionHandle::new(),
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub async fn analyze_file(&self, input: &Path) -> Result<ScanOutcome> {
        let preview = acquire::load_path(&self.cfg, input)?;
        self.analyze_preview(preview).await
    }

    pub async fn analyze_sample(&self) -> Result<ScanOutcome> {
        let preview = acquire::sample(&self.cfg)?;
        self.analyze_preview(preview).await
    }

    pub async fn analyze_preview(&self, preview: ImagePreview) -> Result<ScanOutcome> {
        let started = Instant::now();

        // Starting a new upload invalidates any prior result, but never an
        // upload that is still running.
        let snapshot = self.session.snapshot();
        if matches!(snapshot.phase, Phase::Uploading | Phase::AwaitingAnalysis) {
            bail!("an upload is already in flight for this session");
        }
        if snapshot.phase != Phase::Idle {
            self.session.reset();
        }

        let generation = self.session.generation();
        self.session.select_preview(generation, preview.clone())?;
        info!(
            "session {} selected {} ({}, {} bytes)",
            &preview.content_id[..12],
            preview.file_name,
            preview.mime,
            preview.byte_len
        );

        self.session.begin_upload(generation)?;
        progress::spawn_ticker(self.session.clone(), generation, self.cfg.progress.clone());

        let remote_url = match self.remote.upload_image(&preview).await {
            Ok(url) => url,
            Err(err) => return self.park(generation, err),
        };
        self.session.mark_uploaded(generation, remote_url.clone())?;
        info!("uploaded in {:?}, analyzing {remote_url}", started.elapsed());

        let raw = match self.remote.analyze(&remote_url).await {
            Ok(raw) => raw,
            Err(err) => return self.park(generation, err),
        };
        let analysis = match envelope::decode_analysis(&raw) {
            Ok(analysis) => analysis,
            Err(err) => return self.park(generation, err),
        };

        self.session.mark_complete(generation, analysis.clone())?;
        info!(
            "analysis complete for session {} in {:?}",
            &preview.content_id[..12],
            started.elapsed()
        );

        let report = ScanReport::from_analysis(&analysis);
        Ok(ScanOutcome {
            session_id: preview.content_id,
            analysis,
            report,
        })
    }

    fn park(&self, generation: u64, err: ScanError) -> Result<ScanOutcome> {
        // A reset may have raced us; the stale write is dropped either way.
        let _ = self.session.mark_failed(generation, &err);
        Err(err.into())
    }
}
