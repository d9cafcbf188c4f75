use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub upload: Upload,
    pub backend: Backend,
    pub limits: Limits,
    pub progress: Progress,
    pub geo: Geo,
    pub output: Output,
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Upload {
    /// Media-host upload endpoint. Empty means not configured; `doctor`
    /// flags it and `analyze` fails at the upload step.
    pub endpoint: String,
    /// Upload-profile identifier the media host expects alongside the file.
    pub profile: String,
    pub field_name: String,
    pub timeout_seconds: u64,
}
impl Default for Upload {
    fn default() -> Self {
        Self {
            endpoint: "".into(),
            profile: "ecoscan_unsigned".into(),
            field_name: "file".into(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Backend {
    pub base_url: String,
    pub analyze_path: String,
    pub recyclers_path: String,
    pub timeout_seconds: u64,
}
impl Default for Backend {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
            analyze_path: "/api/analyze".into(),
            recyclers_path: "/api/nearby_recyclers".into(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_image_bytes: u64,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub tick_ms: u64,
    pub step_percent: u8,
    pub cap_percent: u8,
}
impl Default for Progress {
    fn default() -> Self {
        Self {
            tick_ms: 200,
            step_percent: 5,
            cap_percent: 95,
        }
    }
}

impl Progress {
    /// The estimate never reaches 100 on its own; only completion sets 100.
    pub fn effective_cap(&self) -> u8 {
        self.cap_percent.min(99)
    }
}

/// Optional fixed position, the lowest-priority geolocation source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Geo {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub out_dir: String,
    pub write_report_json: bool,
    pub write_analysis_json: bool,
    pub write_index_json: bool,
    pub report_filename: String,
    pub analysis_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            out_dir: "out".into(),
            write_report_json: true,
            write_analysis_json: true,
            write_index_json: true,
            report_filename: "report.json".into(),
            analysis_filename: "analysis.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}
