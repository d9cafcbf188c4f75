use crate::{
    acquire,
    config::Config,
    pipeline::Pipeline,
    recyclers::{self, GeoPosition, RecyclerPanel, SortKey},
    remote::{HttpRemote, Remote},
    util::{ensure_dir, now_rfc3339},
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ecoscan")]
#[command(about = "E-waste photo analysis client (media upload + analysis backend + recycler lookup)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./ecoscan.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check config and backend reachability.
    Doctor {},
    /// Validate an image offline and show its local preview facts.
    Preview {
        #[arg(long)]
        input: PathBuf,
    },
    /// Upload an image, request the analysis and render the report.
    Analyze {
        #[arg(long, conflicts_with = "sample", required_unless_present = "sample")]
        input: Option<PathBuf>,
        /// Use the built-in sample device photo instead of a file.
        #[arg(long)]
        sample: bool,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Look up nearby e-waste recyclers.
    Recyclers {
        #[arg(long, requires = "longitude")]
        latitude: Option<f64>,
        #[arg(long, requires = "latitude")]
        longitude: Option<f64>,
        /// Case-insensitive filter on name or address.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value = "distance")]
        sort: SortKey,
    },
}

pub async fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;

    match &args.cmd {
        Command::Doctor {} => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            doctor(&cfg).await
        }
        Command::Preview { input } => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            preview(&cfg, input)
        }
        Command::Analyze {
            input,
            sample,
            out_dir,
        } => analyze(&args, &cfg, input.as_deref(), *sample, out_dir.as_deref()).await,
        Command::Recyclers {
            latitude,
            longitude,
            search,
            sort,
        } => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            let explicit = latitude
                .zip(*longitude)
                .map(|(latitude, longitude)| GeoPosition {
                    latitude,
                    longitude,
                });
            lookup_recyclers(&cfg, explicit, search.as_deref(), *sort).await
        }
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("ecoscan.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("ecoscan.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config, session_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    if let Some(session_dir) = session_dir {
        return Some(session_dir.join("logs").join("ecoscan.log"));
    }

    Some(PathBuf::from(&cfg.output.out_dir).join("ecoscan.log"))
}

async fn doctor(cfg: &Config) -> Result<()> {
    let remote = HttpRemote::new(cfg)?;
    let diag = remote.doctor().await;
    if cfg.upload.endpoint.is_empty() {
        warn!("upload.endpoint is not configured; analyze will fail at the upload step");
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "backend": diag,
            "upload_endpoint_configured": !cfg.upload.endpoint.is_empty(),
        }))?
    );
    Ok(())
}

fn preview(cfg: &Config, input: &Path) -> Result<()> {
    let preview = acquire::load_path(cfg, input)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "input": input,
            "mime": preview.mime,
            "bytes": preview.byte_len,
            "session_id": preview.content_id,
            "preview_data_url_bytes": preview.data_url.len(),
        }))?
    );
    Ok(())
}

async fn analyze(
    args: &Args,
    cfg: &Config,
    input: Option<&Path>,
    sample: bool,
    out_override: Option<&Path>,
) -> Result<()> {
    // Acquire first: a rejected input needs no artifact dir and no logging
    // into one.
    let preview = if sample {
        acquire::sample(cfg)?
    } else {
        let input = input.ok_or_else(|| anyhow!("--input or --sample is required"))?;
        acquire::load_path(cfg, input)?
    };

    let out_root = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.output.out_dir));
    let session_dir = out_root.join(&preview.content_id);
    ensure_dir(&session_dir)?;

    let _guard = init_logging(args, cfg, resolve_log_path(cfg, Some(&session_dir)).as_deref())?;
    info!(
        "session {} out={}",
        &preview.content_id[..12],
        session_dir.display()
    );

    let started = now_rfc3339();
    let remote = HttpRemote::new(cfg)?;
    let pipeline = Pipeline::new(cfg, remote);
    let outcome = pipeline.analyze_preview(preview).await?;

    if cfg.output.write_analysis_json {
        std::fs::write(
            session_dir.join(&cfg.output.analysis_filename),
            serde_json::to_string_pretty(&outcome.analysis)?,
        )?;
    }

    if cfg.output.write_report_json {
        std::fs::write(
            session_dir.join(&cfg.output.report_filename),
            serde_json::to_string_pretty(&outcome.report)?,
        )?;
    }

    if cfg.output.write_index_json {
        let index = serde_json::json!({
            "session_id": outcome.session_id,
            "started": started,
            "finished": now_rfc3339(),
            "analysis": cfg.output.analysis_filename,
            "report": cfg.output.report_filename,
        });
        std::fs::write(
            session_dir.join("index.json"),
            serde_json::to_string_pretty(&index)?,
        )?;
    }

    println!("{}", crate::report::render_text(&outcome.report));
    Ok(())
}

async fn lookup_recyclers(
    cfg: &Config,
    explicit: Option<GeoPosition>,
    search: Option<&str>,
    sort: SortKey,
) -> Result<()> {
    let env_raw = std::env::var(recyclers::POSITION_ENV).ok();
    let position = recyclers::resolve_position(explicit, env_raw.as_deref(), &cfg.geo)?;

    let remote = HttpRemote::new(cfg)?;
    let mut panel = RecyclerPanel::default();
    panel.toggle(|| remote.nearby_recyclers(position)).await?;

    let mut records = recyclers::filter_records(panel.records(), search.unwrap_or(""));
    recyclers::sort_records(&mut records, sort);

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "position": position,
            "sort": sort,
            "matches": records.len(),
            "recyclers": records,
        }))?
    );
    Ok(())
}
