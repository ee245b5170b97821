use crate::{
    config::Config,
    engine::default_registry,
    langid::WhatlangDetector,
    pipeline::{ExtractionRequest, Pipeline},
    router::Router,
    score::Scorer,
    util::{ensure_dir, save_text},
};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "textsift")]
#[command(about = "Extract text from a document with several engines and keep the best output")]
pub struct Args {
    /// Document to extract (PDF, image, DOCX, HTML).
    pub file: PathBuf,

    /// Run only this engine instead of routing by file type.
    #[arg(long)]
    pub engine: Option<String>,

    /// Enable debug logging.
    #[arg(long, short)]
    pub verbose: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Write the winning text into the results directory.
    #[arg(long)]
    pub save: bool,

    /// Path to config TOML. If omitted, uses ./textsift.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let _guard = init_logging(&args, &cfg)?;

    validate_input(&cfg, &args.file)?;

    let registry = Arc::new(default_registry(&cfg)?);
    info!("registered engines: {}", registry.names().join(", "));
    let scorer = Scorer::new(Arc::new(WhatlangDetector))?;
    let pipeline = Pipeline::new(registry, Router::new(cfg.routing.clone()), scorer)?;

    let mut req = ExtractionRequest::new(args.file.clone());
    if let Some(engine) = &args.engine {
        req = req.with_engine(engine);
    }
    let result = pipeline.run(&req)?;

    if !result.has_winner() {
        warn!(
            "no usable output for {}: {}",
            args.file.display(),
            result.error.as_deref().unwrap_or_default()
        );
    }

    if args.json {
        println!("{}", result.to_json(cfg.output.json_pretty)?);
    } else {
        print!("{}", result.render(cfg.output.show_debug));
    }

    if args.save {
        let path = save_text(Path::new(&cfg.paths.results_dir), &args.file, &result.text)?;
        info!("saved text to {}", path.display());
    }

    Ok(())
}

fn load_config(user: Option<&Path>) -> Result<Config> {
    if let Some(p) = user {
        return Config::load(p);
    }
    for candidate in ["textsift.toml", "textsift.example.toml"] {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Config::load(&path);
        }
    }
    Ok(Config::default())
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = match (&args.log_level, args.verbose) {
        (Some(level), _) => level.as_str(),
        (None, true) => "debug",
        (None, false) => cfg.logging.level.as_str(),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout is reserved for the result itself.
    let console_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = match resolve_log_path(cfg) {
        Some(path) => {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            ensure_dir(parent)?;
            let file = std::fs::File::create(&path)
                .with_context(|| format!("create log file: {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from(&cfg.paths.results_dir).join("textsift.log"))
}

fn validate_input(cfg: &Config, input: &Path) -> Result<()> {
    let input_str = input.display().to_string();
    if cfg.security.reject_url_inputs && looks_like_url(&input_str) {
        return Err(anyhow!("URL inputs are disabled: {input_str}"));
    }
    Ok(())
}

fn looks_like_url(s: &str) -> bool {
    let s = s.to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}
