use super::types::{ExtractIn, ExtractOut};
use crate::{capability::Capability, config::Config};
use anyhow::{anyhow, Context, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const RUNNER_SCRIPT: &str = "extract_runner.py";

/// Engine names understood by the runner script, in registration order.
pub const ENGINE_NAMES: [&str; 7] = [
    "docling",
    "PyMuPDF",
    "pdfplumber",
    "pytesseract",
    "easyocr",
    "python-docx",
    "beautifulsoup4",
];

/// Spawns the runner script and exchanges one JSON document each way.
pub struct PythonRunner {
    script: PathBuf,
    python_exe: PathBuf,
    env: Vec<(String, String)>,
}

impl PythonRunner {
    pub fn new(cfg: &Config) -> Result<Self> {
        let scripts_dir = PathBuf::from(&cfg.paths.scripts_dir);
        if cfg.security.pin_scripts_dir {
            let cwd = std::env::current_dir().with_context(|| "current_dir")?;
            let canon = scripts_dir
                .canonicalize()
                .with_context(|| format!("canonicalize scripts_dir: {}", scripts_dir.display()))?;
            if !canon.starts_with(&cwd) {
                return Err(anyhow!(
                    "scripts_dir is outside cwd while pin_scripts_dir=true: {}",
                    canon.display()
                ));
            }
        }
        let script = scripts_dir.join(RUNNER_SCRIPT);
        if !script.exists() {
            return Err(anyhow!("missing script: {}", script.display()));
        }
        Ok(Self {
            script,
            python_exe: resolve_python_exe(&cfg.python.python_exe),
            env: cfg
                .python
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        })
    }

    pub fn extract(&self, engine: &str, input: &Path, timeout: Option<u64>) -> Result<String> {
        let req = ExtractIn {
            cmd: "extract".into(),
            engine: engine.into(),
            input: input.display().to_string(),
        };
        let out: ExtractOut = self.run_json(&req, timeout)?;
        if !out.ok {
            let msg = out
                .error
                .unwrap_or_else(|| format!("{engine} returned ok=false"));
            return Err(anyhow!(msg));
        }
        Ok(out.text)
    }

    fn run_json<I: serde::Serialize, O: for<'de> serde::Deserialize<'de>>(
        &self,
        input: &I,
        timeout_seconds: Option<u64>,
    ) -> Result<O> {
        debug!(
            "python run {} timeout={:?}",
            self.script.display(),
            timeout_seconds
        );
        let mut cmd = Command::new(&self.python_exe);
        cmd.arg(&self.script);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        for (k, v) in &self.env {
            cmd.env(k, v);
        }

        let bytes = serde_json::to_vec(input)?;
        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning {}", self.python_exe.display()))?;

        // A runner that exits before reading its request is reported through
        // the exit status below, after the child has been reaped.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(&bytes).and_then(|_| stdin.flush()) {
                debug!("runner closed stdin early: {err}");
            }
        }

        let output = match timeout_seconds {
            Some(secs) => wait_with_timeout(&mut child, Duration::from_secs(secs))?,
            None => child
                .wait_with_output()
                .with_context(|| "waiting for python")?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "runner exited with {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("python stderr: {}", stderr.trim());
        }

        serde_json::from_slice(&output.stdout).with_context(|| "parsing runner JSON output")
    }
}

/// One runner-backed engine. Holds the shared runner and its own timeout.
pub struct PythonCapability {
    name: String,
    runner: Arc<PythonRunner>,
    timeout: Option<u64>,
}

impl PythonCapability {
    pub fn new(name: impl Into<String>, runner: Arc<PythonRunner>, timeout: Option<u64>) -> Self {
        Self {
            name: name.into(),
            runner,
            timeout,
        }
    }
}

impl Capability for PythonCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, path: &Path) -> Result<String> {
        self.runner.extract(&self.name, path, self.timeout)
    }
}

fn resolve_python_exe(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var("TEXTSIFT_PYTHON") {
            let p = expand_tilde(&env_val);
            if p.exists() {
                return p;
            }
        }
        return PathBuf::from("python3");
    }
    expand_tilde(raw)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

/// Pipe reader running on its own thread. The buffer is shared so a caller
/// that gives up on the child can still see what was read so far.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: JoinHandle<Result<()>>,
}

impl Drain {
    fn spawn<R: Read + Send + 'static>(reader: Option<R>, label: &'static str) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = buf.clone();
        let handle = std::thread::spawn(move || {
            let Some(mut r) = reader else {
                return Ok(());
            };
            let mut chunk = [0u8; 8192];
            loop {
                let n = r.read(&mut chunk).with_context(|| format!("read {label}"))?;
                if n == 0 {
                    return Ok(());
                }
                sink.lock()
                    .map_err(|_| anyhow!("{label} buffer poisoned"))?
                    .extend_from_slice(&chunk[..n]);
            }
        });
        Self { buf, handle }
    }

    fn snapshot(&self) -> Vec<u8> {
        match self.buf.lock() {
            Ok(b) => b.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Waits for EOF. Only safe once nothing else can hold the pipe open.
    fn finish(self, label: &str) -> Result<Vec<u8>> {
        let Self { buf, handle } = self;
        handle
            .join()
            .map_err(|_| anyhow!("{label} reader thread panicked"))??;
        let snapshot = match buf.lock() {
            Ok(b) => b.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        Ok(snapshot)
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<Output> {
    // Pipes are drained while waiting so a chatty engine cannot block on a
    // full stdout/stderr buffer.
    let stdout = Drain::spawn(child.stdout.take(), "stdout");
    let stderr = Drain::spawn(child.stderr.take(), "stderr");

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().with_context(|| "try_wait")? {
            return Ok(Output {
                status,
                stdout: stdout.finish("stdout")?,
                stderr: stderr.finish("stderr")?,
            });
        }

        if start.elapsed() > timeout {
            warn!("engine process timed out after {:?}", timeout);
            let _ = child.kill();
            child.wait().with_context(|| "wait after kill")?;
            // Grandchildren spawned by the engine may still hold the pipes,
            // so the reader threads are left to finish on their own.
            return Err(anyhow!(
                "engine exceeded timeout ({:?}); stderr: {}",
                timeout,
                String::from_utf8_lossy(&stderr.snapshot()).trim()
            ));
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}
