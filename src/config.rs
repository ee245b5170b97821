use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub python: Python,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub engines: Engines,
    #[serde(default)]
    pub routing: Routing,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub security: Security,
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
pub struct Python {
    pub python_exe: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}
impl Default for Python {
    fn default() -> Self {
        Self {
            python_exe: "auto".into(),
            env: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub scripts_dir: String,
    pub results_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            scripts_dir: "scripts".into(),
            results_dir: "results".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engines {
    /// Applies to every engine without an entry in `timeouts`. 0 disables.
    pub timeout_seconds: u64,
    #[serde(default)]
    pub timeouts: BTreeMap<String, u64>,
}
impl Default for Engines {
    fn default() -> Self {
        Self {
            timeout_seconds: 600,
            timeouts: Default::default(),
        }
    }
}

impl Engines {
    pub fn timeout_for(&self, engine: &str) -> Option<u64> {
        let secs = self
            .timeouts
            .get(engine)
            .copied()
            .unwrap_or(self.timeout_seconds);
        (secs > 0).then_some(secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routing {
    pub pdf: Vec<String>,
    pub image: Vec<String>,
    pub word: Vec<String>,
    pub html: Vec<String>,
    pub sniff_content: bool,
}
impl Default for Routing {
    fn default() -> Self {
        Self {
            pdf: vec![
                "docling".into(),
                "PyMuPDF".into(),
                "pdfplumber".into(),
                "pytesseract".into(),
                "easyocr".into(),
            ],
            image: vec!["pytesseract".into(), "easyocr".into()],
            word: vec!["python-docx".into()],
            html: vec!["beautifulsoup4".into()],
            sniff_content: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub json_pretty: bool,
    pub show_debug: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            json_pretty: true,
            show_debug: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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
            write_to_file: false,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Security {
    pub reject_url_inputs: bool,
    pub pin_scripts_dir: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
            pin_scripts_dir: false,
        }
    }
}
