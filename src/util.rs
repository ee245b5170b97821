use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use time::macros::format_description;

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

/// UTC stamp used in saved result names, e.g. `20260114_093005`.
pub fn now_compact() -> String {
    let fmt = format_description!("[year][month][day]_[hour][minute][second]");
    time::OffsetDateTime::now_utc()
        .format(fmt)
        .unwrap_or_else(|_| "19700101_000000".to_string())
}

/// `<results_dir>/<input stem>_<stamp>_extracted.txt`
pub fn result_path(results_dir: &Path, input: &Path, stamp: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document");
    results_dir.join(format!("{stem}_{stamp}_extracted.txt"))
}

pub fn save_text(results_dir: &Path, input: &Path, text: &str) -> Result<PathBuf> {
    ensure_dir(results_dir)?;
    let path = result_path(results_dir, input, &now_compact());
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
