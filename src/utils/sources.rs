//! Source list handling.

use std::path::Path;

use crate::error::{AppError, Result};

/// Parse a source list: one account per line, blank lines and `#`
/// comments ignored, duplicates dropped keeping the first occurrence.
pub fn parse_sources(text: &str) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !sources.iter().any(|s| s == line) {
            sources.push(line.to_string());
        }
    }
    sources
}

/// Read a source list file.
pub async fn read_sources(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::config(format!("cannot read source list {}: {}", path.display(), e))
    })?;
    let sources = parse_sources(&text);
    log::info!("Loaded {} source(s) from {}", sources.len(), path.display());
    Ok(sources)
}

/// Split a comma-separated argument, trimming items and dropping empty ones.
pub fn parse_list(arg: &str) -> Vec<String> {
    arg.split([',', '，'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
