use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::AppConfig;

/// Trim, drop blanks, and deduplicate while preserving order.
pub fn normalize<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut keywords: Vec<String> = raw
        .into_iter()
        .map(|k| k.as_ref().trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    let mut seen = HashSet::new();
    keywords.retain(|k| seen.insert(k.clone()));
    keywords
}

/// Parse a keyword file: one per line, `#` starts a comment line.
pub fn parse_keyword_file(contents: &str) -> Vec<String> {
    let lines = contents
        .lines()
        .map(|line| line.trim_start_matches('\u{feff}'))
        .filter(|line| !line.trim_start().starts_with('#'));
    normalize(lines)
}

/// Keywords from the config list followed by the keyword file, if any.
pub fn load(config: &AppConfig) -> Result<Vec<String>> {
    let mut raw = config.keywords.clone();
    if let Some(path) = &config.keywords_file {
        raw.extend(read_keyword_file(path)?);
    }
    Ok(normalize(raw))
}

fn read_keyword_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read keyword file {}", path.display()))?;
    Ok(parse_keyword_file(&contents))
}
