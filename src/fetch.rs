//! Fetch raw profiling texts from the profiler server
//!
//! IMPORTANT: This module downloads and stores RAW TEXT ONLY.
//! All normalization, coloring and reordering happens on the fly when a
//! visualization is built. No retries, no caching.
//!
//! Raw text formats:
//! - coordinates: newline-delimited rows of up to 3 comma-separated floats
//! - labels: newline-delimited point names
//! - scores: newline-delimited `label:value` pairs
//! - similarity: CSV with a header line, then `row,col,value` lines

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Fetch one raw text document
pub async fn fetch_text(url: &str) -> Result<String> {
    tracing::debug!("Fetching from: {}", url);

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .header("User-Agent", "ProfilerViz/0.1")
        .send()
        .await?;

    if !response.status().is_success() {
        anyhow::bail!("Profiler server returned status {} for {}", response.status(), url);
    }

    let text = response.text().await?;
    tracing::debug!("Downloaded {} bytes of text", text.len());
    Ok(text)
}

/// Fetch a raw text document and store it unmodified
pub async fn fetch_to_file(url: &str, output_dir: &Path, filename: &str) -> Result<PathBuf> {
    tracing::info!("Downloading {} from {}", filename, url);

    let text = fetch_text(url).await?;

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(filename);
    std::fs::write(&path, &text)?;
    tracing::info!("Saved raw text to {:?}", path);

    Ok(path)
}

/// Build the score-set text URL the profiler server exposes,
/// `<base>/scores/<id>/text`
pub fn score_url(base: &str, score_set: &str) -> String {
    format!(
        "{}/scores/{}/text",
        base.trim_end_matches('/'),
        urlencoding::encode(score_set)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_url_shape() {
        assert_eq!(
            score_url("http://localhost:8080/", "accuracy"),
            "http://localhost:8080/scores/accuracy/text"
        );
    }

    #[test]
    fn test_score_url_encodes_id() {
        assert_eq!(
            score_url("http://localhost", "run 1"),
            "http://localhost/scores/run%201/text"
        );
    }
}
