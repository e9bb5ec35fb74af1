use std::path::PathBuf;

use anyhow::Result;
use docqa_core::Config;
use docqa_service::ingest::{DocumentLoader, PdfLoader, TextSplitter};

/// Dry run of extraction and chunking; no embeddings, nothing persisted.
pub(crate) async fn run(config: &Config, file: PathBuf) -> Result<()> {
    let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap)?;
    let report = tokio::task::spawn_blocking(move || -> Result<serde_json::Value> {
        let pages = PdfLoader.load(&file)?;
        let source = file.file_name().map_or_else(
            || file.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        let chunks = splitter.split_pages(&pages, &source);
        let characters: usize = pages.iter().map(|p| p.text.chars().count()).sum();
        Ok(serde_json::json!({
            "file": file.display().to_string(),
            "pages": pages.len(),
            "chunks": chunks.len(),
            "characters": characters,
        }))
    })
    .await??;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
