pub mod chunker;

pub use chunker::TextChunker;

use anyhow::{bail, Result};
use std::path::Path;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::types::CorpusChunk;

const CORPUS_EXTENSIONS: &[&str] = &["txt", "md"];

/// Walk `dir` for text documents and cut them into index-ready chunks.
///
/// Files that cannot be read as UTF-8 are skipped with a warning.
pub fn load_corpus(dir: &Path, chunker: &TextChunker) -> Result<Vec<CorpusChunk>> {
    if !dir.is_dir() {
        bail!("Corpus directory {} does not exist", dir.display());
    }

    let mut chunks = Vec::new();
    let mut files = 0usize;

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| CORPUS_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !supported {
            continue;
        }

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable corpus file");
                continue;
            }
        };

        let source = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        files += 1;
        chunks.extend(chunker.chunk(&text).into_iter().map(|text| CorpusChunk {
            id: Uuid::new_v4(),
            text,
            source: source.clone(),
        }));
    }

    tracing::info!(
        dir = %dir.display(),
        files,
        chunks = chunks.len(),
        "Corpus loaded"
    );
    Ok(chunks)
}
