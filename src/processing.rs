/*!
 * Document processing: the contract between the orchestrator and format
 * handlers, plus the bundled plain-text reference implementation.
 *
 * A processor owns extraction, chunking, and rewriting for one family of
 * formats. Translation itself always goes through the provider capability
 * handed in by the orchestrator.
 */

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ProcessingError, ProviderError};
use crate::providers::Translate;

/// Chunking cap used when the caller does not supply one
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1000;

/// Blank-line paragraph boundary
static PARAGRAPH_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Contract between the orchestrator and a document processor
#[async_trait]
pub trait DocumentProcessor: Send + Sync {
    /// File extensions (lowercase, without the dot) this processor accepts
    fn supported_extensions(&self) -> &[&str];

    /// Translate one document, returning the path of the written output.
    ///
    /// `max_workers` bounds concurrent translation calls. When `cleanup` is
    /// false the processor may leave intermediate artifacts next to the
    /// input to help diagnose failures.
    async fn process_file(
        &self,
        path: &Path,
        translator: &dyn Translate,
        source_lang: &str,
        target_lang: &str,
        max_workers: usize,
        cleanup: bool,
    ) -> Result<PathBuf, ProcessingError>;
}

/// Split text into translation chunks.
///
/// Paragraphs (blank-line separated) are merged greedily up to
/// `max_chunk_size` characters. A single paragraph longer than the cap is
/// kept whole rather than split mid-sentence.
pub fn split_into_chunks(text: &str, max_chunk_size: usize) -> Vec<String> {
    let max_chunk_size = max_chunk_size.max(1);
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for paragraph in PARAGRAPH_SPLIT.split(text) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        let paragraph_len = paragraph.chars().count();

        if current_len > 0 && current_len + 2 + paragraph_len > max_chunk_size {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push_str("\n\n");
            current_len += 2;
        }
        current.push_str(paragraph);
        current_len += paragraph_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

// Write through a temp file in the target directory so readers never see a
// partial document
fn write_atomic(path: &Path, contents: &str) -> Result<(), ProcessingError> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|e| ProcessingError::Io(e.error))?;
    Ok(())
}

/// Reference processor for UTF-8 plain-text documents
#[derive(Debug, Clone)]
pub struct PlainTextProcessor {
    /// Upper bound on characters per translation request
    max_chunk_size: usize,
    /// Directory for outputs, next to the input when absent
    output_dir: Option<PathBuf>,
}

impl PlainTextProcessor {
    /// Create a processor with the default chunk cap
    pub fn new() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            output_dir: None,
        }
    }

    /// Set the chunking cap in characters
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size.max(1);
        self
    }

    /// Write outputs into `dir` instead of next to each input
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Output path `<stem>_<target_lang>.<ext>` in the output directory or
    /// next to the input
    pub fn output_path(&self, input: &Path, target_lang: &str) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        let ext = input
            .extension()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "txt".to_string());
        let file_name = format!("{}_{}.{}", stem, target_lang, ext);
        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => input.with_file_name(file_name),
        }
    }

    /// Translate chunks concurrently, returning results in chunk order.
    ///
    /// `buffer_unordered` caps the number of in-flight requests, so no
    /// extra gating is needed. Chunks are moved into their futures.
    async fn translate_chunks(
        &self,
        chunks: Vec<String>,
        translator: &dyn Translate,
        source_lang: &str,
        target_lang: &str,
        max_workers: usize,
    ) -> Vec<(usize, Result<String, ProviderError>)> {
        let max_workers = max_workers.max(1);

        let mut results = stream::iter(chunks.into_iter().enumerate())
            .map(|(chunk_index, chunk)| async move {
                let result = translator.translate(&chunk, source_lang, target_lang).await;
                (chunk_index, result)
            })
            .buffer_unordered(max_workers)
            .collect::<Vec<_>>()
            .await;

        // Restore original order regardless of completion order
        results.sort_by_key(|(idx, _)| *idx);
        results
    }
}

impl Default for PlainTextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentProcessor for PlainTextProcessor {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md"]
    }

    async fn process_file(
        &self,
        path: &Path,
        translator: &dyn Translate,
        source_lang: &str,
        target_lang: &str,
        max_workers: usize,
        cleanup: bool,
    ) -> Result<PathBuf, ProcessingError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !self.supported_extensions().contains(&extension.as_str()) {
            return Err(ProcessingError::UnsupportedFormat(
                path.display().to_string(),
            ));
        }

        let text = tokio::fs::read_to_string(path).await?;
        if text.trim().is_empty() {
            return Err(ProcessingError::EmptyDocument(path.display().to_string()));
        }

        let chunks = split_into_chunks(&text, self.max_chunk_size);
        debug!(
            "Translating {} in {} chunks with {} workers",
            path.display(),
            chunks.len(),
            max_workers.max(1)
        );

        let results = self
            .translate_chunks(chunks, translator, source_lang, target_lang, max_workers)
            .await;

        // Keep the translated prefix up to the first failure
        let mut translated: Vec<String> = Vec::with_capacity(results.len());
        let mut failure: Option<ProviderError> = None;
        for (_, result) in results {
            match result {
                Ok(chunk) => {
                    if failure.is_none() {
                        translated.push(chunk);
                    }
                }
                Err(e) => {
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
            }
        }

        let output = self.output_path(path, target_lang);

        if let Some(err) = failure {
            if !cleanup && !translated.is_empty() {
                let partial_path = PathBuf::from(format!("{}.partial", output.display()));
                match write_atomic(&partial_path, &translated.join("\n\n")) {
                    Ok(()) => info!("Kept partial output at {}", partial_path.display()),
                    Err(write_err) => warn!(
                        "Could not write partial output {}: {}",
                        partial_path.display(),
                        write_err
                    ),
                }
            }
            return Err(ProcessingError::Translation(err));
        }

        write_atomic(&output, &translated.join("\n\n"))?;
        Ok(output)
    }
}
