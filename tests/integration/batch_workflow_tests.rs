/*!
 * End-to-end batch translation tests
 *
 * These tests run a whole batch through the orchestrator and the real
 * plain-text processor, substituting only the network-backed translate
 * capability with a mock.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;

use doctrans::errors::ProcessingError;
use doctrans::orchestrator::{BatchRequest, JobStatus, Orchestrator, RunState};
use doctrans::processing::{DocumentProcessor, PlainTextProcessor};
use doctrans::providers::{ProviderId, ProviderRegistry, ProviderSelection, Translate};

use crate::common::mock_providers::{MockTranslator, RecordingSink};
use crate::common::{create_temp_dir, create_test_document, create_test_file};

/// Plain-text processing with the translate capability pinned to a mock,
/// so batches run end-to-end without any network
struct OfflineProcessor {
    inner: PlainTextProcessor,
    translator: MockTranslator,
}

impl OfflineProcessor {
    fn new() -> Self {
        Self {
            inner: PlainTextProcessor::new(),
            translator: MockTranslator::new(),
        }
    }
}

#[async_trait]
impl DocumentProcessor for OfflineProcessor {
    fn supported_extensions(&self) -> &[&str] {
        self.inner.supported_extensions()
    }

    async fn process_file(
        &self,
        path: &Path,
        _translator: &dyn Translate,
        source_lang: &str,
        target_lang: &str,
        max_workers: usize,
        cleanup: bool,
    ) -> Result<PathBuf, ProcessingError> {
        self.inner
            .process_file(
                path,
                &self.translator,
                source_lang,
                target_lang,
                max_workers,
                cleanup,
            )
            .await
    }
}

fn request(files: Vec<PathBuf>) -> BatchRequest {
    BatchRequest {
        files,
        provider: ProviderSelection::new(ProviderId::OpenAi)
            .with_api_key(SecretString::from("sk-test".to_string())),
        source_lang: "zh".to_string(),
        target_lang: "en".to_string(),
        max_workers: 2,
        cleanup: true,
    }
}

#[tokio::test]
async fn test_batchWorkflow_withValidFiles_shouldWriteAllOutputs() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let first = create_test_document(&dir, "first.txt").unwrap();
    let second = create_test_file(&dir, "second.txt", "Only one paragraph.").unwrap();

    let sink = Arc::new(RecordingSink::new());
    let orchestrator = Orchestrator::new(
        Arc::new(ProviderRegistry::new()),
        Arc::new(OfflineProcessor::new()),
        sink.clone(),
    );

    orchestrator.start(request(vec![first, second])).unwrap();
    orchestrator.join().await;

    let snapshot = orchestrator.snapshot().unwrap();
    assert_eq!(snapshot.state, RunState::Completed);
    assert_eq!(snapshot.count(JobStatus::Succeeded), 2);
    assert_eq!(snapshot.progress_percent, 100.0);

    let first_out = dir.join("first_en.txt");
    let second_out = dir.join("second_en.txt");
    assert!(first_out.exists());
    assert!(second_out.exists());
    assert_eq!(
        std::fs::read_to_string(second_out).unwrap(),
        "[en] Only one paragraph."
    );

    // Job records point at the written outputs
    assert_eq!(snapshot.jobs[0].output_path.as_deref(), Some(first_out.as_path()));
}

#[tokio::test]
async fn test_batchWorkflow_withEmptyFileInBatch_shouldFailOnlyThatJob() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let good = create_test_document(&dir, "good.txt").unwrap();
    let empty = create_test_file(&dir, "empty.txt", "  \n ").unwrap();
    let also_good = create_test_file(&dir, "tail.txt", "Closing remarks.").unwrap();

    let sink = Arc::new(RecordingSink::new());
    let orchestrator = Orchestrator::new(
        Arc::new(ProviderRegistry::new()),
        Arc::new(OfflineProcessor::new()),
        sink.clone(),
    );

    orchestrator
        .start(request(vec![good, empty, also_good]))
        .unwrap();
    orchestrator.join().await;

    let snapshot = orchestrator.snapshot().unwrap();
    assert_eq!(snapshot.state, RunState::Completed);
    let statuses: Vec<JobStatus> = snapshot.jobs.iter().map(|job| job.status).collect();
    assert_eq!(
        statuses,
        vec![JobStatus::Succeeded, JobStatus::Failed, JobStatus::Succeeded]
    );
    assert!(snapshot.jobs[1]
        .error
        .as_deref()
        .unwrap()
        .contains("Document is empty"));

    // The summary log reports the split
    let summary = sink.logs().into_iter().last().unwrap();
    assert!(summary.contains("2 succeeded, 1 failed"));
}

#[tokio::test]
async fn test_batchWorkflow_withUnsupportedFileInBatch_shouldContinue() {
    let temp_dir = create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let good = create_test_file(&dir, "good.txt", "Fine text.").unwrap();
    let binary = create_test_file(&dir, "deck.pptx", "not really slides").unwrap();

    let orchestrator = Orchestrator::new(
        Arc::new(ProviderRegistry::new()),
        Arc::new(OfflineProcessor::new()),
        Arc::new(RecordingSink::new()),
    );

    orchestrator.start(request(vec![binary, good])).unwrap();
    orchestrator.join().await;

    let snapshot = orchestrator.snapshot().unwrap();
    assert_eq!(snapshot.state, RunState::Completed);
    let statuses: Vec<JobStatus> = snapshot.jobs.iter().map(|job| job.status).collect();
    assert_eq!(statuses, vec![JobStatus::Failed, JobStatus::Succeeded]);
}
