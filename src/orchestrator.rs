/*!
 * Batch translation lifecycle.
 *
 * One background worker processes the selected files strictly in order,
 * isolating per-file failures and reporting ordered progress/log events.
 * Cancellation is cooperative: a flag checked between files, never
 * preempting the file in flight.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Local};
use log::warn;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::errors::{OrchestratorError, ProcessingError};
use crate::processing::DocumentProcessor;
use crate::providers::{BoundTranslator, ProviderRegistry, ProviderSelection};

/// Receiver of ordered progress and log events
///
/// Implementations are called from the background worker, never from the
/// thread that started the batch, and must relay events without reordering.
pub trait EventSink: Send + Sync {
    /// Overall progress update, `percent` in 0..=100
    fn on_progress(&self, percent: f32, status: &str, current: usize, total: usize);

    /// Human-readable log line
    fn on_log(&self, message: &str);
}

/// Lifecycle of one file inside a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Created, not yet picked up by the worker
    Pending,
    /// Being processed right now
    Running,
    /// Output written
    Succeeded,
    /// Processing or translation failed, batch continued
    Failed,
    /// Skipped because the batch was cancelled
    Cancelled,
}

impl JobStatus {
    // @returns: Lowercase status label
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One file's translation job
#[derive(Debug, Clone)]
pub struct TranslationJob {
    /// Input file
    pub file_path: PathBuf,
    /// Current lifecycle state
    pub status: JobStatus,
    /// Error message when `status` is `Failed`
    pub error: Option<String>,
    /// Output file when `status` is `Succeeded`
    pub output_path: Option<PathBuf>,
}

impl TranslationJob {
    fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            status: JobStatus::Pending,
            error: None,
            output_path: None,
        }
    }
}

/// Lifecycle of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No batch has been started yet
    Idle,
    /// The worker is processing files
    Running,
    /// All files were attempted, or the configuration check failed
    Completed,
    /// Cancellation was observed before the last file
    Cancelled,
}

/// Everything needed to start a batch
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Files to translate, processed in this order
    pub files: Vec<PathBuf>,
    /// Provider binding for the whole batch
    pub provider: ProviderSelection,
    /// Source language code
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
    /// Concurrent translation calls within one file
    pub max_workers: usize,
    /// Remove intermediate artifacts when a file fails
    pub cleanup: bool,
}

/// Read-only view of the current or most recent batch
#[derive(Debug, Clone)]
pub struct BatchSnapshot {
    /// Batch identifier
    pub id: Uuid,
    /// Lifecycle state
    pub state: RunState,
    /// Jobs in selection order
    pub jobs: Vec<TranslationJob>,
    /// Overall progress, 0..=100
    pub progress_percent: f32,
    /// When the batch was started
    pub started_at: DateTime<Local>,
    /// When the batch reached a terminal state
    pub finished_at: Option<DateTime<Local>>,
}

impl BatchSnapshot {
    /// Count of jobs with the given status
    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|job| job.status == status).count()
    }
}

/// One batch of translation jobs, exclusively mutated by the worker while
/// running
struct BatchRun {
    id: Uuid,
    state: RunState,
    jobs: Vec<TranslationJob>,
    progress_percent: f32,
    cancel: Arc<AtomicBool>,
    started_at: DateTime<Local>,
    finished_at: Option<DateTime<Local>>,
}

impl BatchRun {
    fn new(files: &[PathBuf], state: RunState) -> Self {
        Self {
            id: Uuid::new_v4(),
            state,
            jobs: files.iter().cloned().map(TranslationJob::new).collect(),
            progress_percent: 0.0,
            cancel: Arc::new(AtomicBool::new(false)),
            started_at: Local::now(),
            finished_at: None,
        }
    }

    fn snapshot(&self) -> BatchSnapshot {
        BatchSnapshot {
            id: self.id,
            state: self.state,
            jobs: self.jobs.clone(),
            progress_percent: self.progress_percent,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}

struct Inner {
    run: Option<BatchRun>,
    worker: Option<JoinHandle<()>>,
}

/// Runs batches of translation jobs on a single background worker
///
/// Cloning yields another handle onto the same run state.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    processor: Arc<dyn DocumentProcessor>,
    sink: Arc<dyn EventSink>,
    inner: Arc<Mutex<Inner>>,
}

impl Orchestrator {
    /// Create an orchestrator over explicit collaborator instances
    pub fn new(
        registry: Arc<ProviderRegistry>,
        processor: Arc<dyn DocumentProcessor>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            processor,
            sink,
            inner: Arc::new(Mutex::new(Inner {
                run: None,
                worker: None,
            })),
        }
    }

    /// Begin translating a batch on the background worker.
    ///
    /// Returns `Busy` while a batch is running, leaving it untouched. A
    /// provider configuration problem is not an error here: the run is
    /// recorded as completed with zero succeeded jobs after a single log
    /// event, before any network activity.
    pub fn start(&self, request: BatchRequest) -> Result<(), OrchestratorError> {
        if request.files.is_empty() {
            return Err(OrchestratorError::EmptyBatch);
        }

        let mut inner = self.inner.lock();
        if inner
            .run
            .as_ref()
            .is_some_and(|run| run.state == RunState::Running)
        {
            return Err(OrchestratorError::Busy);
        }

        // Bind the provider before any job starts; a bad configuration
        // never reaches the per-file loop.
        match self.registry.create(&request.provider) {
            Ok(translator) => {
                let run = BatchRun::new(&request.files, RunState::Running);
                let cancel = run.cancel.clone();
                inner.run = Some(run);

                let task = WorkerTask {
                    inner: self.inner.clone(),
                    processor: self.processor.clone(),
                    sink: self.sink.clone(),
                    translator,
                    files: request.files,
                    source_lang: request.source_lang,
                    target_lang: request.target_lang,
                    max_workers: request.max_workers,
                    cleanup: request.cleanup,
                    cancel,
                };
                inner.worker = Some(tokio::spawn(task.run()));
                Ok(())
            }
            Err(e) => {
                let mut run = BatchRun::new(&request.files, RunState::Completed);
                run.finished_at = Some(Local::now());
                inner.run = Some(run);
                drop(inner);

                self.sink
                    .on_log(&format!("Translation batch not started: {}", e));
                Ok(())
            }
        }
    }

    /// Request cooperative cancellation of the running batch.
    ///
    /// The flag is observed between files; the file in flight is allowed to
    /// finish. Returns whether a running batch was signalled.
    pub fn cancel(&self) -> bool {
        let inner = self.inner.lock();
        match inner.run.as_ref() {
            Some(run) if run.state == RunState::Running => {
                run.cancel.store(true, Ordering::SeqCst);
                true
            }
            _ => false,
        }
    }

    /// Current lifecycle state, `Idle` before the first batch
    pub fn state(&self) -> RunState {
        self.inner
            .lock()
            .run
            .as_ref()
            .map_or(RunState::Idle, |run| run.state)
    }

    /// Read-only view of the current or most recent batch
    pub fn snapshot(&self) -> Option<BatchSnapshot> {
        self.inner.lock().run.as_ref().map(BatchRun::snapshot)
    }

    /// Wait for the background worker to finish its current batch
    pub async fn join(&self) {
        let handle = self.inner.lock().worker.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Translation worker task failed: {}", e);
            }
        }
    }
}

/// Clamped percentage for progress reporting
fn percentage(current: usize, total: usize) -> f32 {
    if total == 0 {
        return 100.0;
    }
    ((current as f32 / total as f32) * 100.0).clamp(0.0, 100.0)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// State moved onto the background worker for one batch
struct WorkerTask {
    inner: Arc<Mutex<Inner>>,
    processor: Arc<dyn DocumentProcessor>,
    sink: Arc<dyn EventSink>,
    translator: BoundTranslator,
    files: Vec<PathBuf>,
    source_lang: String,
    target_lang: String,
    max_workers: usize,
    cleanup: bool,
    cancel: Arc<AtomicBool>,
}

impl WorkerTask {
    async fn run(self) {
        let total = self.files.len();
        self.sink.on_log(&format!(
            "Starting translation of {} file(s) with {} ({})",
            total,
            self.translator.id().display_name(),
            self.translator.model()
        ));

        for (index, file) in self.files.iter().enumerate() {
            // Cancellation is observed between files only
            if self.cancel.load(Ordering::SeqCst) {
                self.finish_cancelled(index, total);
                return;
            }

            let name = file_label(file);
            self.set_job(index, JobStatus::Running, None, None);
            self.report_progress(
                percentage(index, total),
                &format!("Translating: {}", name),
                index,
                total,
            );

            match self
                .processor
                .process_file(
                    file,
                    &self.translator,
                    &self.source_lang,
                    &self.target_lang,
                    self.max_workers,
                    self.cleanup,
                )
                .await
            {
                Ok(output) if output.exists() => {
                    self.set_job(index, JobStatus::Succeeded, None, Some(output.clone()));
                    self.sink.on_log(&format!("Done: {}", name));
                    self.sink.on_log(&format!("  Output: {}", output.display()));
                }
                Ok(output) => {
                    let error = ProcessingError::MissingOutput(output.display().to_string());
                    self.set_job(index, JobStatus::Failed, Some(error.to_string()), None);
                    self.sink.on_log(&format!("Failed: {} - {}", name, error));
                }
                Err(e) => {
                    self.set_job(index, JobStatus::Failed, Some(e.to_string()), None);
                    self.sink.on_log(&format!("Failed: {} - {}", name, e));
                }
            }

            // The "done" step is reported whether the file succeeded or not
            self.report_progress(
                percentage(index + 1, total),
                &format!("Done: {}", name),
                index + 1,
                total,
            );
        }

        self.report_progress(100.0, "Translation complete", total, total);

        let (succeeded, failed) = self.outcome_counts();
        self.finish(RunState::Completed);
        self.sink.on_log(&format!(
            "Translation batch complete: {} succeeded, {} failed",
            succeeded, failed
        ));
    }

    fn set_job(
        &self,
        index: usize,
        status: JobStatus,
        error: Option<String>,
        output_path: Option<PathBuf>,
    ) {
        let mut inner = self.inner.lock();
        if let Some(run) = inner.run.as_mut() {
            if let Some(job) = run.jobs.get_mut(index) {
                job.status = status;
                job.error = error;
                job.output_path = output_path;
            }
        }
    }

    fn report_progress(&self, percent: f32, status: &str, current: usize, total: usize) {
        {
            let mut inner = self.inner.lock();
            if let Some(run) = inner.run.as_mut() {
                run.progress_percent = percent;
            }
        }
        self.sink.on_progress(percent, status, current, total);
    }

    fn outcome_counts(&self) -> (usize, usize) {
        let inner = self.inner.lock();
        match inner.run.as_ref() {
            Some(run) => {
                let succeeded = run
                    .jobs
                    .iter()
                    .filter(|job| job.status == JobStatus::Succeeded)
                    .count();
                let failed = run
                    .jobs
                    .iter()
                    .filter(|job| job.status == JobStatus::Failed)
                    .count();
                (succeeded, failed)
            }
            None => (0, 0),
        }
    }

    fn finish(&self, state: RunState) {
        let mut inner = self.inner.lock();
        if let Some(run) = inner.run.as_mut() {
            run.state = state;
            run.finished_at = Some(Local::now());
        }
    }

    fn finish_cancelled(&self, from_index: usize, total: usize) {
        {
            let mut inner = self.inner.lock();
            if let Some(run) = inner.run.as_mut() {
                for job in run.jobs.iter_mut().skip(from_index) {
                    job.status = JobStatus::Cancelled;
                }
                run.state = RunState::Cancelled;
                run.finished_at = Some(Local::now());
            }
        }
        self.sink.on_log(&format!(
            "Translation batch cancelled: {} of {} file(s) not processed",
            total - from_index,
            total
        ));
    }
}
