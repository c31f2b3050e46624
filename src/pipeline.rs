//! Per-document processing and batch orchestration.
//!
//! Each document runs layout extraction, heading classification, outline
//! building and section segmentation independently. A batch fans documents
//! out over the rayon pool (or one thread per document when a timeout is
//! set) and joins the results in submission order; the
//! cross-document ranking step runs only after that join.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};

use rayon::prelude::*;

use crate::classify::{ClassifierOptions, HeadingClassifier, PatternRegistry, DEFAULT_LANGUAGE};
use crate::error::{Error, Result};
use crate::model::{LayoutDocument, Outline, Section, TextSpan};
use crate::outline::{build_outline, segment};
use crate::parser::{ExtractOptions, LayoutExtractor, LopdfDecoder};
use crate::render::{outline_file_name, outline_to_json, write_output, JsonFormat};

/// Options for the per-document pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Active pattern language (falls back to English when unknown)
    pub language: String,
    /// Layout extraction options
    pub extract: ExtractOptions,
    /// Heading classifier options
    pub classifier: ClassifierOptions,
    /// Per-document processing budget
    pub timeout: Option<Duration>,
    /// Process documents in parallel
    pub parallel: bool,
}

impl PipelineOptions {
    /// Create new pipeline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pattern language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set layout extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract = options;
        self
    }

    /// Set classifier options.
    pub fn with_classifier_options(mut self, options: ClassifierOptions) -> Self {
        self.classifier = options;
        self
    }

    /// Set the per-document timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Process documents one at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            extract: ExtractOptions::default(),
            classifier: ClassifierOptions::default(),
            timeout: None,
            parallel: true,
        }
    }
}

/// Everything derived from one document.
#[derive(Debug, Clone)]
pub struct DocumentAnalysis {
    /// Document identifier
    pub id: String,
    /// Position in the batch's submission order
    pub order: usize,
    /// Extracted text blocks
    pub layout: LayoutDocument,
    /// Title and headings
    pub outline: Outline,
    /// Sections covering the whole body text
    pub sections: Vec<Section>,
}

/// A document left out of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    /// Document identifier
    pub id: String,
    /// Human-readable reason
    pub reason: String,
}

/// Result of processing a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Successfully processed documents, in submission order
    pub documents: Vec<DocumentAnalysis>,
    /// Documents that failed, in submission order
    pub skipped: Vec<SkippedDocument>,
}

impl BatchOutcome {
    /// All sections of all processed documents, in submission order.
    pub fn sections(&self) -> Vec<Section> {
        self.documents
            .iter()
            .flat_map(|d| d.sections.iter().cloned())
            .collect()
    }

    /// Identifiers of the processed documents.
    pub fn document_ids(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.id.clone()).collect()
    }

    /// Write one outline file per processed document into `dir`.
    ///
    /// A file that cannot be written is recorded in `skipped` and does not
    /// stop its siblings. Returns `(document id, file name)` for each file
    /// written.
    pub fn write_outlines(
        &mut self,
        dir: &Path,
        format: JsonFormat,
    ) -> Result<Vec<(String, String)>> {
        let mut written = Vec::with_capacity(self.documents.len());
        for analysis in &self.documents {
            let name = outline_file_name(&analysis.id);
            let json = outline_to_json(&analysis.outline, format)?;
            match write_output(&dir.join(&name), &json) {
                Ok(()) => written.push((analysis.id.clone(), name)),
                Err(e) if e.is_document_level() => {
                    log::warn!("outline for {} not written: {}", analysis.id, e);
                    self.skipped.push(SkippedDocument {
                        id: analysis.id.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(written)
    }
}

/// Document pipeline bound to a shared, immutable pattern registry.
#[derive(Debug, Clone)]
pub struct Pipeline {
    options: PipelineOptions,
    registry: Arc<PatternRegistry>,
}

impl Pipeline {
    /// Create a pipeline.
    pub fn new(registry: PatternRegistry, options: PipelineOptions) -> Self {
        Self {
            options,
            registry: Arc::new(registry),
        }
    }

    /// Create a pipeline using the bundled language patterns.
    pub fn with_builtin_patterns(options: PipelineOptions) -> Result<Self> {
        Ok(Self::new(PatternRegistry::builtin()?, options))
    }

    /// Pipeline options in effect.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Pattern registry in use.
    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    /// Classify, outline and segment an extracted document.
    pub fn analyze(&self, layout: LayoutDocument, order: usize) -> DocumentAnalysis {
        let classifier = HeadingClassifier::new(&self.registry, self.options.classifier.clone());
        let classification = classifier.classify(&layout, &self.options.language);
        let outline = build_outline(&layout, &classification);
        let sections = segment(&layout, &outline, order);

        DocumentAnalysis {
            id: layout.id.clone(),
            order,
            layout,
            outline,
            sections,
        }
    }

    /// Process pre-decoded spans.
    pub fn process_spans(
        &self,
        id: &str,
        page_count: u32,
        spans: Vec<TextSpan>,
        order: usize,
    ) -> DocumentAnalysis {
        let extractor = LayoutExtractor::new(self.options.extract.clone());
        self.analyze(extractor.build_document(id, page_count, spans), order)
    }

    /// Process a PDF held in memory.
    ///
    /// Decoder failures are reported as [`Error::DocumentUnreadable`].
    pub fn process_bytes(&self, id: &str, data: &[u8], order: usize) -> Result<DocumentAnalysis> {
        let extractor = LayoutExtractor::new(self.options.extract.clone());
        let layout = LopdfDecoder::load_bytes(data)
            .and_then(|decoder| extractor.extract(id, &decoder))
            .map_err(|e| Error::unreadable(id, e))?;
        Ok(self.analyze(layout, order))
    }

    /// Process a PDF file; the document id is its file name.
    pub fn process_file<P: AsRef<Path>>(&self, path: P, order: usize) -> Result<DocumentAnalysis> {
        let path = path.as_ref();
        let id = document_id(path);
        let data = std::fs::read(path).map_err(|e| Error::unreadable(&id, e.into()))?;
        self.process_bytes(&id, &data, order)
    }

    /// Process every file, isolating per-document failures.
    ///
    /// Documents exceeding the configured timeout are skipped; their worker
    /// thread is abandoned rather than cancelled.
    pub fn process_batch(&self, paths: &[PathBuf]) -> BatchOutcome {
        let results: Vec<(String, Result<DocumentAnalysis>)> = match self.options.timeout {
            Some(limit) => self.run_timed(paths, limit),
            None => {
                let run = |(order, path): (usize, &PathBuf)| {
                    (document_id(path), self.process_file(path, order))
                };
                if self.options.parallel {
                    paths.par_iter().enumerate().map(run).collect()
                } else {
                    paths.iter().enumerate().map(run).collect()
                }
            }
        };

        let mut outcome = BatchOutcome::default();
        for (id, result) in results {
            match result {
                Ok(analysis) => outcome.documents.push(analysis),
                Err(e) => {
                    log::warn!("skipping {}: {}", id, e);
                    outcome.skipped.push(SkippedDocument {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::info!(
            "processed {} documents, skipped {}",
            outcome.documents.len(),
            outcome.skipped.len()
        );
        outcome
    }

    /// Timed batch. Each document gets its own thread and the caller does the
    /// waiting, so no rayon worker is parked while the decoder needs the pool.
    fn run_timed(
        &self,
        paths: &[PathBuf],
        limit: Duration,
    ) -> Vec<(String, Result<DocumentAnalysis>)> {
        let start = |order: usize, path: &PathBuf| {
            let pipeline = self.clone();
            let owned = path.clone();
            let deadline = Instant::now() + limit;
            let rx = spawn_task(move || pipeline.process_file(&owned, order));
            (document_id(path), deadline, rx)
        };

        if !self.options.parallel {
            return paths
                .iter()
                .enumerate()
                .map(|(order, path)| {
                    let (id, deadline, rx) = start(order, path);
                    let result = await_task(&id, limit, deadline, &rx);
                    (id, result)
                })
                .collect();
        }

        let pending: Vec<_> = paths
            .iter()
            .enumerate()
            .map(|(order, path)| start(order, path))
            .collect();
        pending
            .into_iter()
            .map(|(id, deadline, rx)| {
                let result = await_task(&id, limit, deadline, &rx);
                (id, result)
            })
            .collect()
    }
}

/// Run `task` on its own thread, giving up after `limit`.
pub fn run_with_timeout<T, F>(id: &str, limit: Duration, task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let deadline = Instant::now() + limit;
    let rx = spawn_task(task);
    await_task(id, limit, deadline, &rx)
}

fn spawn_task<T, F>(task: F) -> Receiver<Result<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let _ = tx.send(task());
    });
    rx
}

fn await_task<T>(
    id: &str,
    limit: Duration,
    deadline: Instant,
    rx: &Receiver<Result<T>>,
) -> Result<T> {
    match rx.recv_deadline(deadline) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(Error::Timeout {
            document: id.to_string(),
            secs: limit.as_secs(),
        }),
        Err(RecvTimeoutError::Disconnected) => Err(Error::DocumentUnreadable {
            document: id.to_string(),
            reason: "worker thread terminated unexpectedly".to_string(),
        }),
    }
}

/// Document identifier for a path: its file name.
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// PDF files directly inside `dir`, sorted by file name.
pub fn collect_pdfs<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::Config(format!(
            "input directory not found: {}",
            dir.display()
        )));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort_by_key(|p| document_id(p));
    Ok(files)
}
