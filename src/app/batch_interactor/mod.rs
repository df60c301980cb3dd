// Batch interactor - Runs one operation over a queue of inputs

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::domain::model::{
    ArchiveMode, AudioFormat, BatchReport, BatchState, MediaAsset, Operation, OperationResult,
    PipelineStage, SizingStrategy,
};
use crate::domain::rules::SizingRules;
use crate::engine::progress::Reporter;
use crate::engine::{CutMode, CutRequest, TransformInvoker};
use crate::error::{SplitXError, SplitXResult};
use crate::output::{ArchiveStage, NamingResolver};
use crate::planner::SplitPlanner;
use crate::utils::path::{output_base, split_output_dir};

/// File name a merge writes when no output is given
pub const DEFAULT_MERGE_NAME: &str = "merged.mp4";

/// One batch: an ordered queue of inputs and the operation applied to each
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    pub inputs: Vec<PathBuf>,
    pub operation: Operation,
    /// Custom output directory; each input's own directory when `None`
    pub output_dir: Option<PathBuf>,
}

impl BatchRequest {
    pub fn new(inputs: Vec<PathBuf>, operation: Operation) -> Self {
        Self {
            inputs,
            operation,
            output_dir: None,
        }
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }
}

/// Split parameters after they leave `Operation`
struct SplitJob<'a> {
    strategy: SizingStrategy,
    archive: ArchiveMode,
    cleanup: bool,
    precise: bool,
    naming: &'a NamingResolver,
}

/// Batch interactor.
///
/// Processes inputs strictly one after another. A failing input is logged
/// and recorded; the rest of the queue still runs.
pub struct BatchInteractor {
    invoker: TransformInvoker,
    planner: SplitPlanner,
    archiver: ArchiveStage,
    state: Mutex<BatchState>,
}

impl BatchInteractor {
    pub fn new(invoker: TransformInvoker) -> Self {
        Self {
            invoker,
            planner: SplitPlanner::new(),
            archiver: ArchiveStage::new(),
            state: Mutex::new(BatchState::Idle),
        }
    }

    /// Current batch state
    pub fn state(&self) -> BatchState {
        self.state.lock().map(|s| *s).unwrap_or_default()
    }

    fn set_state(&self, state: BatchState) {
        if let Ok(mut current) = self.state.lock() {
            *current = state;
        }
    }

    /// Run the whole queue and report every outcome.
    ///
    /// Never fails as a whole: per-input errors land in the report.
    pub async fn run(&self, request: BatchRequest, reporter: &Reporter) -> BatchReport {
        let started = Instant::now();
        self.set_state(BatchState::Running);
        info!(
            "Starting {} batch with {} input(s)",
            request.operation.name(),
            request.inputs.len()
        );

        let results = match &request.operation {
            Operation::Merge { output } => {
                vec![self.run_merge(&request.inputs, output.as_deref(), reporter).await]
            }
            operation => self.run_each(&request, operation, reporter).await,
        };

        let report = BatchReport {
            operation: request.operation.name().to_string(),
            state: BatchState::Idle,
            progress: 1.0,
            results,
        };

        reporter.progress(1.0);
        reporter.log(format!(
            "Batch complete: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        ));
        info!(
            "Batch finished in {:.2}s ({} ok, {} failed)",
            started.elapsed().as_secs_f64(),
            report.succeeded(),
            report.failed()
        );
        self.set_state(BatchState::Idle);
        report
    }

    async fn run_each(
        &self,
        request: &BatchRequest,
        operation: &Operation,
        reporter: &Reporter,
    ) -> Vec<OperationResult> {
        let total = request.inputs.len();
        let naming = match operation {
            Operation::Split { naming_pattern, .. } => NamingResolver::new(naming_pattern.clone()),
            _ => NamingResolver::default(),
        };

        let mut results = Vec::with_capacity(total);
        for (i, input) in request.inputs.iter().enumerate() {
            let label = display_name(input);
            reporter.begin_unit();
            reporter.log(format!("Processing {}/{}: {}", i + 1, total, label));

            let mut outputs = Vec::new();
            let outcome = self
                .run_one(
                    input,
                    operation,
                    &naming,
                    request.output_dir.as_deref(),
                    reporter,
                    &mut outputs,
                )
                .await;

            let result = match outcome {
                Ok(()) => {
                    reporter.log(format!("Done: {}", label));
                    OperationResult::succeeded(input, outputs)
                }
                Err(e) => {
                    error!(kind = e.kind(), "{} failed on {}: {}", operation.name(), input.display(), e);
                    reporter.log(format!("Failed: {} ({})", label, e.detail()));
                    OperationResult::failed(input, outputs, &e)
                }
            };
            results.push(result);
        }
        results
    }

    async fn run_one(
        &self,
        input: &Path,
        operation: &Operation,
        naming: &NamingResolver,
        output_dir: Option<&Path>,
        reporter: &Reporter,
        outputs: &mut Vec<PathBuf>,
    ) -> SplitXResult<()> {
        match operation {
            Operation::Split {
                strategy,
                archive,
                cleanup,
                precise,
                ..
            } => {
                let job = SplitJob {
                    strategy: *strategy,
                    archive: *archive,
                    cleanup: *cleanup,
                    precise: *precise,
                    naming,
                };
                self.split(input, &job, output_dir, reporter, outputs).await
            }
            Operation::Trim {
                start,
                end,
                precise,
            } => {
                let asset = MediaAsset::open(input)?;
                let dir = output_base(&asset.path, output_dir);
                let output = self
                    .invoker
                    .trim(&asset, *start, *end, *precise, &dir, reporter)
                    .await?;
                outputs.push(output);
                Ok(())
            }
            Operation::ExtractAudio { format } => {
                let output = self.extract(input, *format, output_dir, reporter).await?;
                outputs.push(output);
                Ok(())
            }
            Operation::Merge { .. } => Err(SplitXError::validation(
                "Merge runs over the whole queue, not per input",
            )),
        }
    }

    /// Probe, plan, cut every segment, then archive and clean up
    async fn split(
        &self,
        input: &Path,
        job: &SplitJob<'_>,
        output_dir: Option<&Path>,
        reporter: &Reporter,
        outputs: &mut Vec<PathBuf>,
    ) -> SplitXResult<()> {
        SizingRules::validate(&job.strategy)?;
        let asset = MediaAsset::open(input)?;
        let dir = split_output_dir(&asset.path, &asset.stem, output_dir);
        std::fs::create_dir_all(&dir)?;
        reporter.log(format!("Output directory: {}", dir.display()));

        debug!(stage = ?PipelineStage::Probing, "{}", asset.path.display());
        reporter.log(format!("Reading metadata: {}...", asset.file_name()));
        let duration = self.invoker.probe().probe(&asset.path).await?;
        let asset = asset.with_duration(duration);

        debug!(stage = ?PipelineStage::Planning, strategy = %job.strategy);
        let plan = self.planner.plan_asset(&asset, &job.strategy)?;
        for line in plan.describe() {
            reporter.log(line);
        }

        let mode = CutMode::from_precise(job.precise);
        let total = plan.total_parts();
        let mut warned = false;
        let mut parts = Vec::with_capacity(total);

        for segment in plan.iter() {
            debug!(stage = ?PipelineStage::Naming, part = segment.index);
            let name = job.naming.resolve(&asset.stem, segment.index, &asset.extension);
            if let Some(warning) = name.warning() {
                if !warned {
                    reporter.warn(warning);
                    warned = true;
                }
            }

            debug!(stage = ?PipelineStage::Transforming, part = segment.index);
            if mode == CutMode::Reencode {
                reporter.log(format!(
                    "  > Re-encoding part {} (Precise Mode)...",
                    segment.index
                ));
            }
            let output = dir.join(name.filename());
            self.invoker
                .cut(&CutRequest {
                    input: asset.path.clone(),
                    output: output.clone(),
                    start: segment.start,
                    end: segment.end,
                    mode,
                })
                .await?;

            outputs.push(output.clone());
            parts.push(output);
            reporter.progress(segment.index as f64 / total as f64);
            reporter.log(format!("  > Created: {}", name.filename()));
        }

        if job.archive != ArchiveMode::None {
            debug!(stage = ?PipelineStage::Archiving, mode = %job.archive);
            let archiver = self.archiver;
            let files = parts.clone();
            let mode = job.archive;
            let stem = asset.stem.clone();
            let archive_dir = dir.clone();
            let archive_reporter = reporter.clone();
            let archives = tokio::task::spawn_blocking(move || {
                archiver.archive(&files, mode, &stem, &archive_dir, &archive_reporter)
            })
            .await
            .map_err(|e| SplitXError::Archive {
                message: format!("Archive task failed: {}", e),
            })??;
            outputs.extend(archives);
        }

        if job.cleanup {
            debug!(stage = ?PipelineStage::Cleanup);
            let removed = self.archiver.cleanup(&parts, job.archive, true, reporter);
            outputs.retain(|o| !removed.contains(o));
        } else if job.archive == ArchiveMode::None {
            debug!("No archive requested; raw parts kept");
        }

        Ok(())
    }

    async fn extract(
        &self,
        input: &Path,
        format: AudioFormat,
        output_dir: Option<&Path>,
        reporter: &Reporter,
    ) -> SplitXResult<PathBuf> {
        let asset = MediaAsset::open(input)?;
        let dir = output_base(&asset.path, output_dir);
        self.invoker.extract_audio(&asset, format, &dir, reporter).await
    }

    /// Merge consumes the whole queue and yields a single result keyed by
    /// the output path
    async fn run_merge(
        &self,
        inputs: &[PathBuf],
        output: Option<&Path>,
        reporter: &Reporter,
    ) -> OperationResult {
        reporter.begin_unit();
        let output = match output {
            Some(path) => path.to_path_buf(),
            None => inputs
                .first()
                .map(|first| output_base(first, None).join(DEFAULT_MERGE_NAME))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MERGE_NAME)),
        };
        let label = display_name(&output);
        reporter.log(format!("Processing 1/1: {}", label));

        match self.invoker.merge(inputs, &output, reporter).await {
            Ok(written) => {
                reporter.log(format!("Done: {}", label));
                OperationResult::succeeded(written.clone(), vec![written])
            }
            Err(e) => {
                warn!(kind = e.kind(), "Merge into {} failed: {}", output.display(), e);
                reporter.log(format!("Failed: {} ({})", label, e.detail()));
                OperationResult::failed(output, Vec::new(), &e)
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
