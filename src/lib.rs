//! SplitX Library
//!
//! Batch video splitting, trimming, merging and audio extraction over an
//! external FFmpeg binary, with size/duration/count split planning, output
//! naming templates and zip packaging of the results.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use app::{BatchInteractor, BatchRequest};
pub use domain::model::{
    ArchiveMode, AudioFormat, BatchReport, BatchState, MediaAsset, Operation, OperationResult,
    SizingStrategy, SplitPlan,
};
pub use engine::progress::{BatchEvent, ChannelSink, LogSink, MemorySink, ProgressSink, Reporter};
pub use error::{SplitXError, SplitXResult};
pub use ports::{TranscodeOutput, TranscoderPort};
