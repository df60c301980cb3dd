//! Output naming and packaging

pub mod archive;
pub mod naming;

pub use archive::ArchiveStage;
pub use naming::{NamingOutcome, NamingResolver, DEFAULT_PATTERN};
