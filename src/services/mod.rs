pub mod ingestion;
pub mod ownership;

pub use ingestion::{IngestionPipeline, PipelineError};
pub use ownership::{authorize, ResourceKind};
