//! Adapters for the services outside the process: the message broker and blob storage.
//!
//! Each concern is a trait so the pipeline holds `Arc<dyn ...>` and tests can substitute
//! in-memory implementations.

pub mod blob_store;
pub mod notifier;

pub use blob_store::{BlobError, BlobStorage, LocalBlobStorage};
pub use notifier::{AmqpPublisher, EventPublisher, PublishError};
