//! Mutations that have to be announced to a downstream worker.
//!
//! Every operation on an existing resource passes the ownership guard first. Publishing
//! happens after the write is durable and only waits for the transport, not for the
//! broker acknowledgement.

use crate::connectors::{BlobError, BlobStorage, EventPublisher, PublishError};
use crate::db::{self, StoreError};
use crate::extract::ExtractorRegistry;
use crate::models::{self, ChatAssistantEvent, DocumentIndexingEvent, Principal, Sender};
use crate::services::ownership::{self, ResourceKind};
use actix_web::web::Bytes;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("principal may not act on this resource")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error("extraction task: {0}")]
    Extraction(#[from] tokio::task::JoinError),
}

pub struct IngestionPipeline {
    pool: PgPool,
    blob_store: Arc<dyn BlobStorage>,
    extractors: Arc<ExtractorRegistry>,
    publisher: Arc<dyn EventPublisher>,
}

impl IngestionPipeline {
    pub fn new(
        pool: PgPool,
        blob_store: Arc<dyn BlobStorage>,
        extractors: Arc<ExtractorRegistry>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            pool,
            blob_store,
            extractors,
            publisher,
        }
    }

    async fn guard(
        &self,
        principal: &Principal,
        kind: ResourceKind,
        id: i32,
    ) -> Result<(), PipelineError> {
        match ownership::authorize(&self.pool, principal, kind, id).await? {
            true => Ok(()),
            false => Err(PipelineError::Forbidden),
        }
    }

    /// Upload, extract, persist, announce. Extraction failures only cost the text.
    #[tracing::instrument(name = "Ingest document", skip(self, principal, bytes), fields(account_id = principal.account_id, size = bytes.len()))]
    pub async fn create_document(
        &self,
        principal: &Principal,
        file_name: String,
        bytes: Bytes,
    ) -> Result<models::Document, PipelineError> {
        let reference = self.blob_store.upload(&file_name, &bytes).await?;

        let extractors = self.extractors.clone();
        let name = file_name.clone();
        let extracted =
            tokio::task::spawn_blocking(move || extractors.extract_file(&bytes, &name)).await?;
        let text = match extracted {
            // Postgres text columns cannot hold U+0000
            Ok(text) if text.contains('\0') => {
                tracing::error!("text extracted from {} contains NUL bytes, dropped", file_name);
                None
            }
            Ok(text) => Some(text),
            Err(err) if err.is_unsupported() => {
                tracing::warn!("no text extracted from {}: {}", file_name, err);
                None
            }
            Err(err) => {
                tracing::error!("text extraction from {} failed: {}", file_name, err);
                None
            }
        };

        let document =
            models::Document::new(principal.account_id, file_name, text, Some(reference.clone()));
        let document = db::document::insert(&self.pool, document)
            .await
            .map_err(|err| {
                tracing::error!(
                    "document row not saved, blob {} is orphaned: {:?}",
                    reference,
                    err
                );
                err
            })?;

        self.publisher
            .publish(
                DocumentIndexingEvent {
                    document_id: document.id,
                    document_text: document.text.clone().unwrap_or_default(),
                }
                .into(),
            )
            .await?;

        Ok(document)
    }

    /// The row is authoritative. The blob is released best effort afterwards.
    #[tracing::instrument(name = "Delete document", skip(self, principal), fields(account_id = principal.account_id))]
    pub async fn delete_document(
        &self,
        principal: &Principal,
        document_id: i32,
    ) -> Result<(), PipelineError> {
        self.guard(principal, ResourceKind::Document, document_id)
            .await?;

        let document = db::document::fetch(&self.pool, document_id)
            .await?
            .ok_or(PipelineError::Forbidden)?;
        if !db::document::delete(&self.pool, document_id).await? {
            return Err(PipelineError::Forbidden);
        }

        if let Some(reference) = document.file_path.as_deref() {
            if let Err(err) = self.blob_store.delete(reference).await {
                tracing::error!("releasing blob {} of document {}: {}", reference, document_id, err);
            }
        }

        Ok(())
    }

    #[tracing::instrument(name = "Create chat", skip(self, principal), fields(account_id = principal.account_id))]
    pub async fn create_chat(&self, principal: &Principal) -> Result<models::Chat, PipelineError> {
        Ok(db::chat::create(&self.pool, principal.account_id).await?)
    }

    #[tracing::instrument(name = "Delete chat", skip(self, principal), fields(account_id = principal.account_id))]
    pub async fn delete_chat(&self, principal: &Principal, chat_id: i32) -> Result<(), PipelineError> {
        self.guard(principal, ResourceKind::Chat, chat_id).await?;
        Ok(db::chat::delete(&self.pool, chat_id).await?)
    }

    /// Appends to the chat log and hands the whole updated log to the assistant worker.
    #[tracing::instrument(name = "Post chat message", skip(self, principal, text), fields(account_id = principal.account_id))]
    pub async fn post_message(
        &self,
        principal: &Principal,
        chat_id: i32,
        sender: Sender,
        text: &str,
    ) -> Result<models::Chat, PipelineError> {
        self.guard(principal, ResourceKind::Chat, chat_id).await?;

        let mut chat = db::chat::append_message(&self.pool, chat_id, sender, text).await?;
        if sender != Sender::User {
            db::chat::mark_as_unread(&self.pool, chat_id).await?;
            chat.unread = true;
        }

        self.publisher
            .publish(
                ChatAssistantEvent {
                    chat_id,
                    messages: chat.messages.clone(),
                }
                .into(),
            )
            .await?;

        Ok(chat)
    }
}
