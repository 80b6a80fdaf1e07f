use crate::errors::ApiError;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::IngestionPipeline;
use actix_web::{delete, web, Responder, Result};

#[tracing::instrument(name = "Delete document.", skip(pipeline))]
#[delete("/{id}")]
pub async fn item(
    principal: models::Principal,
    path: web::Path<(i32,)>,
    pipeline: web::Data<IngestionPipeline>,
) -> Result<impl Responder, ApiError> {
    let id = path.0;
    pipeline.delete_document(&principal, id).await?;
    Ok(JsonResponse::<()>::build().set_id(id).ok("Document deleted"))
}
