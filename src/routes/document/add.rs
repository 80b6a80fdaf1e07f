use crate::errors::ApiError;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::IngestionPipeline;
use actix_web::{post, web, web::Bytes, HttpResponse, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub name: String,
}

/// The request body is the file itself; `name` carries the file name and its extension
/// selects the text extractor.
#[tracing::instrument(name = "Upload document.", skip(body, pipeline), fields(size = body.len()))]
#[post("")]
pub async fn add(
    principal: models::Principal,
    query: web::Query<UploadQuery>,
    body: Bytes,
    pipeline: web::Data<IngestionPipeline>,
) -> Result<HttpResponse, ApiError> {
    let name = query.into_inner().name;
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("name: must not be empty"));
    }
    if name.contains('\0') {
        return Err(ApiError::bad_request("name: must not contain NUL characters"));
    }

    let document = pipeline.create_document(&principal, name, body).await?;
    Ok(JsonResponse::build()
        .set_id(document.id)
        .set_item(document)
        .created("Document uploaded"))
}
