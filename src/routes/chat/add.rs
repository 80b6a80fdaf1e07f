use crate::errors::ApiError;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::IngestionPipeline;
use actix_web::{post, web, HttpResponse, Result};

#[tracing::instrument(name = "Create chat.", skip(pipeline))]
#[post("")]
pub async fn add(
    principal: models::Principal,
    pipeline: web::Data<IngestionPipeline>,
) -> Result<HttpResponse, ApiError> {
    let chat = pipeline.create_chat(&principal).await?;
    Ok(JsonResponse::build()
        .set_id(chat.id)
        .set_item(chat)
        .created("Chat created"))
}
