use crate::errors::ApiError;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::IngestionPipeline;
use actix_web::{post, web, web::Bytes, Responder, Result};

/// Appends a message and hands the updated log to the assistant worker.
#[tracing::instrument(name = "Post chat message.", skip(body, pipeline))]
#[post("/{id}/messages")]
pub async fn add(
    principal: models::Principal,
    path: web::Path<(i32,)>,
    body: Bytes,
    pipeline: web::Data<IngestionPipeline>,
) -> Result<impl Responder, ApiError> {
    let id = path.0;
    let form: forms::MessageForm = forms::from_json_body(&body)?;

    let chat = pipeline
        .post_message(&principal, id, form.sender, &form.text)
        .await?;
    Ok(JsonResponse::build().set_id(chat.id).set_item(chat).ok("Message added"))
}
