use actix_web::{get, HttpResponse};

#[get("")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("OK")
}
