use actix_web::{web, HttpResponse};
use serde::Serialize;

/// Envelope shared by every response body.
#[derive(Debug, Serialize)]
pub struct JsonResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<T>>,
}

#[derive(Debug)]
pub struct JsonResponseBuilder<T>
where
    T: Serialize,
{
    message: String,
    id: Option<i32>,
    item: Option<T>,
    list: Option<Vec<T>>,
}

impl<T> Default for JsonResponseBuilder<T>
where
    T: Serialize,
{
    fn default() -> Self {
        Self {
            message: String::new(),
            id: None,
            item: None,
            list: None,
        }
    }
}

impl<T> JsonResponseBuilder<T>
where
    T: Serialize,
{
    pub fn set_msg<I: Into<String>>(mut self, msg: I) -> Self {
        self.message = msg.into();
        self
    }

    pub fn set_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub fn set_list(mut self, list: Vec<T>) -> Self {
        self.list = Some(list);
        self
    }

    pub fn to_json_response(self) -> JsonResponse<T> {
        JsonResponse {
            message: self.message,
            id: self.id,
            item: self.item,
            list: self.list,
        }
    }

    pub fn ok<I: Into<String>>(self, msg: I) -> web::Json<JsonResponse<T>> {
        web::Json(self.set_msg(msg).to_json_response())
    }

    pub fn created<I: Into<String>>(self, msg: I) -> HttpResponse {
        HttpResponse::Created().json(self.set_msg(msg).to_json_response())
    }
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    pub fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder::default()
    }
}
