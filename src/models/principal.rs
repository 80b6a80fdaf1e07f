use serde::Serialize;

/// The authenticated account behind a request, recovered from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub account_id: i32,
    pub username: String,
}
