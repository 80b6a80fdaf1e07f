pub mod account;
pub mod chat;
pub mod pagination;

pub use account::{LoginForm, SignupForm, TokenView};
pub use chat::MessageForm;
pub use pagination::Pagination;

use crate::errors::ApiError;
use serde::de::DeserializeOwned;
use serde_valid::Validate;

/// Deserializes a JSON body, reporting the failing field path, then runs the form's
/// validation rules.
pub fn from_json_body<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let deserializer = &mut serde_json::Deserializer::from_slice(body);
    let form: T = serde_path_to_error::deserialize(deserializer).map_err(|err| {
        ApiError::bad_request(format!("{}: {}", err.path(), err.inner()))
    })?;

    form.validate().map_err(|errors| {
        tracing::debug!("Invalid data received {}", errors);
        ApiError::bad_request(errors.to_string())
    })?;

    Ok(form)
}
