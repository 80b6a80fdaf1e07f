use crate::models::Sender;
use serde::Deserialize;
use serde_valid::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct MessageForm {
    pub sender: Sender,
    #[validate(max_length = 65536)]
    #[validate(pattern = r"^[^\x00]*$")]
    pub text: String,
}
