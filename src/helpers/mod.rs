pub(crate) mod json;
pub mod jwt;
mod mq_manager;
pub mod password;

pub use json::*;
pub use mq_manager::{MqError, MqManager};
