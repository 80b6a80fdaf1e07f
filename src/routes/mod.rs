pub mod account;
pub mod chat;
pub mod document;
pub mod health_checks;

pub use health_checks::*;
