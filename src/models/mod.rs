mod account;
mod chat;
mod document;
mod event;
mod principal;

pub use account::*;
pub use chat::*;
pub use document::*;
pub use event::*;
pub use principal::*;
