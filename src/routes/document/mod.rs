pub mod add;
pub mod delete;
