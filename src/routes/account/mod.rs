mod add;
mod get;
mod login;

pub use add::*;
pub use get::*;
pub use login::*;
