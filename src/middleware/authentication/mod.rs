mod getheader;
mod manager;
mod manager_middleware;
mod method;
mod principal;

pub use getheader::*;
pub use manager::*;
pub use manager_middleware::*;
