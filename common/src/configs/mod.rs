mod backend_config;
mod log_config;
mod server_config;
mod table_config;

pub use backend_config::*;
pub use log_config::*;
pub use server_config::*;
pub use table_config::*;
