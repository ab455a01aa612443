pub mod config;
pub mod connect;
pub mod error;
pub mod migration;

pub use config::PGConfig;
pub use connect::connect;
pub use error::DBError;
