pub mod cookie;
pub mod middleware;
pub mod session;
pub mod tracing;
mod status;
mod validate;
pub use status::ErrorStatus;
pub use validate::{InvalidIdError, parse_id};
