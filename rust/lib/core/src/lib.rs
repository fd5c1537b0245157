pub mod auth;
pub mod config;
pub mod error;
pub mod module;
pub mod types;

pub use auth::{bearer_token, Authenticator, Identity};
pub use config::ServiceConfig;
pub use error::ServiceError;
pub use module::Module;
pub use types::{new_id, now_rfc3339, ListParams, ListResult};
