pub mod auth;
pub mod error;
pub mod validate;

pub use auth::{Authenticator, DenyAll, StaticUser};
pub use error::ServiceError;
pub use validate::{require_non_empty, require_number};
