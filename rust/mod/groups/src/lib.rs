//! Groups module — group lifecycle and membership under owner authorization.
//!
//! # Resources
//!
//! - **Group** — created by an authenticated owner; never updated or
//!   deleted here; owned exclusively by its creator.
//! - **GroupMember** — a (group, user) row whose existence is the sole
//!   signal of membership.
//! - **User** — consulted for member resolution and profile projection
//!   through the [`UserDirectory`] collaborator.
//!
//! The service persists everything through the generic entity store; the
//! API layer resolves the current user through the injected
//! [`Authenticator`](roster_core::Authenticator) before every operation.

pub mod api;
pub mod directory;
pub mod model;
pub mod schema;
pub mod service;

pub use api::AppState;
pub use directory::{SqlUserDirectory, UserDirectory};
pub use service::GroupService;
