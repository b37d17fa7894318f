//! Authentication collaborator trait.
//!
//! The service layer does NOT depend on any specific credential scheme.
//! It only knows this trait; the concrete implementation (JWT validation
//! in the server binary, a fixed user in tests) is injected at startup.

use axum::http::HeaderMap;

use crate::ServiceError;

/// Pluggable request authenticator. Every service operation starts by
/// resolving the current user through this.
pub trait Authenticator: Send + Sync + 'static {
    /// Authenticate a request from its headers.
    ///
    /// Returns the current user id, or `Unauthorized` if the request
    /// carries no valid session.
    fn authenticate(&self, headers: &HeaderMap) -> Result<i64, ServiceError>;
}

/// An authenticator that resolves every request to a fixed user id.
/// Used for testing.
pub struct StaticUser(pub i64);

impl Authenticator for StaticUser {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<i64, ServiceError> {
        Ok(self.0)
    }
}

/// An authenticator that rejects every request. Used for testing.
pub struct DenyAll;

impl Authenticator for DenyAll {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<i64, ServiceError> {
        Err(ServiceError::Unauthorized("no valid session".into()))
    }
}
