//! Route modules, split by how access is checked.

/// Pages. Every path here passes through the access gate first.
pub mod pages;

/// `/api` endpoints open to anonymous callers: health, sign-in and recovery.
pub mod public;

/// `/api` endpoints that forward the session token to a collaborator. Wrapped in
/// the token-checking middleware by `create_router`.
pub mod authenticated;
