//! Middleware for Foodgram.
//!
//! - `token_auth` - API token resolution and the `AuthUser` extractor

mod token_auth;

pub use token_auth::{authenticate, AuthUser};
