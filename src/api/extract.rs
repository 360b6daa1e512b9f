//! Request extractors whose rejections render as [`Error`] bodies.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::Error;

/// JSON request body. Malformed or mistyped fields become 400 validation errors.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Path parameters. A segment that does not parse is a 404.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);
