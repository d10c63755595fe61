use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` whose rejections render as `ApiError` bodies.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
