use axum_macros::FromRequest;

use crate::core::error::Error;

/// `axum::Json` with rejections rendered through the response envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub(crate) struct JsonBody<T>(pub(crate) T);
