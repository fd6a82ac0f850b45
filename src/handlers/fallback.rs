use crate::core::error::DirectoryError;
use axum::{
    http::Uri,
    response::{IntoResponse, Response},
};

pub async fn fallback_handler(uri: Uri) -> Response {
    DirectoryError::NotFound(format!(
        "No route for {}. User endpoints live under /api/users",
        uri.path()
    ))
    .into_response()
}
