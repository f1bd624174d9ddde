//! Serves objects of the filesystem store through signed URLs.

use super::AppState;
use crate::adapters::local::FsStoreError;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: i64,
    pub signature: String,
}

fn content_type_for(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext) {
        Some("mp4") => "video/mp4",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

pub async fn get_object(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    Query(query): Query<SignedQuery>,
) -> Response {
    let Some(store) = state.fs_store.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let file = match store
        .open_signed(&bucket, &key, query.expires, &query.signature)
        .await
    {
        Ok(file) => file,
        Err(FsStoreError::NotFound) => return StatusCode::NOT_FOUND.into_response(),
        Err(e @ FsStoreError::Io(_)) | Err(e @ FsStoreError::InvalidSecret) => {
            error!(error = %e, %bucket, %key, "failed to open object");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        Err(e) => {
            debug!(error = %e, %bucket, %key, "refused object request");
            return StatusCode::FORBIDDEN.into_response();
        }
    };

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&key));
    if let Ok(metadata) = file.metadata().await {
        response = response.header(header::CONTENT_LENGTH, metadata.len());
    }
    response
        .body(Body::from_stream(ReaderStream::new(file)))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
