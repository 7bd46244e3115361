use std::collections::HashMap;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;

use crate::api::errors::ApiError;
use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::services::{MediaFolder, Upload};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Parsed multipart body: the `file` part plus any text fields
pub(crate) struct UploadForm {
    pub file: Option<Upload>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn take_field(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }
}

pub(crate) async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadForm, ApiError> {
    let mut multipart =
        multipart.map_err(|e| ApiError::bad_request(e.body_text()).keyed_as_error())?;
    let mut form = UploadForm {
        file: None,
        fields: HashMap::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()).keyed_as_error())?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.to_string()).keyed_as_error())?;
            form.file = Some(Upload {
                bytes,
                file_name,
                content_type,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(e.to_string()).keyed_as_error())?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub key: String,
}

/// Store a file (profile pictures) and return its public URL
///
/// POST /api/upload
pub async fn upload_file(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let form = read_form(multipart).await?;
    let upload = form
        .file
        .filter(|file| !file.bytes.is_empty())
        .ok_or_else(|| ApiError::bad_request("No file uploaded").keyed_as_error())?;

    let stored = state
        .media
        .store(upload, MediaFolder::ProfilePictures)
        .await
        .map_err(|e| ApiError::from(e).keyed_as_error())?;

    tracing::info!(user_id = %user_id, key = %stored.key, "File uploaded");
    Ok(Json(UploadResponse {
        url: stored.url,
        key: stored.key,
    }))
}
