//! Multipart form collection
//!
//! Reads every field of a multipart body into memory: named file parts are
//! kept as bytes (bounded by a per-request limit), everything else as text.

use axum::body::Bytes;
use axum::extract::Multipart;
use std::collections::HashMap;

use crate::{ApiError, ApiResult};

/// A file part of a multipart body
#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Collected multipart fields
#[derive(Debug, Default)]
pub struct FormData {
    text: HashMap<String, String>,
    files: HashMap<String, FilePart>,
}

impl FormData {
    /// Drain `multipart`, treating the parts named in `file_fields` as files
    ///
    /// A file larger than `max_file_bytes` is rejected with 400 "File too large".
    pub async fn collect(
        mut multipart: Multipart,
        file_fields: &[&str],
        max_file_bytes: usize,
    ) -> ApiResult<Self> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if file_fields.contains(&name.as_str()) {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                if bytes.len() > max_file_bytes {
                    return Err(ApiError::BadRequest("File too large".to_string()));
                }
                form.files.insert(name, FilePart { file_name, bytes });
            } else {
                let value = field.text().await?;
                form.text.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Trimmed text value, empty when the field is absent
    pub fn text(&self, name: &str) -> String {
        self.text
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<FilePart> {
        self.files.remove(name)
    }
}
