//! Resource endpoints: listing, detail, related, upload and owner delete

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};
use uspshare_common::db::{NewResource, Resource};
use uspshare_common::read_model::{RelatedResource, ResourceView};
use uuid::Uuid;

use super::auth::AuthUser;
use super::form::FormData;
use crate::error::{not_found_as, parse_id};
use crate::{ApiError, ApiResult, AppState};

/// GET /api/resources
pub async fn list_resources(State(state): State<AppState>) -> ApiResult<Json<Vec<ResourceView>>> {
    Ok(Json(state.store.list_resource_views().await?))
}

/// GET /api/resource/:id
pub async fn get_resource(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ResourceView>> {
    let id = parse_id(&id, "resource")?;
    let view = state
        .store
        .resource_view(id)
        .await
        .map_err(not_found_as("Resource not found"))?;
    Ok(Json(view))
}

/// GET /api/resource/:id/related
pub async fn related_resources(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<RelatedResource>>> {
    let id = parse_id(&id, "resource")?;
    let related = state
        .store
        .related_resources(id)
        .await
        .map_err(not_found_as("Resource not found"))?;
    Ok(Json(related))
}

/// GET /api/my-uploads
pub async fn my_uploads(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<ResourceView>>> {
    Ok(Json(state.store.user_resource_views(user.id).await?))
}

/// POST /api/upload (multipart)
///
/// Fields: file, title, description, course, courseCode, fileType, semester,
/// isAnonymous ("true"), tags (JSON array string), professorId.
pub async fn upload_resource(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Resource>)> {
    let mut form = FormData::collect(multipart, &["file"], state.limits.max_upload_bytes).await?;

    let file = form
        .take_file("file")
        .ok_or_else(|| ApiError::BadRequest("Invalid file field".to_string()))?;
    let file_name = file.file_name.clone().unwrap_or_default();

    let stored = state
        .storage
        .save_upload(file.bytes, file.file_name.as_deref())
        .await?;

    let new_resource = NewResource {
        user_id: user.id,
        professor_id: parse_professor_id(&form.text("professorId")),
        course_code: form.text("courseCode"),
        course: form.text("course"),
        resource_type: form.text("fileType"),
        file_name,
        file_url: stored.url.clone(),
        title: form.text("title"),
        description: form.text("description"),
        semester: form.text("semester"),
        tags: parse_tags(&form.text("tags")),
        is_anonymous: form.text("isAnonymous") == "true",
    };

    match state.store.create_resource(new_resource).await {
        Ok(resource) => {
            info!(resource_id = %resource.id, stored_name = %stored.stored_name, "Resource uploaded");
            Ok((StatusCode::CREATED, Json(resource)))
        }
        Err(e) => {
            state.storage.remove(&stored.url).await;
            Err(e.into())
        }
    }
}

/// DELETE /api/resource/:id
///
/// Any id that names none of the caller's resources, well-formed or not, is 403.
pub async fn delete_resource(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = Uuid::parse_str(&id).map_err(|_| {
        ApiError::Forbidden("Permission denied or resource not found".to_string())
    })?;
    let file_url = state.store.find_resource(id).await?.map(|r| r.file_url);

    state.store.delete_resource_owned(id, user.id).await?;

    if let Some(url) = file_url {
        state.storage.remove(&url).await;
    }
    Ok(Json(json!({ "message": "Resource deleted successfully" })))
}

/// Tags arrive as a JSON array string; anything unparsable means no tags
fn parse_tags(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(tags) => tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed tags field");
            Vec::new()
        }
    }
}

fn parse_professor_id(raw: &str) -> Option<Uuid> {
    if raw.is_empty() {
        return None;
    }
    Uuid::parse_str(raw).ok()
}
