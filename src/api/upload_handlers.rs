//! Admin file uploads
//!
//! Files land in the configured upload directory under a timestamp-prefixed
//! name and are served back by the static `/uploads` route. The returned URL
//! is what the admin panel stores in `profile_image` or `cv_url`.
//!
//! Endpoints (all admin-only):
//! - `POST   /api/upload/image`: multipart upload of one file
//! - `GET    /api/upload/files`: list stored files
//! - `DELETE /api/upload/files/{filename}`: remove a stored file

use super::handlers::{AppError, MessageResponse, PortfolioState};
use anyhow::Context;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Extensions accepted by [`upload_image`], compared case-insensitively
pub const ALLOWED_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".pdf"];

/// Room for multipart framing on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Request body limit for the upload route
pub fn body_limit(max_file_size: usize) -> usize {
    max_file_size.saturating_add(MULTIPART_OVERHEAD)
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub url: String,
    pub size: usize,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub filename: String,
    pub url: String,
    pub size: u64,
    pub created_at: Option<DateTime<Utc>>,
}

fn file_url(filename: &str) -> String {
    format!("/uploads/{}", filename)
}

pub fn is_allowed_file(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Last path component of a client-supplied name
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// A single path component that stays inside the upload directory
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

fn too_large(max_file_size: usize) -> AppError {
    AppError::BadRequest(format!(
        "File size too large. Maximum size: {:.1}MB",
        max_file_size as f64 / 1024.0 / 1024.0
    ))
}

fn multipart_error(e: MultipartError, max_file_size: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_file_size)
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// POST /api/upload/image
pub async fn upload_image(
    State(state): State<PortfolioState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let max = state.uploads.max_file_size;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max))?
    {
        let Some(original) = field.file_name().map(|n| base_name(n).to_string()) else {
            continue;
        };
        if !is_allowed_file(&original) {
            return Err(AppError::BadRequest(format!(
                "File type not allowed. Allowed types: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }
        let content_type = field.content_type().map(str::to_string);

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, max))? {
            data.extend_from_slice(&chunk);
            if data.len() > max {
                return Err(too_large(max));
            }
        }

        let filename = format!("{}_{}", Utc::now().timestamp(), original);
        tokio::fs::create_dir_all(&state.uploads.dir)
            .await
            .with_context(|| format!("Failed to create {}", state.uploads.dir.display()))?;
        tokio::fs::write(state.uploads.dir.join(&filename), &data)
            .await
            .with_context(|| format!("Failed to save file {}", filename))?;

        info!(filename = %filename, size = data.len(), "File uploaded");

        return Ok(Json(UploadResponse {
            url: file_url(&filename),
            filename,
            size: data.len(),
            content_type,
        }));
    }

    Err(AppError::BadRequest("No file provided".to_string()))
}

/// GET /api/upload/files
pub async fn list_files(
    State(state): State<PortfolioState>,
) -> Result<Json<Vec<UploadedFile>>, AppError> {
    let dir = &state.uploads.dir;
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Json(Vec::new())),
        Err(e) => {
            return Err(anyhow::Error::from(e)
                .context(format!("Failed to list {}", dir.display()))
                .into())
        }
    };

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .context("Failed to read upload directory")?
    {
        let meta = entry
            .metadata()
            .await
            .context("Failed to stat uploaded file")?;
        if !meta.is_file() {
            continue;
        }
        let Ok(filename) = entry.file_name().into_string() else {
            continue;
        };
        let created_at = meta
            .created()
            .or_else(|_| meta.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        files.push(UploadedFile {
            url: file_url(&filename),
            filename,
            size: meta.len(),
            created_at,
        });
    }
    files.sort_by(|a, b| a.filename.cmp(&b.filename));

    Ok(Json(files))
}

/// DELETE /api/upload/files/{filename}
pub async fn delete_file(
    State(state): State<PortfolioState>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !is_plain_file_name(&filename) {
        return Err(AppError::BadRequest("Invalid filename".to_string()));
    }

    match tokio::fs::remove_file(state.uploads.dir.join(&filename)).await {
        Ok(()) => {
            info!(filename = %filename, "Uploaded file deleted");
            Ok(MessageResponse::new("File deleted successfully"))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound("File not found".to_string()))
        }
        Err(e) => Err(anyhow::Error::from(e)
            .context(format!("Failed to delete file {}", filename))
            .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_router;
    use crate::test_helpers::{admin_token, mock_server_state_with_uploads};
    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use tower::ServiceExt;

    const BOUNDARY: &str = "portfolio-upload-boundary";

    fn app(dir: &std::path::Path, max_file_size: usize) -> Router {
        create_router(mock_server_state_with_uploads(dir, max_file_size))
    }

    fn upload_request(filename: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/upload/image")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("authorization", format!("Bearer {}", admin_token()))
            .body(Body::from(body))
            .unwrap()
    }

    fn admin_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", admin_token()))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    #[test]
    fn test_allowed_extensions() {
        assert!(is_allowed_file("me.png"));
        assert!(is_allowed_file("CV.PDF"));
        assert!(is_allowed_file("photo.jpeg"));
        assert!(!is_allowed_file("script.sh"));
        assert!(!is_allowed_file("png"));
    }

    #[test]
    fn test_file_name_checks() {
        assert_eq!(base_name("C:\\Users\\me\\photo.png"), "photo.png");
        assert_eq!(base_name("dir/photo.png"), "photo.png");
        assert!(is_plain_file_name("1700000000_photo.png"));
        assert!(!is_plain_file_name("../secret"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name(""));
    }

    #[tokio::test]
    async fn test_disallowed_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let resp = app(dir.path(), 1024)
            .oneshot(upload_request("payload.exe", b"MZ"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("File type not allowed"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_oversize_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let resp = app(dir.path(), 16)
            .oneshot(upload_request("big.png", &[0u8; 64]))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("File size too large"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let resp = app(dir.path(), 1024)
            .oneshot(admin_request("DELETE", "/api/upload/files/nope.png"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["error"], "File not found");
    }

    #[tokio::test]
    async fn test_delete_rejects_path_escape() {
        let dir = tempfile::tempdir().unwrap();
        let resp = app(dir.path(), 1024)
            .oneshot(admin_request("DELETE", "/api/upload/files/..%2Fsecret.png"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_requires_admin() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = upload_request("me.png", b"png");
        req.headers_mut().remove("authorization");

        let resp = app(dir.path(), 1024).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_list_serve_delete() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), 1024);
        let bytes = b"\x89PNG not really an image";

        let resp = app
            .clone()
            .oneshot(upload_request("me.png", bytes))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let uploaded = body_json(resp).await;
        let filename = uploaded["filename"].as_str().unwrap().to_string();
        assert!(filename.ends_with("_me.png"));
        assert_eq!(uploaded["url"], format!("/uploads/{}", filename));
        assert_eq!(uploaded["size"], bytes.len());
        assert_eq!(uploaded["content_type"], "image/png");

        let listed = body_json(
            app.clone()
                .oneshot(admin_request("GET", "/api/upload/files"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["filename"], filename.as_str());
        assert_eq!(listed[0]["size"], bytes.len());

        // Served publicly under the returned URL
        let served = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/uploads/{}", filename))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(served.status(), StatusCode::OK);
        assert_eq!(body_bytes(served).await, bytes.to_vec());

        let resp = app
            .clone()
            .oneshot(admin_request(
                "DELETE",
                &format!("/api/upload/files/{}", filename),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["message"], "File deleted successfully");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
