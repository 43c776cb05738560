//! Upload Handling
//! Mission: Persist uploaded images; parse multipart or JSON submissions

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

const MAX_JSON_BODY_BYTES: usize = 1024 * 1024;

/// Stores uploaded files under a directory served statically at `/uploads`.
#[derive(Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: PathBuf) -> ApiResult<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create upload dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the file under a generated name, keeping the original extension.
    /// Returns the public path clients use to fetch it back.
    pub async fn store(&self, original_name: &str, data: Bytes) -> ApiResult<String> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(OsStr::to_str)
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        let filename = format!("{}{}", Uuid::new_v4().simple(), ext);
        let path = self.dir.join(&filename);

        tokio::fs::write(&path, &data)
            .await
            .with_context(|| format!("Failed to write upload {}", path.display()))?;

        debug!("🖼️  Stored upload {} ({} bytes)", filename, data.len());

        Ok(format!("/uploads/{}", filename))
    }
}

/// A parsed create/update submission: text fields plus the stored public
/// path of an uploaded file, if one was sent.
pub struct Submission {
    fields: HashMap<String, String>,
    pub file: Option<String>,
}

impl Submission {
    /// Trimmed non-empty field value; empty strings read as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Read a request body as either `multipart/form-data` (text fields plus an
/// optional file under `file_field`, stored immediately) or a flat JSON
/// object.
pub async fn read_submission(
    req: Request,
    uploads: &UploadStore,
    file_field: &str,
) -> ApiResult<Submission> {
    let is_multipart = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        read_multipart(req, uploads, file_field).await
    } else {
        read_json(req).await
    }
}

async fn read_multipart(
    req: Request,
    uploads: &UploadStore,
    file_field: &str,
) -> ApiResult<Submission> {
    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|_| ApiError::invalid("Malformed multipart body"))?;

    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::invalid("Malformed multipart body"))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == file_field && field.file_name().is_some() {
            let original = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|_| ApiError::invalid("Failed to read uploaded file"))?;
            file = Some(uploads.store(&original, data).await?);
        } else {
            let value = field
                .text()
                .await
                .map_err(|_| ApiError::invalid("Malformed multipart body"))?;
            fields.insert(name, value);
        }
    }

    Ok(Submission { fields, file })
}

async fn read_json(req: Request) -> ApiResult<Submission> {
    let bytes = axum::body::to_bytes(req.into_body(), MAX_JSON_BODY_BYTES)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to read request body: {}", e)))?;

    let mut fields = HashMap::new();
    if !bytes.is_empty() {
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|_| ApiError::invalid("Invalid JSON body"))?;
        let serde_json::Value::Object(map) = value else {
            return Err(ApiError::invalid("Invalid JSON body"));
        };
        for (k, v) in map {
            match v {
                serde_json::Value::String(s) => {
                    fields.insert(k, s);
                }
                serde_json::Value::Number(_) | serde_json::Value::Bool(_) => {
                    fields.insert(k, v.to_string());
                }
                _ => {}
            }
        }
    }

    Ok(Submission { fields, file: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    fn test_uploads() -> (UploadStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().to_path_buf()).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn test_store_keeps_extension_and_generates_name() {
        let (store, dir) = test_uploads();

        let public = store
            .store("poster.png", Bytes::from_static(b"png-bytes"))
            .await
            .unwrap();

        assert!(public.starts_with("/uploads/"));
        assert!(public.ends_with(".png"));

        let filename = public.strip_prefix("/uploads/").unwrap();
        let written = std::fs::read(dir.path().join(filename)).unwrap();
        assert_eq!(written, b"png-bytes");
    }

    #[tokio::test]
    async fn test_json_submission_fields() {
        let (store, _dir) = test_uploads();

        let req = HttpRequest::builder()
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"subject": "Broken light", "description": "  Hallway  ", "empty": ""}"#,
            ))
            .unwrap();

        let submission = read_submission(req, &store, "image").await.unwrap();
        assert_eq!(submission.text("subject").as_deref(), Some("Broken light"));
        assert_eq!(submission.text("description").as_deref(), Some("Hallway"));
        assert_eq!(submission.text("empty"), None);
        assert_eq!(submission.text("missing"), None);
        assert!(submission.file.is_none());
    }

    #[tokio::test]
    async fn test_multipart_submission_with_file() {
        let (store, dir) = test_uploads();

        let body = concat!(
            "--BOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"subject\"\r\n\r\n",
            "Leaky tap\r\n",
            "--BOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"image\"; filename=\"tap.jpg\"\r\n",
            "Content-Type: image/jpeg\r\n\r\n",
            "jpeg-bytes\r\n",
            "--BOUNDARY--\r\n",
        );
        let req = HttpRequest::builder()
            .header("content-type", "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(body))
            .unwrap();

        let submission = read_submission(req, &store, "image").await.unwrap();
        assert_eq!(submission.text("subject").as_deref(), Some("Leaky tap"));

        let public = submission.file.expect("file stored");
        assert!(public.ends_with(".jpg"));
        let filename = public.strip_prefix("/uploads/").unwrap();
        assert_eq!(std::fs::read(dir.path().join(filename)).unwrap(), b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_submission() {
        let (store, _dir) = test_uploads();

        let req = HttpRequest::builder().body(Body::empty()).unwrap();
        let submission = read_submission(req, &store, "image").await.unwrap();
        assert_eq!(submission.text("anything"), None);
        assert!(submission.file.is_none());
    }
}
