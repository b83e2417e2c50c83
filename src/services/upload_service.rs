use crate::api::error::AppError;
use crate::config::StorageConfig;
use crate::entities::types::StoredFile;
use crate::services::storage::StorageService;
use crate::utils::hash::calculate_hash;
use crate::utils::validation::{
    ValidationError, is_executable_content, resolve_mime, sanitize_filename, validate_file_size,
    validate_mime_type,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// A file received from a client, before validation
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// A file that passed every check and is ready to upload
struct CheckedFile {
    filename: String,
    content_type: String,
    data: Vec<u8>,
}

pub struct UploadService {
    storage: Arc<dyn StorageService>,
    config: StorageConfig,
}

impl UploadService {
    pub fn new(storage: Arc<dyn StorageService>, config: StorageConfig) -> Self {
        Self { storage, config }
    }

    pub fn max_files(&self) -> usize {
        self.config.max_files
    }

    /// Validate one file and push it to object storage under the owner's prefix.
    pub async fn store(&self, owner_id: &str, file: IncomingFile) -> Result<StoredFile, AppError> {
        let checked = self.check(file)?;
        self.put(owner_id, checked).await
    }

    /// Store a batch, refusing it up front when it exceeds `max_files`.
    /// Every file is validated before the first upload; a failed upload
    /// removes the objects already written.
    pub async fn store_many(
        &self,
        owner_id: &str,
        files: Vec<IncomingFile>,
    ) -> Result<Vec<StoredFile>, AppError> {
        if files.is_empty() {
            return Err(AppError::BadRequest("No files found in request".to_string()));
        }
        if files.len() > self.config.max_files {
            return Err(AppError::PayloadTooLarge(format!(
                "At most {} files per request",
                self.config.max_files
            )));
        }

        let checked = files
            .into_iter()
            .map(|file| self.check(file))
            .collect::<Result<Vec<_>, _>>()?;

        let mut stored = Vec::with_capacity(checked.len());
        for file in checked {
            match self.put(owner_id, file).await {
                Ok(file) => stored.push(file),
                Err(e) => {
                    self.discard(owner_id, &stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    /// Best-effort removal of objects whose owning record was never written.
    pub async fn discard(&self, owner_id: &str, files: &[StoredFile]) {
        for file in files {
            let key = object_key(owner_id, &file.id, &file.filename);
            if let Err(e) = self.storage.delete_file(&key).await {
                warn!("Failed to remove orphaned upload {}: {}", key, e);
            }
        }
    }

    fn check(&self, file: IncomingFile) -> Result<CheckedFile, AppError> {
        validate_file_size(file.data.len(), self.config.max_file_size).map_err(validation_error)?;
        if file.data.is_empty() {
            return Err(AppError::Validation("File is empty".to_string()));
        }

        let filename = sanitize_filename(&file.filename).map_err(validation_error)?;
        let content_type = resolve_mime(file.content_type.as_deref(), &file.data);
        validate_mime_type(&content_type, &self.config.allowed_mime_types)
            .map_err(validation_error)?;

        if is_executable_content(&file.data[..file.data.len().min(16)]) {
            return Err(AppError::Validation(
                "File contains executable content which is not allowed".to_string(),
            ));
        }

        Ok(CheckedFile {
            filename,
            content_type,
            data: file.data,
        })
    }

    async fn put(&self, owner_id: &str, file: CheckedFile) -> Result<StoredFile, AppError> {
        let CheckedFile {
            filename,
            content_type,
            data,
        } = file;
        let id = Uuid::new_v4().to_string();
        let key = object_key(owner_id, &id, &filename);
        let hash = calculate_hash(&data);
        let size = data.len() as i64;

        self.storage
            .upload_file(&key, data, &content_type)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to upload {}: {}", filename, e)))?;

        info!("📦 Stored {} ({} bytes) as {}", filename, size, key);

        Ok(StoredFile {
            id,
            url: self.storage.public_url(&key),
            filename,
            size,
            content_type,
            hash,
        })
    }

    /// Accepts raw base64 or a `data:<mime>;base64,<payload>` URL.
    pub async fn store_base64(
        &self,
        owner_id: &str,
        filename: &str,
        content_type: Option<String>,
        payload: &str,
    ) -> Result<StoredFile, AppError> {
        let (data_url_mime, encoded) = split_data_url(payload.trim());
        let data = STANDARD
            .decode(encoded)
            .map_err(|e| AppError::Validation(format!("Invalid base64 payload: {}", e)))?;

        self.store(
            owner_id,
            IncomingFile {
                filename: filename.to_string(),
                content_type: content_type.or(data_url_mime),
                data,
            },
        )
        .await
    }
}

fn object_key(owner_id: &str, id: &str, filename: &str) -> String {
    format!("uploads/{}/{}-{}", owner_id, id, filename)
}

fn split_data_url(payload: &str) -> (Option<String>, &str) {
    if let Some(rest) = payload.strip_prefix("data:")
        && let Some((meta, encoded)) = rest.split_once(',')
    {
        let mime = meta.trim_end_matches(";base64");
        let mime = (!mime.is_empty()).then(|| mime.to_string());
        return (mime, encoded);
    }
    (None, payload)
}

fn validation_error(e: anyhow::Error) -> AppError {
    match e.downcast_ref::<ValidationError>() {
        Some(v) if v.code == "FILE_TOO_LARGE" => AppError::PayloadTooLarge(v.message.clone()),
        Some(v) if v.code == "INVALID_MIME_TYPE" => {
            AppError::UnsupportedMediaType(v.message.clone())
        }
        Some(v) => AppError::Validation(v.message.clone()),
        None => AppError::Validation(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStorage {
        files: Mutex<HashMap<String, (Vec<u8>, String)>>,
        /// Uploads whose key ends with this suffix fail
        fail_suffix: Option<&'static str>,
    }

    #[async_trait]
    impl StorageService for MemoryStorage {
        async fn upload_file(&self, key: &str, data: Vec<u8>, content_type: &str) -> anyhow::Result<()> {
            if self.fail_suffix.is_some_and(|suffix| key.ends_with(suffix)) {
                anyhow::bail!("bucket unavailable");
            }
            self.files
                .lock()
                .unwrap()
                .insert(key.to_string(), (data, content_type.to_string()));
            Ok(())
        }
        async fn delete_file(&self, key: &str) -> anyhow::Result<()> {
            self.files.lock().unwrap().remove(key);
            Ok(())
        }
        fn public_url(&self, key: &str) -> String {
            format!("http://cdn.test/{}", key)
        }
    }

    fn service(max_files: usize, max_file_size: usize) -> (UploadService, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::default());
        let config = StorageConfig {
            max_files,
            max_file_size,
            ..StorageConfig::default()
        };
        (UploadService::new(storage.clone(), config), storage)
    }

    fn text(name: &str, body: &str) -> IncomingFile {
        IncomingFile {
            filename: name.to_string(),
            content_type: Some("text/plain".to_string()),
            data: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_store_returns_descriptor() {
        let (svc, storage) = service(10, 1024);
        let stored = svc.store("u1", text("notes.txt", "hello world")).await.unwrap();

        assert_eq!(stored.filename, "notes.txt");
        assert_eq!(stored.size, 11);
        assert_eq!(stored.content_type, "text/plain");
        assert_eq!(
            stored.hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert!(stored.url.starts_with("http://cdn.test/uploads/u1/"));
        assert_eq!(storage.files.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_rejects_disallowed_mime() {
        let (svc, _) = service(10, 1024);
        let file = IncomingFile {
            filename: "page.html".to_string(),
            content_type: Some("text/html".to_string()),
            data: b"<html></html>".to_vec(),
        };
        let err = svc.store("u1", file).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));
    }

    #[tokio::test]
    async fn test_store_rejects_oversized() {
        let (svc, _) = service(10, 4);
        let err = svc.store("u1", text("a.txt", "too long")).await.unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[tokio::test]
    async fn test_store_many_validates_whole_batch_first() {
        let (svc, storage) = service(10, 1024);
        let files = vec![
            text("ok.txt", "fine"),
            IncomingFile {
                filename: "bad.html".to_string(),
                content_type: Some("text/html".to_string()),
                data: b"<html></html>".to_vec(),
            },
        ];
        let err = svc.store_many("u1", files).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));
        assert!(storage.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_many_removes_partial_uploads() {
        let storage = Arc::new(MemoryStorage {
            fail_suffix: Some("-second.txt"),
            ..MemoryStorage::default()
        });
        let svc = UploadService::new(storage.clone(), StorageConfig::default());

        let files = vec![text("first.txt", "one"), text("second.txt", "two")];
        let err = svc.store_many("u1", files).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(storage.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discard_removes_stored_objects() {
        let (svc, storage) = service(10, 1024);
        let stored = svc
            .store_many("u1", vec![text("a.txt", "a"), text("b.txt", "b")])
            .await
            .unwrap();
        assert_eq!(storage.files.lock().unwrap().len(), 2);

        svc.discard("u1", &stored).await;
        assert!(storage.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_many_enforces_file_count() {
        let (svc, storage) = service(2, 1024);
        let files = vec![text("a.txt", "a"), text("b.txt", "b"), text("c.txt", "c")];
        let err = svc.store_many("u1", files).await.unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        assert!(storage.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_base64_data_url() {
        let (svc, _) = service(10, 1024);
        let encoded = STANDARD.encode("hello");
        let payload = format!("data:text/plain;base64,{}", encoded);
        let stored = svc.store_base64("u1", "hi.txt", None, &payload).await.unwrap();
        assert_eq!(stored.content_type, "text/plain");
        assert_eq!(stored.size, 5);
    }

    #[tokio::test]
    async fn test_store_base64_invalid() {
        let (svc, _) = service(10, 1024);
        let err = svc
            .store_base64("u1", "hi.txt", Some("text/plain".into()), "***")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_split_data_url() {
        assert_eq!(
            split_data_url("data:image/png;base64,AAAA"),
            (Some("image/png".to_string()), "AAAA")
        );
        assert_eq!(split_data_url("AAAA"), (None, "AAAA"));
    }
}
