use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::models::UsageRecord;
use crate::redis::RedisPool;
use crate::utils::error::{AppError, Result};

/// Durable home of the single usage record
///
/// Implementations report every read or write problem as
/// `AppError::UsageTrackingFailure`; an absent record is `Ok(None)`.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Load the stored record, `None` if nothing has been stored yet
    async fn load(&self) -> Result<Option<UsageRecord>>;

    /// Replace the stored record
    async fn save(&self, record: &UsageRecord) -> Result<()>;
}

fn encode_record(record: &UsageRecord, pretty: bool) -> Result<String> {
    let encoded = if pretty {
        serde_json::to_string_pretty(record)
    } else {
        serde_json::to_string(record)
    };
    encoded.map_err(|e| {
        AppError::UsageTrackingFailure(format!("Failed to encode usage record: {}", e))
    })
}

/// JSON file store
pub struct FileUsageStore {
    path: PathBuf,
}

impl FileUsageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "usage.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl UsageStore for FileUsageStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> Result<Option<UsageRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::UsageTrackingFailure(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let record = serde_json::from_str(&content).map_err(|e| {
            AppError::UsageTrackingFailure(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(Some(record))
    }

    async fn save(&self, record: &UsageRecord) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::UsageTrackingFailure(format!(
                    "Failed to create {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let content = encode_record(record, true)?;

        // Write-then-rename so readers never see a half-written record
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, content).await.map_err(|e| {
            AppError::UsageTrackingFailure(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::UsageTrackingFailure(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!("💾 Usage record written to {}", self.path.display());
        Ok(())
    }
}

/// Redis store, one JSON value under a single key
pub struct RedisUsageStore {
    redis: Arc<RedisPool>,
    key: String,
}

impl RedisUsageStore {
    pub fn new(redis: Arc<RedisPool>, key: impl Into<String>) -> Self {
        Self {
            redis,
            key: key.into(),
        }
    }
}

#[async_trait]
impl UsageStore for RedisUsageStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn load(&self) -> Result<Option<UsageRecord>> {
        let raw: Option<String> = self
            .redis
            .get(&self.key)
            .await
            .map_err(|e| AppError::UsageTrackingFailure(e.to_string()))?;

        raw.map(|raw| {
            serde_json::from_str(&raw).map_err(|e| {
                AppError::UsageTrackingFailure(format!(
                    "Failed to parse usage record at '{}': {}",
                    self.key, e
                ))
            })
        })
        .transpose()
    }

    async fn save(&self, record: &UsageRecord) -> Result<()> {
        let raw = encode_record(record, false)?;
        self.redis
            .set(&self.key, &raw)
            .await
            .map_err(|e| AppError::UsageTrackingFailure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUsageStore::new(dir.path().join("translation_usage.json"));

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("translation_usage.json");
        let store = FileUsageStore::new(&path);

        let record = UsageRecord {
            current_month: "2024-01".to_string(),
            total_characters: 1234,
        };
        store.save(&record).await.unwrap();

        assert!(path.exists());
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_file_store_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation_usage.json");
        let store = FileUsageStore::new(&path);

        store.save(&UsageRecord::new("2024-01")).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "{\n  \"currentMonth\": \"2024-01\",\n  \"totalCharacters\": 0\n}"
        );
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_tracking_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translation_usage.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileUsageStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, AppError::UsageTrackingFailure(_)));
    }

    #[tokio::test]
    async fn test_file_store_path_is_directory_is_tracking_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUsageStore::new(dir.path());

        assert!(matches!(
            store.load().await,
            Err(AppError::UsageTrackingFailure(_))
        ));
    }

    #[test]
    fn test_encode_record_compact_and_pretty() {
        let record = UsageRecord::new("2024-01");
        assert_eq!(
            encode_record(&record, false).unwrap(),
            r#"{"currentMonth":"2024-01","totalCharacters":0}"#
        );
        assert!(encode_record(&record, true).unwrap().contains('\n'));
    }

    #[tokio::test]
    async fn test_file_store_unwritable_target_is_tracking_failure() {
        let dir = tempfile::tempdir().unwrap();
        // Parent "directory" is a regular file, so the save cannot land
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = FileUsageStore::new(blocker.join("translation_usage.json"));

        let err = store.save(&UsageRecord::new("2024-01")).await.unwrap_err();
        assert!(matches!(err, AppError::UsageTrackingFailure(_)));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let store = FileUsageStore::new("data/translation_usage.json");
        assert_eq!(
            store.temp_path(),
            PathBuf::from("data/translation_usage.json.tmp")
        );
    }
}
