#![allow(dead_code)]

use async_trait::async_trait;
use chat_translate::models::UsageRecord;
use chat_translate::services::{Clock, FileUsageStore, TranslationProvider, UsageGate, UsageStore};
use chat_translate::utils::{AppError, Result};
use chrono::{DateTime, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const QUOTA: u64 = 500_000;

/// Clock pinned to a settable instant
pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn at(year: i32, month: u32) -> Arc<Self> {
        Arc::new(Self(Mutex::new(
            Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).unwrap(),
        )))
    }

    pub fn set(&self, year: i32, month: u32) {
        *self.0.lock().unwrap() = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap();
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Provider that upper-cases text, or fails on demand
pub struct StubProvider {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubProvider {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::UpstreamTranslationFailure(
                "Translation API returned 403 Forbidden".to_string(),
            ));
        }
        Ok(format!("[{}] {}", target_lang, text.to_uppercase()))
    }
}

/// Test context with a usage file in a fresh temp directory
///
/// The directory is removed when the context is dropped.
pub struct TestContext {
    pub dir: TempDir,
    pub clock: Arc<TestClock>,
}

impl TestContext {
    /// Context whose clock reads January 2024
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
            clock: TestClock::at(2024, 1),
        }
    }

    pub fn usage_path(&self) -> PathBuf {
        self.dir.path().join("data").join("translation_usage.json")
    }

    pub fn store(&self) -> FileUsageStore {
        FileUsageStore::new(self.usage_path())
    }

    /// A gate over the context's usage file; build several to simulate restarts
    pub fn gate(&self) -> UsageGate {
        UsageGate::with_clock(Box::new(self.store()), QUOTA, self.clock.clone())
    }

    /// Seed the usage file directly
    pub async fn seed(&self, month: &str, total_characters: u64) {
        self.store()
            .save(&UsageRecord {
                current_month: month.to_string(),
                total_characters,
            })
            .await
            .expect("Failed to seed usage record");
    }

    /// Read the usage file directly
    pub async fn persisted(&self) -> Option<UsageRecord> {
        self.store().load().await.expect("Failed to read usage record")
    }
}
