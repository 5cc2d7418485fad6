use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::DEFAULT_MONTHLY_QUOTA;
use crate::models::{UsageDecision, UsageRecord, UsageSnapshot};
use crate::services::usage_store::UsageStore;
use crate::utils::error::{AppError, Result};

/// Source of "now" for month bucketing
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar month in UTC, `YYYY-MM`
    fn current_month(&self) -> String {
        self.now().format("%Y-%m").to_string()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Monthly translation quota gate
///
/// Owns the usage store; every read-modify-write of the record happens under
/// one async mutex, so concurrent requests in this process cannot overshoot
/// the quota.
pub struct UsageGate {
    store: Mutex<Box<dyn UsageStore>>,
    backend: &'static str,
    clock: Arc<dyn Clock>,
    quota: u64,
}

impl UsageGate {
    pub fn new(store: Box<dyn UsageStore>, quota: u64) -> Self {
        Self::with_clock(store, quota, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Box<dyn UsageStore>, quota: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend: store.backend(),
            store: Mutex::new(store),
            clock,
            quota,
        }
    }

    /// Gate with the default 500,000 character quota
    pub fn with_default_quota(store: Box<dyn UsageStore>) -> Self {
        Self::new(store, DEFAULT_MONTHLY_QUOTA)
    }

    pub fn quota(&self) -> u64 {
        self.quota
    }

    /// Name of the backing store
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Load the record and bring it into `month`.
    ///
    /// A total outside the signed range `remaining` is reported in cannot come
    /// from this gate, so such a record is treated as unreadable.
    async fn current_record(store: &dyn UsageStore, month: &str) -> Result<UsageRecord> {
        let mut record = store
            .load()
            .await?
            .unwrap_or_else(|| UsageRecord::new(month));

        let previous_month = record.current_month.clone();
        if record.roll_over(month) {
            info!(
                "🗓️  Translation usage rolled over from {} to {}",
                previous_month, month
            );
        }

        if record.total_characters > i64::MAX as u64 {
            return Err(AppError::UsageTrackingFailure(format!(
                "Usage record for {} is out of range: {} characters",
                record.current_month, record.total_characters
            )));
        }

        Ok(record)
    }

    /// Persist a zeroed record for the current month if none exists yet
    pub async fn initialize(&self) -> Result<()> {
        let store = self.store.lock().await;

        if store.load().await?.is_none() {
            let record = UsageRecord::new(self.clock.current_month());
            store.save(&record).await.map_err(|e| {
                error!("❌ Failed to initialize usage record: {}", e);
                e
            })?;
            info!(
                "📒 Created usage record for {} ({} backend)",
                record.current_month,
                self.backend
            );
        }

        Ok(())
    }

    /// Charge `char_count` characters against this month's quota.
    ///
    /// A request that would push usage past the quota is denied and nothing
    /// is charged; `remaining` is then computed from the unchanged total.
    /// On admit the new total is persisted before returning.
    pub async fn check_and_update_usage(&self, char_count: u64) -> Result<UsageDecision> {
        let store = self.store.lock().await;

        let month = self.clock.current_month();
        let mut record = Self::current_record(&**store, &month)
            .await
            .map_err(|e| {
                error!("❌ Error tracking usage: {}", e);
                e
            })?;

        let projected = record.total_characters.saturating_add(char_count);
        if projected > self.quota {
            let remaining = record.remaining(self.quota);
            warn!(
                "🚫 Translation of {} characters denied: {} used, {} remaining this month",
                char_count, record.total_characters, remaining
            );
            return Ok(UsageDecision {
                allowed: false,
                remaining,
            });
        }

        record.total_characters = projected;
        store.save(&record).await.map_err(|e| {
            error!("❌ Error tracking usage: {}", e);
            e
        })?;

        let remaining = record.remaining(self.quota);
        info!(
            "✅ Translation of {} characters admitted: {} remaining this month",
            char_count, remaining
        );

        Ok(UsageDecision {
            allowed: true,
            remaining,
        })
    }

    /// Current month's usage, with rollover applied in memory only
    pub async fn snapshot(&self) -> Result<UsageSnapshot> {
        let store = self.store.lock().await;

        let month = self.clock.current_month();
        let record = Self::current_record(&**store, &month).await?;

        Ok(UsageSnapshot {
            remaining: record.remaining(self.quota),
            current_month: record.current_month,
            total_characters: record.total_characters,
            quota: self.quota,
        })
    }
}
