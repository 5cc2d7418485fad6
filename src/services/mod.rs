pub mod translation;
pub mod usage_gate;
pub mod usage_store;

pub use translation::{GoogleTranslateProvider, TranslationProvider};
pub use usage_gate::{Clock, SystemClock, UsageGate};
pub use usage_store::{FileUsageStore, RedisUsageStore, UsageStore};
