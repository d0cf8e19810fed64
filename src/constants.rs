use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Seconds a computed health report is served from cache.
pub const HEALTH_CACHE_SECS: i64 = 5;

/// Upper bound on accepted JSON bodies.
pub const JSON_BODY_LIMIT: usize = 2 * 1024 * 1024;
