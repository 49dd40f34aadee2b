//! Time-related utilities with clock abstraction for testability.
//!
//! Records are stamped with the *compact timestamp*: wall-clock time in JST
//! formatted as `YYYYMMDDhhmmssSSS` and read as a decimal integer
//! (e.g. `2024-01-01 12:00:00.123` becomes `20240101120000123`).

use std::sync::Mutex;

use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Timelike, Utc};

const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get the current time in JST
    fn now(&self) -> DateTime<FixedOffset>;

    /// Get the current time as a compact timestamp
    fn now_compact(&self) -> i64 {
        to_compact_timestamp(&self.now())
    }
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        get_jst_now()
    }
}

/// Manually driven clock for testing.
///
/// Returns the same instant until it is moved with [`FixedClock::set`] or
/// [`FixedClock::advance`].
#[derive(Debug)]
pub struct FixedClock {
    fixed_time: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    /// Create a new fixed clock at the given instant
    pub fn new(fixed_time: DateTime<FixedOffset>) -> Self {
        Self {
            fixed_time: Mutex::new(fixed_time),
        }
    }

    /// Create a new fixed clock from a compact timestamp.
    ///
    /// Panics when the value is not a valid compact timestamp; meant for tests.
    pub fn from_compact(timestamp: i64) -> Self {
        let fixed_time = from_compact_timestamp(timestamp)
            .unwrap_or_else(|| panic!("invalid compact timestamp: {timestamp}"));
        Self::new(fixed_time)
    }

    /// Move the clock to the given instant
    pub fn set(&self, time: DateTime<FixedOffset>) {
        *self.lock() = time;
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut guard = self.lock();
        *guard = *guard + by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<FixedOffset>> {
        // a poisoned clock still holds a valid instant
        self.fixed_time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.lock()
    }
}

fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).expect("JST offset is in range")
}

/// Get the current time in JST
pub fn get_jst_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&jst())
}

/// Format an instant as a compact timestamp (`YYYYMMDDhhmmssSSS`).
pub fn to_compact_timestamp(time: &DateTime<FixedOffset>) -> i64 {
    // leap seconds report nanos >= 1e9
    let millis = i64::from((time.nanosecond() / 1_000_000).min(999));

    i64::from(time.year()) * 10_000_000_000_000
        + i64::from(time.month()) * 100_000_000_000
        + i64::from(time.day()) * 1_000_000_000
        + i64::from(time.hour()) * 10_000_000
        + i64::from(time.minute()) * 100_000
        + i64::from(time.second()) * 1_000
        + millis
}

/// Parse a compact timestamp back into a JST instant.
///
/// Returns `None` when any component is out of range.
pub fn from_compact_timestamp(timestamp: i64) -> Option<DateTime<FixedOffset>> {
    if timestamp < 0 {
        return None;
    }

    let millis = (timestamp % 1_000) as u32;
    let second = (timestamp / 1_000 % 100) as u32;
    let minute = (timestamp / 100_000 % 100) as u32;
    let hour = (timestamp / 10_000_000 % 100) as u32;
    let day = (timestamp / 1_000_000_000 % 100) as u32;
    let month = (timestamp / 100_000_000_000 % 100) as u32;
    let year = i32::try_from(timestamp / 10_000_000_000_000).ok()?;

    jst()
        .with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .map(|time| time + Duration::milliseconds(i64::from(millis)))
}

/// Convert a compact timestamp to JST RFC 3339 format
pub fn compact_timestamp_to_jst_rfc3339(timestamp: i64) -> Option<String> {
    from_compact_timestamp(timestamp).map(|time| time.to_rfc3339())
}
