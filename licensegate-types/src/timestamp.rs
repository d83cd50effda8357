//! Wall-clock timestamps in milliseconds since the Unix epoch.

/// Milliseconds since the Unix epoch.
///
/// Signed so that arithmetic on externally supplied values (token payloads)
/// cannot underflow.
pub type EpochMillis = i64;

/// Returns the current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> EpochMillis {
    chrono::Utc::now().timestamp_millis()
}
