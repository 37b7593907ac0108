//! Day-granular time arithmetic
//!
//! Reputation expiry is day-boxed: mint timestamps are floored to the start
//! of their calendar day so that expiry boundaries are stable within a day
//! regardless of intra-day mint time.

/// Seconds in one day
pub const ONE_DAY_SECS: u64 = 86_400;

/// Floor a timestamp to the start of its day
pub fn day_floor(timestamp: u64) -> u64 {
    timestamp - (timestamp % ONE_DAY_SECS)
}

/// Convert a number of days to seconds
pub const fn days(n: u64) -> u64 {
    n * ONE_DAY_SECS
}
