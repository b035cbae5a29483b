//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Unix epoch seconds `hours` from now, used for token expiry claims
pub fn epoch_seconds_after_hours(hours: i64) -> i64 {
    (Utc::now() + chrono::Duration::hours(hours)).timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_epoch_after_hours_is_in_future() {
        let base = now().timestamp();
        let later = epoch_seconds_after_hours(24);
        assert!(later >= base + 24 * 3600);
        assert!(later <= base + 24 * 3600 + 5);
    }

    #[test]
    fn test_epoch_after_negative_hours_is_in_past() {
        let base = now().timestamp();
        assert!(epoch_seconds_after_hours(-1) < base);
    }
}
