//! Step engine configuration constants

/// Default tolerance for samples ending after server receipt time (clock skew)
pub const DEFAULT_MAX_FUTURE_SKEW_MINUTES: i64 = 5;

/// Largest skew tolerance the server accepts from configuration (one day)
pub const MAX_FUTURE_SKEW_LIMIT_MINUTES: i64 = 24 * 60;

/// Most steps a single sample may report. Clients store counts as 32-bit
/// integers, so anything above is corrupt.
pub const MAX_SAMPLE_STEPS: i64 = i32::MAX as i64;

/// Leaderboard size when the caller does not ask for one
pub const DEFAULT_LEADERBOARD_LIMIT: u64 = 10;

/// Largest leaderboard a single query may return
pub const MAX_LEADERBOARD_LIMIT: u64 = 100;

/// History window when the caller does not ask for one
pub const DEFAULT_HISTORY_DAYS: i64 = 30;

/// Zone used when a user has no (valid) time zone configured
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Clamp a requested leaderboard size into `1..=MAX_LEADERBOARD_LIMIT`
pub fn clamp_leaderboard_limit(requested: i64) -> u64 {
    requested.clamp(1, MAX_LEADERBOARD_LIMIT as i64) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skew_tolerance_is_five_minutes() {
        assert_eq!(DEFAULT_MAX_FUTURE_SKEW_MINUTES, 5);
    }

    #[test]
    fn default_skew_is_within_configurable_range() {
        assert!((0..=MAX_FUTURE_SKEW_LIMIT_MINUTES).contains(&DEFAULT_MAX_FUTURE_SKEW_MINUTES));
    }

    #[test]
    fn default_limit_fits_under_max() {
        assert!(DEFAULT_LEADERBOARD_LIMIT <= MAX_LEADERBOARD_LIMIT);
    }

    #[test]
    fn clamp_leaderboard_limit_bounds() {
        assert_eq!(clamp_leaderboard_limit(0), 1);
        assert_eq!(clamp_leaderboard_limit(-7), 1);
        assert_eq!(clamp_leaderboard_limit(10), 10);
        assert_eq!(clamp_leaderboard_limit(5_000), MAX_LEADERBOARD_LIMIT);
    }
}
