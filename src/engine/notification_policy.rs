use chrono::{DateTime, Utc};

pub const DEFAULT_REMINDER_INTERVAL_MINUTES: i64 = 30;

/// Decides whether an over-limit reminder is due. It never records anything: the caller updates
/// its last notification moment after a reminder was actually delivered.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverLimitNotificationPolicy;

impl OverLimitNotificationPolicy {
    pub fn should_notify(
        &self,
        notifications_enabled: Option<bool>,
        is_over_limit: bool,
        was_over_limit: bool,
        now: DateTime<Utc>,
        last_notification_at: Option<DateTime<Utc>>,
        reminder_interval_minutes: i64,
    ) -> bool {
        if notifications_enabled != Some(true) || !is_over_limit {
            return false;
        }

        // Crossing into over-limit is always announced.
        if !was_over_limit {
            return true;
        }

        let Some(last_notification_at) = last_notification_at else {
            return true;
        };

        let interval_seconds = reminder_interval_minutes.max(1).saturating_mul(60);
        (now - last_notification_at).num_seconds() >= interval_seconds
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{OverLimitNotificationPolicy, DEFAULT_REMINDER_INTERVAL_MINUTES};

    fn now() -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_000_000, 0).unwrap()
    }

    #[test]
    fn test_disabled_or_unset_never_notifies() {
        let policy = OverLimitNotificationPolicy;
        assert!(!policy.should_notify(Some(false), true, true, now(), None, 30));
        assert!(!policy.should_notify(None, true, false, now(), None, 30));
    }

    #[test]
    fn test_under_limit_never_notifies() {
        let policy = OverLimitNotificationPolicy;
        assert!(!policy.should_notify(Some(true), false, false, now(), None, 30));
        assert!(!policy.should_notify(Some(true), false, true, now(), None, 30));
    }

    #[test]
    fn test_fresh_crossing_ignores_rate_limit() {
        let policy = OverLimitNotificationPolicy;
        let just_now = Some(now() - Duration::seconds(1));
        assert!(policy.should_notify(Some(true), true, false, now(), just_now, 30));
        assert!(policy.should_notify(Some(true), true, false, now(), None, 30));
    }

    #[test]
    fn test_sustained_without_history_notifies() {
        let policy = OverLimitNotificationPolicy;
        assert!(policy.should_notify(Some(true), true, true, now(), None, 30));
    }

    #[test]
    fn test_interval_boundary_is_inclusive() {
        let policy = OverLimitNotificationPolicy;
        let interval = DEFAULT_REMINDER_INTERVAL_MINUTES;
        let exactly = Some(now() - Duration::seconds(interval * 60));
        let almost = Some(now() - Duration::seconds(interval * 60 - 1));

        assert!(policy.should_notify(Some(true), true, true, now(), exactly, interval));
        assert!(!policy.should_notify(Some(true), true, true, now(), almost, interval));
    }

    #[test]
    fn test_huge_interval_saturates() {
        let policy = OverLimitNotificationPolicy;
        let long_ago = Some(now() - Duration::days(365));
        assert!(!policy.should_notify(Some(true), true, true, now(), long_ago, i64::MAX));
    }

    #[test]
    fn test_interval_below_one_minute_is_raised() {
        let policy = OverLimitNotificationPolicy;
        let last = Some(now() - Duration::seconds(59));
        assert!(!policy.should_notify(Some(true), true, true, now(), last, 0));
        let last = Some(now() - Duration::seconds(60));
        assert!(policy.should_notify(Some(true), true, true, now(), last, -4));
    }
}
