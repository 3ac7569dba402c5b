// =============================================================================
// Daily Scheduler — fire an injected job once per day at a local time
// =============================================================================
//
// The scheduler owns no application state.  It only computes the next slot,
// sleeps until then, and awaits the job it was handed.  Jobs run inline, so
// one scheduler never overlaps itself.
// =============================================================================

use std::future::Future;

use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, TimeZone};
use tracing::{debug, info};

/// Next occurrence of `at` strictly after `now`: today if still ahead,
/// otherwise tomorrow.
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Resolve a local wall-clock time to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times that do not
/// exist (DST spring-forward gap) move forward minute by minute until valid.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, mut naive: NaiveDateTime) -> DateTime<Tz> {
    loop {
        if let Some(instant) = tz.from_local_datetime(&naive).earliest() {
            return instant;
        }
        naive += Duration::minutes(1);
    }
}

/// Run `job` every day at local time `at`, forever.
pub async fn run_daily<F, Fut>(at: NaiveTime, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    info!(at = %at, "scheduler started");

    loop {
        let now = Local::now();
        let next = resolve_local(&Local, next_run_after(now.naive_local(), at));
        let wait = (next - now).to_std().unwrap_or_default();

        debug!(next_run = %next, wait_secs = wait.as_secs(), "sleeping until next run");
        tokio::time::sleep(wait).await;

        info!(scheduled_for = %next, "scheduled run firing");
        job().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn later_today() {
        assert_eq!(next_run_after(dt(10, 9, 0), at(20, 50)), dt(10, 20, 50));
    }

    #[test]
    fn already_passed_rolls_to_tomorrow() {
        assert_eq!(next_run_after(dt(10, 21, 0), at(20, 50)), dt(11, 20, 50));
    }

    #[test]
    fn exactly_now_rolls_to_tomorrow() {
        assert_eq!(next_run_after(dt(10, 20, 50), at(20, 50)), dt(11, 20, 50));
    }

    #[test]
    fn month_boundary() {
        let now = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        assert_eq!(next_run_after(now, at(20, 50)), dt(1, 20, 50));
    }

    #[test]
    fn resolve_fixed_offset() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let instant = resolve_local(&ist, dt(10, 20, 50));
        assert_eq!(instant.naive_local(), dt(10, 20, 50));
        assert_eq!(instant.naive_utc(), dt(10, 15, 20));
    }

    #[tokio::test(start_paused = true)]
    async fn run_daily_fires_job() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let slot = (Local::now() + Duration::minutes(1)).time();

        let handle = tokio::spawn(run_daily(slot, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        // Paused clock auto-advances through the sleep.
        tokio::time::sleep(std::time::Duration::from_secs(3 * 60)).await;
        handle.abort();
        assert!(fired.load(Ordering::SeqCst) >= 1);
    }
}
