//! Daily broadcast scheduling.
//!
//! The schedule is a single wall-clock time of day in the host's local zone.
//! The loop recomputes the next occurrence after every firing, so clock
//! adjustments and DST transitions re-anchor instead of drifting.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use chrono::{DateTime, Days, Local, LocalResult, NaiveTime, TimeZone};
use tracing::{debug, info};

use crate::app::{AppState, BroadcastOutcome};
use crate::delivery::MessageTransport;

/// A time of day, valid in any zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSpec {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl ScheduleSpec {
    pub fn new(hour: u32, minute: u32, second: u32) -> Result<Self> {
        ensure!(
            hour < 24 && minute < 60 && second < 60,
            "schedule {hour:02}:{minute:02}:{second:02} out of range"
        );
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    /// First moment strictly after `now` at which this time of day occurs.
    ///
    /// DST makes two wall-clock cases possible: a time that does not exist on
    /// some day (spring-forward gap) is skipped to the next day, and a time
    /// that exists twice (fall-back) fires at its first occurrence.
    pub fn next_occurrence_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let target = NaiveTime::from_hms_opt(self.hour, self.minute, self.second)
            .unwrap_or_default();
        let tz = now.timezone();
        for days_ahead in 0..=2u64 {
            let Some(date) = now.date_naive().checked_add_days(Days::new(days_ahead)) else {
                continue;
            };
            let candidate = match date.and_time(target).and_local_timezone(tz.clone()) {
                LocalResult::Single(dt) => dt,
                LocalResult::Ambiguous(first, _) => first,
                LocalResult::None => continue,
            };
            if candidate > *now {
                return candidate;
            }
        }
        // Three consecutive unusable days cannot happen in real zones.
        now.clone() + chrono::Duration::days(1)
    }
}

impl FromStr for ScheduleSpec {
    type Err = anyhow::Error;

    /// Accepts `HH:MM` or `HH:MM:SS`.
    fn from_str(raw: &str) -> Result<Self> {
        let fields: Vec<&str> = raw.trim().split(':').collect();
        let (h, m, s) = match fields.as_slice() {
            [h, m] => (*h, *m, "0"),
            [h, m, s] => (*h, *m, *s),
            _ => anyhow::bail!("schedule must be HH:MM or HH:MM:SS, got {raw:?}"),
        };
        let hour = h.trim().parse().with_context(|| format!("bad hour in {raw:?}"))?;
        let minute = m.trim().parse().with_context(|| format!("bad minute in {raw:?}"))?;
        let second = s.trim().parse().with_context(|| format!("bad second in {raw:?}"))?;
        Self::new(hour, minute, second)
    }
}

impl fmt::Display for ScheduleSpec {
    /// 12-hour form as shown to subscribers, e.g. `8:00 AM`. Seconds appear
    /// only when nonzero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meridiem = if self.hour < 12 { "AM" } else { "PM" };
        let hour12 = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        if self.second == 0 {
            write!(f, "{hour12}:{:02} {meridiem}", self.minute)
        } else {
            write!(f, "{hour12}:{:02}:{:02} {meridiem}", self.minute, self.second)
        }
    }
}

/// Sleep until each next occurrence of the configured time and broadcast the
/// digest of the day. Runs for the life of the process.
pub async fn run_daily<T: MessageTransport>(app: Arc<AppState<T>>) -> Result<()> {
    info!(schedule = %app.schedule, "daily broadcast scheduler started");
    loop {
        let now = Local::now();
        let next = app.schedule.next_occurrence_after(&now);
        let wait = (next - now).to_std().unwrap_or(std::time::Duration::ZERO);
        debug!(next = %next.format("%Y-%m-%d %H:%M:%S %Z"), "sleeping until next broadcast");
        tokio::time::sleep(wait).await;
        match app.broadcast_digest().await {
            BroadcastOutcome::Skipped => {
                info!("no news available; daily broadcast skipped");
            }
            BroadcastOutcome::Sent(summary) => {
                info!(
                    delivered = summary.delivered,
                    failed = summary.failed.len(),
                    "daily broadcast complete"
                );
            }
        }
    }
}
