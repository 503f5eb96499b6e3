//! Week-long time windows relative to a fixed epoch.
//!
//! Window `i` spans `[epoch + 7i days, epoch + 7(i+1) days]`, inclusive on
//! both ends. Because both ends are inclusive, an event stamped exactly on a
//! boundary instant belongs to the two adjacent windows.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use quake_map_quake_models::{Event, TimeWindow};

/// Length of one window in days.
pub const WINDOW_DAYS: i64 = 7;

/// Errors raised when resolving a week index to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    /// The index is not in `[0, total)`.
    #[error("week index {index} is out of range: {total} windows available")]
    OutOfRange {
        /// Requested index.
        index: u32,
        /// Number of windows between the epoch and now.
        total: u32,
    },

    /// The window would fall outside the representable date range.
    #[error("week index {index} overflows the supported date range")]
    Overflow {
        /// Requested index.
        index: u32,
    },
}

/// Midnight UTC of `date`, the instant week 0 starts.
#[must_use]
pub fn epoch_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Computes window `index` without checking it against the current time.
///
/// # Errors
///
/// Returns [`WindowError::Overflow`] if the window lies beyond the range
/// `chrono` can represent.
pub fn compute_window(epoch: DateTime<Utc>, index: u32) -> Result<TimeWindow, WindowError> {
    let overflow = WindowError::Overflow { index };
    let offset = TimeDelta::try_days(i64::from(index) * WINDOW_DAYS).ok_or(overflow)?;
    let length = TimeDelta::try_days(WINDOW_DAYS).ok_or(overflow)?;
    let start = epoch.checked_add_signed(offset).ok_or(overflow)?;
    let end = start.checked_add_signed(length).ok_or(overflow)?;
    Ok(TimeWindow { index, start, end })
}

/// Number of windows between `epoch` and `now`, rounding a partial week up.
///
/// Returns 0 when `now` is not after `epoch`.
#[must_use]
pub fn total_windows(epoch: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let elapsed = now - epoch;
    if elapsed <= TimeDelta::zero() {
        return 0;
    }

    let full_weeks = elapsed.num_weeks();
    let total = if TimeDelta::weeks(full_weeks) < elapsed {
        full_weeks + 1
    } else {
        full_weeks
    };

    u32::try_from(total).unwrap_or(u32::MAX)
}

/// Computes window `index`, rejecting indices outside `[0, total_windows)`.
///
/// # Errors
///
/// Returns [`WindowError::OutOfRange`] if `index >= total_windows(epoch, now)`.
pub fn checked_window(
    epoch: DateTime<Utc>,
    index: u32,
    now: DateTime<Utc>,
) -> Result<TimeWindow, WindowError> {
    let total = total_windows(epoch, now);
    if index >= total {
        return Err(WindowError::OutOfRange { index, total });
    }
    compute_window(epoch, index)
}

/// Returns the events whose timestamp falls inside `window`, in input order.
///
/// Events with an unparseable timestamp are skipped.
pub fn select_events<'a, I>(events: I, window: &TimeWindow) -> Vec<&'a Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    events
        .into_iter()
        .filter(|event| {
            event.occurred_at().map_or_else(
                || {
                    log::warn!(
                        "Skipping event {} with invalid timestamp '{}'",
                        event.id,
                        event.timestamp
                    );
                    false
                },
                |at| window.contains(at),
            )
        })
        .collect()
}
