//! # Schedule Rules
//!
//! Time-dependent derivations for bookings and the dashboard. "Now" is
//! always a parameter.
//!
//! ## Display Status
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  persisted CONFIRMED only:                                              │
//! │                                                                         │
//! │        start                      end                                   │
//! │  ───────┼──────────────────────────┼──────────────────► time            │
//! │  CONFIRMED  │        ONGOING        │      OVERDUE                      │
//! │                                                                         │
//! │  no end date: ONGOING forever once started                              │
//! │  CANCELLED / COMPLETED pass through unchanged                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;
use crate::types::{BookingStatus, DisplayStatus, RefundStatus};
use crate::REFUND_NOTICE_DAYS;

// =============================================================================
// Booking Window & Display Status
// =============================================================================

/// The period a booking reserves a vehicle for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookingWindow {
    #[ts(as = "String")]
    pub start: DateTime<Utc>,

    /// Open-ended when absent.
    #[ts(as = "Option<String>")]
    pub end: Option<DateTime<Utc>>,
}

impl BookingWindow {
    #[inline]
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        BookingWindow { start, end }
    }

    /// `start <= now` and (no end, or `now <= end`).
    ///
    /// This is also the "vehicle occupied" test on the dashboard.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && self.end.map_or(true, |end| now <= end)
    }

    /// An end date exists and has passed.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.end.is_some_and(|end| now > end)
    }
}

/// Derives what a booking list shows at `now`.
///
/// Only CONFIRMED bookings are re-derived; the overdue check runs first so
/// a booking whose end has passed never shows as ongoing.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use tourbiller_core::schedule::{derive_display_status, BookingWindow};
/// use tourbiller_core::{BookingStatus, DisplayStatus};
///
/// let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
/// let window = BookingWindow::new(now - Duration::hours(1), Some(now + Duration::hours(1)));
/// assert_eq!(derive_display_status(BookingStatus::Confirmed, &window, now), DisplayStatus::Ongoing);
/// assert_eq!(derive_display_status(BookingStatus::Cancelled, &window, now), DisplayStatus::Cancelled);
/// ```
pub fn derive_display_status(
    status: BookingStatus,
    window: &BookingWindow,
    now: DateTime<Utc>,
) -> DisplayStatus {
    match status {
        BookingStatus::Cancelled => DisplayStatus::Cancelled,
        BookingStatus::Completed => DisplayStatus::Completed,
        BookingStatus::Confirmed => {
            if window.is_overdue_at(now) {
                DisplayStatus::Overdue
            } else if window.start <= now {
                DisplayStatus::Ongoing
            } else {
                DisplayStatus::Confirmed
            }
        }
    }
}

// =============================================================================
// Cancellation
// =============================================================================

/// Whole days from `now` until `start`, rounded up. Negative once started.
pub fn days_until(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    let ms = (start - now).num_milliseconds();
    (ms + DAY_MS - 1).div_euclid(DAY_MS)
}

/// Refund decision for cancelling a booking at `now`.
///
/// `None` when no advance was paid. Otherwise REFUNDED with more than
/// [`REFUND_NOTICE_DAYS`] days of notice, FORFEITED with less.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use tourbiller_core::schedule::decide_refund;
/// use tourbiller_core::{Money, RefundStatus};
///
/// let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
/// let advance = Money::from_major(1000);
/// assert_eq!(decide_refund(advance, now + Duration::days(8), now), Some(RefundStatus::Refunded));
/// assert_eq!(decide_refund(advance, now + Duration::days(3), now), Some(RefundStatus::Forfeited));
/// assert_eq!(decide_refund(Money::zero(), now + Duration::days(30), now), None);
/// ```
pub fn decide_refund(
    advance: Money,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<RefundStatus> {
    if !advance.is_positive() {
        return None;
    }

    if days_until(start, now) > REFUND_NOTICE_DAYS {
        Some(RefundStatus::Refunded)
    } else {
        Some(RefundStatus::Forfeited)
    }
}

/// Result of a permitted cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cancellation {
    pub status: BookingStatus,
    pub refund_status: Option<RefundStatus>,
}

/// Checks that a booking may be cancelled and decides its refund.
///
/// Only CONFIRMED bookings can be cancelled.
pub fn cancel_booking(
    booking_id: &str,
    current_status: BookingStatus,
    advance: Money,
    start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Cancellation, CoreError> {
    if current_status != BookingStatus::Confirmed {
        return Err(CoreError::BookingNotCancellable {
            booking_id: booking_id.to_string(),
            current_status,
        });
    }

    Ok(Cancellation {
        status: BookingStatus::Cancelled,
        refund_status: decide_refund(advance, start, now),
    })
}

/// Checks that a bill may close the booking.
pub fn ensure_completable(booking_id: &str, current_status: BookingStatus) -> Result<(), CoreError> {
    match current_status {
        BookingStatus::Confirmed => Ok(()),
        other => Err(CoreError::BookingNotCompletable {
            booking_id: booking_id.to_string(),
            current_status: other,
        }),
    }
}

// =============================================================================
// Fleet Availability
// =============================================================================

/// `max(0, total - occupied)`.
#[inline]
pub fn available_vehicles(total: i64, occupied: i64) -> i64 {
    (total - occupied).max(0)
}

// =============================================================================
// Revenue Windows
// =============================================================================

/// An inclusive range of instants used to filter bills by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RevenueWindow {
    #[ts(as = "String")]
    pub start: DateTime<Utc>,

    #[ts(as = "String")]
    pub end: DateTime<Utc>,
}

impl RevenueWindow {
    /// The calendar year containing `now`, in the zone of `now`.
    ///
    /// Jan 1 00:00:00.000 through Dec 31 23:59:59.999.
    pub fn yearly<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let year_start = today - Duration::days(i64::from(today.ordinal0()));
        let next_year = year_start + Duration::days(days_in_year(today.year()));
        Self::between(&tz, year_start, next_year)
    }

    /// The Monday-to-Sunday week containing `now`, in the zone of `now`.
    ///
    /// A Sunday belongs to the week that started six days earlier.
    pub fn weekly<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        Self::between(&tz, monday, monday + Duration::days(7))
    }

    fn between<Tz: TimeZone>(tz: &Tz, first_day: NaiveDate, next_period: NaiveDate) -> Self {
        RevenueWindow {
            start: local_midnight(tz, first_day),
            end: local_midnight(tz, next_period) - Duration::milliseconds(1),
        }
    }

    #[inline]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// [`RevenueWindow::yearly`] as a free function.
pub fn yearly_window<Tz: TimeZone>(now: &DateTime<Tz>) -> RevenueWindow {
    RevenueWindow::yearly(now)
}

/// [`RevenueWindow::weekly`] as a free function.
pub fn weekly_window<Tz: TimeZone>(now: &DateTime<Tz>) -> RevenueWindow {
    RevenueWindow::weekly(now)
}

/// Sums the amounts whose timestamp falls inside `window`.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use tourbiller_core::schedule::{sum_revenue, RevenueWindow};
/// use tourbiller_core::Money;
///
/// let now = Utc.with_ymd_and_hms(2025, 6, 4, 12, 0, 0).unwrap();
/// let week = RevenueWindow::weekly(&now);
/// let bills = [
///     (Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(), Money::from_major(100)),
///     (Utc.with_ymd_and_hms(2025, 6, 1, 23, 59, 59).unwrap(), Money::from_major(999)),
/// ];
/// assert_eq!(sum_revenue(bills, &week), Money::from_major(100));
/// ```
pub fn sum_revenue<I>(entries: I, window: &RevenueWindow) -> Money
where
    I: IntoIterator<Item = (DateTime<Utc>, Money)>,
{
    entries
        .into_iter()
        .filter(|(at, _)| window.contains(*at))
        .map(|(_, amount)| amount)
        .sum()
}

fn days_in_year(year: i32) -> i64 {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    if leap {
        366
    } else {
        365
    }
}

/// Local midnight of `date` as a UTC instant.
///
/// A midnight skipped by a DST jump falls back to reading the wall time as UTC.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_display_status_boundaries() {
        let now = noon();
        let hour = Duration::hours(1);

        let ongoing = BookingWindow::new(now - hour, Some(now + hour));
        let overdue = BookingWindow::new(now - hour * 3, Some(now - hour));
        let future = BookingWindow::new(now + hour, Some(now + hour * 5));
        let open = BookingWindow::new(now - hour * 100, None);

        let confirmed = BookingStatus::Confirmed;
        assert_eq!(derive_display_status(confirmed, &ongoing, now), DisplayStatus::Ongoing);
        assert_eq!(derive_display_status(confirmed, &overdue, now), DisplayStatus::Overdue);
        assert_eq!(derive_display_status(confirmed, &future, now), DisplayStatus::Confirmed);
        assert_eq!(derive_display_status(confirmed, &open, now), DisplayStatus::Ongoing);
    }

    #[test]
    fn test_display_status_exact_edges() {
        let now = noon();
        // starts exactly now
        let window = BookingWindow::new(now, Some(now + Duration::hours(1)));
        assert_eq!(
            derive_display_status(BookingStatus::Confirmed, &window, now),
            DisplayStatus::Ongoing
        );
        // ends exactly now
        let window = BookingWindow::new(now - Duration::hours(1), Some(now));
        assert_eq!(
            derive_display_status(BookingStatus::Confirmed, &window, now),
            DisplayStatus::Ongoing
        );
    }

    #[test]
    fn test_terminal_statuses_pass_through() {
        let now = noon();
        let window = BookingWindow::new(now - Duration::days(3), Some(now - Duration::days(1)));
        assert_eq!(
            derive_display_status(BookingStatus::Completed, &window, now),
            DisplayStatus::Completed
        );
        assert_eq!(
            derive_display_status(BookingStatus::Cancelled, &window, now),
            DisplayStatus::Cancelled
        );
    }

    #[test]
    fn test_is_active_at() {
        let now = noon();
        assert!(BookingWindow::new(now - Duration::days(1), None).is_active_at(now));
        assert!(!BookingWindow::new(now + Duration::seconds(1), None).is_active_at(now));
        assert!(!BookingWindow::new(now - Duration::days(2), Some(now - Duration::days(1)))
            .is_active_at(now));
    }

    #[test]
    fn test_refund_rounds_partial_days_up() {
        let now = noon();
        let advance = Money::from_major(1000);

        // 7 days and 1 minute of notice counts as 8 days
        let start = now + Duration::days(7) + Duration::minutes(1);
        assert_eq!(days_until(start, now), 8);
        assert_eq!(decide_refund(advance, start, now), Some(RefundStatus::Refunded));

        // exactly 7 days is not enough
        let start = now + Duration::days(7);
        assert_eq!(days_until(start, now), 7);
        assert_eq!(decide_refund(advance, start, now), Some(RefundStatus::Forfeited));
    }

    #[test]
    fn test_refund_after_start_is_forfeited() {
        let now = noon();
        let start = now - Duration::days(2);
        assert_eq!(
            decide_refund(Money::from_major(500), start, now),
            Some(RefundStatus::Forfeited)
        );
    }

    #[test]
    fn test_cancel_only_confirmed() {
        let now = noon();
        let start = now + Duration::days(10);

        let cancelled = cancel_booking("b-1", BookingStatus::Confirmed, Money::from_major(1000), start, now)
            .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.refund_status, Some(RefundStatus::Refunded));

        let err = cancel_booking("b-1", BookingStatus::Completed, Money::zero(), start, now).unwrap_err();
        assert!(matches!(err, CoreError::BookingNotCancellable { .. }));

        assert!(ensure_completable("b-1", BookingStatus::Confirmed).is_ok());
        assert!(ensure_completable("b-1", BookingStatus::Cancelled).is_err());
    }

    #[test]
    fn test_available_vehicles_floors_at_zero() {
        assert_eq!(available_vehicles(10, 3), 7);
        assert_eq!(available_vehicles(2, 5), 0);
    }

    #[test]
    fn test_yearly_window_utc() {
        let window = RevenueWindow::yearly(&noon());
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap() + Duration::milliseconds(999)
        );
    }

    #[test]
    fn test_yearly_window_leap_year() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 18, 0, 0).unwrap();
        let window = yearly_window(&now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert!(window.contains(now));
        assert!(!window.contains(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_weekly_window_starts_monday() {
        // 2025-06-04 is a Wednesday
        let window = weekly_window(&noon());
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap());
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2025, 6, 8, 23, 59, 59).unwrap() + Duration::milliseconds(999)
        );
    }

    #[test]
    fn test_weekly_window_on_sunday_looks_back() {
        let sunday = Utc.with_ymd_and_hms(2025, 6, 8, 20, 0, 0).unwrap();
        let window = RevenueWindow::weekly(&sunday);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_weekly_window_in_local_zone() {
        // Colombo, UTC+05:30. Monday 01:00 local is still Sunday in UTC.
        let colombo = FixedOffset::east_opt(330 * 60).unwrap();
        let now = colombo.with_ymd_and_hms(2025, 6, 2, 1, 0, 0).unwrap();

        let window = RevenueWindow::weekly(&now);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 6, 1, 18, 30, 0).unwrap());
        assert!(window.contains(now.with_timezone(&Utc)));
    }

    #[test]
    fn test_sum_revenue_inclusive_bounds() {
        let window = RevenueWindow::weekly(&noon());
        let entries = vec![
            (window.start, Money::from_major(10)),
            (window.end, Money::from_major(20)),
            (window.end + Duration::milliseconds(1), Money::from_major(40)),
            (window.start - Duration::milliseconds(1), Money::from_major(80)),
        ];
        assert_eq!(sum_revenue(entries, &window), Money::from_major(30));
    }
}
