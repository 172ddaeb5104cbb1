//! Deadline text from the job sites comes in several shapes ("D-5", "~03/14(금)",
//! "2025.03.14", "오늘마감", "상시채용", ...). This module turns it into an
//! end-of-day instant in Korean civil time.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Offset, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// UTC+9, the civil time all deadlines are published in.
pub const REFERENCE_OFFSET_SECS: i32 = 9 * 3600;

/// Year used for postings that never close.
pub const OPEN_ENDED_YEAR: i32 = 9999;

const DUE_TODAY_MARKER: &str = "오늘마감";
const OPEN_ENDED_MARKERS: [&str; 2] = ["상시", "채용시"];

static D_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)D-(\d+)").expect("D-day pattern is valid"));
static WEEKDAY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.\)").expect("weekday pattern is valid"));
static MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})").expect("month/day pattern is valid"));
static FULL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})[.-](\d{1,2})[.-](\d{1,2})").expect("full date pattern is valid")
});

pub fn reference_offset() -> FixedOffset {
    FixedOffset::east_opt(REFERENCE_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current instant expressed in the reference offset. Never consults the host timezone.
pub fn reference_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&reference_offset())
}

/// Parse deadline text relative to `now`.
///
/// Returns `None` when the text matches no known form; callers treat that as
/// "keep the posting". Forms are tried in order: due-today markers, `D-N`
/// (`D-0` is today), `MM/DD`, `YYYY.MM.DD` / `YYYY-MM-DD`, then open-ended markers.
///
/// `D-0` is read as a zero-day count, not a substring: `D-05` is five days
/// out, not due today.
///
/// `MM/DD` carries no year. The current year is assumed unless the month is
/// more than one month behind `now`, in which case the date is read as next
/// year. This heuristic is not verified around year boundaries; see DESIGN.md.
pub fn parse_deadline(text: &str, now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let clean: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if clean.is_empty() {
        return None;
    }

    let today = now.with_timezone(&reference_offset()).date_naive();

    if is_due_today(&clean) {
        return end_of_day(today);
    }

    if let Some(caps) = D_DAY.captures(&clean) {
        let days: u64 = caps[1].parse().ok()?;
        return today.checked_add_days(Days::new(days)).and_then(end_of_day);
    }

    let date_part = clean.replacen('~', "", 1);
    let date_part = WEEKDAY_SUFFIX.replace(&date_part, "");

    if let Some(caps) = MONTH_DAY.captures(&date_part) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let mut year = today.year();
        if i64::from(month) < i64::from(today.month()) - 1 {
            year += 1;
        }
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return end_of_day(date);
        }
    }

    if let Some(caps) = FULL_DATE.captures(&date_part) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return end_of_day(date);
        }
    }

    if OPEN_ENDED_MARKERS.iter().any(|m| clean.contains(m)) {
        return NaiveDate::from_ymd_opt(OPEN_ENDED_YEAR, 12, 31).and_then(end_of_day);
    }

    tracing::trace!(deadline = text, "unrecognized deadline format");
    None
}

/// True when the deadline parses to an instant strictly before `now`.
pub fn is_expired(text: &str, now: DateTime<FixedOffset>) -> bool {
    matches!(parse_deadline(text, now), Some(deadline) if deadline < now)
}

fn is_due_today(clean: &str) -> bool {
    clean.to_lowercase().contains("today") || clean.contains(DUE_TODAY_MARKER)
}

fn end_of_day(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.and_hms_milli_opt(23, 59, 59, 999)?
        .and_local_timezone(reference_offset())
        .single()
}
