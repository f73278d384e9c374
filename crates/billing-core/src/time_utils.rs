use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── Invoice date parsing ──────────────────────────────────────────────────────

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parse an invoice date string into a moment in `tz`.
///
/// Accepted forms, tried in order:
/// * RFC 3339 with an offset or `Z` suffix (converted into `tz`).
/// * Naive date-times such as `2024-01-15T10:00:00`.
/// * Calendar dates `2024-01-15` and `15/01/2024` (midnight).
/// * Billing months `01/2024` (first day of the month, midnight).
///
/// Naive values are read as local time in `tz` through [`resolve_local`].
/// Returns `None` for anything else.
pub fn parse_date_in(s: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(tz));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return resolve_local(tz, naive);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return resolve_local(tz, date.and_hms_opt(0, 0, 0)?);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&format!("01/{}", s), "%d/%m/%Y") {
        return resolve_local(tz, date.and_hms_opt(0, 0, 0)?);
    }

    None
}

/// Offset transitions all fall on quarter-hour boundaries.
const GAP_STEP_MINUTES: i64 = 15;

/// Longest gap searched; the widest on record skipped a whole day.
const MAX_GAP_MINUTES: i64 = 26 * 60;

/// Interpret `naive` as local time in `tz`.
///
/// A local time repeated by a backward transition resolves to its earlier
/// instant. A local time skipped by a forward transition resolves to the
/// first instant after the gap, so 00:30 on a day whose clocks jump from
/// 00:00 to 01:00 becomes 01:00 at the new offset.
pub fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => (1..=MAX_GAP_MINUTES / GAP_STEP_MINUTES).find_map(|step| {
            let shifted =
                naive.checked_add_signed(Duration::minutes(step * GAP_STEP_MINUTES))?;
            tz.from_local_datetime(&shifted).earliest()
        }),
    }
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Supplies "now" and date parsing for one configured timezone.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    default_tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler for the given IANA timezone name.
    ///
    /// If `tz_name` is not a recognised IANA timezone, falls back to UTC
    /// and logs a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { default_tz: tz }
    }

    /// The current moment in the configured timezone.
    pub fn now(&self) -> DateTime<Tz> {
        self.at(Utc::now())
    }

    /// `instant` expressed in the configured timezone.
    pub fn at(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.default_tz)
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    pub fn default_tz(&self) -> Tz {
        self.default_tz
    }
}
