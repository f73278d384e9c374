//! Invoice list filtering by client number and relative period.

use billing_core::models::InvoiceRecord;
use billing_core::period::PeriodKey;
use billing_core::time_utils::{parse_date_in, resolve_local};
use chrono::{DateTime, Months};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Criteria selected in the invoice list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Substring the client number must contain; empty matches everything.
    #[serde(default)]
    pub client_number_substring: String,
    #[serde(default)]
    pub period_key: PeriodKey,
}

impl FilterCriteria {
    pub fn new(client_number_substring: impl Into<String>, period_token: &str) -> Self {
        Self {
            client_number_substring: client_number_substring.into(),
            period_key: PeriodKey::from(period_token),
        }
    }

    /// `true` when neither predicate constrains the listing.
    pub fn is_unconstrained(&self) -> bool {
        self.client_number_substring.is_empty() && self.period_key.lookback().is_none()
    }
}

/// Inclusive `[start, end]` range for the period predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TimeWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl TimeWindow {
    fn ending_at(now: DateTime<Tz>, lookback: Months) -> Option<Self> {
        let start = window_start(&now, lookback)?;
        Some(Self { start, end: now })
    }

    fn contains(&self, moment: &DateTime<Tz>) -> bool {
        self.start <= *moment && *moment <= self.end
    }
}

/// `now` minus `lookback` calendar months.
///
/// The day of month is clamped to the last valid day of the target month
/// (31 March minus one month is 29 February in a leap year). The shifted
/// wall-clock time is resolved with [`resolve_local`], so one that falls
/// into a DST gap moves forward to the end of the gap.
fn window_start(now: &DateTime<Tz>, lookback: Months) -> Option<DateTime<Tz>> {
    let naive = now.naive_local().checked_sub_months(lookback)?;
    resolve_local(&now.timezone(), naive)
}

/// Keep the invoices matching `criteria`, evaluated at `now`.
///
/// Both predicates must hold. Invoices are returned by reference in their
/// input order. Period tokens outside the lookback table disable the period
/// predicate. While a period applies, invoices with an unparseable date are
/// excluded; invoice dates without a zone are read in `now`'s timezone.
pub fn filter_invoices<'a>(
    invoices: &'a [InvoiceRecord],
    criteria: &FilterCriteria,
    now: DateTime<Tz>,
) -> Vec<&'a InvoiceRecord> {
    if let PeriodKey::Unrecognized(token) = &criteria.period_key {
        debug!("Unknown period token {:?}; period filter disabled", token);
    }

    let window = match criteria.period_key.lookback() {
        None => None,
        Some(lookback) => match TimeWindow::ending_at(now, lookback) {
            Some(window) => Some(window),
            None => {
                warn!("Cannot subtract {:?} from {}; no invoice is in range", lookback, now);
                return Vec::new();
            }
        },
    };
    let tz = now.timezone();

    invoices
        .iter()
        .filter(|invoice| {
            invoice
                .client_number
                .contains(criteria.client_number_substring.as_str())
        })
        .filter(|invoice| match &window {
            None => true,
            Some(window) => match parse_date_in(&invoice.date, &tz) {
                Some(date) => window.contains(&date),
                None => {
                    debug!(
                        "Invoice {:?} has unparseable date {:?}; outside any period",
                        invoice.file_name, invoice.date
                    );
                    false
                }
            },
        })
        .collect()
}
