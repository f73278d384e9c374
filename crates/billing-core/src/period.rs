//! Relative lookback windows selected by short period tokens.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::Months;
use serde::{Deserialize, Serialize};

/// A period token as chosen in the invoice list.
///
/// The recognised tokens are `""`/`"all"` (no window), `"1m"`, `"3m"`,
/// `"6m"` and `"1y"`. Any other text is kept as [`PeriodKey::Unrecognized`]
/// and behaves exactly like [`PeriodKey::All`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PeriodKey {
    #[default]
    All,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    Unrecognized(String),
}

impl PeriodKey {
    /// Lookback length in calendar months, or `None` when no window applies.
    pub fn lookback(&self) -> Option<Months> {
        match self {
            PeriodKey::OneMonth => Some(Months::new(1)),
            PeriodKey::ThreeMonths => Some(Months::new(3)),
            PeriodKey::SixMonths => Some(Months::new(6)),
            PeriodKey::OneYear => Some(Months::new(12)),
            PeriodKey::All | PeriodKey::Unrecognized(_) => None,
        }
    }

    /// The token text this key was parsed from (`"all"` for the empty token).
    pub fn as_token(&self) -> &str {
        match self {
            PeriodKey::All => "all",
            PeriodKey::OneMonth => "1m",
            PeriodKey::ThreeMonths => "3m",
            PeriodKey::SixMonths => "6m",
            PeriodKey::OneYear => "1y",
            PeriodKey::Unrecognized(s) => s,
        }
    }

    /// Human label used in reports, matching the list-tab options.
    pub fn label(&self) -> &str {
        match self {
            PeriodKey::All => "Todos os períodos",
            PeriodKey::OneMonth => "Último mês",
            PeriodKey::ThreeMonths => "Últimos 3 meses",
            PeriodKey::SixMonths => "Últimos 6 meses",
            PeriodKey::OneYear => "Último ano",
            PeriodKey::Unrecognized(_) => "Todos os períodos",
        }
    }
}

impl From<&str> for PeriodKey {
    fn from(token: &str) -> Self {
        match token {
            "" | "all" => PeriodKey::All,
            "1m" => PeriodKey::OneMonth,
            "3m" => PeriodKey::ThreeMonths,
            "6m" => PeriodKey::SixMonths,
            "1y" => PeriodKey::OneYear,
            other => PeriodKey::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for PeriodKey {
    fn from(token: String) -> Self {
        PeriodKey::from(token.as_str())
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.as_token().to_string()
    }
}

impl FromStr for PeriodKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PeriodKey::from(s))
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}
