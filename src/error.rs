use thiserror::Error;

use crate::scraper::units::UnitParseError;

/// Everything that can go wrong while fetching one symbol's holdings.
///
/// Navigation failures are *soft*: the page or the page-size control was not
/// there, which usually means a bad ticker. Everything else is fatal for the
/// symbol but never for the rest of the queue — the pipeline decides
/// continuation policy, not the error type.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("navigation failed for {symbol}: {reason}")]
    Navigation { symbol: String, reason: String },

    #[error("pagination indicator stayed stale after one retry")]
    StalePagination,

    #[error("page {page} did not change after {attempts} polls")]
    StabilityTimeout { page: u32, attempts: u32 },

    #[error("no holdings table found in page source")]
    MissingTable,

    #[error("row has {found} columns, expected {expected}")]
    SchemaDrift { expected: usize, found: usize },

    #[error(transparent)]
    Parse(#[from] UnitParseError),

    #[error(transparent)]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl FetchError {
    /// Soft failures skip the symbol without noise; anything else is logged
    /// as an error before moving on.
    pub fn is_soft(&self) -> bool {
        matches!(self, FetchError::Navigation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_is_soft() {
        let e = FetchError::Navigation {
            symbol: "BAD".into(),
            reason: "no such element".into(),
        };
        assert!(e.is_soft());
    }

    #[test]
    fn timeout_is_fatal() {
        let e = FetchError::StabilityTimeout { page: 2, attempts: 120 };
        assert!(!e.is_soft());
    }
}
