use chrono::{Duration, NaiveDate, Utc};

// Finnhub expects plain calendar dates for news windows.
const PROVIDER_DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive `[from, to]` window in the provider's date-string format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub from: String,
    pub to: String,
}

impl DateRange {
    pub fn days_back(days: i64, today: NaiveDate) -> Self {
        let from = today - Duration::days(days);
        Self {
            from: from.format(PROVIDER_DATE_FORMAT).to_string(),
            to: today.format(PROVIDER_DATE_FORMAT).to_string(),
        }
    }

    pub fn days_back_from_today(days: i64) -> Self {
        Self::days_back(days, Utc::now().date_naive())
    }
}

/// Human-readable date for email subject/body lines, e.g. "January 2, 2026".
pub fn formatted_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn formatted_today() -> String {
    formatted_date(Utc::now().date_naive())
}
