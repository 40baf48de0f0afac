//! Time entry validation rules.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use ziklo_shared::BusinessConfig;

use super::error::TimesheetError;

/// Business rules applied to every time entry write.
#[derive(Debug, Clone, Copy)]
pub struct TimesheetRules {
    timezone: Tz,
    max_hours_per_day: Decimal,
}

impl TimesheetRules {
    /// Create rules from a timezone and daily limit.
    #[must_use]
    pub fn new(timezone: Tz, max_hours_per_day: Decimal) -> Self {
        Self {
            timezone,
            max_hours_per_day,
        }
    }

    /// Build rules from configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimezone` if the timezone is not an IANA name.
    pub fn from_config(config: &BusinessConfig) -> Result<Self, TimesheetError> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| TimesheetError::InvalidTimezone(config.timezone.clone()))?;
        Ok(Self::new(timezone, config.max_hours_per_day))
    }

    /// The business timezone.
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Configured daily limit.
    #[must_use]
    pub fn max_hours_per_day(&self) -> Decimal {
        self.max_hours_per_day
    }

    /// Parse `YYYY-MM-DD`, or an RFC 3339 timestamp converted to the calendar
    /// date in the business timezone.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDate` if neither format matches.
    pub fn parse_date(&self, raw: &str) -> Result<NaiveDate, TimesheetError> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&self.timezone).date_naive())
            .map_err(|_| TimesheetError::InvalidDate(raw.to_string()))
    }

    /// Hours must be strictly positive.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHours` otherwise.
    pub fn validate_hours(&self, hours: Decimal) -> Result<(), TimesheetError> {
        if hours <= Decimal::ZERO {
            return Err(TimesheetError::InvalidHours(hours));
        }
        Ok(())
    }

    /// Check `already_logged + hours` against the daily limit.
    ///
    /// # Errors
    ///
    /// Returns `DailyLimitExceeded` with the would-be total.
    pub fn check_daily_limit(
        &self,
        already_logged: Decimal,
        hours: Decimal,
    ) -> Result<(), TimesheetError> {
        let total = already_logged + hours;
        if total > self.max_hours_per_day {
            return Err(TimesheetError::DailyLimitExceeded {
                total,
                max: self.max_hours_per_day,
            });
        }
        Ok(())
    }
}
