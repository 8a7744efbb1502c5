//! Whole-expression validation for EventBridge cron schedules
//!
//! Accepts either the bare six fields (`0 8 ? * MON-FRI *`) or the
//! schedule-expression form (`cron(0 8 ? * MON-FRI *)`).

use super::expression::{CronExpression, CronField};
use super::grammar::CronGrammar;
use crate::error::{Error, Result};

/// Validator for AWS EventBridge cron expressions
pub struct AwsCronValidator;

impl AwsCronValidator {
    /// Validate an expression against the global grammar
    ///
    /// # Examples
    ///
    /// ```
    /// use rag_ops::AwsCronValidator;
    ///
    /// let expr = AwsCronValidator::validate("0 8 ? * MON-FRI *").unwrap();
    /// assert_eq!(expr.schedule_expression(), "cron(0 8 ? * MON-FRI *)");
    ///
    /// assert!(AwsCronValidator::validate("0 8 * * *").is_err());
    /// ```
    pub fn validate(input: &str) -> Result<CronExpression> {
        Self::validate_with(CronGrammar::global(), input)
    }

    /// Validate an expression against an explicit grammar
    pub fn validate_with(grammar: &CronGrammar, input: &str) -> Result<CronExpression> {
        let body = strip_schedule_wrapper(input);
        let parts: Vec<&str> = body.split_whitespace().collect();

        if parts.len() != CronField::ALL.len() {
            return Err(Error::InvalidCron(format!(
                "Expected 6 fields (minute hour day-of-month month day-of-week year), got {}",
                parts.len()
            )));
        }

        for field in CronField::ALL {
            let value = parts[field.position()];
            if !grammar.matches(field, value) {
                tracing::debug!(field = %field, value = %value, "Cron field rejected");
                return Err(Error::InvalidCronField {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }

        check_day_exclusivity(
            parts[CronField::DayOfMonth.position()],
            parts[CronField::DayOfWeek.position()],
        )?;

        let fields = [
            parts[0].to_string(),
            parts[1].to_string(),
            parts[2].to_string(),
            parts[3].to_string(),
            parts[4].to_string(),
            parts[5].to_string(),
        ];
        Ok(CronExpression::from_fields(fields))
    }

    /// Boolean form of [`AwsCronValidator::validate`]
    pub fn is_valid(input: &str) -> bool {
        Self::validate(input).is_ok()
    }
}

/// Strip surrounding whitespace and an optional `cron( ... )` wrapper
fn strip_schedule_wrapper(input: &str) -> &str {
    let trimmed = input.trim();
    trimmed
        .strip_prefix("cron(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// EventBridge requires exactly one of day-of-month and day-of-week to be `?`
fn check_day_exclusivity(day_of_month: &str, day_of_week: &str) -> Result<()> {
    match (day_of_month == "?", day_of_week == "?") {
        (true, false) | (false, true) => Ok(()),
        (true, true) => Err(Error::InvalidCron(
            "day-of-month and day-of-week cannot both be '?'".to_string(),
        )),
        (false, false) => Err(Error::InvalidCron(
            "one of day-of-month or day-of-week must be '?'".to_string(),
        )),
    }
}
