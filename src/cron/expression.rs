//! Cron fields and validated expressions

use super::validator::AwsCronValidator;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the six positions of an EventBridge cron expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CronField {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
    Year,
}

impl CronField {
    /// All fields in expression order
    pub const ALL: [CronField; 6] = [
        CronField::Minute,
        CronField::Hour,
        CronField::DayOfMonth,
        CronField::Month,
        CronField::DayOfWeek,
        CronField::Year,
    ];

    /// Zero-based position within the expression
    pub fn position(self) -> usize {
        match self {
            CronField::Minute => 0,
            CronField::Hour => 1,
            CronField::DayOfMonth => 2,
            CronField::Month => 3,
            CronField::DayOfWeek => 4,
            CronField::Year => 5,
        }
    }
}

impl std::fmt::Display for CronField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CronField::Minute => write!(f, "minute"),
            CronField::Hour => write!(f, "hour"),
            CronField::DayOfMonth => write!(f, "day-of-month"),
            CronField::Month => write!(f, "month"),
            CronField::DayOfWeek => write!(f, "day-of-week"),
            CronField::Year => write!(f, "year"),
        }
    }
}

/// A validated six-field EventBridge cron expression
///
/// Only constructed through [`AwsCronValidator`], so every instance holds
/// fields that matched their grammar. Serializes as the space-joined
/// expression string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CronExpression {
    fields: [String; 6],
}

impl CronExpression {
    pub(crate) fn from_fields(fields: [String; 6]) -> Self {
        Self { fields }
    }

    /// Value of a single field
    pub fn field(&self, field: CronField) -> &str {
        &self.fields[field.position()]
    }

    pub fn minute(&self) -> &str {
        self.field(CronField::Minute)
    }

    pub fn hour(&self) -> &str {
        self.field(CronField::Hour)
    }

    pub fn day_of_month(&self) -> &str {
        self.field(CronField::DayOfMonth)
    }

    pub fn month(&self) -> &str {
        self.field(CronField::Month)
    }

    pub fn day_of_week(&self) -> &str {
        self.field(CronField::DayOfWeek)
    }

    pub fn year(&self) -> &str {
        self.field(CronField::Year)
    }

    /// EventBridge schedule expression, e.g. `cron(0 8 ? * MON-FRI *)`
    pub fn schedule_expression(&self) -> String {
        format!("cron({})", self)
    }
}

impl std::fmt::Display for CronExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fields.join(" "))
    }
}

impl FromStr for CronExpression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AwsCronValidator::validate(s)
    }
}

impl TryFrom<String> for CronExpression {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AwsCronValidator::validate(&value)
    }
}

impl From<CronExpression> for String {
    fn from(expr: CronExpression) -> Self {
        expr.to_string()
    }
}
