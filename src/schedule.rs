//! SageMaker endpoint start/stop schedules
//!
//! A schedule is given either as two raw EventBridge cron expressions or in
//! the "simple" form (a start time, a stop time and a set of weekdays) that
//! is expanded into `MM HH ? * DAYS *`. Both paths end in
//! [`AwsCronValidator`], so a resolved schedule always holds valid cron.

use crate::cron::{AwsCronValidator, CronExpression};
use crate::error::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A time of day as typed by the user (`HH:MM`, leading zeros optional)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTime {
    hour: String,
    minute: String,
}

impl ClockTime {
    /// Parse `HH:MM` (hour 0-23, minute 0-59)
    pub fn parse(input: &str) -> Result<Self> {
        let caps = clock_regex()
            .captures(input.trim())
            .ok_or_else(|| Error::InvalidSchedule("Time must be in HH:MM format!".to_string()))?;

        Ok(Self {
            hour: caps[1].to_string(),
            minute: caps[2].to_string(),
        })
    }

    pub fn hour(&self) -> &str {
        &self.hour
    }

    pub fn minute(&self) -> &str {
        &self.minute
    }
}

fn clock_regex() -> &'static Regex {
    static CLOCK: OnceLock<Regex> = OnceLock::new();
    CLOCK.get_or_init(|| {
        Regex::new(r"^([0-1]?[0-9]|2[0-3]):([0-5]?[0-9])$").expect("clock pattern compiles")
    })
}

fn date_regex() -> &'static Regex {
    static DATE: OnceLock<Regex> = OnceLock::new();
    DATE.get_or_init(|| {
        Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])$")
            .expect("date pattern compiles")
    })
}

/// Day of the week, serialized as its EventBridge abbreviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    pub fn abbreviation(self) -> &'static str {
        match self {
            Weekday::Sun => "SUN",
            Weekday::Mon => "MON",
            Weekday::Tue => "TUE",
            Weekday::Wed => "WED",
            Weekday::Thu => "THU",
            Weekday::Fri => "FRI",
            Weekday::Sat => "SAT",
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Build `MM HH ? * DAYS *` for a time of day on the given weekdays
pub fn simple_cron(time: &ClockTime, days: &[Weekday]) -> Result<CronExpression> {
    if days.is_empty() {
        return Err(Error::InvalidSchedule(
            "You need to select at least one day".to_string(),
        ));
    }

    let days = days
        .iter()
        .map(|d| d.abbreviation())
        .collect::<Vec<_>>()
        .join(",");

    AwsCronValidator::validate(&format!("{} {} ? * {} *", time.minute(), time.hour(), days))
}

/// Validate a `YYYY-MM-DD` date that must fall strictly after `today`
pub fn validate_end_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let invalid = || {
        Error::InvalidSchedule(
            "The date must be in format YYYY-MM-DD and be in the future".to_string(),
        )
    };

    let input = input.trim();
    if !date_regex().is_match(input) {
        return Err(invalid());
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| invalid())?;
    if date <= today {
        return Err(invalid());
    }
    Ok(date)
}

/// How the schedule was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleFormat {
    /// Start/stop times plus weekdays
    #[default]
    Simple,
    /// Raw cron expressions
    Cron,
}

/// Start/stop schedule for SageMaker endpoints
///
/// Field names follow the `llms.sagemakerSchedule` section written by the
/// configuration wizard; the shorter names are accepted as aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SagemakerSchedule {
    #[serde(default)]
    pub enabled: bool,

    /// IANA time zone the schedule runs in
    #[serde(
        rename = "timezonePicker",
        alias = "timezone",
        default = "default_timezone",
        deserialize_with = "string_or_first"
    )]
    pub timezone: String,

    #[serde(rename = "enableCronFormat", alias = "format", default)]
    pub format: ScheduleFormat,

    #[serde(
        rename = "sagemakerCronStartSchedule",
        alias = "startCron",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_cron: Option<String>,

    #[serde(
        rename = "sagemakerCronStopSchedule",
        alias = "stopCron",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_cron: Option<String>,

    #[serde(
        rename = "daysForSchedule",
        alias = "days",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub days: Vec<Weekday>,

    #[serde(
        rename = "scheduleStartTime",
        alias = "startTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<String>,

    #[serde(
        rename = "scheduleStopTime",
        alias = "stopTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_time: Option<String>,

    /// `false` ignores `end_date`; unset applies it when present
    #[serde(
        rename = "enableScheduleEndDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub enable_end_date: Option<bool>,

    /// After this date the endpoints are no longer started
    #[serde(
        rename = "startScheduleEndDate",
        alias = "endDate",
        default,
        deserialize_with = "date_or_false",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<String>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// The wizard's time zone picker may store a single choice or a list
fn string_or_first<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(zone) => zone,
        OneOrMany::Many(zones) => zones.into_iter().next().unwrap_or_else(default_timezone),
    })
}

/// The wizard writes `false` when no end date was entered
fn date_or_false<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DateOrFlag {
        Date(String),
        Flag(bool),
    }

    Ok(match Option::<DateOrFlag>::deserialize(deserializer)? {
        Some(DateOrFlag::Date(date)) => Some(date),
        Some(DateOrFlag::Flag(_)) | None => None,
    })
}

/// A schedule with both expressions validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSchedule {
    pub timezone: String,
    pub start: CronExpression,
    pub stop: CronExpression,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_end_date: Option<NaiveDate>,
}

impl SagemakerSchedule {
    /// Produce validated start and stop expressions
    pub fn resolve(&self, today: NaiveDate) -> Result<ResolvedSchedule> {
        let (start, stop) = match self.format {
            ScheduleFormat::Cron => (
                AwsCronValidator::validate(required(&self.start_cron, "sagemakerCronStartSchedule")?)?,
                AwsCronValidator::validate(required(&self.stop_cron, "sagemakerCronStopSchedule")?)?,
            ),
            ScheduleFormat::Simple => {
                let start = ClockTime::parse(required(&self.start_time, "scheduleStartTime")?)?;
                let stop = ClockTime::parse(required(&self.stop_time, "scheduleStopTime")?)?;
                (simple_cron(&start, &self.days)?, simple_cron(&stop, &self.days)?)
            }
        };

        let start_end_date = match self.enable_end_date {
            Some(false) => None,
            _ => self
                .end_date
                .as_deref()
                .map(|d| validate_end_date(d, today))
                .transpose()?,
        };

        tracing::debug!(
            start = %start,
            stop = %stop,
            timezone = %self.timezone,
            "Schedule resolved"
        );

        Ok(ResolvedSchedule {
            timezone: self.timezone.clone(),
            start,
            stop,
            start_end_date,
        })
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::InvalidSchedule(format!("{} is required", name)))
}
