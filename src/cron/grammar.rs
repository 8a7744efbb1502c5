//! Regular-expression grammar for AWS EventBridge cron fields
//!
//! Every field pattern is composed from the same four building blocks so
//! list and step syntax is defined exactly once:
//!
//! ```text
//! range(v)          v | *-v | v-v | v-*
//! list_of_ranges(v) range(v) (, range(v))*
//! step(v)           (* | range(v) | v) / n        n > 0
//! list_of_steps(v)  (step(v) | range(v)) (, (step(v) | range(v)))*
//! common(v)         list_of_ranges(v) | * | list_of_steps(v)
//! ```
//!
//! Field-specific tokens (`?`, `L`, `W`, `#`) are appended as extra
//! alternatives on top of `common`.

use super::expression::CronField;
use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Minutes, `0`-`59` with an optional leading zero
pub const MINUTE_VALUES: &str = "(0?[0-9]|[1-5][0-9])";

/// Hours, `0`-`23` with an optional leading zero
pub const HOUR_VALUES: &str = "(0?[0-9]|1[0-9]|2[0-3])";

/// Days of the month, `1`-`31` with an optional leading zero
pub const DAY_OF_MONTH_VALUES: &str = "(0?[1-9]|[1-2][0-9]|3[0-1])";

/// Months, `1`-`12` with an optional leading zero, or `JAN`-`DEC`
pub const MONTH_VALUES: &str =
    "(0?[1-9]|1[0-2]|JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)";

/// Days of the week, `1`-`7` or `SUN`-`SAT`
pub const DAY_OF_WEEK_VALUES: &str = "([1-7]|SUN|MON|TUE|WED|THU|FRI|SAT)";

/// Years, `1980`-`2199`
pub const YEAR_VALUES: &str = "((19[8-9][0-9])|(2[0-1][0-9][0-9]))";

/// Whole numbers greater than zero (step increments)
pub const POSITIVE_INTEGER: &str = "([0-9]*[1-9][0-9]*)";

/// A single value or a bounded/half-open range over `values`
pub fn range(values: &str) -> String {
    format!("({v}|(\\*-{v})|({v}-{v})|({v}-\\*))", v = values)
}

/// One or more comma-separated ranges
pub fn list_of_ranges(values: &str) -> String {
    let range = range(values);
    format!("({r}(,{r})*)", r = range)
}

/// A wildcard, range or value followed by `/<increment>`
pub fn step(values: &str) -> String {
    format!(
        "((\\*|{}|{})/{})",
        range(values),
        values,
        POSITIVE_INTEGER
    )
}

/// One or more comma-separated steps or ranges
pub fn list_of_steps(values: &str) -> String {
    let step_or_range = format!("({}|{})", step(values), range(values));
    format!("({s}(,{s})*)", s = step_or_range)
}

/// The shared composite grammar: list of ranges, bare wildcard, or list of steps
pub fn common(values: &str) -> String {
    format!("({}|\\*|{})", list_of_ranges(values), list_of_steps(values))
}

/// `<day>#<n>`: the n-th given weekday of the month
fn nth_weekday() -> String {
    format!("({}#[1-5])", DAY_OF_WEEK_VALUES)
}

pub fn minute_pattern() -> String {
    format!("^({})$", common(MINUTE_VALUES))
}

pub fn hour_pattern() -> String {
    format!("^({})$", common(HOUR_VALUES))
}

/// Adds `?`, `L` (last day), `LW` (last weekday) and `<day>W` (nearest weekday)
pub fn day_of_month_pattern() -> String {
    format!(
        "^({}|\\?|L|LW|{}W)$",
        common(DAY_OF_MONTH_VALUES),
        DAY_OF_MONTH_VALUES
    )
}

pub fn month_pattern() -> String {
    format!("^({})$", common(MONTH_VALUES))
}

/// Day of week takes no steps. Adds `?`, `<day>L`, `L`, `L-<n>` and `<day>#<n>`.
pub fn day_of_week_pattern() -> String {
    format!(
        "^({}|\\*|\\?|{}L|L|L-[1-7]|{})$",
        list_of_ranges(DAY_OF_WEEK_VALUES),
        DAY_OF_WEEK_VALUES,
        nth_weekday()
    )
}

pub fn year_pattern() -> String {
    format!("^({})$", common(YEAR_VALUES))
}

/// Pattern source for a field
pub fn pattern_for(field: CronField) -> String {
    match field {
        CronField::Minute => minute_pattern(),
        CronField::Hour => hour_pattern(),
        CronField::DayOfMonth => day_of_month_pattern(),
        CronField::Month => month_pattern(),
        CronField::DayOfWeek => day_of_week_pattern(),
        CronField::Year => year_pattern(),
    }
}

/// The six compiled field patterns
#[derive(Debug, Clone)]
pub struct CronGrammar {
    minute: Regex,
    hour: Regex,
    day_of_month: Regex,
    month: Regex,
    day_of_week: Regex,
    year: Regex,
}

impl CronGrammar {
    /// Compile all six field patterns
    pub fn new() -> Result<Self> {
        Ok(Self {
            minute: compile(CronField::Minute)?,
            hour: compile(CronField::Hour)?,
            day_of_month: compile(CronField::DayOfMonth)?,
            month: compile(CronField::Month)?,
            day_of_week: compile(CronField::DayOfWeek)?,
            year: compile(CronField::Year)?,
        })
    }

    /// Process-wide grammar, compiled on first use
    pub fn global() -> &'static CronGrammar {
        static GRAMMAR: OnceLock<CronGrammar> = OnceLock::new();
        // The patterns are assembled from constants; compilation only fails
        // if the templates above are edited into invalid syntax.
        GRAMMAR.get_or_init(|| CronGrammar::new().expect("cron field patterns compile"))
    }

    /// Compiled pattern for a field
    pub fn regex(&self, field: CronField) -> &Regex {
        match field {
            CronField::Minute => &self.minute,
            CronField::Hour => &self.hour,
            CronField::DayOfMonth => &self.day_of_month,
            CronField::Month => &self.month,
            CronField::DayOfWeek => &self.day_of_week,
            CronField::Year => &self.year,
        }
    }

    /// Test a single field value
    pub fn matches(&self, field: CronField, value: &str) -> bool {
        self.regex(field).is_match(value)
    }
}

fn compile(field: CronField) -> Result<Regex> {
    Regex::new(&pattern_for(field))
        .map_err(|e| Error::Config(format!("Invalid {} pattern: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> &'static CronGrammar {
        CronGrammar::global()
    }

    fn accepts(field: CronField, value: &str) -> bool {
        grammar().matches(field, value)
    }

    #[test]
    fn test_all_patterns_compile() {
        assert!(CronGrammar::new().is_ok());
    }

    #[test]
    fn test_minute_accepts_full_domain() {
        for m in 0..=59 {
            assert!(accepts(CronField::Minute, &m.to_string()), "minute {}", m);
            assert!(accepts(CronField::Minute, &format!("{:02}", m)), "minute {:02}", m);
        }
    }

    #[test]
    fn test_minute_rejects_out_of_range() {
        for m in 60..=1000 {
            assert!(!accepts(CronField::Minute, &m.to_string()), "minute {}", m);
        }
        assert!(!accepts(CronField::Minute, "-1"));
        assert!(!accepts(CronField::Minute, "000"));
        assert!(!accepts(CronField::Minute, ""));
    }

    #[test]
    fn test_minute_composites() {
        for value in ["*", "*/5", "0-30/10", "5/15", "1,2,3", "10-20,30", "*-10", "50-*", "*/5,7"] {
            assert!(accepts(CronField::Minute, value), "minute {}", value);
        }
        for value in ["*/0", "1,", ",1", "1--2", "**", "1-60", "5/"] {
            assert!(!accepts(CronField::Minute, value), "minute {}", value);
        }
    }

    #[test]
    fn test_hour_domain() {
        for h in 0..=23 {
            assert!(accepts(CronField::Hour, &h.to_string()));
            assert!(accepts(CronField::Hour, &format!("{:02}", h)));
        }
        assert!(!accepts(CronField::Hour, "24"));
        assert!(accepts(CronField::Hour, "9-17"));
    }

    #[test]
    fn test_day_of_month_specials() {
        for value in ["L", "LW", "15W", "?", "1-31", "01", "*/2", "1,15"] {
            assert!(accepts(CronField::DayOfMonth, value), "dom {}", value);
        }
        for value in ["32", "0", "W", "L-1", "32W", "LL"] {
            assert!(!accepts(CronField::DayOfMonth, value), "dom {}", value);
        }
    }

    #[test]
    fn test_month_names_and_numbers() {
        assert!(accepts(CronField::Month, "JAN"));
        assert!(accepts(CronField::Month, "1"));
        assert!(accepts(CronField::Month, "JAN-MAR"));
        assert!(accepts(CronField::Month, "12"));
        assert!(!accepts(CronField::Month, "13"));
        assert!(!accepts(CronField::Month, "0"));
    }

    #[test]
    fn test_month_is_case_sensitive() {
        assert!(!accepts(CronField::Month, "jan"));
        assert!(!accepts(CronField::Month, "Jan"));
    }

    #[test]
    fn test_day_of_week_specials() {
        for value in ["MON#2", "L-3", "5L", "L", "?", "*", "MON-FRI", "SUN,SAT", "1#5"] {
            assert!(accepts(CronField::DayOfWeek, value), "dow {}", value);
        }
        for value in ["8", "0", "MON#6", "L-8", "mon", "*/2"] {
            assert!(!accepts(CronField::DayOfWeek, value), "dow {}", value);
        }
    }

    #[test]
    fn test_year_domain() {
        assert!(accepts(CronField::Year, "1980"));
        assert!(accepts(CronField::Year, "2199"));
        assert!(accepts(CronField::Year, "2024-2030"));
        assert!(accepts(CronField::Year, "*"));
        assert!(!accepts(CronField::Year, "1979"));
        assert!(!accepts(CronField::Year, "2200"));
        assert!(!accepts(CronField::Year, "24"));
    }

    #[test]
    fn test_list_composition_is_closed() {
        let list = Regex::new(&format!("^{}$", list_of_ranges(MINUTE_VALUES))).unwrap();
        for value in ["1-59", "5", "*-10,20", "0,1,2-3"] {
            assert!(list.is_match(value));
            let doubled = format!("{},{}", value, value);
            assert!(list.is_match(&doubled), "{}", doubled);
        }

        let steps = Regex::new(&format!("^{}$", list_of_steps(HOUR_VALUES))).unwrap();
        let joined = "*/2,1-5/3";
        assert!(steps.is_match(joined));
        assert!(steps.is_match(&format!("{},{}", joined, joined)));
    }

    #[test]
    fn test_patterns_are_anchored() {
        for field in CronField::ALL {
            let pattern = pattern_for(field);
            assert!(pattern.starts_with('^') && pattern.ends_with('$'), "{}", field);
        }
        assert!(!accepts(CronField::Minute, "x5"));
        assert!(!accepts(CronField::Minute, "5x"));
    }
}
