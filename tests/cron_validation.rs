//! Cron validation integration tests
//!
//! Exercises the public validator and grammar against the expressions the
//! EventBridge documentation lists, plus the schedule builder that feeds it.

use chrono::NaiveDate;
use rag_ops::schedule::{simple_cron, validate_end_date};
use rag_ops::{
    AwsCronValidator, ClockTime, CronExpression, CronField, CronGrammar, Error,
    SagemakerSchedule, ScheduleFormat, Weekday,
};

// ─── Documented expressions ──────────────────────────────────────

#[test]
fn test_documented_expressions_are_accepted() {
    let accepted = [
        "0 10 * * ? *",
        "15 12 * * ? *",
        "0 18 ? * MON-FRI *",
        "0 8 1 * ? *",
        "0/15 * * * ? *",
        "0/10 * ? * MON-FRI *",
        "0/5 8-17 ? * MON-FRI *",
        "0 9 ? * 2#1 *",
        "0 0 L * ? *",
        "0 0 LW * ? *",
        "0 0 15W * ? *",
        "0 0 ? * 6L *",
        "0 0 ? * L-3 2030",
        "30 22 ? * FRI#3 2026-2028",
        "0,30 6,18 ? JAN,JUL * *",
    ];

    for expr in accepted {
        assert!(AwsCronValidator::is_valid(expr), "should accept: {}", expr);
    }
}

#[test]
fn test_malformed_expressions_are_rejected() {
    let rejected = [
        "",
        "* * * * *",
        "* * * * ? * *",
        "60 * * * ? *",
        "0 24 * * ? *",
        "0 0 32 * ? *",
        "0 0 * 13 ? *",
        "0 0 ? * 8 *",
        "0 0 ? * MON#6 *",
        "0 0 * * ? 1969",
        "0 0 * jan ? *",
        "0 0 * * * *",
        "0 0 ? * ? *",
    ];

    for expr in rejected {
        assert!(!AwsCronValidator::is_valid(expr), "should reject: {}", expr);
    }
}

#[test]
fn test_schedule_wrapper_is_accepted() {
    let expr = AwsCronValidator::validate("  cron(0 18 ? * MON-FRI *) ").unwrap();
    assert_eq!(expr.to_string(), "0 18 ? * MON-FRI *");
    assert_eq!(expr.schedule_expression(), "cron(0 18 ? * MON-FRI *)");
}

// ─── Error reporting ─────────────────────────────────────────────

#[test]
fn test_first_invalid_field_is_reported() {
    let err = AwsCronValidator::validate("0 25 ? * BAD *").unwrap_err();
    match err {
        Error::InvalidCronField { field, value } => {
            assert_eq!(field, "hour");
            assert_eq!(value, "25");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_wrong_field_count_message() {
    let err = AwsCronValidator::validate("0 12 * * ?").unwrap_err();
    assert!(err.to_string().contains("got 5"));
}

// ─── Grammar ─────────────────────────────────────────────────────

#[test]
fn test_grammar_fields_are_independent() {
    let grammar = CronGrammar::global();

    assert!(grammar.matches(CronField::DayOfWeek, "L"));
    assert!(!grammar.matches(CronField::Month, "L"));

    assert!(grammar.matches(CronField::DayOfMonth, "LW"));
    assert!(!grammar.matches(CronField::DayOfWeek, "LW"));

    assert!(grammar.matches(CronField::Year, "2199"));
    assert!(!grammar.matches(CronField::Year, "2200"));
}

#[test]
fn test_fresh_grammar_agrees_with_global() {
    let fresh = CronGrammar::new().unwrap();
    for expr in ["0 9 ? * 2#1 *", "0 0 * * * *", "5/5 0-23/2 1-31/3 JAN-DEC/2 ? 1970/10"] {
        assert_eq!(
            AwsCronValidator::validate_with(&fresh, expr).is_ok(),
            AwsCronValidator::is_valid(expr),
            "disagreement on {}",
            expr
        );
    }
}

// ─── Serde ───────────────────────────────────────────────────────

#[test]
fn test_expression_serde_validates() {
    let expr: CronExpression = serde_json::from_str("\"0 7 ? * MON *\"").unwrap();
    assert_eq!(expr.day_of_week(), "MON");
    assert_eq!(serde_json::to_string(&expr).unwrap(), "\"0 7 ? * MON *\"");

    assert!(serde_json::from_str::<CronExpression>("\"0 7 * * MON *\"").is_err());
}

// ─── Schedules ───────────────────────────────────────────────────

#[test]
fn test_simple_schedule_produces_valid_cron() {
    let time = ClockTime::parse("7:05").unwrap();
    let expr = simple_cron(&time, &[Weekday::Sun, Weekday::Sat]).unwrap();
    assert_eq!(expr.to_string(), "05 7 ? * SUN,SAT *");
    assert!(AwsCronValidator::is_valid(&expr.to_string()));
}

#[test]
fn test_cron_schedule_resolves_with_end_date() {
    let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let schedule = SagemakerSchedule {
        enabled: true,
        timezone: "Europe/Paris".into(),
        format: ScheduleFormat::Cron,
        start_cron: Some("cron(0 8 ? * MON-FRI *)".into()),
        stop_cron: Some("0 20 ? * MON-FRI *".into()),
        end_date: Some("2026-12-31".into()),
        ..Default::default()
    };

    let resolved = schedule.resolve(today).unwrap();
    assert_eq!(resolved.timezone, "Europe/Paris");
    assert_eq!(resolved.start.hour(), "8");
    assert_eq!(resolved.start_end_date, NaiveDate::from_ymd_opt(2026, 12, 31));

    assert!(validate_end_date("2026-02-28", today).is_err());
}
