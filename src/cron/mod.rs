//! AWS EventBridge cron syntax
//!
//! Six space-separated fields:
//! ```text
//! ┌───────────── minute (0-59)
//! │ ┌───────────── hour (0-23)
//! │ │ ┌───────────── day of month (1-31, ?, L, LW, nW)
//! │ │ │ ┌───────────── month (1-12 or JAN-DEC)
//! │ │ │ │ ┌───────────── day of week (1-7 or SUN-SAT, ?, nL, L, L-n, n#k)
//! │ │ │ │ │ ┌───────────── year (1980-2199)
//! │ │ │ │ │ │
//! * * ? * * *
//! ```

pub mod expression;
pub mod grammar;
pub mod validator;

pub use expression::{CronExpression, CronField};
pub use grammar::CronGrammar;
pub use validator::AwsCronValidator;
