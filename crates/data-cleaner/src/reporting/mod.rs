//! Report generation module.
//!
//! Turns the step log of a cleaning run into a prompt, sends it to an
//! [`AIProvider`](crate::ai::AIProvider) once, and hands back the prose
//! untouched.
//!
//! # Example
//!
//! ```rust,ignore
//! use data_cleaner::reporting::ReportRequester;
//!
//! let requester = ReportRequester::new(provider).with_cancellation_token(token);
//! let report = requester.request(result.before, result.after, &result.steps)?;
//! println!("{}", report.text);
//! ```

mod requester;

pub use requester::{CleaningReport, NO_STEPS_SENTINEL, ReportRequester, build_report_prompt};
