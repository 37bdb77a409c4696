//! Worklink: a job-board marketplace backend.
//!
//! Employers post jobs, employees spend ledger tokens to apply (or hold an
//! unlimited subscription), employers accept/reject/end/rate, and an admin
//! manages accounts and approves plans. The `marketplace` module holds the
//! domain model and HTTP surface; the rest is ambient plumbing.

pub mod auth;
pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
