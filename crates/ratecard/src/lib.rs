//! Rate card CLI tools.
//!
//! This crate provides command-line tools over the rate card catalog:
//!
//! - `ratecard-roles`: List the roles and their hourly costs
//! - `ratecard-quote`: Price one role at every location and recommend one
//! - `ratecard-plan`: Run a staffing plan and summarize it
//!
//! # Example Usage
//!
//! ```bash
//! ratecard-roles --offline
//! ratecard-quote --role "Senior Developer" --hours 100 --margin 50
//! ratecard-quote --role "QA Tester" --hours 40 --rate 120 --location nearshore
//! ratecard-plan plan.json --json
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod render;
