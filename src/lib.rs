#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]
//! toolshed — personal developer utilities sharing a common CLI driver.
//!
//! The one piece of real structure here is [`script`]: a small driver that
//! gives every tool the same argument-parsing, logging-verbosity, diagnostic
//! and exit-status behavior. The tools themselves live in [`tools`], one
//! module per utility, each with a matching binary under `src/bin/`.

pub mod script;
pub mod tools;
