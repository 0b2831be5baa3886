//! # warden-cli
//!
//! Command-line interface for the Warden governance engine.
//!
//! ## Commands
//!
//! - `warden route` - Route one or more actions and print the decisions
//! - `warden classify` - Print the risk assessment for actions
//! - `warden pipeline` - Classify a multi-step pipeline
//! - `warden hats` - Run the six-hats evaluation on an action
//! - `warden config` - Show the effective configuration
//! - `warden doctor` - Audit the configuration

pub mod commands;
pub mod input;

pub use commands::Cli;
