//! MQDQ CLI library
//!
//! This library provides the batch commands wrapping `mqdq-core`: each
//! command resolves its input documents, runs one core operation per
//! document on the worker pool and writes TEI documents, JSON dumps or
//! reports to the output location.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use error::{CliError, CliResult};
