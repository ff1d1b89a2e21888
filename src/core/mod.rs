//! Core types: errors, configuration, time spans.

pub mod config;
pub mod errors;
pub mod time_span;
