//! HTTP route handlers

pub mod grammar;
pub mod progress;
pub mod rules;
pub mod srs;
