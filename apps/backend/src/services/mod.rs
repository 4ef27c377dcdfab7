//! Business logic services

pub mod grammar;
pub mod progress;
